use anyhow::Context;
use clap::Parser as ClapParser;
use geometry::prelude::Side;
use schemroute::{Component, Connection, GreedyRouter, Port, RouterOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let schematic = match &args.input {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => demo_schematic(),
    };

    let options = RouterOptions {
        shortcut: !args.no_shortcut,
        ripup_retries: args.ripup_retries,
    };
    let result = GreedyRouter::new(options)
        .route(
            schematic.width,
            schematic.height,
            &schematic.components,
            &schematic.ports,
            schematic.connections,
        )
        .context("routing failed")?;

    print!("{}", result.grid.render_ascii());
    for (net, wires) in &result.wires {
        println!("{net}:");
        for wire in wires {
            let points: Vec<String> = wire.iter().map(|p| format!("({}, {})", p.x, p.y)).collect();
            println!("  {}", points.join(" -> "));
        }
    }
    for conn in &result.failures {
        eprintln!(
            "unroutable: ({}, {}) -> ({}, {})",
            conn.start.loc().x,
            conn.start.loc().y,
            conn.end.loc().x,
            conn.end.loc().y
        );
    }
    if result.failures.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} connection(s) could not be routed", result.failures.len())
    }
}

/// Arguments to the schematic routing viewer.
#[derive(ClapParser)]
#[command(
    version,
    about,
    long_about = "Route a schematic described in JSON and render the result as ASCII art"
)]
pub struct Args {
    /// Disable branching onto a net's existing wiring.
    #[arg(long)]
    no_shortcut: bool,

    /// How many committed connections a failing connection may rip up.
    #[arg(long, default_value_t = 1)]
    ripup_retries: usize,

    /// The input schematic description.
    ///
    /// If unspecified, a built-in demo schematic is routed instead.
    input: Option<PathBuf>,
}

/// A routable schematic description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schematic {
    /// Grid width, in cells.
    pub width: i64,
    /// Grid height, in cells.
    pub height: i64,
    /// Placed components.
    pub components: Vec<Component>,
    /// Placed ports.
    pub ports: Vec<Port>,
    /// Connections to route.
    pub connections: Vec<Connection>,
}

/// An inverter: two stacked transistor bodies, rails below and above, input
/// on the left, output on the right.
fn demo_schematic() -> Schematic {
    let pd = Component::new(9, 7, 5, 5, "pd");
    let pu = Component::new(9, 15, 5, 5, "pu");
    let vss = Port::new(6, 6, "vss", Side::Right);
    let vdd = Port::new(6, 20, "vdd", Side::Right);
    let y = Port::new(15, 13, "y", Side::Right);
    let a = Port::new(6, 13, "a", Side::Right);
    // `Component::new` always synthesizes the four midpoint pins.
    let pin = |c: &Component, label: &str| c.pin(label).cloned().expect("midpoint pin");
    let connections = vec![
        Connection::new(vss.clone(), pin(&pd, "S")),
        Connection::new(vss.clone(), pin(&pd, "E")),
        Connection::new(vdd.clone(), pin(&pu, "N")),
        Connection::new(vdd.clone(), pin(&pu, "E")),
        Connection::new(a.clone(), pin(&pd, "W")),
        Connection::new(a.clone(), pin(&pu, "W")),
        Connection::new(y.clone(), pin(&pd, "N")),
        Connection::new(y.clone(), pin(&pu, "S")),
    ];
    Schematic {
        width: 22,
        height: 40,
        components: vec![pd, pu],
        ports: vec![vss, vdd, y, a],
        connections,
    }
}
