//! `flowrate belts` command - route one flow network from stdin

use std::io::Read;

use console::style;
use miette::Result;

use crate::belts::{self, BeltInput, BeltReport};

pub fn run() -> Result<()> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .map_err(|e| miette::miette!("failed to read stdin: {}", e))?;

    let report = match serde_json::from_str::<BeltInput>(&raw) {
        Ok(input) => match belts::solve(input) {
            Ok(report) => report,
            Err(e) => {
                eprintln!("{} {}", style("✗").red(), e);
                BeltReport::error(e.to_string())
            }
        },
        Err(e) => BeltReport::error(format!("invalid JSON input: {}", e)),
    };

    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|e| miette::miette!("failed to serialize report: {}", e))?;
    println!("{}", rendered);
    Ok(())
}
