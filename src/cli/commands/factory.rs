//! `flowrate factory` command - solve one production plan from stdin

use std::io::Read;

use console::style;
use miette::Result;

use crate::factory::{self, FactoryInput, FactoryReport};

pub fn run() -> Result<()> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .map_err(|e| miette::miette!("failed to read stdin: {}", e))?;

    let report = match serde_json::from_str::<FactoryInput>(&raw) {
        Ok(input) => match factory::solve(input) {
            Ok(report) => report,
            Err(e) => {
                eprintln!("{} {}", style("✗").red(), e);
                FactoryReport::error(e.to_string())
            }
        },
        Err(e) => FactoryReport::error(format!("invalid JSON input: {}", e)),
    };

    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|e| miette::miette!("failed to serialize report: {}", e))?;
    println!("{}", rendered);
    Ok(())
}
