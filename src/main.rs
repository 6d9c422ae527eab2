use clap::Parser;
use miette::Result;

use flowrate::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Factory => flowrate::cli::commands::factory::run(),
        Commands::Belts => flowrate::cli::commands::belts::run(),
    }
}
