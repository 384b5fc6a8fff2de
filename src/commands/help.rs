use std::io::{self, Write};

use crate::cli::build_cli;
use crate::error::AppError;

pub fn run(show_all: bool, command: Option<&str>) -> anyhow::Result<()> {
    let mut cli = build_cli(show_all);

    match command {
        Some(name) => {
            let sub = cli
                .find_subcommand_mut(name)
                .ok_or_else(|| AppError::input(format!("Unknown command: {}", name)))?;
            sub.print_long_help()?;
        }
        None => cli.print_long_help()?,
    }
    io::stdout().flush()?;
    Ok(())
}
