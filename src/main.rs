use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

use lockgraph::cli::{self, CliArgs};
use lockgraph::commands;
use lockgraph::error::classify_error;
use lockgraph::output::json;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = cli::parse();
    init_logging(args.verbose);

    match commands::dispatch(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&args, &err);
            ExitCode::FAILURE
        }
    }
}

/// `-v` raises our own crate first; `RUST_LOG` replaces the filter entirely.
fn init_logging(verbose: u8) {
    let directives = match verbose {
        0 => "warn,tiberius=error",
        1 => "lockgraph=info,warn",
        2 => "lockgraph=debug,info",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn report(args: &CliArgs, err: &anyhow::Error) {
    let kind = classify_error(err);
    tracing::debug!(kind = kind.as_str(), error = ?err, "command failed");

    let mut stderr = io::stderr();
    if args.output.json {
        let payload = json::error_json(&err.to_string(), kind.as_str());
        if let Ok(body) = json::emit_json_value(&payload, true) {
            let _ = writeln!(stderr, "{}", body);
        }
        return;
    }

    let line = format!("Error: {}", err);
    if color_stderr() {
        let _ = writeln!(stderr, "{}", line.red());
    } else {
        let _ = writeln!(stderr, "{}", line);
    }
}

fn color_stderr() -> bool {
    std::env::var_os("NO_COLOR").is_none() && io::stderr().is_terminal()
}
