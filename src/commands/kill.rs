use anyhow::Result;
use serde_json::json;

use crate::cli::{CliArgs, KillArgs};
use crate::commands::common;
use crate::config::OutputFormat;
use crate::db::queries;
use crate::error::AppError;
use crate::source::{SessionControl, SqlServerSource};

pub fn run(args: &CliArgs, cmd: &KillArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);

    if cmd.id.get() <= 0 {
        return Err(AppError::input(format!("Invalid session id: {}", cmd.id)).into());
    }
    let statement = queries::kill_session(cmd.id.get());

    if cmd.dry_run {
        if matches!(format, OutputFormat::Json) {
            let payload = json!({
                "id": cmd.id,
                "dryRun": true,
                "statement": statement,
            });
            return common::print_json(args, &resolved, &payload);
        }
        if !args.quiet {
            println!("{}", statement);
        }
        return Ok(());
    }

    if !common::allow_write(args, &resolved) {
        return Err(AppError::input(format!(
            "Refusing to terminate session {} without --allow-write",
            cmd.id
        ))
        .into());
    }

    let mut source = SqlServerSource::connect(&resolved.connection, None)?;
    if source.own_session_id()? == Some(cmd.id) {
        return Err(AppError::input(format!(
            "Session {} is this connection; refusing to terminate it",
            cmd.id
        ))
        .into());
    }
    source.terminate_session(cmd.id)?;

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "id": cmd.id,
            "dryRun": false,
            "terminated": true,
        });
        return common::print_json(args, &resolved, &payload);
    }
    if !args.quiet {
        println!("Terminated session {}", cmd.id);
    }
    Ok(())
}
