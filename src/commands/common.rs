use std::path::Path;

use anyhow::Result;

use crate::cli::CliArgs;
use crate::config::OutputFormat;
use crate::config::{self, CliOverrides, ResolvedConfig};
use crate::error::{AppError, ErrorKind};
use crate::output::{self, json as json_out};
use crate::source::{LockSource, SnapshotSource, SqlServerSource};

pub fn overrides_from_args(args: &CliArgs) -> CliOverrides {
    CliOverrides {
        config_path: args.config_path.clone(),
        env_file: args.env_file.clone(),
        profile: args.profile.clone(),
        server: args.server.clone(),
        port: args.port,
        database: args.database.clone(),
        user: args.user.clone(),
        password: args.password.clone(),
        timeout_ms: args.timeout_ms,
        encrypt: args.encrypt,
        trust_cert: args.trust_cert,
    }
}

pub fn load_config(args: &CliArgs) -> Result<ResolvedConfig> {
    let overrides = overrides_from_args(args);
    config::load_from_system(&overrides)
        .map_err(|err| AppError::new(ErrorKind::Config, err.to_string()).into())
}

pub fn output_format(args: &CliArgs, resolved: &ResolvedConfig) -> OutputFormat {
    output::select_format(&args.output, &resolved.settings)
}

pub fn json_pretty(resolved: &ResolvedConfig) -> bool {
    resolved.settings.output.json.pretty
}

pub fn allow_write(args: &CliArgs, resolved: &ResolvedConfig) -> bool {
    args.allow_write || resolved.settings.allow_write_default
}

pub fn parse_limit(value: Option<u64>, default: u64, max: u64) -> u64 {
    match value {
        Some(v) if v < 1 => default,
        Some(v) => v.min(max),
        None => default,
    }
}

/// Print a JSON payload unless `--quiet`.
pub fn print_json(
    args: &CliArgs,
    resolved: &ResolvedConfig,
    payload: &serde_json::Value,
) -> Result<()> {
    let body = json_out::emit_json_value(payload, json_pretty(resolved))?;
    if !args.quiet {
        println!("{}", body);
    }
    Ok(())
}

/// A snapshot file when `input` is given, otherwise the configured server.
pub fn open_lock_source(
    resolved: &ResolvedConfig,
    input: Option<&Path>,
    database_filter: Option<String>,
) -> Result<Box<dyn LockSource>> {
    match input {
        Some(path) => Ok(Box::new(
            SnapshotSource::open(path)?.with_database_filter(database_filter.as_deref()),
        )),
        None => Ok(Box::new(SqlServerSource::connect(
            &resolved.connection,
            database_filter,
        )?)),
    }
}
