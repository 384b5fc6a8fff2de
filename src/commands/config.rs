use std::io::{self, Write};

use anyhow::Result;

use crate::cli::CliArgs;
use crate::commands::common;
use crate::config::{OutputFormat, ResolvedConfig};
use crate::output::{json, table, TableOptions};

pub fn run(args: &CliArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);

    if matches!(format, OutputFormat::Json) {
        return common::print_json(args, &resolved, &json::config_to_json(&resolved));
    }
    if args.quiet {
        return Ok(());
    }

    let rendered = table::render_key_value_table(
        "Config",
        &config_rows(&resolved),
        format,
        &TableOptions::default(),
    );
    writeln!(io::stdout(), "{}", rendered)?;
    Ok(())
}

fn config_rows(resolved: &ResolvedConfig) -> Vec<(String, String)> {
    let connection = &resolved.connection;
    let mut rows = vec![
        (
            "configPath",
            resolved
                .config_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string()),
        ),
        ("profileName", resolved.profile_name.clone()),
        ("server", connection.server.clone()),
        ("port", connection.port.to_string()),
        ("database", connection.database.clone()),
    ];
    if let Some(user) = &connection.user {
        rows.push(("user", user.clone()));
    }
    if connection.password.is_some() {
        rows.push(("password", "********".to_string()));
    }
    rows.extend([
        ("encrypt", connection.encrypt.to_string()),
        ("trustCert", connection.trust_cert.to_string()),
        ("timeoutMs", connection.timeout_ms.to_string()),
        (
            "allowWriteDefault",
            resolved.settings.allow_write_default.to_string(),
        ),
        (
            "defaultFormat",
            resolved.settings.output.default_format.as_str().to_string(),
        ),
        ("lockView", resolved.settings.lock_view.as_str().to_string()),
    ]);
    rows.into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
