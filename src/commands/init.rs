use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::json;

use crate::cli::{CliArgs, InitArgs};
use crate::commands::common;
use crate::config::OutputFormat;
use crate::error::AppError;

pub fn run(args: &CliArgs, cmd: &InitArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);

    // The global --profile names the profile the template defines.
    let profile_name = args.profile.as_deref().unwrap_or("default");
    let target = resolve_target_path(cmd.path.as_deref());
    let existed = target.exists();

    if existed && !cmd.force {
        return Err(AppError::input(format!(
            "Config already exists: {} (use --force to overwrite)",
            target.display()
        ))
        .into());
    }
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, render_config_template(profile_name))?;

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "path": target.display().to_string(),
            "created": true,
            "overwritten": existed,
        });
        return common::print_json(args, &resolved, &payload);
    }
    if !args.quiet {
        println!("Wrote config to {}", target.display());
    }
    Ok(())
}

/// A path with a config extension is used as is; anything else is a directory.
fn resolve_target_path(path: Option<&Path>) -> PathBuf {
    let default = || Path::new(".lockgraph").join("config.yaml");
    match path {
        Some(path)
            if matches!(
                path.extension().and_then(|s| s.to_str()),
                Some("yaml" | "yml" | "json")
            ) =>
        {
            path.to_path_buf()
        }
        Some(dir) => dir.join(default()),
        None => default(),
    }
}

fn render_config_template(profile: &str) -> String {
    format!(
        r#"# lockgraph configuration
# kill stays disabled unless allowWriteDefault is true or --allow-write is passed.

defaultProfile: {profile}
settings:
  allowWriteDefault: false
  output:
    # Values: pretty | markdown | json
    defaultFormat: pretty
    json:
      pretty: true
  locks:
    # How `locks` draws the graph. Values: tree | table
    view: tree

profiles:
  {profile}:
    server: localhost
    port: 1433
    database: master
    user: sa
    passwordEnv: SQL_PASSWORD
    encrypt: true
    trustCert: true
    timeout: 30000
"#
    )
}
