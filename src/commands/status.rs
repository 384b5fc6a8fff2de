use std::time::Instant;

use anyhow::Result;
use serde_json::json;
use tiberius::Query;
use tokio::runtime::Runtime;

use crate::cli::CliArgs;
use crate::commands::common;
use crate::config::OutputFormat;
use crate::db::connection::describe_target;
use crate::db::{client, executor, queries};
use crate::output::{table, TableOptions};

const UNKNOWN: &str = "unknown";

pub fn run(args: &CliArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);

    let started = Instant::now();
    let result_set = Runtime::new()?.block_on(async {
        let mut client = client::connect(&resolved.connection).await?;
        executor::run_single(Query::new(queries::STATUS), &mut client).await
    })?;
    let latency_ms = started.elapsed().as_millis();

    let row = result_set.rows().next();
    let text = |column: &str| {
        row.as_ref()
            .and_then(|row| row.text(column))
            .unwrap_or_else(|| UNKNOWN.to_string())
    };
    let server_name = text("serverName");
    let server_version = text("serverVersion");
    let current_database = text("currentDatabase");
    let session_id = text("sessionId");
    let timestamp = text("currentTime");

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "status": "ok",
            "target": describe_target(&resolved.connection),
            "latencyMs": latency_ms,
            "serverName": server_name,
            "serverVersion": server_version,
            "currentDatabase": current_database,
            "sessionId": session_id,
            "timestamp": timestamp,
        });
        return common::print_json(args, &resolved, &payload);
    }

    if args.quiet {
        return Ok(());
    }

    let rows = vec![
        ("Status".to_string(), "ok".to_string()),
        ("Target".to_string(), describe_target(&resolved.connection)),
        ("LatencyMs".to_string(), latency_ms.to_string()),
        ("Server".to_string(), server_name),
        ("Version".to_string(), server_version),
        ("CurrentDatabase".to_string(), current_database),
        ("SessionId".to_string(), session_id),
        ("Timestamp".to_string(), timestamp),
    ];
    let rendered = table::render_key_value_table("Status", &rows, format, &TableOptions::default());
    println!("{}", rendered);

    Ok(())
}
