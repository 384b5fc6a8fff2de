use anyhow::Result;
use serde_json::json;

use crate::cli::{CliArgs, SessionsArgs};
use crate::commands::common;
use crate::config::OutputFormat;
use crate::output::table::{self, format_number};
use crate::output::TableOptions;
use crate::source::{ServerSession, SessionFilter, SqlServerSource};

const LIMIT_DEFAULT: u64 = 20;
const LIMIT_MAX: u64 = 200;
const HEADERS: &[&str] = &[
    "Session", "Login", "Host", "Program", "Database", "Status", "Command", "Wait Type",
    "Blocked By", "Elapsed ms", "Isolation", "Login Time", "Query",
];

pub fn run(args: &CliArgs, cmd: &SessionsArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);

    let filter = SessionFilter {
        database: cmd.database.clone(),
        login: cmd.login.clone(),
        host: cmd.host.clone(),
        status: cmd.status.clone(),
        blocked_only: cmd.blocked,
        limit: common::parse_limit(cmd.limit, LIMIT_DEFAULT, LIMIT_MAX),
    };

    let mut source = SqlServerSource::connect(&resolved.connection, None)?;
    let sessions = source.fetch_sessions(&filter)?;

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "filters": {
                "database": filter.database,
                "login": filter.login,
                "host": filter.host,
                "status": filter.status,
                "blocked": filter.blocked_only,
                "limit": filter.limit,
            },
            "count": sessions.len(),
            "sessions": sessions,
        });
        return common::print_json(args, &resolved, &payload);
    }

    if args.quiet {
        return Ok(());
    }

    let rows = sessions.iter().map(session_row).collect::<Vec<_>>();
    let rendered = table::render_rows(HEADERS, &rows, format, &TableOptions::default());
    println!("{}", rendered);

    Ok(())
}

fn session_row(session: &ServerSession) -> Vec<Option<String>> {
    vec![
        Some(session.id.to_string()),
        session.login.clone(),
        session.host.clone(),
        session.program.clone(),
        session.database.clone(),
        session.status.clone(),
        session.command.clone(),
        session.wait_type.clone(),
        session.blocked_by.map(|id| id.to_string()),
        session.elapsed_ms.map(format_number),
        Some(session.isolation_level.title().to_string()),
        session.login_time.clone(),
        session.active_query.clone(),
    ]
}
