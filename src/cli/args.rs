use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};

use crate::graph::{LockId, LockKeyRole};

#[derive(Debug, Clone)]
pub struct OutputFlags {
    pub json: bool,
    pub markdown: bool,
    pub pretty: bool,
}

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    pub profile: Option<String>,
    pub server: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout_ms: Option<u64>,
    pub allow_write: bool,
    pub encrypt: Option<bool>,
    pub trust_cert: Option<bool>,
    pub output: OutputFlags,
    pub verbose: u8,
    pub quiet: bool,
    pub command: CommandKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Help { all: bool, command: Option<String> },
    Status,
    Locks(LocksArgs),
    LockItems(LockItemsArgs),
    Sessions(SessionsArgs),
    Kill(KillArgs),
    Init(InitArgs),
    Config,
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocksArgs {
    pub input: Option<PathBuf>,
    pub database_filter: Option<String>,
    pub csv: Option<PathBuf>,
    pub table: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockItemsArgs {
    pub id: LockId,
    pub role: LockKeyRole,
    pub input: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionsArgs {
    pub database: Option<String>,
    pub login: Option<String>,
    pub host: Option<String>,
    pub status: Option<String>,
    pub blocked: bool,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillArgs {
    pub id: LockId,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitArgs {
    pub path: Option<PathBuf>,
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionsArgs {
    pub shell: Option<String>,
}

pub fn build_cli(show_all: bool) -> Command {
    Command::new("lockgraph")
        .about("Blocking and lock wait-for graphs for SQL Server")
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .disable_help_subcommand(true)
        .subcommand_value_name("COMMAND")
        .args(global_args())
        .subcommand(command_help())
        .subcommand(command_locks(show_all))
        .subcommand(command_lock_items(show_all))
        .subcommand(command_status(show_all))
        .subcommand(command_init(show_all))
        .subcommand(command_config(show_all))
        .subcommand(command_sessions(show_all))
        .subcommand(command_kill(show_all))
        .subcommand(command_completions(show_all))
}

pub fn parse_args() -> CliArgs {
    let matches = build_cli(false).get_matches();
    parse_matches(&matches)
}

fn global_args() -> Vec<Arg> {
    let value = |id: &'static str, name: &'static str, help: &'static str| {
        Arg::new(id).long(id).value_name(name).global(true).help(help)
    };
    let flag = |id: &'static str, help: &'static str| {
        Arg::new(id)
            .long(id)
            .action(ArgAction::SetTrue)
            .global(true)
            .help(help)
    };

    vec![
        value("config", "PATH", "Override config file location").value_hint(ValueHint::FilePath),
        value("env-file", "PATH", "Load environment variables from file (default: .env)")
            .value_hint(ValueHint::FilePath),
        value("profile", "NAME", "Select connection profile"),
        value("server", "HOST", "SQL Server hostname"),
        value("port", "PORT", "SQL Server port (default: 1433)")
            .value_parser(clap::value_parser!(u16)),
        value("database", "NAME", "Database to connect to (default: master)"),
        value("user", "USER", "SQL Server username"),
        value("password", "PASS", "SQL Server password"),
        value("timeout", "MS", "Connection timeout in milliseconds")
            .value_parser(clap::value_parser!(u64)),
        value("encrypt", "BOOL", "Enable connection encryption")
            .value_parser(clap::value_parser!(bool)),
        value("trust-cert", "BOOL", "Trust server certificate")
            .value_parser(clap::value_parser!(bool)),
        flag("allow-write", "Allow session termination (kill)"),
        flag("json", "Output as JSON"),
        flag("markdown", "Force markdown table output"),
        flag("pretty", "Force pretty-printed table output").alias("pretty-print"),
        Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::Count)
            .global(true)
            .help("Enable debug logging"),
        Arg::new("quiet")
            .short('q')
            .long("quiet")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Suppress non-error output"),
    ]
}

fn command_help() -> Command {
    Command::new("help")
        .about("Show help for commands")
        .arg(
            Arg::new("all")
                .long("all")
                .action(ArgAction::SetTrue)
                .help("Show all commands, including advanced ones"),
        )
        .arg(Arg::new("command").value_name("COMMAND"))
}

/// Advanced commands stay out of the top-level help unless `help --all`.
fn command_entry(
    name: &'static str,
    about: &'static str,
    aliases: &'static [&'static str],
    advanced: bool,
    show_all: bool,
) -> Command {
    Command::new(name)
        .about(about)
        .visible_aliases(aliases.iter().copied())
        .hide(advanced && !show_all)
}

fn input_arg() -> Arg {
    Arg::new("input")
        .long("input")
        .value_name("file")
        .value_hint(ValueHint::FilePath)
        .help("Read lock rows from a .csv or .json snapshot instead of the server")
}

fn id_arg(help: &'static str) -> Arg {
    Arg::new("id")
        .long("id")
        .value_name("ID")
        .required(true)
        .value_parser(clap::value_parser!(i64))
        .help(help)
}

fn limit_arg() -> Arg {
    Arg::new("limit")
        .long("limit")
        .value_name("n")
        .value_parser(clap::value_parser!(u64))
}

fn command_locks(show_all: bool) -> Command {
    command_entry(
        "locks",
        "Build and show the blocking (wait-for) graph",
        &["blocking"],
        false,
        show_all,
    )
    .arg(input_arg())
    .arg(
        Arg::new("db-filter")
            .long("db-filter")
            .value_name("name")
            .help("Only sessions in this database"),
    )
    .arg(
        Arg::new("csv")
            .long("csv")
            .value_name("file")
            .value_hint(ValueHint::FilePath)
            .help("Also write the fetched lock rows to a CSV snapshot"),
    )
    .arg(
        Arg::new("table")
            .long("table")
            .action(ArgAction::SetTrue)
            .help("Show a node table instead of the wait tree"),
    )
}

fn command_lock_items(show_all: bool) -> Command {
    command_entry(
        "lock-items",
        "Locks behind one node of the graph",
        &["items"],
        false,
        show_all,
    )
    .arg(id_arg("Node id (session id)"))
    .arg(
        Arg::new("role")
            .long("role")
            .value_name("role")
            .value_parser(["waiter", "holder"])
            .default_value("waiter")
            .help("waiter: locks of the node itself; holder: locks of the node it waits on"),
    )
    .arg(input_arg())
}

fn command_status(show_all: bool) -> Command {
    command_entry("status", "Connectivity smoke test", &["db-status"], false, show_all)
}

fn command_init(show_all: bool) -> Command {
    command_entry("init", "Create config file", &[], false, show_all)
        .arg(
            Arg::new("path")
                .long("path")
                .value_name("path")
                .value_hint(ValueHint::FilePath),
        )
        .arg(Arg::new("force").long("force").action(ArgAction::SetTrue))
}

fn command_config(show_all: bool) -> Command {
    command_entry("config", "Display resolved config", &[], false, show_all)
}

fn command_sessions(show_all: bool) -> Command {
    command_entry("sessions", "User sessions", &["connections"], true, show_all)
        .arg(Arg::new("db-filter").long("db-filter").value_name("name"))
        .arg(Arg::new("login").long("login").value_name("name"))
        .arg(Arg::new("host").long("host").value_name("name"))
        .arg(Arg::new("status").long("status").value_name("state"))
        .arg(
            Arg::new("blocked")
                .long("blocked")
                .action(ArgAction::SetTrue)
                .help("Only sessions that block or are blocked"),
        )
        .arg(limit_arg())
}

fn command_kill(show_all: bool) -> Command {
    command_entry(
        "kill",
        "Terminate a session (requires --allow-write)",
        &[],
        true,
        show_all,
    )
    .arg(id_arg("Session id to terminate"))
    .arg(
        Arg::new("dry-run")
            .long("dry-run")
            .action(ArgAction::SetTrue)
            .help("Print the statement without running it"),
    )
}

fn command_completions(show_all: bool) -> Command {
    command_entry("completions", "Generate shell completions", &[], true, show_all).arg(
        Arg::new("shell")
            .long("shell")
            .value_name("name")
            .value_parser(["bash", "zsh", "fish", "powershell", "elvish"]),
    )
}

fn path_arg(matches: &ArgMatches, id: &str) -> Option<PathBuf> {
    matches.get_one::<String>(id).map(PathBuf::from)
}

fn text_arg(matches: &ArgMatches, id: &str) -> Option<String> {
    matches.get_one::<String>(id).cloned()
}

fn id_value(matches: &ArgMatches) -> LockId {
    LockId(matches.get_one::<i64>("id").copied().unwrap_or_default())
}

fn parse_matches(matches: &ArgMatches) -> CliArgs {
    let output = OutputFlags {
        json: matches.get_flag("json"),
        markdown: matches.get_flag("markdown"),
        pretty: matches.get_flag("pretty"),
    };

    let command = match matches.subcommand() {
        Some(("help", sub_m)) => CommandKind::Help {
            all: sub_m.get_flag("all"),
            command: text_arg(sub_m, "command"),
        },
        Some(("status", _)) => CommandKind::Status,
        Some(("locks", sub_m)) => CommandKind::Locks(LocksArgs {
            input: path_arg(sub_m, "input"),
            database_filter: text_arg(sub_m, "db-filter"),
            csv: path_arg(sub_m, "csv"),
            table: sub_m.get_flag("table"),
        }),
        Some(("lock-items", sub_m)) => CommandKind::LockItems(LockItemsArgs {
            id: id_value(sub_m),
            role: sub_m
                .get_one::<String>("role")
                .and_then(|role| LockKeyRole::parse(role))
                .unwrap_or(LockKeyRole::Waiter),
            input: path_arg(sub_m, "input"),
        }),
        Some(("sessions", sub_m)) => CommandKind::Sessions(SessionsArgs {
            database: text_arg(sub_m, "db-filter"),
            login: text_arg(sub_m, "login"),
            host: text_arg(sub_m, "host"),
            status: text_arg(sub_m, "status"),
            blocked: sub_m.get_flag("blocked"),
            limit: sub_m.get_one::<u64>("limit").copied(),
        }),
        Some(("kill", sub_m)) => CommandKind::Kill(KillArgs {
            id: id_value(sub_m),
            dry_run: sub_m.get_flag("dry-run"),
        }),
        Some(("init", sub_m)) => CommandKind::Init(InitArgs {
            path: path_arg(sub_m, "path"),
            force: sub_m.get_flag("force"),
        }),
        Some(("config", _)) => CommandKind::Config,
        Some(("completions", sub_m)) => CommandKind::Completions(CompletionsArgs {
            shell: text_arg(sub_m, "shell"),
        }),
        _ => CommandKind::Help {
            all: false,
            command: None,
        },
    };

    CliArgs {
        config_path: path_arg(matches, "config"),
        env_file: path_arg(matches, "env-file"),
        profile: text_arg(matches, "profile"),
        server: text_arg(matches, "server"),
        port: matches.get_one::<u16>("port").copied(),
        database: text_arg(matches, "database"),
        user: text_arg(matches, "user"),
        password: text_arg(matches, "password"),
        timeout_ms: matches.get_one::<u64>("timeout").copied(),
        allow_write: matches.get_flag("allow-write"),
        encrypt: matches.get_one::<bool>("encrypt").copied(),
        trust_cert: matches.get_one::<bool>("trust-cert").copied(),
        output,
        verbose: matches.get_count("verbose"),
        quiet: matches.get_flag("quiet"),
        command,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> CliArgs {
        let matches = build_cli(false)
            .try_get_matches_from(argv)
            .expect("valid arguments");
        parse_matches(&matches)
    }

    #[test]
    fn cli_definition_is_consistent() {
        build_cli(true).debug_assert();
    }

    #[test]
    fn parses_locks_with_globals_after_subcommand() {
        let args = parse(&[
            "lockgraph", "locks", "--input", "locks.csv", "--table", "--json", "--port", "1500",
        ]);
        assert!(args.output.json);
        assert_eq!(args.port, Some(1500));
        assert_eq!(
            args.command,
            CommandKind::Locks(LocksArgs {
                input: Some(PathBuf::from("locks.csv")),
                table: true,
                ..LocksArgs::default()
            })
        );
    }

    #[test]
    fn lock_items_role_defaults_to_waiter() {
        let args = parse(&["lockgraph", "lock-items", "--id", "52"]);
        assert_eq!(
            args.command,
            CommandKind::LockItems(LockItemsArgs {
                id: LockId(52),
                role: LockKeyRole::Waiter,
                input: None,
            })
        );
        let args = parse(&["lockgraph", "items", "--id", "52", "--role", "holder"]);
        assert!(matches!(
            args.command,
            CommandKind::LockItems(LockItemsArgs {
                role: LockKeyRole::Holder,
                ..
            })
        ));
    }

    #[test]
    fn kill_requires_an_id() {
        assert!(build_cli(false)
            .try_get_matches_from(["lockgraph", "kill"])
            .is_err());
        let args = parse(&["lockgraph", "kill", "--id", "61", "--dry-run", "--allow-write"]);
        assert!(args.allow_write);
        assert_eq!(
            args.command,
            CommandKind::Kill(KillArgs {
                id: LockId(61),
                dry_run: true,
            })
        );
    }
}
