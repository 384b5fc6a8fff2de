mod common;
mod completions;
mod config;
mod help;
mod init;
mod kill;
mod lock_items;
mod locks;
mod sessions;
mod status;

use anyhow::Result;

use crate::cli::{CliArgs, CommandKind};

pub fn dispatch(args: &CliArgs) -> Result<()> {
    match &args.command {
        CommandKind::Help { all, command } => help::run(*all, command.as_deref()),
        CommandKind::Status => status::run(args),
        CommandKind::Locks(cmd) => locks::run(args, cmd),
        CommandKind::LockItems(cmd) => lock_items::run(args, cmd),
        CommandKind::Sessions(cmd) => sessions::run(args, cmd),
        CommandKind::Kill(cmd) => kill::run(args, cmd),
        CommandKind::Init(cmd) => init::run(args, cmd),
        CommandKind::Config => config::run(args),
        CommandKind::Completions(cmd) => completions::run(cmd),
    }
}
