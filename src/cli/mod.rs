mod args;

pub use args::{
    build_cli, CliArgs, CommandKind, CompletionsArgs, InitArgs, KillArgs, LockItemsArgs,
    LocksArgs, OutputFlags, SessionsArgs,
};

pub fn parse() -> CliArgs {
    args::parse_args()
}
