#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Blocking chain 51 <- 52 <- 54, 51 <- 53, plus an idle session 60.
pub const LOCKS_CSV: &str = "\
id,holderId,login,host,database,waitType,waitTimeMs,resourceType,lockMode,objectName
51,,etl,batch01,sales,,,OBJECT,X,dbo.orders
52,51,web,app01,sales,LCK_M_S,12500,KEY,S,dbo.orders
52,51,web,app01,sales,LCK_M_S,12500,PAGE,IS,dbo.orders
53,51,report,bi01,sales,LCK_M_IS,800,OBJECT,IS,dbo.orders
54,52,web,app02,sales,LCK_M_U,90,KEY,U,dbo.customers
60,0,idle,app03,sales,,,,,
";

pub fn integration_enabled() -> bool {
    env::var("LOCKGRAPH_INTEGRATION_TESTS")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// The binary, run from `dir` so no stray `.env` or config file is picked up.
pub fn lockgraph_in(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("lockgraph");
    cmd.current_dir(dir)
        .env_remove("LOCKGRAPH_CONFIG")
        .env_remove("LOCKGRAPH_FORMAT")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

pub fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

pub fn run_json<I, S>(args: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = cargo_bin_cmd!("lockgraph");
    cmd.args(args);
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("json")
}
