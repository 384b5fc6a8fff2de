//! On-disk config file shape (YAML or JSON, camelCase keys).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub default_profile: Option<String>,
    pub settings: Option<Settings>,
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Settings may appear at the top level and again inside a profile; the
/// profile's values win.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub allow_write_default: Option<bool>,
    pub output: Option<OutputSettings>,
    pub locks: Option<LockSettings>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OutputSettings {
    pub default_format: Option<OutputFormat>,
    pub json: Option<JsonSettings>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct JsonSettings {
    pub pretty: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LockSettings {
    pub view: Option<LockView>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    /// Name of an environment variable holding the password.
    pub password_env: Option<String>,
    pub password: Option<String>,
    pub encrypt: Option<bool>,
    pub trust_cert: Option<bool>,
    /// Connect timeout in milliseconds.
    pub timeout: Option<u64>,
    pub settings: Option<Settings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Pretty,
    #[serde(alias = "md")]
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Pretty => "pretty",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
        }
    }

    /// Case-insensitive, accepts `md` for markdown.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(OutputFormat::Pretty),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// How `locks` renders the graph when neither `--table` nor JSON is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LockView {
    #[default]
    Tree,
    Table,
}

impl LockView {
    pub fn as_str(self) -> &'static str {
        match self {
            LockView::Tree => "tree",
            LockView::Table => "table",
        }
    }
}
