pub mod csv;
pub mod json;
pub mod table;
pub mod tree;

use std::io::IsTerminal;

use crate::cli::OutputFlags;
use crate::config::{OutputFormat, SettingsResolved};

pub use table::TableOptions;

/// Explicit flags first (`--json` beats `--markdown` beats `--pretty`), then the
/// configured default on a terminal. Piped output falls back to markdown.
pub fn select_format(flags: &OutputFlags, settings: &SettingsResolved) -> OutputFormat {
    flag_format(flags).unwrap_or_else(|| {
        if std::io::stdout().is_terminal() {
            settings.output.default_format
        } else {
            OutputFormat::Markdown
        }
    })
}

fn flag_format(flags: &OutputFlags) -> Option<OutputFormat> {
    [
        (flags.json, OutputFormat::Json),
        (flags.markdown, OutputFormat::Markdown),
        (flags.pretty, OutputFormat::Pretty),
    ]
    .into_iter()
    .find_map(|(set, format)| set.then_some(format))
}
