use comfy_table::{presets, ContentArrangement, Table};

use crate::config::OutputFormat;

pub const NULL_DISPLAY: &str = "—";
const ELLIPSIS: &str = "…";
const DEFAULT_MAX_CELL_WIDTH: usize = 140;
const DEFAULT_MAX_OUTPUT_CHARS: usize = 25_000;

#[derive(Debug, Clone)]
pub struct TableOptions {
    pub max_cell_width: usize,
    pub max_output_chars: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            max_cell_width: DEFAULT_MAX_CELL_WIDTH,
            max_output_chars: DEFAULT_MAX_OUTPUT_CHARS,
        }
    }
}

fn new_table(format: OutputFormat) -> Table {
    let mut table = Table::new();
    match format {
        OutputFormat::Markdown => {
            table.load_preset(presets::ASCII_MARKDOWN);
        }
        _ => {
            table.load_preset(presets::UTF8_FULL);
        }
    }
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Render rows of optional cells; `None` shows as an em dash.
pub fn render_rows(
    headers: &[&str],
    rows: &[Vec<Option<String>>],
    format: OutputFormat,
    options: &TableOptions,
) -> String {
    let mut table = new_table(format);
    table.set_header(headers.to_vec());
    for row in rows {
        let cells = row
            .iter()
            .map(|cell| match cell {
                Some(value) => truncate_string(value, options.max_cell_width),
                None => NULL_DISPLAY.to_string(),
            })
            .collect::<Vec<_>>();
        table.add_row(cells);
    }
    truncate_output(table.to_string(), options.max_output_chars)
}

pub fn render_key_value_table(
    title: &str,
    rows: &[(String, String)],
    format: OutputFormat,
    options: &TableOptions,
) -> String {
    let mut table = new_table(format);
    table.set_header(vec![title.to_string(), "Value".to_string()]);

    for (key, value) in rows {
        let key = truncate_string(key, options.max_cell_width);
        let value = truncate_string(value, options.max_cell_width);
        table.add_row(vec![key, value]);
    }

    truncate_output(table.to_string(), options.max_output_chars)
}

/// Digits grouped by thousands, e.g. `12,500`.
pub fn format_number(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn truncate_string(input: &str, max_len: usize) -> String {
    let len = input.chars().count();
    if len <= max_len {
        return input.to_string();
    }
    if max_len <= 1 {
        return ELLIPSIS.to_string();
    }
    let truncated: String = input.chars().take(max_len - 1).collect();
    format!("{}{}", truncated, ELLIPSIS)
}

pub fn truncate_output(output: String, max_len: usize) -> String {
    if output.len() <= max_len {
        return output;
    }
    let mut truncated = output.chars().take(max_len).collect::<String>();
    truncated.push_str("\n[output truncated]");
    truncated
}
