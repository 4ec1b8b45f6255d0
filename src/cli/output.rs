//! CLI output formatting.
//!
//! Everything the `dsc` binary prints goes through [`OutputFormatter`], which
//! renders either human-readable text or JSON.

use console::style;
use serde::Serialize;

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT FORMAT
// ═══════════════════════════════════════════════════════════════════════════════

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Single-line JSON
    Json,
    /// Indented JSON
    JsonPretty,
}

impl OutputFormat {
    /// True for either JSON variant
    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::JsonPretty)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Ok(OutputFormat::JsonPretty),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT FORMATTER
// ═══════════════════════════════════════════════════════════════════════════════

/// Output formatter for CLI
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    format: OutputFormat,
    color: bool,
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

impl OutputFormatter {
    /// Create new formatter
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled(),
        }
    }

    /// Disable color
    pub fn without_color(mut self) -> Self {
        self.color = false;
        self
    }

    /// Get format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Print success message
    pub fn success(&self, message: &str) {
        println!("{}", self.render_status("success", message));
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.render_status("error", message));
    }

    /// Print info message
    pub fn info(&self, message: &str) {
        println!("{}", self.render_status("info", message));
    }

    /// Print any serializable value
    pub fn data<T: Serialize>(&self, data: &T) {
        if let Some(rendered) = self.render_data(data) {
            println!("{}", rendered);
        }
    }

    /// Print a table; JSON formats print one object per row
    pub fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        println!("{}", self.render_table(headers, rows));
    }

    /// Status line for `kind` (success, error, info)
    pub fn render_status(&self, kind: &str, message: &str) -> String {
        if self.format.is_json() {
            let json = serde_json::json!({ "status": kind, "message": message });
            return self.to_json(&json).unwrap_or_default();
        }

        let (icon, plain) = match kind {
            "success" => ("✓", "OK"),
            "error" => ("✗", "ERROR"),
            _ => ("ℹ", "INFO"),
        };
        if !self.color {
            return format!("{}: {}", plain, message);
        }
        let icon = match kind {
            "success" => style(icon).green(),
            "error" => style(icon).red(),
            _ => style(icon).blue(),
        };
        format!("{} {}", icon, message)
    }

    /// Render a value as JSON or as indented `key: value` lines
    pub fn render_data<T: Serialize>(&self, data: &T) -> Option<String> {
        let json = serde_json::to_value(data).ok()?;
        if self.format.is_json() {
            return self.to_json(&json);
        }
        let mut lines = Vec::new();
        self.text_lines(&json, 0, &mut lines);
        Some(lines.join("\n"))
    }

    /// Render a table as aligned text or as JSON rows
    pub fn render_table(&self, headers: &[&str], rows: &[Vec<String>]) -> String {
        if self.format.is_json() {
            let objects: Vec<serde_json::Map<String, serde_json::Value>> = rows
                .iter()
                .map(|row| {
                    headers
                        .iter()
                        .zip(row)
                        .map(|(h, v)| (h.to_string(), serde_json::Value::String(v.clone())))
                        .collect()
                })
                .collect();
            return self.to_json(&objects).unwrap_or_default();
        }

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let pad = |cells: Vec<String>| -> String {
            cells
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let width = widths.get(i).copied().unwrap_or(0);
                    format!("{:width$}", cell, width = width)
                })
                .collect::<Vec<_>>()
                .join(" | ")
        };

        let header = pad(headers.iter().map(|h| h.to_string()).collect());
        let mut out = vec![if self.color {
            style(header).bold().to_string()
        } else {
            header
        }];
        out.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
        for row in rows {
            out.push(pad(row.clone()));
        }
        out.join("\n")
    }

    fn to_json<T: Serialize>(&self, data: &T) -> Option<String> {
        let output = if matches!(self.format, OutputFormat::JsonPretty) {
            serde_json::to_string_pretty(data)
        } else {
            serde_json::to_string(data)
        };
        output.ok()
    }

    fn text_lines(&self, json: &serde_json::Value, indent: usize, out: &mut Vec<String>) {
        let prefix = "  ".repeat(indent);

        match json {
            serde_json::Value::Object(map) => {
                for (key, value) in map {
                    let key = if self.color {
                        style(key).bold().to_string()
                    } else {
                        key.clone()
                    };
                    match value {
                        serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                            out.push(format!("{}{}:", prefix, key));
                            self.text_lines(value, indent + 1, out);
                        }
                        _ => out.push(format!("{}{}: {}", prefix, key, format_value(value))),
                    }
                }
            }
            serde_json::Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    out.push(format!("{}[{}]:", prefix, i));
                    self.text_lines(item, indent + 1, out);
                }
            }
            _ => out.push(format!("{}{}", prefix, format_value(json))),
        }
    }
}

/// Format a JSON value for text output
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null".into(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
