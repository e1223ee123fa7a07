use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde_json::{json, Value};
use std::io::{self, IsTerminal, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notice {
    Success,
    Info,
    Warning,
    Error,
}

impl Notice {
    fn kind(self) -> &'static str {
        match self {
            Notice::Success => "success",
            Notice::Info => "info",
            Notice::Warning => "warning",
            Notice::Error => "error",
        }
    }
}

/// Where command results go: colored lines and tables for people, one JSON document per
/// message otherwise. Errors bypass `--quiet`.
pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Spinners and terminal titles only make sense for a person watching a terminal.
    pub fn is_interactive_terminal(&self) -> bool {
        self.is_human() && !self.quiet && io::stdout().is_terminal()
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        self.notice(Notice::Success, msg.as_ref());
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.notice(Notice::Info, msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.notice(Notice::Warning, msg.as_ref());
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        self.notice(Notice::Error, msg.as_ref());
    }

    /// A result document (search page, detail, watched list). Human mode prints it raw.
    pub fn json(&self, data: &Value) {
        if self.quiet && !self.is_human() {
            return;
        }
        self.write_json(data);
    }

    /// Prompt text without a newline. Only shown to people.
    pub fn prompt(&self, msg: impl AsRef<str>) -> io::Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }
        print!("{}", msg.as_ref());
        io::stdout().flush()
    }

    fn notice(&self, notice: Notice, msg: &str) {
        if self.quiet && notice != Notice::Error {
            return;
        }

        if !self.is_human() {
            self.write_json(&json!({ "type": notice.kind(), "message": msg }));
            return;
        }

        match notice {
            Notice::Success => println!("{} {}", "✓".green(), msg),
            Notice::Info => println!("{}", msg),
            Notice::Warning => println!("{} {}", "⚠".yellow(), msg),
            Notice::Error => eprintln!("{} {}", "✗".red(), msg),
        }
    }

    fn write_json(&self, data: &Value) {
        let text = match self.format {
            OutputFormat::JsonPretty => serde_json::to_string_pretty(data),
            OutputFormat::Json | OutputFormat::Human => serde_json::to_string(data),
        };
        println!("{}", text.unwrap_or_default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_kinds_match_json_type_field() {
        assert_eq!(Notice::Success.kind(), "success");
        assert_eq!(Notice::Info.kind(), "info");
        assert_eq!(Notice::Warning.kind(), "warning");
        assert_eq!(Notice::Error.kind(), "error");
    }

    #[test]
    fn test_json_formats_are_not_interactive() {
        let output = Output::new(OutputFormat::JsonPretty, false);
        assert!(!output.is_human());
        assert!(!output.is_interactive_terminal());
        assert!(!Output::new(OutputFormat::Human, true).is_interactive_terminal());
    }
}
