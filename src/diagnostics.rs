//! Structured diagnostic reporting: severity/category/location errors with
//! optional hints and suggestions, plus process-wide-style error/warning
//! counters threaded explicitly through the pipeline (spec.md §4.1, §9).

use std::fmt::Write as _;

/// Severity of a reported diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// Which pipeline stage produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Lexer,
    Parser,
    Semantic,
    Codegen,
    General,
}

impl Category {
    fn label(self) -> &'static str {
        match self {
            Category::Lexer => "Lexer",
            Category::Parser => "Parser",
            Category::Semantic => "Semantic",
            Category::Codegen => "Codegen",
            Category::General => "General",
        }
    }
}

/// Where a diagnostic points. `column == 0` means "no caret is drawn"
/// (spec.md §9 Open Question, resolved in that direction).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub filename: Option<String>,
    pub line: usize,
    pub column: usize,
    pub source_line: Option<String>,
}

impl Location {
    pub fn line(line: usize) -> Self {
        Location {
            filename: None,
            line,
            column: 0,
            source_line: None,
        }
    }

    pub fn new(filename: impl Into<String>, line: usize, column: usize) -> Self {
        Location {
            filename: Some(filename.into()),
            line,
            column,
            source_line: None,
        }
    }

    pub fn with_source_line(mut self, text: impl Into<String>) -> Self {
        self.source_line = Some(text.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub category: Category,
    pub location: Location,
    pub code: Option<String>,
    pub message: String,
    pub hint: Option<String>,
    pub suggestion: Option<String>,
}

const ESC: &str = "\u{1b}[";

impl Diagnostic {
    fn color(&self) -> &'static str {
        match self.severity {
            Severity::Info => "36",    // cyan
            Severity::Warning => "33", // yellow
            Severity::Error => "31",   // red
        }
    }

    /// Render this diagnostic as the multi-line text described in spec.md §4.1.
    pub fn render(&self, colored: bool) -> String {
        let mut out = String::new();

        let mut header = String::new();
        if let Some(code) = &self.code {
            write!(header, "[{}] ", code).ok();
        }
        if let Some(filename) = &self.location.filename {
            write!(header, "{}:{}", filename, self.location.line).ok();
            if self.location.column > 0 {
                write!(header, ":{}", self.location.column).ok();
            }
            header.push_str(": ");
        } else {
            write!(header, "line {}: ", self.location.line).ok();
        }
        out.push_str(&header);

        if colored {
            write!(
                out,
                "{}{}m{}[{}]{}0m: {}",
                ESC,
                self.color(),
                self.severity.label(),
                self.category.label(),
                ESC,
                self.message
            )
            .ok();
        } else {
            write!(
                out,
                "{}[{}]: {}",
                self.severity.label(),
                self.category.label(),
                self.message
            )
            .ok();
        }

        if let Some(src) = &self.location.source_line {
            out.push('\n');
            out.push_str(src);
            if self.location.column > 0 {
                out.push('\n');
                for _ in 1..self.location.column {
                    out.push(' ');
                }
                out.push('^');
            }
        }

        if let Some(hint) = &self.hint {
            write!(out, "\nhint: {}", hint).ok();
        }
        if let Some(suggestion) = &self.suggestion {
            if suggestion.contains(' ') {
                write!(out, "\nhelp: {}", suggestion).ok();
            } else {
                write!(out, "\nhelp: did you mean '{}'?", suggestion).ok();
            }
        }

        out
    }
}

/// Collects diagnostics for one translation unit and tracks error/warning
/// counts. Owned explicitly and threaded through the parser and codegen
/// rather than kept as process-wide global state (spec.md §9).
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    colored: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn with_colored(colored: bool) -> Self {
        Diagnostics {
            colored,
            ..Diagnostics::default()
        }
    }

    pub fn log_info(&mut self, category: Category, line: usize, message: &str) {
        self.report(Severity::Info, category, Location::line(line), None, message);
    }

    pub fn log_warning(&mut self, category: Category, line: usize, message: &str) {
        self.report(
            Severity::Warning,
            category,
            Location::line(line),
            None,
            message,
        );
    }

    pub fn log_error(&mut self, category: Category, line: usize, message: &str) {
        self.report(
            Severity::Error,
            category,
            Location::line(line),
            None,
            message,
        );
    }

    /// The extended reporter: full location, optional error code, severity,
    /// category, and message.
    pub fn report_ex(
        &mut self,
        severity: Severity,
        category: Category,
        location: Location,
        code: Option<&str>,
        message: &str,
    ) {
        self.report(severity, category, location, code, message);
    }

    fn report(
        &mut self,
        severity: Severity,
        category: Category,
        location: Location,
        code: Option<&str>,
        message: &str,
    ) {
        match severity {
            Severity::Warning => self.warning_count += 1,
            Severity::Error => self.error_count += 1,
            Severity::Info => {}
        }
        self.entries.push(Diagnostic {
            severity,
            category,
            location,
            code: code.map(str::to_string),
            message: message.to_string(),
            hint: None,
            suggestion: None,
        });
    }

    /// Attach a hint to the most recently reported diagnostic.
    pub fn add_hint(&mut self, text: impl Into<String>) {
        if let Some(last) = self.entries.last_mut() {
            last.hint = Some(text.into());
        }
    }

    /// Attach a suggestion to the most recently reported diagnostic.
    pub fn add_suggestion(&mut self, text: impl Into<String>) {
        if let Some(last) = self.entries.last_mut() {
            last.suggestion = Some(text.into());
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn reset_counters(&mut self) {
        self.error_count = 0;
        self.warning_count = 0;
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Render every diagnostic, one per line (plus any caret/hint/help lines),
    /// in the order they were reported (which is source order, per spec.md §7).
    pub fn render_all(&self) -> String {
        let mut out = String::new();
        for d in &self.entries {
            out.push_str(&d.render(self.colored));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_follow_severity() {
        let mut d = Diagnostics::new();
        d.log_info(Category::General, 1, "note");
        d.log_warning(Category::General, 2, "warn");
        d.log_error(Category::General, 3, "err");
        assert_eq!(d.warning_count(), 1);
        assert_eq!(d.error_count(), 1);
        assert!(d.has_errors());

        d.reset_counters();
        assert_eq!(d.warning_count(), 0);
        assert_eq!(d.error_count(), 0);
        assert!(!d.has_errors());
    }

    #[test]
    fn s4_diagnostic_rendering() {
        let mut d = Diagnostics::new();
        let loc = Location::new("main.c", 10, 9).with_source_line("int x = 5");
        d.report_ex(
            Severity::Error,
            Category::Parser,
            loc,
            None,
            "Expected ';' after expression",
        );
        let rendered = d.render_all();
        assert!(rendered.contains("main.c:10:9:"));
        assert!(rendered.contains("int x = 5"));
        assert!(!rendered.contains("\u{1b}["));
    }

    #[test]
    fn s5_hint_and_suggestion() {
        let mut d = Diagnostics::new();
        d.log_error(Category::Parser, 1, "unknown word 'retrun'");
        d.add_hint("Check spelling");
        d.add_suggestion("return");
        let rendered = d.render_all();
        assert!(rendered.contains("hint: Check spelling"));
        assert!(rendered.contains("help: did you mean 'return'?"));
    }

    #[test]
    fn column_zero_suppresses_caret() {
        let mut d = Diagnostics::new();
        d.log_error(Category::Lexer, 4, "bad");
        let rendered = d.render_all();
        assert!(!rendered.contains('^'));
    }

    #[test]
    fn colored_output_has_no_escapes_when_disabled() {
        let mut d = Diagnostics::with_colored(false);
        d.log_warning(Category::Codegen, 1, "unsupported node");
        assert!(!d.render_all().contains("\u{1b}["));
    }
}
