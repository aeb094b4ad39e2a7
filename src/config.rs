//! Translation configuration (spec.md §6, expanded in SPEC_FULL.md §6.3).
//!
//! # Example
//!
//! ```rust
//! use compi::CompilerConfig;
//!
//! let config = CompilerConfig::new()
//!     .with_colored_diagnostics(true)
//!     .with_print_ast(true);
//! assert!(config.colored_diagnostics());
//! ```

/// Options that shape one translation run. Library consumers build one
/// with the fluent `with_*` methods; the CLI builds one from argv and the
/// terminal's color capability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerConfig {
    colored_diagnostics: bool,
    print_ast: bool,
}

impl CompilerConfig {
    pub fn new() -> Self {
        CompilerConfig::default()
    }

    /// Enable ANSI color codes in rendered diagnostics. Off by default —
    /// the CLI turns this on only when stderr is a terminal.
    pub fn with_colored_diagnostics(mut self, colored: bool) -> Self {
        self.colored_diagnostics = colored;
        self
    }

    /// Print the parsed AST before codegen runs, mirroring the `debug-ast`
    /// Cargo feature for library consumers who don't want a feature-gated
    /// rebuild.
    pub fn with_print_ast(mut self, print_ast: bool) -> Self {
        self.print_ast = print_ast;
        self
    }

    pub fn colored_diagnostics(&self) -> bool {
        self.colored_diagnostics
    }

    pub fn print_ast(&self) -> bool {
        self.print_ast
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_off() {
        let config = CompilerConfig::new();
        assert!(!config.colored_diagnostics());
        assert!(!config.print_ast());
    }

    #[test]
    fn builder_sets_both_flags() {
        let config = CompilerConfig::new()
            .with_colored_diagnostics(true)
            .with_print_ast(true);
        assert!(config.colored_diagnostics());
        assert!(config.print_ast());
    }
}
