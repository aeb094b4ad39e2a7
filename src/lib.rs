//! `compi`: a source-to-source translator from a small subset of C to VHDL.
//!
//! The pipeline is a sequential read: [`lexer`] turns bytes into tokens,
//! [`parser`] builds an [`ast::Ast`] while consulting [`symbols`], and
//! [`codegen`] walks the tree to produce VHDL text, consulting the same
//! symbol tables and reporting through [`diagnostics`]. Nothing here is
//! global or process-wide — every pipeline stage takes its state
//! explicitly, so translating twice in one process needs nothing more
//! than two fresh calls to [`translate_str`].
//!
//! ```rust
//! use compi::{translate_str, CompilerConfig};
//!
//! let result = translate_str("int add(int a, int b) { return a + b; }", &CompilerConfig::new());
//! assert!(!result.diagnostics.has_errors());
//! assert!(result.vhdl.contains("entity add is"));
//! ```

pub mod ast;
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod symbols;
pub mod token;
pub mod vhdl_types;

pub use ast::{Ast, NodeId, NodeKind};
pub use config::CompilerConfig;
pub use diagnostics::{Category, Diagnostic, Diagnostics, Location, Severity};
pub use symbols::{ArrayTable, Field, StructTable};

/// The output of one translation: the emitted VHDL text (possibly partial,
/// if codegen degraded unsupported constructs to comments) plus every
/// diagnostic collected along the way.
#[derive(Debug)]
pub struct TranslationResult {
    pub vhdl: String,
    pub diagnostics: Diagnostics,
    pub arrays: ArrayTable,
    pub structs: StructTable,
    /// `false` when `parse_program` returned `None` (spec.md §6: an empty
    /// or catastrophically malformed token stream), the CLI's third exit
    /// condition distinct from `has_errors()`.
    pub parsed: bool,
}

/// Translate one in-memory C source string to VHDL, per `config`.
///
/// Mirrors the teacher's `compile_file_with_config` shape: parse, then
/// (optionally) print the AST, then generate. Never panics on malformed
/// input — parser and codegen errors land in `result.diagnostics` instead.
pub fn translate_str(source: &str, config: &CompilerConfig) -> TranslationResult {
    let mut diagnostics = Diagnostics::with_colored(config.colored_diagnostics());
    let mut arrays = ArrayTable::new();
    let mut structs = StructTable::new();

    let ast = parser::parse_program(source, &mut diagnostics, &mut arrays, &mut structs);
    let parsed = ast.is_some();

    let vhdl = match &ast {
        None => String::new(),
        Some(ast) => {
            if config.print_ast() || cfg!(feature = "debug-ast") {
                if let Some(root) = ast.root() {
                    let mut tree = String::new();
                    ast.print_tree(root, 0, &mut tree);
                    print!("{}", tree);
                }
            }
            codegen::generate_vhdl(ast, &mut diagnostics, &arrays, &structs)
        }
    };

    TranslationResult { vhdl, diagnostics, arrays, structs, parsed }
}

/// Translate a C source file on disk to a VHDL file on disk, per `config`.
///
/// Returns `Err` only for I/O failures (spec.md §7's `GENERAL` category);
/// compiler diagnostics are never surfaced as `Err` — inspect
/// `result.diagnostics` instead, the same way `translate_str` works.
pub fn translate(
    input_path: &std::path::Path,
    output_path: &std::path::Path,
    config: &CompilerConfig,
) -> Result<TranslationResult, String> {
    let source = std::fs::read_to_string(input_path)
        .map_err(|e| format!("failed to read '{}': {}", input_path.display(), e))?;
    let result = translate_str(&source, config);
    std::fs::write(output_path, &result.vhdl)
        .map_err(|e| format!("failed to write '{}': {}", output_path.display(), e))?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_str_reports_no_tree_for_empty_input() {
        let result = translate_str("", &CompilerConfig::new());
        assert!(result.vhdl.is_empty());
        assert!(!result.diagnostics.has_errors());
    }

    #[test]
    fn translate_str_is_reentrant() {
        let config = CompilerConfig::new();
        let a = translate_str("int f() { return 1; }", &config);
        let b = translate_str("int g() { return 2; }", &config);
        assert!(a.vhdl.contains("entity f"));
        assert!(b.vhdl.contains("entity g"));
        assert!(!a.vhdl.contains("entity g"));
    }
}
