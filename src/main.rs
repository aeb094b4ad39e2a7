//! `compi` CLI: `compi <input.c> <output.vhdl>` (spec.md §6).
//!
//! Argument parsing is a minimal hand-rolled argv walk rather than a
//! `clap` derive — the contract here is pinned exactly (a fixed usage
//! line, specific exit-code triggers) and a general-purpose parser would
//! fight that contract more than help with it.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use compi::{translate, CompilerConfig};

fn usage(program: &str) -> String {
    format!("usage: {} <input.c> <output.vhdl>", program)
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("compi");

    if args.len() < 3 {
        println!("{}", usage(program));
        process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let output_path = PathBuf::from(&args[2]);

    let config = CompilerConfig::new()
        .with_colored_diagnostics(std::io::stderr().is_terminal())
        .with_print_ast(cfg!(feature = "debug-ast"));

    let result = match translate(&input_path, &output_path, &config) {
        Ok(result) => result,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(1);
        }
    };

    eprint!("{}", result.diagnostics.render_all());

    if !result.parsed || result.diagnostics.has_errors() {
        process::exit(1);
    }
}
