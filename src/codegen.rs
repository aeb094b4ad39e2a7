//! AST-to-VHDL lowering: entity synthesis, process body, expression
//! printer (spec.md §4.6).
//!
//! Codegen never mutates the AST. An unrecognized node kind degrades to a
//! `-- unsupported: <kind>` comment plus a `CODEGEN` diagnostic so the rest
//! of the output stays syntactically parseable text.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::ast::{Ast, NodeId, NodeKind};
use crate::diagnostics::{Category, Diagnostics, Location, Severity};
use crate::symbols::{ArrayTable, StructTable};
use crate::token::is_negative_literal;
use crate::vhdl_types::{self, VhdlType, DEFAULT_WIDTH};

fn translate_binary_op(op: &str) -> &str {
    match op {
        "&&" => "and",
        "||" => "or",
        "&" => "and",
        "|" => "or",
        "^" => "xor",
        "<<" => "sll",
        ">>" => "srl",
        "==" => "=",
        "!=" => "/=",
        other => other,
    }
}

fn translate_unary_op(op: &str) -> &str {
    match op {
        "!" | "~" => "not",
        other => other,
    }
}

pub struct Codegen<'a> {
    ast: &'a Ast,
    diagnostics: &'a mut Diagnostics,
    #[allow(dead_code)]
    arrays: &'a ArrayTable,
    #[allow(dead_code)]
    structs: &'a StructTable,
    out: String,
    /// Signal/port widths in scope for the function currently being emitted.
    widths: HashMap<String, u32>,
    return_width: u32,
}

impl<'a> Codegen<'a> {
    pub fn new(
        ast: &'a Ast,
        diagnostics: &'a mut Diagnostics,
        arrays: &'a ArrayTable,
        structs: &'a StructTable,
    ) -> Self {
        Codegen {
            ast,
            diagnostics,
            arrays,
            structs,
            out: String::new(),
            widths: HashMap::new(),
            return_width: DEFAULT_WIDTH,
        }
    }

    /// `generate_vhdl(program_ast, sink)` from spec.md §4.6.
    pub fn generate(mut self) -> String {
        let root = match self.ast.root() {
            Some(r) => r,
            None => return self.out,
        };
        writeln!(self.out, "library IEEE;").ok();
        writeln!(self.out, "use IEEE.std_logic_1164.all;").ok();
        writeln!(self.out, "use IEEE.numeric_std.all;").ok();
        writeln!(self.out).ok();

        for &child in self.ast.children(root).to_vec().iter() {
            match self.ast.kind(child).clone() {
                NodeKind::Function { .. } => self.emit_function(child),
                NodeKind::StructDecl { name } => self.emit_struct_type(child, &name),
                NodeKind::VarDecl { name, .. } | NodeKind::ArrayDecl { name, .. } => {
                    self.diagnostics.log_info(
                        Category::Semantic,
                        self.ast.line(child),
                        &format!(
                            "global declaration '{}' has no VHDL representation in this translation scheme; skipped",
                            name
                        ),
                    );
                }
                other => self.unsupported(child, other.tag()),
            }
        }
        self.out
    }

    fn emit_struct_type(&mut self, node: NodeId, name: &str) {
        writeln!(self.out, "type {} is record", name).ok();
        for &field in self.ast.children(node).to_vec().iter() {
            if let NodeKind::StructField { name: fname, c_type } = self.ast.kind(field) {
                let vt = vhdl_types::map_scalar(c_type);
                writeln!(self.out, "    {} : {};", fname, vt.render()).ok();
            }
        }
        writeln!(self.out, "end record;").ok();
        writeln!(self.out).ok();
    }

    fn emit_function(&mut self, func: NodeId) {
        let (name, return_type) = match self.ast.kind(func) {
            NodeKind::Function { name, return_type } => (name.clone(), return_type.clone()),
            _ => unreachable!(),
        };
        let children = self.ast.children(func).to_vec();
        let params: Vec<NodeId> = children
            .iter()
            .copied()
            .filter(|&id| matches!(self.ast.kind(id), NodeKind::Param { .. }))
            .collect();
        let body = *children
            .iter()
            .rev()
            .find(|&&id| matches!(self.ast.kind(id), NodeKind::Block))
            .expect("function body is always parsed as the last child");

        let ret_vt = vhdl_types::map_scalar(&return_type);
        self.return_width = ret_vt.width();

        writeln!(self.out, "entity {} is", name).ok();
        let mut ports = Vec::new();
        for &p in &params {
            if let NodeKind::Param { name: pname, c_type } = self.ast.kind(p) {
                let vt = vhdl_types::map_scalar(c_type);
                ports.push(format!("{} : in {}", pname, vt.render()));
            }
        }
        if !matches!(ret_vt, VhdlType::Void) {
            ports.push(format!("result : out {}", ret_vt.render()));
        }
        if ports.is_empty() {
            writeln!(self.out, "port( );").ok();
        } else {
            writeln!(self.out, "port( {} );", ports.join("; ")).ok();
        }
        writeln!(self.out, "end entity;").ok();
        writeln!(self.out).ok();

        self.widths.clear();
        for &p in &params {
            if let NodeKind::Param { name: pname, c_type } = self.ast.kind(p) {
                self.widths.insert(pname.clone(), vhdl_types::map_scalar(c_type).width());
            }
        }
        for decl in self.collect_locals(body) {
            match self.ast.kind(decl) {
                NodeKind::VarDecl { name: dname, c_type } => {
                    self.widths.insert(dname.clone(), vhdl_types::map_scalar(c_type).width());
                }
                NodeKind::ArrayDecl { name: dname, c_type, .. } => {
                    self.widths.insert(dname.clone(), vhdl_types::map_scalar(c_type).width());
                }
                _ => {}
            }
        }

        writeln!(self.out, "architecture behavior of {} is", name).ok();
        for decl in self.collect_locals(body) {
            match self.ast.kind(decl).clone() {
                NodeKind::VarDecl { name: dname, c_type } => {
                    let vt = vhdl_types::map_scalar(&c_type);
                    writeln!(self.out, "signal {} : {};", dname, vt.render()).ok();
                }
                NodeKind::ArrayDecl { name: dname, c_type, size } => {
                    let vt = vhdl_types::map_array(&c_type, size);
                    writeln!(self.out, "signal {} : {};", dname, vt.render()).ok();
                }
                _ => {}
            }
        }
        writeln!(self.out, "begin").ok();
        writeln!(self.out, "process(all)").ok();
        writeln!(self.out, "begin").ok();
        self.emit_block_statements(body);
        writeln!(self.out, "end process;").ok();
        writeln!(self.out, "end behavior;").ok();
        writeln!(self.out).ok();
    }

    fn collect_locals(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_locals_into(node, &mut out);
        out
    }

    fn collect_locals_into(&self, node: NodeId, out: &mut Vec<NodeId>) {
        if matches!(self.ast.kind(node), NodeKind::VarDecl { .. } | NodeKind::ArrayDecl { .. }) {
            out.push(node);
        }
        for &child in self.ast.children(node) {
            self.collect_locals_into(child, out);
        }
    }

    fn emit_block_statements(&mut self, block: NodeId) {
        for &stmt in self.ast.children(block).to_vec().iter() {
            self.emit_stmt(stmt);
        }
    }

    fn emit_branch_body(&mut self, stmt: NodeId) {
        if matches!(self.ast.kind(stmt), NodeKind::Block) {
            self.emit_block_statements(stmt);
        } else {
            self.emit_stmt(stmt);
        }
    }

    fn emit_stmt(&mut self, stmt: NodeId) {
        match self.ast.kind(stmt).clone() {
            NodeKind::VarDecl { name, .. } => {
                if let Some(&init) = self.ast.children(stmt).first() {
                    let w = self.widths.get(&name).copied().unwrap_or(DEFAULT_WIDTH);
                    let expr = self.print_expr(init, w);
                    writeln!(self.out, "{} <= {};", name, expr).ok();
                }
            }
            NodeKind::ArrayDecl { .. } => {}
            NodeKind::Assignment { op } => self.emit_assignment(stmt, &op),
            NodeKind::If => self.emit_if(stmt),
            NodeKind::While => self.emit_while(stmt),
            NodeKind::For => self.emit_for(stmt),
            NodeKind::Return => self.emit_return(stmt),
            NodeKind::Break => {
                writeln!(self.out, "exit;").ok();
            }
            NodeKind::Continue => {
                writeln!(self.out, "next;").ok();
            }
            NodeKind::ExpressionStmt => {
                if let Some(&e) = self.ast.children(stmt).first() {
                    let expr = self.print_expr(e, DEFAULT_WIDTH);
                    writeln!(self.out, "{};", expr).ok();
                }
            }
            NodeKind::Block => self.emit_block_statements(stmt),
            other => self.unsupported(stmt, other.tag()),
        }
    }

    fn expr_base_name(&self, node: NodeId) -> String {
        match self.ast.kind(node) {
            NodeKind::Identifier { name } => name.clone(),
            NodeKind::ArrayAccess { name } => name.clone(),
            NodeKind::StructAccess { path } => path.split('.').next().unwrap_or("").to_string(),
            _ => String::new(),
        }
    }

    fn emit_assignment(&mut self, stmt: NodeId, op: &str) {
        let children = self.ast.children(stmt).to_vec();
        let (target, rhs) = (children[0], children[1]);
        let target_name = self.expr_base_name(target);
        let w = self.widths.get(&target_name).copied().unwrap_or(DEFAULT_WIDTH);
        let target_text = self.print_expr(target, w);
        let rhs_text = self.print_expr(rhs, w);
        let line = match op {
            "=" => format!("{} <= {};", target_text, rhs_text),
            "+=" => format!("{} <= ({} + {});", target_text, target_text, rhs_text),
            "-=" => format!("{} <= ({} - {});", target_text, target_text, rhs_text),
            "*=" => format!("{} <= ({} * {});", target_text, target_text, rhs_text),
            "/=" => format!("{} <= ({} / {});", target_text, target_text, rhs_text),
            _ => format!("{} <= {};", target_text, rhs_text),
        };
        writeln!(self.out, "{}", line).ok();
    }

    fn emit_if(&mut self, stmt: NodeId) {
        let children = self.ast.children(stmt).to_vec();
        let cond = self.print_expr(children[0], DEFAULT_WIDTH);
        writeln!(self.out, "if {} then", cond).ok();
        self.emit_branch_body(children[1]);
        if let Some(&else_node) = children.get(2) {
            writeln!(self.out, "else").ok();
            if let NodeKind::Else = self.ast.kind(else_node) {
                let inner = self.ast.children(else_node)[0];
                self.emit_branch_body(inner);
            }
        }
        writeln!(self.out, "end if;").ok();
    }

    fn emit_while(&mut self, stmt: NodeId) {
        let children = self.ast.children(stmt).to_vec();
        let cond = self.print_expr(children[0], DEFAULT_WIDTH);
        writeln!(self.out, "while {} loop", cond).ok();
        self.emit_branch_body(children[1]);
        writeln!(self.out, "end loop;").ok();
    }

    /// `for (init; cond; step) s` lowers as `init; while cond loop s; step;
    /// end loop;` (spec.md §4.6).
    fn emit_for(&mut self, stmt: NodeId) {
        let children = self.ast.children(stmt).to_vec();
        let (init, cond, step, body) = (children[0], children[1], children[2], children[3]);
        self.emit_branch_body(init);
        let cond_text = self.print_expr(cond, DEFAULT_WIDTH);
        writeln!(self.out, "while {} loop", cond_text).ok();
        self.emit_branch_body(body);
        self.emit_branch_body(step);
        writeln!(self.out, "end loop;").ok();
    }

    fn emit_return(&mut self, stmt: NodeId) {
        if let Some(&e) = self.ast.children(stmt).first() {
            let expr = self.print_expr(e, self.return_width);
            writeln!(self.out, "result <= {};", expr).ok();
        }
        writeln!(self.out, "return;").ok();
    }

    /// Recursive expression printer (spec.md §4.6). Every binary
    /// subexpression is unconditionally parenthesized; numeric literals
    /// print as `to_signed(<n>, W)` where `W` is the containing signal's
    /// width.
    fn print_expr(&mut self, node: NodeId, width: u32) -> String {
        match self.ast.kind(node).clone() {
            NodeKind::Literal { text } => {
                if crate::token::is_number(&text) {
                    format!("to_signed({}, {})", text, width)
                } else {
                    text
                }
            }
            NodeKind::Identifier { name } => name,
            NodeKind::ArrayAccess { name } => {
                let index = self.ast.children(node)[0];
                let index_text = self.print_expr(index, DEFAULT_WIDTH);
                format!("{}({})", name, index_text)
            }
            NodeKind::StructAccess { path } => path,
            NodeKind::UnaryOp { op } => {
                let operand = self.ast.children(node)[0];
                // Fold `-<number literal>` into a single negative literal,
                // per spec.md §4.5's "is negative literal" helper.
                if op == "-" {
                    if let NodeKind::Literal { text } = self.ast.kind(operand).clone() {
                        let folded = format!("-{}", text);
                        if crate::token::is_number(&text) && is_negative_literal(&folded) {
                            return format!("to_signed({}, {})", folded, width);
                        }
                    }
                }
                let operand_text = self.print_expr(operand, width);
                format!("({} {})", translate_unary_op(&op), operand_text)
            }
            NodeKind::BinaryOp { op } => {
                let children = self.ast.children(node).to_vec();
                let left = self.print_expr(children[0], width);
                let right = self.print_expr(children[1], width);
                format!("({} {} {})", left, translate_binary_op(&op), right)
            }
            NodeKind::FuncCall { name } => {
                let args: Vec<String> = self
                    .ast
                    .children(node)
                    .to_vec()
                    .iter()
                    .map(|&a| self.print_expr(a, DEFAULT_WIDTH))
                    .collect();
                format!("{}({})", name, args.join(", "))
            }
            other => {
                let line = self.ast.line(node);
                self.diagnostics.report_ex(
                    Severity::Error,
                    Category::Codegen,
                    Location::line(line),
                    None,
                    &format!("unsupported node kind: {}", other.tag()),
                );
                format!("-- unsupported: {}", other.tag())
            }
        }
    }

    fn unsupported(&mut self, node: NodeId, tag: &str) {
        let line = self.ast.line(node);
        self.diagnostics.report_ex(
            Severity::Error,
            Category::Codegen,
            Location::line(line),
            None,
            &format!("unsupported node kind: {}", tag),
        );
        writeln!(self.out, "-- unsupported: {}", tag).ok();
    }
}

/// `generate_vhdl(program_ast, sink)` from spec.md §4.6.
pub fn generate_vhdl(
    ast: &Ast,
    diagnostics: &mut Diagnostics,
    arrays: &ArrayTable,
    structs: &StructTable,
) -> String {
    Codegen::new(ast, diagnostics, arrays, structs).generate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_program;

    fn translate(src: &str) -> (String, Diagnostics) {
        let mut diags = Diagnostics::new();
        let mut arrays = ArrayTable::new();
        let mut structs = StructTable::new();
        let ast = parse_program(src, &mut diags, &mut arrays, &mut structs).unwrap();
        let vhdl = generate_vhdl(&ast, &mut diags, &arrays, &structs);
        (vhdl, diags)
    }

    #[test]
    fn s3_function_translation() {
        let (vhdl, diags) = translate("int add(int a, int b) { return a + b; }");
        assert!(!diags.has_errors());
        assert!(vhdl.contains(
            "entity add is\nport( a : in signed(31 downto 0); b : in signed(31 downto 0); result : out signed(31 downto 0) );\nend entity;"
        ));
        assert!(vhdl.contains("result <= (a + b);"));
        assert!(vhdl.contains("return;"));
    }

    #[test]
    fn void_function_has_no_result_port() {
        let (vhdl, _) = translate("void tick() { return; }");
        assert!(vhdl.contains("port( );"));
        assert!(!vhdl.contains("result"));
    }

    #[test]
    fn compound_assignment_expands_operator() {
        let (vhdl, _) = translate("int f(int a) { a += 1; return a; }");
        assert!(vhdl.contains("a <= (a + to_signed(1, 32));"));
    }

    #[test]
    fn negative_literal_folds_into_single_to_signed() {
        let (vhdl, _) = translate("int f() { int x = -5; return x; }");
        assert!(vhdl.contains("to_signed(-5, 32)"));
        assert!(!vhdl.contains("(- to_signed(5, 32))"));
    }

    #[test]
    fn array_access_prints_with_parens() {
        let (vhdl, _) = translate("int f(int i) { int buf[4]; return buf[i]; }");
        assert!(vhdl.contains("buf(i)"));
    }

    #[test]
    fn struct_typed_local_becomes_a_record_signal() {
        let (vhdl, diags) = translate("int f() { struct P p; return 0; }");
        assert!(!diags.has_errors());
        assert!(vhdl.contains("signal p : P;"));
    }

    #[test]
    fn struct_decl_emits_record_type() {
        let (vhdl, _) = translate("struct Point { int x; int y; }; int f() { return 0; }");
        assert!(vhdl.contains("type Point is record"));
        assert!(vhdl.contains("x : signed(31 downto 0);"));
        assert!(vhdl.contains("end record;"));
    }
}
