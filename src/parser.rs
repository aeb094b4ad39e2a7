//! Recursive-descent parser with Pratt-style expression precedence
//! (spec.md §4.5).
//!
//! Single-token lookahead against the lexer's current token. `consume`
//! asserts a token kind, reports and enters panic-mode recovery on
//! mismatch. The parser never holds the lexer or the symbol tables as
//! global state — they're owned or borrowed explicitly for the lifetime
//! of one `Parser` (spec.md §9).

use crate::ast::{Ast, NodeId, NodeKind};
use crate::diagnostics::{Category, Diagnostics};
use crate::lexer::Lexer;
use crate::symbols::{ArrayTable, Field, StructTable};
use crate::token::{Token, TokenKind};

const TYPE_KEYWORDS: &[&str] = &[
    "int", "float", "double", "char", "void", "short", "long", "signed", "unsigned",
];

fn is_type_keyword(lexeme: &str) -> bool {
    TYPE_KEYWORDS.contains(&lexeme)
}

fn is_assign_op(op: &str) -> bool {
    matches!(op, "=" | "+=" | "-=" | "*=" | "/=")
}

/// Binary operator precedence, highest first, per the table in spec.md §4.5.
/// `None` for anything that isn't a binary operator.
fn precedence(op: &str) -> Option<u8> {
    Some(match op {
        "*" | "/" | "%" => 10,
        "+" | "-" => 9,
        "<<" | ">>" => 8,
        "<" | "<=" | ">" | ">=" => 7,
        "==" | "!=" => 6,
        "&" => 5,
        "^" => 4,
        "|" => 3,
        "&&" => 2,
        "||" => 1,
        _ => return None,
    })
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    diagnostics: &'a mut Diagnostics,
    arrays: &'a mut ArrayTable,
    structs: &'a mut StructTable,
    ast: Ast,
    current: Token,
}

impl<'a> Parser<'a> {
    pub fn new(
        source: &'a str,
        diagnostics: &'a mut Diagnostics,
        arrays: &'a mut ArrayTable,
        structs: &'a mut StructTable,
    ) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.advance(diagnostics);
        Parser {
            lexer,
            diagnostics,
            arrays,
            structs,
            ast: Ast::new(),
            current,
        }
    }

    /// `parse_program` from spec.md §4.5: builds a `PROGRAM` node whose
    /// children are top-level declarations. Returns `None` only when the
    /// token stream is empty.
    pub fn parse(mut self) -> Option<Ast> {
        if self.current.is(TokenKind::Eof) {
            return None;
        }
        let line = self.current.line;
        let program = self.ast.create(NodeKind::Program, line);
        self.ast.set_root(program);
        while !self.current.is(TokenKind::Eof) {
            if let Some(decl) = self.parse_decl() {
                self.ast.add_child(program, decl);
            }
        }
        Some(self.ast)
    }

    fn advance(&mut self) -> Token {
        let line = self.current.line;
        let prev = std::mem::replace(&mut self.current, Token::eof(line));
        self.current = self.lexer.advance(self.diagnostics);
        prev
    }

    /// Assert the current token's kind, report and recover on mismatch.
    fn consume(&mut self, kind: TokenKind, expected_desc: &str) -> Token {
        if self.current.is(kind) {
            self.advance()
        } else {
            self.diagnostics.log_error(
                Category::Parser,
                self.current.line,
                &format!("expected {}, got '{}'", expected_desc, self.current.lexeme),
            );
            self.synchronize();
            Token::new(kind, String::new(), self.current.line)
        }
    }

    /// Panic-mode recovery: skip tokens until the next `;` (consumed) or a
    /// `}` (left for the caller) or `EOF`.
    fn synchronize(&mut self) {
        loop {
            match self.current.kind {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace | TokenKind::Eof => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn expect_identifier(&mut self) -> Option<String> {
        if self.current.is(TokenKind::Identifier) {
            let name = self.current.lexeme.clone();
            self.advance();
            Some(name)
        } else {
            self.diagnostics.log_error(
                Category::Parser,
                self.current.line,
                &format!("expected identifier, got '{}'", self.current.lexeme),
            );
            None
        }
    }

    /// `Type := ('struct' Ident) | TypeKeyword+` (e.g. `unsigned long`).
    fn parse_type(&mut self) -> Option<String> {
        if self.current.is(TokenKind::Keyword) && self.current.lexeme == "struct" {
            self.advance();
            let name = self.expect_identifier()?;
            return Some(format!("struct {}", name));
        }
        let mut parts = Vec::new();
        while self.current.is(TokenKind::Keyword) && is_type_keyword(&self.current.lexeme) {
            parts.push(self.current.lexeme.clone());
            self.advance();
        }
        if parts.is_empty() {
            self.diagnostics.log_error(
                Category::Parser,
                self.current.line,
                &format!("expected a type, got '{}'", self.current.lexeme),
            );
            return None;
        }
        Some(parts.join(" "))
    }

    fn parse_decl(&mut self) -> Option<NodeId> {
        let line = self.current.line;
        if self.current.is(TokenKind::Keyword) && self.current.lexeme == "struct" {
            self.advance();
            let name = match self.expect_identifier() {
                Some(n) => n,
                None => {
                    self.synchronize();
                    return None;
                }
            };
            if self.current.is(TokenKind::LBrace) {
                return Some(self.parse_struct_body(name, line));
            }
            return self.parse_decl_after_type(format!("struct {}", name), line);
        }

        let c_type = match self.parse_type() {
            Some(t) => t,
            None => {
                self.synchronize();
                return None;
            }
        };
        self.parse_decl_after_type(c_type, line)
    }

    fn parse_decl_after_type(&mut self, c_type: String, line: usize) -> Option<NodeId> {
        let name = match self.expect_identifier() {
            Some(n) => n,
            None => {
                self.synchronize();
                return None;
            }
        };
        if self.current.is(TokenKind::LParen) {
            Some(self.parse_function_def(c_type, name, line))
        } else if self.current.is(TokenKind::LBracket) {
            Some(self.parse_array_decl_rest(c_type, name, line))
        } else {
            Some(self.parse_var_decl_rest(c_type, name, line))
        }
    }

    fn parse_struct_body(&mut self, name: String, line: usize) -> NodeId {
        self.advance(); // '{'
        let decl = self.ast.create(NodeKind::StructDecl { name: name.clone() }, line);
        let mut fields = Vec::new();
        while !self.current.is(TokenKind::RBrace) && !self.current.is(TokenKind::Eof) {
            let field_line = self.current.line;
            let field_type = match self.parse_type() {
                Some(t) => t,
                None => {
                    self.synchronize();
                    continue;
                }
            };
            let field_name = match self.expect_identifier() {
                Some(n) => n,
                None => {
                    self.synchronize();
                    continue;
                }
            };
            self.consume(TokenKind::Semicolon, "';'");
            let field_node = self.ast.create(
                NodeKind::StructField { name: field_name.clone(), c_type: field_type.clone() },
                field_line,
            );
            self.ast.add_child(decl, field_node);
            fields.push(Field { name: field_name, c_type: field_type });
        }
        self.consume(TokenKind::RBrace, "'}'");
        self.consume(TokenKind::Semicolon, "';'");
        self.structs.register(&name, fields);
        decl
    }

    fn parse_function_def(&mut self, return_type: String, name: String, line: usize) -> NodeId {
        let func = self.ast.create(NodeKind::Function { name, return_type }, line);
        self.advance(); // '('
        if !self.current.is(TokenKind::RParen) {
            loop {
                let param_line = self.current.line;
                let p_type = self.parse_type().unwrap_or_else(|| "int".to_string());
                let p_name = self.expect_identifier().unwrap_or_default();
                let param = self.ast.create(NodeKind::Param { name: p_name, c_type: p_type }, param_line);
                self.ast.add_child(func, param);
                if self.current.is(TokenKind::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.consume(TokenKind::RParen, "')'");
        let body = self.parse_block();
        self.ast.add_child(func, body);
        func
    }

    fn parse_array_decl_rest(&mut self, c_type: String, name: String, line: usize) -> NodeId {
        self.advance(); // '['
        let size = if self.current.is(TokenKind::Number) {
            let text = self.current.lexeme.clone();
            self.advance();
            text.parse::<i64>().unwrap_or(0)
        } else {
            self.diagnostics
                .log_error(Category::Parser, self.current.line, "expected array size");
            0
        };
        self.consume(TokenKind::RBracket, "']'");
        self.consume(TokenKind::Semicolon, "';'");
        self.arrays.register(&name, size);
        self.ast.create(NodeKind::ArrayDecl { name, c_type, size }, line)
    }

    fn parse_var_decl_rest(&mut self, c_type: String, name: String, line: usize) -> NodeId {
        let decl = self.ast.create(NodeKind::VarDecl { name, c_type }, line);
        if self.current.is(TokenKind::Operator) && self.current.lexeme == "=" {
            self.advance();
            let init = self.parse_expr(1);
            self.ast.add_child(decl, init);
        }
        self.consume(TokenKind::Semicolon, "';'");
        decl
    }

    fn parse_local_decl(&mut self) -> Option<NodeId> {
        let line = self.current.line;
        let c_type = match self.parse_type() {
            Some(t) => t,
            None => {
                self.synchronize();
                return None;
            }
        };
        let name = match self.expect_identifier() {
            Some(n) => n,
            None => {
                self.synchronize();
                return None;
            }
        };
        if self.current.is(TokenKind::LBracket) {
            Some(self.parse_array_decl_rest(c_type, name, line))
        } else {
            Some(self.parse_var_decl_rest(c_type, name, line))
        }
    }

    fn parse_block(&mut self) -> NodeId {
        let line = self.current.line;
        self.consume(TokenKind::LBrace, "'{'");
        let block = self.ast.create(NodeKind::Block, line);
        while !self.current.is(TokenKind::RBrace) && !self.current.is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_stmt() {
                self.ast.add_child(block, stmt);
            }
        }
        self.consume(TokenKind::RBrace, "'}'");
        block
    }

    fn parse_stmt_required(&mut self) -> NodeId {
        let line = self.current.line;
        self.parse_stmt()
            .unwrap_or_else(|| self.ast.create(NodeKind::Block, line))
    }

    fn parse_stmt(&mut self) -> Option<NodeId> {
        let line = self.current.line;
        if self.current.is(TokenKind::Keyword) {
            match self.current.lexeme.as_str() {
                "if" => return Some(self.parse_if()),
                "while" => return Some(self.parse_while()),
                "for" => return Some(self.parse_for()),
                "return" => return Some(self.parse_return()),
                "break" => {
                    self.advance();
                    self.consume(TokenKind::Semicolon, "';'");
                    return Some(self.ast.create(NodeKind::Break, line));
                }
                "continue" => {
                    self.advance();
                    self.consume(TokenKind::Semicolon, "';'");
                    return Some(self.ast.create(NodeKind::Continue, line));
                }
                lexeme if is_type_keyword(lexeme) || lexeme == "struct" => {
                    return self.parse_local_decl();
                }
                _ => {}
            }
        }
        if self.current.is(TokenKind::LBrace) {
            return Some(self.parse_block());
        }
        if self.current.is(TokenKind::Eof) {
            return None;
        }
        Some(self.parse_assignment_or_expr_stmt())
    }

    fn parse_if(&mut self) -> NodeId {
        let line = self.current.line;
        self.advance(); // 'if'
        self.consume(TokenKind::LParen, "'('");
        let cond = self.parse_expr(1);
        self.consume(TokenKind::RParen, "')'");
        let then_branch = self.parse_stmt_required();
        let node = self.ast.create(NodeKind::If, line);
        self.ast.add_child(node, cond);
        self.ast.add_child(node, then_branch);
        if self.current.is(TokenKind::Keyword) && self.current.lexeme == "else" {
            let else_line = self.current.line;
            self.advance();
            let else_branch = self.parse_stmt_required();
            let else_node = self.ast.create(NodeKind::Else, else_line);
            self.ast.add_child(else_node, else_branch);
            self.ast.add_child(node, else_node);
        }
        node
    }

    fn parse_while(&mut self) -> NodeId {
        let line = self.current.line;
        self.advance(); // 'while'
        self.consume(TokenKind::LParen, "'('");
        let cond = self.parse_expr(1);
        self.consume(TokenKind::RParen, "')'");
        let body = self.parse_stmt_required();
        let node = self.ast.create(NodeKind::While, line);
        self.ast.add_child(node, cond);
        self.ast.add_child(node, body);
        node
    }

    /// Always produces exactly 4 children, in fixed order `[init, cond,
    /// step, body]`, so codegen never has to disambiguate which optional
    /// clauses were present. Absent clauses become an empty `Block` (init,
    /// step) or a `Literal("1")` truthy condition (cond).
    fn parse_for(&mut self) -> NodeId {
        let line = self.current.line;
        self.advance(); // 'for'
        self.consume(TokenKind::LParen, "'('");

        let init = if self.current.is(TokenKind::Semicolon) {
            self.advance();
            self.ast.create(NodeKind::Block, line)
        } else if self.current.is(TokenKind::Keyword)
            && (is_type_keyword(&self.current.lexeme) || self.current.lexeme == "struct")
        {
            self.parse_local_decl().unwrap_or_else(|| self.ast.create(NodeKind::Block, line))
        } else {
            self.parse_assignment_or_expr_stmt()
        };

        let cond = if self.current.is(TokenKind::Semicolon) {
            self.ast.create(NodeKind::Literal { text: "1".to_string() }, line)
        } else {
            self.parse_expr(1)
        };
        self.consume(TokenKind::Semicolon, "';'");

        let step = if self.current.is(TokenKind::RParen) {
            self.ast.create(NodeKind::Block, line)
        } else {
            self.parse_assignment_expr_no_semi()
        };
        self.consume(TokenKind::RParen, "')'");

        let body = self.parse_stmt_required();

        let node = self.ast.create(NodeKind::For, line);
        self.ast.add_child(node, init);
        self.ast.add_child(node, cond);
        self.ast.add_child(node, step);
        self.ast.add_child(node, body);
        node
    }

    fn parse_return(&mut self) -> NodeId {
        let line = self.current.line;
        self.advance(); // 'return'
        let node = self.ast.create(NodeKind::Return, line);
        if !self.current.is(TokenKind::Semicolon) {
            let expr = self.parse_expr(1);
            self.ast.add_child(node, expr);
        }
        self.consume(TokenKind::Semicolon, "';'");
        node
    }

    /// `Assignment := Lvalue ('=' | '+=' | '-=' | '*=' | '/=') Expr ';'`, or
    /// a bare expression statement. Parses a full expression first since
    /// every legal lvalue shape (`Ident`, `Ident[Expr]`, `Ident.Ident`) is
    /// also a legal primary expression.
    fn parse_assignment_or_expr_stmt(&mut self) -> NodeId {
        let line = self.current.line;
        let expr = self.parse_expr(1);
        if self.current.is(TokenKind::Operator) && is_assign_op(&self.current.lexeme) {
            let op = self.current.lexeme.clone();
            self.advance();
            let rhs = self.parse_expr(1);
            self.consume(TokenKind::Semicolon, "';'");
            let assign = self.ast.create(NodeKind::Assignment { op }, line);
            self.ast.add_child(assign, expr);
            self.ast.add_child(assign, rhs);
            assign
        } else {
            self.consume(TokenKind::Semicolon, "';'");
            let stmt = self.ast.create(NodeKind::ExpressionStmt, line);
            self.ast.add_child(stmt, expr);
            stmt
        }
    }

    fn parse_assignment_expr_no_semi(&mut self) -> NodeId {
        let line = self.current.line;
        let expr = self.parse_expr(1);
        if self.current.is(TokenKind::Operator) && is_assign_op(&self.current.lexeme) {
            let op = self.current.lexeme.clone();
            self.advance();
            let rhs = self.parse_expr(1);
            let assign = self.ast.create(NodeKind::Assignment { op }, line);
            self.ast.add_child(assign, expr);
            self.ast.add_child(assign, rhs);
            assign
        } else {
            expr
        }
    }

    /// Pratt expression parser: a prefix form followed by binary operators
    /// consumed while their precedence is at least `min_prec`. All binary
    /// operators are left-associative (spec.md §4.5).
    fn parse_expr(&mut self, min_prec: u8) -> NodeId {
        let mut left = self.parse_unary();
        loop {
            if !self.current.is(TokenKind::Operator) {
                break;
            }
            let op = self.current.lexeme.clone();
            let prec = match precedence(&op) {
                Some(p) => p,
                None => break,
            };
            if prec < min_prec {
                break;
            }
            let line = self.current.line;
            self.advance();
            let right = self.parse_expr(prec + 1);
            let node = self.ast.create(NodeKind::BinaryOp { op }, line);
            self.ast.add_child(node, left);
            self.ast.add_child(node, right);
            left = node;
        }
        left
    }

    fn parse_unary(&mut self) -> NodeId {
        if self.current.is(TokenKind::Operator)
            && matches!(self.current.lexeme.as_str(), "-" | "!" | "~")
        {
            let op = self.current.lexeme.clone();
            let line = self.current.line;
            self.advance();
            let operand = self.parse_unary();
            let node = self.ast.create(NodeKind::UnaryOp { op }, line);
            self.ast.add_child(node, operand);
            return node;
        }
        self.parse_postfix()
    }

    /// Primary expression plus postfix call/array/struct-access forms.
    fn parse_postfix(&mut self) -> NodeId {
        let line = self.current.line;
        match self.current.kind {
            TokenKind::Number | TokenKind::String => {
                let text = self.current.lexeme.clone();
                self.advance();
                self.ast.create(NodeKind::Literal { text }, line)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr(1);
                self.consume(TokenKind::RParen, "')'");
                inner
            }
            TokenKind::Identifier => {
                let name = self.current.lexeme.clone();
                self.advance();
                if self.current.is(TokenKind::LParen) {
                    self.advance();
                    let call = self.ast.create(NodeKind::FuncCall { name }, line);
                    if !self.current.is(TokenKind::RParen) {
                        loop {
                            let arg = self.parse_expr(1);
                            self.ast.add_child(call, arg);
                            if self.current.is(TokenKind::Comma) {
                                self.advance();
                                continue;
                            }
                            break;
                        }
                    }
                    self.consume(TokenKind::RParen, "')'");
                    call
                } else if self.current.is(TokenKind::LBracket) {
                    self.advance();
                    let index = self.parse_expr(1);
                    self.consume(TokenKind::RBracket, "']'");
                    let node = self.ast.create(NodeKind::ArrayAccess { name }, line);
                    self.ast.add_child(node, index);
                    node
                } else if self.current.is(TokenKind::Dot) {
                    self.advance();
                    let field = self.expect_identifier().unwrap_or_default();
                    self.ast.create(NodeKind::StructAccess { path: format!("{}.{}", name, field) }, line)
                } else {
                    self.ast.create(NodeKind::Identifier { name }, line)
                }
            }
            _ => {
                self.diagnostics.log_error(
                    Category::Parser,
                    line,
                    &format!("expected expression, got '{}'", self.current.lexeme),
                );
                self.ast.create(NodeKind::Literal { text: "0".to_string() }, line)
            }
        }
    }
}

/// `parse_program` from spec.md §4.5: parse `source` into an `Ast`, or
/// `None` if the token stream was empty.
pub fn parse_program(
    source: &str,
    diagnostics: &mut Diagnostics,
    arrays: &mut ArrayTable,
    structs: &mut StructTable,
) -> Option<Ast> {
    Parser::new(source, diagnostics, arrays, structs).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> (Option<Ast>, Diagnostics) {
        let mut diags = Diagnostics::new();
        let mut arrays = ArrayTable::new();
        let mut structs = StructTable::new();
        let ast = parse_program(src, &mut diags, &mut arrays, &mut structs);
        (ast, diags)
    }

    #[test]
    fn empty_source_yields_no_tree() {
        let (ast, _) = parse("");
        assert!(ast.is_none());
    }

    #[test]
    fn precedence_ordering_matches_invariant_2() {
        assert!(precedence("*").unwrap() > precedence("+").unwrap());
        assert!(precedence("+").unwrap() > precedence("<<").unwrap());
        assert!(precedence("<<").unwrap() > precedence("<").unwrap());
        assert!(precedence("<").unwrap() > precedence("==").unwrap());
        assert!(precedence("==").unwrap() > precedence("&").unwrap());
        assert!(precedence("&").unwrap() > precedence("^").unwrap());
        assert!(precedence("^").unwrap() > precedence("|").unwrap());
        assert!(precedence("|").unwrap() > precedence("&&").unwrap());
        assert!(precedence("&&").unwrap() > precedence("||").unwrap());
    }

    #[test]
    fn s3_function_translation_setup() {
        let (ast, diags) = parse("int add(int a, int b) { return a + b; }");
        assert!(!diags.has_errors());
        let ast = ast.unwrap();
        let program = ast.root().unwrap();
        let func = ast.children(program)[0];
        match ast.kind(func) {
            NodeKind::Function { name, return_type } => {
                assert_eq!(name, "add");
                assert_eq!(return_type, "int");
            }
            other => panic!("expected Function, got {:?}", other),
        }
        // two params + one block
        assert_eq!(ast.children(func).len(), 3);
    }

    #[test]
    fn expression_nests_by_precedence() {
        let (ast, _) = parse("int x = 1 + 2 * 3;");
        let ast = ast.unwrap();
        let program = ast.root().unwrap();
        let decl = ast.children(program)[0];
        let init = ast.children(decl)[0];
        match ast.kind(init) {
            NodeKind::BinaryOp { op } => assert_eq!(op, "+"),
            other => panic!("expected top-level '+', got {:?}", other),
        }
        let rhs = ast.children(init)[1];
        match ast.kind(rhs) {
            NodeKind::BinaryOp { op } => assert_eq!(op, "*"),
            other => panic!("expected nested '*', got {:?}", other),
        }
    }

    #[test]
    fn s6_parser_recovery() {
        let (ast, diags) = parse("int f() { int x = ; return 0; }");
        assert!(diags.error_count() >= 1);
        let ast = ast.expect("parser should still produce a tree");
        let program = ast.root().unwrap();
        let func = ast.children(program)[0];
        let block = *ast.children(func).last().unwrap();
        let has_return = ast.children(block).iter().any(|&stmt| {
            matches!(ast.kind(stmt), NodeKind::Return) && !ast.children(stmt).is_empty()
        });
        assert!(has_return, "expected a well-formed RETURN statement to survive recovery");
    }

    #[test]
    fn array_decl_registers_size() {
        let mut diags = Diagnostics::new();
        let mut arrays = ArrayTable::new();
        let mut structs = StructTable::new();
        parse_program("int buf[16];", &mut diags, &mut arrays, &mut structs);
        assert_eq!(arrays.find("buf"), 16);
    }

    #[test]
    fn struct_decl_registers_fields() {
        let mut diags = Diagnostics::new();
        let mut arrays = ArrayTable::new();
        let mut structs = StructTable::new();
        parse_program("struct Point { int x; int y; };", &mut diags, &mut arrays, &mut structs);
        assert_eq!(structs.find_field("Point", "y"), "int");
    }
}
