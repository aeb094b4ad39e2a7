//! Abstract syntax tree: an arena of nodes indexed by [`NodeId`], each
//! carrying a closed [`NodeKind`] sum type.
//!
//! spec.md §9 flags the original design (tagged node, string payload,
//! owning-child/non-owning-parent pointers forming a cycle) and recommends
//! replacing it with owning handles into an arena and a non-owning parent
//! index. That's what this module does: the `Ast` owns the only `Vec<Node>`,
//! a `NodeId` is a plain `usize` with no destructor, and there is exactly
//! one deallocation path — dropping the `Ast` itself.

/// A non-owning index into an [`Ast`]'s node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One of every C construct this translator understands, each carrying
/// only the fields it needs. Replaces the source's tagged-node-plus-string
/// payload (spec.md §9).
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Program,
    Function { name: String, return_type: String },
    Param { name: String, c_type: String },
    Block,
    VarDecl { name: String, c_type: String },
    ArrayDecl { name: String, c_type: String, size: i64 },
    StructDecl { name: String },
    StructField { name: String, c_type: String },
    Assignment { op: String },
    If,
    Else,
    While,
    For,
    Return,
    Break,
    Continue,
    ExpressionStmt,
    BinaryOp { op: String },
    UnaryOp { op: String },
    FuncCall { name: String },
    ArrayAccess { name: String },
    StructAccess { path: String },
    Literal { text: String },
    Identifier { name: String },
    /// A single top-level generic statement wrapper, kept for fidelity with
    /// the closed node-kind set in spec.md §3's data model.
    Statement,
}

impl NodeKind {
    /// Human-readable tag used by `print_tree` and by codegen's
    /// "unsupported node kind" diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Program => "PROGRAM",
            NodeKind::Function { .. } => "FUNCTION",
            NodeKind::Param { .. } => "PARAM",
            NodeKind::Block => "BLOCK",
            NodeKind::VarDecl { .. } => "VAR_DECL",
            NodeKind::ArrayDecl { .. } => "ARRAY_DECL",
            NodeKind::StructDecl { .. } => "STRUCT_DECL",
            NodeKind::StructField { .. } => "STRUCT_FIELD",
            NodeKind::Assignment { .. } => "ASSIGNMENT",
            NodeKind::If => "IF",
            NodeKind::Else => "ELSE",
            NodeKind::While => "WHILE",
            NodeKind::For => "FOR",
            NodeKind::Return => "RETURN",
            NodeKind::Break => "BREAK",
            NodeKind::Continue => "CONTINUE",
            NodeKind::ExpressionStmt => "EXPRESSION",
            NodeKind::BinaryOp { .. } => "BINARY_OP",
            NodeKind::UnaryOp { .. } => "UNARY_OP",
            NodeKind::FuncCall { .. } => "FUNC_CALL",
            NodeKind::ArrayAccess { .. } => "ARRAY_ACCESS",
            NodeKind::StructAccess { .. } => "STRUCT_ACCESS",
            NodeKind::Literal { .. } => "LITERAL",
            NodeKind::Identifier { .. } => "IDENTIFIER",
            NodeKind::Statement => "STATEMENT",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Source line the node was created from, used by codegen diagnostics.
    pub line: usize,
}

/// Owns every node of one parsed translation unit.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Ast::default()
    }

    /// Create a detached node with no children and no parent.
    pub fn create(&mut self, kind: NodeKind, line: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            children: Vec::new(),
            parent: None,
            line,
        });
        id
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Append `child` to `parent`'s children and point `child` back at
    /// `parent`. Maintains spec.md §8 invariant 1: every child's parent
    /// points back to it.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn line(&self, id: NodeId) -> usize {
        self.nodes[id.0].line
    }

    /// Debug pretty-printer: one `"  "` per level, as spec.md §4.4 describes.
    pub fn print_tree(&self, id: NodeId, indent: usize, out: &mut String) {
        use std::fmt::Write as _;
        for _ in 0..indent {
            out.push_str("  ");
        }
        writeln!(out, "{}", self.describe(id)).ok();
        for &child in self.children(id) {
            self.print_tree(child, indent + 1, out);
        }
    }

    fn describe(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Function { name, .. } => format!("FUNCTION({})", name),
            NodeKind::Param { name, c_type } => format!("PARAM({} {})", c_type, name),
            NodeKind::VarDecl { name, c_type } => format!("VAR_DECL({} {})", c_type, name),
            NodeKind::ArrayDecl { name, c_type, size } => {
                format!("ARRAY_DECL({} {}[{}])", c_type, name, size)
            }
            NodeKind::StructDecl { name } => format!("STRUCT_DECL({})", name),
            NodeKind::Assignment { op } => format!("ASSIGNMENT({})", op),
            NodeKind::BinaryOp { op } => format!("BINARY_OP({})", op),
            NodeKind::UnaryOp { op } => format!("UNARY_OP({})", op),
            NodeKind::FuncCall { name } => format!("FUNC_CALL({})", name),
            NodeKind::ArrayAccess { name } => format!("ARRAY_ACCESS({})", name),
            NodeKind::StructAccess { path } => format!("STRUCT_ACCESS({})", path),
            NodeKind::Literal { text } => format!("LITERAL({})", text),
            NodeKind::Identifier { name } => format!("IDENTIFIER({})", name),
            other => other.tag().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s2_tree_growth() {
        let mut ast = Ast::new();
        let stmt = ast.create(NodeKind::Statement, 1);
        let mut expr_ids = Vec::new();
        for _ in 0..10 {
            let id = ast.create(NodeKind::ExpressionStmt, 1);
            ast.add_child(stmt, id);
            expr_ids.push(id);
        }
        assert_eq!(ast.children(stmt).len(), 10);
        for (i, id) in expr_ids.iter().enumerate() {
            assert_eq!(ast.children(stmt)[i], *id);
        }
    }

    #[test]
    fn invariant_parent_points_back() {
        let mut ast = Ast::new();
        let parent = ast.create(NodeKind::Block, 1);
        let child = ast.create(NodeKind::ExpressionStmt, 2);
        ast.add_child(parent, child);
        assert_eq!(ast.parent(child), Some(parent));
        assert_eq!(ast.children(parent), &[child]);
    }

    #[test]
    fn print_tree_indents_by_level() {
        let mut ast = Ast::new();
        let root = ast.create(NodeKind::Program, 1);
        let func = ast.create(
            NodeKind::Function { name: "f".into(), return_type: "int".into() },
            1,
        );
        ast.add_child(root, func);
        let mut out = String::new();
        ast.print_tree(root, 0, &mut out);
        assert!(out.starts_with("PROGRAM\n"));
        assert!(out.contains("  FUNCTION(f)"));
    }
}
