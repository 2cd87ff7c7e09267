//! Syntax tree walker: turns C/C++ source into memory lifecycle events.
//!
//! The walker is the crate's event source. It parses one translation unit
//! with tree-sitter and pushes allocation, release, and use events into a
//! [`MemorySink`] in traversal order. It recognizes:
//!
//! - allocations: a declarator or plain assignment initialized from a
//!   `new` expression or a `malloc`/`calloc` call (casts and parentheses
//!   around the initializer are ignored),
//! - releases: `delete`/`delete[]` expressions and `free(x)` calls whose
//!   argument is a bare identifier,
//! - uses: every other bare identifier reference.
//!
//! Declared names (declarators, function names, parameters) are not
//! references and emit nothing. The identifier being released emits only
//! the release event, not an additional use.

use thiserror::Error;
use tracing::debug;
use tree_sitter::{Node, Parser, Tree};

use crate::analysis::MemorySink;
use crate::util::SourcePos;

/// Failure to obtain a syntax tree for the input.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The C++ grammar could not be loaded into the parser.
    #[error("failed to load C++ grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),
    /// The parser returned no tree (cancelled or invalid parser state).
    #[error("parser produced no syntax tree")]
    NoTree,
}

/// Parse a translation unit with the C++ grammar.
///
/// tree-sitter is error-tolerant, so even ill-formed input yields a tree;
/// unparseable regions simply produce no events.
pub fn parse(source: &str) -> Result<Tree, ParseError> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_cpp::LANGUAGE.into())?;
    parser.parse(source, None).ok_or(ParseError::NoTree)
}

/// Walks a parsed tree and emits events into a sink.
pub struct AstWalker<'src> {
    source: &'src str,
}

impl<'src> AstWalker<'src> {
    /// Create a walker over the source the tree was parsed from.
    pub fn new(source: &'src str) -> Self {
        Self { source }
    }

    /// Traverse the whole tree, pushing events in visiting order.
    pub fn walk<S: MemorySink>(&self, tree: &Tree, sink: &mut S) {
        self.walk_node(tree.root_node(), sink);
    }

    fn walk_node<S: MemorySink>(&self, node: Node<'_>, sink: &mut S) {
        match node.kind() {
            "declaration" => self.walk_declaration(node, sink),
            "call_expression" => self.walk_call(node, sink),
            "delete_expression" => self.walk_delete(node, sink),
            "assignment_expression" => self.walk_assignment(node, sink),
            "identifier" => {
                sink.use_of(self.text(node), SourcePos(node.start_byte()));
            }
            // Function names and parameters are declarations, not uses.
            "function_declarator" => {}
            _ => self.walk_children(node, sink),
        }
    }

    fn walk_children<S: MemorySink>(&self, node: Node<'_>, sink: &mut S) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_node(child, sink);
        }
    }

    /// `T* p = new T;` / `char* buf = (char*)malloc(n);`
    ///
    /// Only the initializer is traversed further; the declared name and
    /// the type are skipped.
    fn walk_declaration<S: MemorySink>(&self, node: Node<'_>, sink: &mut S) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() != "init_declarator" {
                continue;
            }
            let name = child
                .child_by_field_name("declarator")
                .and_then(|decl| self.declared_name(decl));
            let Some(value) = child.child_by_field_name("value") else {
                continue;
            };

            if let Some(name) = name {
                if self.is_allocation_expr(strip_casts(value)) {
                    debug!(variable = name, "allocation site");
                    sink.allocation(name, SourcePos(value.start_byte()));
                    // Still traverse the initializer for uses inside it,
                    // e.g. `int* p = new int(n);`
                    self.walk_allocation_expr(strip_casts(value), sink);
                    continue;
                }
            }
            self.walk_node(value, sink);
        }
    }

    /// `free(p)` releases; every other call is traversed normally.
    fn walk_call<S: MemorySink>(&self, node: Node<'_>, sink: &mut S) {
        if let Some(name) = self.released_by_free(node) {
            debug!(variable = name, "release via free()");
            sink.release(name, SourcePos(node.start_byte()));
            return;
        }
        self.walk_children(node, sink);
    }

    /// `delete p;` / `delete[] p;`
    fn walk_delete<S: MemorySink>(&self, node: Node<'_>, sink: &mut S) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if let Some(name) = self.identifier_text(strip_casts(child)) {
                debug!(variable = name, "release via delete");
                sink.release(name, SourcePos(node.start_byte()));
                return;
            }
        }
        // Operand is not a bare identifier (e.g. `delete arr[0]`); nothing
        // to release by name, but identifiers inside are still uses.
        self.walk_children(node, sink);
    }

    /// `p = new T;` re-allocates; any other assignment is plain uses on
    /// both sides.
    fn walk_assignment<S: MemorySink>(&self, node: Node<'_>, sink: &mut S) {
        let left = node.child_by_field_name("left");
        let right = node.child_by_field_name("right");
        let operator = node
            .child_by_field_name("operator")
            .map(|op| self.text(op));

        if let (Some(left), Some(right), Some("=")) = (left, right, operator) {
            if let Some(name) = self.identifier_text(left) {
                if self.is_allocation_expr(strip_casts(right)) {
                    debug!(variable = name, "reallocation site");
                    sink.allocation(name, SourcePos(right.start_byte()));
                    self.walk_allocation_expr(strip_casts(right), sink);
                    return;
                }
            }
        }
        self.walk_children(node, sink);
    }

    /// Traverse an allocation initializer for uses inside it. For an
    /// allocating call only the arguments are traversed; the callee name
    /// is not a variable reference.
    fn walk_allocation_expr<S: MemorySink>(&self, node: Node<'_>, sink: &mut S) {
        if node.kind() == "call_expression" {
            if let Some(arguments) = node.child_by_field_name("arguments") {
                self.walk_children(arguments, sink);
            }
        } else {
            self.walk_children(node, sink);
        }
    }

    /// Whether an expression allocates: `new` or a `malloc`/`calloc` call.
    fn is_allocation_expr(&self, node: Node<'_>) -> bool {
        match node.kind() {
            "new_expression" => true,
            "call_expression" => matches!(
                node.child_by_field_name("function")
                    .filter(|f| f.kind() == "identifier")
                    .map(|f| self.text(f)),
                Some("malloc" | "calloc")
            ),
            _ => false,
        }
    }

    /// If `node` is `free(<identifier>)`, the released identifier.
    fn released_by_free(&self, node: Node<'_>) -> Option<&'src str> {
        let function = node.child_by_field_name("function")?;
        if function.kind() != "identifier" || self.text(function) != "free" {
            return None;
        }
        let arguments = node.child_by_field_name("arguments")?;
        let first = arguments.named_child(0)?;
        self.identifier_text(strip_casts(first))
    }

    /// Strip declarator wrappers (`*p`, `&p`, `p[10]`) down to the name.
    fn declared_name(&self, mut node: Node<'_>) -> Option<&'src str> {
        loop {
            match node.kind() {
                "identifier" => return Some(self.text(node)),
                "pointer_declarator"
                | "array_declarator"
                | "reference_declarator"
                | "parenthesized_declarator" => {
                    node = node
                        .child_by_field_name("declarator")
                        .or_else(|| node.named_child(0))?;
                }
                _ => return None,
            }
        }
    }

    fn identifier_text(&self, node: Node<'_>) -> Option<&'src str> {
        (node.kind() == "identifier").then(|| self.text(node))
    }

    /// Slice of the source covered by a node.
    fn text(&self, node: Node<'_>) -> &'src str {
        &self.source[node.byte_range()]
    }
}

/// Peel parentheses and C-style casts off an expression.
fn strip_casts(mut node: Node<'_>) -> Node<'_> {
    loop {
        match node.kind() {
            "cast_expression" => {
                let Some(inner) = node.child_by_field_name("value") else {
                    return node;
                };
                node = inner;
            }
            "parenthesized_expression" => {
                let Some(inner) = node.named_child(0) else {
                    return node;
                };
                node = inner;
            }
            _ => return node,
        }
    }
}
