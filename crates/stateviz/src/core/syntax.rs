//! Generic syntax tree and the source parser abstraction
//!
//! Host-language parsers turn source text into a tree of [`SyntaxNode`]s.
//! The extractor only relies on the closed set of [`SyntaxKind`] variants,
//! each node's children, and its raw source text.

use std::ops::Range;

use anyhow::Result;

/// 1-based line and column of a node's first character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A node of the host-language syntax tree
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    /// Byte range of the node in the parsed source
    pub span: Range<usize>,
    pub location: Location,
    /// Verbatim source text covered by the node
    pub text: String,
}

/// The node kinds a host parser can produce
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxKind {
    /// Root of a source unit
    File { statements: Vec<SyntaxNode> },
    /// Statements of a lambda body; its text excludes the braces
    Block { statements: Vec<SyntaxNode> },
    /// `callee<T>(args) { lambda }`
    Call {
        callee: Box<SyntaxNode>,
        type_arguments: Vec<SyntaxNode>,
        value_arguments: Vec<SyntaxNode>,
        lambda: Option<Box<SyntaxNode>>,
    },
    /// `receiver.selector` or `receiver?.selector`
    MemberAccess {
        receiver: Box<SyntaxNode>,
        selector: Box<SyntaxNode>,
        safe: bool,
    },
    /// `{ params -> body }`
    Lambda {
        parameters: Option<String>,
        body: Box<SyntaxNode>,
    },
    /// One entry of a call's value argument list, optionally named
    ValueArgument {
        name: Option<String>,
        expression: Box<SyntaxNode>,
    },
    /// One entry of a call's type argument list
    TypeArgument,
    /// A string literal; `content` is the raw text between the quotes
    StringLiteral { content: String },
    Identifier { name: String },
    /// Number or character literal
    Literal,
    /// Parenthesized or bracketed expression
    Group { children: Vec<SyntaxNode> },
    /// Several expressions the parser does not model individually
    Sequence { children: Vec<SyntaxNode> },
    /// A keyword-free operator or punctuation token
    Token,
}

impl SyntaxNode {
    pub fn new(kind: SyntaxKind, span: Range<usize>, location: Location, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            location,
            text: text.into(),
        }
    }

    /// Direct children in source order
    pub fn children(&self) -> Vec<&SyntaxNode> {
        match &self.kind {
            SyntaxKind::File { statements } | SyntaxKind::Block { statements } => {
                statements.iter().collect()
            }
            SyntaxKind::Call {
                callee,
                type_arguments,
                value_arguments,
                lambda,
            } => std::iter::once(callee.as_ref())
                .chain(type_arguments.iter())
                .chain(value_arguments.iter())
                .chain(lambda.as_deref())
                .collect(),
            SyntaxKind::MemberAccess {
                receiver, selector, ..
            } => vec![receiver.as_ref(), selector.as_ref()],
            SyntaxKind::Lambda { body, .. } => vec![body.as_ref()],
            SyntaxKind::ValueArgument { expression, .. } => vec![expression.as_ref()],
            SyntaxKind::Group { children } | SyntaxKind::Sequence { children } => {
                children.iter().collect()
            }
            SyntaxKind::TypeArgument
            | SyntaxKind::StringLiteral { .. }
            | SyntaxKind::Identifier { .. }
            | SyntaxKind::Literal
            | SyntaxKind::Token => Vec::new(),
        }
    }

    /// Name of a bare identifier reference, `None` for anything else
    pub fn identifier_name(&self) -> Option<&str> {
        match &self.kind {
            SyntaxKind::Identifier { name } => Some(name),
            _ => None,
        }
    }

    /// Whether this node is the bare identifier `name`
    pub fn has_name(&self, name: &str) -> bool {
        self.identifier_name() == Some(name)
    }

    /// Raw content of a string literal, verbatim text for anything else
    pub fn unquote(&self) -> String {
        match &self.kind {
            SyntaxKind::StringLiteral { content } => content.clone(),
            _ => self.text.clone(),
        }
    }

    /// Expression of a value argument; other nodes are returned unchanged
    pub fn argument_expression(&self) -> &SyntaxNode {
        match &self.kind {
            SyntaxKind::ValueArgument { expression, .. } => expression,
            _ => self,
        }
    }

    /// Body block of a lambda
    pub fn lambda_body(&self) -> Option<&SyntaxNode> {
        match &self.kind {
            SyntaxKind::Lambda { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Statements of a file or block
    pub fn statements(&self) -> &[SyntaxNode] {
        match &self.kind {
            SyntaxKind::File { statements } | SyntaxKind::Block { statements } => statements,
            _ => &[],
        }
    }

    /// Number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(SyntaxNode::node_count)
            .sum::<usize>()
    }
}

/// Trait for host-language parsers
///
/// A parser is constructed once by the caller and passed by reference into
/// the extraction pipeline. Implementations hold no global state.
pub trait SourceParser: Send + Sync {
    /// Parse source text into a syntax tree rooted at a `File` node
    ///
    /// `file_name` only selects the dialect; it is never opened.
    fn parse(&self, source: &str, file_name: &str) -> Result<SyntaxNode>;

    /// Get the name of this parser
    fn name(&self) -> &'static str;

    /// Get the version of this parser
    fn version(&self) -> &'static str;

    /// Check whether this parser understands files with the given name
    fn supports(&self, file_name: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: SyntaxKind, text: &str) -> SyntaxNode {
        SyntaxNode::new(kind, 0..text.len(), Location::new(1, 1), text)
    }

    #[test]
    fn test_unquote() {
        let literal = leaf(
            SyntaxKind::StringLiteral {
                content: "Idle".to_string(),
            },
            "\"Idle\"",
        );
        let ident = leaf(
            SyntaxKind::Identifier {
                name: "Idle".to_string(),
            },
            "Idle",
        );
        let qualified = leaf(SyntaxKind::Token, "State.Idle");

        assert_eq!(literal.unquote(), "Idle");
        assert_eq!(ident.unquote(), "Idle");
        assert_eq!(qualified.unquote(), "State.Idle");
    }

    #[test]
    fn test_call_children_order() {
        let callee = leaf(
            SyntaxKind::Identifier {
                name: "on".to_string(),
            },
            "on",
        );
        let type_arg = leaf(SyntaxKind::TypeArgument, "Start");
        let body = leaf(SyntaxKind::Block { statements: vec![] }, "");
        let lambda = leaf(
            SyntaxKind::Lambda {
                parameters: None,
                body: Box::new(body),
            },
            "{}",
        );
        let call = leaf(
            SyntaxKind::Call {
                callee: Box::new(callee),
                type_arguments: vec![type_arg],
                value_arguments: vec![],
                lambda: Some(Box::new(lambda)),
            },
            "on<Start> {}",
        );

        let texts: Vec<&str> = call.children().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["on", "Start", "{}"]);
        assert_eq!(call.node_count(), 5);
    }

    #[test]
    fn test_has_name() {
        let ident = leaf(
            SyntaxKind::Identifier {
                name: "StateMachine".to_string(),
            },
            "StateMachine",
        );
        assert!(ident.has_name("StateMachine"));
        assert!(!ident.has_name("create"));
        assert!(!leaf(SyntaxKind::Token, "StateMachine").has_name("StateMachine"));
    }
}
