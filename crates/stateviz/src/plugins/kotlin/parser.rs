//! Kotlin syntax tree builder
//!
//! Recursive descent over the lexer's tokens, producing the generic
//! [`SyntaxNode`] tree. The grammar is loose: it models
//! calls, member access, lambdas, arguments and literals precisely, and
//! keeps everything else as `Sequence`/`Token` nodes so that arbitrary
//! surrounding code never stops a parse.

use std::borrow::Cow;

use tracing::{debug, span, trace, Level};

use super::lexer::{tokenize, Spanned, Token};
use crate::core::{Location, SourceParser, StatevizError, SyntaxKind, SyntaxNode};

type Result<T, E = StatevizError> = std::result::Result<T, E>;

/// Default limit on expression nesting
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Operators after which a newline does not end the statement
const CONTINUATION_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "+", "-", "*", "/", "%", "==", "!=", "===", "!==", "<",
    ">", "<=", ">=", "&&", "||", "?:", "->", ".", "?.", "::", "..", ",", ":", "@",
];

/// Operators that continue the previous line's statement
const LEADING_CONTINUATIONS: &[&str] = &[".", "?.", "?:", "&&", "||"];

/// Kotlin parser producing the generic syntax tree
#[derive(Debug, Clone)]
pub struct KotlinParser {
    max_depth: usize,
}

impl KotlinParser {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Create a parser that rejects input nested deeper than `max_depth`
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for KotlinParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser for KotlinParser {
    fn parse(&self, source: &str, file_name: &str) -> anyhow::Result<SyntaxNode> {
        let parse_span = span!(
            Level::INFO,
            "parse_kotlin",
            file_name,
            source_len = source.len()
        );
        let _enter = parse_span.enter();

        let source = normalize_line_endings(source);
        let source = source.as_ref();
        let tokens = tokenize(source)?;
        debug!(token_count = tokens.len(), "Lexed source");

        let mut builder = TreeBuilder::new(source, &tokens, self.max_depth);
        let file = builder.file()?;
        debug!(node_count = file.node_count(), "Built syntax tree");

        Ok(file)
    }

    fn name(&self) -> &'static str {
        "kotlin"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn supports(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        lower.ends_with(".kt") || lower.ends_with(".kts")
    }
}

/// Where a sequence of expressions stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Ends at `;` or a newline that does not continue the statement
    Statement,
    /// Ends at `,`; newlines are insignificant
    Argument,
}

struct TreeBuilder<'a, 'src> {
    source: &'src str,
    tokens: &'a [Spanned<Token<'src>>],
    line_starts: Vec<usize>,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a, 'src> TreeBuilder<'a, 'src> {
    fn new(source: &'src str, tokens: &'a [Spanned<Token<'src>>], max_depth: usize) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(index, _)| index + 1))
            .collect();
        Self {
            source,
            tokens,
            line_starts,
            pos: 0,
            depth: 0,
            max_depth,
        }
    }

    fn file(&mut self) -> Result<SyntaxNode> {
        let statements = self.statements(None)?;
        Ok(self.node(SyntaxKind::File { statements }, 0, self.source.len()))
    }

    // ---- token helpers -------------------------------------------------

    fn peek(&self) -> Option<Token<'src>> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<Token<'src>> {
        self.tokens.get(self.pos + offset).map(|(token, _)| *token)
    }

    fn bump(&mut self) -> Option<Spanned<Token<'src>>> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn start_of(&self, index: usize) -> usize {
        self.tokens
            .get(index)
            .map(|(_, span)| span.start)
            .unwrap_or(self.source.len())
    }

    fn end_of_previous(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .map(|(_, span)| span.end)
            .unwrap_or(0)
    }

    /// Whether the next token touches the previous one
    fn adjacent(&self) -> bool {
        self.pos > 0 && self.start_of(self.pos) == self.end_of_previous()
    }

    /// Index of the first non-newline token at or after the cursor
    fn skip_newlines_from(&self, mut index: usize) -> usize {
        while matches!(self.tokens.get(index), Some((Token::Newline, _))) {
            index += 1;
        }
        index
    }

    fn skip_newlines(&mut self) {
        self.pos = self.skip_newlines_from(self.pos);
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Some(Token::Newline)) || self.peek_punct(";") {
            self.pos += 1;
        }
    }

    fn peek_punct(&self, text: &str) -> bool {
        self.peek().is_some_and(|token| token.is_punct(text))
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(StatevizError::nesting_too_deep(self.max_depth));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn location(&self, offset: usize) -> Location {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line.saturating_sub(1)];
        let column = self.source[line_start..offset].chars().count() + 1;
        Location::new(line, column)
    }

    fn node(&self, kind: SyntaxKind, start: usize, end: usize) -> SyntaxNode {
        SyntaxNode::new(
            kind,
            start..end,
            self.location(start),
            &self.source[start..end],
        )
    }

    // ---- statements ----------------------------------------------------

    /// Statements until `close` (not consumed) or end of input
    fn statements(&mut self, close: Option<char>) -> Result<Vec<SyntaxNode>> {
        let mut statements = Vec::new();

        loop {
            self.skip_separators();
            match self.peek() {
                None => break,
                Some(Token::Close(c)) if Some(c) == close => break,
                Some(Token::Close(c)) => {
                    trace!(bracket = %c, "Keeping unbalanced closing bracket");
                    if let Some((_, span)) = self.bump() {
                        statements.push(self.node(SyntaxKind::Token, span.start, span.end));
                    }
                }
                Some(_) => {
                    if let Some(statement) = self.sequence(Mode::Statement)? {
                        statements.push(statement);
                    }
                }
            }
        }

        Ok(statements)
    }

    /// A run of expressions, collapsed to one node
    fn sequence(&mut self, mode: Mode) -> Result<Option<SyntaxNode>> {
        let mut items: Vec<SyntaxNode> = Vec::new();

        loop {
            match self.peek() {
                None | Some(Token::Close(_)) => break,
                Some(Token::Punct(";")) if mode == Mode::Statement => break,
                Some(Token::Punct(",")) if mode == Mode::Argument => break,
                Some(Token::Newline) => match mode {
                    Mode::Argument => self.skip_newlines(),
                    Mode::Statement => {
                        if self.continues_statement(items.last()) {
                            self.skip_newlines();
                        } else {
                            break;
                        }
                    }
                },
                Some(_) => items.push(self.expression()?),
            }
        }

        Ok(match items.len() {
            0 => None,
            1 => items.pop(),
            _ => {
                let start = items[0].span.start;
                let end = items[items.len() - 1].span.end;
                Some(self.node(SyntaxKind::Sequence { children: items }, start, end))
            }
        })
    }

    /// Whether a newline at the cursor continues the current statement
    fn continues_statement(&self, last: Option<&SyntaxNode>) -> bool {
        let next = self.skip_newlines_from(self.pos);
        let leads = matches!(
            self.tokens.get(next),
            Some((Token::Punct(p), _)) if LEADING_CONTINUATIONS.contains(p)
        );
        let trails = last.is_some_and(|node| {
            matches!(node.kind, SyntaxKind::Token)
                && CONTINUATION_OPERATORS.contains(&node.text.as_str())
        });
        leads || trails
    }

    // ---- expressions ---------------------------------------------------

    /// A primary expression followed by member accesses and index suffixes
    fn expression(&mut self) -> Result<SyntaxNode> {
        self.enter()?;
        let mut node = self.primary()?;

        loop {
            if let Some(dot_index) = self.member_dot_ahead() {
                self.pos = dot_index;
                let safe = self.peek_punct("?.");
                self.pos += 1;
                let selector = self.call_or_identifier()?;
                let (start, end) = (node.span.start, selector.span.end);
                node = self.node(
                    SyntaxKind::MemberAccess {
                        receiver: Box::new(node),
                        selector: Box::new(selector),
                        safe,
                    },
                    start,
                    end,
                );
                continue;
            }

            if matches!(self.peek(), Some(Token::Open('['))) && self.adjacent() {
                let index = self.group(']')?;
                let (start, end) = (node.span.start, index.span.end);
                node = self.node(
                    SyntaxKind::Sequence {
                        children: vec![node, index],
                    },
                    start,
                    end,
                );
                continue;
            }

            break;
        }

        self.leave();
        Ok(node)
    }

    /// Index of a `.`/`?.` (possibly on a following line) that is followed
    /// by an identifier
    fn member_dot_ahead(&self) -> Option<usize> {
        let dot = self.skip_newlines_from(self.pos);
        match (self.tokens.get(dot), self.tokens.get(dot + 1)) {
            (Some((Token::Punct("." | "?."), _)), Some((Token::Ident(_), _))) => Some(dot),
            _ => None,
        }
    }

    fn primary(&mut self) -> Result<SyntaxNode> {
        match self.peek() {
            Some(Token::Ident(_)) => return self.call_or_identifier(),
            Some(Token::Open('{')) => return self.lambda(),
            Some(Token::Open('(')) => return self.group(')'),
            Some(Token::Open('[')) => return self.group(']'),
            _ => {}
        }

        let Some((token, span)) = self.bump() else {
            return Ok(self.node(SyntaxKind::Token, self.source.len(), self.source.len()));
        };
        let kind = match token {
            Token::Str(raw) => SyntaxKind::StringLiteral {
                content: string_content(raw).to_string(),
            },
            Token::Char(_) | Token::Number(_) => SyntaxKind::Literal,
            _ => SyntaxKind::Token,
        };
        Ok(self.node(kind, span.start, span.end))
    }

    /// An identifier with optional type arguments, value arguments and
    /// trailing lambda
    fn call_or_identifier(&mut self) -> Result<SyntaxNode> {
        let Some((Token::Ident(raw), span)) = self.bump() else {
            let at = self.end_of_previous();
            return Ok(self.node(SyntaxKind::Token, at, at));
        };
        let callee = self.node(
            SyntaxKind::Identifier {
                name: raw.trim_matches('`').to_string(),
            },
            span.start,
            span.end,
        );

        let type_arguments = match self.type_arguments_end() {
            Some(close) => self.type_arguments(close),
            None => Vec::new(),
        };

        let value_arguments = if matches!(self.peek(), Some(Token::Open('('))) {
            Some(self.value_arguments()?)
        } else {
            None
        };

        let lambda = if matches!(self.peek(), Some(Token::Open('{'))) {
            Some(Box::new(self.lambda()?))
        } else {
            None
        };

        if type_arguments.is_empty() && value_arguments.is_none() && lambda.is_none() {
            return Ok(callee);
        }

        let start = span.start;
        let end = self.end_of_previous();
        Ok(self.node(
            SyntaxKind::Call {
                callee: Box::new(callee),
                type_arguments,
                value_arguments: value_arguments.unwrap_or_default(),
                lambda,
            },
            start,
            end,
        ))
    }

    /// Index of the `>` closing a type argument list at the cursor, if the
    /// `<` touches the callee and the list is followed by `(` or `{`
    fn type_arguments_end(&self) -> Option<usize> {
        if !self.peek_punct("<") || !self.adjacent() {
            return None;
        }

        let mut depth = 0usize;
        for (index, (token, _)) in self.tokens.iter().enumerate().skip(self.pos) {
            match token {
                Token::Punct("<") => depth += 1,
                Token::Punct(">") => {
                    depth -= 1;
                    if depth == 0 {
                        return match self.tokens.get(index + 1) {
                            Some((Token::Open('(' | '{'), _)) => Some(index),
                            _ => None,
                        };
                    }
                }
                Token::Ident(_) | Token::Punct("." | "," | "?" | "*" | "@" | ":") => {}
                _ => return None,
            }
        }
        None
    }

    /// Consume `<...>` up to `close`, splitting on top-level commas
    fn type_arguments(&mut self, close: usize) -> Vec<SyntaxNode> {
        let mut arguments = Vec::new();
        let mut depth = 0usize;
        let mut first: Option<usize> = None;
        let mut last_end = 0;

        // Skip the opening `<`
        self.pos += 1;
        while self.pos < close {
            let (token, span) = self.tokens[self.pos].clone();
            self.pos += 1;
            match token {
                Token::Punct(",") if depth == 0 => {
                    if let Some(start) = first.take() {
                        arguments.push(self.node(SyntaxKind::TypeArgument, start, last_end));
                    }
                    continue;
                }
                Token::Punct("<") => depth += 1,
                Token::Punct(">") => depth = depth.saturating_sub(1),
                _ => {}
            }
            first.get_or_insert(span.start);
            last_end = span.end;
        }
        if let Some(start) = first {
            arguments.push(self.node(SyntaxKind::TypeArgument, start, last_end));
        }

        // Skip the closing `>`
        self.pos = close + 1;
        arguments
    }

    /// Consume `( ... )` into value argument nodes
    fn value_arguments(&mut self) -> Result<Vec<SyntaxNode>> {
        let mut arguments = Vec::new();
        self.pos += 1;

        loop {
            self.skip_newlines();
            match self.peek() {
                None => break,
                Some(Token::Close(')')) => {
                    self.pos += 1;
                    break;
                }
                Some(Token::Close(_)) => break,
                Some(Token::Punct(",")) => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }

            let start = self.start_of(self.pos);
            let name = match (self.peek(), self.peek_at(1)) {
                (Some(Token::Ident(name)), Some(Token::Punct("="))) => {
                    self.pos += 2;
                    Some(name.trim_matches('`').to_string())
                }
                _ => None,
            };

            if let Some(expression) = self.sequence(Mode::Argument)? {
                let end = expression.span.end;
                arguments.push(self.node(
                    SyntaxKind::ValueArgument {
                        name,
                        expression: Box::new(expression),
                    },
                    start,
                    end,
                ));
            }
        }

        Ok(arguments)
    }

    /// Consume `{ params -> statements }`
    fn lambda(&mut self) -> Result<SyntaxNode> {
        self.enter()?;
        let start = self.start_of(self.pos);
        self.pos += 1;

        let parameters = self.lambda_parameters();
        let statements = self.statements(Some('}'))?;

        let body_start = statements
            .first()
            .map(|statement| statement.span.start)
            .unwrap_or_else(|| self.start_of(self.pos));
        let body_end = statements
            .last()
            .map(|statement| statement.span.end)
            .unwrap_or(body_start);

        if matches!(self.peek(), Some(Token::Close('}'))) {
            self.pos += 1;
        }
        let end = self.end_of_previous().max(body_end);

        let body = self.node(SyntaxKind::Block { statements }, body_start, body_end);
        self.leave();
        Ok(self.node(
            SyntaxKind::Lambda {
                parameters,
                body: Box::new(body),
            },
            start,
            end,
        ))
    }

    /// Consume a lambda parameter list ending in `->`, if there is one
    fn lambda_parameters(&mut self) -> Option<String> {
        let mut index = self.pos;
        loop {
            match self.tokens.get(index) {
                Some((Token::Punct("->"), _)) => break,
                Some((
                    Token::Ident(_)
                    | Token::Newline
                    | Token::Open('(')
                    | Token::Close(')')
                    | Token::Punct("," | ":" | "." | "<" | ">" | "?"),
                    _,
                )) => index += 1,
                _ => return None,
            }
        }

        let first = self.skip_newlines_from(self.pos);
        let parameters = if first < index {
            let end = self.tokens[..index]
                .iter()
                .rev()
                .find(|(token, _)| *token != Token::Newline)
                .map(|(_, span)| span.end)
                .unwrap_or(self.start_of(first));
            self.source[self.start_of(first)..end].trim().to_string()
        } else {
            String::new()
        };

        self.pos = index + 1;
        Some(parameters)
    }

    /// Consume a bracketed group up to the matching `close`
    fn group(&mut self, close: char) -> Result<SyntaxNode> {
        self.enter()?;
        let start = self.start_of(self.pos);
        self.pos += 1;

        let mut children = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek() {
                None => break,
                Some(Token::Close(c)) => {
                    if c == close {
                        self.pos += 1;
                    }
                    break;
                }
                Some(_) => children.push(self.expression()?),
            }
        }

        let end = self.end_of_previous();
        self.leave();
        Ok(self.node(SyntaxKind::Group { children }, start, end))
    }
}

/// Rewrite `\r\n` and lone `\r` as `\n`, so node text only ever holds `\n`
fn normalize_line_endings(source: &str) -> Cow<'_, str> {
    if source.contains('\r') {
        Cow::Owned(source.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(source)
    }
}

/// Raw text between the quotes of a string literal
fn string_content(raw: &str) -> &str {
    if raw.len() >= 6 && raw.starts_with("\"\"\"") && raw.ends_with("\"\"\"") {
        &raw[3..raw.len() - 3]
    } else if raw.len() >= 2 {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}
