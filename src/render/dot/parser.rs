//! DOT language parser
//!
//! Recursive descent over the Graphviz grammar:
//!
//! ```text
//! graph     : [strict] (graph | digraph) [ID] '{' stmt_list '}'
//! stmt_list : [stmt [';'] stmt_list]
//! stmt      : node_stmt | edge_stmt | attr_stmt | ID '=' ID | subgraph
//! attr_stmt : (graph | node | edge) attr_list
//! attr_list : '[' [a_list] ']' [attr_list]
//! a_list    : ID '=' ID [(';' | ',')] [a_list]
//! edge_stmt : (node_id | subgraph) edgeRHS [attr_list]
//! edgeRHS   : edgeop (node_id | subgraph) [edgeRHS]
//! node_stmt : node_id [attr_list]
//! node_id   : ID [port]
//! port      : ':' ID [':' ID]
//! subgraph  : [subgraph [ID]] '{' stmt_list '}'
//! ```
//!
//! IDs are bare identifiers, numerals, double-quoted strings (with `+`
//! concatenation) or HTML strings. Comments (`//`, `/* */`) and `#` lines
//! are skipped. Subgraphs are flattened into the parent graph.

use super::graph::{Attrs, Graph};
use super::ident::is_keyword;

/// A DOT syntax error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct DotParseError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Id { value: String, quoted: bool },
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Equals,
    Colon,
    Plus,
    EdgeOp { directed: bool },
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    line: usize,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    at_line_start: bool,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
            at_line_start: true,
        }
    }

    fn error(&self, message: impl Into<String>) -> DotParseError {
        DotParseError {
            line: self.line,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.at_line_start = true;
        } else if !c.is_whitespace() {
            self.at_line_start = false;
        }
        Some(c)
    }

    fn tokenize(mut self) -> Result<Vec<Spanned>, DotParseError> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
                continue;
            }
            if c == '#' && self.at_line_start {
                self.skip_line();
                continue;
            }
            if c == '/' && self.peek_at(1) == Some('/') {
                self.skip_line();
                continue;
            }
            if c == '/' && self.peek_at(1) == Some('*') {
                self.skip_block_comment()?;
                continue;
            }

            let line = self.line;
            let token = match c {
                '{' => self.single(Token::LBrace),
                '}' => self.single(Token::RBrace),
                '[' => self.single(Token::LBracket),
                ']' => self.single(Token::RBracket),
                ';' => self.single(Token::Semi),
                ',' => self.single(Token::Comma),
                '=' => self.single(Token::Equals),
                ':' => self.single(Token::Colon),
                '+' => self.single(Token::Plus),
                '"' => self.quoted()?,
                '<' => self.html()?,
                '-' => match self.peek_at(1) {
                    Some('>') => {
                        self.bump();
                        self.bump();
                        Token::EdgeOp { directed: true }
                    }
                    Some('-') => {
                        self.bump();
                        self.bump();
                        Token::EdgeOp { directed: false }
                    }
                    Some(n) if n.is_ascii_digit() || n == '.' => self.numeral()?,
                    _ => return Err(self.error("unexpected '-'")),
                },
                c if c.is_ascii_digit() || c == '.' => self.numeral()?,
                c if is_id_start(c) => self.bare_id(),
                c => return Err(self.error(format!("unexpected character {:?}", c))),
            };
            tokens.push(Spanned { token, line });
        }
        Ok(tokens)
    }

    fn single(&mut self, token: Token) -> Token {
        self.bump();
        token
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), DotParseError> {
        let start = self.line;
        self.bump();
        self.bump();
        loop {
            match self.bump() {
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => {}
                None => {
                    return Err(DotParseError {
                        line: start,
                        message: "unterminated comment".to_string(),
                    });
                }
            }
        }
    }

    fn quoted(&mut self) -> Result<Token, DotParseError> {
        let start = self.line;
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => match self.peek() {
                    Some('"') | Some('\\') => {
                        value.extend(self.bump());
                    }
                    Some('\n') => {
                        // line continuation
                        self.bump();
                    }
                    _ => value.push('\\'),
                },
                Some(c) => value.push(c),
                None => {
                    return Err(DotParseError {
                        line: start,
                        message: "unterminated string".to_string(),
                    });
                }
            }
        }
        Ok(Token::Id {
            value,
            quoted: true,
        })
    }

    fn html(&mut self) -> Result<Token, DotParseError> {
        let start = self.line;
        self.bump();
        let mut depth = 1;
        let mut value = String::new();
        while depth > 0 {
            match self.bump() {
                Some('<') => {
                    depth += 1;
                    value.push('<');
                }
                Some('>') => {
                    depth -= 1;
                    if depth > 0 {
                        value.push('>');
                    }
                }
                Some(c) => value.push(c),
                None => {
                    return Err(DotParseError {
                        line: start,
                        message: "unterminated HTML string".to_string(),
                    });
                }
            }
        }
        Ok(Token::Id {
            value,
            quoted: true,
        })
    }

    fn numeral(&mut self) -> Result<Token, DotParseError> {
        let mut value = String::new();
        if self.peek() == Some('-') {
            value.extend(self.bump());
        }
        let mut digits = 0;
        let mut seen_dot = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits += 1;
            } else if c == '.' && !seen_dot {
                seen_dot = true;
            } else {
                break;
            }
            value.extend(self.bump());
        }
        if digits == 0 {
            return Err(self.error(format!("invalid numeral {:?}", value)));
        }
        if self.peek().is_some_and(is_id_start) {
            return Err(self.error(format!("identifier may not start with a digit: {}", value)));
        }
        Ok(Token::Id {
            value,
            quoted: false,
        })
    }

    fn bare_id(&mut self) -> Token {
        let mut value = String::new();
        while let Some(c) = self.peek() {
            if !(is_id_start(c) || c.is_ascii_digit()) {
                break;
            }
            value.extend(self.bump());
        }
        Token::Id {
            value,
            quoted: false,
        }
    }
}

fn is_id_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    graph: Graph,
}

impl Parser {
    fn error(&self, message: impl Into<String>) -> DotParseError {
        let line = self
            .tokens
            .get(self.pos)
            .or(self.tokens.last())
            .map_or(1, |t| t.line);
        DotParseError {
            line,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|t| t.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn accept(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), DotParseError> {
        if self.accept(&expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected {}", what)))
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(
            self.peek(),
            Some(Token::Id { value, quoted: false }) if value.eq_ignore_ascii_case(keyword)
        )
    }

    fn accept_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn peek_id(&self) -> bool {
        match self.peek() {
            Some(Token::Id { value, quoted }) => *quoted || !is_keyword(value),
            _ => false,
        }
    }

    /// ID, joining `"a" + "b"` concatenations
    fn id(&mut self) -> Result<String, DotParseError> {
        match self.advance() {
            Some(Token::Id { value, quoted }) => {
                if !quoted && is_keyword(&value) {
                    self.pos -= 1;
                    return Err(self.error(format!("keyword {} used as an ID", value)));
                }
                let mut value = value;
                if quoted {
                    while self.accept(&Token::Plus) {
                        match self.advance() {
                            Some(Token::Id {
                                value: next,
                                quoted: true,
                            }) => value.push_str(&next),
                            _ => {
                                return Err(self.error("expected a quoted string after '+'"));
                            }
                        }
                    }
                }
                Ok(value)
            }
            Some(_) => {
                self.pos -= 1;
                Err(self.error("expected an ID"))
            }
            None => Err(self.error("expected an ID, found end of input")),
        }
    }

    fn parse_graph(&mut self) -> Result<(), DotParseError> {
        self.graph.strict = self.accept_keyword("strict");
        if self.accept_keyword("digraph") {
            self.graph.directed = true;
        } else if self.accept_keyword("graph") {
            self.graph.directed = false;
        } else {
            return Err(self.error("expected 'graph' or 'digraph'"));
        }
        if self.peek_id() {
            self.graph.name = Some(self.id()?);
        }
        self.expect(Token::LBrace, "'{'")?;
        self.stmt_list()?;
        self.expect(Token::RBrace, "'}'")?;
        if self.peek().is_some() {
            return Err(self.error("unexpected content after graph"));
        }
        Ok(())
    }

    /// Statements up to the closing brace; returns the nodes they mention
    fn stmt_list(&mut self) -> Result<Vec<String>, DotParseError> {
        let mut mentioned = Vec::new();
        while !matches!(self.peek(), Some(Token::RBrace) | None) {
            self.stmt(&mut mentioned)?;
            self.accept(&Token::Semi);
        }
        Ok(mentioned)
    }

    fn stmt(&mut self, mentioned: &mut Vec<String>) -> Result<(), DotParseError> {
        for keyword in ["graph", "node", "edge"] {
            if self.peek_keyword(keyword) {
                self.pos += 1;
                if self.peek() != Some(&Token::LBracket) {
                    return Err(self.error(format!("expected '[' after {}", keyword)));
                }
                let attrs = self.attr_list()?;
                if keyword == "graph" {
                    self.graph.attrs.extend(attrs);
                }
                return Ok(());
            }
        }

        if self.peek_id() && self.peek_at(1) == Some(&Token::Equals) {
            let key = self.id()?;
            self.pos += 1;
            let value = self.id()?;
            self.graph.attrs.push((key, value));
            return Ok(());
        }

        let first = self.operand()?;
        if matches!(self.peek(), Some(Token::EdgeOp { .. })) {
            let mut operands = vec![first];
            while let Some(Token::EdgeOp { directed }) = self.peek().cloned() {
                if directed != self.graph.directed {
                    let op = if directed { "->" } else { "--" };
                    return Err(self.error(format!("edge operator {} does not match graph type", op)));
                }
                self.pos += 1;
                operands.push(self.operand()?);
            }
            let attrs = if self.peek() == Some(&Token::LBracket) {
                self.attr_list()?
            } else {
                Attrs::new()
            };
            for pair in operands.windows(2) {
                for from in &pair[0] {
                    for to in &pair[1] {
                        self.graph.add_edge(from, to, attrs.clone());
                    }
                }
            }
            for operand in operands {
                mentioned.extend(operand);
            }
        } else {
            if self.peek() == Some(&Token::LBracket) {
                let attrs = self.attr_list()?;
                match first.as_slice() {
                    [id] => self.set_node_attrs(id, attrs),
                    _ => return Err(self.error("attributes after a subgraph")),
                }
            }
            mentioned.extend(first);
        }
        Ok(())
    }

    fn set_node_attrs(&mut self, id: &str, attrs: Attrs) {
        match self.graph.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => node.attrs.extend(attrs),
            None => self.graph.add_node(id, attrs),
        }
    }

    /// A node ID or a subgraph; yields the node IDs it stands for
    fn operand(&mut self) -> Result<Vec<String>, DotParseError> {
        if self.peek_keyword("subgraph") || self.peek() == Some(&Token::LBrace) {
            if self.accept_keyword("subgraph") && self.peek_id() {
                self.id()?;
            }
            self.expect(Token::LBrace, "'{' to open subgraph")?;
            let nodes = self.stmt_list()?;
            self.expect(Token::RBrace, "'}' to close subgraph")?;
            return Ok(nodes);
        }

        let id = self.id()?;
        if self.accept(&Token::Colon) {
            self.id()?;
            if self.accept(&Token::Colon) {
                self.id()?;
            }
        }
        self.graph.add_node(&id, Attrs::new());
        Ok(vec![id])
    }

    fn attr_list(&mut self) -> Result<Attrs, DotParseError> {
        let mut attrs = Attrs::new();
        while self.accept(&Token::LBracket) {
            while !self.accept(&Token::RBracket) {
                let key = self.id()?;
                self.expect(Token::Equals, "'=' in attribute")?;
                let value = self.id()?;
                attrs.push((key, value));
                if !self.accept(&Token::Comma) {
                    self.accept(&Token::Semi);
                }
                if self.peek().is_none() {
                    return Err(self.error("unterminated attribute list"));
                }
            }
        }
        Ok(attrs)
    }
}

/// Parse a DOT document into a flattened [`Graph`]
pub fn parse(input: &str) -> Result<Graph, DotParseError> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        graph: Graph::default(),
    };
    parser.parse_graph()?;
    Ok(parser.graph)
}
