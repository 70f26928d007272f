//! SQL Tokens - the atomic units of query output.
//!
//! Generated queries reference legalized identifiers only, so identifiers are
//! written verbatim rather than quoted.

/// SQL Token - every element the query assembler emits.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    From,
    Where,
    And,
    Or,
    As,
    On,
    Inner,
    Join,

    // === Punctuation ===
    Comma,
    Dot,
    LParen,
    RParen,

    // === Operators ===
    Eq,

    // === Whitespace ===
    Space,

    // === Dynamic Content ===
    /// Table, column or alias name (already legalized).
    Ident(String),
    /// String literal
    LitString(String),

    // === Escape Hatch ===
    /// Text passed through untouched.
    ///
    /// Used for user-written condition predicates, which are opaque to the
    /// compiler apart from their `table.field` references.
    Raw(String),
}

impl Token {
    /// Serialize this token to a string.
    pub fn serialize(&self) -> String {
        match self {
            // Keywords
            Token::Select => "SELECT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::And => "AND".into(),
            Token::Or => "OR".into(),
            Token::As => "AS".into(),
            Token::On => "ON".into(),
            Token::Inner => "INNER".into(),
            Token::Join => "JOIN".into(),

            // Punctuation
            Token::Comma => ",".into(),
            Token::Dot => ".".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            // Operators
            Token::Eq => "=".into(),

            // Whitespace
            Token::Space => " ".into(),

            // Dynamic
            Token::Ident(name) => name.clone(),
            Token::LitString(s) => quote_string_single(s),

            // Escape hatch
            Token::Raw(s) => s.clone(),
        }
    }
}

/// Quote string with single quotes (standard SQL).
fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// A stream of tokens that can be serialized to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    /// Serialize all tokens to a SQL string.
    pub fn serialize(&self) -> String {
        self.tokens.iter().map(Token::serialize).collect()
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn dot(&mut self) -> &mut Self {
        self.push(Token::Dot)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
    pub fn ident(&mut self, name: &str) -> &mut Self {
        self.push(Token::Ident(name.to_string()))
    }
}
