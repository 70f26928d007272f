//! Collision-free markers for literal operator characters.
//!
//! Before a condition is handed to the grouping parser, every literal `*`,
//! `+`, `,` and whitespace character is swapped for a marker so the only live `*`
//! and `,` left are the ones standing for AND and OR. The markers are
//! restored once parsing is done.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Number of hex digits of the digest kept in a marker.
const MARKER_DIGITS: usize = 12;

/// Whitespace markers carry the code point in hex after this tag.
const WHITESPACE_TAG: &str = "ws";

/// The literal characters protected from the grouping parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Asterisk,
    Plus,
    Comma,
    /// One whitespace character, kept exactly (space, tab, newline, ...).
    Whitespace(char),
}

impl Literal {
    fn tag(self) -> String {
        match self {
            Literal::Asterisk => "ast".to_string(),
            Literal::Plus => "plus".to_string(),
            Literal::Comma => "com".to_string(),
            Literal::Whitespace(c) => format!("{WHITESPACE_TAG}{:X}", c as u32),
        }
    }

    /// The character a marker restores to.
    pub fn text(self) -> char {
        match self {
            Literal::Asterisk => '*',
            Literal::Plus => '+',
            Literal::Comma => ',',
            Literal::Whitespace(c) => c,
        }
    }
}

/// A marker prefix unique to one normalization call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    prefix: String,
}

impl Placeholder {
    /// Derive a marker prefix from `input` and fresh entropy.
    ///
    /// The prefix is a SHA-256 digest of the input and a nonce drawn from
    /// `rng`. A prefix that already occurs in the input is redrawn.
    pub fn generate<R: Rng + ?Sized>(input: &str, rng: &mut R) -> Self {
        loop {
            let nonce: u64 = rng.random();
            let mut hasher = Sha256::new();
            hasher.update(input.as_bytes());
            hasher.update(nonce.to_le_bytes());
            let digest = format!("{:x}", hasher.finalize()).to_uppercase();
            let prefix = format!("__{}", &digest[..MARKER_DIGITS]);
            if !input.contains(&prefix) {
                return Self { prefix };
            }
        }
    }

    /// The marker standing for `literal`.
    pub fn marker(&self, literal: Literal) -> String {
        format!("{}_{}__", self.prefix, literal.tag())
    }

    /// Swap every marker in `text` back to its literal.
    pub fn restore(&self, text: &str) -> String {
        let text = [Literal::Asterisk, Literal::Plus, Literal::Comma]
            .into_iter()
            .fold(text.to_string(), |acc, literal| {
                acc.replace(&self.marker(literal), &literal.text().to_string())
            });
        self.restore_whitespace(&text)
    }

    /// Decode `<prefix>_ws<HEX>__` markers back to their characters.
    ///
    /// Undecodable markers are left in place for the leak check to report.
    fn restore_whitespace(&self, text: &str) -> String {
        let opener = format!("{}_{}", self.prefix, WHITESPACE_TAG);
        let mut restored = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find(&opener) {
            restored.push_str(&rest[..start]);
            let after = &rest[start + opener.len()..];
            let decoded = after.split_once("__").and_then(|(code, tail)| {
                let c = u32::from_str_radix(code, 16).ok().and_then(char::from_u32)?;
                Some((c, tail))
            });
            match decoded {
                Some((c, tail)) => {
                    restored.push(c);
                    rest = tail;
                }
                None => {
                    restored.push_str(&opener);
                    rest = after;
                }
            }
        }
        restored.push_str(rest);
        restored
    }

    /// True if any part of a marker survives in `text`.
    pub fn leaked_into(&self, text: &str) -> bool {
        text.contains(&self.prefix)
    }
}
