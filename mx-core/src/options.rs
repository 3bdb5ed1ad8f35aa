//! Command-line options tokenizer
//!
//! A lightweight getopt alternative. [`Options`] walks an argument list and
//! classifies each argument as a flag, a key/value pair or a positional,
//! consuming at most one look-ahead argument per token. UNIX (`-abc`,
//! `--name`, `--key=value`) and DOS (`/name`, `/key:value`) syntaxes can be
//! enabled independently.
//!
//! ```
//! use mx_core::options::{Options, OptionStyle, TokenKind};
//!
//! let args = ["-v", "--out=a.bin", "input.txt"];
//! let kinds: Vec<_> = Options::new(&args, OptionStyle::default()).map(|t| t.kind).collect();
//! assert_eq!(kinds, [TokenKind::Short, TokenKind::Pair, TokenKind::Positional]);
//! ```

use bitflags::bitflags;
use mx_config::OptionStyleConfig;
use tracing::trace;

bitflags! {
    /// Recognized option syntaxes
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct OptionStyle: u8 {
        /// `-h`, `--help`, `--include=a`
        const UNIX = 1 << 0;
        /// `/?`, `/help`, `/include:a`
        const DOS = 1 << 1;
    }
}

impl Default for OptionStyle {
    fn default() -> Self {
        OptionStyle::all()
    }
}

impl From<OptionStyleConfig> for OptionStyle {
    fn from(config: OptionStyleConfig) -> Self {
        match config {
            OptionStyleConfig::Unix => OptionStyle::UNIX,
            OptionStyleConfig::Dos => OptionStyle::DOS,
            OptionStyleConfig::Both => OptionStyle::all(),
        }
    }
}

/// Classification of one token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Positional,
    /// UNIX only: `-abc`, key `abc`
    Short,
    Long,
    /// Key with value
    Pair,
    /// UNIX only: a lone `-`
    Dash,
    /// UNIX only: a lone `--`
    DoubleDash,
}

/// One classified argument. `key` and `value` borrow from the argument list
/// and are empty when the kind has none.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub key: &'a str,
    pub value: &'a str,
}

impl<'a> Token<'a> {
    fn flag(kind: TokenKind, key: &'a str) -> Self {
        Token { kind, key, value: "" }
    }

    fn pair(key: &'a str, value: &'a str) -> Self {
        Token {
            kind: TokenKind::Pair,
            key,
            value,
        }
    }
}

/// Tokenizer over an argument list. Iteration ends with the list; start a new
/// tokenizer to walk it again.
#[derive(Debug, Clone)]
pub struct Options<'a, S> {
    args: &'a [S],
    index: usize,
    style: OptionStyle,
}

impl<'a, S: AsRef<str>> Options<'a, S> {
    pub fn new(args: &'a [S], style: OptionStyle) -> Self {
        Options {
            args,
            index: 0,
            style,
        }
    }

    /// Index of the next argument to examine
    pub fn position(&self) -> usize {
        self.index
    }

    fn arg(&self, i: usize) -> Option<&'a str> {
        self.args.get(i).map(|s| s.as_ref())
    }

    /// Value split across tokens: the remainder after `sep` when the next
    /// argument starts with it
    fn split_value(&self, sep: char) -> Option<&'a str> {
        self.arg(self.index + 1)
            .and_then(|next| next.strip_prefix(sep))
    }

    fn unix(&mut self, current: &'a str) -> Token<'a> {
        let Some(long) = current.strip_prefix("--") else {
            self.index += 1;
            if current.len() == 1 {
                return Token::flag(TokenKind::Dash, "");
            }
            return Token::flag(TokenKind::Short, &current[1..]);
        };

        if long.is_empty() {
            self.index += 1;
            return Token::flag(TokenKind::DoubleDash, "");
        }

        if let Some((key, value)) = long.split_once('=') {
            if value.is_empty() {
                // `--key= value`
                let value = self.arg(self.index + 1).unwrap_or("");
                self.index += 2;
                return Token::pair(key, value);
            }
            self.index += 1;
            return Token::pair(key, value);
        }

        if let Some(value) = self.split_value('=') {
            // `--key =value`
            self.index += 2;
            return Token::pair(long, value);
        }

        self.index += 1;
        Token::flag(TokenKind::Long, long)
    }

    fn dos(&mut self, current: &'a str) -> Token<'a> {
        let name = &current[1..];

        if let Some((key, value)) = name.split_once(':') {
            if value.is_empty() {
                let value = self.arg(self.index + 1).unwrap_or("");
                self.index += 2;
                return Token::pair(key, value);
            }
            self.index += 1;
            return Token::pair(key, value);
        }

        if let Some(value) = self.split_value(':') {
            self.index += 2;
            return Token::pair(name, value);
        }

        self.index += 1;
        Token::flag(TokenKind::Long, name)
    }
}

impl<'a, S: AsRef<str>> Iterator for Options<'a, S> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let current = self.arg(self.index)?;

        let token = if self.style.contains(OptionStyle::UNIX) && current.starts_with('-') {
            self.unix(current)
        } else if self.style.contains(OptionStyle::DOS) && current.starts_with('/') {
            self.dos(current)
        } else {
            self.index += 1;
            Token {
                kind: TokenKind::Positional,
                key: "",
                value: current,
            }
        };

        trace!(target: crate::targets::OPTIONS, kind = ?token.kind, key = token.key, value = token.value, "token");
        Some(token)
    }
}
