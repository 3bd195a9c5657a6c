//! Token kinds and the tokens the tokenizer produces

use std::fmt;

/// First symbol number used for nonterminals in grammar tables
pub const NONTERMINAL: i32 = 256;

/// Number of terminal token kinds
pub const N_TOKENS: usize = 30;

/// Terminal symbols; the discriminants are the grammar table numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    EndMarker = 0,
    Name = 1,
    Number = 2,
    String = 3,
    Newline = 4,
    Indent = 5,
    Dedent = 6,
    LPar = 7,
    RPar = 8,
    LSqb = 9,
    RSqb = 10,
    Colon = 11,
    Comma = 12,
    Semi = 13,
    Plus = 14,
    Minus = 15,
    Star = 16,
    Slash = 17,
    VBar = 18,
    Amper = 19,
    Less = 20,
    Greater = 21,
    Equal = 22,
    Dot = 23,
    Percent = 24,
    BackQuote = 25,
    LBrace = 26,
    RBrace = 27,
    Op = 28,
    ErrorToken = 29,
}

const KINDS: [TokenKind; N_TOKENS] = [
    TokenKind::EndMarker,
    TokenKind::Name,
    TokenKind::Number,
    TokenKind::String,
    TokenKind::Newline,
    TokenKind::Indent,
    TokenKind::Dedent,
    TokenKind::LPar,
    TokenKind::RPar,
    TokenKind::LSqb,
    TokenKind::RSqb,
    TokenKind::Colon,
    TokenKind::Comma,
    TokenKind::Semi,
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Star,
    TokenKind::Slash,
    TokenKind::VBar,
    TokenKind::Amper,
    TokenKind::Less,
    TokenKind::Greater,
    TokenKind::Equal,
    TokenKind::Dot,
    TokenKind::Percent,
    TokenKind::BackQuote,
    TokenKind::LBrace,
    TokenKind::RBrace,
    TokenKind::Op,
    TokenKind::ErrorToken,
];

const NAMES: [&str; N_TOKENS] = [
    "ENDMARKER",
    "NAME",
    "NUMBER",
    "STRING",
    "NEWLINE",
    "INDENT",
    "DEDENT",
    "LPAR",
    "RPAR",
    "LSQB",
    "RSQB",
    "COLON",
    "COMMA",
    "SEMI",
    "PLUS",
    "MINUS",
    "STAR",
    "SLASH",
    "VBAR",
    "AMPER",
    "LESS",
    "GREATER",
    "EQUAL",
    "DOT",
    "PERCENT",
    "BACKQUOTE",
    "LBRACE",
    "RBRACE",
    "OP",
    "ERRORTOKEN",
];

impl TokenKind {
    /// Kind for a grammar table symbol number, if it is a terminal
    pub fn from_type(ty: i32) -> Option<Self> {
        usize::try_from(ty).ok().and_then(|i| KINDS.get(i).copied())
    }

    #[inline]
    pub fn as_type(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        NAMES[self as usize]
    }

    /// Whether dumps should show the token's text
    pub fn has_text(self) -> bool {
        matches!(self, Self::Name | Self::Number | Self::String | Self::Op)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Single-character punctuation; anything unlisted is `Op`
pub fn token_char(c: u8) -> TokenKind {
    match c {
        b'(' => TokenKind::LPar,
        b')' => TokenKind::RPar,
        b'[' => TokenKind::LSqb,
        b']' => TokenKind::RSqb,
        b':' => TokenKind::Colon,
        b',' => TokenKind::Comma,
        b';' => TokenKind::Semi,
        b'+' => TokenKind::Plus,
        b'-' => TokenKind::Minus,
        b'*' => TokenKind::Star,
        b'/' => TokenKind::Slash,
        b'|' => TokenKind::VBar,
        b'&' => TokenKind::Amper,
        b'<' => TokenKind::Less,
        b'>' => TokenKind::Greater,
        b'=' => TokenKind::Equal,
        b'.' => TokenKind::Dot,
        b'%' => TokenKind::Percent,
        b'`' => TokenKind::BackQuote,
        b'{' => TokenKind::LBrace,
        b'}' => TokenKind::RBrace,
        _ => TokenKind::Op,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text; empty for NEWLINE, INDENT, DEDENT and ENDMARKER
    pub text: String,
    /// 1-based physical line the token starts on
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.has_text() {
            write!(f, "{}({})", self.kind, self.text)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbering_matches_tables() {
        for (i, kind) in KINDS.iter().enumerate() {
            assert_eq!(kind.as_type(), i as i32);
            assert_eq!(TokenKind::from_type(i as i32), Some(*kind));
        }
        assert_eq!(TokenKind::from_type(N_TOKENS as i32), None);
        assert_eq!(TokenKind::from_type(-1), None);
        assert_eq!(TokenKind::from_type(NONTERMINAL), None);
    }

    #[test]
    fn test_token_char() {
        assert_eq!(token_char(b'('), TokenKind::LPar);
        assert_eq!(token_char(b'`'), TokenKind::BackQuote);
        assert_eq!(token_char(b'!'), TokenKind::Op);
        assert_eq!(token_char(b'^'), TokenKind::Op);
    }

    #[test]
    fn test_display() {
        assert_eq!(Token::new(TokenKind::Name, "if", 1).to_string(), "NAME(if)");
        assert_eq!(Token::new(TokenKind::Colon, ":", 1).to_string(), "COLON");
        assert_eq!(Token::new(TokenKind::Indent, "", 2).to_string(), "INDENT");
    }
}
