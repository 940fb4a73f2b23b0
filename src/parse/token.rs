use crate::Location;
use logos::Logos;
use std::fmt;

/// Lexical classes recognized in normalized text.
#[derive(Debug, PartialEq, Logos, Clone, Copy)]
pub(crate) enum RawToken {
    #[regex(r"[ \t\r\f]+")]
    WhiteSpace,

    #[token("INDENT")]
    Indent,

    #[token("DEDENT")]
    Dedent,

    #[regex(r"\n+")]
    NewLine,

    #[regex(r"\d\d\d\d[\-/]\d\d[\-/]\d\d")]
    Date,

    #[regex(r"\^\d\d\d\d[\-/]\d\d[\-/]\d\d")]
    KnowledgeDate,

    #[regex(r#""[^"\n]*""#)]
    String,

    #[regex(r"[\-\+]?\d+(\.\d*)?")]
    #[regex(r"[\-\+]?\.\d+")]
    Number,

    #[token("->")]
    #[token("→")]
    #[token("⮕")]
    #[token("🡒")]
    #[token("⇒")]
    #[token("⟶")]
    #[token("➜")]
    #[token("➝")]
    #[token("➞")]
    #[token("➡")]
    #[token("⇨")]
    #[token("⇾")]
    #[token("⟹")]
    Arrow,

    #[regex(r"[a-zA-Z][a-zA-Z0-9_:]*")]
    Ident,

    #[token("*")]
    Asterisk,

    #[regex(r";[^\n]*")]
    #[regex(r"//[^\n]*")]
    Comment,

    #[error]
    Error,
}

/// Kinds of the significant tokens handed to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Indent,
    Dedent,
    Newline,
    Date,
    KnowledgeDate,
    String,
    Number,
    Arrow,
    Ident,
    Asterisk,
    Comment,
    Eof,
}

impl RawToken {
    /// `None` for tokens the parser never sees.
    pub(crate) fn kind(self) -> Option<TokenKind> {
        let kind = match self {
            RawToken::WhiteSpace | RawToken::Error => return None,
            RawToken::Indent => TokenKind::Indent,
            RawToken::Dedent => TokenKind::Dedent,
            RawToken::NewLine => TokenKind::Newline,
            RawToken::Date => TokenKind::Date,
            RawToken::KnowledgeDate => TokenKind::KnowledgeDate,
            RawToken::String => TokenKind::String,
            RawToken::Number => TokenKind::Number,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::Ident => TokenKind::Ident,
            RawToken::Asterisk => TokenKind::Asterisk,
            RawToken::Comment => TokenKind::Comment,
        };
        Some(kind)
    }
}

/// A significant token: its kind, the text it covers and where it starts in
/// the normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'source> {
    pub kind: TokenKind,
    pub text: &'source str,
    pub location: Location,
}

impl<'source> Token<'source> {
    pub fn eof(location: Location) -> Self {
        Token {
            kind: TokenKind::Eof,
            text: "",
            location,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::Newline => write!(f, "Newline"),
            _ => write!(f, "{:?}({})", self.kind, self.text),
        }
    }
}
