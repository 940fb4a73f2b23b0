use super::token::{RawToken, Token};
use crate::{Error, ErrorType, Location, Source, SrcFile};
use logos::{Lexer as LogosLexer, Logos};

/// Pulls significant tokens out of normalized text, dropping whitespace and
/// keeping track of line and column.
pub struct Lexer<'source> {
    llex: LogosLexer<'source, RawToken>,
    location: Location,
    file: SrcFile,
}

impl<'source> Lexer<'source> {
    pub fn new(src: &'source str, file: SrcFile) -> Self {
        Lexer {
            llex: RawToken::lexer(src),
            location: (1, 1).into(),
            file,
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    fn advance(&mut self, token: RawToken, text: &str) {
        if token == RawToken::NewLine {
            self.location.line += text.len();
            self.location.col = 1;
        } else {
            self.location.col += text.chars().count();
        }
    }

    fn lex_error(&self, text: &str) -> Error {
        let msg = if text.starts_with('"') {
            "Unterminated string.".to_string()
        } else {
            format!("Unrecognized character {:?}.", text)
        };
        Error::new(
            ErrorType::Lex,
            msg,
            Source {
                file: self.file.clone(),
                start: self.location,
                end: self.location.advance(text.chars().count()),
            },
        )
    }

    /// Returns the next significant token, or an `Eof` token once the input
    /// is exhausted.
    pub fn next_token(&mut self) -> Result<Token<'source>, Error> {
        while let Some(raw) = self.llex.next() {
            let text = self.llex.slice();
            if raw == RawToken::Error {
                return Err(self.lex_error(text));
            }
            let location = self.location;
            self.advance(raw, text);
            if let Some(kind) = raw.kind() {
                return Ok(Token {
                    kind,
                    text,
                    location,
                });
            }
        }
        Ok(Token::eof(self.location))
    }
}

/// Tokenizes already normalized text in one go. The parser pulls tokens
/// lazily; this is for inspecting the stream.
pub fn tokenize(normalized: &str, file: SrcFile) -> Result<Vec<Token<'_>>, Error> {
    let mut lexer = Lexer::new(normalized, file);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == super::TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::TokenKind;
    use std::sync::Arc;

    fn file() -> SrcFile {
        Arc::new("lexer.luca".to_string())
    }

    #[test]
    fn whitespace_is_dropped_and_lines_are_counted() {
        let tokens = tokenize("2024-01-01 txn\nINDENT a 1 -> b\n\nDEDENT", file()).unwrap();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Date,
                TokenKind::Ident,
                TokenKind::Newline,
                TokenKind::Indent,
                TokenKind::Ident,
                TokenKind::Number,
                TokenKind::Arrow,
                TokenKind::Ident,
                TokenKind::Newline,
                TokenKind::Dedent,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[1].location, (1, 12).into());
        assert_eq!(tokens[4].location, (2, 8).into());
        assert_eq!(tokens[9].location, (4, 1).into());
    }

    #[test]
    fn unterminated_string_is_a_lex_error() {
        let err = tokenize("2024-01-01 generic \"oops\n", file()).unwrap_err();
        assert_eq!(err.r#type, ErrorType::Lex);
        assert_eq!(err.msg, "Unterminated string.");
        assert_eq!(err.src.start.line, 1);
    }

    #[test]
    fn unknown_character_is_a_lex_error() {
        let err = tokenize("2024-01-01 open\n€", file()).unwrap_err();
        assert_eq!(err.r#type, ErrorType::Lex);
        assert_eq!(err.src.start, (2, 1).into());
    }
}
