//! Reads the part every entry starts with:
//! `[; comment]* DATE [^KNOWLEDGE_DATE] KEYWORD`.

use super::token::{Token, TokenKind};
use crate::utils::{comment_text, parse_date};
use crate::{Date, EntryHeader, Error, ErrorType, Location, Source, SrcFile};

/// Outcome of feeding one token to a [`HeaderBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderStep<'source> {
    Pending,
    /// The keyword that selects the directive.
    Directive(&'source str),
}

#[derive(Debug)]
pub(crate) struct HeaderBuilder {
    file: SrcFile,
    start: Option<Location>,
    date: Option<Date>,
    knowledge_date: Option<Date>,
    comments: Vec<String>,
}

impl HeaderBuilder {
    pub fn new(file: SrcFile) -> Self {
        HeaderBuilder {
            file,
            start: None,
            date: None,
            knowledge_date: None,
            comments: Vec::new(),
        }
    }

    fn src_at(&self, token: &Token<'_>) -> Source {
        Source {
            file: self.file.clone(),
            start: token.location,
            end: token.location.advance(token.text.chars().count()),
        }
    }

    fn error(&self, token: &Token<'_>, msg: String) -> Error {
        Error::new(ErrorType::Syntax, msg, self.src_at(token))
    }

    /// True once a date has been read, i.e. the builder holds more than
    /// free-standing comments.
    pub fn is_dated(&self) -> bool {
        self.date.is_some()
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn feed<'source>(&mut self, token: &Token<'source>) -> Result<HeaderStep<'source>, Error> {
        match token.kind {
            TokenKind::Comment => self.comments.push(comment_text(token.text).to_string()),
            TokenKind::Newline | TokenKind::Eof => {}
            TokenKind::Date => {
                if self.date.is_some() {
                    return Err(self.error(token, format!("Unexpected second date {}.", token.text)));
                }
                self.date = Some(parse_date(token.text, &self.src_at(token))?);
                self.start = Some(token.location);
            }
            TokenKind::KnowledgeDate => {
                if self.date.is_none() {
                    return Err(self.error(
                        token,
                        format!("Knowledge date {} must follow a date.", token.text),
                    ));
                }
                if self.knowledge_date.is_some() {
                    return Err(self.error(
                        token,
                        format!("Unexpected second knowledge date {}.", token.text),
                    ));
                }
                let date_str = &token.text[1..];
                self.knowledge_date = Some(parse_date(date_str, &self.src_at(token))?);
            }
            TokenKind::Ident | TokenKind::Asterisk => {
                if self.date.is_none() {
                    return Err(self.error(
                        token,
                        format!("Directive {} must be preceded by a date.", token.text),
                    ));
                }
                return Ok(HeaderStep::Directive(token.text));
            }
            _ => {
                return Err(self.error(
                    token,
                    format!("Unexpected token {} when parsing entry header.", token),
                ))
            }
        }
        Ok(HeaderStep::Pending)
    }

    /// Builds the header once the directive keyword has been seen.
    pub fn finish(self, keyword: &Token<'_>) -> EntryHeader {
        let start = self.start.unwrap_or(keyword.location);
        EntryHeader {
            // `feed` refuses keywords before a date.
            date: self.date.unwrap_or_default(),
            knowledge_date: self.knowledge_date,
            comments: self.comments,
            src: Source {
                file: self.file,
                start,
                end: keyword.location.advance(keyword.text.chars().count()),
            },
        }
    }
}
