//! `DATE generic ["description"] [; comment]` with a block of quoted
//! sub-directives.

use super::{block_follows, unexpected, Machine};
use crate::parse::registry::{DirectiveHandler, DirectiveParser};
use crate::parse::token::{Token, TokenKind};
use crate::utils::{comment_text, remove_quotes};
use crate::{Directive, Document, EntryHeader, Error, GenericEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    FirstLine,
    ExpectIndent,
    SubDirective,
    LineEnd,
}

pub(crate) fn transition(
    state: State,
    token: &Token<'_>,
    next: &Token<'_>,
    entry: &mut GenericEntry,
) -> Result<Option<State>, Error> {
    let next_state = match (state, token.kind) {
        (State::FirstLine, TokenKind::String)
            if entry.description.is_empty() && entry.comment.is_empty() =>
        {
            entry.description = remove_quotes(token.text).to_string();
            State::FirstLine
        }
        (State::FirstLine, TokenKind::Comment) if entry.comment.is_empty() => {
            entry.comment = comment_text(token.text).to_string();
            State::FirstLine
        }
        (State::FirstLine, TokenKind::Newline) if block_follows(next) => State::ExpectIndent,
        (State::FirstLine, TokenKind::Newline | TokenKind::Eof) => return Ok(None),
        (State::ExpectIndent, TokenKind::Indent) => State::SubDirective,
        (State::SubDirective, TokenKind::String) => {
            entry
                .sub_directives
                .push(remove_quotes(token.text).to_string());
            State::LineEnd
        }
        (State::SubDirective | State::LineEnd, TokenKind::Comment) => {
            entry.header.comments.push(comment_text(token.text).to_string());
            State::LineEnd
        }
        (State::LineEnd, TokenKind::Newline) => State::SubDirective,
        (State::SubDirective | State::LineEnd, TokenKind::Dedent) => return Ok(None),
        _ => return Err(unexpected(&entry.header, token, "generic entry")),
    };
    Ok(Some(next_state))
}

fn new_parser(header: EntryHeader, _keyword: &str) -> Box<dyn DirectiveParser> {
    let entry = GenericEntry {
        header,
        description: String::new(),
        comment: String::new(),
        sub_directives: Vec::new(),
    };
    Machine::boxed(State::FirstLine, entry, transition, Directive::Generic)
}

pub(crate) fn handler() -> DirectiveHandler {
    DirectiveHandler {
        new: new_parser,
        add: Document::push,
    }
}
