//! `DATE commodity SYMBOL ["description"] [; comment]`, optionally followed
//! by a block of `description "text"`, `subunit N` and `default` lines.
//! Detail keywords are matched ignoring case.

use super::{block_follows, source_of, unexpected, Machine};
use crate::parse::registry::{DirectiveHandler, DirectiveParser};
use crate::parse::token::{Token, TokenKind};
use crate::utils::{comment_text, remove_quotes};
use crate::{Commodity, Directive, Document, EntryHeader, Error, ErrorType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    LookForSymbol,
    IndentOrNew,
    ExpectIndent,
    DetailStart,
    DetailDescription,
    DetailSubUnit,
    DetailEnd,
}

pub(crate) fn transition(
    state: State,
    token: &Token<'_>,
    next: &Token<'_>,
    commodity: &mut Commodity,
) -> Result<Option<State>, Error> {
    let next_state = match (state, token.kind) {
        (State::LookForSymbol, TokenKind::Ident) => {
            commodity.symbol = token.text.to_string();
            State::IndentOrNew
        }
        (State::IndentOrNew, TokenKind::String) if commodity.description.is_empty() => {
            commodity.description = remove_quotes(token.text).to_string();
            State::IndentOrNew
        }
        (State::IndentOrNew | State::DetailStart | State::DetailEnd, TokenKind::Comment) => {
            commodity
                .header
                .comments
                .push(comment_text(token.text).to_string());
            match state {
                State::IndentOrNew => State::IndentOrNew,
                _ => State::DetailEnd,
            }
        }
        (State::IndentOrNew, TokenKind::Newline) if block_follows(next) => State::ExpectIndent,
        (State::IndentOrNew, TokenKind::Newline | TokenKind::Eof) => return Ok(None),
        (State::ExpectIndent, TokenKind::Indent) => State::DetailStart,
        (State::DetailStart, TokenKind::Ident) => match token.text.to_lowercase().as_str() {
            "description" => State::DetailDescription,
            "subunit" => State::DetailSubUnit,
            "default" => {
                commodity.is_default = true;
                State::DetailEnd
            }
            _ => return Err(unexpected(&commodity.header, token, "commodity")),
        },
        (State::DetailDescription, TokenKind::String) => {
            commodity.description = remove_quotes(token.text).to_string();
            State::DetailEnd
        }
        (State::DetailSubUnit, TokenKind::Number) => {
            let sub_unit = token.text.parse::<u32>().ok().filter(|n| *n > 0);
            match sub_unit {
                Some(sub_unit) => commodity.sub_unit = Some(sub_unit),
                None => {
                    return Err(Error::new(
                        ErrorType::Syntax,
                        format!("Invalid sub-unit {}, expected a positive integer.", token.text),
                        source_of(&commodity.header, token),
                    ))
                }
            }
            State::DetailEnd
        }
        (State::DetailEnd, TokenKind::Newline) => State::DetailStart,
        (State::DetailStart | State::DetailEnd, TokenKind::Dedent) => return Ok(None),
        _ => return Err(unexpected(&commodity.header, token, "commodity")),
    };
    Ok(Some(next_state))
}

fn new_parser(header: EntryHeader, _keyword: &str) -> Box<dyn DirectiveParser> {
    let commodity = Commodity {
        header,
        symbol: String::new(),
        description: String::new(),
        sub_unit: None,
        is_default: false,
    };
    Machine::boxed(State::LookForSymbol, commodity, transition, Directive::Commodity)
}

pub(crate) fn handler() -> DirectiveHandler {
    DirectiveHandler {
        new: new_parser,
        add: Document::push,
    }
}
