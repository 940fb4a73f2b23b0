//! State machines of the built-in directives.
//!
//! Each directive is an exhaustive `State` enum and a `transition` function
//! `(state, token, next, &mut value) -> Result<Option<State>, Error>`, where
//! `None` means the directive is complete. [`Machine`] adapts such a pair to
//! [`DirectiveParser`].

pub(crate) mod account;
pub(crate) mod commodity;
pub(crate) mod generic;
pub(crate) mod transaction;

use super::registry::{DirectiveParser, Transition};
use super::token::{Token, TokenKind};
use crate::{Directive, EntryHeader, Error, ErrorType, Source};

type TransitionFn<S, D> = fn(S, &Token<'_>, &Token<'_>, &mut D) -> Result<Option<S>, Error>;

pub(crate) struct Machine<S, D> {
    state: S,
    value: D,
    transition: TransitionFn<S, D>,
    wrap: fn(D) -> Directive,
}

impl<S, D> Machine<S, D> {
    pub fn boxed(
        state: S,
        value: D,
        transition: TransitionFn<S, D>,
        wrap: fn(D) -> Directive,
    ) -> Box<dyn DirectiveParser>
    where
        S: Copy + 'static,
        D: 'static,
    {
        Box::new(Machine {
            state,
            value,
            transition,
            wrap,
        })
    }
}

impl<S: Copy, D> DirectiveParser for Machine<S, D> {
    fn step(&mut self, token: &Token<'_>, next: &Token<'_>) -> Result<Transition, Error> {
        match (self.transition)(self.state, token, next, &mut self.value)? {
            Some(state) => {
                self.state = state;
                Ok(Transition::Continue)
            }
            None => Ok(Transition::Complete),
        }
    }

    fn finish(self: Box<Self>) -> Directive {
        (self.wrap)(self.value)
    }
}

pub(crate) fn source_of(header: &EntryHeader, token: &Token<'_>) -> Source {
    Source {
        file: header.src.file.clone(),
        start: token.location,
        end: token.location.advance(token.text.chars().count()),
    }
}

pub(crate) fn unexpected(header: &EntryHeader, token: &Token<'_>, directive: &str) -> Error {
    let msg = if token.is(TokenKind::Eof) {
        format!("Unexpected end of input when parsing {}.", directive)
    } else {
        format!("Unexpected token {} when parsing {}.", token, directive)
    };
    Error::new(ErrorType::Syntax, msg, source_of(header, token))
}

/// Whether the newline ending a directive's first line opens a detail block.
#[inline]
pub(crate) fn block_follows(next: &Token<'_>) -> bool {
    next.is(TokenKind::Indent)
}
