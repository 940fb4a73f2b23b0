//! Keyword -> directive handler lookup.
//!
//! The outer parser loop only knows how to read entry headers. When it meets
//! a directive keyword it asks the registry for the handler, builds the
//! directive's state machine with `new`, feeds it tokens until it reports
//! [`Transition::Complete`], and finally hands the result to `add`.

use super::directives::{account, commodity, generic, transaction};
use super::token::Token;
use crate::{Directive, Document, EntryHeader, Error};
use std::collections::HashMap;

/// What a directive state machine wants after consuming a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Keep feeding tokens.
    Continue,
    /// The directive is finished; the next token starts a new entry.
    Complete,
}

/// The state machine of one directive being parsed.
pub trait DirectiveParser {
    /// Consumes `token`. `next` is the token after it, for decisions that
    /// need one token of lookahead.
    fn step(&mut self, token: &Token<'_>, next: &Token<'_>) -> Result<Transition, Error>;

    /// The finished directive.
    fn finish(self: Box<Self>) -> Directive;
}

/// Builds a state machine for an entry whose header has been read. The
/// second argument is the keyword that selected the handler.
pub type DirectiveNew = fn(EntryHeader, &str) -> Box<dyn DirectiveParser>;

/// Stores a finished directive.
pub type DirectiveAdder = fn(&mut Document, Directive);

#[derive(Clone, Copy)]
pub struct DirectiveHandler {
    pub new: DirectiveNew,
    pub add: DirectiveAdder,
}

impl std::fmt::Debug for DirectiveHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectiveHandler").finish_non_exhaustive()
    }
}

/// The set of directive keywords a [`Parser`](super::Parser) understands.
#[derive(Debug, Clone)]
pub struct DirectiveRegistry {
    handlers: HashMap<String, DirectiveHandler>,
}

impl DirectiveRegistry {
    /// A registry without any directive.
    pub fn empty() -> Self {
        DirectiveRegistry {
            handlers: HashMap::new(),
        }
    }

    /// Registers `handler` under `keyword`, returning the handler it
    /// replaces.
    pub fn register(
        &mut self,
        keyword: impl Into<String>,
        handler: DirectiveHandler,
    ) -> Option<DirectiveHandler> {
        self.handlers.insert(keyword.into(), handler)
    }

    pub fn get(&self, keyword: &str) -> Option<&DirectiveHandler> {
        self.handlers.get(keyword)
    }

    pub fn keywords(&self) -> Vec<&str> {
        let mut keywords: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        keywords.sort_unstable();
        keywords
    }
}

impl Default for DirectiveRegistry {
    /// `commodity`, `open`, `txn`, `*`, `transaction` and `generic`.
    fn default() -> Self {
        let mut registry = DirectiveRegistry::empty();
        registry.register("commodity", commodity::handler());
        registry.register("open", account::handler());
        for keyword in ["txn", "*", "transaction"] {
            registry.register(keyword, transaction::handler());
        }
        registry.register("generic", generic::handler());
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keywords() {
        let registry = DirectiveRegistry::default();
        assert_eq!(
            registry.keywords(),
            vec!["*", "commodity", "generic", "open", "transaction", "txn"]
        );
        assert!(registry.get("close").is_none());
    }

    #[test]
    fn register_replaces_and_aliases() {
        let mut registry = DirectiveRegistry::default();
        assert!(registry.register("account", account::handler()).is_none());
        assert!(registry.register("txn", generic::handler()).is_some());
        assert!(registry.get("account").is_some());
    }
}
