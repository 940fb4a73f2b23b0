//! From `.luca` text to a [`Document`](crate::Document).
//!
//! Parsing runs in two passes: [`normalize_indentation`] rewrites leading
//! whitespace into `INDENT`/`DEDENT` markers, then the [`Parser`] pulls
//! tokens from the [`Lexer`] and drives the header reader and the directive
//! state machines found in a [`DirectiveRegistry`].

pub(crate) mod directives;
mod header;
mod indent;
mod lexer;
mod parser;
mod registry;
pub mod stream;
mod token;

pub use indent::{normalize_indentation, DEDENT, INDENT};
pub use lexer::{tokenize, Lexer};
pub use parser::*;
pub use registry::{
    DirectiveAdder, DirectiveHandler, DirectiveNew, DirectiveParser, DirectiveRegistry,
    Transition,
};
pub use stream::{stream_entries, EntryHandler};
pub use token::{Token, TokenKind};
