use super::header::{HeaderBuilder, HeaderStep};
use super::indent::normalize_indentation;
use super::lexer::Lexer;
use super::registry::{DirectiveAdder, DirectiveParser, DirectiveRegistry, Transition};
use super::token::{Token, TokenKind};
use crate::options::ParseOptions;
use crate::{Directive, Document, Error, ErrorType, Location, Source, SrcFile};
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A flag shared between a running parse and whoever may want to stop it.
///
/// The parser checks it once per token and fails with
/// [`ErrorType::Cancelled`] once it is set.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn check(&self, file: &SrcFile, location: Location) -> Result<(), Error> {
        if self.is_cancelled() {
            Err(Error::new(
                ErrorType::Cancelled,
                "Parsing was cancelled.",
                Source {
                    file: file.clone(),
                    start: location,
                    end: location,
                },
            ))
        } else {
            Ok(())
        }
    }
}

/// Receives directives as the parser finishes them.
pub trait DirectiveSink {
    /// `add` is the adder registered with the directive's keyword.
    fn accept(&mut self, directive: Directive, add: DirectiveAdder) -> Result<(), Error>;
}

impl DirectiveSink for Document {
    fn accept(&mut self, directive: Directive, add: DirectiveAdder) -> Result<(), Error> {
        add(self, directive);
        Ok(())
    }
}

enum Stage {
    Header(HeaderBuilder),
    Directive {
        parser: Box<dyn DirectiveParser>,
        add: DirectiveAdder,
    },
}

/// Drives the entry-header reader and the directive state machines over
/// the token stream of one input.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'r> {
    registry: &'r DirectiveRegistry,
    options: ParseOptions,
}

impl<'r> Parser<'r> {
    pub fn new(registry: &'r DirectiveRegistry, options: ParseOptions) -> Self {
        Parser { registry, options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn parse(&self, text: &str, filename: &str) -> Result<Document, Error> {
        self.parse_with(text, filename, &CancellationToken::new())
    }

    pub fn parse_with(
        &self,
        text: &str,
        filename: &str,
        cancel: &CancellationToken,
    ) -> Result<Document, Error> {
        let mut document = Document::default();
        self.parse_into(text, filename, cancel, &mut document)?;
        debug!("{}: parsed {} entries", filename, document.len());
        Ok(document)
    }

    /// Parses `text`, handing every finished directive to `sink` in source
    /// order.
    pub fn parse_into<S: DirectiveSink + ?Sized>(
        &self,
        text: &str,
        filename: &str,
        cancel: &CancellationToken,
        sink: &mut S,
    ) -> Result<(), Error> {
        let file: SrcFile = Arc::new(filename.to_string());
        let normalized = normalize_indentation(text, self.options.tab_width, &file)?;
        let mut lexer = Lexer::new(&normalized, file.clone());
        let mut token = lexer.next_token()?;
        let mut stage = Stage::Header(HeaderBuilder::new(file.clone()));
        loop {
            cancel.check(&file, token.location)?;
            let next = if token.is(TokenKind::Eof) {
                token
            } else {
                lexer.next_token()?
            };
            stage = match stage {
                Stage::Header(mut builder) => match builder.feed(&token)? {
                    HeaderStep::Pending => Stage::Header(builder),
                    HeaderStep::Directive(keyword) => {
                        self.start_directive(builder, keyword, &token, &file)?
                    }
                },
                Stage::Directive { mut parser, add } => match parser.step(&token, &next)? {
                    Transition::Continue => Stage::Directive { parser, add },
                    Transition::Complete => {
                        sink.accept(parser.finish(), add)?;
                        Stage::Header(HeaderBuilder::new(file.clone()))
                    }
                },
            };
            if token.is(TokenKind::Eof) {
                break;
            }
            token = next;
        }
        match stage {
            Stage::Header(builder) if builder.is_dated() => Err(Error::new(
                ErrorType::Syntax,
                "Unexpected end of input: dated entry without a directive.",
                Self::source_at(&file, lexer.location()),
            )),
            Stage::Header(builder) => {
                if !builder.comments().is_empty() {
                    debug!(
                        "{}: dropped {} trailing comment(s)",
                        filename,
                        builder.comments().len()
                    );
                }
                Ok(())
            }
            Stage::Directive { .. } => Err(Error::new(
                ErrorType::Syntax,
                "Unexpected end of input inside a directive.",
                Self::source_at(&file, lexer.location()),
            )),
        }
    }

    fn start_directive(
        &self,
        builder: HeaderBuilder,
        keyword: &str,
        token: &Token<'_>,
        file: &SrcFile,
    ) -> Result<Stage, Error> {
        let handler = self.registry.get(keyword).ok_or_else(|| {
            Error::new(
                ErrorType::Syntax,
                format!("Unknown directive {}.", keyword),
                Source {
                    file: file.clone(),
                    start: token.location,
                    end: token.location.advance(keyword.chars().count()),
                },
            )
        })?;
        let header = builder.finish(token);
        Ok(Stage::Directive {
            parser: (handler.new)(header, keyword),
            add: handler.add,
        })
    }

    fn source_at(file: &SrcFile, location: Location) -> Source {
        Source {
            file: file.clone(),
            start: location,
            end: location,
        }
    }
}

/// Parses `text` with the built-in directives and default options.
pub fn parse(text: &str, filename: &str) -> Result<Document, Error> {
    let registry = DirectiveRegistry::default();
    Parser::new(&registry, ParseOptions::default()).parse(text, filename)
}
