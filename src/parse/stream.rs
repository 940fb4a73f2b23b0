//! Producer/consumer parsing: entries are handed out while the rest of the
//! input is still being parsed.

use super::parser::{CancellationToken, DirectiveSink, Parser};
use super::registry::DirectiveAdder;
use crate::{Directive, Error, ErrorType};
use log::debug;
use std::sync::mpsc::{sync_channel, SyncSender};
use std::thread;

/// Number of finished entries that may wait for the consumer.
pub const STREAM_BUFFER: usize = 64;

/// Consumes entries delivered by [`stream_entries`].
pub trait EntryHandler {
    fn handle(&mut self, directive: &Directive) -> Result<(), Error>;
}

impl<F> EntryHandler for F
where
    F: FnMut(&Directive) -> Result<(), Error>,
{
    fn handle(&mut self, directive: &Directive) -> Result<(), Error> {
        self(directive)
    }
}

struct ChannelSink {
    tx: SyncSender<Directive>,
}

impl DirectiveSink for ChannelSink {
    fn accept(&mut self, directive: Directive, _add: DirectiveAdder) -> Result<(), Error> {
        self.tx.send(directive).map_err(|err| {
            Error::new(
                ErrorType::Cancelled,
                "Entry consumer stopped.",
                err.0.header().src.clone(),
            )
        })
    }
}

/// Parses `text` on a separate thread and passes every entry, in source
/// order, to each of `handlers` on the calling thread.
///
/// The first handler error stops the parse and is returned. Returns the
/// number of delivered entries.
pub fn stream_entries(
    parser: &Parser<'_>,
    text: &str,
    filename: &str,
    handlers: &mut [&mut dyn EntryHandler],
) -> Result<usize, Error> {
    let cancel = CancellationToken::new();
    let (tx, rx) = sync_channel(STREAM_BUFFER);
    thread::scope(|scope| {
        let producer = {
            let cancel = cancel.clone();
            scope.spawn(move || {
                let mut sink = ChannelSink { tx };
                parser.parse_into(text, filename, &cancel, &mut sink)
            })
        };

        let mut delivered = 0;
        let mut handler_error = None;
        'entries: for directive in rx.iter() {
            for handler in handlers.iter_mut() {
                if let Err(err) = handler.handle(&directive) {
                    handler_error = Some(err);
                    break 'entries;
                }
            }
            delivered += 1;
        }
        if handler_error.is_some() {
            cancel.cancel();
        }
        drop(rx);

        let produced = match producer.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        };
        debug!("{}: streamed {} entries", filename, delivered);
        match (handler_error, produced) {
            (Some(err), _) => Err(err),
            (None, Err(err)) => Err(err),
            (None, Ok(())) => Ok(delivered),
        }
    })
}
