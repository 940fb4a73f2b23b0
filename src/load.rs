//! Reading and parsing `.luca` files from disk.

use crate::parse::Parser;
use crate::{Document, Error, ErrorType, Source};
use log::debug;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

pub const LEDGER_FILE_EXTENSION: &str = "luca";

fn io_error(path: &Path, msg: String) -> Error {
    Error::new(
        ErrorType::Io,
        msg,
        Source::file_start(Arc::new(path.display().to_string())),
    )
}

/// The `*.luca` files directly inside `dir`, sorted by path.
pub fn luca_files(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let entries = fs::read_dir(dir)
        .map_err(|err| io_error(dir, format!("Couldn't read directory {}: {}", dir.display(), err)))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|err| io_error(dir, format!("Couldn't read directory {}: {}", dir.display(), err)))?
            .path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == LEDGER_FILE_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Reads and parses one file. The file name recorded in every entry is the
/// path as given.
pub fn parse_file(parser: &Parser<'_>, path: &Path) -> Result<Document, Error> {
    let text = fs::read_to_string(path)
        .map_err(|err| io_error(path, format!("Couldn't read {}: {}", path.display(), err)))?;
    parser.parse(&text, &path.display().to_string())
}

/// Parses `paths` on up to `parser.options().threads` threads. Results come
/// back in the order of `paths`.
pub fn parse_files(parser: &Parser<'_>, paths: &[PathBuf]) -> Vec<Result<Document, Error>> {
    let queue: Mutex<VecDeque<(usize, &PathBuf)>> = Mutex::new(paths.iter().enumerate().collect());
    let num_threads = parser.options().threads.clamp(1, paths.len().max(1));
    debug!("parsing {} files on {} threads", paths.len(), num_threads);

    let worker = || {
        let mut parsed = Vec::new();
        loop {
            let task = queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            match task {
                Some((index, path)) => parsed.push((index, parse_file(parser, path))),
                None => return parsed,
            }
        }
    };

    let mut results: Vec<Option<Result<Document, Error>>> = paths.iter().map(|_| None).collect();
    thread::scope(|scope| {
        let handlers: Vec<_> = (1..num_threads).map(|_| scope.spawn(worker)).collect();
        let mut collect = |parsed: Vec<(usize, Result<Document, Error>)>| {
            for (index, result) in parsed {
                results[index] = Some(result);
            }
        };
        collect(worker());
        for handler in handlers {
            match handler.join() {
                Ok(parsed) => collect(parsed),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
    });
    // Every queued index is filled exactly once.
    results.into_iter().flatten().collect()
}
