//! Knobs for the parser and the ledger.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of columns a tab counts for when measuring indentation.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Options for turning text into a [`Document`](crate::Document).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Width of a tab character in indentation.
    pub tab_width: usize,
    /// Number of threads used when several files are parsed at once.
    pub threads: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            tab_width: DEFAULT_TAB_WIDTH,
            threads: num_cpus::get(),
        }
    }
}

impl ParseOptions {
    /// Reads `LUCA_TAB_WIDTH` and `LUCA_PARSER_THREADS`, falling back to the
    /// defaults for anything missing or unparsable.
    pub fn from_env() -> Self {
        let mut options = ParseOptions::default();
        if let Some(width) = env_usize("LUCA_TAB_WIDTH") {
            options.tab_width = width;
        }
        if let Some(threads) = env_usize("LUCA_PARSER_THREADS").filter(|n| *n > 0) {
            options.threads = threads;
        }
        options
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
}

/// Policies the [`Ledger`](crate::Ledger) applies on top of the required
/// invariants.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerOptions {
    /// Require every account name to start with `assets`, `liabilities`,
    /// `equity`, `income` or `expenses`.
    pub strict_account_roots: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ParseOptions::default();
        assert_eq!(options.tab_width, 4);
        assert!(options.threads >= 1);
        assert!(!LedgerOptions::default().strict_account_roots);
    }
}
