//! # luca
//!
//! luca is a double-entry accounting tool, and a library for parsing
//! indentation-based `.luca` ledger files.
//!
//! ```
//! use luca::{parse::parse, Ledger};
//!
//! let text = "2024-01-01 commodity GBP\n\
//!             2024-01-01 open equity:input\n\
//!             2024-01-01 open assets:cash\n\
//!             2024-01-02 txn \"Opening balance\"\n    \
//!                 equity:input 25.00 -> assets:cash\n";
//! let doc = parse(text, "afp.luca").unwrap();
//! let mut ledger = Ledger::new();
//! ledger.add_document(&doc, "afp.luca", false).unwrap();
//! assert_eq!(ledger.account("assets:cash").unwrap().balance().to_string(), "25.00");
//! ```

mod account;
mod document;
mod error;
mod ledger;
pub mod load;
pub mod options;
pub mod parse;
pub mod utils;

pub use account::*;
pub use chrono::NaiveDate as Date;
pub use document::*;
pub use error::*;
pub use ledger::*;
pub use options::{LedgerOptions, ParseOptions};
pub use rust_decimal::Decimal;
