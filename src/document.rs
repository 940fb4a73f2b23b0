//! Typed entries of a `.luca` file and their canonical text form.

use crate::{Date, Decimal, Source};
use getset::Getters;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// The part every entry shares: leading comment lines, the value date and
/// the optional knowledge date.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryHeader {
    pub date: Date,
    /// The date the entry was recorded or became known, written `^date`.
    pub knowledge_date: Option<Date>,
    pub comments: Vec<String>,
    /// Where the entry starts. `src.file` is the file the entry came from.
    pub src: Source,
}

impl EntryHeader {
    pub fn new(date: Date, src: Source) -> Self {
        EntryHeader {
            date,
            knowledge_date: None,
            comments: Vec::new(),
            src,
        }
    }

    pub fn source_file(&self) -> &str {
        self.src.file.as_str()
    }
}

impl fmt::Display for EntryHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for comment in &self.comments {
            writeln!(f, "; {}", comment)?;
        }
        write!(f, "{}", self.date.format("%Y-%m-%d"))?;
        if let Some(knowledge_date) = self.knowledge_date {
            write!(f, " ^{}", knowledge_date.format("%Y-%m-%d"))?;
        }
        Ok(())
    }
}

/// A `commodity` directive.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commodity {
    pub header: EntryHeader,
    pub symbol: String,
    pub description: String,
    /// How many of the smallest unit make up one unit, e.g. 100 pence.
    pub sub_unit: Option<u32>,
    /// Set by a `default` line in the detail block.
    pub is_default: bool,
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} commodity {}", self.header, self.symbol)?;
        if !self.description.is_empty() {
            writeln!(f, "\tdescription \"{}\"", self.description)?;
        }
        if let Some(sub_unit) = self.sub_unit {
            writeln!(f, "\tsubunit {}", sub_unit)?;
        }
        if self.is_default {
            writeln!(f, "\tdefault")?;
        }
        Ok(())
    }
}

/// An `open` directive.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub header: EntryHeader,
    pub name: String,
    /// `None` means the ledger's default commodity.
    pub commodity: Option<String>,
    pub description: String,
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} open {}", self.header, self.name)?;
        if let Some(commodity) = &self.commodity {
            write!(f, " {}", commodity)?;
        }
        writeln!(f)?;
        if !self.description.is_empty() {
            writeln!(f, "\tdescription \"{}\"", self.description)?;
        }
        Ok(())
    }
}

/// One leg of a transaction: `from amount arrow to`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Movement {
    pub from: String,
    pub amount: Decimal,
    /// The arrow exactly as written, so it survives a round trip.
    pub arrow: String,
    pub to: String,
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.from, self.amount, self.arrow, self.to)
    }
}

/// A `txn`, `*` or `transaction` directive.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub header: EntryHeader,
    /// The keyword the transaction was written with.
    pub keyword: String,
    pub description: String,
    pub comment: String,
    pub movements: Vec<Movement>,
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.header, self.keyword)?;
        write_description_and_comment(f, &self.description, &self.comment)?;
        for movement in &self.movements {
            writeln!(f, "\t{}", movement)?;
        }
        Ok(())
    }
}

/// A `generic` directive: a description and a block of quoted lines.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericEntry {
    pub header: EntryHeader,
    pub description: String,
    pub comment: String,
    pub sub_directives: Vec<String>,
}

impl fmt::Display for GenericEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} generic", self.header)?;
        write_description_and_comment(f, &self.description, &self.comment)?;
        for sub_directive in &self.sub_directives {
            writeln!(f, "\t\"{}\"", sub_directive)?;
        }
        Ok(())
    }
}

fn write_description_and_comment(
    f: &mut fmt::Formatter<'_>,
    description: &str,
    comment: &str,
) -> fmt::Result {
    if !description.is_empty() {
        write!(f, " \"{}\"", description)?;
    }
    if !comment.is_empty() {
        write!(f, " ; {}", comment)?;
    }
    writeln!(f)
}

/// Any parsed entry.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Commodity(Commodity),
    Account(Account),
    Transaction(Transaction),
    Generic(GenericEntry),
}

impl Directive {
    pub fn header(&self) -> &EntryHeader {
        match self {
            Directive::Commodity(commodity) => &commodity.header,
            Directive::Account(account) => &account.header,
            Directive::Transaction(txn) => &txn.header,
            Directive::Generic(generic) => &generic.header,
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Commodity(commodity) => write!(f, "{}", commodity),
            Directive::Account(account) => write!(f, "{}", account),
            Directive::Transaction(txn) => write!(f, "{}", txn),
            Directive::Generic(generic) => write!(f, "{}", generic),
        }
    }
}

/// The entries of one parsed input, grouped by kind. Within a kind the
/// source order is kept.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default, Getters)]
pub struct Document {
    /// Returns the `commodity` entries.
    #[getset(get = "pub")]
    pub(crate) commodities: Vec<Commodity>,

    /// Returns the `open` entries.
    #[getset(get = "pub")]
    pub(crate) accounts: Vec<Account>,

    /// Returns the transactions.
    #[getset(get = "pub")]
    pub(crate) transactions: Vec<Transaction>,

    /// Returns the `generic` entries.
    #[getset(get = "pub")]
    pub(crate) generic_entries: Vec<GenericEntry>,
}

impl Document {
    /// Appends a directive to the sequence of its kind. This is the adder
    /// the built-in directives register.
    pub fn push(&mut self, directive: Directive) {
        match directive {
            Directive::Commodity(commodity) => self.commodities.push(commodity),
            Directive::Account(account) => self.accounts.push(account),
            Directive::Transaction(txn) => self.transactions.push(txn),
            Directive::Generic(generic) => self.generic_entries.push(generic),
        }
    }

    pub fn len(&self) -> usize {
        self.commodities.len()
            + self.accounts.len()
            + self.transactions.len()
            + self.generic_entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serializes the document: commodities, then accounts, then
    /// transactions, then generic entries.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl FromIterator<Directive> for Document {
    fn from_iter<I: IntoIterator<Item = Directive>>(iter: I) -> Self {
        let mut document = Document::default();
        for directive in iter {
            document.push(directive);
        }
        document
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for commodity in &self.commodities {
            write!(f, "{}", commodity)?;
        }
        for account in &self.accounts {
            write!(f, "{}", account)?;
        }
        for txn in &self.transactions {
            write!(f, "{}", txn)?;
        }
        for generic in &self.generic_entries {
            write!(f, "{}", generic)?;
        }
        Ok(())
    }
}
