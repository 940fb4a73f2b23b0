use crate::account::{LedgerAccount, LinkedMovement, Side};
use crate::load::{luca_files, parse_files};
use crate::options::{LedgerOptions, ParseOptions};
use crate::parse::{DirectiveRegistry, Parser};
use crate::utils::name_key;
use crate::{
    Account, Commodity, Date, Decimal, Document, EntryHeader, Error, ErrorType, Source,
    Transaction,
};
use getset::{CopyGetters, Getters};
use log::{info, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Account name roots accepted when
/// [`LedgerOptions::strict_account_roots`] is set.
pub const ACCOUNT_ROOTS: [&str; 5] = ["assets", "liabilities", "equity", "income", "expenses"];

/// Commodities that may be created on first reference: (key, symbol, description).
const WELL_KNOWN_COMMODITIES: [(&str, &str, &str); 3] = [
    ("gbp", "GBP", "British Pound"),
    ("usd", "USD", "US Dollar"),
    ("eur", "EUR", "Euro"),
];

const DEFAULT_SUB_UNIT: u32 = 100;

/// Validated commodities, accounts and transactions accumulated from one or
/// more documents.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default, Getters, CopyGetters)]
pub struct Ledger {
    /// Returns the commodities in the order they were added.
    #[getset(get = "pub")]
    pub(crate) commodities: Vec<Commodity>,
    commodities_by_key: HashMap<String, usize>,

    /// Returns the accounts in the order they were added.
    #[getset(get = "pub")]
    pub(crate) accounts: Vec<LedgerAccount>,
    accounts_by_key: HashMap<String, usize>,

    /// Returns the transactions in the order they were added.
    #[getset(get = "pub")]
    pub(crate) transactions: Vec<Arc<Transaction>>,

    default_commodity: Option<usize>,

    /// Returns the names of the documents added so far.
    #[getset(get = "pub")]
    pub(crate) files: Vec<String>,

    #[getset(get_copy = "pub")]
    pub(crate) options: LedgerOptions,
}

/// The sizes of everything [`Ledger::add_document`] may grow.
struct Checkpoint {
    commodities: usize,
    default_flags: Vec<bool>,
    default_commodity: Option<usize>,
    accounts: usize,
    movements: Vec<usize>,
    transactions: usize,
    files: usize,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    pub fn with_options(options: LedgerOptions) -> Self {
        Ledger {
            options,
            ..Ledger::default()
        }
    }

    /// Parses every file in `paths` and adds them in sorted path order.
    pub fn from_files<P: AsRef<Path>>(paths: &[P], auto_create: bool) -> Result<Self, Error> {
        let registry = DirectiveRegistry::default();
        let parser = Parser::new(&registry, ParseOptions::from_env());
        let mut ledger = Ledger::new();
        ledger.load_files(&parser, paths, auto_create)?;
        Ok(ledger)
    }

    /// Loads all `*.luca` files directly inside `dir`.
    pub fn from_dir<P: AsRef<Path>>(dir: P, auto_create: bool) -> Result<Self, Error> {
        let paths = luca_files(dir.as_ref())?;
        Self::from_files(&paths, auto_create)
    }

    /// Parses `paths` with `parser`, then adds the documents one by one in
    /// sorted path order. Stops at the first error; documents added before
    /// it stay in the ledger.
    pub fn load_files<P: AsRef<Path>>(
        &mut self,
        parser: &Parser<'_>,
        paths: &[P],
        auto_create: bool,
    ) -> Result<(), Error> {
        let mut paths: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
        paths.sort();
        let documents = parse_files(parser, &paths);
        for (path, document) in paths.iter().zip(documents) {
            self.add_document(&document?, &path.display().to_string(), auto_create)?;
        }
        Ok(())
    }

    pub fn commodity(&self, symbol: &str) -> Option<&Commodity> {
        self.commodities_by_key
            .get(&name_key(symbol))
            .map(|index| &self.commodities[*index])
    }

    pub fn account(&self, name: &str) -> Option<&LedgerAccount> {
        self.accounts_by_key
            .get(&name_key(name))
            .map(|index| &self.accounts[*index])
    }

    pub fn default_commodity(&self) -> Option<&Commodity> {
        self.default_commodity.map(|index| &self.commodities[index])
    }

    /// The balance of every account, in the order accounts were added.
    pub fn balances(&self) -> Vec<(&str, Decimal)> {
        self.accounts
            .iter()
            .map(|account| (account.name(), account.balance()))
            .collect()
    }

    /// Every account's balance including movements dated on or before
    /// `cutoff`.
    pub fn balances_as_of(&self, cutoff: Date) -> Vec<(&str, Decimal)> {
        self.accounts
            .iter()
            .map(|account| (account.name(), account.balance_as_of(cutoff)))
            .collect()
    }

    pub fn add_commodity(&mut self, commodity: &Commodity) -> Result<(), Error> {
        let key = name_key(&commodity.symbol);
        if let Some(index) = self.commodities_by_key.get(&key) {
            return Err(Error::new(
                ErrorType::Duplicate,
                format!(
                    "Commodity {} has been defined at {}.",
                    commodity.symbol, self.commodities[*index].header.src
                ),
                commodity.header.src.clone(),
            ));
        }
        self.commodities_by_key.insert(key, self.commodities.len());
        self.commodities.push(commodity.clone());
        Ok(())
    }

    /// Resolves the commodity given to accounts that name none.
    ///
    /// With no commodity at all a default `GBP` is created; a single
    /// commodity becomes the default; among several exactly one must carry
    /// the `default` flag.
    pub fn set_default_commodity(&mut self, src: &Source) -> Result<(), Error> {
        match self.commodities.len() {
            0 => {
                let mut gbp = synthesize_commodity("GBP", "British Pound", src);
                gbp.is_default = true;
                info!("{}: no commodity defined, defaulting to GBP", src.file);
                self.add_commodity(&gbp)?;
                self.default_commodity = Some(0);
            }
            1 => {
                self.commodities[0].is_default = true;
                self.default_commodity = Some(0);
            }
            _ => {
                let flagged: Vec<usize> = (0..self.commodities.len())
                    .filter(|index| self.commodities[*index].is_default)
                    .collect();
                match flagged.as_slice() {
                    [index] => self.default_commodity = Some(*index),
                    [] => {
                        return Err(Error::new(
                            ErrorType::Ambiguous,
                            format!(
                                "No default commodity among {} commodities.",
                                self.commodities.len()
                            ),
                            src.clone(),
                        ))
                    }
                    _ => {
                        let symbols: Vec<&str> = flagged
                            .iter()
                            .map(|index| self.commodities[*index].symbol.as_str())
                            .collect();
                        return Err(Error::new(
                            ErrorType::Ambiguous,
                            format!("Multiple default commodities found: {}.", symbols.join(", ")),
                            src.clone(),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Makes sure `symbol` names a known commodity, creating it when it is
    /// well known and `auto_create` is set. Returns the symbol as the ledger
    /// spells it.
    fn check_commodity_symbol(
        &mut self,
        symbol: &str,
        auto_create: bool,
        src: &Source,
    ) -> Result<String, Error> {
        let key = name_key(symbol);
        if let Some(index) = self.commodities_by_key.get(&key) {
            return Ok(self.commodities[*index].symbol.clone());
        }
        let well_known = WELL_KNOWN_COMMODITIES.iter().find(|(k, _, _)| *k == key);
        match well_known {
            Some((_, symbol, description)) if auto_create => {
                warn!("{}: creating commodity {}", src, symbol);
                self.add_commodity(&synthesize_commodity(symbol, description, src))?;
                Ok(symbol.to_string())
            }
            _ => Err(Error::new(
                ErrorType::Commodity,
                format!("Unknown commodity {}.", symbol),
                src.clone(),
            )),
        }
    }

    fn check_account_root(&self, name: &str, src: &Source) -> Result<(), Error> {
        if !self.options.strict_account_roots {
            return Ok(());
        }
        let root = name_key(name.split(':').next().unwrap_or_default().trim());
        if ACCOUNT_ROOTS.contains(&root.as_str()) {
            Ok(())
        } else {
            Err(Error::new(
                ErrorType::Account,
                format!(
                    "First part of account name {} must be one of {}.",
                    name,
                    ACCOUNT_ROOTS.join(", ")
                ),
                src.clone(),
            ))
        }
    }

    /// Adds an `open` entry. An account without a commodity gets the
    /// default commodity.
    pub fn add_account(&mut self, account: &Account, auto_create: bool) -> Result<(), Error> {
        let src = &account.header.src;
        self.check_account_root(&account.name, src)?;
        let key = name_key(&account.name);
        if let Some(index) = self.accounts_by_key.get(&key) {
            return Err(Error::new(
                ErrorType::Duplicate,
                format!(
                    "Account {} has been opened at {}.",
                    account.name,
                    self.accounts[*index].account.header.src
                ),
                src.clone(),
            ));
        }
        let commodity = match &account.commodity {
            Some(symbol) => self.check_commodity_symbol(symbol, auto_create, src)?,
            None => match self.default_commodity() {
                Some(default) => default.symbol.clone(),
                None => {
                    return Err(Error::new(
                        ErrorType::Commodity,
                        format!(
                            "Account {} names no commodity and there is no default commodity.",
                            account.name
                        ),
                        src.clone(),
                    ))
                }
            },
        };
        let mut account = account.clone();
        account.commodity = Some(commodity);
        self.insert_account(LedgerAccount::new(account, false));
        Ok(())
    }

    fn insert_account(&mut self, account: LedgerAccount) -> usize {
        let index = self.accounts.len();
        self.accounts_by_key.insert(name_key(account.name()), index);
        self.accounts.push(account);
        index
    }

    /// Finds the account `name`, creating a bare one under `auto_create`.
    fn check_account_name(
        &mut self,
        name: &str,
        auto_create: bool,
        header: &EntryHeader,
    ) -> Result<usize, Error> {
        if let Some(index) = self.accounts_by_key.get(&name_key(name)) {
            return Ok(*index);
        }
        if !auto_create {
            return Err(Error::new(
                ErrorType::Account,
                format!("Account {} not found.", name),
                header.src.clone(),
            ));
        }
        self.check_account_root(name, &header.src)?;
        warn!("{}: creating account {}", header.src, name);
        let account = Account {
            header: EntryHeader::new(header.date, header.src.clone()),
            name: name.to_string(),
            commodity: None,
            description: String::new(),
        };
        Ok(self.insert_account(LedgerAccount::new(account, true)))
    }

    /// Adds a transaction and links each movement onto both of its
    /// accounts.
    ///
    /// A movement is rejected when it would take an account's turnover
    /// beyond what a [`Decimal`] holds, so every balance of the account,
    /// partial or total, stays representable.
    pub fn add_transaction(&mut self, txn: &Transaction, auto_create: bool) -> Result<(), Error> {
        let mut ends = Vec::with_capacity(txn.movements.len());
        let mut turnovers: HashMap<usize, Decimal> = HashMap::new();
        for movement in &txn.movements {
            let from = self.check_account_name(&movement.from, auto_create, &txn.header)?;
            let to = self.check_account_name(&movement.to, auto_create, &txn.header)?;
            for account in [from, to] {
                let turnover = turnovers
                    .get(&account)
                    .copied()
                    .unwrap_or(self.accounts[account].turnover);
                let turnover = turnover
                    .checked_add(movement.amount.abs())
                    .ok_or_else(|| {
                        Error::new(
                            ErrorType::Account,
                            format!(
                                "Movement of {} overflows the balance of account {}.",
                                movement.amount,
                                self.accounts[account].name()
                            ),
                            txn.header.src.clone(),
                        )
                    })?;
                turnovers.insert(account, turnover);
            }
            ends.push((from, to));
        }
        let txn = Arc::new(txn.clone());
        for (index, (from, to)) in ends.into_iter().enumerate() {
            for (account, side) in [(from, Side::From), (to, Side::To)] {
                self.accounts[account].movements.push(LinkedMovement {
                    transaction: txn.clone(),
                    index,
                    side,
                });
            }
        }
        for (account, turnover) in turnovers {
            self.accounts[account].turnover = turnover;
        }
        self.transactions.push(txn);
        Ok(())
    }

    /// Adds a document: commodities, then the default commodity, then
    /// accounts, then transactions. On error the ledger is left as it was
    /// before the call.
    pub fn add_document(
        &mut self,
        doc: &Document,
        filename: &str,
        auto_create: bool,
    ) -> Result<(), Error> {
        let checkpoint = self.checkpoint();
        match self.add_document_entries(doc, filename, auto_create) {
            Ok(()) => {
                self.files.push(filename.to_string());
                info!(
                    "{}: added {} commodities, {} accounts, {} transactions",
                    filename,
                    doc.commodities().len(),
                    doc.accounts().len(),
                    doc.transactions().len()
                );
                Ok(())
            }
            Err(err) => {
                self.rollback(checkpoint);
                Err(err)
            }
        }
    }

    fn add_document_entries(
        &mut self,
        doc: &Document,
        filename: &str,
        auto_create: bool,
    ) -> Result<(), Error> {
        for commodity in doc.commodities() {
            self.add_commodity(commodity)?;
        }
        self.set_default_commodity(&Source::file_start(Arc::new(filename.to_string())))?;
        for account in doc.accounts() {
            self.add_account(account, auto_create)?;
        }
        for txn in doc.transactions() {
            self.add_transaction(txn, auto_create)?;
        }
        Ok(())
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            commodities: self.commodities.len(),
            default_flags: self.commodities.iter().map(|c| c.is_default).collect(),
            default_commodity: self.default_commodity,
            accounts: self.accounts.len(),
            movements: self.accounts.iter().map(|a| a.movements.len()).collect(),
            transactions: self.transactions.len(),
            files: self.files.len(),
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        for commodity in self.commodities.drain(checkpoint.commodities..) {
            self.commodities_by_key.remove(&name_key(&commodity.symbol));
        }
        for (commodity, is_default) in self.commodities.iter_mut().zip(checkpoint.default_flags) {
            commodity.is_default = is_default;
        }
        self.default_commodity = checkpoint.default_commodity;
        for account in self.accounts.drain(checkpoint.accounts..) {
            self.accounts_by_key.remove(&name_key(account.name()));
        }
        for (account, len) in self.accounts.iter_mut().zip(checkpoint.movements) {
            if account.movements.len() != len {
                account.movements.truncate(len);
                account.turnover = account.movements.iter().map(|m| m.change().abs()).sum();
            }
        }
        self.transactions.truncate(checkpoint.transactions);
        self.files.truncate(checkpoint.files);
    }
}

fn synthesize_commodity(symbol: &str, description: &str, src: &Source) -> Commodity {
    Commodity {
        header: EntryHeader::new(Date::default(), src.clone()),
        symbol: symbol.to_string(),
        description: description.to_string(),
        sub_unit: Some(DEFAULT_SUB_UNIT),
        is_default: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn ledger_with(text: &str, auto_create: bool) -> Result<Ledger, Error> {
        let mut ledger = Ledger::new();
        ledger.add_document(&parse(text, "ledger.luca")?, "ledger.luca", auto_create)?;
        Ok(ledger)
    }

    #[test]
    fn empty_document_gets_gbp() {
        let ledger = ledger_with("", false).unwrap();
        let gbp = ledger.default_commodity().unwrap();
        assert_eq!(gbp.symbol, "GBP");
        assert_eq!(gbp.sub_unit, Some(100));
        assert!(gbp.is_default);
        assert_eq!(ledger.files(), &["ledger.luca".to_string()]);
    }

    #[test]
    fn single_commodity_becomes_default() {
        let ledger = ledger_with("2024-01-01 commodity USD\n2024-01-01 open assets:cash\n", false)
            .unwrap();
        assert_eq!(ledger.default_commodity().unwrap().symbol, "USD");
        assert!(ledger.commodity("usd").unwrap().is_default);
        let cash = ledger.account("Assets:Cash").unwrap();
        assert_eq!(cash.account().commodity.as_deref(), Some("USD"));
        assert!(!cash.auto_created());
    }

    #[test]
    fn default_among_several() {
        let text = "2024-01-01 commodity USD\n2024-01-01 commodity EUR\n    default\n";
        let ledger = ledger_with(text, false).unwrap();
        assert_eq!(ledger.default_commodity().unwrap().symbol, "EUR");

        let err = ledger_with("2024-01-01 commodity USD\n2024-01-01 commodity EUR\n", false)
            .unwrap_err();
        assert_eq!(err.r#type, ErrorType::Ambiguous);

        let both = "2024-01-01 commodity USD\n    default\n2024-01-01 commodity EUR\n    default\n";
        let err = ledger_with(both, false).unwrap_err();
        assert_eq!(err.r#type, ErrorType::Ambiguous);
        assert!(err.msg.contains("USD, EUR"), "{}", err.msg);
    }

    #[test]
    fn names_are_unique_ignoring_case() {
        let err = ledger_with("2024-01-01 commodity usd\n2024-01-02 commodity USD\n", false)
            .unwrap_err();
        assert_eq!(err.r#type, ErrorType::Duplicate);
        assert_eq!(err.src.start.line, 2);

        let err = ledger_with(
            "2024-01-01 open assets:cash\n2024-01-02 open Assets:Cash\n",
            false,
        )
        .unwrap_err();
        assert_eq!(err.r#type, ErrorType::Duplicate);
        assert!(err.msg.contains("ledger.luca:1:1"), "{}", err.msg);
    }

    #[test]
    fn unknown_commodity_policy() {
        let err = ledger_with("2024-01-01 open assets:cash USD\n", false).unwrap_err();
        assert_eq!(err.r#type, ErrorType::Commodity);

        let ledger = ledger_with("2024-01-01 open assets:cash usd\n", true).unwrap();
        assert_eq!(ledger.commodity("USD").unwrap().description, "US Dollar");

        let err = ledger_with("2024-01-01 open assets:cash XYZ\n", true).unwrap_err();
        assert_eq!(err.r#type, ErrorType::Commodity);
        assert!(err.msg.contains("XYZ"));
    }

    #[test]
    fn unknown_account_policy() {
        let text = "2024-01-01 txn \"coffee\"\n    assets:cash 3.51 -> expenses:food\n";
        let err = ledger_with(text, false).unwrap_err();
        assert_eq!(err.r#type, ErrorType::Account);
        assert!(err.msg.contains("assets:cash"));

        let ledger = ledger_with(text, true).unwrap();
        let food = ledger.account("expenses:food").unwrap();
        assert!(food.auto_created());
        assert_eq!(food.account().commodity, None);
        assert_eq!(food.balance(), Decimal::new(351, 2));
        assert_eq!(ledger.transactions().len(), 1);
    }

    #[test]
    fn self_transfer_nets_to_zero() {
        let text = "2024-01-01 txn\n    assets:cash 5 -> assets:cash\n";
        let ledger = ledger_with(text, true).unwrap();
        let cash = ledger.account("assets:cash").unwrap();
        assert_eq!(cash.movements().len(), 2);
        assert_eq!(cash.balance(), Decimal::ZERO);
    }

    #[test]
    fn strict_account_roots() {
        let mut ledger = Ledger::with_options(LedgerOptions {
            strict_account_roots: true,
        });
        let doc = parse("2024-01-01 open food\n", "strict.luca").unwrap();
        let err = ledger.add_document(&doc, "strict.luca", false).unwrap_err();
        assert_eq!(err.r#type, ErrorType::Account);

        let doc = parse(
            "2024-01-01 txn\n    Income:Salary 10 -> assets:bank\n",
            "strict.luca",
        )
        .unwrap();
        ledger.add_document(&doc, "strict.luca", true).unwrap();
        assert_eq!(ledger.accounts().len(), 2);
    }

    #[test]
    fn failed_document_rolls_back() {
        let mut ledger = ledger_with(
            "2024-01-01 commodity GBP\n2024-01-01 open assets:cash\n2024-01-01 open equity:input\n2024-01-02 txn\n    equity:input 25.00 -> assets:cash\n",
            false,
        )
        .unwrap();
        let before = ledger.clone();
        let bad = parse(
            "2024-02-01 commodity USD\n2024-02-01 open assets:bank\n2024-02-02 txn\n    equity:input 5 -> assets:bank\n2024-02-03 txn\n    nowhere 1 -> assets:cash\n",
            "bad.luca",
        )
        .unwrap();
        assert!(ledger.add_document(&bad, "bad.luca", false).is_err());
        assert_eq!(ledger, before);
        assert!(ledger.commodity("usd").is_none());
        assert!(ledger.account("assets:bank").is_none());
        assert_eq!(
            ledger.account("equity:input").unwrap().balance(),
            Decimal::new(-2500, 2)
        );
    }

    #[test]
    fn second_document_keeps_auto_flagged_default() {
        let mut ledger = ledger_with("2024-01-01 commodity GBP\n", false).unwrap();
        let doc = parse("2024-01-02 commodity EUR\n2024-01-02 open assets:cash\n", "more.luca")
            .unwrap();
        ledger.add_document(&doc, "more.luca", false).unwrap();
        assert_eq!(ledger.default_commodity().unwrap().symbol, "GBP");
        assert_eq!(
            ledger.account("assets:cash").unwrap().account().commodity.as_deref(),
            Some("GBP")
        );
    }

    #[test]
    fn accounts_store_the_ledger_symbol() {
        let ledger = ledger_with(
            "2024-01-01 commodity Usd\n2024-01-01 open assets:cash usd\n2024-01-01 open assets:bank USD\n",
            false,
        )
        .unwrap();
        for name in ["assets:cash", "assets:bank"] {
            let account = ledger.account(name).unwrap();
            assert_eq!(account.account().commodity.as_deref(), Some("Usd"));
        }

        let ledger = ledger_with("2024-01-01 open assets:cash eur\n", true).unwrap();
        let cash = ledger.account("assets:cash").unwrap();
        assert_eq!(cash.account().commodity.as_deref(), Some("EUR"));
    }

    #[test]
    fn duplicate_account_creates_no_commodity() {
        let mut ledger = ledger_with("2024-01-01 open assets:cash\n", false).unwrap();
        let doc = parse("2024-01-02 open Assets:Cash usd\n", "direct.luca").unwrap();
        let err = ledger.add_account(&doc.accounts()[0], true).unwrap_err();
        assert_eq!(err.r#type, ErrorType::Duplicate);
        assert!(ledger.commodity("usd").is_none());
        assert_eq!(ledger.commodities().len(), 1);
    }

    #[test]
    fn oversized_movements_are_rejected() {
        let big = "2024-01-01 txn\n    equity:a 50000000000000000000000000000 -> assets:b\n";
        let mut ledger = ledger_with(big, true).unwrap();
        let before = ledger.clone();
        assert_eq!(
            ledger.account("assets:b").unwrap().balance(),
            "50000000000000000000000000000".parse::<Decimal>().unwrap()
        );

        let again = parse(
            "2024-01-02 txn\n    equity:a 50000000000000000000000000000 -> assets:b\n",
            "again.luca",
        )
        .unwrap();
        let err = ledger.add_document(&again, "again.luca", true).unwrap_err();
        assert_eq!(err.r#type, ErrorType::Account);
        assert!(err.msg.contains("equity:a"), "{}", err.msg);
        assert_eq!(ledger, before);
        assert_eq!(ledger.account("assets:b").unwrap().history().len(), 1);

        // Opposite signs still count towards the turnover.
        let back = parse(
            "2024-01-02 txn\n    assets:b 40000000000000000000000000000 -> equity:a\n",
            "back.luca",
        )
        .unwrap();
        assert!(ledger.add_document(&back, "back.luca", true).is_err());
        let small = parse("2024-01-02 txn\n    assets:b 1 -> equity:a\n", "small.luca").unwrap();
        ledger.add_document(&small, "small.luca", true).unwrap();
        assert_eq!(ledger.account("equity:a").unwrap().history().len(), 2);
    }

    #[test]
    fn add_account_needs_a_default() {
        let mut ledger = Ledger::new();
        let doc = parse("2024-01-01 open assets:cash\n", "direct.luca").unwrap();
        let err = ledger.add_account(&doc.accounts()[0], false).unwrap_err();
        assert_eq!(err.r#type, ErrorType::Commodity);
    }
}
