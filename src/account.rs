use crate::{Account, Date, Decimal, Movement, Transaction};
use getset::{CopyGetters, Getters};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

/// Which end of a movement an account is on.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The amount leaves the account.
    From,
    /// The amount enters the account.
    To,
}

/// A movement of a ledger transaction, seen from one of its accounts.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, CopyGetters)]
pub struct LinkedMovement {
    pub(crate) transaction: Arc<Transaction>,
    pub(crate) index: usize,

    /// Returns the side the account is on.
    #[getset(get_copy = "pub")]
    pub(crate) side: Side,
}

impl LinkedMovement {
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn movement(&self) -> &Movement {
        &self.transaction.movements[self.index]
    }

    pub fn date(&self) -> Date {
        self.transaction.header.date
    }

    /// The signed effect on the account: negative on the `from` side.
    pub fn change(&self) -> Decimal {
        match self.side {
            Side::From => -self.movement().amount,
            Side::To => self.movement().amount,
        }
    }

    /// Orders by date, knowledge date, amount, then transaction description.
    fn chronological(&self, other: &Self) -> Ordering {
        let header = &self.transaction.header;
        let other_header = &other.transaction.header;
        header
            .date
            .cmp(&other_header.date)
            .then_with(|| header.knowledge_date.cmp(&other_header.knowledge_date))
            .then_with(|| self.movement().amount.cmp(&other.movement().amount))
            .then_with(|| {
                self.transaction
                    .description
                    .cmp(&other.transaction.description)
            })
    }
}

/// One step of an account's running balance.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancePoint {
    pub date: Date,
    pub description: String,
    pub change: Decimal,
    pub balance: Decimal,
}

/// An account of a [`Ledger`](crate::Ledger) and the movements touching it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct LedgerAccount {
    /// Returns the `open` entry, or the entry synthesized when the account
    /// was created on first reference.
    #[getset(get = "pub")]
    pub(crate) account: Account,

    /// Returns whether the account was created by a transaction referring
    /// to it rather than by an `open` entry.
    #[getset(get_copy = "pub")]
    pub(crate) auto_created: bool,

    pub(crate) movements: Vec<LinkedMovement>,

    /// Sum of the absolute changes of all movements; bounds every balance.
    pub(crate) turnover: Decimal,
}

impl LedgerAccount {
    pub(crate) fn new(account: Account, auto_created: bool) -> Self {
        LedgerAccount {
            account,
            auto_created,
            movements: Vec::new(),
            turnover: Decimal::ZERO,
        }
    }

    pub fn name(&self) -> &str {
        &self.account.name
    }

    /// Movements in chronological order. Ties keep insertion order.
    pub fn movements(&self) -> Vec<&LinkedMovement> {
        let mut movements: Vec<&LinkedMovement> = self.movements.iter().collect();
        movements.sort_by(|a, b| a.chronological(b));
        movements
    }

    pub fn balance(&self) -> Decimal {
        self.movements.iter().map(LinkedMovement::change).sum()
    }

    /// Balance including every movement dated on or before `cutoff`.
    pub fn balance_as_of(&self, cutoff: Date) -> Decimal {
        self.movements
            .iter()
            .filter(|m| m.date() <= cutoff)
            .map(LinkedMovement::change)
            .sum()
    }

    /// The running balance after each movement, in chronological order.
    pub fn history(&self) -> Vec<BalancePoint> {
        let mut balance = Decimal::ZERO;
        self.movements()
            .into_iter()
            .map(|m| {
                let change = m.change();
                balance += change;
                BalancePoint {
                    date: m.date(),
                    description: m.transaction.description.clone(),
                    change,
                    balance,
                }
            })
            .collect()
    }
}
