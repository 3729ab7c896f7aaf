//! Enumeration types for constrained ledger values.
//!
//! [`TransactionKind::direction`] is the single place where a kind is
//! mapped to a cash-flow direction. Aggregation and both renderers go
//! through it.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Kind of a ledger transaction. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money received, e.g. a membership payment.
    Income,
    /// Money spent by the business.
    Expense,
    /// A return that brings money back in.
    PositiveReturn,
    /// A return paid out, e.g. a refund to a member.
    NegativeReturn,
}

/// Direction of a cash movement relative to the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CashFlow {
    /// Increases net.
    Inflow,
    /// Decreases net.
    Outflow,
}

impl TransactionKind {
    /// Every kind, in display order.
    pub const ALL: [Self; 4] = [
        Self::Income,
        Self::Expense,
        Self::PositiveReturn,
        Self::NegativeReturn,
    ];

    /// Cash-flow direction implied by this kind.
    #[inline]
    #[must_use]
    pub const fn direction(self) -> CashFlow {
        match self {
            Self::Income | Self::PositiveReturn => CashFlow::Inflow,
            Self::Expense | Self::NegativeReturn => CashFlow::Outflow,
        }
    }

    /// Returns `true` for kinds that increase net.
    #[inline]
    #[must_use]
    pub const fn is_inflow(self) -> bool {
        matches!(self.direction(), CashFlow::Inflow)
    }

    /// Wire name used by the API (`income`, `positive_return`, ...).
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::PositiveReturn => "positive_return",
            Self::NegativeReturn => "negative_return",
        }
    }

    /// Label shown in reports.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
            Self::PositiveReturn => "Positive Return",
            Self::NegativeReturn => "Negative Return",
        }
    }
}

impl CashFlow {
    /// Sign prefix used for amounts in exports.
    #[inline]
    #[must_use]
    pub const fn sign(self) -> char {
        match self {
            Self::Inflow => '+',
            Self::Outflow => '-',
        }
    }
}

impl fmt::Display for TransactionKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    #[inline]
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == raw)
            .ok_or_else(|| LedgerError::UnknownKind(raw.to_owned()))
    }
}
