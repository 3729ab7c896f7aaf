//! Income, outflow and net totals over a set of transactions.

use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};
use crate::models::{CashFlow, Transaction};

/// Totals of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    /// Sum of inflow amounts.
    pub income: Decimal,
    /// Sum of outflow amounts.
    pub outflow: Decimal,
    /// `income - outflow`.
    pub net: Decimal,
}

impl Totals {
    /// Folds `rows` into totals.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AmountOverflow`] if a total leaves the range
    /// of [`Decimal`].
    pub fn from_rows(rows: &[Transaction]) -> Result<Self> {
        let mut income = Decimal::ZERO;
        let mut outflow = Decimal::ZERO;
        for tx in rows {
            let (total, name) = match tx.kind.direction() {
                CashFlow::Inflow => (&mut income, "income"),
                CashFlow::Outflow => (&mut outflow, "outflow"),
            };
            *total = total.checked_add(tx.amount).ok_or(LedgerError::AmountOverflow {
                total: name,
                id: tx.id.into_inner(),
            })?;
        }
        let net = income.checked_sub(outflow).ok_or(LedgerError::AmountOverflow {
            total: "net",
            id: rows.last().map_or(0, |tx| tx.id.into_inner()),
        })?;
        Ok(Self {
            income,
            outflow,
            net,
        })
    }
}

/// Reduces `rows` into income, outflow and net totals.
///
/// Direction comes from [`TransactionKind::direction`] only; the sign of
/// the amount and the category are ignored.
///
/// # Errors
///
/// Returns [`LedgerError::AmountOverflow`] if a total overflows.
///
/// [`TransactionKind::direction`]: crate::models::TransactionKind::direction
#[inline]
pub fn aggregate(rows: &[Transaction]) -> Result<Totals> {
    Totals::from_rows(rows)
}
