//! Text helpers shared by both renderers.

use rust_decimal::Decimal;

use crate::models::Transaction;

/// Currency code printed in front of formatted amounts.
pub const CURRENCY: &str = "ETB";

/// Placeholder for a transaction without an associated member.
pub const NO_COUNTERPARTY: &str = "-";

/// Placeholder for a transaction without a payment method.
pub const NO_PAYMENT_METHOD: &str = "N/A";

/// Status column value. The ledger only exposes settled transactions.
pub const STATUS_COMPLETED: &str = "Completed";

/// Removes control characters other than tab, line feed and carriage
/// return.
///
/// ```
/// use gym_finance::export::sanitize;
///
/// assert_eq!(sanitize("a\u{0}b\u{1b}[31mc\td"), "ab[31mc\td");
/// ```
#[must_use]
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|&ch| !is_stripped_control(ch))
        .collect()
}

/// Returns `true` for characters [`sanitize`] drops.
const fn is_stripped_control(ch: char) -> bool {
    (ch < ' ' && !matches!(ch, '\t' | '\n' | '\r')) || ch == '\u{7f}'
}

/// Keeps at most `max_chars` characters. No ellipsis is appended.
#[must_use]
pub fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Collapses every run of whitespace, line breaks included, into a single
/// space.
#[must_use]
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Formats an amount as currency: `ETB 1,234.50`, or `-ETB 1,234.50` for
/// negative values.
///
/// ```
/// use gym_finance::export::format_currency;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_currency(Decimal::new(123_450, 2)), "ETB 1,234.50");
/// assert_eq!(format_currency(Decimal::new(-5, 1)), "-ETB 0.50");
/// ```
#[must_use]
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let plain = format!("{:.2}", rounded.abs());
    let (whole, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    format!("{sign}{CURRENCY} {}.{cents}", group_thousands(whole))
}

/// Inserts a comma between every group of three digits.
fn group_thousands(digits: &str) -> String {
    let count = digits.chars().count();
    let mut grouped = String::with_capacity(count.saturating_mul(2));
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (count - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Formats a transaction amount with the sign of its cash-flow direction,
/// e.g. `+1500.00` or `-320.00`.
#[must_use]
pub fn format_signed_amount(tx: &Transaction) -> String {
    format!(
        "{}{:.2}",
        tx.kind.direction().sign(),
        tx.amount.abs().round_dp(2)
    )
}

/// Display strings of one transaction row, sanitized once and shared by
/// the CSV and PDF renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RowText {
    /// ISO calendar date.
    pub(crate) date: String,
    /// Kind label.
    pub(crate) kind: &'static str,
    /// Description, or category when there is none.
    pub(crate) description: String,
    /// Member name or placeholder.
    pub(crate) counterparty: String,
    /// Payment method or placeholder.
    pub(crate) payment_method: String,
    /// Category label.
    pub(crate) category: String,
    /// Amount signed by direction.
    pub(crate) amount: String,
    /// Status placeholder.
    pub(crate) status: &'static str,
}

impl RowText {
    /// Builds the display strings for `tx`.
    pub(crate) fn from_transaction(tx: &Transaction) -> Self {
        Self {
            date: tx.occurred_at.format("%Y-%m-%d").to_string(),
            kind: tx.kind.label(),
            description: sanitize(tx.description_or_category()),
            counterparty: sanitize(tx.counterparty_name().unwrap_or(NO_COUNTERPARTY)),
            payment_method: sanitize(
                tx.payment_method
                    .as_deref()
                    .filter(|method| !method.trim().is_empty())
                    .unwrap_or(NO_PAYMENT_METHOD),
            ),
            category: sanitize(&tx.category),
            amount: format_signed_amount(tx),
            status: STATUS_COMPLETED,
        }
    }

    /// All fields in CSV column order.
    pub(crate) fn record(&self) -> [&str; 8] {
        [
            &self.date,
            self.kind,
            &self.description,
            &self.counterparty,
            &self.payment_method,
            &self.category,
            &self.amount,
            self.status,
        ]
    }

    /// Fields shown in the PDF table, in column order.
    pub(crate) fn table_cells(&self) -> [&str; 7] {
        [
            &self.date,
            self.kind,
            &self.description,
            &self.counterparty,
            &self.payment_method,
            &self.category,
            &self.amount,
        ]
    }
}
