//! Presentation helpers for integer currency amounts.

use serde::{Deserialize, Serialize};

/// Suffix used when no currency is configured.
pub const DEFAULT_CURRENCY_SUFFIX: &str = "Toman";

/// Render `amount` with `,` between every group of three digits.
pub fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format with the default currency suffix, e.g. `1,250,000 Toman`.
pub fn format_price(amount: u64) -> String {
    PriceFormat::default().format(amount)
}

/// Price formatting settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFormat {
    currency_suffix: String,
}

impl PriceFormat {
    pub fn new(currency_suffix: impl Into<String>) -> Self {
        Self {
            currency_suffix: currency_suffix.into().trim().to_string(),
        }
    }

    pub fn currency_suffix(&self) -> &str {
        &self.currency_suffix
    }

    /// Grouped amount followed by the currency suffix (omitted when empty).
    pub fn format(&self, amount: u64) -> String {
        let grouped = group_thousands(amount);
        if self.currency_suffix.is_empty() {
            grouped
        } else {
            format!("{grouped} {}", self.currency_suffix)
        }
    }
}

impl Default for PriceFormat {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_SUFFIX)
    }
}
