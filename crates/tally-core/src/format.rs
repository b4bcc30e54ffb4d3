//! Currency presentation helpers

use serde::{Deserialize, Serialize};

/// How money amounts are rendered in human-facing messages
///
/// Amounts are rounded to whole currency units (ties to even) and grouped by
/// thousands, e.g. `1825000.0` renders as `1,825,000원` with the embedded
/// format. A minus sign goes in front of the prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    pub prefix: String,
    pub suffix: String,
    pub thousands_separator: String,
}

impl CurrencyFormat {
    pub fn format(&self, amount: f64) -> String {
        let rounded = amount.round_ties_even();
        let sign = if rounded < 0.0 { "-" } else { "" };
        format!(
            "{}{}{}{}",
            sign,
            self.prefix,
            group_thousands(rounded.abs(), &self.thousands_separator),
            self.suffix
        )
    }
}

/// Group the digits of a non-negative whole amount
fn group_thousands(value: f64, separator: &str) -> String {
    let digits = format!("{:.0}", value);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 * separator.len());

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(ch);
    }
    grouped
}
