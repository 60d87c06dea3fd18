use super::domain::PremiumAmount;
use serde_json::Number;

const LAKH: u64 = 100_000;
const THOUSAND: u64 = 1_000;

/// Integer magnitude of a premium, or `None` when nothing numeric can be read.
///
/// Both forms are stripped of every non-digit character before parsing, so
/// `"₹12,500"` reads as 12500 and the number `1500.75` reads the same as the text
/// `"1500.75"`.
pub fn premium_magnitude(amount: &PremiumAmount) -> Option<u64> {
    match amount {
        PremiumAmount::Number(number) => digits_only(&number_text(number)),
        PremiumAmount::Text(text) => digits_only(text),
    }
}

// Integral floats print without a fractional part (`1500.0` as `1500`).
fn number_text(number: &Number) -> String {
    if number.is_f64() {
        number
            .as_f64()
            .map(|value| value.to_string())
            .unwrap_or_default()
    } else {
        number.to_string()
    }
}

fn digits_only(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Short form used on cards: `1.5K`, `2.3L`, or the plain value below a thousand.
///
/// One decimal, rounded half up (`1250` is `1.3K`).
pub fn format_compact(amount: Option<u64>) -> String {
    match amount {
        Some(value) if value >= LAKH => with_suffix(value, LAKH, 'L'),
        Some(value) if value >= THOUSAND => with_suffix(value, THOUSAND, 'K'),
        Some(value) => value.to_string(),
        None => "0".to_string(),
    }
}

fn with_suffix(value: u64, divisor: u64, suffix: char) -> String {
    let tenths = (u128::from(value) * 10 + u128::from(divisor / 2)) / u128::from(divisor);
    format!("{}.{}{suffix}", tenths / 10, tenths % 10)
}

/// Full value with lakh/crore digit grouping (`12,34,567`), without a currency symbol.
pub fn format_grouped(amount: Option<u64>) -> String {
    let digits = amount.unwrap_or(0).to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// Compact form straight from a raw premium value.
pub fn format_compact_amount(amount: Option<&PremiumAmount>) -> String {
    format_compact(amount.and_then(premium_magnitude))
}
