use askama::Result;
use rust_decimal::Decimal;
use std::borrow::Borrow;

// Custom filter to render an amount as `1,234.50`.
// This allows us to use `|money` in the templates; CSV exports keep the plain form.
#[allow(clippy::unnecessary_wraps)]
pub fn money<T: Borrow<Decimal>>(value: T) -> Result<String> {
    Ok(format_amount(*value.borrow()))
}

pub fn format_amount(value: Decimal) -> String {
    let text = format!("{:.2}", value.round_dp(2));
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}{grouped}.{fraction}")
}
