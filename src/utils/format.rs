use chrono::{DateTime, Local, Utc};

const MILLION: f64 = 1_000_000.0;

/// Display formatting for amounts and rates.
///
/// Zero is `0.00`, values from one million up are shown in millions
/// (`1.23M`), positive values below one cent switch to scientific notation
/// (`3.40e-3`), everything else is fixed-point with en-US digit grouping.
pub fn format_number(x: f64) -> String {
    if x.is_nan() {
        return "NaN".into();
    }
    if x.is_infinite() {
        return if x > 0.0 { "∞".into() } else { "-∞".into() };
    }
    if x == 0.0 {
        return "0.00".into();
    }
    if x >= MILLION {
        return format!("{:.2}M", round_cents(x / MILLION));
    }
    if x > 0.0 && x < 0.01 {
        return format!("{:.2e}", x);
    }
    group_thousands(x)
}

/// Rounds to two decimals with ties away from zero; `{:.2}` alone would
/// send 0.125 to 0.12.
fn round_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn group_thousands(x: f64) -> String {
    let fixed = format!("{:.2}", round_cents(x.abs()));
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if x < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

pub fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        "AUD" => Some("A$"),
        "CAD" => Some("C$"),
        "CHF" => Some("Fr"),
        "CNY" => Some("¥"),
        "SEK" => Some("kr"),
        "NZD" => Some("NZ$"),
        _ => None,
    }
}

/// Prefixes a formatted amount with the currency symbol, or the code when
/// no symbol is known.
pub fn with_symbol(amount: &str, code: &str) -> String {
    format!("{}{}", currency_symbol(code).unwrap_or(code), amount)
}

pub fn rate_label(from: &str, to: &str, rate: f64) -> String {
    format!("1 {} = {} {}", from, format_number(rate), to)
}

pub fn last_updated_label(at: &DateTime<Utc>) -> String {
    format!("Last updated: {}", at.with_timezone(&Local).format("%-I:%M:%S %p"))
}

/// Reads an amount the way a numeric text field does: the longest numeric
/// prefix wins, anything unparsable counts as zero.
pub fn parse_amount(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    let mut best = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let mut saw_digit = false;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        saw_digit = true;
        best = end;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            saw_digit = true;
            best = end;
        }
    }
    if saw_digit && end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            best = exp_end;
        }
    }

    if !saw_digit {
        return 0.0;
    }
    match s[..best].parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}
