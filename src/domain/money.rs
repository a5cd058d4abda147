use thiserror::Error;

/// Amounts are integer minor units (paisa), so Rs 20.50 = 2050.
pub type Amount = i64;

/// Minor units per whole rupee.
pub const MINOR_PER_UNIT: Amount = 100;

/// Build an amount from whole rupees.
pub const fn rupees(units: i64) -> Amount {
    units * MINOR_PER_UNIT
}

/// Render an amount as `units.minor`.
/// Example: 200000 -> "2000.00", -1234 -> "-12.34"
pub fn format_amount(amount: Amount) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.abs();
    format!(
        "{}{}.{:02}",
        sign,
        abs / MINOR_PER_UNIT,
        abs % MINOR_PER_UNIT
    )
}

/// Parse a decimal string into minor units.
/// Example: "2000" -> 200000, "12.5" -> 1250, ".50" -> 50
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (units_str, minor_str) = match digits.split_once('.') {
        Some((units, minor)) => (units, minor),
        None => (digits, ""),
    };
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(units_str)
        || !all_digits(minor_str)
        || (units_str.is_empty() && minor_str.is_empty())
    {
        return Err(ParseAmountError::InvalidFormat(input.to_string()));
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        parse_digits(units_str, input)?
    };

    // Pad or truncate the fractional part to two digits
    let minor: i64 = match minor_str.len() {
        0 => 0,
        1 => parse_digits(minor_str, input)? * 10,
        _ => parse_digits(&minor_str[..2], input)?,
    };

    let amount = units
        .checked_mul(MINOR_PER_UNIT)
        .and_then(|a| a.checked_add(minor))
        .ok_or_else(|| ParseAmountError::OutOfRange(input.to_string()))?;

    Ok(if negative { -amount } else { amount })
}

fn parse_digits(s: &str, input: &str) -> Result<i64, ParseAmountError> {
    s.parse()
        .map_err(|_| ParseAmountError::OutOfRange(input.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAmountError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid amount format: {0}")]
    InvalidFormat(String),

    #[error("amount out of range: {0}")]
    OutOfRange(String),
}
