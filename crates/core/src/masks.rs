//! Progressive input masks for tax IDs, phone numbers and currency.
//!
//! Every formatter strips non-digit characters first and then re-applies
//! punctuation, so feeding a formatter its own output returns the same
//! string. Partial input yields a partially formatted string; nothing here
//! fails.

/// Maximum digits in a person tax ID (CPF).
pub const CPF_DIGITS: usize = 11;

/// Maximum digits in an organization tax ID (CNPJ).
pub const CNPJ_DIGITS: usize = 14;

/// Maximum digits in a phone number (2-digit area code + 9-digit mobile).
pub const PHONE_MAX_DIGITS: usize = 11;

/// Prefix rendered before every formatted currency amount.
pub const CURRENCY_PREFIX: &str = "R$ ";

/// Remove every non-digit character.
pub fn unmask(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Apply the CPF (`000.000.000-00`) or CNPJ (`00.000.000/0000-00`) mask,
/// chosen by digit count alone.
///
/// Up to 11 digits are treated as a CPF; anything longer is formatted as a
/// CNPJ and truncated to 14 digits.
pub fn format_tax_id(value: &str) -> String {
    let digits = unmask(value);
    if digits.len() <= CPF_DIGITS {
        format_cpf(&digits)
    } else {
        format_cnpj(&digits)
    }
}

/// Apply the CPF mask `000.000.000-00`, truncating to 11 digits.
pub fn format_cpf(value: &str) -> String {
    let digits = unmask(value);
    punctuate(&digits[..digits.len().min(CPF_DIGITS)], &[(3, '.'), (6, '.'), (9, '-')])
}

/// Apply the CNPJ mask `00.000.000/0000-00`, truncating to 14 digits.
pub fn format_cnpj(value: &str) -> String {
    let digits = unmask(value);
    punctuate(
        &digits[..digits.len().min(CNPJ_DIGITS)],
        &[(2, '.'), (5, '.'), (8, '/'), (12, '-')],
    )
}

/// Apply the phone mask `(00) 0000-0000` or `(00) 00000-0000`.
///
/// The area code gets its parentheses once the third digit arrives. Ten
/// digits or fewer use a 4-digit prefix on the local number; eleven use a
/// 5-digit prefix.
pub fn format_phone(value: &str) -> String {
    let digits = unmask(value);
    let digits = &digits[..digits.len().min(PHONE_MAX_DIGITS)];

    if digits.len() <= 2 {
        return digits.to_string();
    }

    let (area, local) = digits.split_at(2);
    let prefix_len = if digits.len() == PHONE_MAX_DIGITS { 5 } else { 4 };

    let local = if local.len() > prefix_len {
        format!("{}-{}", &local[..prefix_len], &local[prefix_len..])
    } else {
        local.to_string()
    };

    format!("({area}) {local}")
}

/// Render raw keystrokes as a BRL amount, treating the digits as cents.
///
/// `"123456"` becomes `"R$ 1.234,56"`. Input without digits yields an
/// empty string so placeholder text still shows.
pub fn format_currency(value: &str) -> String {
    let digits = unmask(value);
    if digits.is_empty() {
        return String::new();
    }

    let cents = digits.bytes().fold(0u64, |acc, b| {
        acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
    });
    format_cents(cents)
}

/// Render an integer number of cents as `R$ 1.234,56`.
pub fn format_cents(cents: u64) -> String {
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{CURRENCY_PREFIX}{grouped},{fraction:02}")
}

/// Insert separators before the given digit positions, skipping any
/// position the input has not reached yet.
fn punctuate(digits: &str, separators: &[(usize, char)]) -> String {
    let mut out = String::with_capacity(digits.len() + separators.len());
    for (i, ch) in digits.chars().enumerate() {
        if let Some((_, sep)) = separators.iter().find(|(pos, _)| *pos == i) {
            out.push(*sep);
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
