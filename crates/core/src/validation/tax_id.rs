//! Brazilian tax ID checksum validation (CPF and CNPJ).
//!
//! Both algorithms derive two check digits from weighted sums modulo 11 and
//! compare them against the last two digits of the input. Sequences of a
//! single repeated digit pass the arithmetic but are known to be invalid, so
//! they are rejected up front.

use crate::masks::{unmask, CNPJ_DIGITS, CPF_DIGITS};

/// CNPJ weights for the first check digit.
const CNPJ_WEIGHTS_FIRST: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// CNPJ weights for the second check digit.
const CNPJ_WEIGHTS_SECOND: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Which tax ID format a digit string claims to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxIdKind {
    /// Individual taxpayer (CPF, 11 digits).
    Person,
    /// Legal entity (CNPJ, 14 digits).
    Organization,
}

impl TaxIdKind {
    /// Detect the kind from the digit count of a raw or masked value.
    ///
    /// Returns `None` for any length other than 11 or 14.
    pub fn detect(value: &str) -> Option<Self> {
        match unmask(value).len() {
            CPF_DIGITS => Some(Self::Person),
            CNPJ_DIGITS => Some(Self::Organization),
            _ => None,
        }
    }

    /// Run the checksum validator matching this kind.
    pub fn validate(self, value: &str) -> bool {
        match self {
            Self::Person => validate_cpf(value),
            Self::Organization => validate_cnpj(value),
        }
    }
}

/// Validate a CPF, masked or raw.
pub fn validate_cpf(value: &str) -> bool {
    let Some(digits) = checked_digits(value, CPF_DIGITS) else {
        return false;
    };

    let first = cpf_check_digit(&digits[..9], 10);
    if first != digits[9] {
        return false;
    }
    cpf_check_digit(&digits[..10], 11) == digits[10]
}

/// Validate a CNPJ, masked or raw.
pub fn validate_cnpj(value: &str) -> bool {
    let Some(digits) = checked_digits(value, CNPJ_DIGITS) else {
        return false;
    };

    let first = cnpj_check_digit(&digits[..12], &CNPJ_WEIGHTS_FIRST);
    if first != digits[12] {
        return false;
    }
    cnpj_check_digit(&digits[..13], &CNPJ_WEIGHTS_SECOND) == digits[13]
}

/// Weights descend from `top_weight` to 2; a remainder of 10 maps to 0.
fn cpf_check_digit(digits: &[u32], top_weight: u32) -> u32 {
    let sum: u32 = digits
        .iter()
        .zip((2..=top_weight).rev())
        .map(|(d, w)| d * w)
        .sum();
    let digit = (sum * 10) % 11;
    if digit == 10 {
        0
    } else {
        digit
    }
}

/// A remainder below 2 maps to 0, otherwise `11 - remainder`.
fn cnpj_check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

/// Strip the mask and return the digits when the length matches and the
/// value is not a single repeated digit.
fn checked_digits(value: &str, expected_len: usize) -> Option<Vec<u32>> {
    let digits: Vec<u32> = unmask(value)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() != expected_len {
        return None;
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return None;
    }
    Some(digits)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- CPF --

    #[test]
    fn valid_cpf_masked_and_raw() {
        assert!(validate_cpf("111.444.777-35"));
        assert!(validate_cpf("11144477735"));
        assert!(validate_cpf("529.982.247-25"));
    }

    #[test]
    fn cpf_with_wrong_check_digits_is_rejected() {
        assert!(!validate_cpf("111.444.777-36"));
        assert!(!validate_cpf("111.444.777-45"));
    }

    #[test]
    fn cpf_with_transposed_digits_is_rejected() {
        assert!(!validate_cpf("114.144.777-35"));
    }

    #[test]
    fn cpf_wrong_length_is_rejected() {
        assert!(!validate_cpf(""));
        assert!(!validate_cpf("1114447773"));
        assert!(!validate_cpf("111444777350"));
    }

    #[test]
    fn cpf_repeated_digits_are_rejected() {
        for d in 0..=9 {
            let value = d.to_string().repeat(11);
            assert!(!validate_cpf(&value), "{value} must be rejected");
        }
    }

    // -- CNPJ --

    #[test]
    fn valid_cnpj_masked_and_raw() {
        assert!(validate_cnpj("11.222.333/0001-81"));
        assert!(validate_cnpj("11222333000181"));
    }

    #[test]
    fn cnpj_with_wrong_check_digits_is_rejected() {
        assert!(!validate_cnpj("11.222.333/0001-82"));
        assert!(!validate_cnpj("11.222.333/0001-91"));
    }

    #[test]
    fn cnpj_wrong_length_is_rejected() {
        assert!(!validate_cnpj("1122233300018"));
        assert!(!validate_cnpj("11144477735"));
    }

    #[test]
    fn cnpj_repeated_digits_are_rejected() {
        for d in 0..=9 {
            let value = d.to_string().repeat(14);
            assert!(!validate_cnpj(&value), "{value} must be rejected");
        }
    }

    // -- TaxIdKind --

    #[test]
    fn kind_detected_from_digit_count() {
        assert_eq!(TaxIdKind::detect("111.444.777-35"), Some(TaxIdKind::Person));
        assert_eq!(
            TaxIdKind::detect("11.222.333/0001-81"),
            Some(TaxIdKind::Organization)
        );
        assert_eq!(TaxIdKind::detect("123"), None);
        assert_eq!(TaxIdKind::detect(""), None);
    }

    #[test]
    fn kind_dispatches_to_matching_validator() {
        assert!(TaxIdKind::Person.validate("111.444.777-35"));
        assert!(!TaxIdKind::Organization.validate("111.444.777-35"));
        assert!(TaxIdKind::Organization.validate("11.222.333/0001-81"));
    }
}
