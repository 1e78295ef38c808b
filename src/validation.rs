//! CPF checksum, display formatting and query validation.
//!
//! Every query is validated here before any outbound call is made.

use crate::errors::AppError;

/// Minimum number of digits accepted for a phone query (DDD + number).
pub const MIN_PHONE_DIGITS: usize = 10;

/// Minimum number of characters accepted for a name query.
pub const MIN_NAME_CHARS: usize = 3;

/// Keeps only ASCII digits.
pub fn strip_non_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validate a CPF (Cadastro de Pessoas Físicas) number.
///
/// Non-digit characters are ignored, so both `11144477735` and
/// `111.444.777-35` are accepted. Rejects:
/// - anything that is not 11 digits long
/// - sequences of a single repeated digit (`00000000000`, `11111111111`...)
/// - numbers whose two modulo-11 check digits do not match
pub fn is_valid_cpf(raw: &str) -> bool {
    let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != 11 {
        return false;
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Weights run from `len + 1` down to 2; remainders below 2 map to 0.
fn check_digit(digits: &[u32]) -> u32 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

/// Format an 11-digit CPF as `XXX.XXX.XXX-XX`.
///
/// Anything that is not exactly 11 ASCII digits is returned unchanged.
pub fn format_cpf(raw: &str) -> String {
    if raw.len() != 11 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.to_string();
    }
    format!(
        "{}.{}.{}-{}",
        &raw[0..3],
        &raw[3..6],
        &raw[6..9],
        &raw[9..11]
    )
}

/// Validate a CPF query and return its digits.
pub fn validate_cpf_query(raw: Option<&str>) -> Result<String, AppError> {
    let raw = raw.unwrap_or_default();
    if !is_valid_cpf(raw) {
        tracing::warn!("❌ Invalid CPF received (length {})", raw.len());
        return Err(AppError::BadRequest(
            "CPF inválido. Verifique os dígitos.".to_string(),
        ));
    }
    Ok(strip_non_digits(raw))
}

/// Validate a phone query and return its digits.
pub fn validate_phone_query(raw: Option<&str>) -> Result<String, AppError> {
    let digits = strip_non_digits(raw.unwrap_or_default());
    if digits.len() < MIN_PHONE_DIGITS {
        tracing::warn!("❌ Phone query too short: {} digits", digits.len());
        return Err(AppError::BadRequest(format!(
            "Telefone inválido (mínimo {} dígitos).",
            MIN_PHONE_DIGITS
        )));
    }
    Ok(digits)
}

/// Validate a name query and return it trimmed.
pub fn validate_name_query(raw: Option<&str>) -> Result<String, AppError> {
    let name = raw.unwrap_or_default().trim();
    if name.chars().count() < MIN_NAME_CHARS {
        tracing::warn!("❌ Name query too short");
        return Err(AppError::BadRequest(format!(
            "Nome inválido (mínimo {} caracteres).",
            MIN_NAME_CHARS
        )));
    }
    Ok(name.to_string())
}
