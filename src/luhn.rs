//! Luhn checksum validation for order numbers.

/// Returns true when `number` is a non-empty digit string with a valid
/// Luhn checksum. Any non-digit character fails the check; separators are
/// not stripped.
pub fn is_valid(number: &str) -> bool {
    if number.is_empty() {
        return false;
    }

    let parity = number.len() % 2;
    let mut sum = 0u32;
    for (i, ch) in number.chars().enumerate() {
        let Some(mut digit) = ch.to_digit(10) else {
            return false;
        };
        if i % 2 == parity {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }

    sum % 10 == 0
}
