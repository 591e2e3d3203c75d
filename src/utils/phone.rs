use std::sync::LazyLock;

use regex::Regex;

static E164_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9][0-9]{7,14}$").expect("static regex"));

/// Normalize a phone number to E.164 (leading +, 8-15 digits). Accepts spaces,
/// dashes and parentheses in the input; also accepts a leading 00 prefix.
pub fn normalize_e164(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    let cleaned = if let Some(rest) = cleaned.strip_prefix("00") {
        format!("+{}", rest)
    } else {
        cleaned
    };

    if E164_REGEX.is_match(&cleaned) {
        Some(cleaned)
    } else {
        None
    }
}

/// Redact a phone number to its last four digits for audit records.
pub fn redact_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() <= 4 {
        return "****".to_string();
    }
    let last4: String = digits[digits.len() - 4..].iter().collect();
    format!("*******{}", last4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_accepts_formatted_input() {
        assert_eq!(
            normalize_e164("+971 50 123 4567"),
            Some("+971501234567".to_string())
        );
        assert_eq!(
            normalize_e164("00971501234567"),
            Some("+971501234567".to_string())
        );
        assert_eq!(
            normalize_e164("+1 (415) 555-0100"),
            Some("+14155550100".to_string())
        );
    }

    #[test]
    fn test_normalize_rejects_invalid() {
        assert_eq!(normalize_e164("0501234567"), None); // no country code
        assert_eq!(normalize_e164("+971"), None); // too short
        assert_eq!(normalize_e164("not a phone"), None);
        assert_eq!(normalize_e164("+0123456789"), None); // leading zero
    }

    #[test]
    fn test_redact_keeps_last_four() {
        assert_eq!(redact_phone("+971501234567"), "*******4567");
        assert_eq!(redact_phone("123"), "****");
    }
}
