use rand::Rng;

pub fn generate_otp() -> String {
    let mut rng = rand::rng();
    format!("{:06}", rng.random_range(100000..=999999))
}

/// Opaque session token for client-scoped requests. Clients are not
/// identity-provider principals, so the token is a bearer-style parameter
/// stored on the client row.
pub fn generate_session_token() -> String {
    use rand::distr::Alphanumeric;

    let rng = rand::rng();
    rng.sample_iter(Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_is_six_digits() {
        for _ in 0..50 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));

            // Inclusive bounds: 999999 is a valid code.
            let n: u32 = otp.parse().unwrap();
            assert!((100000..=999999).contains(&n));
        }
    }

    #[test]
    fn test_session_tokens_are_unique() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_eq!(a.len(), 48);
        assert_ne!(a, b);
    }
}
