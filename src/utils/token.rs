use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn create_token(
    user_id: &str,
    secret: &[u8],
    expires_in_seconds: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    if user_id.is_empty() {
        return Err(jsonwebtoken::errors::ErrorKind::InvalidSubject.into());
    }

    let now = Utc::now();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::seconds(expires_in_seconds)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

pub fn decode_token(
    token: impl Into<String>,
    secret: &[u8],
) -> Result<String, jsonwebtoken::errors::Error> {
    // No clock leeway: a token past its exp is rejected immediately.
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.leeway = 0;

    let decoded = decode::<TokenClaims>(
        &token.into(),
        &DecodingKey::from_secret(secret),
        &validation,
    )?;

    Ok(decoded.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_token_round_trip() {
        let user_id = Uuid::new_v4().to_string();
        let secret = b"test-secret";
        let token = create_token(&user_id, secret, 3600).unwrap();
        assert_eq!(decode_token(token, secret).unwrap(), user_id);
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let token = create_token("abc", b"secret-one", 3600).unwrap();
        assert!(decode_token(token, b"secret-two").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // -60 would sit inside jsonwebtoken's default 60s leeway; decoding
        // runs with leeway 0, so any past exp must fail.
        let token = create_token("abc", b"secret", -60).unwrap();
        assert!(decode_token(token, b"secret").is_err());

        let token = create_token("abc", b"secret", -2).unwrap();
        assert!(decode_token(token, b"secret").is_err());
    }
}
