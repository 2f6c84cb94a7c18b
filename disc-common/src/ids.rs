//! Identifier and access-token utilities

use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

/// Length of a test-link access token
pub const TOKEN_LEN: usize = 16;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Parse UUID from string
pub fn parse(s: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(s)
}

/// Generate a random opaque access token of [`TOKEN_LEN`] ASCII alphanumerics
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Whether `token` has the shape of an access token
pub fn is_well_formed_token(token: &str) -> bool {
    token.len() == TOKEN_LEN && token.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_well_formed() {
        for _ in 0..100 {
            let token = generate_token();
            assert!(is_well_formed_token(&token), "bad token {:?}", token);
        }
    }

    #[test]
    fn test_generated_tokens_differ() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_token_shape() {
        assert!(is_well_formed_token("aB3dE5gH7jK9mN1p"));
        assert!(!is_well_formed_token("short"));
        assert!(!is_well_formed_token("aB3dE5gH7jK9mN1p0"));
        assert!(!is_well_formed_token("aB3dE5gH7jK9mN1-"));
        assert!(!is_well_formed_token("aB3dE5gH7jK9mN1ü"));
    }

    #[test]
    fn test_uuid_round_trip() {
        let id = generate();
        assert_eq!(parse(&id.to_string()).unwrap(), id);
        assert!(parse("not-a-uuid").is_err());
    }
}
