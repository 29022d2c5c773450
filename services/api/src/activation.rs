//! Account activation tokens
//!
//! Signup issues a one-time activation link of the form
//! `/auth/activate/{uid_b64}/{token}`: the first segment is the URL-safe
//! base64 user id, the second an HS256-signed token over the user id and a
//! state version derived from the password hash and the active flag. The
//! token therefore dies on its own once the password changes or the account
//! has already been activated.

use anyhow::Result;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;
use uuid::Uuid;

use crate::models::User;

const DEFAULT_SECRET: &str = "evently-dev-secret";

/// Activation token configuration
#[derive(Debug, Clone)]
pub struct ActivationConfig {
    /// HMAC secret for signing tokens
    pub secret: String,
    /// Token lifetime in seconds (default: 3 days)
    pub token_ttl: u64,
}

impl ActivationConfig {
    /// Create a new ActivationConfig from environment variables
    ///
    /// # Environment Variables
    /// - `APP_SECRET`: HMAC signing secret
    /// - `ACTIVATION_TOKEN_TTL_SECONDS`: token lifetime (default: 259200)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("APP_SECRET").unwrap_or_else(|_| {
            warn!("APP_SECRET not set, using the development default");
            DEFAULT_SECRET.to_string()
        });

        let token_ttl = std::env::var("ACTIVATION_TOKEN_TTL_SECONDS")
            .unwrap_or_else(|_| "259200".to_string())
            .parse()
            .unwrap_or(259_200);

        Ok(ActivationConfig { secret, token_ttl })
    }
}

/// Claims carried by an activation token
#[derive(Debug, Serialize, Deserialize)]
struct ActivationClaims {
    /// User ID
    sub: Uuid,
    /// Account state version at issue time
    sv: String,
    /// Issued at time
    iat: u64,
    /// Expiration time
    exp: u64,
}

/// Activation token service
#[derive(Clone)]
pub struct ActivationTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: u64,
}

impl ActivationTokenService {
    /// Initialize a new activation token service
    pub fn new(config: ActivationConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        ActivationTokenService {
            encoding_key,
            decoding_key,
            validation,
            token_ttl: config.token_ttl,
        }
    }

    /// Fingerprint of the account state a token is bound to. Changing the
    /// password or activating the account changes the fingerprint and
    /// invalidates every previously issued token.
    fn state_version(user: &User) -> String {
        let tail_start = user.password_hash.len().saturating_sub(16);
        format!("{}:{}", user.is_active, &user.password_hash[tail_start..])
    }

    /// Issue an activation token for a user
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let claims = ActivationClaims {
            sub: user.id,
            sv: Self::state_version(user),
            iat: now,
            exp: now + self.token_ttl,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify a token against the user's current state. Returns `false` for
    /// any failure: bad signature, expired, wrong subject, or a state
    /// version that no longer matches (password changed, already active).
    pub fn verify(&self, token: &str, user: &User) -> bool {
        let claims = match decode::<ActivationClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(_) => return false,
        };

        claims.sub == user.id && claims.sv == Self::state_version(user)
    }

    /// URL-safe base64 encoding of a user id, used as the first activation
    /// link segment
    pub fn encode_uid(user_id: Uuid) -> String {
        URL_SAFE_NO_PAD.encode(user_id.as_bytes())
    }

    /// Decode an activation link's id segment. Tampered or malformed input
    /// (undecodable base64, wrong length) yields `None`, never a fault.
    pub fn decode_uid(encoded: &str) -> Option<Uuid> {
        let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
        Uuid::from_slice(&bytes).ok()
    }

    /// Relative activation link for a freshly registered user
    pub fn activation_path(&self, user: &User) -> Result<String> {
        let token = self.issue(user)?;
        Ok(format!(
            "/auth/activate/{}/{}",
            Self::encode_uid(user.id),
            token
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use chrono::Utc;

    fn test_service(ttl: u64) -> ActivationTokenService {
        ActivationTokenService::new(ActivationConfig {
            secret: "test-secret".to_string(),
            token_ttl: ttl,
        })
    }

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$AbCdEfGh".to_string(),
            phone: None,
            profile_picture: "default_profile.jpg".to_string(),
            is_active: false,
            role: Role::Participant,
            is_superuser: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let service = test_service(3600);
        let user = test_user();
        let token = service.issue(&user).unwrap();
        assert!(service.verify(&token, &user));
    }

    #[test]
    fn token_dies_once_account_is_active() {
        let service = test_service(3600);
        let mut user = test_user();
        let token = service.issue(&user).unwrap();
        user.is_active = true;
        assert!(!service.verify(&token, &user));
    }

    #[test]
    fn token_dies_when_password_changes() {
        let service = test_service(3600);
        let mut user = test_user();
        let token = service.issue(&user).unwrap();
        user.password_hash = "$argon2id$v=19$m=19456,t=2,p=1$b3RoZXJzYWx0$ZyXwVu".to_string();
        assert!(!service.verify(&token, &user));
    }

    #[test]
    fn token_for_one_user_fails_for_another() {
        let service = test_service(3600);
        let user = test_user();
        let mut other = test_user();
        other.id = Uuid::new_v4();
        let token = service.issue(&user).unwrap();
        assert!(!service.verify(&token, &other));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = test_service(3600);
        let user = test_user();
        let mut token = service.issue(&user).unwrap();
        token.push('x');
        assert!(!service.verify(&token, &user));
        // A token signed with a different secret must also fail.
        let forged = ActivationTokenService::new(ActivationConfig {
            secret: "other-secret".to_string(),
            token_ttl: 3600,
        })
        .issue(&user)
        .unwrap();
        assert!(!service.verify(&forged, &user));
    }

    #[test]
    fn uid_round_trip() {
        let id = Uuid::new_v4();
        let encoded = ActivationTokenService::encode_uid(id);
        assert_eq!(ActivationTokenService::decode_uid(&encoded), Some(id));
    }

    #[test]
    fn malformed_uid_segments_do_not_fault() {
        assert_eq!(ActivationTokenService::decode_uid(""), None);
        assert_eq!(ActivationTokenService::decode_uid("!!!not-base64!!!"), None);
        // Decodable base64 of the wrong length is still rejected.
        let short = URL_SAFE_NO_PAD.encode(b"123");
        assert_eq!(ActivationTokenService::decode_uid(&short), None);
        let long = URL_SAFE_NO_PAD.encode([0u8; 64]);
        assert_eq!(ActivationTokenService::decode_uid(&long), None);
    }

    #[test]
    fn activation_path_contains_both_segments() {
        let service = test_service(3600);
        let user = test_user();
        let path = service.activation_path(&user).unwrap();
        assert!(path.starts_with("/auth/activate/"));
        let parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(
            ActivationTokenService::decode_uid(parts[2]),
            Some(user.id)
        );
    }
}
