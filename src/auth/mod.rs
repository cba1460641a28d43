use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::models::Admin;

/// Claims carried by the dashboard session cookie.
///
/// `access_token` is the backend-issued bearer token; it never leaves the
/// server except inside this signed cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub sid: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub access_token: String,
    pub provider: String,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    pub fn new(admin: &Admin, access_token: String, max_age: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: admin.id_string(),
            sid: Uuid::new_v4(),
            name: admin.name.clone(),
            email: admin.email.clone(),
            role: admin.role.clone(),
            access_token,
            provider: "login".to_string(),
            exp: (now + max_age).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no session token presented")]
    Missing,
    #[error("invalid session token: {0}")]
    Invalid(String),
    #[error("session token could not be signed: {0}")]
    Signing(String),
}

/// Signing material and cookie settings for dashboard sessions.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    max_age: Duration,
    cookie_name: String,
    secure_cookie: bool,
}

impl SessionKeys {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            max_age: Duration::seconds(config.max_age_secs as i64),
            cookie_name: config.cookie_name.clone(),
            secure_cookie: config.secure_cookie,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn secure_cookie(&self) -> bool {
        self.secure_cookie
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Sign a new session for `admin`, returning the token and its claims.
    pub fn issue(&self, admin: &Admin, access_token: String) -> Result<(String, SessionClaims), SessionError> {
        let claims = SessionClaims::new(admin, access_token, self.max_age);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| SessionError::Signing(e.to_string()))?;
        Ok((token, claims))
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        if token.trim().is_empty() {
            return Err(SessionError::Missing);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| SessionError::Invalid(e.to_string()))?;

        if token_data.claims.access_token.is_empty() {
            return Err(SessionError::Invalid("session carries no access token".to_string()));
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use serde_json::json;

    fn keys() -> SessionKeys {
        SessionKeys::from_config(&AppConfig::development().session)
    }

    fn admin() -> Admin {
        serde_json::from_value(json!({
            "id": 7,
            "name": "Jone Doe",
            "email": "info@example.com",
            "role": "admin"
        }))
        .unwrap()
    }

    #[test]
    fn issued_token_verifies() {
        let keys = keys();
        let (token, claims) = keys.issue(&admin(), "backend-token".into()).unwrap();
        let decoded = keys.verify(&token).unwrap();
        assert_eq!(decoded.sub, "7");
        assert_eq!(decoded.access_token, "backend-token");
        assert_eq!(decoded.sid, claims.sid);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let mut other = AppConfig::development().session;
        other.secret = "another-secret".into();
        let (token, _) = SessionKeys::from_config(&other).issue(&admin(), "t".into()).unwrap();
        assert!(matches!(keys().verify(&token), Err(SessionError::Invalid(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut config = AppConfig::development().session;
        config.max_age_secs = 0;
        let short = SessionKeys::from_config(&config);
        let mut claims = SessionClaims::new(&admin(), "t".into(), Duration::seconds(0));
        claims.exp -= 120;
        let token = encode(&Header::new(Algorithm::HS256), &claims, &short.encoding).unwrap();
        assert!(short.verify(&token).is_err());
    }

    #[test]
    fn empty_token_is_missing() {
        assert!(matches!(keys().verify("  "), Err(SessionError::Missing)));
    }
}
