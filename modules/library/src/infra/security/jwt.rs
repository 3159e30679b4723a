use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::{TokenPair, User};
use crate::domain::ports::{TokenError, TokenIssuer, TokenKind, TokenSubject};

#[derive(Clone)]
pub struct TokenSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: String,
    kind: String,
    iat: i64,
    exp: i64,
    jti: String,
}

fn kind_str(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Access => "access",
        TokenKind::Refresh => "refresh",
    }
}

/// HS256 tokens; access and refresh tokens use distinct secrets.
pub struct JwtTokenIssuer {
    access_enc: EncodingKey,
    access_dec: DecodingKey,
    refresh_enc: EncodingKey,
    refresh_dec: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtTokenIssuer {
    pub fn new(settings: &TokenSettings) -> Self {
        Self {
            access_enc: EncodingKey::from_secret(settings.access_secret.as_bytes()),
            access_dec: DecodingKey::from_secret(settings.access_secret.as_bytes()),
            refresh_enc: EncodingKey::from_secret(settings.refresh_secret.as_bytes()),
            refresh_dec: DecodingKey::from_secret(settings.refresh_secret.as_bytes()),
            access_ttl: settings.access_ttl,
            refresh_ttl: settings.refresh_ttl,
        }
    }

    fn sign(&self, user: &User, kind: TokenKind) -> Result<String, TokenError> {
        let (key, ttl) = match kind {
            TokenKind::Access => (&self.access_enc, self.access_ttl),
            TokenKind::Refresh => (&self.refresh_enc, self.refresh_ttl),
        };
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX / 2);
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role.name.clone(),
            kind: kind_str(kind).to_string(),
            iat: now,
            exp: now.saturating_add(ttl),
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, user: &User) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.sign(user, TokenKind::Access)?,
            refresh_token: self.sign(user, TokenKind::Refresh)?,
        })
    }

    fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenSubject, TokenError> {
        let key = match kind {
            TokenKind::Access => &self.access_dec,
            TokenKind::Refresh => &self.refresh_dec,
        };
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;

        let claims = data.claims;
        if claims.kind != kind_str(kind) {
            return Err(TokenError::Invalid);
        }
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Invalid)?;
        Ok(TokenSubject {
            user_id,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{RoleRef, UserStatus, ROLE_LIBRARIAN};

    fn settings() -> TokenSettings {
        TokenSettings {
            access_secret: "access-secret-for-tests-0123456789".into(),
            refresh_secret: "refresh-secret-for-tests-0123456789".into(),
            access_ttl: Duration::from_secs(900),
            refresh_ttl: Duration::from_secs(7 * 24 * 3600),
        }
    }

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Lib".into(),
            email: "lib@example.com".into(),
            phone: None,
            address: None,
            role: RoleRef {
                id: Uuid::new_v4(),
                name: ROLE_LIBRARIAN.into(),
            },
            status: UserStatus::Active,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn issued_tokens_verify_with_their_own_kind() {
        let issuer = JwtTokenIssuer::new(&settings());
        let u = user();
        let pair = issuer.issue(&u).unwrap();

        let subject = issuer.verify(&pair.access_token, TokenKind::Access).unwrap();
        assert_eq!(subject.user_id, u.id);
        assert_eq!(subject.role, ROLE_LIBRARIAN);

        let subject = issuer.verify(&pair.refresh_token, TokenKind::Refresh).unwrap();
        assert_eq!(subject.user_id, u.id);
    }

    #[test]
    fn tokens_are_not_interchangeable() {
        let issuer = JwtTokenIssuer::new(&settings());
        let pair = issuer.issue(&user()).unwrap();
        assert_eq!(
            issuer.verify(&pair.refresh_token, TokenKind::Access),
            Err(TokenError::Invalid)
        );
        assert_eq!(
            issuer.verify(&pair.access_token, TokenKind::Refresh),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn rotation_yields_distinct_tokens() {
        let issuer = JwtTokenIssuer::new(&settings());
        let u = user();
        assert_ne!(
            issuer.issue(&u).unwrap().refresh_token,
            issuer.issue(&u).unwrap().refresh_token
        );
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let issuer = JwtTokenIssuer::new(&settings());
        let u = user();
        let past = Utc::now().timestamp() - 3600;
        let claims = Claims {
            sub: u.id.to_string(),
            role: u.role.name.clone(),
            kind: "access".into(),
            iat: past - 60,
            exp: past,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &issuer.access_enc).unwrap();
        assert_eq!(issuer.verify(&token, TokenKind::Access), Err(TokenError::Expired));
    }

    #[test]
    fn foreign_signature_is_invalid() {
        let issuer = JwtTokenIssuer::new(&settings());
        let other = JwtTokenIssuer::new(&TokenSettings {
            access_secret: "someone-else".into(),
            ..settings()
        });
        let pair = other.issue(&user()).unwrap();
        assert_eq!(
            issuer.verify(&pair.access_token, TokenKind::Access),
            Err(TokenError::Invalid)
        );
        assert_eq!(issuer.verify("garbage", TokenKind::Access), Err(TokenError::Invalid));
    }
}
