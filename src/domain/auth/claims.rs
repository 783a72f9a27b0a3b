//! Bearer token claims

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::User;

/// Claims carried by an issued bearer token
///
/// The username travels as `unique_name`, the short name .NET token handlers
/// emit for the name claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "unique_name")]
    pub username: String,
    pub email: String,
    pub role: String,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

impl TokenClaims {
    /// Build claims for a user, valid for `expiry_minutes` from `now`
    ///
    /// `None` when the expiry does not fit in a timestamp.
    pub fn for_user(
        user: &User,
        issuer: &str,
        audience: &str,
        now: DateTime<Utc>,
        expiry_minutes: u64,
    ) -> Option<Self> {
        let lifetime = i64::try_from(expiry_minutes)
            .ok()
            .and_then(chrono::Duration::try_minutes)?;
        let exp = now.checked_add_signed(lifetime)?;

        Some(Self {
            username: user.username().to_string(),
            email: user.email().to_string(),
            role: user.role().to_string(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }

    /// Expiry instant as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether the token has expired at `now`, allowing `leeway_seconds` of skew
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway_seconds: u64) -> bool {
        self.exp.saturating_add(leeway_seconds as i64) <= now.timestamp()
    }
}

/// A freshly issued token together with its decoded claims
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

impl IssuedToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at()
    }
}
