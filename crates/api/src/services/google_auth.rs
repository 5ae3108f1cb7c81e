//! Google service account authentication.
//!
//! Exchanges a signed JWT assertion for an OAuth2 access token (the
//! JWT-bearer grant) and caches the token until shortly before it expires.

use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::sheets::SheetsError;

/// OAuth2 scope granting read/write access to spreadsheets.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens are refreshed this long before Google would expire them.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Google service account credentials structure.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountCredentials {
    /// Service account email.
    pub client_email: String,
    /// Private key in PEM format.
    private_key: String,
    /// Token URI for OAuth2 exchange.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountCredentials {
    /// Load service account credentials from a JSON string or file path.
    pub fn load(source: &str) -> Result<Self, SheetsError> {
        if source.trim().starts_with('{') {
            serde_json::from_str(source)
                .map_err(|e| SheetsError::Credentials(format!("Invalid JSON: {}", e)))
        } else {
            let content = std::fs::read_to_string(source.trim()).map_err(|e| {
                SheetsError::Credentials(format!("Failed to read credentials file: {}", e))
            })?;
            serde_json::from_str(&content).map_err(|e| {
                SheetsError::Credentials(format!("Invalid credentials JSON: {}", e))
            })
        }
    }
}

/// JWT claims for Google OAuth2 service account authentication.
#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

/// Google OAuth2 token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Cached OAuth2 access token.
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Issues access tokens for one service account and scope.
///
/// Shared across requests; concurrent refreshes are harmless, the last one
/// wins the cache.
pub struct ServiceAccountAuth {
    client: Client,
    credentials: ServiceAccountCredentials,
    scope: String,
    token_cache: RwLock<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(client: Client, credentials: ServiceAccountCredentials, scope: &str) -> Self {
        Self {
            client,
            credentials,
            scope: scope.to_string(),
            token_cache: RwLock::new(None),
        }
    }

    pub fn client_email(&self) -> &str {
        &self.credentials.client_email
    }

    /// Get a valid OAuth2 access token, refreshing if necessary.
    pub async fn access_token(&self) -> Result<String, SheetsError> {
        {
            let cache = self.token_cache.read().await;
            if let Some(ref token) = *cache {
                if token.expires_at > Instant::now() + TOKEN_EXPIRY_MARGIN {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let (access_token, expires_at) = self.fetch_access_token().await?;

        *self.token_cache.write().await = Some(CachedToken {
            access_token: access_token.clone(),
            expires_at,
        });

        Ok(access_token)
    }

    /// Builds the signed assertion sent to the token endpoint.
    fn signed_assertion(&self) -> Result<String, SheetsError> {
        let now = Utc::now().timestamp();

        let claims = JwtClaims {
            iss: self.credentials.client_email.clone(),
            scope: self.scope.clone(),
            aud: self.credentials.token_uri.clone(),
            iat: now,
            exp: now + 3600,
        };

        let header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256);
        let encoding_key =
            jsonwebtoken::EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())?;

        Ok(jsonwebtoken::encode(&header, &claims, &encoding_key)?)
    }

    /// Fetch a new OAuth2 access token from Google.
    /// Returns (access_token, expires_at).
    async fn fetch_access_token(&self) -> Result<(String, Instant), SheetsError> {
        let assertion = self.signed_assertion()?;

        let response = self
            .client
            .post(&self.credentials.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SheetsError::Token(format!(
                "Token exchange failed with status {}: {}",
                status, error_text
            )));
        }

        let token_response: TokenResponse = response.json().await?;
        let expires_at = token_expiry(Instant::now(), token_response.expires_in);

        tracing::debug!(
            client_email = %self.credentials.client_email,
            expires_in = token_response.expires_in,
            "Obtained service account access token"
        );

        Ok((token_response.access_token, expires_at))
    }
}

/// When a token issued at `now` expires. A lifetime too large to represent
/// counts as already expired, so the token is used once and then refreshed.
fn token_expiry(now: Instant, expires_in: u64) -> Instant {
    now.checked_add(Duration::from_secs(expires_in)).unwrap_or(now)
}
