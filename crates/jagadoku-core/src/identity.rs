//! Google sign-in: authorization URL and profile lookup
//!
//! The browser-side implicit grant hands us an access token. Everything else
//! (profile, spreadsheet provisioning) is done with that token.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Profile;

/// OAuth client id registered for the web client
pub const GOOGLE_CLIENT_ID: &str =
    "800826886908-fp17il9ob94g0l1nc4mc0ifq2bh059t2.apps.googleusercontent.com";

/// Scopes requested at sign-in
pub const OAUTH_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/userinfo.profile",
    "https://www.googleapis.com/auth/userinfo.email",
];

pub const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Percent-encode a query component (RFC 3986 unreserved set kept as is)
fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// Build the implicit-grant authorization URL the user opens in a browser
pub fn authorization_url(client_id: &str, redirect_uri: &str) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=token&scope={}&include_granted_scopes=true",
        AUTHORIZATION_ENDPOINT,
        encode_component(client_id),
        encode_component(redirect_uri),
        encode_component(&OAUTH_SCOPES.join(" ")),
    )
}

/// Resolves an access token to a user profile
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fails with `Error::Auth` when the token is missing, expired or rejected
    async fn fetch_profile(&self, access_token: &str) -> Result<Profile>;
}

/// Google userinfo endpoint client
#[derive(Clone)]
pub struct GoogleIdentity {
    client: Client,
    userinfo_url: String,
}

impl GoogleIdentity {
    pub fn new() -> Self {
        Self::with_userinfo_url(USERINFO_ENDPOINT)
    }

    pub fn with_userinfo_url(url: &str) -> Self {
        Self {
            client: Client::new(),
            userinfo_url: url.to_string(),
        }
    }
}

impl Default for GoogleIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentity {
    async fn fetch_profile(&self, access_token: &str) -> Result<Profile> {
        if access_token.trim().is_empty() {
            return Err(Error::Auth("No access token".into()));
        }

        let response = self
            .client
            .get(&self.userinfo_url)
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| Error::Auth(format!("Profile request failed: {}", e)))?;

        match response.status() {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(Error::Auth("Access token rejected".into()))
            }
            s => return Err(Error::Auth(format!("Profile request returned {}", s))),
        }

        let profile: Profile = response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("Unreadable profile: {}", e)))?;
        debug!(email = %profile.email, "Fetched profile");
        Ok(profile)
    }
}

/// Identity provider that accepts one fixed token
#[derive(Clone)]
pub struct StaticIdentity {
    token: String,
    profile: Profile,
}

impl StaticIdentity {
    pub fn new(token: &str, profile: Profile) -> Self {
        Self {
            token: token.to_string(),
            profile,
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn fetch_profile(&self, access_token: &str) -> Result<Profile> {
        if access_token == self.token {
            Ok(self.profile.clone())
        } else {
            Err(Error::Auth("Access token rejected".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockGoogleServer;

    #[test]
    fn test_authorization_url() {
        let url = authorization_url(GOOGLE_CLIENT_ID, "http://localhost:3000/callback");
        assert!(url.starts_with(AUTHORIZATION_ENDPOINT));
        assert!(url.contains("response_type=token"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fcallback"));
        assert!(url.contains(
            "scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fspreadsheets%20https%3A%2F%2F"
        ));
        assert!(url.contains("client_id=800826886908-"));
    }

    #[tokio::test]
    async fn test_fetch_profile() {
        let server = MockGoogleServer::start("token-ok").await;
        let identity = GoogleIdentity::with_userinfo_url(&server.userinfo_url());

        let profile = identity.fetch_profile("token-ok").await.unwrap();
        assert_eq!(profile.name, "Budi Santoso");
        assert_eq!(profile.email, "budi@example.com");
        assert_eq!(profile.picture, "https://example.com/budi.png");
    }

    #[tokio::test]
    async fn test_fetch_profile_rejected() {
        let server = MockGoogleServer::start("token-ok").await;
        let identity = GoogleIdentity::with_userinfo_url(&server.userinfo_url());

        let err = identity.fetch_profile("expired").await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));

        let err = identity.fetch_profile("").await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[tokio::test]
    async fn test_static_identity() {
        let profile = Profile {
            name: "Sari".to_string(),
            email: "sari@example.com".to_string(),
            picture: String::new(),
        };
        let identity = StaticIdentity::new("t", profile.clone());
        assert_eq!(identity.fetch_profile("t").await.unwrap(), profile);
        assert!(identity.fetch_profile("x").await.is_err());
    }
}
