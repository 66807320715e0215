//! Google OAuth2 authorization-code flow for `/login`/`/callback`
//! (SPEC_FULL.md §6). `lecture-auth` only verifies tokens (see its own doc
//! comment); the dance that produces one in the first place is this
//! crate's job, built the same way the teacher's
//! `OAuth2AuthorizationCodeProvider` builds one — `oauth2::basic::BasicClient`
//! for the code exchange, a bare `reqwest` GET for the userinfo profile.

use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;

use lecture_core::errors::PipelineError;

use crate::error::HttpError;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// The subset of the Google userinfo v3 response `/callback` needs: `email`
/// to mint the token's subject, `hd` (hosted domain) for the org whitelist
/// check the original source hardcoded (`profile.OrganizationDomain`).
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub email: String,
    #[serde(default)]
    pub hd: Option<String>,
}

pub struct GoogleOAuthClient {
    client: BasicClient,
}

impl GoogleOAuthClient {
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Result<Self, HttpError> {
        let auth_url = AuthUrl::new(GOOGLE_AUTH_URL.to_string())
            .map_err(|e| HttpError::from(PipelineError::unavailable(e.to_string())))?;
        let token_url = TokenUrl::new(GOOGLE_TOKEN_URL.to_string())
            .map_err(|e| HttpError::from(PipelineError::unavailable(e.to_string())))?;
        let redirect_url =
            RedirectUrl::new(redirect_uri).map_err(|e| HttpError::from(PipelineError::unavailable(e.to_string())))?;

        let client = BasicClient::new(ClientId::new(client_id), Some(ClientSecret::new(client_secret)), auth_url, Some(token_url))
            .set_redirect_uri(redirect_url);

        Ok(Self { client })
    }

    /// The redirect URL `/login` sends the caller to, plus the CSRF state
    /// token the caller is expected to round-trip back to `/callback`
    /// (the original source's `GenerateStateOAuthCookie`).
    pub fn authorize_url(&self) -> (String, CsrfToken) {
        let (url, csrf) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(
                "https://www.googleapis.com/auth/userinfo.email".to_string(),
            ))
            .url();
        (url.to_string(), csrf)
    }

    /// Exchanges an authorization code for an access token, then fetches
    /// the profile (`GetUserDataFromGoogle` in the original source).
    pub async fn profile_for_code(&self, code: &str) -> Result<GoogleProfile, HttpError> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| HttpError::from(PipelineError::bad_gateway(e.to_string())))?;

        let response = reqwest::Client::new()
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(token.access_token().secret())
            .send()
            .await
            .map_err(|e| HttpError::from(PipelineError::bad_gateway(e.to_string())))?
            .error_for_status()
            .map_err(|e| HttpError::from(PipelineError::bad_gateway(e.to_string())))?;

        let profile = response
            .json::<GoogleProfile>()
            .await
            .map_err(|e| HttpError::from(PipelineError::bad_gateway(e.to_string())))?;

        Ok(profile)
    }
}
