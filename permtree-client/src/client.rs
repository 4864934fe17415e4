// SPDX-License-Identifier: MIT OR Apache-2.0

//! Requests against the backend which hands out tokens and lists grantable API routes.
use std::time::Duration;

use permtree_core::ApiResource;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::token::{TokenStore, TokenStoreError};

pub const LOGIN_PATH: &str = "/api/v1/publics/user/login";
pub const ROUTES_PATH: &str = "/api/v1/me/sys/routes";

pub const INVALID_CREDENTIALS: &str = "Invalid login credentials";
pub const MALFORMED_AUTH: &str = "Malformed authorization header";
pub const GENERIC_ERROR: &str = "Something went wrong, please try again";

/// Identity and password of a backend user.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub identity: String,
    pub password: String,
}

impl Credentials {
    pub fn new(identity: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Tokens handed out on login.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    message: String,
}

/// One-shot requests against the permission backend.
///
/// Nothing is retried. A request fails after the timeout given on construction.
#[derive(Debug)]
pub struct Client<S> {
    http: reqwest::Client,
    base_url: String,
    tokens: S,
}

impl<S: TokenStore> Client<S> {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        tokens: S,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn tokens(&self) -> &S {
        &self.tokens
    }

    /// Log in and keep the access token for later requests.
    pub async fn login(&self, credentials: &Credentials) -> Result<Tokens, ClientError> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        debug!(%url, identity = %credentials.identity, "login");

        let response = self
            .http
            .post(&url)
            .json(credentials)
            .send()
            .await
            .map_err(ClientError::Network)?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "login rejected");
            return Err(ClientError::InvalidCredentials);
        }

        let envelope: Envelope<Tokens> = response.json().await.map_err(unexpected)?;
        let tokens = envelope
            .data
            .ok_or_else(|| ClientError::UnexpectedResponse(envelope.message))?;

        self.tokens.store(&tokens.access_token)?;
        Ok(tokens)
    }

    /// List the API routes the logged in user may grant.
    pub async fn routes(&self) -> Result<Vec<ApiResource>, ClientError> {
        let token = self.tokens.load()?.ok_or(ClientError::MissingToken)?;

        let url = format!("{}{}", self.base_url, ROUTES_PATH);
        debug!(%url, "fetch api routes");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(ClientError::Network)?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "route listing rejected");
            return Err(ClientError::MalformedAuth(status));
        }

        let envelope: Envelope<Vec<ApiResource>> = response.json().await.map_err(unexpected)?;
        if envelope.message == MALFORMED_AUTH {
            return Err(ClientError::MalformedAuth(status));
        }

        Ok(envelope.data.unwrap_or_default())
    }
}

fn unexpected(err: reqwest::Error) -> ClientError {
    ClientError::UnexpectedResponse(err.to_string())
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{}", INVALID_CREDENTIALS)]
    InvalidCredentials,

    #[error("not logged in")]
    MissingToken,

    #[error("{}", MALFORMED_AUTH)]
    MalformedAuth(StatusCode),

    #[error("{}", GENERIC_ERROR)]
    Network(#[source] reqwest::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("could not set up http client: {0}")]
    Build(#[source] reqwest::Error),

    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),
}

impl ClientError {
    /// The stored credentials are missing or were rejected, the user has to log in again.
    pub fn is_auth_invalid(&self) -> bool {
        matches!(self, ClientError::MissingToken | ClientError::MalformedAuth(_))
    }
}
