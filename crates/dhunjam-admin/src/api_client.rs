//! HTTP client for communicating with the DhunJam admin API

use async_trait::async_trait;
use dhunjam_core::types::{ApiEnvelope, LoginData, LoginRequest, UpdateProfileRequest};
use dhunjam_core::{AdminProfile, Config, Error, Result, Session};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Operations the console needs from the backend
///
/// Every call that touches the profile takes the session explicitly.
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Exchange credentials for a token and admin id
    async fn authenticate(&self, username: &str, password: &str) -> Result<LoginData>;

    /// Read the admin profile of the session's admin
    async fn fetch_profile(&self, session: &Session) -> Result<AdminProfile>;

    /// Replace pricing on the admin profile, returning the stored profile
    async fn update_profile(
        &self,
        session: &Session,
        update: &UpdateProfileRequest,
    ) -> Result<AdminProfile>;
}

/// API client for making HTTP requests to the DhunJam backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client using the configured base URL and timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_seconds))
            .build()
            .map_err(|e| Error::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
        })
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn profile_url(&self, session: &Session) -> String {
        format!("{}/account/admin/{}", self.base_url, session.admin_id)
    }
}

/// Check the status and unwrap the `data` envelope of a response
async fn read_data<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            context: context.to_string(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| Error::Network(format!("Failed to read {context} response: {e}")))?;

    let envelope: ApiEnvelope<T> = serde_json::from_str(&body)?;
    Ok(envelope.data)
}

#[async_trait]
impl AdminApi for ApiClient {
    async fn authenticate(&self, username: &str, password: &str) -> Result<LoginData> {
        let url = format!("{}/account/admin/login", self.base_url);
        debug!(%url, username, "Authenticating");

        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to log in: {e}")))?;

        read_data(response, "Login").await
    }

    async fn fetch_profile(&self, session: &Session) -> Result<AdminProfile> {
        let url = self.profile_url(session);
        debug!(%url, "Fetching admin profile");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&session.token)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to fetch admin profile: {e}")))?;

        read_data(response, "Fetching admin profile").await
    }

    async fn update_profile(
        &self,
        session: &Session,
        update: &UpdateProfileRequest,
    ) -> Result<AdminProfile> {
        let url = self.profile_url(session);
        debug!(%url, charge_customers = update.charge_customers, "Updating admin profile");

        let response = self
            .client
            .put(&url)
            .bearer_auth(&session.token)
            .json(update)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to update prices: {e}")))?;

        read_data(response, "Updating prices").await
    }
}
