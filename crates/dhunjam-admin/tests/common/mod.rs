//! Common test utilities and fixtures for integration tests

#![allow(dead_code, unreachable_pub, clippy::unwrap_used)]

use dhunjam_admin::{ApiClient, ChartHandle, ChartRenderer};
use dhunjam_core::{Error, Result};
use serde_json::{Value, json};
use std::sync::Once;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT_LOGGER: Once = Once::new();

/// Initialize test logging (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Profile body as the backend sends it
pub fn profile_json(charge_customers: bool, amounts: [i64; 5]) -> Value {
    let [c6, c7, c8, c9, c10] = amounts;
    json!({
        "id": 42,
        "name": "Social",
        "location": "Hauz Khas",
        "charge_customers": charge_customers,
        "amount": {
            "category_6": c6,
            "category_7": c7,
            "category_8": c8,
            "category_9": c9,
            "category_10": c10
        }
    })
}

/// Backend stand-in with helpers for the admin endpoints
pub struct TestBackend {
    pub server: MockServer,
}

impl TestBackend {
    /// Start an empty backend
    pub async fn start() -> Self {
        init_test_logging();
        Self {
            server: MockServer::start().await,
        }
    }

    /// Client pointed at this backend
    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.server.uri())
    }

    /// Accept any credentials and hand out `T1` for admin `42`
    pub async fn accept_login(&self) {
        Mock::given(method("POST"))
            .and(path("/account/admin/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "response": "Success",
                "data": { "token": "T1", "id": "42" }
            })))
            .mount(&self.server)
            .await;
    }

    /// Reject every login with `status`
    pub async fn reject_login(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/account/admin/login"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "status": status,
                "response": "Failed",
                "ui_err_msg": "Invalid credentials"
            })))
            .mount(&self.server)
            .await;
    }

    /// Serve `profile` to requests carrying token `T1`
    pub async fn serve_profile(&self, profile: Value) {
        Mock::given(method("GET"))
            .and(path("/account/admin/42"))
            .and(header("Authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": profile })))
            .mount(&self.server)
            .await;
    }

    /// Fail profile reads with `status`
    pub async fn fail_profile(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/account/admin/42"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Answer profile updates with `profile`
    pub async fn accept_update(&self, profile: Value) {
        Mock::given(method("PUT"))
            .and(path("/account/admin/42"))
            .and(header("Authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": profile })))
            .mount(&self.server)
            .await;
    }

    /// Fail profile updates with `status`
    pub async fn fail_update(&self, status: u16) {
        Mock::given(method("PUT"))
            .and(path("/account/admin/42"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of every request received with `http_method`
    pub async fn bodies(&self, http_method: &str) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.method.as_str() == http_method)
            .map(|request| serde_json::from_slice(&request.body).unwrap())
            .collect()
    }
}

/// Chart that records what it was asked to draw
#[derive(Debug, Default)]
pub struct RecordingChart {
    pub created: Vec<(Vec<String>, Vec<f64>)>,
    pub updated: Vec<Vec<f64>>,
}

impl ChartRenderer for RecordingChart {
    fn create(&mut self, labels: &[String], series: &[f64]) -> Result<ChartHandle> {
        self.created.push((labels.to_vec(), series.to_vec()));
        Ok(ChartHandle::new(self.created.len() as u64))
    }

    fn update(&mut self, handle: ChartHandle, series: &[f64]) -> Result<()> {
        if handle.id() == 0 || handle.id() > self.created.len() as u64 {
            return Err(Error::Chart(format!("Unknown chart handle {}", handle.id())));
        }
        self.updated.push(series.to_vec());
        Ok(())
    }
}
