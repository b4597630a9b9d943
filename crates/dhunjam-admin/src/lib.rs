//! DhunJam venue admin console
//!
//! Client-side state for a venue operator: a login form that exchanges
//! credentials for a bearer token, and a pricing dashboard for the custom
//! and regular song-request tiers. The backend, the chart and the persisted
//! session sit behind the [`AdminApi`], [`ChartRenderer`] and
//! [`SessionStore`] traits.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod api_client;
pub mod app;
pub mod chart;
pub mod commands;
pub mod dashboard;
pub mod login;
pub mod session;
pub mod state;

// Re-export the main types
pub use api_client::{AdminApi, ApiClient};
pub use app::{Console, View};
pub use chart::{ChartHandle, ChartRenderer, PlotlyChartRenderer, TextChartRenderer};
pub use commands::{CommandStatus, PricingEdits};
pub use dashboard::{FormState, LoadOutcome, PricingDashboard, SaveState, SaveTicket};
pub use login::{LoginForm, PasswordVisibility};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
pub use state::AppState;
