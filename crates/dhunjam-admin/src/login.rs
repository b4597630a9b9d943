//! Login form

use crate::api_client::AdminApi;
use crate::session::SessionStore;
use dhunjam_core::{Result, Session};
use std::fmt;
use tracing::{error, info};

/// Glyph shown for each masked password character
pub const MASK_CHAR: char = '•';

/// Whether the password field shows its contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordVisibility {
    /// Shown as bullets
    #[default]
    Masked,
    /// Shown as typed
    Revealed,
}

/// Credentials being entered on the login view
///
/// Nothing is checked locally. Empty fields are sent as they are and the
/// backend decides.
#[derive(Clone, Default)]
pub struct LoginForm {
    /// Username field
    pub username: String,
    /// Password field
    pub password: String,
    visibility: PasswordVisibility,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("visibility", &self.visibility)
            .finish()
    }
}

impl LoginForm {
    /// Form pre-filled with credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            visibility: PasswordVisibility::Masked,
        }
    }

    /// Current visibility of the password field
    #[must_use]
    pub const fn visibility(&self) -> PasswordVisibility {
        self.visibility
    }

    /// Flip between masked and revealed
    pub const fn toggle_password_visibility(&mut self) {
        self.visibility = match self.visibility {
            PasswordVisibility::Masked => PasswordVisibility::Revealed,
            PasswordVisibility::Revealed => PasswordVisibility::Masked,
        };
    }

    /// Password as the field would display it
    #[must_use]
    pub fn displayed_password(&self) -> String {
        match self.visibility {
            PasswordVisibility::Masked => {
                std::iter::repeat_n(MASK_CHAR, self.password.chars().count()).collect()
            }
            PasswordVisibility::Revealed => self.password.clone(),
        }
    }

    /// Sign in and remember the session
    ///
    /// On success the token and admin id are written to `store`. On failure
    /// the store is left alone and the error is logged and returned.
    ///
    /// # Errors
    ///
    /// Returns the API error if authentication fails, or a store error if the
    /// session cannot be written.
    pub async fn submit(
        &self,
        api: &dyn AdminApi,
        store: &mut dyn SessionStore,
    ) -> Result<Session> {
        let data = match api.authenticate(&self.username, &self.password).await {
            Ok(data) => data,
            Err(e) => {
                error!(username = %self.username, error = %e, "Login failed");
                return Err(e);
            }
        };

        let session = Session::new(data.token, data.id);
        store.store_session(&session)?;

        info!(admin_id = %session.admin_id, "Logged in");
        Ok(session)
    }
}
