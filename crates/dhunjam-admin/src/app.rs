//! View routing between the login form and the pricing dashboard

use crate::api_client::AdminApi;
use crate::login::LoginForm;
use crate::session::SessionStore;
use dhunjam_core::{Error, Result, Session};
use tracing::info;

/// Top-level view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Signed out
    Login,
    /// Signed in
    Dashboard,
}

/// Owns the current view and the session that goes with it
#[derive(Debug)]
pub struct Console<S: SessionStore> {
    store: S,
    session: Option<Session>,
}

impl<S: SessionStore> Console<S> {
    /// Open the console over `store`
    ///
    /// A complete session already in the store starts on the dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn open(store: S) -> Result<Self> {
        let session = store.load_session()?;
        Ok(Self { store, session })
    }

    /// Current view
    #[must_use]
    pub const fn view(&self) -> View {
        if self.session.is_some() {
            View::Dashboard
        } else {
            View::Login
        }
    }

    /// Session of the signed-in admin
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Session, or [`Error::NotAuthenticated`] on the login view
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthenticated`] when signed out.
    pub fn require_session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(Error::NotAuthenticated)
    }

    /// Submit the login form and move to the dashboard on success
    ///
    /// # Errors
    ///
    /// Returns the login error; the view stays on the login form.
    pub async fn login(&mut self, form: &LoginForm, api: &dyn AdminApi) -> Result<&Session> {
        let session = form.submit(api, &mut self.store).await?;
        Ok(self.session.insert(session))
    }

    /// Forget the session and return to the login form
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn logout(&mut self) -> Result<()> {
        self.store.clear_session()?;
        self.session = None;
        info!("Logged out");
        Ok(())
    }

    /// Backing session store
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}
