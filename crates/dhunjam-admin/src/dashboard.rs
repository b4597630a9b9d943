//! Pricing dashboard
//!
//! Holds the venue profile, the editable pricing form derived from it, and
//! the chart of the regular tiers. All state is owned by one caller; network
//! calls go through [`AdminApi`] with the session passed in explicitly.
//!
//! Saving is split into [`PricingDashboard::begin_save`] and
//! [`PricingDashboard::finish_save`] so that only one update can be pending
//! at a time. Each save carries a [`SaveTicket`] and a completion for any
//! other ticket is rejected.

use crate::api_client::AdminApi;
use crate::chart::{ChartHandle, ChartRenderer};
use dhunjam_core::types::UpdateProfileRequest;
use dhunjam_core::{
    AdminProfile, Amount, Amounts, Error, PriceTier, Result, Session, is_save_eligible,
};
use tracing::{debug, error, info};

/// Whether the profile has been requested yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Entered but not loaded
    Loading,
    /// Profile requested and chart drawn
    Ready,
}

/// How [`PricingDashboard::load`] went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The profile came from the backend
    Fetched,
    /// The fetch failed; the form shows default values
    Fallback,
    /// The dashboard was already loaded and nothing was requested
    AlreadyLoaded,
}

/// Identifies one save request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SaveTicket(u64);

impl SaveTicket {
    /// Numeric id of the ticket
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Whether an update is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveState {
    /// No update pending
    #[default]
    Idle,
    /// An update was sent and has not completed
    Saving {
        /// Ticket of the pending update
        ticket: SaveTicket,
    },
}

/// Editable pricing derived from the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormState {
    amounts: Amounts,
    charge_customer: bool,
    save_enabled: bool,
}

impl FormState {
    /// Form for a freshly loaded profile, with eligibility computed
    #[must_use]
    pub fn from_profile(profile: &AdminProfile) -> Self {
        let mut form = Self {
            amounts: profile.amount,
            charge_customer: profile.charge_customers,
            save_enabled: false,
        };
        form.revalidate();
        form
    }

    /// Recompute `save_enabled` from the current values
    pub fn revalidate(&mut self) {
        self.save_enabled = is_save_eligible(self.charge_customer, &self.amounts);
    }

    /// All tier amounts
    #[must_use]
    pub const fn amounts(&self) -> &Amounts {
        &self.amounts
    }

    /// Amount of the custom tier
    #[must_use]
    pub const fn custom_amount(&self) -> Amount {
        self.amounts.category_6
    }

    /// Amounts of the regular tiers, `category_7` first
    #[must_use]
    pub fn regular_amounts(&self) -> [Amount; 4] {
        self.amounts.regular()
    }

    /// Whether customers are charged
    #[must_use]
    pub const fn charge_customer(&self) -> bool {
        self.charge_customer
    }

    /// Whether the price editor is shown
    #[must_use]
    pub const fn editor_visible(&self) -> bool {
        self.charge_customer
    }

    /// Whether the save action is enabled
    #[must_use]
    pub const fn save_enabled(&self) -> bool {
        self.save_enabled
    }
}

/// Labels of the chart, one per regular tier
#[must_use]
pub fn chart_labels() -> Vec<String> {
    PriceTier::REGULAR
        .iter()
        .map(|tier| tier.key().to_string())
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn chart_series(amounts: &Amounts) -> Vec<f64> {
    amounts.regular().iter().map(|amount| *amount as f64).collect()
}

/// Dashboard state for one signed-in admin
#[derive(Debug)]
pub struct PricingDashboard<R: ChartRenderer> {
    profile: AdminProfile,
    form: FormState,
    load_state: LoadState,
    save_state: SaveState,
    last_ticket: u64,
    chart: R,
    chart_handle: Option<ChartHandle>,
}

impl<R: ChartRenderer> PricingDashboard<R> {
    /// Dashboard that draws with `chart`; call [`Self::load`] next
    pub fn new(chart: R) -> Self {
        Self {
            profile: AdminProfile::default(),
            form: FormState::default(),
            load_state: LoadState::Loading,
            save_state: SaveState::Idle,
            last_ticket: 0,
            chart,
            chart_handle: None,
        }
    }

    /// Fetch the profile and draw the chart
    ///
    /// Runs once. A failed fetch is logged and the dashboard carries on with
    /// default values; the chart is drawn either way.
    ///
    /// # Errors
    ///
    /// Returns an error only if the chart cannot be created.
    pub async fn load(&mut self, api: &dyn AdminApi, session: &Session) -> Result<LoadOutcome> {
        if self.load_state == LoadState::Ready {
            return Ok(LoadOutcome::AlreadyLoaded);
        }

        let outcome = match api.fetch_profile(session).await {
            Ok(profile) => {
                info!(admin_id = %profile.id, name = %profile.name, "Admin profile loaded");
                self.form = FormState::from_profile(&profile);
                self.profile = profile;
                LoadOutcome::Fetched
            }
            Err(e) => {
                error!(error = %e, "Failed to load admin profile");
                LoadOutcome::Fallback
            }
        };

        self.load_state = LoadState::Ready;
        let handle = self
            .chart
            .create(&chart_labels(), &chart_series(&self.form.amounts))?;
        self.chart_handle = Some(handle);

        Ok(outcome)
    }

    /// Set the custom tier from text input
    ///
    /// # Errors
    ///
    /// Returns a validation error, leaving the form untouched, if the input
    /// is not a whole number.
    pub fn set_custom_amount(&mut self, input: &str) -> Result<()> {
        let amount: Amount = input.trim().parse().map_err(|_| {
            Error::validation(
                PriceTier::Category6.key(),
                format!("'{input}' is not a whole number"),
            )
        })?;

        self.set_amount(PriceTier::Category6, amount)
    }

    /// Set one regular tier
    ///
    /// # Errors
    ///
    /// Returns a validation error for the custom tier, which is edited with
    /// [`Self::set_custom_amount`].
    pub fn set_regular_amount(&mut self, tier: PriceTier, value: Amount) -> Result<()> {
        if tier.is_custom() {
            return Err(Error::validation(
                tier.key(),
                "the custom tier is not a regular tier",
            ));
        }

        debug!(%tier, value, "Regular tier selected");
        self.form.amounts.set(tier, value);
        self.form.revalidate();
        Ok(())
    }

    /// Set any tier, custom or regular
    ///
    /// # Errors
    ///
    /// Never fails for the custom tier; regular tiers as in
    /// [`Self::set_regular_amount`].
    pub fn set_amount(&mut self, tier: PriceTier, value: Amount) -> Result<()> {
        if !tier.is_custom() {
            return self.set_regular_amount(tier, value);
        }

        self.form.amounts.set(tier, value);
        self.form.revalidate();
        Ok(())
    }

    /// Re-enter a regular tier's current value, re-checking eligibility
    ///
    /// # Errors
    ///
    /// Same as [`Self::set_regular_amount`].
    pub fn touch_regular_amount(&mut self, tier: PriceTier) -> Result<()> {
        self.set_regular_amount(tier, self.form.amounts.get(tier))
    }

    /// Turn charging on or off
    ///
    /// Eligibility is left as it was, so a form that was eligible can still
    /// be saved with charging turned off.
    pub const fn set_charge_customer(&mut self, charge: bool) {
        self.form.charge_customer = charge;
    }

    /// Turn charging on or off from a `yes`/`no` choice
    ///
    /// # Errors
    ///
    /// Returns a validation error for any other word.
    pub fn choose_charge_customer(&mut self, choice: &str) -> Result<()> {
        let charge = match choice.trim().to_ascii_lowercase().as_str() {
            "yes" => true,
            "no" => false,
            _ => {
                return Err(Error::validation(
                    "charge_customers",
                    format!("expected 'yes' or 'no', got '{choice}'"),
                ));
            }
        };
        self.set_charge_customer(charge);
        Ok(())
    }

    /// Start a save, returning its ticket and the request to send
    ///
    /// # Errors
    ///
    /// Returns [`Error::SaveInFlight`] while another save is pending and
    /// [`Error::SaveNotPermitted`] when the form is not eligible.
    pub fn begin_save(&mut self) -> Result<(SaveTicket, UpdateProfileRequest)> {
        if let SaveState::Saving { .. } = self.save_state {
            return Err(Error::SaveInFlight);
        }
        if !self.form.save_enabled {
            return Err(Error::SaveNotPermitted);
        }

        self.last_ticket += 1;
        let ticket = SaveTicket(self.last_ticket);
        self.save_state = SaveState::Saving { ticket };

        let request = UpdateProfileRequest {
            amount: self.form.amounts,
            charge_customers: self.form.charge_customer,
        };
        debug!(ticket = ticket.id(), "Save started");
        Ok((ticket, request))
    }

    /// Apply the outcome of the save identified by `ticket`
    ///
    /// On success the profile becomes the server's copy, save is disabled
    /// until the next edit and the chart shows the saved regular amounts.
    /// On failure only the pending state is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleSave`] if `ticket` is not the pending save, the
    /// save's own error if it failed, or a chart error.
    pub fn finish_save(&mut self, ticket: SaveTicket, result: Result<AdminProfile>) -> Result<()> {
        match self.save_state {
            SaveState::Saving { ticket: pending } if pending == ticket => {}
            _ => return Err(Error::StaleSave { ticket: ticket.id() }),
        }
        self.save_state = SaveState::Idle;

        let profile = match result {
            Ok(profile) => profile,
            Err(e) => {
                error!(ticket = ticket.id(), error = %e, "Failed to save prices");
                return Err(e);
            }
        };

        info!(ticket = ticket.id(), "Prices saved");
        self.profile = profile;
        self.form.save_enabled = false;

        if let Some(handle) = self.chart_handle {
            self.chart.update(handle, &chart_series(&self.form.amounts))?;
        }
        Ok(())
    }

    /// Send the current pricing to the backend
    ///
    /// # Errors
    ///
    /// See [`Self::begin_save`] and [`Self::finish_save`].
    pub async fn save(&mut self, api: &dyn AdminApi, session: &Session) -> Result<()> {
        let (ticket, request) = self.begin_save()?;
        let result = api.update_profile(session, &request).await;
        self.finish_save(ticket, result)
    }

    /// Profile as last received from the backend
    #[must_use]
    pub const fn profile(&self) -> &AdminProfile {
        &self.profile
    }

    /// Current form values
    #[must_use]
    pub const fn form(&self) -> &FormState {
        &self.form
    }

    /// Venue heading
    #[must_use]
    pub fn heading(&self) -> String {
        self.profile.heading()
    }

    /// Load progress
    #[must_use]
    pub const fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// Save progress
    #[must_use]
    pub const fn save_state(&self) -> SaveState {
        self.save_state
    }

    /// Renderer the chart is drawn with
    #[must_use]
    pub const fn chart(&self) -> &R {
        &self.chart
    }

    /// Handle of the chart, once loaded
    #[must_use]
    pub const fn chart_handle(&self) -> Option<ChartHandle> {
        self.chart_handle
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dhunjam_core::types::LoginData;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Chart that records every call
    #[derive(Debug, Default)]
    struct RecordingChart {
        created: Vec<(Vec<String>, Vec<f64>)>,
        updated: Vec<Vec<f64>>,
    }

    impl ChartRenderer for RecordingChart {
        fn create(&mut self, labels: &[String], series: &[f64]) -> Result<ChartHandle> {
            self.created.push((labels.to_vec(), series.to_vec()));
            Ok(ChartHandle::new(1))
        }

        fn update(&mut self, _handle: ChartHandle, series: &[f64]) -> Result<()> {
            self.updated.push(series.to_vec());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeApi {
        profile: Option<AdminProfile>,
        save_fails: bool,
        updates: Mutex<Vec<UpdateProfileRequest>>,
    }

    #[async_trait]
    impl AdminApi for FakeApi {
        async fn authenticate(&self, _username: &str, _password: &str) -> Result<LoginData> {
            Err(Error::NotAuthenticated)
        }

        async fn fetch_profile(&self, _session: &Session) -> Result<AdminProfile> {
            self.profile.clone().ok_or(Error::Status {
                status: 500,
                context: "Fetching admin profile".to_string(),
            })
        }

        async fn update_profile(
            &self,
            _session: &Session,
            update: &UpdateProfileRequest,
        ) -> Result<AdminProfile> {
            self.updates.lock().unwrap().push(update.clone());
            if self.save_fails {
                return Err(Error::Network("connection reset".to_string()));
            }

            let mut profile = self.profile.clone().unwrap_or_default();
            profile.amount = update.amount;
            profile.charge_customers = update.charge_customers;
            Ok(profile)
        }
    }

    fn venue(charge_customers: bool) -> AdminProfile {
        AdminProfile {
            id: "42".to_string(),
            name: "Social".to_string(),
            location: "Hauz Khas".to_string(),
            charge_customers,
            amount: Amounts {
                category_6: 150,
                category_7: 90,
                category_8: 70,
                category_9: 50,
                category_10: 30,
            },
        }
    }

    fn api_with(profile: AdminProfile) -> FakeApi {
        FakeApi {
            profile: Some(profile),
            ..FakeApi::default()
        }
    }

    fn session() -> Session {
        Session::new("T1", "42")
    }

    async fn loaded(api: &FakeApi) -> PricingDashboard<RecordingChart> {
        let mut dashboard = PricingDashboard::new(RecordingChart::default());
        dashboard.load(api, &session()).await.unwrap();
        dashboard
    }

    #[tokio::test]
    async fn test_load_derives_form_and_chart() {
        let api = api_with(venue(true));
        let mut dashboard = PricingDashboard::new(RecordingChart::default());
        assert_eq!(dashboard.load_state(), LoadState::Loading);

        let outcome = dashboard.load(&api, &session()).await.unwrap();

        assert_eq!(outcome, LoadOutcome::Fetched);
        assert_eq!(dashboard.load_state(), LoadState::Ready);
        assert_eq!(dashboard.form().custom_amount(), 150);
        assert_eq!(dashboard.form().regular_amounts(), [90, 70, 50, 30]);
        assert!(dashboard.form().editor_visible());
        assert!(dashboard.form().save_enabled());
        assert_eq!(dashboard.heading(), "Social, Hauz Khas on Dhun jam");

        let created = &dashboard.chart().created;
        assert_eq!(created.len(), 1);
        assert_eq!(
            created.first().unwrap(),
            &(chart_labels(), vec![90.0, 70.0, 50.0, 30.0])
        );
    }

    #[tokio::test]
    async fn test_load_without_charging_hides_editor() {
        let api = api_with(venue(false));
        let dashboard = loaded(&api).await;

        assert!(!dashboard.form().editor_visible());
        assert!(!dashboard.form().save_enabled());
    }

    #[tokio::test]
    async fn test_failed_load_falls_back_and_still_draws() {
        let api = FakeApi::default();
        let mut dashboard = PricingDashboard::new(RecordingChart::default());

        let outcome = dashboard.load(&api, &session()).await.unwrap();

        assert_eq!(outcome, LoadOutcome::Fallback);
        assert_eq!(dashboard.load_state(), LoadState::Ready);
        assert_eq!(dashboard.profile(), &AdminProfile::default());
        assert_eq!(dashboard.form().regular_amounts(), [0, 0, 0, 0]);
        assert!(!dashboard.form().save_enabled());
        assert_eq!(dashboard.chart().created.len(), 1);
    }

    #[tokio::test]
    async fn test_load_runs_once() {
        let api = api_with(venue(true));
        let mut dashboard = loaded(&api).await;

        let outcome = dashboard.load(&api, &session()).await.unwrap();

        assert_eq!(outcome, LoadOutcome::AlreadyLoaded);
        assert_eq!(dashboard.chart().created.len(), 1);
    }

    #[tokio::test]
    async fn test_custom_amount_validates_post_edit_values() {
        let api = api_with(venue(true));
        let mut dashboard = loaded(&api).await;

        dashboard.set_custom_amount("99").unwrap();
        assert_eq!(dashboard.form().custom_amount(), 99);
        assert!(!dashboard.form().save_enabled());

        dashboard.set_custom_amount(" 100 ").unwrap();
        assert!(dashboard.form().save_enabled());
    }

    #[tokio::test]
    async fn test_custom_amount_rejects_non_numbers() {
        let api = api_with(venue(true));
        let mut dashboard = loaded(&api).await;
        let before = *dashboard.form();

        let result = dashboard.set_custom_amount("12a");

        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(dashboard.form(), &before);
    }

    #[tokio::test]
    async fn test_regular_amount_edits() {
        let api = api_with(venue(true));
        let mut dashboard = loaded(&api).await;

        dashboard.set_regular_amount(PriceTier::Category10, 19).unwrap();
        assert!(!dashboard.form().save_enabled());

        dashboard.set_regular_amount(PriceTier::Category10, 20).unwrap();
        assert!(dashboard.form().save_enabled());
        assert_eq!(dashboard.form().regular_amounts(), [90, 70, 50, 20]);

        assert!(matches!(
            dashboard.set_regular_amount(PriceTier::Category6, 500),
            Err(Error::Validation { .. })
        ));
        assert_eq!(dashboard.form().custom_amount(), 150);
    }

    #[tokio::test]
    async fn test_set_amount_covers_every_tier() {
        let api = api_with(venue(true));
        let mut dashboard = loaded(&api).await;

        dashboard.set_amount(PriceTier::Category6, 99).unwrap();
        assert!(!dashboard.form().save_enabled());
        assert_eq!(dashboard.form().amounts().get(PriceTier::Category6), 99);

        dashboard.set_amount(PriceTier::Category6, 120).unwrap();
        dashboard.set_amount(PriceTier::Category9, 45).unwrap();
        assert!(dashboard.form().save_enabled());
        assert_eq!(dashboard.form().regular_amounts(), [90, 70, 45, 30]);
    }

    #[tokio::test]
    async fn test_touch_regular_amount_revalidates() {
        let api = api_with(venue(true));
        let mut dashboard = loaded(&api).await;

        dashboard.set_charge_customer(false);
        assert!(dashboard.form().save_enabled());

        dashboard.touch_regular_amount(PriceTier::Category8).unwrap();
        assert!(!dashboard.form().save_enabled());
        assert_eq!(dashboard.form().regular_amounts(), [90, 70, 50, 30]);
    }

    #[tokio::test]
    async fn test_charge_toggle_does_not_revalidate() {
        let api = api_with(venue(false));
        let mut dashboard = loaded(&api).await;

        dashboard.choose_charge_customer("yes").unwrap();
        assert!(dashboard.form().editor_visible());
        assert!(!dashboard.form().save_enabled());

        dashboard.choose_charge_customer(" No ").unwrap();
        assert!(!dashboard.form().charge_customer());

        assert!(matches!(
            dashboard.choose_charge_customer("maybe"),
            Err(Error::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_save_sends_form_and_resets_eligibility() {
        let api = api_with(venue(true));
        let mut dashboard = loaded(&api).await;
        dashboard.set_regular_amount(PriceTier::Category7, 120).unwrap();

        dashboard.save(&api, &session()).await.unwrap();

        let updates = api.updates.lock().unwrap().clone();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates.first().unwrap().amount.category_7, 120);
        assert!(updates.first().unwrap().charge_customers);

        assert!(!dashboard.form().save_enabled());
        assert!(dashboard.form().charge_customer());
        assert_eq!(dashboard.save_state(), SaveState::Idle);
        assert_eq!(dashboard.profile().amount.category_7, 120);
        assert_eq!(
            dashboard.chart().updated,
            vec![vec![120.0, 70.0, 50.0, 30.0]]
        );
    }

    #[tokio::test]
    async fn test_save_can_turn_charging_off() {
        let api = api_with(venue(true));
        let mut dashboard = loaded(&api).await;
        dashboard.set_charge_customer(false);

        dashboard.save(&api, &session()).await.unwrap();

        assert!(!api.updates.lock().unwrap().first().unwrap().charge_customers);
        assert!(!dashboard.profile().charge_customers);
    }

    #[tokio::test]
    async fn test_save_refused_when_not_eligible() {
        let api = api_with(venue(false));
        let mut dashboard = loaded(&api).await;

        let result = dashboard.save(&api, &session()).await;

        assert!(matches!(result, Err(Error::SaveNotPermitted)));
        assert!(api.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_returns_to_idle() {
        let api = FakeApi {
            save_fails: true,
            ..api_with(venue(true))
        };
        let mut dashboard = loaded(&api).await;
        let before = *dashboard.form();

        let result = dashboard.save(&api, &session()).await;

        assert!(matches!(result, Err(Error::Network(_))));
        assert_eq!(dashboard.save_state(), SaveState::Idle);
        assert_eq!(dashboard.form(), &before);
        assert!(dashboard.chart().updated.is_empty());
    }

    #[tokio::test]
    async fn test_only_one_save_in_flight() {
        let api = api_with(venue(true));
        let mut dashboard = loaded(&api).await;

        let (ticket, _) = dashboard.begin_save().unwrap();
        assert_eq!(dashboard.save_state(), SaveState::Saving { ticket });
        assert!(matches!(dashboard.begin_save(), Err(Error::SaveInFlight)));

        dashboard.finish_save(ticket, Ok(venue(true))).unwrap();
        assert_eq!(dashboard.save_state(), SaveState::Idle);
    }

    #[tokio::test]
    async fn test_stale_ticket_is_rejected() {
        let api = api_with(venue(true));
        let mut dashboard = loaded(&api).await;

        let (first, _) = dashboard.begin_save().unwrap();
        dashboard
            .finish_save(first, Err(Error::Network("timeout".to_string())))
            .unwrap_err();

        let (second, _) = dashboard.begin_save().unwrap();
        assert!(second > first);

        let result = dashboard.finish_save(first, Ok(venue(true)));
        assert!(matches!(result, Err(Error::StaleSave { ticket }) if ticket == first.id()));
        assert_eq!(dashboard.save_state(), SaveState::Saving { ticket: second });
    }
}
