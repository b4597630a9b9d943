//! Console commands behind the `dhunjam-admin` binary
//!
//! Each command writes its report to `out` and hints to `err`, and returns a
//! [`CommandStatus`] the binary turns into an exit code.

use crate::api_client::AdminApi;
use crate::app::Console;
use crate::chart::{ChartRenderer, PlotlyChartRenderer, TextChartRenderer};
use crate::dashboard::{LoadOutcome, PricingDashboard};
use crate::login::LoginForm;
use crate::session::SessionStore;
use dhunjam_core::{Amount, Error, PriceTier, Result, Session};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// How a command finished when it did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// Command did what was asked
    Success,
    /// No stored session; the admin has to log in first
    LoginRequired,
    /// `--save` was requested on a form that is not eligible
    SaveRefused,
}

impl CommandStatus {
    /// Whether the binary should exit successfully
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Edits requested on the `pricing` command
///
/// Applied in field order: charge choice, custom amount, then `amounts` in
/// the order given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PricingEdits {
    /// `yes` or `no`
    pub charge: Option<String>,
    /// Raw custom amount input
    pub custom: Option<String>,
    /// Tier amounts to set
    pub amounts: Vec<(PriceTier, Amount)>,
    /// Send the result to the backend
    pub save: bool,
}

/// Parse a `TIER=AMOUNT` pair such as `category_7=90` or `8=70`
///
/// # Errors
///
/// Returns a validation error for a missing `=`, an unknown tier or a
/// non-integer amount.
pub fn parse_tier_amount(input: &str) -> Result<(PriceTier, Amount)> {
    let (tier, amount) = input
        .split_once('=')
        .ok_or_else(|| Error::validation("tier", format!("expected TIER=AMOUNT, got '{input}'")))?;

    let tier: PriceTier = tier.parse()?;
    let amount = amount.trim().parse().map_err(|_| {
        Error::validation(tier.key(), format!("'{}' is not a whole number", amount.trim()))
    })?;
    Ok((tier, amount))
}

/// Message printed when a command fails
#[must_use]
pub fn failure_message(error: &Error) -> String {
    if error.is_remote() {
        format!("Could not reach the DhunJam backend: {error}")
    } else {
        format!("Error: {error}")
    }
}

/// Session of the signed-in admin, or a login hint written to `err`
///
/// # Errors
///
/// Returns an error only if `err` cannot be written.
pub fn session_or_hint<S: SessionStore>(
    console: &Console<S>,
    err: &mut impl Write,
) -> Result<Option<Session>> {
    match console.require_session() {
        Ok(session) => Ok(Some(session.clone())),
        Err(e) => {
            writeln!(
                err,
                "{e}. Run `dhunjam-admin login --username <USERNAME>` first."
            )?;
            Ok(None)
        }
    }
}

/// Apply `edits` to a loaded dashboard
///
/// # Errors
///
/// Stops at the first rejected edit and returns its error.
pub fn apply_edits<R: ChartRenderer>(
    dashboard: &mut PricingDashboard<R>,
    edits: &PricingEdits,
) -> Result<()> {
    if let Some(choice) = &edits.charge {
        dashboard.choose_charge_customer(choice)?;
    }
    if let Some(custom) = &edits.custom {
        dashboard.set_custom_amount(custom)?;
    }
    for &(tier, value) in &edits.amounts {
        dashboard.set_amount(tier, value)?;
    }
    Ok(())
}

/// `login`: echo the form, then sign in and store the session
///
/// # Errors
///
/// Returns the login error or an output error.
pub async fn login<S: SessionStore>(
    console: &mut Console<S>,
    api: &dyn AdminApi,
    form: &LoginForm,
    out: &mut impl Write,
) -> Result<CommandStatus> {
    writeln!(out, "Username: {}", form.username)?;
    writeln!(out, "Password: {}", form.displayed_password())?;

    let session = console.login(form, api).await?;
    info!(admin_id = %session.admin_id, "Session stored");
    writeln!(out, "Logged in as admin {}", session.admin_id)?;
    Ok(CommandStatus::Success)
}

/// `logout`: forget the stored session
///
/// # Errors
///
/// Returns a store or output error.
pub fn logout<S: SessionStore>(
    console: &mut Console<S>,
    out: &mut impl Write,
) -> Result<CommandStatus> {
    console.logout()?;
    writeln!(out, "Logged out")?;
    Ok(CommandStatus::Success)
}

/// `show`: load and print the venue's pricing
///
/// # Errors
///
/// Returns a chart or output error.
pub async fn show<S: SessionStore>(
    console: &Console<S>,
    api: &dyn AdminApi,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<CommandStatus> {
    let Some(session) = session_or_hint(console, err)? else {
        return Ok(CommandStatus::LoginRequired);
    };

    let mut dashboard = PricingDashboard::new(TextChartRenderer::new());
    let outcome = dashboard.load(api, &session).await?;

    write_dashboard(&dashboard, outcome, out, err)?;
    Ok(CommandStatus::Success)
}

/// `pricing`: load, apply edits and optionally save
///
/// # Errors
///
/// Returns a rejected edit, a failed save or an output error.
pub async fn pricing<S: SessionStore>(
    console: &Console<S>,
    api: &dyn AdminApi,
    edits: &PricingEdits,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<CommandStatus> {
    let Some(session) = session_or_hint(console, err)? else {
        return Ok(CommandStatus::LoginRequired);
    };

    let mut dashboard = PricingDashboard::new(TextChartRenderer::new());
    let outcome = dashboard.load(api, &session).await?;
    apply_edits(&mut dashboard, edits)?;

    if edits.save {
        if !dashboard.form().save_enabled() {
            write_dashboard(&dashboard, outcome, out, err)?;
            writeln!(
                err,
                "Save is disabled: customers must be charged and every tier must be above its minimum"
            )?;
            return Ok(CommandStatus::SaveRefused);
        }
        dashboard.save(api, &session).await?;
        writeln!(out, "Prices saved")?;
    }

    write_dashboard(&dashboard, outcome, out, err)?;
    Ok(CommandStatus::Success)
}

/// `chart`: write the regular tier chart to `output`
///
/// # Errors
///
/// Returns a chart or output error.
pub async fn chart<S: SessionStore>(
    console: &Console<S>,
    api: &dyn AdminApi,
    output: PathBuf,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<CommandStatus> {
    let Some(session) = session_or_hint(console, err)? else {
        return Ok(CommandStatus::LoginRequired);
    };

    let mut dashboard = PricingDashboard::new(PlotlyChartRenderer::new(output));
    dashboard.load(api, &session).await?;

    writeln!(out, "Chart written to {}", dashboard.chart().output().display())?;
    Ok(CommandStatus::Success)
}

fn write_dashboard(
    dashboard: &PricingDashboard<TextChartRenderer>,
    outcome: LoadOutcome,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()> {
    if outcome == LoadOutcome::Fallback {
        writeln!(err, "Could not load the venue profile; showing default values")?;
    }

    let form = dashboard.form();
    writeln!(out, "{}", dashboard.heading())?;
    writeln!(
        out,
        "Charge customers for song requests: {}",
        if form.charge_customer() { "yes" } else { "no" }
    )?;

    if form.editor_visible() {
        let amounts = form.amounts();
        writeln!(
            out,
            "Custom song request amount: {}",
            amounts.get(PriceTier::Category6)
        )?;
        writeln!(out, "Regular song request amounts:")?;
        for tier in PriceTier::REGULAR {
            writeln!(out, "  {tier}: {}", amounts.get(tier))?;
        }
    }

    writeln!(
        out,
        "Save: {}",
        if form.save_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    )?;

    if let Some(text) = dashboard
        .chart_handle()
        .and_then(|handle| dashboard.chart().render(handle))
    {
        writeln!(out)?;
        write!(out, "{text}")?;
    }
    Ok(())
}
