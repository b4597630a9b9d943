//! Core data types for the DhunJam venue admin console

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Price of a song request, in whole currency units
pub type Amount = i64;

/// Session store key holding the bearer token
pub const TOKEN_KEY: &str = "token";

/// Session store key holding the admin identifier
pub const ADMIN_ID_KEY: &str = "adminId";

/// A priced song-request category
///
/// `category_6` is the custom tier, `category_7` to `category_10` are the
/// regular tiers shown in the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriceTier {
    /// Custom song request
    #[serde(rename = "category_6")]
    Category6,
    /// First regular tier
    #[serde(rename = "category_7")]
    Category7,
    /// Second regular tier
    #[serde(rename = "category_8")]
    Category8,
    /// Third regular tier
    #[serde(rename = "category_9")]
    Category9,
    /// Fourth regular tier
    #[serde(rename = "category_10")]
    Category10,
}

impl PriceTier {
    /// Every tier, custom first
    pub const ALL: [Self; 5] = [
        Self::Category6,
        Self::Category7,
        Self::Category8,
        Self::Category9,
        Self::Category10,
    ];

    /// The regular tiers, in chart order
    pub const REGULAR: [Self; 4] = [
        Self::Category7,
        Self::Category8,
        Self::Category9,
        Self::Category10,
    ];

    /// Wire key of the tier
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Category6 => "category_6",
            Self::Category7 => "category_7",
            Self::Category8 => "category_8",
            Self::Category9 => "category_9",
            Self::Category10 => "category_10",
        }
    }

    /// Amount the tier must exceed before a save is allowed
    #[must_use]
    pub const fn minimum_exclusive(self) -> Amount {
        match self {
            Self::Category6 => 99,
            Self::Category7 => 79,
            Self::Category8 => 59,
            Self::Category9 => 39,
            Self::Category10 => 19,
        }
    }

    /// Whether this is the custom tier
    #[must_use]
    pub const fn is_custom(self) -> bool {
        matches!(self, Self::Category6)
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PriceTier {
    type Err = crate::Error;

    /// Accepts the wire key (`category_7`) or the bare number (`7`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed.strip_prefix("category_").unwrap_or(trimmed);
        match number {
            "6" => Ok(Self::Category6),
            "7" => Ok(Self::Category7),
            "8" => Ok(Self::Category8),
            "9" => Ok(Self::Category9),
            "10" => Ok(Self::Category10),
            _ => Err(crate::Error::validation(
                "tier",
                format!("unknown price category '{s}'"),
            )),
        }
    }
}

/// Tier amounts as exchanged with the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Amounts {
    /// Custom tier
    #[serde(deserialize_with = "lenient_amount")]
    pub category_6: Amount,
    /// Regular tier 1
    #[serde(deserialize_with = "lenient_amount")]
    pub category_7: Amount,
    /// Regular tier 2
    #[serde(deserialize_with = "lenient_amount")]
    pub category_8: Amount,
    /// Regular tier 3
    #[serde(deserialize_with = "lenient_amount")]
    pub category_9: Amount,
    /// Regular tier 4
    #[serde(deserialize_with = "lenient_amount")]
    pub category_10: Amount,
}

impl Amounts {
    /// Amount of a tier
    #[must_use]
    pub const fn get(&self, tier: PriceTier) -> Amount {
        match tier {
            PriceTier::Category6 => self.category_6,
            PriceTier::Category7 => self.category_7,
            PriceTier::Category8 => self.category_8,
            PriceTier::Category9 => self.category_9,
            PriceTier::Category10 => self.category_10,
        }
    }

    /// Replace the amount of a tier
    pub const fn set(&mut self, tier: PriceTier, amount: Amount) {
        match tier {
            PriceTier::Category6 => self.category_6 = amount,
            PriceTier::Category7 => self.category_7 = amount,
            PriceTier::Category8 => self.category_8 = amount,
            PriceTier::Category9 => self.category_9 = amount,
            PriceTier::Category10 => self.category_10 = amount,
        }
    }

    /// Regular tier amounts in chart order
    #[must_use]
    pub fn regular(&self) -> [Amount; 4] {
        PriceTier::REGULAR.map(|tier| self.get(tier))
    }

    /// Whether every tier is above its minimum
    #[must_use]
    pub fn meets_minimums(&self) -> bool {
        PriceTier::ALL
            .iter()
            .all(|tier| self.get(*tier) > tier.minimum_exclusive())
    }
}

/// Save-eligibility gate: charging is on and every tier clears its minimum
#[must_use]
pub fn is_save_eligible(charge_customers: bool, amounts: &Amounts) -> bool {
    charge_customers && amounts.meets_minimums()
}

/// Venue admin profile as stored by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminProfile {
    /// Admin identifier
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Venue name
    pub name: String,

    /// Venue location
    pub location: String,

    /// Whether customers pay for song requests
    pub charge_customers: bool,

    /// Tier amounts
    pub amount: Amounts,
}

impl AdminProfile {
    /// Dashboard heading for the venue
    #[must_use]
    pub fn heading(&self) -> String {
        format!("{}, {} on Dhun jam", self.name, self.location)
    }
}

/// Authenticated admin session
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token
    pub token: String,

    /// Admin identifier used in profile URLs
    pub admin_id: String,
}

impl Session {
    /// Create a session from its two parts
    pub fn new(token: impl Into<String>, admin_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            admin_id: admin_id.into(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("admin_id", &self.admin_id)
            .finish()
    }
}

/// Body of the login request
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    /// Admin username
    pub username: String,
    /// Admin password
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Payload of a successful login
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginData {
    /// Bearer token
    pub token: String,
    /// Admin identifier
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

/// Body of the profile update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    /// New tier amounts
    pub amount: Amounts,
    /// Whether customers pay for song requests
    pub charge_customers: bool,
}

/// Envelope every backend response is wrapped in
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Response payload
    pub data: T,
}

/// The backend is not consistent about identifiers being strings or numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

/// Amounts are whole units, but the backend sometimes sends fractions,
/// numeric strings or `null`. Fractions round to the nearest unit and
/// `null` reads as zero.
#[allow(clippy::cast_possible_truncation)]
fn lenient_amount<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Whole(i64),
        Fractional(f64),
        Text(String),
    }

    let amount = match Option::<Raw>::deserialize(deserializer)? {
        None => 0,
        Some(Raw::Whole(whole)) => whole,
        Some(Raw::Fractional(fraction)) => fraction.round() as Amount,
        Some(Raw::Text(text)) => {
            let text = text.trim();
            match text.parse::<Amount>() {
                Ok(whole) => whole,
                Err(_) => text
                    .parse::<f64>()
                    .ok()
                    .filter(|fraction| fraction.is_finite())
                    .map(|fraction| fraction.round() as Amount)
                    .ok_or_else(|| {
                        serde::de::Error::custom(format!("'{text}' is not an amount"))
                    })?,
            }
        }
    };
    Ok(amount)
}
