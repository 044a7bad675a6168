#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crime classification types and severity definitions.
//!
//! Incidents carry the police department's free-text primary type and an
//! FBI UCR offense code. This crate maps both onto the coarse
//! [`CrimeCategory`] buckets used by the dashboard and onto the
//! [`FbiCategory`] offense names, which in turn carry a [`CrimeSeverity`].

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Severity level for a crime, from 1 (minor) to 5 (critical).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CrimeSeverity {
    /// Level 1: disorderly conduct, vandalism, misc offenses
    Minor = 1,
    /// Level 2: drug, fraud and forgery offenses
    Low = 2,
    /// Level 3: burglary, vehicle theft, weapons
    Moderate = 3,
    /// Level 4: robbery, aggravated assault, arson, sexual assault
    High = 4,
    /// Level 5: homicide
    Critical = 5,
}

impl CrimeSeverity {
    /// Returns the numeric value of this severity level.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Creates a severity level from a numeric value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-5.
    pub const fn from_value(value: u8) -> Result<Self, InvalidSeverityError> {
        match value {
            1 => Ok(Self::Minor),
            2 => Ok(Self::Low),
            3 => Ok(Self::Moderate),
            4 => Ok(Self::High),
            5 => Ok(Self::Critical),
            _ => Err(InvalidSeverityError { value }),
        }
    }
}

/// Error returned when attempting to create a [`CrimeSeverity`] from an invalid
/// numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSeverityError {
    /// The invalid severity value that was provided.
    pub value: u8,
}

impl std::fmt::Display for InvalidSeverityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid severity value {}: expected 1-5", self.value)
    }
}

impl std::error::Error for InvalidSeverityError {}

const VIOLENT_TYPES: &[&str] = &[
    "BATTERY",
    "ASSAULT",
    "HOMICIDE",
    "ROBBERY",
    "CRIM SEXUAL ASSAULT",
    "CRIMINAL SEXUAL ASSAULT",
];
const PROPERTY_TYPES: &[&str] = &["BURGLARY", "THEFT", "MOTOR VEHICLE THEFT", "ARSON"];
const DRUG_TYPES: &[&str] = &["NARCOTICS", "OTHER NARCOTIC VIOLATION"];
const PUBLIC_ORDER_TYPES: &[&str] = &["PUBLIC PEACE VIOLATION", "INTERFERENCE WITH PUBLIC OFFICER"];
const WEAPON_TYPES: &[&str] = &[
    "WEAPONS VIOLATION",
    "UNLAWFUL USE OF WEAPON",
    "CONCEALED CARRY LICENSE VIOLATION",
];

/// Coarse crime buckets shown on the dashboard.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CrimeCategory {
    /// Battery, assault, homicide, robbery, sexual assault
    Violent,
    /// Burglary, theft, vehicle theft, arson
    Property,
    /// Narcotics offenses
    Drug,
    /// Weapons violations
    Weapons,
    /// Public peace violations and interference with officers
    PublicOrder,
    /// Anything else
    Other,
}

impl CrimeCategory {
    /// Classifies an incident from its (normalized, upper-case) primary type
    /// and optional FBI code.
    ///
    /// Violent wins over property, which wins over drug, weapons and public
    /// order, in that order. The FBI code only widens the violent and
    /// property buckets.
    #[must_use]
    pub fn classify(primary_type: &str, fbi_code: Option<&str>) -> Self {
        let fbi = fbi_code.and_then(FbiCategory::from_code);

        if VIOLENT_TYPES.contains(&primary_type) || fbi.is_some_and(FbiCategory::is_violent) {
            Self::Violent
        } else if PROPERTY_TYPES.contains(&primary_type) || fbi.is_some_and(FbiCategory::is_property)
        {
            Self::Property
        } else if DRUG_TYPES.contains(&primary_type) {
            Self::Drug
        } else if WEAPON_TYPES.contains(&primary_type) {
            Self::Weapons
        } else if PUBLIC_ORDER_TYPES.contains(&primary_type) {
            Self::PublicOrder
        } else {
            Self::Other
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Violent,
            Self::Property,
            Self::Drug,
            Self::Weapons,
            Self::PublicOrder,
            Self::Other,
        ]
    }
}

/// FBI UCR offense groups, keyed by the incident's `fbi_code`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FbiCategory {
    // ── Violent ──────────────────────────────────────────
    /// 01A
    Homicide,
    /// 01B
    Manslaughter,
    /// 02
    SexualAssault,
    /// 03
    Robbery,
    /// 04A
    AggravatedAssault,
    /// 04B
    SimpleAssault,

    // ── Property ────────────────────────────────────────
    /// 05
    Burglary,
    /// 06
    Theft,
    /// 07
    MotorVehicleTheft,
    /// 08A
    Arson,
    /// 08B
    CriminalDamage,
    /// 09
    Fraud,
    /// 10
    Forgery,
    /// 11
    Embezzlement,
    /// 12
    StolenProperty,
    /// 13
    Vandalism,

    // ── Other ───────────────────────────────────────────
    /// 14
    WeaponsViolation,
    /// 15
    Prostitution,
    /// 16
    SexOffense,
    /// 17
    DrugViolation,
    /// 18
    Gambling,
    /// 19
    OffenseAgainstFamily,
    /// 20
    DrivingOffense,
    /// 21
    LiquorLawViolation,
    /// 22
    PublicOrder,
    /// 24
    DisorderlyConduct,
    /// 26
    Miscellaneous,
}

impl FbiCategory {
    /// Maps an FBI UCR code (e.g. `"04A"`) to its offense group.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "01A" => Self::Homicide,
            "01B" => Self::Manslaughter,
            "02" => Self::SexualAssault,
            "03" => Self::Robbery,
            "04A" => Self::AggravatedAssault,
            "04B" => Self::SimpleAssault,
            "05" => Self::Burglary,
            "06" => Self::Theft,
            "07" => Self::MotorVehicleTheft,
            "08A" => Self::Arson,
            "08B" => Self::CriminalDamage,
            "09" => Self::Fraud,
            "10" => Self::Forgery,
            "11" => Self::Embezzlement,
            "12" => Self::StolenProperty,
            "13" => Self::Vandalism,
            "14" => Self::WeaponsViolation,
            "15" => Self::Prostitution,
            "16" => Self::SexOffense,
            "17" => Self::DrugViolation,
            "18" => Self::Gambling,
            "19" => Self::OffenseAgainstFamily,
            "20" => Self::DrivingOffense,
            "21" => Self::LiquorLawViolation,
            "22" => Self::PublicOrder,
            "24" => Self::DisorderlyConduct,
            "26" => Self::Miscellaneous,
            _ => return None,
        })
    }

    /// Whether this is one of the UCR violent offense codes (01A-04B).
    #[must_use]
    pub const fn is_violent(self) -> bool {
        matches!(
            self,
            Self::Homicide
                | Self::Manslaughter
                | Self::SexualAssault
                | Self::Robbery
                | Self::AggravatedAssault
                | Self::SimpleAssault
        )
    }

    /// Whether this is one of the UCR property offense codes (05-13).
    #[must_use]
    pub const fn is_property(self) -> bool {
        matches!(
            self,
            Self::Burglary
                | Self::Theft
                | Self::MotorVehicleTheft
                | Self::Arson
                | Self::CriminalDamage
                | Self::Fraud
                | Self::Forgery
                | Self::Embezzlement
                | Self::StolenProperty
                | Self::Vandalism
        )
    }

    /// Returns the severity for this offense group, or `None` when the
    /// group has no assigned severity.
    #[must_use]
    pub const fn severity(self) -> Option<CrimeSeverity> {
        match self {
            Self::Homicide => Some(CrimeSeverity::Critical),
            Self::Manslaughter
            | Self::SexualAssault
            | Self::Robbery
            | Self::AggravatedAssault
            | Self::Arson => Some(CrimeSeverity::High),
            Self::Burglary | Self::MotorVehicleTheft | Self::WeaponsViolation => {
                Some(CrimeSeverity::Moderate)
            }
            Self::DrugViolation | Self::Fraud | Self::Forgery => Some(CrimeSeverity::Low),
            Self::DisorderlyConduct | Self::Vandalism | Self::PublicOrder | Self::Miscellaneous => {
                Some(CrimeSeverity::Minor)
            }
            Self::SimpleAssault
            | Self::Theft
            | Self::CriminalDamage
            | Self::Embezzlement
            | Self::StolenProperty
            | Self::Prostitution
            | Self::SexOffense
            | Self::Gambling
            | Self::OffenseAgainstFamily
            | Self::DrivingOffense
            | Self::LiquorLawViolation => None,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Homicide,
            Self::Manslaughter,
            Self::SexualAssault,
            Self::Robbery,
            Self::AggravatedAssault,
            Self::SimpleAssault,
            Self::Burglary,
            Self::Theft,
            Self::MotorVehicleTheft,
            Self::Arson,
            Self::CriminalDamage,
            Self::Fraud,
            Self::Forgery,
            Self::Embezzlement,
            Self::StolenProperty,
            Self::Vandalism,
            Self::WeaponsViolation,
            Self::Prostitution,
            Self::SexOffense,
            Self::DrugViolation,
            Self::Gambling,
            Self::OffenseAgainstFamily,
            Self::DrivingOffense,
            Self::LiquorLawViolation,
            Self::PublicOrder,
            Self::DisorderlyConduct,
            Self::Miscellaneous,
        ]
    }
}
