use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_VEHICLES: u32 = 200;
pub const MAX_DISTANCE_MILES: f64 = 4000.0;
pub const MAX_NOTES_CHARS: usize = 400;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: expected a 5-digit ZIP")]
    InvalidZip { field: &'static str },
    #[error("vehicles must be a whole number between 1 and 200")]
    InvalidVehicleCount,
    #[error("distance must be a number greater than 0 and at most 4000 miles")]
    InvalidDistance,
    #[error("select a transport mode")]
    MissingTransportMode,
    #[error("notes are limited to 400 characters")]
    NotesTooLong,
    #[error("full name, email and phone are required")]
    MissingContact,
    #[error("name is too short")]
    NameTooShort,
    #[error("invalid email")]
    InvalidEmail,
    #[error("invalid phone")]
    InvalidPhone,
    #[error("unknown {kind}: {value}")]
    UnknownOption { kind: &'static str, value: String },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    #[default]
    LastMile,
    Dispatch,
    VehicleRelocation,
}

impl ServiceType {
    pub const ALL: [ServiceType; 3] = [
        ServiceType::LastMile,
        ServiceType::Dispatch,
        ServiceType::VehicleRelocation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::LastMile => "last-mile",
            ServiceType::Dispatch => "dispatch",
            ServiceType::VehicleRelocation => "vehicle-relocation",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::LastMile => "Last-Mile Delivery",
            ServiceType::Dispatch => "Dispatch Operations",
            ServiceType::VehicleRelocation => "Vehicle Relocation",
        }
    }

    pub fn needs_transport_mode(&self) -> bool {
        matches!(self, ServiceType::VehicleRelocation)
    }
}

impl FromStr for ServiceType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ServiceType::ALL
            .into_iter()
            .find(|service| service.as_str() == value)
            .ok_or_else(|| ValidationError::UnknownOption {
                kind: "service type",
                value: value.to_string(),
            })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportMode {
    #[default]
    Open,
    Enclosed,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Open => "open",
            TransportMode::Enclosed => "enclosed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransportMode::Open => "Open Transport",
            TransportMode::Enclosed => "Enclosed Transport",
        }
    }
}

impl FromStr for TransportMode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "open" => Ok(TransportMode::Open),
            "enclosed" => Ok(TransportMode::Enclosed),
            other => Err(ValidationError::UnknownOption {
                kind: "transport mode",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeedTier {
    #[default]
    Standard,
    Expedited,
}

impl SpeedTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedTier::Standard => "standard",
            SpeedTier::Expedited => "expedited",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SpeedTier::Standard => "Standard",
            SpeedTier::Expedited => "Expedited",
        }
    }
}

impl FromStr for SpeedTier {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "standard" => Ok(SpeedTier::Standard),
            "expedited" => Ok(SpeedTier::Expedited),
            other => Err(ValidationError::UnknownOption {
                kind: "speed",
                value: other.to_string(),
            }),
        }
    }
}

/// A US postal code: exactly five ASCII digits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZipCode(String);

impl ZipCode {
    pub fn parse(raw: &str) -> Option<Self> {
        Self::is_valid(raw).then(|| Self(raw.to_string()))
    }

    pub fn is_valid(raw: &str) -> bool {
        raw.len() == 5 && raw.bytes().all(|b| b.is_ascii_digit())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ZipCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if Self::is_valid(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidZip { field: "zip" })
        }
    }
}

impl From<ZipCode> for String {
    fn from(zip: ZipCode) -> Self {
        zip.0
    }
}

/// Directional origin/destination pair. `A -> B` and `B -> A` are distinct.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ZipPair {
    pub origin: ZipCode,
    pub destination: ZipCode,
}

impl ZipPair {
    pub fn new(origin: ZipCode, destination: ZipCode) -> Self {
        Self {
            origin,
            destination,
        }
    }

    pub fn parse(origin: &str, destination: &str) -> Option<Self> {
        Some(Self::new(ZipCode::parse(origin)?, ZipCode::parse(destination)?))
    }

    /// Key used by both cache tiers: `"<origin>-<destination>"`.
    pub fn cache_key(&self) -> String {
        format!("{}-{}", self.origin, self.destination)
    }
}

impl fmt::Display for ZipPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.origin, self.destination)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Raw form state as the user edits it. Numeric fields stay textual until
/// [`QuoteDraft::validate`] so half-typed values never crash the estimate.
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteDraft {
    pub origin_zip: String,
    pub destination_zip: String,
    pub vehicles: String,
    pub distance_miles: String,
    pub service_type: ServiceType,
    pub transport_mode: Option<TransportMode>,
    pub speed: SpeedTier,
    pub notes: String,
}

impl Default for QuoteDraft {
    fn default() -> Self {
        Self {
            origin_zip: String::new(),
            destination_zip: String::new(),
            vehicles: "1".to_string(),
            distance_miles: "100".to_string(),
            service_type: ServiceType::LastMile,
            transport_mode: Some(TransportMode::Open),
            speed: SpeedTier::Standard,
            notes: String::new(),
        }
    }
}

impl QuoteDraft {
    pub fn zip_pair(&self) -> Option<ZipPair> {
        ZipPair::parse(&self.origin_zip, &self.destination_zip)
    }

    pub fn validate(&self) -> Result<QuoteInput, ValidationError> {
        let origin_zip = ZipCode::parse(&self.origin_zip).ok_or(ValidationError::InvalidZip {
            field: "pickup ZIP",
        })?;
        let destination_zip =
            ZipCode::parse(&self.destination_zip).ok_or(ValidationError::InvalidZip {
                field: "dropoff ZIP",
            })?;
        let vehicle_count = parse_vehicle_count(&self.vehicles)?;
        let distance_miles = parse_distance(&self.distance_miles)?;

        let transport_mode = if self.service_type.needs_transport_mode() {
            Some(self.transport_mode.ok_or(ValidationError::MissingTransportMode)?)
        } else {
            None
        };

        if self.notes.chars().count() > MAX_NOTES_CHARS {
            return Err(ValidationError::NotesTooLong);
        }

        Ok(QuoteInput {
            origin_zip,
            destination_zip,
            vehicle_count,
            distance_miles,
            service_type: self.service_type,
            transport_mode,
            speed: self.speed,
        })
    }
}

fn parse_vehicle_count(raw: &str) -> Result<u32, ValidationError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidVehicleCount)?;
    if !value.is_finite() || value.fract() != 0.0 || value < 1.0 || value > MAX_VEHICLES as f64 {
        return Err(ValidationError::InvalidVehicleCount);
    }
    Ok(value as u32)
}

fn parse_distance(raw: &str) -> Result<f64, ValidationError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidDistance)?;
    if !value.is_finite() || value <= 0.0 || value > MAX_DISTANCE_MILES {
        return Err(ValidationError::InvalidDistance);
    }
    Ok(value)
}

/// Validated quote parameters. `transport_mode` is `Some` iff the service is
/// vehicle relocation.
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteInput {
    pub origin_zip: ZipCode,
    pub destination_zip: ZipCode,
    pub vehicle_count: u32,
    pub distance_miles: f64,
    pub service_type: ServiceType,
    pub transport_mode: Option<TransportMode>,
    pub speed: SpeedTier,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

impl ContactDetails {
    /// Contact info is optional while estimating but mandatory, and
    /// well-formed, once a quote is saved or sent for review.
    pub fn validate_complete(&self) -> Result<(), ValidationError> {
        let name = self.full_name.trim();
        let email = self.email.trim();
        let phone = self.phone.trim();

        if name.is_empty() || email.is_empty() || phone.is_empty() {
            return Err(ValidationError::MissingContact);
        }
        if name.chars().count() < 2 {
            return Err(ValidationError::NameTooShort);
        }
        if !looks_like_email(email) {
            return Err(ValidationError::InvalidEmail);
        }
        if !looks_like_phone(phone) {
            return Err(ValidationError::InvalidPhone);
        }
        Ok(())
    }
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}

fn looks_like_phone(value: &str) -> bool {
    let len = value.chars().count();
    (7..=20).contains(&len)
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '(' | ')' | '-' | ' '))
}
