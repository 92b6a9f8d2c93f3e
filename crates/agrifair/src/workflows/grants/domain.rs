use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier wrapper for grant applicants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FarmerId(pub String);

impl fmt::Display for FarmerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const UNKNOWN_FARMER: &str = "Unknown";

/// Self-reported harvest tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CropYield {
    High,
    #[default]
    Average,
    Low,
}

impl CropYield {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "high" => Some(Self::High),
            "average" => Some(Self::Average),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    None,
    Primary,
    Secondary,
    HigherSecondary,
    Bachelor,
}

impl EducationLevel {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "primary" => Some(Self::Primary),
            "secondary" => Some(Self::Secondary),
            "higher_secondary" => Some(Self::HigherSecondary),
            "bachelor" => Some(Self::Bachelor),
            _ => None,
        }
    }
}

/// Social category collected for inclusive-development weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SocialCategory {
    #[default]
    General,
    Dalit,
    Janajati,
    Madhesi,
    Other,
}

impl SocialCategory {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "general" => Some(Self::General),
            "dalit" => Some(Self::Dalit),
            "janajati" => Some(Self::Janajati),
            "madhesi" => Some(Self::Madhesi),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub const fn is_marginalized(self) -> bool {
        matches!(self, Self::Dalit | Self::Janajati | Self::Madhesi)
    }
}

/// Typed grant application as consumed by the scoring engine.
///
/// Built from a flat key/value mapping with [`ApplicantRecord::from_fields`]: unknown keys are
/// ignored, missing numbers default to zero, missing flags to `false` and missing categories
/// to their neutral value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct ApplicantRecord {
    pub farmer_id: FarmerId,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ward: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_crops: Option<String>,
    pub monthly_income: f64,
    pub land_size_bigha: f64,
    pub previous_grants: u32,
    pub crop_yield: CropYield,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education_level: Option<EducationLevel>,
    pub family_size: u32,
    pub age: u32,
    pub farming_experience_years: u32,
    pub credit_score: u32,
    pub market_distance_km: f64,
    pub has_irrigation: bool,
    pub uses_modern_technology: bool,
    pub social_category: SocialCategory,
    pub has_disability: bool,
}

impl ApplicantRecord {
    /// Record with every optional field at its documented default.
    pub fn new(farmer_id: impl Into<String>) -> Self {
        Self {
            farmer_id: FarmerId(farmer_id.into()),
            full_name: String::new(),
            phone: None,
            email: None,
            address: None,
            municipality: None,
            ward: None,
            current_crops: None,
            monthly_income: 0.0,
            land_size_bigha: 0.0,
            previous_grants: 0,
            crop_yield: CropYield::default(),
            education_level: None,
            family_size: 0,
            age: 0,
            farming_experience_years: 0,
            credit_score: 0,
            market_distance_km: 0.0,
            has_irrigation: false,
            uses_modern_technology: false,
            social_category: SocialCategory::default(),
            has_disability: false,
        }
    }

    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ScoringError> {
        let fields = Fields(fields);

        let farmer_id = fields
            .text("farmer_id")
            .unwrap_or_else(|| UNKNOWN_FARMER.to_string());
        let full_name = fields
            .text("full_name")
            .or_else(|| fields.text("farmer_name"))
            .unwrap_or_default();

        let ward = match fields.get("ward") {
            None | Some(Value::Null) => None,
            Some(_) => Some(fields.count("ward")?),
        };

        Ok(Self {
            farmer_id: FarmerId(farmer_id),
            full_name,
            phone: fields.text("phone"),
            email: fields.text("email"),
            address: fields.text("address"),
            municipality: fields.text("municipality"),
            ward,
            current_crops: fields.text("current_crops"),
            monthly_income: fields.number("monthly_income")?,
            land_size_bigha: fields.number("land_size_bigha")?,
            previous_grants: fields.count("previous_grants")?,
            crop_yield: fields
                .category("crop_yield", CropYield::parse)?
                .unwrap_or_default(),
            education_level: fields.category("education_level", EducationLevel::parse)?,
            family_size: fields.count("family_size")?,
            age: fields.count("age")?,
            farming_experience_years: fields.count("farming_experience_years")?,
            credit_score: fields.count("credit_score")?,
            market_distance_km: fields.number("market_distance_km")?,
            has_irrigation: fields.flag("has_irrigation")?,
            uses_modern_technology: fields.flag("uses_modern_technology")?,
            social_category: fields
                .category("social_category", SocialCategory::parse)?
                .unwrap_or_default(),
            has_disability: fields.flag("has_disability")?,
        })
    }
}

impl TryFrom<Value> for ApplicantRecord {
    type Error = ScoringError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Self::from_fields(&fields),
            other => Err(ScoringError::MalformedField {
                field: "applicant",
                expected: "an object",
                raw: other.to_string(),
            }),
        }
    }
}

/// Upstream model outputs supplied inline next to an applicant's own fields.
///
/// Unlike applicant numerics these are signed and stay `None` when absent, so the caller can
/// tell "not supplied" apart from zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InlineSignals {
    pub approval_probability: Option<f64>,
    pub anomaly_score: Option<f64>,
    pub is_anomaly: Option<bool>,
}

impl InlineSignals {
    /// Reads only `approval_probability`; detector keys are left untouched.
    pub fn for_prediction(fields: &Map<String, Value>) -> Result<Self, ScoringError> {
        Ok(Self {
            approval_probability: Fields(fields).signal("approval_probability")?,
            ..Self::default()
        })
    }

    /// Reads only `anomaly_score` and `is_anomaly`.
    pub fn for_screening(fields: &Map<String, Value>) -> Result<Self, ScoringError> {
        let fields = Fields(fields);
        let is_anomaly = match fields.get("is_anomaly") {
            None | Some(Value::Null) => None,
            Some(_) => Some(fields.flag("is_anomaly")?),
        };

        Ok(Self {
            approval_probability: None,
            anomaly_score: fields.signal("anomaly_score")?,
            is_anomaly,
        })
    }
}

struct Fields<'a>(&'a Map<String, Value>);

impl Fields<'_> {
    fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(raw) if raw.trim().is_empty() => None,
            Value::String(raw) => Some(raw.trim().to_string()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    fn number(&self, field: &'static str) -> Result<f64, ScoringError> {
        let parsed = match self.get(field) {
            None | Some(Value::Null) => return Ok(0.0),
            Some(Value::Number(number)) => number.as_f64(),
            Some(Value::String(raw)) if raw.trim().is_empty() => return Ok(0.0),
            Some(Value::String(raw)) => raw.trim().parse::<f64>().ok(),
            Some(_) => None,
        };

        let value = parsed.ok_or_else(|| malformed(field, "a number", self.get(field)))?;
        if value.is_nan() {
            return Ok(0.0);
        }
        if value.is_infinite() {
            return Err(malformed(field, "a finite number", self.get(field)));
        }
        if value < 0.0 {
            return Err(ScoringError::NegativeField { field, value });
        }
        Ok(value)
    }

    fn signal(&self, field: &'static str) -> Result<Option<f64>, ScoringError> {
        let parsed = match self.get(field) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Number(number)) => number.as_f64(),
            Some(Value::String(raw)) if raw.trim().is_empty() => return Ok(None),
            Some(Value::String(raw)) => raw.trim().parse::<f64>().ok(),
            Some(_) => None,
        };

        parsed
            .map(Some)
            .ok_or_else(|| malformed(field, "a number", self.get(field)))
    }

    fn count(&self, field: &'static str) -> Result<u32, ScoringError> {
        let value = self.number(field)?;
        if value.fract() != 0.0 || value > f64::from(u32::MAX) {
            return Err(malformed(field, "a whole count", self.get(field)));
        }
        Ok(value as u32)
    }

    fn flag(&self, field: &'static str) -> Result<bool, ScoringError> {
        match self.get(field) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(Value::Number(number)) if number.as_f64() == Some(0.0) => Ok(false),
            Some(Value::Number(number)) if number.as_f64() == Some(1.0) => Ok(true),
            Some(Value::String(raw)) => match raw.trim().to_ascii_lowercase().as_str() {
                "" | "false" | "0" | "no" => Ok(false),
                "true" | "1" | "yes" => Ok(true),
                _ => Err(malformed(field, "a boolean", self.get(field))),
            },
            Some(_) => Err(malformed(field, "a boolean", self.get(field))),
        }
    }

    fn category<T>(
        &self,
        field: &'static str,
        parse: fn(&str) -> Option<T>,
    ) -> Result<Option<T>, ScoringError> {
        let raw = match self.get(field) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(raw)) => raw.trim().to_ascii_lowercase(),
            Some(_) => return Err(malformed(field, "a category name", self.get(field))),
        };
        if raw.is_empty() {
            return Ok(None);
        }
        parse(&raw)
            .map(Some)
            .ok_or_else(|| malformed(field, "a known category", self.get(field)))
    }
}

fn malformed(field: &'static str, expected: &'static str, raw: Option<&Value>) -> ScoringError {
    ScoringError::MalformedField {
        field,
        expected,
        raw: raw.map(Value::to_string).unwrap_or_default(),
    }
}

/// Invalid-input conditions raised by the scoring core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("approval probability {value} is outside [0, 1]")]
    ProbabilityOutOfRange { value: f64 },
    #[error("field `{field}` must be {expected}, found {raw}")]
    MalformedField {
        field: &'static str,
        expected: &'static str,
        raw: String,
    },
    #[error("field `{field}` must not be negative, found {value}")]
    NegativeField { field: &'static str, value: f64 },
    #[error("anomaly score must be a number, found NaN")]
    NonFiniteSignal,
    #[error("cannot aggregate an empty batch")]
    EmptyBatch,
}

impl ScoringError {
    /// Input field or condition responsible for the rejection.
    pub fn field(&self) -> &'static str {
        match self {
            ScoringError::ProbabilityOutOfRange { .. } => "approval_probability",
            ScoringError::MalformedField { field, .. }
            | ScoringError::NegativeField { field, .. } => field,
            ScoringError::NonFiniteSignal => "anomaly_score",
            ScoringError::EmptyBatch => "batch",
        }
    }
}

/// Binary outcome reported alongside the approval probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictedStatus {
    Approved,
    Pending,
}

impl PredictedStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PredictedStatus::Approved => "approved",
            PredictedStatus::Pending => "pending",
        }
    }
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
