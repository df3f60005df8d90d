use std::collections::BTreeMap;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Object location in xyxy pixel coordinates, as emitted by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// One object instance identified by the detector.
///
/// Labels are opaque strings from the detector's fixed vocabulary. They are
/// never normalized or case-folded; calorie table keys must match exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// A calorie amount that may not be available.
///
/// Table entries hold kcal per 100g; summary entries hold the estimated
/// total for a label. Serializes as a plain number or the string "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalorieValue {
    Known(u32),
    Unknown,
}

impl Serialize for CalorieValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            CalorieValue::Known(kcal) => serializer.serialize_u32(*kcal),
            CalorieValue::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for CalorieValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Marker(String),
        }

        // Any string is treated as the "value not available" marker; the
        // shipped table uses "---".
        match Raw::deserialize(deserializer)? {
            Raw::Number(kcal) => Ok(CalorieValue::Known(kcal)),
            Raw::Marker(_) => Ok(CalorieValue::Unknown),
        }
    }
}

/// Aggregated result for a single analyzed image.
///
/// Built fresh per request and discarded with the response. BTreeMap keeps
/// the serialized output deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    #[serde(rename = "detected_counts")]
    pub counts: BTreeMap<String, u32>,
    #[serde(rename = "estimated_calories")]
    pub calories: BTreeMap<String, CalorieValue>,
    pub total_calories: u32,
}

impl DetectionSummary {
    pub fn empty() -> Self {
        Self {
            counts: BTreeMap::new(),
            calories: BTreeMap::new(),
            total_calories: 0,
        }
    }
}
