//! Normalized analysis result types.
//!
//! These are the shapes returned to callers. Every field is always present;
//! sequences are never null. Field names serialize in camelCase to match the
//! JSON shape the providers are asked to produce.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Question id → chosen option value.
pub type AnswerSet = BTreeMap<String, String>;

/// The kinds of analysis the gateway performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    Wellness,
    Food,
    HealthIndicators,
    Insights,
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Wellness => "wellness",
            Self::Food => "food",
            Self::HealthIndicators => "health-indicators",
            Self::Insights => "insights",
        };
        write!(f, "{s}")
    }
}

/// Overall wellness band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WellnessCategory {
    Excellent,
    Good,
    Fair,
    NeedsAttention,
}

impl WellnessCategory {
    /// Band a 0–100 score.
    pub fn from_score(score: u8) -> Self {
        match score {
            85.. => Self::Excellent,
            70..=84 => Self::Good,
            50..=69 => Self::Fair,
            _ => Self::NeedsAttention,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "excellent" => Some(Self::Excellent),
            "good" => Some(Self::Good),
            "fair" => Some(Self::Fair),
            "needs-attention" => Some(Self::NeedsAttention),
            _ => None,
        }
    }
}

/// Result of questionnaire completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellnessAnalysis {
    /// 0–100.
    pub overall_score: u8,
    pub category: WellnessCategory,
    pub insights: String,
    pub recommendations: Vec<String>,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    pub encouragement: String,
}

/// Nutrition estimate. All values are non-negative.
///
/// Macros are in grams, sodium in milligrams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub sodium: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FoodRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl FoodRating {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excellent" => Some(Self::Excellent),
            "good" => Some(Self::Good),
            "fair" => Some(Self::Fair),
            "poor" => Some(Self::Poor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthAnalysis {
    pub rating: FoodRating,
    pub benefits: Vec<String>,
    pub concerns: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Food photo analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodAnalysis {
    pub food_name: String,
    /// Provider's self-reported confidence, 0–1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub nutrition: Nutrition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_analysis: Option<HealthAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portion_estimate: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndicatorType {
    Skin,
    Eyes,
    Posture,
    General,
}

impl IndicatorType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skin" => Some(Self::Skin),
            "eyes" | "eye" => Some(Self::Eyes),
            "posture" => Some(Self::Posture),
            "general" => Some(Self::General),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndicatorStatus {
    Good,
    Fair,
    NeedsAttention,
}

impl IndicatorStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "good" => Some(Self::Good),
            "fair" => Some(Self::Fair),
            "needs-attention" => Some(Self::NeedsAttention),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
    #[serde(rename = "type")]
    pub kind: IndicatorType,
    pub status: IndicatorStatus,
    pub observation: String,
    pub suggestion: String,
}

/// Fixed disclaimer attached to every health-indicator result.
pub const HEALTH_DISCLAIMER: &str =
    "These are general wellness observations, not medical advice.";

/// Selfie/portrait wellness indicator analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthIndicatorAnalysis {
    pub indicators: Vec<Indicator>,
    pub overall_assessment: String,
    pub wellness_tips: Vec<String>,
    pub disclaimer: String,
}

/// Input for personalized insights over a user's history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsRequest {
    pub recent_scores: Vec<u32>,
    #[serde(default)]
    pub patterns: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub goals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedInsights {
    pub trend_analysis: String,
    pub personalized_tips: Vec<String>,
    pub motivational_message: String,
    pub next_steps: Vec<String>,
}
