//! Normalization — coercing loosely-structured provider JSON into the
//! fully-populated result shapes.
//!
//! Every analysis kind implements [`Normalize`]; [`try_parse_or_default`] is
//! the single place where "parse loosely, fall back on any failure" happens.

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ParseError;

use super::fallback;
use super::model::{
    AnalysisKind, FoodAnalysis, FoodRating, HEALTH_DISCLAIMER, HealthAnalysis,
    HealthIndicatorAnalysis, Indicator, IndicatorStatus, IndicatorType, Nutrition,
    PersonalizedInsights, WellnessAnalysis, WellnessCategory,
};
use super::parser::extract_json;

/// Coercion rules for one analysis kind.
pub trait Normalize: Sized + Clone + 'static {
    const KIND: AnalysisKind;

    /// Coerce a parsed object into `Self`, or explain why it cannot be.
    fn normalize(raw: &Map<String, Value>) -> Result<Self, ParseError>;

    /// The fallback catalog entry for this kind.
    fn fallback() -> &'static Self;
}

/// Extract and normalize, reporting the failure reason.
pub fn parse_and_normalize<T: Normalize>(text: &str) -> Result<T, ParseError> {
    let raw = extract_json(text).ok_or(ParseError::NoJsonObject)?;
    T::normalize(&raw)
}

/// Extract and normalize, substituting the fallback entry on any failure.
pub fn try_parse_or_default<T: Normalize>(text: &str) -> T {
    match parse_and_normalize(text) {
        Ok(value) => value,
        Err(e) => {
            warn!(kind = %T::KIND, error = %e, "Unusable provider reply, using fallback");
            T::fallback().clone()
        }
    }
}

// ── Field coercion helpers ─────────────────────────────────────────

/// A numeric field: JSON number or numeric string. Absent/null → `None`.
fn number(raw: &Map<String, Value>, field: &str) -> Result<Option<f64>, ParseError> {
    let value = match raw.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(other) => return Err(ParseError::invalid(field, format!("expected number, got {other}"))),
    };
    match value {
        Some(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(ParseError::invalid(field, "not a finite number")),
    }
}

/// A free-text field. Scalars are stringified; blank strings count as absent.
fn text(raw: &Map<String, Value>, field: &str) -> Result<Option<String>, ParseError> {
    match raw.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(ParseError::invalid(field, "expected text")),
    }
}

/// A string-sequence field. Absent/null → empty, bare string → one item.
fn string_list(raw: &Map<String, Value>, field: &str) -> Result<Vec<String>, ParseError> {
    match raw.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect()),
        Some(_) => Err(ParseError::invalid(field, "expected a list of strings")),
    }
}

/// A nested object field. Absent/null → `None`.
fn object<'a>(
    raw: &'a Map<String, Value>,
    field: &str,
) -> Result<Option<&'a Map<String, Value>>, ParseError> {
    match raw.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(ParseError::invalid(field, "expected an object")),
    }
}

fn clamp_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

fn non_negative(raw: &Map<String, Value>, field: &str) -> Result<f64, ParseError> {
    Ok(number(raw, field)?.unwrap_or(0.0).max(0.0))
}

// ── Per-kind rules ─────────────────────────────────────────────────

impl Normalize for WellnessAnalysis {
    const KIND: AnalysisKind = AnalysisKind::Wellness;

    fn normalize(raw: &Map<String, Value>) -> Result<Self, ParseError> {
        let defaults = Self::fallback();

        let overall_score = number(raw, "overallScore")?
            .map(clamp_score)
            .unwrap_or(defaults.overall_score);
        let category = text(raw, "category")?
            .as_deref()
            .and_then(WellnessCategory::parse)
            .unwrap_or_else(|| WellnessCategory::from_score(overall_score));

        Ok(Self {
            overall_score,
            category,
            insights: text(raw, "insights")?.unwrap_or_else(|| defaults.insights.clone()),
            recommendations: string_list(raw, "recommendations")?,
            strengths: string_list(raw, "strengths")?,
            concerns: string_list(raw, "concerns")?,
            encouragement: text(raw, "encouragement")?
                .unwrap_or_else(|| defaults.encouragement.clone()),
        })
    }

    fn fallback() -> &'static Self {
        fallback::wellness()
    }
}

impl Normalize for FoodAnalysis {
    const KIND: AnalysisKind = AnalysisKind::Food;

    fn normalize(raw: &Map<String, Value>) -> Result<Self, ParseError> {
        let nutrition =
            object(raw, "nutrition")?.ok_or_else(|| ParseError::MissingField("nutrition".into()))?;

        let nutrition = Nutrition {
            calories: non_negative(nutrition, "calories")?,
            protein: non_negative(nutrition, "protein")?,
            carbs: non_negative(nutrition, "carbs")?,
            fat: non_negative(nutrition, "fat")?,
            fiber: non_negative(nutrition, "fiber")?,
            sugar: non_negative(nutrition, "sugar")?,
            sodium: non_negative(nutrition, "sodium")?,
        };

        let health_analysis = match object(raw, "healthAnalysis")? {
            Some(health) => Some(HealthAnalysis {
                rating: text(health, "rating")?
                    .as_deref()
                    .and_then(FoodRating::parse)
                    .unwrap_or(FoodRating::Fair),
                benefits: string_list(health, "benefits")?,
                concerns: string_list(health, "concerns")?,
                suggestions: string_list(health, "suggestions")?,
            }),
            None => None,
        };

        Ok(Self {
            food_name: text(raw, "foodName")?.unwrap_or_else(|| "Unknown food".to_string()),
            confidence: number(raw, "confidence")?.map(|c| c.clamp(0.0, 1.0)),
            nutrition,
            health_analysis,
            portion_estimate: text(raw, "portionEstimate")?,
        })
    }

    fn fallback() -> &'static Self {
        fallback::food()
    }
}

impl Normalize for HealthIndicatorAnalysis {
    const KIND: AnalysisKind = AnalysisKind::HealthIndicators;

    fn normalize(raw: &Map<String, Value>) -> Result<Self, ParseError> {
        let defaults = Self::fallback();

        let items = match raw.get("indicators") {
            Some(Value::Array(items)) => items,
            None | Some(Value::Null) => {
                return Err(ParseError::MissingField("indicators".into()));
            }
            Some(_) => return Err(ParseError::invalid("indicators", "expected a list")),
        };

        let mut indicators = Vec::with_capacity(items.len());
        for item in items {
            let Value::Object(entry) = item else {
                continue;
            };
            indicators.push(Indicator {
                kind: text(entry, "type")?
                    .as_deref()
                    .and_then(IndicatorType::parse)
                    .unwrap_or(IndicatorType::General),
                status: text(entry, "status")?
                    .as_deref()
                    .and_then(IndicatorStatus::parse)
                    .unwrap_or(IndicatorStatus::Fair),
                observation: text(entry, "observation")?.unwrap_or_default(),
                suggestion: text(entry, "suggestion")?.unwrap_or_default(),
            });
        }

        Ok(Self {
            indicators,
            overall_assessment: text(raw, "overallAssessment")?
                .unwrap_or_else(|| defaults.overall_assessment.clone()),
            wellness_tips: string_list(raw, "wellnessTips")?,
            disclaimer: HEALTH_DISCLAIMER.to_string(),
        })
    }

    fn fallback() -> &'static Self {
        fallback::health_indicators()
    }
}

impl Normalize for PersonalizedInsights {
    const KIND: AnalysisKind = AnalysisKind::Insights;

    fn normalize(raw: &Map<String, Value>) -> Result<Self, ParseError> {
        let defaults = Self::fallback();
        Ok(Self {
            trend_analysis: text(raw, "trendAnalysis")?
                .unwrap_or_else(|| defaults.trend_analysis.clone()),
            personalized_tips: string_list(raw, "personalizedTips")?,
            motivational_message: text(raw, "motivationalMessage")?
                .unwrap_or_else(|| defaults.motivational_message.clone()),
            next_steps: string_list(raw, "nextSteps")?,
        })
    }

    fn fallback() -> &'static Self {
        fallback::insights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("test input must be an object"),
        }
    }

    // ── Wellness ────────────────────────────────────────────────────

    #[test]
    fn wellness_partial_reply_defaults_sequences() {
        let analysis: WellnessAnalysis =
            try_parse_or_default(r#"Sure! {"overallScore": 42, "category": "fair"}"#);
        assert_eq!(analysis.overall_score, 42);
        assert_eq!(analysis.category, WellnessCategory::Fair);
        assert!(analysis.recommendations.is_empty());
        assert!(analysis.strengths.is_empty());
        assert!(analysis.concerns.is_empty());
        assert_eq!(analysis.insights, fallback::wellness().insights);
    }

    #[test]
    fn wellness_score_is_clamped_and_rounded() {
        let high = WellnessAnalysis::normalize(&map(serde_json::json!({"overallScore": 140}))).unwrap();
        assert_eq!(high.overall_score, 100);
        let low = WellnessAnalysis::normalize(&map(serde_json::json!({"overallScore": -3}))).unwrap();
        assert_eq!(low.overall_score, 0);
        let frac = WellnessAnalysis::normalize(&map(serde_json::json!({"overallScore": 67.6}))).unwrap();
        assert_eq!(frac.overall_score, 68);
        let text = WellnessAnalysis::normalize(&map(serde_json::json!({"overallScore": " 81 "}))).unwrap();
        assert_eq!(text.overall_score, 81);
    }

    #[test]
    fn wellness_unknown_category_derives_from_score() {
        let analysis = WellnessAnalysis::normalize(&map(serde_json::json!({
            "overallScore": 30,
            "category": "terrible"
        })))
        .unwrap();
        assert_eq!(analysis.category, WellnessCategory::NeedsAttention);
    }

    #[test]
    fn wellness_missing_score_uses_fallback_score() {
        let analysis = WellnessAnalysis::normalize(&map(serde_json::json!({"insights": "ok"}))).unwrap();
        assert_eq!(analysis.overall_score, fallback::wellness().overall_score);
        assert_eq!(analysis.category, WellnessCategory::Good);
        assert_eq!(analysis.insights, "ok");
    }

    #[test]
    fn wellness_non_numeric_score_falls_back() {
        let analysis: WellnessAnalysis = try_parse_or_default(r#"{"overallScore": "high"}"#);
        assert_eq!(&analysis, fallback::wellness());
        let analysis: WellnessAnalysis = try_parse_or_default(r#"{"overallScore": [1]}"#);
        assert_eq!(&analysis, fallback::wellness());
    }

    #[test]
    fn wellness_lists_accept_bare_strings_and_skip_junk() {
        let analysis = WellnessAnalysis::normalize(&map(serde_json::json!({
            "overallScore": 90,
            "recommendations": "Go for a walk",
            "strengths": ["Sleep", null, {"x": 1}, 7, ""],
            "concerns": null
        })))
        .unwrap();
        assert_eq!(analysis.recommendations, vec!["Go for a walk"]);
        assert_eq!(analysis.strengths, vec!["Sleep", "7"]);
        assert!(analysis.concerns.is_empty());
    }

    #[test]
    fn wellness_list_of_wrong_type_falls_back() {
        let err = WellnessAnalysis::normalize(&map(serde_json::json!({"recommendations": 5})))
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidField { .. }));
    }

    #[test]
    fn garbage_text_yields_fallback() {
        let analysis: WellnessAnalysis = try_parse_or_default("I'm sorry, I can't help with that.");
        assert_eq!(&analysis, fallback::wellness());
        assert_eq!(
            parse_and_normalize::<WellnessAnalysis>("nope").unwrap_err(),
            ParseError::NoJsonObject
        );
    }

    // ── Food ────────────────────────────────────────────────────────

    #[test]
    fn food_full_reply() {
        let reply = r#"Here is the analysis:
        {
          "foodName": "Grilled chicken salad",
          "confidence": 0.92,
          "nutrition": {"calories": 420, "protein": "38", "carbs": 12, "fat": 22.5,
                        "fiber": 6, "sugar": 5, "sodium": 610},
          "healthAnalysis": {"rating": "Excellent", "benefits": ["High protein"],
                             "concerns": [], "suggestions": ["Light dressing"]},
          "portionEstimate": "1 large bowl"
        }"#;
        let food: FoodAnalysis = parse_and_normalize(reply).unwrap();
        assert_eq!(food.food_name, "Grilled chicken salad");
        assert_eq!(food.confidence, Some(0.92));
        assert_eq!(food.nutrition.calories, 420.0);
        assert_eq!(food.nutrition.protein, 38.0);
        assert_eq!(food.nutrition.fat, 22.5);
        let health = food.health_analysis.unwrap();
        assert_eq!(health.rating, FoodRating::Excellent);
        assert_eq!(health.suggestions, vec!["Light dressing"]);
        assert_eq!(food.portion_estimate.as_deref(), Some("1 large bowl"));
    }

    #[test]
    fn food_missing_nutrients_default_to_zero_and_negatives_clamp() {
        let food = FoodAnalysis::normalize(&map(serde_json::json!({
            "foodName": "Water",
            "nutrition": {"calories": -5}
        })))
        .unwrap();
        assert_eq!(food.nutrition.calories, 0.0);
        assert_eq!(food.nutrition.sodium, 0.0);
        assert!(food.health_analysis.is_none());
        assert!(food.confidence.is_none());
    }

    #[test]
    fn food_non_numeric_calories_falls_back() {
        let food: FoodAnalysis =
            try_parse_or_default(r#"{"foodName": "Cake", "nutrition": {"calories": "lots"}}"#);
        assert_eq!(&food, fallback::food());
    }

    #[test]
    fn food_without_nutrition_falls_back() {
        let err = parse_and_normalize::<FoodAnalysis>(r#"{"foodName": "Cake"}"#).unwrap_err();
        assert_eq!(err, ParseError::MissingField("nutrition".into()));
    }

    #[test]
    fn food_unknown_rating_becomes_fair_and_confidence_clamps() {
        let food = FoodAnalysis::normalize(&map(serde_json::json!({
            "confidence": 3,
            "nutrition": {},
            "healthAnalysis": {"rating": "superb"}
        })))
        .unwrap();
        assert_eq!(food.food_name, "Unknown food");
        assert_eq!(food.confidence, Some(1.0));
        let health = food.health_analysis.unwrap();
        assert_eq!(health.rating, FoodRating::Fair);
        assert!(health.benefits.is_empty());
    }

    // ── Health indicators ───────────────────────────────────────────

    #[test]
    fn health_indicators_normalized() {
        let reply = r#"{"indicators": [
            {"type": "eyes", "status": "needs-attention", "observation": "Dark circles", "suggestion": "Rest"},
            {"type": "aura", "status": "glowing"},
            "not an object"
        ], "wellnessTips": ["Drink water"], "disclaimer": "whatever"}"#;
        let analysis: HealthIndicatorAnalysis = parse_and_normalize(reply).unwrap();
        assert_eq!(analysis.indicators.len(), 2);
        assert_eq!(analysis.indicators[0].kind, IndicatorType::Eyes);
        assert_eq!(analysis.indicators[0].status, IndicatorStatus::NeedsAttention);
        assert_eq!(analysis.indicators[1].kind, IndicatorType::General);
        assert_eq!(analysis.indicators[1].status, IndicatorStatus::Fair);
        assert_eq!(analysis.indicators[1].observation, "");
        assert_eq!(analysis.wellness_tips, vec!["Drink water"]);
        assert_eq!(analysis.disclaimer, HEALTH_DISCLAIMER);
    }

    #[test]
    fn health_without_indicator_list_falls_back() {
        let analysis: HealthIndicatorAnalysis =
            try_parse_or_default(r#"{"indicators": "skin looks fine"}"#);
        assert_eq!(&analysis, fallback::health_indicators());
        let analysis: HealthIndicatorAnalysis = try_parse_or_default(r#"{"overallAssessment": "ok"}"#);
        assert_eq!(&analysis, fallback::health_indicators());
    }

    // ── Insights ────────────────────────────────────────────────────

    #[test]
    fn insights_partial_reply() {
        let insights: PersonalizedInsights =
            parse_and_normalize(r#"{"trendAnalysis": "Improving", "nextSteps": ["Journal"]}"#).unwrap();
        assert_eq!(insights.trend_analysis, "Improving");
        assert!(insights.personalized_tips.is_empty());
        assert_eq!(insights.next_steps, vec!["Journal"]);
        assert_eq!(
            insights.motivational_message,
            fallback::insights().motivational_message
        );
    }

    // ── Generic use ─────────────────────────────────────────────────

    /// Parse on a spawned task, the way callers hand replies across tasks.
    async fn parse_detached<T: Normalize + Send>(text: &'static str) -> T {
        tokio::spawn(async move { try_parse_or_default::<T>(text) })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn every_kind_parses_on_a_detached_task() {
        let wellness: WellnessAnalysis = parse_detached(r#"{"overallScore": 71}"#).await;
        assert_eq!(wellness.overall_score, 71);

        let food: FoodAnalysis = parse_detached("no json here").await;
        assert_eq!(&food, fallback::food());

        let indicators: HealthIndicatorAnalysis = parse_detached("").await;
        assert_eq!(&indicators, fallback::health_indicators());

        let insights: PersonalizedInsights = parse_detached(r#"{"trendAnalysis": "Flat"}"#).await;
        assert_eq!(insights.trend_analysis, "Flat");
    }
}
