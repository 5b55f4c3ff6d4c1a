//! Fallback catalog — one pre-built, shape-valid result per analysis kind.
//!
//! Substituted verbatim whenever a provider call fails or its reply cannot be
//! normalized. Read-only and shared across all sessions.

use std::sync::LazyLock;

use super::model::{
    FoodAnalysis, FoodRating, HEALTH_DISCLAIMER, HealthAnalysis, HealthIndicatorAnalysis,
    Indicator, IndicatorStatus, IndicatorType, Nutrition, PersonalizedInsights, WellnessAnalysis,
    WellnessCategory,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

static WELLNESS: LazyLock<WellnessAnalysis> = LazyLock::new(|| WellnessAnalysis {
    overall_score: 75,
    category: WellnessCategory::Good,
    insights: "Taking regular wellness checkups shows great self-awareness and commitment to \
               your mental health."
        .to_string(),
    recommendations: strings(&[
        "Continue with regular self-check-ins",
        "Consider mindfulness practices",
        "Maintain healthy sleep habits",
    ]),
    strengths: strings(&["Self-awareness", "Proactive wellness approach"]),
    concerns: strings(&["Monitor stress levels"]),
    encouragement: "You're taking positive steps for your mental wellness!".to_string(),
});

static FOOD: LazyLock<FoodAnalysis> = LazyLock::new(|| FoodAnalysis {
    food_name: "Mixed meal".to_string(),
    confidence: Some(0.7),
    nutrition: Nutrition {
        calories: 350.0,
        protein: 25.0,
        carbs: 30.0,
        fat: 15.0,
        fiber: 5.0,
        sugar: 8.0,
        sodium: 400.0,
    },
    health_analysis: Some(HealthAnalysis {
        rating: FoodRating::Good,
        benefits: strings(&["Balanced macronutrients", "Good protein content"]),
        concerns: strings(&["Monitor sodium intake"]),
        suggestions: strings(&["Add more vegetables", "Consider whole grains"]),
    }),
    portion_estimate: Some("1 standard serving".to_string()),
});

static HEALTH_INDICATORS: LazyLock<HealthIndicatorAnalysis> =
    LazyLock::new(|| HealthIndicatorAnalysis {
        indicators: vec![Indicator {
            kind: IndicatorType::General,
            status: IndicatorStatus::Good,
            observation: "General wellness assessment completed".to_string(),
            suggestion: "Continue maintaining healthy lifestyle habits".to_string(),
        }],
        overall_assessment: "You appear to be taking good care of yourself!".to_string(),
        wellness_tips: strings(&[
            "Stay hydrated throughout the day",
            "Ensure adequate sleep (7-9 hours)",
            "Take regular breaks from screens",
        ]),
        disclaimer: HEALTH_DISCLAIMER.to_string(),
    });

static INSIGHTS: LazyLock<PersonalizedInsights> = LazyLock::new(|| PersonalizedInsights {
    trend_analysis: "Your wellness journey shows positive engagement with self-care practices."
        .to_string(),
    personalized_tips: strings(&[
        "Continue your current wellness routine",
        "Set small, achievable daily goals",
    ]),
    motivational_message: "Every small step counts in your mental wellness journey!".to_string(),
    next_steps: strings(&[
        "Keep tracking your progress",
        "Consider new wellness activities",
    ]),
});

pub fn wellness() -> &'static WellnessAnalysis {
    &WELLNESS
}

pub fn food() -> &'static FoodAnalysis {
    &FOOD
}

pub fn health_indicators() -> &'static HealthIndicatorAnalysis {
    &HEALTH_INDICATORS
}

pub fn insights() -> &'static PersonalizedInsights {
    &INSIGHTS
}
