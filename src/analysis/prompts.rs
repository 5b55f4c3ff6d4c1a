//! Prompt templates, one per analysis kind.
//!
//! Each prompt embeds its input and an explicit example of the JSON shape
//! the reply must take.

use super::model::{AnswerSet, HEALTH_DISCLAIMER, InsightsRequest};

/// System instruction shared by all kinds.
pub const SYSTEM_PROMPT: &str = "\
You are a supportive wellness assistant. You never provide medical diagnoses \
or medical advice. Respond with a single JSON object in exactly the requested \
shape and nothing else.";

const WELLNESS_SHAPE: &str = r#"{
  "overallScore": 0,
  "category": "excellent" | "good" | "fair" | "needs-attention",
  "insights": "string",
  "recommendations": ["string"],
  "strengths": ["string"],
  "concerns": ["string"],
  "encouragement": "string"
}"#;

const FOOD_SHAPE: &str = r#"{
  "foodName": "string",
  "confidence": 0.0,
  "nutrition": {
    "calories": 0,
    "protein": 0,
    "carbs": 0,
    "fat": 0,
    "fiber": 0,
    "sugar": 0,
    "sodium": 0
  },
  "healthAnalysis": {
    "rating": "excellent" | "good" | "fair" | "poor",
    "benefits": ["string"],
    "concerns": ["string"],
    "suggestions": ["string"]
  },
  "portionEstimate": "string"
}"#;

const HEALTH_SHAPE: &str = r#"{
  "indicators": [
    {
      "type": "skin" | "eyes" | "posture" | "general",
      "observation": "string",
      "status": "good" | "fair" | "needs-attention",
      "suggestion": "string"
    }
  ],
  "overallAssessment": "string",
  "wellnessTips": ["string"],
  "disclaimer": "string"
}"#;

const INSIGHTS_SHAPE: &str = r#"{
  "trendAnalysis": "string",
  "personalizedTips": ["string"],
  "motivationalMessage": "string",
  "nextSteps": ["string"]
}"#;

/// Prompt for scoring a completed questionnaire.
pub fn wellness_prompt(answers: &AnswerSet) -> String {
    let responses = if answers.is_empty() {
        "(no responses)".to_string()
    } else {
        answers
            .iter()
            .map(|(question, value)| format!("{question}: {value}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "As a mental health AI assistant, analyze these wellness checkup responses and \
         provide personalized insights.\n\n\
         Responses:\n{responses}\n\n\
         Scale answers run 1-5. For \"anxiety\", 1 means not at all anxious; for every other \
         scale question, 5 is the most positive answer.\n\n\
         Please provide:\n\
         1. Overall wellness score (0-100)\n\
         2. Key insights about their mental state\n\
         3. Personalized recommendations (3-5 specific, actionable suggestions)\n\
         4. Areas of strength to celebrate\n\
         5. Areas that need attention\n\n\
         Format as JSON:\n{WELLNESS_SHAPE}\n\n\
         Be supportive, professional, and focus on actionable advice. Never provide medical \
         diagnosis."
    )
}

/// Prompt accompanying a food photo.
pub fn food_prompt() -> String {
    format!(
        "Analyze this food image and provide detailed nutritional information.\n\n\
         Please identify the food items and estimate:\n\
         - Total calories\n\
         - Protein (g)\n\
         - Carbohydrates (g)\n\
         - Fat (g)\n\
         - Fiber (g)\n\
         - Sugar (g)\n\
         - Sodium (mg)\n\
         - Health assessment\n\n\
         All nutrition values must be non-negative numbers. Confidence is between 0 and 1.\n\n\
         Format as JSON:\n{FOOD_SHAPE}"
    )
}

/// Prompt accompanying a selfie/portrait photo.
pub fn health_indicators_prompt() -> String {
    format!(
        "Analyze this selfie/portrait image for general wellness indicators.\n\n\
         Look for visible signs of:\n\
         - Skin health and hydration\n\
         - Eye clarity and fatigue signs\n\
         - Overall energy/vitality appearance\n\
         - Posture (if visible)\n\n\
         Provide general wellness observations (NOT medical diagnosis).\n\n\
         Format as JSON:\n{HEALTH_SHAPE}\n\n\
         Set \"disclaimer\" to \"{HEALTH_DISCLAIMER}\"\n\
         Be supportive and focus on general wellness, never provide medical diagnoses."
    )
}

/// Prompt for trend insights over a user's history.
pub fn insights_prompt(request: &InsightsRequest) -> String {
    let scores = request
        .recent_scores
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let patterns = serde_json::Value::Object(request.patterns.clone()).to_string();
    let goals = if request.goals.is_empty() {
        "(none stated)".to_string()
    } else {
        request.goals.join(", ")
    };

    format!(
        "Analyze this user's mental wellness data and provide personalized insights.\n\n\
         Recent Wellness Scores: {scores}\n\
         Patterns: {patterns}\n\
         Goals: {goals}\n\n\
         Provide insights in JSON format:\n{INSIGHTS_SHAPE}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wellness_prompt_embeds_answers_and_shape() {
        let mut answers = AnswerSet::new();
        answers.insert("mood".into(), "4".into());
        answers.insert("safety".into(), "no".into());

        let prompt = wellness_prompt(&answers);
        assert!(prompt.contains("mood: 4"));
        assert!(prompt.contains("safety: no"));
        assert!(prompt.contains("\"overallScore\""));
        assert!(prompt.contains("needs-attention"));
        assert!(prompt.contains("Never provide medical"));
    }

    #[test]
    fn wellness_prompt_orders_answers_by_question_id() {
        let mut answers = AnswerSet::new();
        answers.insert("stress".into(), "2".into());
        answers.insert("anxiety".into(), "3".into());
        let prompt = wellness_prompt(&answers);
        assert!(prompt.find("anxiety: 3").unwrap() < prompt.find("stress: 2").unwrap());
    }

    #[test]
    fn wellness_prompt_handles_empty_answers() {
        assert!(wellness_prompt(&AnswerSet::new()).contains("(no responses)"));
    }

    #[test]
    fn photo_prompts_describe_shapes() {
        let food = food_prompt();
        assert!(food.contains("\"nutrition\""));
        assert!(food.contains("\"sodium\""));
        assert!(food.contains("\"portionEstimate\""));

        let health = health_indicators_prompt();
        assert!(health.contains("\"indicators\""));
        assert!(health.contains("\"posture\""));
        assert!(health.contains(HEALTH_DISCLAIMER));
    }

    #[test]
    fn insights_prompt_embeds_history() {
        let mut patterns = serde_json::Map::new();
        patterns.insert("sleep".into(), serde_json::json!("improving"));
        let prompt = insights_prompt(&InsightsRequest {
            recent_scores: vec![60, 72, 80],
            patterns,
            goals: vec!["sleep more".into()],
        });
        assert!(prompt.contains("60, 72, 80"));
        assert!(prompt.contains("\"sleep\":\"improving\""));
        assert!(prompt.contains("sleep more"));
        assert!(prompt.contains("\"nextSteps\""));
    }
}
