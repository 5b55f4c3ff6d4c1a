//! AI analysis gateway — turns questionnaire answers and photos into
//! bounded-shape insight objects, tolerating unreliable provider output.

pub mod fallback;
pub mod gateway;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod prompts;
pub mod routes;

pub use gateway::{AnalysisGateway, GatewayConfig};
pub use model::{
    AnalysisKind, AnswerSet, FoodAnalysis, HealthIndicatorAnalysis, InsightsRequest,
    PersonalizedInsights, WellnessAnalysis, WellnessCategory,
};
pub use normalize::{Normalize, try_parse_or_default};
pub use parser::extract_json;
pub use routes::{AnalysisRouteState, analysis_routes};
