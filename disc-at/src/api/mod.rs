//! HTTP API handlers for disc-at

pub mod assessments;
pub mod health;
pub mod links;

pub use assessments::{get_answers, get_progress, get_result, get_score, start_test, submit_test};
pub use health::health_routes;
pub use links::create_link;
