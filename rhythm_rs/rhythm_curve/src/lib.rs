//! Cycle energy curve generation from quiz answers.
//!
//! The core is two pure stages: [`resolve`] turns categorical answers into
//! numeric parameters and [`build`] turns those into a sampled Bézier curve
//! with per-day energies. [`generate_chart_data`] runs both. The
//! [`submission`] module holds the relay used to forward a completed quiz.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod answers;
pub mod bezier;
pub mod chart;
pub mod questions;
pub mod resolve;
pub mod submission;

pub use answers::{AnswerField, QuizAnswers};
pub use bezier::BezierPoint;
pub use chart::{build, energy_label, ChartData, Phase, Phases};
pub use questions::{question_for, quiz_questions, QuizOption, QuizQuestion};
pub use resolve::{resolve, Fuzziness, ResolvedParameters};
pub use submission::{
    Dispatch, JsonFileStore, MemoryStore, RelayOutcome, Submission, SubmissionRelay,
    SubmissionStore,
};

#[derive(Error, Debug)]
pub enum RhythmError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

/// A day of the cycle and its energy on the 1–5 scale.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct CurvePoint {
    pub day: u32,
    pub energy: f64,
}

/// Resolve the answers and build the chart in one step.
pub fn generate_chart_data(answers: &QuizAnswers) -> ChartData {
    build(&resolve(answers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_cycle_scenario() {
        let answers = QuizAnswers {
            cycle_length: "28to32days".into(),
            period_length: "3-5days".into(),
            peak_energy: "afterPeriod".into(),
            lowest_energy: "prePeriod".into(),
            condition: "none".into(),
            ..QuizAnswers::default()
        };
        let chart = generate_chart_data(&answers);
        assert_eq!(chart.cycle_length, 30);
        assert_eq!(chart.period_end_day, 5);
        assert_eq!(chart.peak_day, 7);
        assert_eq!(chart.lowest_day, 25);
        assert_eq!(chart.condition_message, None);
        assert!(!chart.fuzziness.overall);
        assert_eq!(chart.points.len(), 30);
        assert_eq!(chart.energy_on(7), Some(5.0));
        assert_eq!(chart.peak_message, "I am at the top of the world!");
        assert_eq!(chart.low_message, "Why am I feeling so low!");
    }

    #[test]
    fn unknown_cycle_scenario() {
        let answers = QuizAnswers {
            cycle_length: "unknown".into(),
            ..QuizAnswers::default()
        };
        let chart = generate_chart_data(&answers);
        assert_eq!(chart.cycle_length, 28);
        assert_eq!(chart.display_cycle_length_label, "~28 days*");
        assert!(chart.fuzziness.x_axis);
    }

    #[test]
    fn chart_json_uses_camel_case() {
        let chart = generate_chart_data(&QuizAnswers::default());
        let json = serde_json::to_value(&chart).unwrap();
        assert!(json.get("bezierPoints").is_some());
        assert!(json.get("displayCycleLengthLabel").is_some());
        assert_eq!(json["fuzziness"]["xAxis"], true);
        assert!(json["conditionMessage"].is_null());
    }
}
