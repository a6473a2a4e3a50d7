// src/models/quiz.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Candle, Scenario, ScenarioData, Snapshot};

/// Kind of quiz: chart reading or fundamentals reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizKind {
    Technical,
    Fundamental,
}

impl QuizKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QuizKind::Technical => "technical",
            QuizKind::Fundamental => "fundamental",
        }
    }

    /// Lenient parse used for the `type` query parameter.
    /// Anything other than an exact kind name falls back to technical.
    pub fn from_query(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok())
            .unwrap_or(QuizKind::Technical)
    }
}

impl fmt::Display for QuizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuizKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "technical" => Ok(QuizKind::Technical),
            "fundamental" => Ok(QuizKind::Fundamental),
            other => Err(format!("unknown quiz type '{}'", other)),
        }
    }
}

/// Predicted or actual price direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

/// A stored quiz. The payload is the full catalog scenario, explanation included.
#[derive(Debug, Clone)]
pub struct Quiz {
    pub id: Uuid,
    pub kind: QuizKind,
    pub symbol: String,
    pub correct_answer: Direction,
    pub payload: Scenario,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for the `quizzes` table.
#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub kind: QuizKind,
    pub symbol: String,
    pub correct_answer: Direction,
    pub payload: Scenario,
}

impl From<&Scenario> for NewQuiz {
    fn from(scenario: &Scenario) -> Self {
        Self {
            kind: scenario.kind,
            symbol: scenario.symbol.clone(),
            correct_answer: scenario.correct_answer,
            payload: scenario.clone(),
        }
    }
}

/// Query string for `GET /api/quiz`.
#[derive(Debug, Default, Deserialize)]
pub struct QuizParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Quiz as sent to the client. Carries neither the correct answer nor the explanation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: QuizKind,
    pub symbol: String,
    pub payload: QuizPayloadView,
    pub horizon_days: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizPayloadView {
    pub symbol: String,
    pub stock_name: String,
    pub period: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candles: Option<Vec<Candle>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,
    pub prediction_days: u32,
}

impl From<&Quiz> for QuizResponse {
    fn from(quiz: &Quiz) -> Self {
        let scenario = &quiz.payload;
        let (chart_period, candles, snapshot) = match &scenario.data {
            ScenarioData::Chart(chart) => (
                Some(chart.chart_period.clone()),
                Some(chart.candles.clone()),
                None,
            ),
            ScenarioData::Fundamentals(fundamentals) => {
                (None, None, Some(fundamentals.snapshot.clone()))
            }
        };

        Self {
            id: quiz.id,
            kind: quiz.kind,
            symbol: quiz.symbol.clone(),
            payload: QuizPayloadView {
                symbol: scenario.symbol.clone(),
                stock_name: scenario.stock_name.clone(),
                period: scenario.period.clone(),
                pattern: scenario.pattern.clone(),
                chart_period,
                candles,
                snapshot,
                prediction_days: scenario.prediction_days(),
            },
            horizon_days: scenario.prediction_days(),
        }
    }
}

/// Body of `POST /api/quiz/{id}/answer`.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: Direction,
}

/// Synthetic market move reported back after an answer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualOutcome {
    pub percent_change: f64,
    pub direction: Direction,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResult {
    pub correct: bool,
    pub explanation: String,
    pub actual_outcome: ActualOutcome,
    pub score: i64,
}
