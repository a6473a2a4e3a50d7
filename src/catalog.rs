// src/catalog.rs

//! Hand-curated quiz scenarios.
//!
//! The catalog ships inside the binary as `data/scenarios.json` and is parsed
//! once at startup. Each scenario is either a candlestick chart (technical) or
//! a fundamentals snapshot (fundamental), together with the real outcome.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::quiz::{Direction, QuizKind},
};

/// Revision of the bundled scenario set. Bump it whenever `data/scenarios.json` changes.
pub const CATALOG_VERSION: u32 = 1;

const EMBEDDED_CATALOG: &str = include_str!("../data/scenarios.json");

/// One OHLCV candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub dt: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// A single fundamentals metric: either a figure or a qualitative note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric {
    Number(serde_json::Number),
    Text(String),
}

/// Point-in-time financial metrics for a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub metrics: BTreeMap<String, Metric>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub chart_period: String,
    pub prediction_days: u32,
    pub candles: Vec<Candle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundamentalsData {
    pub prediction_days: u32,
    pub snapshot: Snapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioData {
    Chart(ChartData),
    Fundamentals(FundamentalsData),
}

/// A pre-authored quiz case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuizKind,
    pub symbol: String,
    pub stock_name: String,
    pub exchange: String,
    pub period: String,
    pub correct_answer: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub explanation: String,
    pub data: ScenarioData,
}

impl Scenario {
    pub fn prediction_days(&self) -> u32 {
        match &self.data {
            ScenarioData::Chart(chart) => chart.prediction_days,
            ScenarioData::Fundamentals(fundamentals) => fundamentals.prediction_days,
        }
    }

    fn validate(&self) -> Result<(), String> {
        match (&self.kind, &self.data) {
            (QuizKind::Technical, ScenarioData::Chart(chart)) => {
                if chart.candles.is_empty() {
                    return Err(format!("scenario {} has no candles", self.id));
                }
                for candle in &chart.candles {
                    if candle.low > candle.open.min(candle.close)
                        || candle.high < candle.open.max(candle.close)
                    {
                        return Err(format!(
                            "scenario {} has an inconsistent candle on {}",
                            self.id, candle.dt
                        ));
                    }
                }
            }
            (QuizKind::Fundamental, ScenarioData::Fundamentals(_)) => {
                if self.pattern.is_some() {
                    return Err(format!("fundamental scenario {} carries a chart pattern", self.id));
                }
            }
            (kind, _) => {
                return Err(format!(
                    "scenario {} is tagged {} but carries the other data kind",
                    self.id, kind
                ));
            }
        }

        if self.prediction_days() == 0 {
            return Err(format!("scenario {} has a zero prediction horizon", self.id));
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    version: u32,
    scenarios: Vec<Scenario>,
}

/// Validated, immutable scenario set.
#[derive(Debug, Clone)]
pub struct Catalog {
    version: u32,
    scenarios: Vec<Scenario>,
}

impl Catalog {
    /// Parses the catalog compiled into the binary.
    pub fn embedded() -> Result<Self, AppError> {
        let document: CatalogDocument = serde_json::from_str(EMBEDDED_CATALOG).map_err(|e| {
            AppError::InternalServerError(format!("invalid embedded catalog: {}", e))
        })?;
        if document.version != CATALOG_VERSION {
            return Err(AppError::InternalServerError(format!(
                "embedded catalog is version {}, expected {}",
                document.version, CATALOG_VERSION
            )));
        }
        Self::from_scenarios(document.scenarios)
    }

    pub fn from_scenarios(scenarios: Vec<Scenario>) -> Result<Self, AppError> {
        let mut seen = HashSet::new();
        for scenario in &scenarios {
            if !seen.insert(scenario.id.as_str()) {
                return Err(AppError::InternalServerError(format!(
                    "duplicate scenario id {}",
                    scenario.id
                )));
            }
            scenario.validate().map_err(AppError::InternalServerError)?;
        }

        Ok(Self {
            version: CATALOG_VERSION,
            scenarios,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Scenarios of one kind, in catalog order.
    pub fn of_kind(&self, kind: QuizKind) -> Vec<&Scenario> {
        self.scenarios.iter().filter(|s| s.kind == kind).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_loads() {
        let catalog = Catalog::embedded().expect("embedded catalog must parse");

        assert_eq!(catalog.version(), 1);
        assert_eq!(catalog.len(), 20);
        assert_eq!(catalog.of_kind(QuizKind::Technical).len(), 10);
        assert_eq!(catalog.of_kind(QuizKind::Fundamental).len(), 10);
    }

    #[test]
    fn data_kind_follows_type_tag() {
        let catalog = Catalog::embedded().unwrap();

        for scenario in catalog.of_kind(QuizKind::Technical) {
            assert!(matches!(scenario.data, ScenarioData::Chart(_)), "{}", scenario.id);
        }
        for scenario in catalog.of_kind(QuizKind::Fundamental) {
            assert!(
                matches!(scenario.data, ScenarioData::Fundamentals(_)),
                "{}",
                scenario.id
            );
        }
    }

    #[test]
    fn lookup_by_id() {
        let catalog = Catalog::embedded().unwrap();
        let head_and_shoulders = catalog.get("tech_1").unwrap();

        assert_eq!(head_and_shoulders.symbol, "BTC/USD");
        assert_eq!(head_and_shoulders.correct_answer, Direction::Down);
        assert_eq!(head_and_shoulders.pattern.as_deref(), Some("Head and Shoulders"));
        assert_eq!(head_and_shoulders.prediction_days(), 30);

        let coca_cola = catalog.get("fund_10").unwrap();
        match &coca_cola.data {
            ScenarioData::Fundamentals(f) => {
                assert_eq!(f.prediction_days, 365);
                assert_eq!(
                    f.snapshot.metrics.get("brandStatus"),
                    Some(&Metric::Text("Global Dominance".to_string()))
                );
            }
            other => panic!("unexpected data {:?}", other),
        }

        assert!(catalog.get("tech_99").is_none());
    }

    #[test]
    fn rejects_mismatched_kind() {
        let catalog = Catalog::embedded().unwrap();
        let mut broken = catalog.get("fund_1").unwrap().clone();
        broken.kind = QuizKind::Technical;

        assert!(Catalog::from_scenarios(vec![broken]).is_err());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let catalog = Catalog::embedded().unwrap();
        let scenario = catalog.get("tech_2").unwrap().clone();

        assert!(Catalog::from_scenarios(vec![scenario.clone(), scenario]).is_err());
    }
}
