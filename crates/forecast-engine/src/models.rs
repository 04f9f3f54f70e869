use analysis_core::ForecastResult;
use serde::{Deserialize, Serialize};

/// Terminal-price percentiles across simulated paths
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePercentiles {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

/// Outcome probabilities as percentages of simulated paths
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub profit: f64,
    pub up_50_percent: f64,
    pub double: f64,
    pub down_50_percent: f64,
}

/// Equal-width histogram of terminal prices; `bins` holds the bin edges
/// (one more entry than `counts`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistogram {
    pub bins: Vec<f64>,
    pub counts: Vec<u32>,
}

/// Aggregated Monte Carlo simulation result.
///
/// `error` is set (and the distribution fields absent) when the model
/// precondition is unmet; callers must branch on it before reading
/// `percentiles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloOutcome {
    pub method: String,
    pub current_price: f64,
    pub years: u32,
    pub simulations: u32,
    /// Annualized drift assumption, percent
    pub expected_return: f64,
    /// Annualized volatility assumption, percent
    pub volatility: f64,
    pub percentiles: Option<PricePercentiles>,
    pub median_target: Option<f64>,
    pub median_upside: Option<f64>,
    pub probabilities: Option<OutcomeProbabilities>,
    pub histogram: Option<PriceHistogram>,
    pub error: Option<String>,
}

impl MonteCarloOutcome {
    pub fn failure(current_price: f64, years: u32, error: &str) -> Self {
        Self {
            method: "Monte Carlo Simulation".to_string(),
            current_price,
            years,
            simulations: 0,
            expected_return: 0.0,
            volatility: 0.0,
            percentiles: None,
            median_target: None,
            median_upside: None,
            probabilities: None,
            histogram: None,
            error: Some(error.to_string()),
        }
    }
}

/// A single bear/base/bull case
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioCase {
    pub target_price: f64,
    pub upside_percent: f64,
    /// Assumed annual growth, percent
    pub growth_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_pe: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_ps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_eps: Option<f64>,
}

/// Bear/base/bull scenario set from one methodology
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioAnalysis {
    pub method: String,
    pub current_price: f64,
    pub years: u32,
    pub bear: ScenarioCase,
    pub base: ScenarioCase,
    pub bull: ScenarioCase,
}

/// Results of every forecasting model with default parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSuite {
    pub ticker: String,
    pub company_name: Option<String>,
    pub current_price: f64,
    pub earnings_model: ForecastResult,
    pub revenue_model: ForecastResult,
    pub dcf_model: ForecastResult,
    pub monte_carlo: MonteCarloOutcome,
    pub scenarios: ScenarioAnalysis,
}
