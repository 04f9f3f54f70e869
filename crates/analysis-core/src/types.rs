use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reporting cadence of a financial statement row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Quarterly,
    Annual,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Quarterly => "quarterly",
            PeriodType::Annual => "annual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "quarterly" => Some(PeriodType::Quarterly),
            "annual" => Some(PeriodType::Annual),
            _ => None,
        }
    }
}

/// One reporting period for one ticker.
///
/// Unique per (ticker, period_end_date, period_type); refreshed via upsert.
/// Zero values are treated as missing by the growth math to avoid division
/// artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub ticker: String,
    pub period_end_date: NaiveDate,
    pub period_type: PeriodType,
    pub revenue: Option<f64>,
    pub earnings: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_income: Option<f64>,
    pub ebitda: Option<f64>,
    pub net_income: Option<f64>,
    pub eps: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub operating_cash_flow: Option<f64>,
    pub capital_expenditures: Option<f64>,
    pub free_cash_flow_calculated: Option<f64>,
    pub gross_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub profit_margin_quarterly: Option<f64>,
}

impl FinancialRecord {
    /// Empty record for a period; callers fill in whichever statement
    /// fields the provider reported.
    pub fn new(ticker: &str, period_end_date: NaiveDate, period_type: PeriodType) -> Self {
        Self {
            ticker: ticker.to_string(),
            period_end_date,
            period_type,
            revenue: None,
            earnings: None,
            gross_profit: None,
            operating_income: None,
            ebitda: None,
            net_income: None,
            eps: None,
            shares_outstanding: None,
            operating_cash_flow: None,
            capital_expenditures: None,
            free_cash_flow_calculated: None,
            gross_margin: None,
            operating_margin: None,
            profit_margin_quarterly: None,
        }
    }
}

/// Selector for the numeric columns growth calculations run over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialMetric {
    Revenue,
    Earnings,
    GrossProfit,
    OperatingIncome,
    Ebitda,
    NetIncome,
    Eps,
    OperatingCashFlow,
    FreeCashFlow,
}

impl FinancialMetric {
    pub fn value_in(&self, record: &FinancialRecord) -> Option<f64> {
        match self {
            FinancialMetric::Revenue => record.revenue,
            FinancialMetric::Earnings => record.earnings,
            FinancialMetric::GrossProfit => record.gross_profit,
            FinancialMetric::OperatingIncome => record.operating_income,
            FinancialMetric::Ebitda => record.ebitda,
            FinancialMetric::NetIncome => record.net_income,
            FinancialMetric::Eps => record.eps,
            FinancialMetric::OperatingCashFlow => record.operating_cash_flow,
            FinancialMetric::FreeCashFlow => record.free_cash_flow_calculated,
        }
    }

    pub fn column_name(&self) -> &'static str {
        match self {
            FinancialMetric::Revenue => "revenue",
            FinancialMetric::Earnings => "earnings",
            FinancialMetric::GrossProfit => "gross_profit",
            FinancialMetric::OperatingIncome => "operating_income",
            FinancialMetric::Ebitda => "ebitda",
            FinancialMetric::NetIncome => "net_income",
            FinancialMetric::Eps => "eps",
            FinancialMetric::OperatingCashFlow => "operating_cash_flow",
            FinancialMetric::FreeCashFlow => "free_cash_flow_calculated",
        }
    }
}

/// Direction of the recent profit-margin trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginTrend {
    Expanding,
    Contracting,
    Stable,
}

impl MarginTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarginTrend::Expanding => "expanding",
            MarginTrend::Contracting => "contracting",
            MarginTrend::Stable => "stable",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "expanding" => Some(MarginTrend::Expanding),
            "contracting" => Some(MarginTrend::Contracting),
            "stable" => Some(MarginTrend::Stable),
            _ => None,
        }
    }
}

/// Lifecycle bucket derived from CAGR, margin, and acceleration signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    EarlyGrowth,
    RapidGrowth,
    MatureGrowth,
    Inflection,
    Declining,
    Stable,
}

impl GrowthStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthStage::EarlyGrowth => "early_growth",
            GrowthStage::RapidGrowth => "rapid_growth",
            GrowthStage::MatureGrowth => "mature_growth",
            GrowthStage::Inflection => "inflection",
            GrowthStage::Declining => "declining",
            GrowthStage::Stable => "stable",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "early_growth" => Some(GrowthStage::EarlyGrowth),
            "rapid_growth" => Some(GrowthStage::RapidGrowth),
            "mature_growth" => Some(GrowthStage::MatureGrowth),
            "inflection" => Some(GrowthStage::Inflection),
            "declining" => Some(GrowthStage::Declining),
            "stable" => Some(GrowthStage::Stable),
            _ => None,
        }
    }

    /// Human-readable label for screens
    pub fn to_label(&self) -> &'static str {
        match self {
            GrowthStage::EarlyGrowth => "Early Growth",
            GrowthStage::RapidGrowth => "Rapid Growth",
            GrowthStage::MatureGrowth => "Mature Growth",
            GrowthStage::Inflection => "Inflection",
            GrowthStage::Declining => "Declining",
            GrowthStage::Stable => "Stable",
        }
    }
}

/// Computed growth snapshot for one ticker, recomputed wholesale on refresh.
///
/// A `None` field means the metric's statistical preconditions were not met;
/// it is a value, not a fault.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrowthMetrics {
    pub ticker: String,

    // CAGR metrics
    pub revenue_cagr_3y: Option<f64>,
    pub revenue_cagr_5y: Option<f64>,
    pub earnings_cagr_3y: Option<f64>,
    pub earnings_cagr_5y: Option<f64>,

    // Quarterly averages
    pub avg_quarterly_revenue_growth: Option<f64>,
    pub avg_quarterly_earnings_growth: Option<f64>,

    // Consistency scores (0-100)
    pub revenue_consistency_score: f64,
    pub earnings_consistency_score: f64,

    // Trend flags
    pub revenue_growth_accelerating: bool,
    pub earnings_growth_accelerating: bool,
    pub consecutive_profitable_quarters: u32,

    // PEG variants
    pub peg_3y_cagr: Option<f64>,
    pub peg_quarterly: Option<f64>,
    pub peg_external: Option<f64>,
    pub peg_average: Option<f64>,

    // Free cash flow
    pub fcf_cagr_3y: Option<f64>,
    pub fcf_margin: Option<f64>,
    pub cash_conversion_ratio: Option<f64>,

    // Efficiency
    pub rule_of_40: Option<f64>,
    pub operating_leverage: Option<f64>,
    pub margin_trend: Option<MarginTrend>,
    pub growth_stage: Option<GrowthStage>,

    // Metadata
    pub data_points_count: usize,
    pub oldest_data_date: Option<NaiveDate>,
    pub newest_data_date: Option<NaiveDate>,
}

/// One trading day of OHLCV data; unique per (ticker, date)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Current-quote snapshot for one ticker as supplied by the fetch layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub ticker: String,
    #[serde(default)]
    pub company_name: Option<String>,
    pub current_price: Option<f64>,
    pub eps: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub forward_pe: Option<f64>,
    pub ps_ratio: Option<f64>,
    pub revenue: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub market_cap: Option<f64>,
    pub profit_margin: Option<f64>,
}

/// Classical floor-trader pivot levels from the latest bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotPoints {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

/// Clustered support and resistance levels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportResistance {
    pub support_levels: Vec<f64>,
    pub resistance_levels: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Bullish,
    Bearish,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Bullish => "Bullish",
            TrendDirection::Bearish => "Bearish",
        }
    }
}

/// Linear-regression trend over recent closes with extrapolated targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub slope: f64,
    pub r_squared: f64,
    pub p_value: f64,
    pub direction: TrendDirection,
    pub current_price: f64,
    pub target_30d: f64,
    pub target_90d: f64,
    pub upside_30d_percent: f64,
    pub upside_90d_percent: f64,
    pub ma_20: Option<f64>,
    pub ma_50: Option<f64>,
}

/// Nearest support/resistance relative to the current price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTargets {
    pub current_price: f64,
    pub next_resistance: Option<f64>,
    pub next_support: Option<f64>,
    pub upside_to_resistance: Option<f64>,
    pub downside_to_support: Option<f64>,
}

/// Full technical-analysis output for one ticker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    pub support_levels: Vec<f64>,
    pub resistance_levels: Vec<f64>,
    pub pivot_points: Option<PivotPoints>,
    pub trend: Option<TrendAnalysis>,
    pub price_targets: PriceTargets,
    pub data_points: usize,
    pub oldest_date: Option<NaiveDate>,
    pub newest_date: Option<NaiveDate>,
}

/// Persisted cache of a technical-analysis run, overwritten wholesale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub ticker: String,
    pub support_levels: Vec<f64>,
    pub resistance_levels: Vec<f64>,
    pub pivot_points: Option<PivotPoints>,
    pub trend_slope: Option<f64>,
    pub trend_r_squared: Option<f64>,
    pub trend_target_30d: Option<f64>,
    pub trend_target_90d: Option<f64>,
    pub data_points: usize,
}

/// Output of a single forecasting model.
///
/// Model-precondition failures are reported as an `"error"` key in
/// `details` rather than a raised fault; callers must check [`error`]
/// before trusting `target_price`.
///
/// [`error`]: ForecastResult::error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub method: String,
    pub current_price: f64,
    pub target_price: f64,
    pub upside_percent: f64,
    pub years: u32,
    pub annual_return: f64,
    pub details: serde_json::Value,
}

impl ForecastResult {
    /// Error-result for an unmet model precondition
    pub fn failure(method: &str, current_price: f64, years: u32, error: &str) -> Self {
        Self {
            method: method.to_string(),
            current_price,
            target_price: 0.0,
            upside_percent: 0.0,
            years,
            annual_return: 0.0,
            details: serde_json::json!({ "error": error }),
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.details.get("error").and_then(|e| e.as_str())
    }
}

/// One dated observation of a macro time series (yields, spreads, indices)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}
