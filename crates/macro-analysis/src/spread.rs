use analysis_core::SeriesPoint;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Direction of a spread over its trailing three months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpreadTrend {
    Expanding,
    Contracting,
    Stable,
}

impl SpreadTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpreadTrend::Expanding => "EXPANDING",
            SpreadTrend::Contracting => "CONTRACTING",
            SpreadTrend::Stable => "STABLE",
        }
    }
}

/// One spread with historical context at standard lookbacks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadSummary {
    pub current: f64,
    pub one_month_ago: Option<f64>,
    pub three_months_ago: Option<f64>,
    pub six_months_ago: Option<f64>,
    pub one_year_ago: Option<f64>,
    pub change_1m: Option<f64>,
    pub change_3m: Option<f64>,
    pub change_6m: Option<f64>,
    pub change_1y: Option<f64>,
    pub trend: Option<SpreadTrend>,
}

/// The treasury series a yield-curve spread run needs
#[derive(Debug, Clone, Default)]
pub struct YieldCurveSeries {
    pub three_month: Vec<SeriesPoint>,
    pub two_year: Vec<SeriesPoint>,
    pub five_year: Vec<SeriesPoint>,
    pub ten_year: Vec<SeriesPoint>,
    pub thirty_year: Vec<SeriesPoint>,
}

/// The three curve spreads tracked on the macro dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YieldSpreads {
    /// 10Y-2Y, the classic recession indicator
    pub spread_10y2y: Option<SpreadSummary>,
    /// 10Y-3M, the Fed's preferred measure
    pub spread_10y3m: Option<SpreadSummary>,
    /// 30Y-5Y, long-end curve shape
    pub spread_30y5y: Option<SpreadSummary>,
}

/// Credit spread level with its rank in the supplied history
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CreditSpreadSummary {
    pub current: f64,
    pub percentile: f64,
}

/// Spread math over paired macro time series.
///
/// Operates on in-memory observations supplied by the caller; fetching is
/// an excluded collaborator's job.
pub struct SpreadCalculator;

impl SpreadCalculator {
    /// Spread value as of `days_back` before the latest observation of the
    /// long series, using the nearest observation on/before the target
    /// date for each leg.
    fn historical_spread(
        long: &[SeriesPoint],
        short: &[SeriesPoint],
        days_back: i64,
    ) -> Option<f64> {
        let latest = long.last()?;
        let target = latest.date - Duration::days(days_back);

        let long_value = long.iter().rev().find(|p| p.date <= target)?.value;
        let short_value = short.iter().rev().find(|p| p.date <= target)?.value;

        Some(long_value - short_value)
    }

    /// A single spread with lookback context and a 3-month trend call.
    ///
    /// Series must be ordered ascending by date. Returns `None` when
    /// either leg is empty.
    pub fn calculate_spread(
        long: &[SeriesPoint],
        short: &[SeriesPoint],
        trend_threshold: f64,
    ) -> Option<SpreadSummary> {
        let current_long = long.last()?.value;
        let current_short = short.last()?.value;
        let current = current_long - current_short;

        let one_month_ago = Self::historical_spread(long, short, 30);
        let three_months_ago = Self::historical_spread(long, short, 90);
        let six_months_ago = Self::historical_spread(long, short, 180);
        let one_year_ago = Self::historical_spread(long, short, 365);

        let change_1m = one_month_ago.map(|s| current - s);
        let change_3m = three_months_ago.map(|s| current - s);
        let change_6m = six_months_ago.map(|s| current - s);
        let change_1y = one_year_ago.map(|s| current - s);

        let trend = change_3m.map(|change| {
            if change > trend_threshold {
                SpreadTrend::Expanding
            } else if change < -trend_threshold {
                SpreadTrend::Contracting
            } else {
                SpreadTrend::Stable
            }
        });

        Some(SpreadSummary {
            current,
            one_month_ago,
            three_months_ago,
            six_months_ago,
            one_year_ago,
            change_1m,
            change_3m,
            change_6m,
            change_1y,
            trend,
        })
    }

    /// The three dashboard spreads. The long-end spread uses a tighter
    /// trend threshold since its typical movements are smaller.
    pub fn calculate_yield_spreads(curve: &YieldCurveSeries) -> YieldSpreads {
        YieldSpreads {
            spread_10y2y: Self::calculate_spread(&curve.ten_year, &curve.two_year, 0.10),
            spread_10y3m: Self::calculate_spread(&curve.ten_year, &curve.three_month, 0.10),
            spread_30y5y: Self::calculate_spread(&curve.thirty_year, &curve.five_year, 0.05),
        }
    }

    /// Percentile rank of `value` in `history` (fraction of observations
    /// at or below it, as a percentage).
    pub fn percentile_rank(value: f64, history: &[f64]) -> Option<f64> {
        if history.is_empty() || value.is_nan() {
            return None;
        }
        let at_or_below = history.iter().filter(|&&v| v <= value).count();
        Some(at_or_below as f64 / history.len() as f64 * 100.0)
    }

    /// Current credit spread level with its rank across the supplied
    /// history (typically ten years for a stable percentile base).
    pub fn credit_spread_summary(series: &[SeriesPoint]) -> Option<CreditSpreadSummary> {
        let current = series.last()?.value;
        let history: Vec<f64> = series.iter().map(|p| p.value).collect();
        let percentile = Self::percentile_rank(current, &history)?;

        Some(CreditSpreadSummary {
            current,
            percentile,
        })
    }
}
