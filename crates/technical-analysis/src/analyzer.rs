use analysis_core::{PriceBar, PriceTargets, TechnicalIndicators, TechnicalSnapshot};

use crate::levels::{pivot_points, support_resistance};
use crate::trend::calculate_trend;

const DEFAULT_WINDOW: usize = 20;
const DEFAULT_NUM_LEVELS: usize = 3;
const DEFAULT_TREND_DAYS: usize = 90;

/// Analyzes one ticker's daily price history.
///
/// Pure computation over an in-memory bar table, immutable after
/// construction; share read-only across requests or rebuild per request.
pub struct TechnicalAnalyzer {
    bars: Vec<PriceBar>,
}

impl TechnicalAnalyzer {
    pub fn new(mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        Self { bars }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// Clustered support/resistance levels; see [`support_resistance`].
    pub fn calculate_support_resistance(
        &self,
        window: usize,
        num_levels: usize,
    ) -> analysis_core::SupportResistance {
        support_resistance(&self.bars, window, num_levels)
    }

    /// Floor-trader pivots from the latest bar
    pub fn calculate_pivot_points(&self) -> Option<analysis_core::PivotPoints> {
        pivot_points(&self.bars)
    }

    /// Regression trend over the most recent `period_days` bars
    pub fn calculate_trend(&self, period_days: usize) -> Option<analysis_core::TrendAnalysis> {
        calculate_trend(&self.bars, period_days)
    }

    /// Nearest resistance strictly above and support strictly below the
    /// current price, with percentage distance to each.
    pub fn calculate_support_resistance_targets(&self, current_price: f64) -> PriceTargets {
        let levels = self.calculate_support_resistance(DEFAULT_WINDOW, DEFAULT_NUM_LEVELS);

        let next_resistance = levels
            .resistance_levels
            .iter()
            .filter(|&&r| r > current_price)
            .copied()
            .reduce(f64::min);

        let next_support = levels
            .support_levels
            .iter()
            .filter(|&&s| s < current_price)
            .copied()
            .reduce(f64::max);

        let upside_to_resistance = next_resistance
            .filter(|_| current_price > 0.0)
            .map(|r| (r - current_price) / current_price * 100.0);
        let downside_to_support = next_support
            .filter(|_| current_price > 0.0)
            .map(|s| (current_price - s) / current_price * 100.0);

        PriceTargets {
            current_price,
            next_resistance,
            next_support,
            upside_to_resistance,
            downside_to_support,
        }
    }

    /// Comprehensive technical run with default parameters.
    ///
    /// Siblings degrade independently: too little history for the trend
    /// still leaves pivots and level lists populated.
    pub fn calculate_all_indicators(&self, current_price: f64) -> TechnicalIndicators {
        let levels = self.calculate_support_resistance(DEFAULT_WINDOW, DEFAULT_NUM_LEVELS);
        let pivots = self.calculate_pivot_points();
        let trend = self.calculate_trend(DEFAULT_TREND_DAYS);
        let price_targets = self.calculate_support_resistance_targets(current_price);

        TechnicalIndicators {
            support_levels: levels.support_levels,
            resistance_levels: levels.resistance_levels,
            pivot_points: pivots,
            trend,
            price_targets,
            data_points: self.bars.len(),
            oldest_date: self.bars.first().map(|b| b.date),
            newest_date: self.bars.last().map(|b| b.date),
        }
    }

    /// Persisted cache row for one run; overwritten wholesale on recompute.
    pub fn snapshot(&self, ticker: &str, current_price: f64) -> TechnicalSnapshot {
        let indicators = self.calculate_all_indicators(current_price);
        let trend = indicators.trend.as_ref();

        TechnicalSnapshot {
            ticker: ticker.to_string(),
            support_levels: indicators.support_levels.clone(),
            resistance_levels: indicators.resistance_levels.clone(),
            pivot_points: indicators.pivot_points,
            trend_slope: trend.map(|t| t.slope),
            trend_r_squared: trend.map(|t| t.r_squared),
            trend_target_30d: trend.map(|t| t.target_30d),
            trend_target_90d: trend.map(|t| t.target_90d),
            data_points: indicators.data_points,
        }
    }
}
