use analysis_core::{
    FinancialMetric, FinancialRecord, GrowthMetrics, GrowthStage, MarginTrend, PeriodType,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod metrics_tests;

/// PEG ratio variants computed from historical growth
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PegRatios {
    pub peg_3y_cagr: Option<f64>,
    pub peg_quarterly: Option<f64>,
    pub peg_average: Option<f64>,
}

/// Free-cash-flow metrics derived from history plus the current snapshot
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FcfMetrics {
    pub fcf_cagr_3y: Option<f64>,
    pub fcf_margin: Option<f64>,
    pub cash_conversion_ratio: Option<f64>,
}

/// Analyzes one ticker's historical financial records.
///
/// Pure computation over an in-memory table: the analyzer never touches
/// storage or the network, and every method returns `None` (not an error)
/// when its minimum-sample precondition is unmet, so sibling metrics in
/// [`calculate_all_metrics`] still populate whatever they can.
///
/// [`calculate_all_metrics`]: GrowthAnalyzer::calculate_all_metrics
pub struct GrowthAnalyzer {
    records: Vec<FinancialRecord>,
}

impl GrowthAnalyzer {
    /// Build from the full financial history of one ticker; records are
    /// sorted chronologically so growth math always walks oldest-first.
    pub fn new(mut records: Vec<FinancialRecord>) -> Self {
        records.sort_by_key(|r| r.period_end_date);
        Self { records }
    }

    pub fn records(&self) -> &[FinancialRecord] {
        &self.records
    }

    /// Chronological metric values from quarterly rows, with null/zero
    /// entries dropped (zeros are treated as missing to avoid division
    /// artifacts).
    fn quarterly_values(&self, metric: FinancialMetric) -> Vec<f64> {
        self.records
            .iter()
            .filter(|r| r.period_type == PeriodType::Quarterly)
            .filter_map(|r| metric.value_in(r).filter(|v| *v != 0.0))
            .collect()
    }

    fn quarterly_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.period_type == PeriodType::Quarterly)
            .count()
    }

    /// Compound Annual Growth Rate over annual rows.
    ///
    /// Restricts to rows within `years*365` days of the most recent annual
    /// date and uses the *actual* elapsed span in the exponent, so sparse
    /// annual data spanning more or less than the nominal window stays
    /// unbiased. Returns `None` below 2 qualifying points, when the span is
    /// under half a year, or when the starting value is non-positive.
    pub fn calculate_cagr(&self, metric: FinancialMetric, years: u32) -> Option<f64> {
        let annual: Vec<(chrono::NaiveDate, f64)> = self
            .records
            .iter()
            .filter(|r| r.period_type == PeriodType::Annual)
            .filter_map(|r| {
                metric
                    .value_in(r)
                    .filter(|v| *v != 0.0)
                    .map(|v| (r.period_end_date, v))
            })
            .collect();

        if annual.len() < 2 {
            return None;
        }

        let latest_date = annual.last().map(|(d, _)| *d)?;
        let cutoff = latest_date - Duration::days(years as i64 * 365);
        let window: Vec<&(chrono::NaiveDate, f64)> =
            annual.iter().filter(|(d, _)| *d >= cutoff).collect();

        if window.len() < 2 {
            return None;
        }

        let (start_date, start_value) = *window[0];
        let (end_date, end_value) = *window[window.len() - 1];

        if start_value <= 0.0 {
            return None;
        }

        let actual_years = (end_date - start_date).num_days() as f64 / 365.25;
        if actual_years < 0.5 {
            return None;
        }

        Some((end_value / start_value).powf(1.0 / actual_years) - 1.0)
    }

    /// Mean quarter-over-quarter growth rate across the most recent
    /// `periods` quarters. Pairs with a non-positive prior value are
    /// skipped; `None` when no valid pair remains.
    pub fn calculate_average_quarterly_growth(
        &self,
        metric: FinancialMetric,
        periods: usize,
    ) -> Option<f64> {
        let values = self.quarterly_values(metric);
        if values.len() < 2 {
            return None;
        }

        let start = values.len().saturating_sub(periods + 1);
        let rates: Vec<f64> = values[start..]
            .windows(2)
            .filter(|w| w[0] > 0.0)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect();

        if rates.is_empty() {
            return None;
        }

        Some(rates.iter().sum::<f64>() / rates.len() as f64)
    }

    /// Consistency score (0-100) over the most recent `periods` quarters.
    ///
    /// Three weighted components: fraction of positive QoQ changes (40),
    /// inverse volatility via the coefficient of variation (30), and a
    /// positive-mean bonus (30). Fewer than 3 quarters scores 0.
    pub fn calculate_consistency_score(&self, metric: FinancialMetric, periods: usize) -> f64 {
        if self.quarterly_count() < 3 {
            return 0.0;
        }

        let values = self.quarterly_values(metric);
        let start = values.len().saturating_sub(periods + 1);
        let mut rates = Vec::new();
        let mut positive_count = 0usize;

        for w in values[start..].windows(2) {
            if w[0] != 0.0 {
                let growth = (w[1] - w[0]) / w[0];
                rates.push(growth);
                if growth > 0.0 {
                    positive_count += 1;
                }
            }
        }

        if rates.is_empty() {
            return 0.0;
        }

        let positive_score = (positive_count as f64 / rates.len() as f64) * 40.0;

        let mean = rates.iter().sum::<f64>() / rates.len() as f64;
        let variance = rates.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / rates.len() as f64;
        let std_dev = variance.sqrt();

        let volatility_score = if mean.abs() > 0.01 {
            let cv = std_dev / mean.abs();
            (30.0 - cv * 10.0).max(0.0)
        } else {
            0.0
        };

        let avg_growth_score = if mean > 0.0 { 30.0 } else { 0.0 };

        (positive_score + volatility_score + avg_growth_score).clamp(0.0, 100.0)
    }

    /// Whether recent growth is running ahead of the historical average.
    ///
    /// Compares the last-4-quarter average against the full-history
    /// average. The recent window is a subset of the historical baseline,
    /// which skews the comparison toward acceleration on short histories;
    /// that is preserved observed behavior, exercised in tests. The 1.05
    /// margin intentionally flags steady compounders as well as true
    /// inflections.
    pub fn detect_growth_acceleration(&self, metric: FinancialMetric) -> bool {
        let values = self.quarterly_values(metric);
        if values.len() < 6 {
            return false;
        }

        let recent = self.calculate_average_quarterly_growth(metric, 4);
        let historical = self.calculate_average_quarterly_growth(metric, values.len() - 1);

        match (recent, historical) {
            (Some(recent), Some(historical)) => {
                if historical <= 0.0 {
                    recent > 0.0
                } else {
                    recent >= historical * 1.05
                }
            }
            _ => false,
        }
    }

    /// Consecutive quarters of positive net income, counted backward from
    /// the most recent quarter; a missing or non-positive quarter stops
    /// the streak.
    pub fn count_consecutive_profitable_quarters(&self) -> u32 {
        let mut consecutive = 0;
        for record in self
            .records
            .iter()
            .rev()
            .filter(|r| r.period_type == PeriodType::Quarterly)
        {
            match record.net_income {
                Some(ni) if ni > 0.0 => consecutive += 1,
                _ => break,
            }
        }
        consecutive
    }

    /// PEG ratios from internal growth history.
    ///
    /// Uses the 3-year earnings CAGR and the annualized quarterly earnings
    /// growth `(1+q)^4 - 1`, each only when positive; the average covers
    /// whichever variants exist. A non-positive P/E yields all-`None`.
    pub fn calculate_peg_ratio(&self, pe_ratio: Option<f64>) -> PegRatios {
        let pe = match pe_ratio.filter(|p| *p > 0.0) {
            Some(pe) => pe,
            None => return PegRatios::default(),
        };

        let peg_3y_cagr = self
            .calculate_cagr(FinancialMetric::Earnings, 3)
            .filter(|g| *g > 0.0)
            .map(|g| pe / (g * 100.0));

        let peg_quarterly = self
            .calculate_average_quarterly_growth(FinancialMetric::Earnings, 8)
            .map(|q| (1.0 + q).powi(4) - 1.0)
            .filter(|g| *g > 0.0)
            .map(|g| pe / (g * 100.0));

        let available: Vec<f64> = [peg_3y_cagr, peg_quarterly].into_iter().flatten().collect();
        let peg_average = if available.is_empty() {
            None
        } else {
            Some(available.iter().sum::<f64>() / available.len() as f64)
        };

        PegRatios {
            peg_3y_cagr,
            peg_quarterly,
            peg_average,
        }
    }

    /// FCF growth, margin, and cash conversion against the latest quarter.
    pub fn calculate_fcf_metrics(
        &self,
        current_fcf: Option<f64>,
        current_revenue: Option<f64>,
    ) -> FcfMetrics {
        let fcf_cagr_3y = self.calculate_cagr(FinancialMetric::FreeCashFlow, 3);

        let fcf_margin = match (current_fcf, current_revenue) {
            (Some(fcf), Some(revenue)) if revenue > 0.0 => Some(fcf / revenue),
            _ => None,
        };

        let latest_net_income = self
            .records
            .iter()
            .rev()
            .find(|r| r.period_type == PeriodType::Quarterly)
            .and_then(|r| r.net_income);

        let cash_conversion_ratio = match (current_fcf, latest_net_income) {
            (Some(fcf), Some(ni)) if ni > 0.0 => Some(fcf / ni),
            _ => None,
        };

        FcfMetrics {
            fcf_cagr_3y,
            fcf_margin,
            cash_conversion_ratio,
        }
    }

    /// Rule of 40: revenue growth % plus FCF margin %.
    pub fn calculate_rule_of_40(
        revenue_growth: Option<f64>,
        fcf_margin: Option<f64>,
    ) -> Option<f64> {
        match (revenue_growth, fcf_margin) {
            (Some(growth), Some(margin)) => Some(growth * 100.0 + margin * 100.0),
            _ => None,
        }
    }

    /// Earnings growth per unit of revenue growth; >1 implies margin
    /// expansion. `None` when revenue growth is missing or non-positive.
    pub fn calculate_operating_leverage(&self) -> Option<f64> {
        let revenue_growth = self
            .calculate_average_quarterly_growth(FinancialMetric::Revenue, 8)
            .filter(|g| *g > 0.0)?;
        let earnings_growth =
            self.calculate_average_quarterly_growth(FinancialMetric::Earnings, 8)?;

        Some(earnings_growth / revenue_growth)
    }

    /// Direction of the quarterly profit margin over an adaptive window.
    ///
    /// Compares the mean of the most recent half against the previous half
    /// of the last N qualifying quarters (N = 8, 6, or 4 depending on how
    /// much history exists). Requires at least 4 quarters with a reported
    /// margin and a nonzero previous-half average.
    pub fn calculate_margin_trend(&self) -> Option<MarginTrend> {
        let margins: Vec<f64> = self
            .records
            .iter()
            .filter(|r| r.period_type == PeriodType::Quarterly)
            .filter_map(|r| r.profit_margin_quarterly)
            .collect();

        if margins.len() < 4 {
            return None;
        }

        let n = if margins.len() >= 8 {
            8
        } else if margins.len() >= 6 {
            6
        } else {
            4
        };

        let window = &margins[margins.len() - n..];
        let half = n / 2;
        let prev_avg = window[..half].iter().sum::<f64>() / half as f64;
        let recent_avg = window[half..].iter().sum::<f64>() / (n - half) as f64;

        if prev_avg == 0.0 {
            return None;
        }

        let change = (recent_avg - prev_avg) / prev_avg.abs();
        if change > 0.10 {
            Some(MarginTrend::Expanding)
        } else if change < -0.10 {
            Some(MarginTrend::Contracting)
        } else {
            Some(MarginTrend::Stable)
        }
    }

    fn latest_quarterly_margin(&self) -> Option<f64> {
        self.records
            .iter()
            .rev()
            .filter(|r| r.period_type == PeriodType::Quarterly)
            .find_map(|r| r.profit_margin_quarterly)
    }

    /// Lifecycle bucket from the already-computed metrics.
    ///
    /// Primary CAGR is the earnings CAGR when nonzero, else the revenue
    /// CAGR; `None` when neither exists. The rules are evaluated in order,
    /// so a >50% grower with thin margins classifies as early growth even
    /// when also accelerating.
    pub fn classify_growth_stage(&self, metrics: &GrowthMetrics) -> Option<GrowthStage> {
        let primary_cagr = metrics
            .earnings_cagr_3y
            .filter(|c| *c != 0.0)
            .or(metrics.revenue_cagr_3y)?;
        let margin = self.latest_quarterly_margin().unwrap_or(0.0);
        let accelerating =
            metrics.revenue_growth_accelerating || metrics.earnings_growth_accelerating;

        let stage = if primary_cagr > 0.50 && margin < 0.10 {
            GrowthStage::EarlyGrowth
        } else if (0.20..=0.50).contains(&primary_cagr) && accelerating {
            GrowthStage::RapidGrowth
        } else if (0.05..0.20).contains(&primary_cagr) && margin > 0.10 {
            GrowthStage::MatureGrowth
        } else if accelerating && primary_cagr < 0.20 {
            GrowthStage::Inflection
        } else if primary_cagr < 0.0 {
            GrowthStage::Declining
        } else {
            GrowthStage::Stable
        };

        Some(stage)
    }

    /// Full recompute of the per-ticker growth snapshot.
    ///
    /// `current_fcf` / `current_revenue` come from the latest quote
    /// snapshot and feed the FCF and Rule-of-40 metrics. PEG variants are
    /// filled separately by [`apply_peg_ratios`] since they need the P/E
    /// from the quote layer. Returns `None` when there are no records at
    /// all.
    ///
    /// [`apply_peg_ratios`]: GrowthAnalyzer::apply_peg_ratios
    pub fn calculate_all_metrics(
        &self,
        current_fcf: Option<f64>,
        current_revenue: Option<f64>,
    ) -> Option<GrowthMetrics> {
        if self.records.is_empty() {
            return None;
        }

        let fcf = self.calculate_fcf_metrics(current_fcf, current_revenue);
        let revenue_cagr_3y = self.calculate_cagr(FinancialMetric::Revenue, 3);

        let mut metrics = GrowthMetrics {
            ticker: self.records[0].ticker.clone(),

            revenue_cagr_3y,
            revenue_cagr_5y: self.calculate_cagr(FinancialMetric::Revenue, 5),
            earnings_cagr_3y: self.calculate_cagr(FinancialMetric::Earnings, 3),
            earnings_cagr_5y: self.calculate_cagr(FinancialMetric::Earnings, 5),

            avg_quarterly_revenue_growth: self
                .calculate_average_quarterly_growth(FinancialMetric::Revenue, 8),
            avg_quarterly_earnings_growth: self
                .calculate_average_quarterly_growth(FinancialMetric::Earnings, 8),

            revenue_consistency_score: self
                .calculate_consistency_score(FinancialMetric::Revenue, 12),
            earnings_consistency_score: self
                .calculate_consistency_score(FinancialMetric::Earnings, 12),

            revenue_growth_accelerating: self.detect_growth_acceleration(FinancialMetric::Revenue),
            earnings_growth_accelerating: self
                .detect_growth_acceleration(FinancialMetric::Earnings),
            consecutive_profitable_quarters: self.count_consecutive_profitable_quarters(),

            fcf_cagr_3y: fcf.fcf_cagr_3y,
            fcf_margin: fcf.fcf_margin,
            cash_conversion_ratio: fcf.cash_conversion_ratio,

            rule_of_40: Self::calculate_rule_of_40(revenue_cagr_3y, fcf.fcf_margin),
            operating_leverage: self.calculate_operating_leverage(),
            margin_trend: self.calculate_margin_trend(),

            data_points_count: self.records.len(),
            oldest_data_date: self.records.first().map(|r| r.period_end_date),
            newest_data_date: self.records.last().map(|r| r.period_end_date),

            ..GrowthMetrics::default()
        };

        metrics.growth_stage = self.classify_growth_stage(&metrics);

        Some(metrics)
    }

    /// Fill the PEG variants on a computed metrics record.
    ///
    /// `external_growth` is the provider-reported forward earnings growth
    /// (a decimal); when present alongside a positive P/E it contributes a
    /// third PEG variant, and the average is recomputed across everything
    /// available.
    pub fn apply_peg_ratios(
        &self,
        metrics: &mut GrowthMetrics,
        pe_ratio: Option<f64>,
        external_growth: Option<f64>,
    ) {
        let pegs = self.calculate_peg_ratio(pe_ratio);
        metrics.peg_3y_cagr = pegs.peg_3y_cagr;
        metrics.peg_quarterly = pegs.peg_quarterly;

        metrics.peg_external = match (
            pe_ratio.filter(|p| *p > 0.0),
            external_growth.filter(|g| *g > 0.0),
        ) {
            (Some(pe), Some(growth)) => Some(pe / (growth * 100.0)),
            _ => None,
        };

        let available: Vec<f64> = [
            metrics.peg_3y_cagr,
            metrics.peg_quarterly,
            metrics.peg_external,
        ]
        .into_iter()
        .flatten()
        .collect();

        metrics.peg_average = if available.is_empty() {
            None
        } else {
            Some(available.iter().sum::<f64>() / available.len() as f64)
        };
    }
}
