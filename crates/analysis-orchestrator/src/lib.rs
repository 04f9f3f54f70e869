use analysis_core::{
    AnalysisError, FinancialHistoryStore, GrowthMetrics, MetricsStore, PeriodType,
    PriceHistoryStore, SnapshotStore, TechnicalSnapshot,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use forecast_engine::{ForecastSuite, StockForecaster};
use growth_analysis::GrowthAnalyzer;
use std::sync::Arc;
use technical_analysis::TechnicalAnalyzer;
use tracing::{debug, info, warn};

#[cfg(test)]
mod orchestrator_tests;

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

const CACHE_TTL_SECS: i64 = 300; // 5 minutes

/// Ties the pure analyzers to storage: pulls raw records, runs the
/// computations, and upserts the derived results. The analyzers never see
/// storage themselves.
pub struct ResearchOrchestrator<S> {
    store: Arc<S>,
    /// Forecast suites per ticker (5-min TTL); forecasts are transient and
    /// never persisted, so a short cache keeps repeat requests cheap
    forecast_cache: DashMap<String, CacheEntry<ForecastSuite>>,
}

impl<S> ResearchOrchestrator<S>
where
    S: FinancialHistoryStore + PriceHistoryStore + MetricsStore + SnapshotStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            forecast_cache: DashMap::new(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Trailing-twelve-month free cash flow from the latest four quarters,
    /// `None` when no quarter reports it.
    fn ttm_fcf(records: &[analysis_core::FinancialRecord]) -> Option<f64> {
        let values: Vec<f64> = records
            .iter()
            .rev()
            .filter(|r| r.period_type == PeriodType::Quarterly)
            .filter_map(|r| r.free_cash_flow_calculated)
            .take(4)
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum())
        }
    }

    /// Recompute and persist the growth snapshot for one ticker.
    ///
    /// Returns `None` (without writing) when no financial history exists.
    pub async fn refresh_growth_metrics(
        &self,
        ticker: &str,
    ) -> Result<Option<GrowthMetrics>, AnalysisError> {
        let snapshot = self.store.snapshot(ticker).await?;
        let history = self.store.financial_history(ticker, None).await?;

        if history.is_empty() {
            warn!(ticker, "no financial history; skipping growth refresh");
            return Ok(None);
        }

        let current_fcf = Self::ttm_fcf(&history);
        let current_revenue = snapshot.as_ref().and_then(|s| s.revenue);

        let analyzer = GrowthAnalyzer::new(history);
        let mut metrics = match analyzer.calculate_all_metrics(current_fcf, current_revenue) {
            Some(metrics) => metrics,
            None => return Ok(None),
        };

        let (pe_ratio, external_growth) = snapshot
            .map(|s| (s.pe_ratio, s.earnings_growth))
            .unwrap_or((None, None));
        analyzer.apply_peg_ratios(&mut metrics, pe_ratio, external_growth);

        self.store.save_growth_metrics(&metrics).await?;
        info!(
            ticker,
            data_points = metrics.data_points_count,
            "refreshed growth metrics"
        );

        Ok(Some(metrics))
    }

    /// Recompute and persist the technical snapshot for one ticker.
    ///
    /// The reference price is the stored quote when available, else the
    /// latest close. Returns `None` when no price history exists.
    pub async fn refresh_technical(
        &self,
        ticker: &str,
    ) -> Result<Option<TechnicalSnapshot>, AnalysisError> {
        let bars = self.store.price_history(ticker, None).await?;
        if bars.is_empty() {
            warn!(ticker, "no price history; skipping technical refresh");
            return Ok(None);
        }

        let quote_price = self
            .store
            .snapshot(ticker)
            .await?
            .and_then(|s| s.current_price);
        let current_price = quote_price.unwrap_or_else(|| bars.last().unwrap().close);

        let analyzer = TechnicalAnalyzer::new(bars);
        let snapshot = analyzer.snapshot(ticker, current_price);

        self.store.save_technical_snapshot(&snapshot).await?;
        info!(
            ticker,
            data_points = snapshot.data_points,
            "refreshed technical snapshot"
        );

        Ok(Some(snapshot))
    }

    /// Run every forecasting model against the stored snapshot.
    ///
    /// Results are transient and never persisted, but cached briefly per
    /// ticker. Returns `None` when no snapshot exists.
    pub async fn forecast(
        &self,
        ticker: &str,
        years: u32,
    ) -> Result<Option<ForecastSuite>, AnalysisError> {
        let cache_key = format!("{}:{}", ticker, years);

        if let Some(entry) = self.forecast_cache.get(&cache_key) {
            if (Utc::now() - entry.cached_at).num_seconds() < CACHE_TTL_SECS {
                debug!(ticker, "forecast cache hit");
                return Ok(Some(entry.data.clone()));
            }
        }

        let snapshot = match self.store.snapshot(ticker).await? {
            Some(snapshot) => snapshot,
            None => return Ok(None),
        };

        let forecaster = StockForecaster::new(&snapshot);
        let suite = forecaster.run_all_models(years);

        self.forecast_cache.insert(
            cache_key,
            CacheEntry {
                data: suite.clone(),
                cached_at: Utc::now(),
            },
        );

        Ok(Some(suite))
    }

    /// Drop any cached forecasts for a ticker (call after a data refresh).
    pub fn invalidate_forecasts(&self, ticker: &str) {
        self.forecast_cache
            .retain(|key, _| !key.starts_with(&format!("{}:", ticker)));
    }
}
