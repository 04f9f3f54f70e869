use crate::{
    AnalysisError, FinancialRecord, GrowthMetrics, PeriodType, PriceBar, StockSnapshot,
    TechnicalSnapshot,
};
use async_trait::async_trait;

/// Read/write access to per-ticker financial statement history
#[async_trait]
pub trait FinancialHistoryStore: Send + Sync {
    /// Upsert a batch of records; returns how many rows were written
    async fn save_financial_history(
        &self,
        ticker: &str,
        records: &[FinancialRecord],
    ) -> Result<u64, AnalysisError>;

    /// Records ordered ascending by period end date
    async fn financial_history(
        &self,
        ticker: &str,
        period_type: Option<PeriodType>,
    ) -> Result<Vec<FinancialRecord>, AnalysisError>;
}

/// Read/write access to per-ticker daily price history
#[async_trait]
pub trait PriceHistoryStore: Send + Sync {
    async fn save_price_history(
        &self,
        ticker: &str,
        bars: &[PriceBar],
    ) -> Result<u64, AnalysisError>;

    /// Bars ordered ascending by date; `days` limits to the trailing window
    async fn price_history(
        &self,
        ticker: &str,
        days: Option<u32>,
    ) -> Result<Vec<PriceBar>, AnalysisError>;
}

/// Storage for derived analytics, keyed uniquely by ticker
#[async_trait]
pub trait MetricsStore: Send + Sync {
    async fn save_growth_metrics(&self, metrics: &GrowthMetrics) -> Result<(), AnalysisError>;

    async fn growth_metrics(&self, ticker: &str) -> Result<Option<GrowthMetrics>, AnalysisError>;

    async fn save_technical_snapshot(
        &self,
        snapshot: &TechnicalSnapshot,
    ) -> Result<(), AnalysisError>;

    async fn technical_snapshot(
        &self,
        ticker: &str,
    ) -> Result<Option<TechnicalSnapshot>, AnalysisError>;
}

/// Storage for current-quote snapshots
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn save_snapshot(&self, snapshot: &StockSnapshot) -> Result<(), AnalysisError>;

    async fn snapshot(&self, ticker: &str) -> Result<Option<StockSnapshot>, AnalysisError>;

    /// Full entity deletion: removes the snapshot and every derived row
    async fn delete_ticker(&self, ticker: &str) -> Result<(), AnalysisError>;
}
