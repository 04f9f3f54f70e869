#[cfg(test)]
mod tests {
    use crate::ResearchOrchestrator;
    use analysis_core::{
        FinancialHistoryStore, FinancialRecord, MetricsStore, PeriodType, PriceBar,
        PriceHistoryStore, SnapshotStore, StockSnapshot,
    };
    use chrono::{Duration, NaiveDate};
    use data_store::SqliteStore;
    use std::sync::Arc;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn quarterly(date: &str, revenue: f64) -> FinancialRecord {
        let mut r = FinancialRecord::new("TEST", d(date), PeriodType::Quarterly);
        r.revenue = Some(revenue);
        r.earnings = Some(revenue * 0.2);
        r.net_income = Some(revenue * 0.2);
        r.free_cash_flow_calculated = Some(revenue * 0.15);
        r
    }

    fn snapshot() -> StockSnapshot {
        StockSnapshot {
            ticker: "TEST".to_string(),
            company_name: Some("Test Corp".to_string()),
            current_price: Some(100.0),
            eps: Some(4.0),
            pe_ratio: Some(25.0),
            ps_ratio: Some(6.0),
            revenue: Some(500.0),
            revenue_growth: Some(0.18),
            earnings_growth: Some(0.22),
            market_cap: Some(10_000_000_000.0),
            profit_margin: Some(0.20),
            ..StockSnapshot::default()
        }
    }

    async fn seeded_store() -> Arc<SqliteStore> {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());

        store.save_snapshot(&snapshot()).await.unwrap();

        let quarters = vec![
            quarterly("2023-03-31", 100.0),
            quarterly("2023-06-30", 110.0),
            quarterly("2023-09-30", 121.0),
            quarterly("2023-12-31", 133.1),
        ];
        store.save_financial_history("TEST", &quarters).await.unwrap();

        let bars: Vec<PriceBar> = (0..60)
            .map(|i| {
                let close = 90.0 + i as f64 * 0.2;
                PriceBar {
                    date: d("2023-10-01") + Duration::days(i),
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000_000.0,
                }
            })
            .collect();
        store.save_price_history("TEST", &bars).await.unwrap();

        store
    }

    #[tokio::test]
    async fn growth_refresh_computes_and_persists() {
        let store = seeded_store().await;
        let orchestrator = ResearchOrchestrator::new(store.clone());

        let metrics = orchestrator
            .refresh_growth_metrics("TEST")
            .await
            .unwrap()
            .unwrap();

        assert!(metrics.revenue_consistency_score > 90.0);
        assert_eq!(metrics.consecutive_profitable_quarters, 4);
        // External PEG from the snapshot's P/E and provider growth rate
        assert!((metrics.peg_external.unwrap() - 25.0 / 22.0).abs() < 1e-9);

        let persisted = store.growth_metrics("TEST").await.unwrap().unwrap();
        assert_eq!(persisted.data_points_count, 4);
        assert_eq!(
            persisted.consecutive_profitable_quarters,
            metrics.consecutive_profitable_quarters
        );
    }

    #[tokio::test]
    async fn growth_refresh_without_history() {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        let orchestrator = ResearchOrchestrator::new(store);

        let result = orchestrator.refresh_growth_metrics("NOPE").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn technical_refresh_persists_snapshot() {
        let store = seeded_store().await;
        let orchestrator = ResearchOrchestrator::new(store.clone());

        let snapshot = orchestrator
            .refresh_technical("TEST")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.data_points, 60);
        assert!(snapshot.trend_slope.unwrap() > 0.0);

        let persisted = store.technical_snapshot("TEST").await.unwrap().unwrap();
        assert_eq!(persisted.data_points, 60);
        assert_eq!(persisted.trend_slope, snapshot.trend_slope);
    }

    #[tokio::test]
    async fn forecast_uses_snapshot_and_caches() {
        let store = seeded_store().await;
        let orchestrator = ResearchOrchestrator::new(store);

        let first = orchestrator.forecast("TEST", 5).await.unwrap().unwrap();
        assert_eq!(first.ticker, "TEST");
        assert!(first.earnings_model.error().is_none());

        // Cached: identical result object comes back
        let second = orchestrator.forecast("TEST", 5).await.unwrap().unwrap();
        assert_eq!(
            first.earnings_model.target_price,
            second.earnings_model.target_price
        );

        orchestrator.invalidate_forecasts("TEST");
        let third = orchestrator.forecast("TEST", 5).await.unwrap().unwrap();
        assert_eq!(
            first.earnings_model.target_price,
            third.earnings_model.target_price
        );
    }

    #[tokio::test]
    async fn forecast_without_snapshot() {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        let orchestrator = ResearchOrchestrator::new(store);

        assert!(orchestrator.forecast("NOPE", 5).await.unwrap().is_none());
    }
}
