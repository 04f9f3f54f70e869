use analysis_core::{
    AnalysisError, FinancialHistoryStore, FinancialRecord, GrowthMetrics, MetricsStore,
    PeriodType, PriceBar, PriceHistoryStore, SnapshotStore, StockSnapshot, TechnicalSnapshot,
};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

use crate::rows::{
    FinancialRecordRow, GrowthMetricsRow, PriceBarRow, StockSnapshotRow, TechnicalSnapshotRow,
};

fn db_err(e: sqlx::Error) -> AnalysisError {
    AnalysisError::DatabaseError(e.to_string())
}

/// SQLite-backed store for snapshots, history, and derived analytics.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) and initialize the schema.
    pub async fn new(database_url: &str) -> Result<Self> {
        Self::with_max_connections(database_url, 5).await
    }

    /// Single-connection in-memory store; every query sees the same
    /// database, which a pooled `:memory:` connection would not.
    pub async fn in_memory() -> Result<Self> {
        Self::with_max_connections("sqlite::memory:", 1).await
    }

    async fn with_max_connections(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;

        Ok(store)
    }

    /// Connection URL from the environment (`DATABASE_URL`), with a local
    /// file fallback.
    pub async fn connect_from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:data/research.db".to_string());
        info!(url = %url, "connecting research store");
        Self::new(&url).await
    }

    /// Execute the embedded schema statement-by-statement (sqlx does not
    /// run multi-statement strings).
    async fn init_schema(&self) -> Result<()> {
        let schema = include_str!("../schema.sql");
        for statement in schema.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&self.pool).await?;
            }
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl FinancialHistoryStore for SqliteStore {
    async fn save_financial_history(
        &self,
        ticker: &str,
        records: &[FinancialRecord],
    ) -> Result<u64, AnalysisError> {
        let mut written = 0u64;

        for record in records {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO financial_history (
                    ticker, period_end_date, period_type,
                    revenue, earnings, gross_profit, operating_income, ebitda,
                    net_income, eps, shares_outstanding, operating_cash_flow,
                    capital_expenditures, free_cash_flow_calculated,
                    gross_margin, operating_margin, profit_margin_quarterly
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(ticker)
            .bind(record.period_end_date)
            .bind(record.period_type.as_str())
            .bind(record.revenue)
            .bind(record.earnings)
            .bind(record.gross_profit)
            .bind(record.operating_income)
            .bind(record.ebitda)
            .bind(record.net_income)
            .bind(record.eps)
            .bind(record.shares_outstanding)
            .bind(record.operating_cash_flow)
            .bind(record.capital_expenditures)
            .bind(record.free_cash_flow_calculated)
            .bind(record.gross_margin)
            .bind(record.operating_margin)
            .bind(record.profit_margin_quarterly)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

            written += 1;
        }

        debug!(ticker, written, "saved financial history");
        Ok(written)
    }

    async fn financial_history(
        &self,
        ticker: &str,
        period_type: Option<PeriodType>,
    ) -> Result<Vec<FinancialRecord>, AnalysisError> {
        let rows: Vec<FinancialRecordRow> = match period_type {
            Some(period) => {
                sqlx::query_as(
                    "SELECT * FROM financial_history
                     WHERE ticker = ? AND period_type = ?
                     ORDER BY period_end_date ASC",
                )
                .bind(ticker)
                .bind(period.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(
                    "SELECT * FROM financial_history
                     WHERE ticker = ?
                     ORDER BY period_end_date ASC",
                )
                .bind(ticker)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(db_err)?;

        rows.into_iter().map(|r| r.into_record()).collect()
    }
}

#[async_trait]
impl PriceHistoryStore for SqliteStore {
    async fn save_price_history(
        &self,
        ticker: &str,
        bars: &[PriceBar],
    ) -> Result<u64, AnalysisError> {
        let mut written = 0u64;

        for bar in bars {
            sqlx::query(
                "INSERT OR REPLACE INTO price_history
                 (ticker, date, open, high, low, close, volume)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(ticker)
            .bind(bar.date)
            .bind(bar.open)
            .bind(bar.high)
            .bind(bar.low)
            .bind(bar.close)
            .bind(bar.volume)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

            written += 1;
        }

        debug!(ticker, written, "saved price history");
        Ok(written)
    }

    async fn price_history(
        &self,
        ticker: &str,
        days: Option<u32>,
    ) -> Result<Vec<PriceBar>, AnalysisError> {
        // Trailing window: take the newest N rows, then restore ascending order
        let rows: Vec<PriceBarRow> = match days {
            Some(days) => {
                sqlx::query_as(
                    "SELECT date, open, high, low, close, volume FROM (
                         SELECT * FROM price_history
                         WHERE ticker = ? ORDER BY date DESC LIMIT ?
                     ) ORDER BY date ASC",
                )
                .bind(ticker)
                .bind(days as i64)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(
                    "SELECT date, open, high, low, close, volume
                     FROM price_history WHERE ticker = ? ORDER BY date ASC",
                )
                .bind(ticker)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(db_err)?;

        Ok(rows.into_iter().map(PriceBar::from).collect())
    }
}

#[async_trait]
impl MetricsStore for SqliteStore {
    async fn save_growth_metrics(&self, metrics: &GrowthMetrics) -> Result<(), AnalysisError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO growth_metrics (
                ticker,
                revenue_cagr_3y, revenue_cagr_5y, earnings_cagr_3y, earnings_cagr_5y,
                avg_quarterly_revenue_growth, avg_quarterly_earnings_growth,
                revenue_consistency_score, earnings_consistency_score,
                revenue_growth_accelerating, earnings_growth_accelerating,
                consecutive_profitable_quarters,
                peg_3y_cagr, peg_quarterly, peg_external, peg_average,
                fcf_cagr_3y, fcf_margin, cash_conversion_ratio,
                rule_of_40, operating_leverage, margin_trend, growth_stage,
                data_points_count, oldest_data_date, newest_data_date,
                updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'))
            "#,
        )
        .bind(&metrics.ticker)
        .bind(metrics.revenue_cagr_3y)
        .bind(metrics.revenue_cagr_5y)
        .bind(metrics.earnings_cagr_3y)
        .bind(metrics.earnings_cagr_5y)
        .bind(metrics.avg_quarterly_revenue_growth)
        .bind(metrics.avg_quarterly_earnings_growth)
        .bind(metrics.revenue_consistency_score)
        .bind(metrics.earnings_consistency_score)
        .bind(metrics.revenue_growth_accelerating)
        .bind(metrics.earnings_growth_accelerating)
        .bind(metrics.consecutive_profitable_quarters as i64)
        .bind(metrics.peg_3y_cagr)
        .bind(metrics.peg_quarterly)
        .bind(metrics.peg_external)
        .bind(metrics.peg_average)
        .bind(metrics.fcf_cagr_3y)
        .bind(metrics.fcf_margin)
        .bind(metrics.cash_conversion_ratio)
        .bind(metrics.rule_of_40)
        .bind(metrics.operating_leverage)
        .bind(metrics.margin_trend.map(|t| t.as_str()))
        .bind(metrics.growth_stage.map(|s| s.as_str()))
        .bind(metrics.data_points_count as i64)
        .bind(metrics.oldest_data_date)
        .bind(metrics.newest_data_date)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        debug!(ticker = %metrics.ticker, "saved growth metrics");
        Ok(())
    }

    async fn growth_metrics(&self, ticker: &str) -> Result<Option<GrowthMetrics>, AnalysisError> {
        let row: Option<GrowthMetricsRow> =
            sqlx::query_as("SELECT * FROM growth_metrics WHERE ticker = ?")
                .bind(ticker)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        Ok(row.map(GrowthMetrics::from))
    }

    async fn save_technical_snapshot(
        &self,
        snapshot: &TechnicalSnapshot,
    ) -> Result<(), AnalysisError> {
        let encode = |levels: &Vec<f64>| {
            serde_json::to_string(levels)
                .map_err(|e| AnalysisError::InvalidData(format!("bad level list: {}", e)))
        };

        let pivot_json = match &snapshot.pivot_points {
            Some(p) => Some(
                serde_json::to_string(p)
                    .map_err(|e| AnalysisError::InvalidData(format!("bad pivot payload: {}", e)))?,
            ),
            None => None,
        };

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO technical_indicators (
                ticker, support_levels, resistance_levels, pivot_points,
                trend_slope, trend_r_squared, trend_target_30d, trend_target_90d,
                data_points, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'))
            "#,
        )
        .bind(&snapshot.ticker)
        .bind(encode(&snapshot.support_levels)?)
        .bind(encode(&snapshot.resistance_levels)?)
        .bind(pivot_json)
        .bind(snapshot.trend_slope)
        .bind(snapshot.trend_r_squared)
        .bind(snapshot.trend_target_30d)
        .bind(snapshot.trend_target_90d)
        .bind(snapshot.data_points as i64)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        debug!(ticker = %snapshot.ticker, "saved technical snapshot");
        Ok(())
    }

    async fn technical_snapshot(
        &self,
        ticker: &str,
    ) -> Result<Option<TechnicalSnapshot>, AnalysisError> {
        let row: Option<TechnicalSnapshotRow> =
            sqlx::query_as("SELECT * FROM technical_indicators WHERE ticker = ?")
                .bind(ticker)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        row.map(|r| r.into_snapshot()).transpose()
    }
}

#[async_trait]
impl SnapshotStore for SqliteStore {
    async fn save_snapshot(&self, snapshot: &StockSnapshot) -> Result<(), AnalysisError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO stocks (
                ticker, company_name, current_price, eps, pe_ratio, forward_pe,
                ps_ratio, revenue, revenue_growth, earnings_growth, market_cap,
                profit_margin, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'))
            "#,
        )
        .bind(&snapshot.ticker)
        .bind(&snapshot.company_name)
        .bind(snapshot.current_price)
        .bind(snapshot.eps)
        .bind(snapshot.pe_ratio)
        .bind(snapshot.forward_pe)
        .bind(snapshot.ps_ratio)
        .bind(snapshot.revenue)
        .bind(snapshot.revenue_growth)
        .bind(snapshot.earnings_growth)
        .bind(snapshot.market_cap)
        .bind(snapshot.profit_margin)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn snapshot(&self, ticker: &str) -> Result<Option<StockSnapshot>, AnalysisError> {
        let row: Option<StockSnapshotRow> = sqlx::query_as(
            "SELECT ticker, company_name, current_price, eps, pe_ratio, forward_pe,
                    ps_ratio, revenue, revenue_growth, earnings_growth, market_cap,
                    profit_margin
             FROM stocks WHERE ticker = ?",
        )
        .bind(ticker)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(StockSnapshot::from))
    }

    async fn delete_ticker(&self, ticker: &str) -> Result<(), AnalysisError> {
        for table in [
            "stocks",
            "financial_history",
            "price_history",
            "growth_metrics",
            "technical_indicators",
        ] {
            sqlx::query(&format!("DELETE FROM {} WHERE ticker = ?", table))
                .bind(ticker)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
        }

        info!(ticker, "deleted ticker and derived rows");
        Ok(())
    }
}
