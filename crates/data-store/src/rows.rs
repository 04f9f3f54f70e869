use analysis_core::{
    AnalysisError, FinancialRecord, GrowthMetrics, GrowthStage, MarginTrend, PeriodType,
    PivotPoints, PriceBar, StockSnapshot, TechnicalSnapshot,
};
use chrono::NaiveDate;

#[derive(Debug, sqlx::FromRow)]
pub struct FinancialRecordRow {
    pub ticker: String,
    pub period_end_date: NaiveDate,
    pub period_type: String,
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

impl FinancialRecordRow {
    pub fn into_record(self) -> Result<FinancialRecord, AnalysisError> {
        let period_type = PeriodType::parse(&self.period_type).ok_or_else(|| {
            AnalysisError::InvalidData(format!("unknown period type: {}", self.period_type))
        })?;

        Ok(FinancialRecord {
            ticker: self.ticker,
            period_end_date: self.period_end_date,
            period_type,
            revenue: self.revenue,
            earnings: self.earnings,
            gross_profit: self.gross_profit,
            operating_income: self.operating_income,
            ebitda: self.ebitda,
            net_income: self.net_income,
            eps: self.eps,
            shares_outstanding: self.shares_outstanding,
            operating_cash_flow: self.operating_cash_flow,
            capital_expenditures: self.capital_expenditures,
            free_cash_flow_calculated: self.free_cash_flow_calculated,
            gross_margin: self.gross_margin,
            operating_margin: self.operating_margin,
            profit_margin_quarterly: self.profit_margin_quarterly,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PriceBarRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl From<PriceBarRow> for PriceBar {
    fn from(row: PriceBarRow) -> Self {
        PriceBar {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct GrowthMetricsRow {
    pub ticker: String,
    pub revenue_cagr_3y: Option<f64>,
    pub revenue_cagr_5y: Option<f64>,
    pub earnings_cagr_3y: Option<f64>,
    pub earnings_cagr_5y: Option<f64>,
    pub avg_quarterly_revenue_growth: Option<f64>,
    pub avg_quarterly_earnings_growth: Option<f64>,
    pub revenue_consistency_score: f64,
    pub earnings_consistency_score: f64,
    pub revenue_growth_accelerating: bool,
    pub earnings_growth_accelerating: bool,
    pub consecutive_profitable_quarters: i64,
    pub peg_3y_cagr: Option<f64>,
    pub peg_quarterly: Option<f64>,
    pub peg_external: Option<f64>,
    pub peg_average: Option<f64>,
    pub fcf_cagr_3y: Option<f64>,
    pub fcf_margin: Option<f64>,
    pub cash_conversion_ratio: Option<f64>,
    pub rule_of_40: Option<f64>,
    pub operating_leverage: Option<f64>,
    pub margin_trend: Option<String>,
    pub growth_stage: Option<String>,
    pub data_points_count: i64,
    pub oldest_data_date: Option<NaiveDate>,
    pub newest_data_date: Option<NaiveDate>,
}

impl From<GrowthMetricsRow> for GrowthMetrics {
    fn from(row: GrowthMetricsRow) -> Self {
        GrowthMetrics {
            ticker: row.ticker,
            revenue_cagr_3y: row.revenue_cagr_3y,
            revenue_cagr_5y: row.revenue_cagr_5y,
            earnings_cagr_3y: row.earnings_cagr_3y,
            earnings_cagr_5y: row.earnings_cagr_5y,
            avg_quarterly_revenue_growth: row.avg_quarterly_revenue_growth,
            avg_quarterly_earnings_growth: row.avg_quarterly_earnings_growth,
            revenue_consistency_score: row.revenue_consistency_score,
            earnings_consistency_score: row.earnings_consistency_score,
            revenue_growth_accelerating: row.revenue_growth_accelerating,
            earnings_growth_accelerating: row.earnings_growth_accelerating,
            consecutive_profitable_quarters: row.consecutive_profitable_quarters.max(0) as u32,
            peg_3y_cagr: row.peg_3y_cagr,
            peg_quarterly: row.peg_quarterly,
            peg_external: row.peg_external,
            peg_average: row.peg_average,
            fcf_cagr_3y: row.fcf_cagr_3y,
            fcf_margin: row.fcf_margin,
            cash_conversion_ratio: row.cash_conversion_ratio,
            rule_of_40: row.rule_of_40,
            operating_leverage: row.operating_leverage,
            margin_trend: row.margin_trend.as_deref().and_then(MarginTrend::parse),
            growth_stage: row.growth_stage.as_deref().and_then(GrowthStage::parse),
            data_points_count: row.data_points_count.max(0) as usize,
            oldest_data_date: row.oldest_data_date,
            newest_data_date: row.newest_data_date,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct TechnicalSnapshotRow {
    pub ticker: String,
    pub support_levels: String,
    pub resistance_levels: String,
    pub pivot_points: Option<String>,
    pub trend_slope: Option<f64>,
    pub trend_r_squared: Option<f64>,
    pub trend_target_30d: Option<f64>,
    pub trend_target_90d: Option<f64>,
    pub data_points: i64,
}

impl TechnicalSnapshotRow {
    pub fn into_snapshot(self) -> Result<TechnicalSnapshot, AnalysisError> {
        let parse_levels = |raw: &str| -> Result<Vec<f64>, AnalysisError> {
            serde_json::from_str(raw)
                .map_err(|e| AnalysisError::InvalidData(format!("bad level list: {}", e)))
        };

        let pivot_points: Option<PivotPoints> = match self.pivot_points.as_deref() {
            Some(raw) => Some(
                serde_json::from_str(raw)
                    .map_err(|e| AnalysisError::InvalidData(format!("bad pivot payload: {}", e)))?,
            ),
            None => None,
        };

        Ok(TechnicalSnapshot {
            ticker: self.ticker,
            support_levels: parse_levels(&self.support_levels)?,
            resistance_levels: parse_levels(&self.resistance_levels)?,
            pivot_points,
            trend_slope: self.trend_slope,
            trend_r_squared: self.trend_r_squared,
            trend_target_30d: self.trend_target_30d,
            trend_target_90d: self.trend_target_90d,
            data_points: self.data_points.max(0) as usize,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct StockSnapshotRow {
    pub ticker: String,
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

impl From<StockSnapshotRow> for StockSnapshot {
    fn from(row: StockSnapshotRow) -> Self {
        StockSnapshot {
            ticker: row.ticker,
            company_name: row.company_name,
            current_price: row.current_price,
            eps: row.eps,
            pe_ratio: row.pe_ratio,
            forward_pe: row.forward_pe,
            ps_ratio: row.ps_ratio,
            revenue: row.revenue,
            revenue_growth: row.revenue_growth,
            earnings_growth: row.earnings_growth,
            market_cap: row.market_cap,
            profit_margin: row.profit_margin,
        }
    }
}
