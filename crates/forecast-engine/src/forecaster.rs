use analysis_core::{ForecastResult, StockSnapshot};
use serde_json::json;

use crate::models::{
    ForecastSuite, MonteCarloOutcome, OutcomeProbabilities, PricePercentiles, ScenarioAnalysis,
    ScenarioCase,
};
use crate::monte_carlo::{histogram, percentile, simulate_terminal_prices};

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Multi-method price forecasting over one ticker's current snapshot.
///
/// Missing snapshot fields collapse to 0.0 at construction; each model
/// checks its own precondition and returns an error-result (never panics)
/// when the input it needs is absent or non-positive.
pub struct StockForecaster {
    pub ticker: String,
    pub company_name: Option<String>,
    pub current_price: f64,
    pub eps: f64,
    pub pe_ratio: f64,
    pub forward_pe: f64,
    pub ps_ratio: f64,
    pub revenue: f64,
    pub revenue_growth: f64,
    pub earnings_growth: f64,
    pub market_cap: f64,
    pub profit_margin: f64,
    pub shares_outstanding: f64,
}

impl StockForecaster {
    pub fn new(snapshot: &StockSnapshot) -> Self {
        let current_price = snapshot.current_price.unwrap_or(0.0);
        let market_cap = snapshot.market_cap.unwrap_or(0.0);

        let shares_outstanding = if current_price > 0.0 && market_cap > 0.0 {
            market_cap / current_price
        } else {
            0.0
        };

        Self {
            ticker: snapshot.ticker.clone(),
            company_name: snapshot.company_name.clone(),
            current_price,
            eps: snapshot.eps.unwrap_or(0.0),
            pe_ratio: snapshot.pe_ratio.unwrap_or(0.0),
            forward_pe: snapshot.forward_pe.unwrap_or(0.0),
            ps_ratio: snapshot.ps_ratio.unwrap_or(0.0),
            revenue: snapshot.revenue.unwrap_or(0.0),
            revenue_growth: snapshot.revenue_growth.unwrap_or(0.0),
            earnings_growth: snapshot.earnings_growth.unwrap_or(0.0),
            market_cap,
            profit_margin: snapshot.profit_margin.unwrap_or(0.0),
            shares_outstanding,
        }
    }

    /// Upside % and annualized return % of a target versus the current price
    fn returns_vs_price(&self, target_price: f64, years: u32) -> (f64, f64) {
        if self.current_price <= 0.0 {
            return (0.0, 0.0);
        }
        let ratio = target_price / self.current_price;
        let upside = (ratio - 1.0) * 100.0;
        let annual = (ratio.powf(1.0 / years as f64) - 1.0) * 100.0;
        (upside, annual)
    }

    /// Project a base value forward with multiplicatively decaying growth.
    ///
    /// The decay floor is capped at the initial growth rate so a flat or
    /// negative growth assumption is never silently pulled up to 3%.
    fn project_with_decay(base: f64, growth_rate: f64, growth_decay: f64, years: u32) -> Vec<f64> {
        let floor = growth_rate.min(0.03);
        let mut projections = vec![base];
        let mut current_growth = growth_rate;
        for _ in 1..=years {
            let next = projections.last().unwrap() * (1.0 + current_growth);
            projections.push(next);
            current_growth = (current_growth * (1.0 - growth_decay)).max(floor);
        }
        projections
    }

    /// Earnings-based valuation: project EPS with decaying growth and apply
    /// a terminal P/E. Error-result when the company has no positive EPS.
    pub fn earnings_growth_model(
        &self,
        growth_rate: Option<f64>,
        growth_decay: f64,
        terminal_pe: Option<f64>,
        years: u32,
    ) -> ForecastResult {
        let growth_rate = growth_rate.unwrap_or(if self.earnings_growth != 0.0 {
            self.earnings_growth
        } else {
            0.15
        });

        let terminal_pe = terminal_pe.unwrap_or_else(|| {
            let pe = if self.pe_ratio > 0.0 { self.pe_ratio } else { 20.0 };
            pe.min(25.0)
        });

        if self.eps <= 0.0 {
            return ForecastResult::failure(
                "Earnings Growth Model",
                self.current_price,
                years,
                "Company has no positive earnings",
            );
        }

        let projections = Self::project_with_decay(self.eps, growth_rate, growth_decay, years);
        let final_eps = *projections.last().unwrap();
        let target_price = final_eps * terminal_pe;
        let (upside, annual_return) = self.returns_vs_price(target_price, years);

        ForecastResult {
            method: "Earnings Growth Model".to_string(),
            current_price: self.current_price,
            target_price: round2(target_price),
            upside_percent: round2(upside),
            years,
            annual_return: round2(annual_return),
            details: json!({
                "starting_eps": round2(self.eps),
                "ending_eps": round2(final_eps),
                "eps_projections": projections.iter().map(|e| round2(*e)).collect::<Vec<_>>(),
                "initial_growth_rate": round1(growth_rate * 100.0),
                "growth_decay": round1(growth_decay * 100.0),
                "terminal_pe": round1(terminal_pe),
            }),
        }
    }

    /// Revenue-based valuation for growth companies: project revenue with
    /// decaying growth, apply a terminal P/S to reach a target market cap,
    /// and report the implied EPS at a maturity margin.
    pub fn revenue_growth_model(
        &self,
        growth_rate: Option<f64>,
        growth_decay: f64,
        terminal_ps: Option<f64>,
        target_margin: Option<f64>,
        years: u32,
    ) -> ForecastResult {
        let growth_rate = growth_rate.unwrap_or(if self.revenue_growth != 0.0 {
            self.revenue_growth
        } else {
            0.20
        });

        let terminal_ps = terminal_ps.unwrap_or_else(|| {
            let ps = if self.ps_ratio > 0.0 { self.ps_ratio } else { 5.0 };
            ps.min(10.0)
        });

        let target_margin = target_margin.unwrap_or_else(|| {
            let margin = if self.profit_margin != 0.0 {
                self.profit_margin
            } else {
                0.15
            };
            margin.max(0.15)
        });

        if self.revenue <= 0.0 {
            return ForecastResult::failure(
                "Revenue Growth Model",
                self.current_price,
                years,
                "Company has no revenue data",
            );
        }

        let projections = Self::project_with_decay(self.revenue, growth_rate, growth_decay, years);
        let final_revenue = *projections.last().unwrap();

        let target_market_cap = final_revenue * terminal_ps;
        let target_price = if self.shares_outstanding > 0.0 {
            target_market_cap / self.shares_outstanding
        } else {
            0.0
        };

        let (upside, annual_return) = self.returns_vs_price(target_price, years);

        let realized_cagr = (final_revenue / self.revenue).powf(1.0 / years as f64) - 1.0;
        let implied_earnings = final_revenue * target_margin;
        let implied_eps = if self.shares_outstanding > 0.0 {
            implied_earnings / self.shares_outstanding
        } else {
            0.0
        };

        ForecastResult {
            method: "Revenue Growth Model".to_string(),
            current_price: self.current_price,
            target_price: round2(target_price),
            upside_percent: round2(upside),
            years,
            annual_return: round2(annual_return),
            details: json!({
                "starting_revenue": self.revenue,
                "ending_revenue": final_revenue.round(),
                "revenue_cagr": round1(realized_cagr * 100.0),
                "initial_growth_rate": round1(growth_rate * 100.0),
                "growth_decay": round1(growth_decay * 100.0),
                "terminal_ps": round2(terminal_ps),
                "target_margin": round1(target_margin * 100.0),
                "implied_eps": round2(implied_eps),
            }),
        }
    }

    /// Simplified discounted-cash-flow valuation.
    ///
    /// The base FCF is proxied from earnings (80% of net income) or, for
    /// unprofitable companies, 5% of revenue; error-result when neither
    /// proxy is available.
    pub fn dcf_model(
        &self,
        fcf_growth: f64,
        discount_rate: f64,
        terminal_growth: f64,
        years: u32,
    ) -> ForecastResult {
        let base_fcf = if self.eps > 0.0 && self.shares_outstanding > 0.0 {
            let net_income = self.eps * self.shares_outstanding;
            net_income * 0.8
        } else if self.revenue > 0.0 {
            self.revenue * 0.05
        } else {
            return ForecastResult::failure(
                "DCF Model",
                self.current_price,
                years,
                "Insufficient data for DCF analysis",
            );
        };

        let fcf_projections: Vec<f64> = (1..=years)
            .map(|year| base_fcf * (1.0 + fcf_growth).powi(year as i32))
            .collect();

        let pv_fcf: f64 = fcf_projections
            .iter()
            .enumerate()
            .map(|(i, fcf)| fcf / (1.0 + discount_rate).powi(i as i32 + 1))
            .sum();

        let terminal_fcf = fcf_projections.last().unwrap() * (1.0 + terminal_growth);
        let terminal_value = terminal_fcf / (discount_rate - terminal_growth);
        let pv_terminal = terminal_value / (1.0 + discount_rate).powi(years as i32);

        let intrinsic_value = pv_fcf + pv_terminal;
        let target_price = if self.shares_outstanding > 0.0 {
            intrinsic_value / self.shares_outstanding
        } else {
            0.0
        };

        let (upside, annual_return) = self.returns_vs_price(target_price, years);

        ForecastResult {
            method: "DCF Model".to_string(),
            current_price: self.current_price,
            target_price: round2(target_price),
            upside_percent: round2(upside),
            years,
            annual_return: round2(annual_return),
            details: json!({
                "base_fcf": round2(base_fcf / 1e9),
                "fcf_growth": round1(fcf_growth * 100.0),
                "discount_rate": round1(discount_rate * 100.0),
                "terminal_growth": round1(terminal_growth * 100.0),
                "pv_fcf": round2(pv_fcf / 1e9),
                "terminal_value": round2(terminal_value / 1e9),
                "pv_terminal": round2(pv_terminal / 1e9),
                "intrinsic_value": round2(intrinsic_value / 1e9),
            }),
        }
    }

    /// Probabilistic forecast over geometric daily price paths.
    ///
    /// The default drift comes from the growth rates, capped at 25%
    /// (earnings-based) or 20% (0.7x revenue growth), with an 8% floor
    /// when no growth data exists. Runs on a fixed seed; see
    /// [`crate::monte_carlo::MC_BASE_SEED`].
    pub fn monte_carlo_simulation(
        &self,
        expected_return: Option<f64>,
        volatility: f64,
        years: u32,
        simulations: u32,
    ) -> MonteCarloOutcome {
        let expected_return = expected_return.unwrap_or_else(|| {
            if self.earnings_growth > 0.0 {
                self.earnings_growth.min(0.25)
            } else if self.revenue_growth > 0.0 {
                (self.revenue_growth * 0.7).min(0.20)
            } else {
                0.08
            }
        });

        if self.current_price <= 0.0 {
            return MonteCarloOutcome::failure(
                self.current_price,
                years,
                "No current price available",
            );
        }

        let mut final_prices = simulate_terminal_prices(
            self.current_price,
            expected_return,
            volatility,
            years,
            simulations,
        );
        final_prices.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let percentiles = PricePercentiles {
            p10: round2(percentile(&final_prices, 10.0)),
            p25: round2(percentile(&final_prices, 25.0)),
            p50: round2(percentile(&final_prices, 50.0)),
            p75: round2(percentile(&final_prices, 75.0)),
            p90: round2(percentile(&final_prices, 90.0)),
        };

        let n = final_prices.len() as f64;
        let fraction_at_least =
            |multiple: f64| final_prices.iter().filter(|&&p| p >= self.current_price * multiple).count() as f64 / n;
        let fraction_at_most =
            |multiple: f64| final_prices.iter().filter(|&&p| p <= self.current_price * multiple).count() as f64 / n;

        let probabilities = OutcomeProbabilities {
            profit: round1(fraction_at_least(1.0) * 100.0),
            up_50_percent: round1(fraction_at_least(1.5) * 100.0),
            double: round1(fraction_at_least(2.0) * 100.0),
            down_50_percent: round1(fraction_at_most(0.5) * 100.0),
        };

        let mut hist = histogram(&final_prices, 20);
        hist.bins = hist.bins.iter().map(|b| round2(*b)).collect();

        MonteCarloOutcome {
            method: "Monte Carlo Simulation".to_string(),
            current_price: self.current_price,
            years,
            simulations,
            expected_return: round1(expected_return * 100.0),
            volatility: round1(volatility * 100.0),
            median_target: Some(percentiles.p50),
            median_upside: Some(round2((percentiles.p50 / self.current_price - 1.0) * 100.0)),
            percentiles: Some(percentiles),
            probabilities: Some(probabilities),
            histogram: Some(hist),
            error: None,
        }
    }

    fn earnings_scenario(&self, growth: f64, pe: f64, years: u32) -> ScenarioCase {
        let final_eps = self.eps * (1.0 + growth).powi(years as i32);
        let target = final_eps * pe;
        let (upside, _) = self.returns_vs_price(target, years);

        ScenarioCase {
            target_price: round2(target),
            upside_percent: round2(upside),
            growth_rate: round1(growth * 100.0),
            terminal_pe: Some(round1(pe)),
            terminal_ps: None,
            final_eps: Some(round2(final_eps)),
        }
    }

    fn revenue_scenario(&self, growth: f64, ps: f64, years: u32) -> ScenarioCase {
        let final_revenue = self.revenue * (1.0 + growth).powi(years as i32);
        let target_mcap = final_revenue * ps;
        let target = if self.shares_outstanding > 0.0 {
            target_mcap / self.shares_outstanding
        } else {
            0.0
        };
        let (upside, _) = self.returns_vs_price(target, years);

        ScenarioCase {
            target_price: round2(target),
            upside_percent: round2(upside),
            growth_rate: round1(growth * 100.0),
            terminal_pe: None,
            terminal_ps: Some(round1(ps)),
            final_eps: None,
        }
    }

    /// Bear/base/bull cases: earnings-multiple when the company earns,
    /// revenue-multiple with fixed terminal P/S otherwise.
    pub fn scenario_analysis(&self, years: u32) -> ScenarioAnalysis {
        let (bear, base, bull) = if self.eps > 0.0 {
            let base_growth = if self.earnings_growth != 0.0 {
                self.earnings_growth
            } else {
                0.12
            }
            .clamp(0.05, 0.30);

            let pe_ref = if self.pe_ratio > 0.0 { self.pe_ratio } else { 20.0 };
            let base_pe = if self.pe_ratio > 0.0 { self.pe_ratio } else { 18.0 };

            (
                self.earnings_scenario(base_growth * 0.5, pe_ref * 0.7, years),
                self.earnings_scenario(base_growth, base_pe, years),
                self.earnings_scenario(base_growth * 1.5, pe_ref * 1.2, years),
            )
        } else {
            let base_growth = if self.revenue_growth != 0.0 {
                self.revenue_growth
            } else {
                0.20
            };

            (
                self.revenue_scenario(base_growth * 0.5, 2.0, years),
                self.revenue_scenario(base_growth, 5.0, years),
                self.revenue_scenario(base_growth * 1.3, 8.0, years),
            )
        };

        ScenarioAnalysis {
            method: "Scenario Analysis".to_string(),
            current_price: self.current_price,
            years,
            bear,
            base,
            bull,
        }
    }

    /// All models with default parameters.
    pub fn run_all_models(&self, years: u32) -> ForecastSuite {
        ForecastSuite {
            ticker: self.ticker.clone(),
            company_name: self.company_name.clone(),
            current_price: self.current_price,
            earnings_model: self.earnings_growth_model(None, 0.1, None, years),
            revenue_model: self.revenue_growth_model(None, 0.15, None, None, years),
            dcf_model: self.dcf_model(0.10, 0.10, 0.03, 10),
            monte_carlo: self.monte_carlo_simulation(None, 0.30, years, 1000),
            scenarios: self.scenario_analysis(years),
        }
    }
}
