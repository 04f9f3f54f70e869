use serde::{Deserialize, Serialize};

use crate::spread::{SpreadSummary, YieldSpreads};

/// Severity class used by the dashboard to color a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusClass {
    Danger,
    Warning,
    Caution,
    Normal,
}

/// One rung of a threshold ladder; applies while the value is below
/// `upper_bound`. Ladders are evaluated top-down, so the rungs must be
/// listed in ascending bound order with a final `f64::INFINITY` catch-all.
pub struct Band {
    pub upper_bound: f64,
    pub status: &'static str,
    pub class: StatusClass,
    pub text: &'static str,
}

impl Band {
    const fn new(
        upper_bound: f64,
        status: &'static str,
        class: StatusClass,
        text: &'static str,
    ) -> Self {
        Self {
            upper_bound,
            status,
            class,
            text,
        }
    }
}

/// First rung whose bound exceeds the value; the last rung catches the rest.
pub fn classify(value: f64, bands: &[Band]) -> &Band {
    bands
        .iter()
        .find(|band| value < band.upper_bound)
        .unwrap_or(bands.last().expect("ladder must not be empty"))
}

const SPREAD_10Y2Y_BANDS: &[Band] = &[
    Band::new(
        -0.5,
        "DEEPLY INVERTED",
        StatusClass::Danger,
        "Strong recession warning. Short rates significantly exceed long rates.",
    ),
    Band::new(
        -0.1,
        "INVERTED",
        StatusClass::Danger,
        "Recession warning. Short rates exceed long rates.",
    ),
    Band::new(
        0.0,
        "SLIGHTLY INVERTED",
        StatusClass::Warning,
        "Mild inversion. Heightened recession risk.",
    ),
    Band::new(
        0.25,
        "FLAT",
        StatusClass::Warning,
        "Flat curve signals uncertainty about growth outlook.",
    ),
    Band::new(
        1.0,
        "NORMAL",
        StatusClass::Normal,
        "Normal curve. Healthy economic expectations.",
    ),
    Band::new(
        2.0,
        "STEEP",
        StatusClass::Normal,
        "Steep curve. Strong growth expectations or rising inflation concerns.",
    ),
    Band::new(
        f64::INFINITY,
        "VERY STEEP",
        StatusClass::Warning,
        "Very steep curve. Aggressive monetary easing or inflation fears.",
    ),
];

const SPREAD_10Y3M_BANDS: &[Band] = &[
    Band::new(
        -0.3,
        "DEEPLY INVERTED",
        StatusClass::Danger,
        "Strong recession signal. Very high short-term rates.",
    ),
    Band::new(
        0.0,
        "INVERTED",
        StatusClass::Danger,
        "Recession warning. Short-term rates exceed long-term.",
    ),
    Band::new(
        0.5,
        "FLAT",
        StatusClass::Warning,
        "Compressed spread. Tight monetary policy or growth concerns.",
    ),
    Band::new(
        2.0,
        "NORMAL",
        StatusClass::Normal,
        "Healthy spread. Normal monetary conditions.",
    ),
    Band::new(
        f64::INFINITY,
        "STEEP",
        StatusClass::Normal,
        "Wide spread. Accommodative policy or inflation expectations.",
    ),
];

const SPREAD_30Y5Y_BANDS: &[Band] = &[
    Band::new(
        0.3,
        "FLAT",
        StatusClass::Warning,
        "Long-end compression. Limited long-term growth expectations.",
    ),
    Band::new(
        0.8,
        "NORMAL",
        StatusClass::Normal,
        "Normal long-end spread. Balanced expectations.",
    ),
    Band::new(
        f64::INFINITY,
        "STEEP",
        StatusClass::Normal,
        "Wide long-end spread. Higher term premium or inflation concerns.",
    ),
];

const CREDIT_PERCENTILE_BANDS: &[Band] = &[
    Band::new(
        15.0,
        "Very Tight",
        StatusClass::Warning,
        "Extremely compressed spreads. High risk appetite, complacency. Limited downside protection, elevated risk of widening.",
    ),
    Band::new(
        35.0,
        "Tight",
        StatusClass::Normal,
        "Below average spreads. Investors comfortable with credit risk. Limited margin of safety.",
    ),
    Band::new(
        65.0,
        "Moderate",
        StatusClass::Normal,
        "Average spreads. Balanced risk assessment. Fair compensation for credit risk.",
    ),
    Band::new(
        85.0,
        "Wide",
        StatusClass::Warning,
        "Above average spreads. Rising credit concerns or risk aversion. Better entry point for credit.",
    ),
    Band::new(
        f64::INFINITY,
        "Very Wide",
        StatusClass::Danger,
        "Extremely elevated spreads. Significant credit stress or crisis conditions. Potential value opportunity if fundamental strength exists.",
    ),
];

/// A spread with its ladder classification attached
#[derive(Debug, Clone, Serialize)]
pub struct SpreadInterpretation {
    pub status: &'static str,
    pub status_class: StatusClass,
    pub interpretation: &'static str,
    pub summary: SpreadSummary,
}

/// Interpreted view of the three dashboard spreads
#[derive(Debug, Clone, Serialize)]
pub struct YieldCurveInterpretation {
    pub spread_10y2y: Option<SpreadInterpretation>,
    pub spread_10y3m: Option<SpreadInterpretation>,
    pub spread_30y5y: Option<SpreadInterpretation>,
}

/// Corporate credit spread families tracked on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditSpreadKind {
    CorporateMaster,
    HighYield,
    Bbb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecessionRisk {
    Low,
    Moderate,
    Elevated,
    High,
}

/// Additive recession score from the two recession spreads
#[derive(Debug, Clone, Serialize)]
pub struct RecessionIndicatorSummary {
    pub risk_level: RecessionRisk,
    pub risk_class: StatusClass,
    pub risk_score: u32,
    pub summary: &'static str,
    pub signals: Vec<String>,
}

/// Time window a currency return was measured over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnWindow {
    OneDay,
    OneWeek,
    OneMonth,
    ThreeMonths,
    OneYear,
    MultiYear,
}

impl ReturnWindow {
    /// (stable, large) move thresholds in percent, scaled to the window
    fn thresholds(&self) -> (f64, f64) {
        match self {
            ReturnWindow::OneDay => (0.5, 2.0),
            ReturnWindow::OneWeek => (1.0, 3.0),
            ReturnWindow::OneMonth | ReturnWindow::ThreeMonths => (2.0, 5.0),
            ReturnWindow::OneYear => (5.0, 10.0),
            ReturnWindow::MultiYear => (10.0, 20.0),
        }
    }
}

/// One scored fear/greed component (0-100, 50 = neutral)
#[derive(Debug, Clone, Serialize)]
pub struct FearGreedComponent {
    pub label: &'static str,
    pub score: f64,
    pub value: f64,
}

/// Raw readings the fear/greed composite is scored from
#[derive(Debug, Clone, Copy, Default)]
pub struct FearGreedInputs {
    pub vix: Option<f64>,
    /// VIX3M minus VIX; contango positive, backwardation negative
    pub vix_term_structure: Option<f64>,
    pub high_yield_percentile: Option<f64>,
    /// S&P 500 distance from its 200-day MA, percent
    pub sp500_pct_vs_200dma: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FearGreedIndex {
    pub overall: f64,
    pub status: &'static str,
    pub components: Vec<FearGreedComponent>,
}

/// Interpretation layer over macro readings: maps levels to qualitative
/// status bands via fixed threshold ladders.
pub struct MacroAnalyzer;

impl MacroAnalyzer {
    fn interpret_spread(
        summary: Option<&SpreadSummary>,
        bands: &'static [Band],
    ) -> Option<SpreadInterpretation> {
        let summary = summary?;
        let band = classify(summary.current, bands);
        Some(SpreadInterpretation {
            status: band.status,
            status_class: band.class,
            interpretation: band.text,
            summary: summary.clone(),
        })
    }

    /// Classify each curve spread against its ladder.
    pub fn interpret_yield_curve(spreads: &YieldSpreads) -> YieldCurveInterpretation {
        YieldCurveInterpretation {
            spread_10y2y: Self::interpret_spread(spreads.spread_10y2y.as_ref(), SPREAD_10Y2Y_BANDS),
            spread_10y3m: Self::interpret_spread(spreads.spread_10y3m.as_ref(), SPREAD_10Y3M_BANDS),
            spread_30y5y: Self::interpret_spread(spreads.spread_30y5y.as_ref(), SPREAD_30Y5Y_BANDS),
        }
    }

    /// Credit spread interpretation from its historical percentile, with
    /// per-family context appended at the extremes.
    pub fn interpret_credit_spread(
        kind: CreditSpreadKind,
        percentile: Option<f64>,
    ) -> String {
        let percentile = match percentile {
            Some(p) => p,
            None => return "Data not available".to_string(),
        };

        let band = classify(percentile, CREDIT_PERCENTILE_BANDS);
        let mut interpretation = format!("{} - {}", band.status, band.text);

        match kind {
            CreditSpreadKind::HighYield => {
                if percentile < 35.0 {
                    interpretation.push_str(" High yield particularly vulnerable to widening.");
                } else if percentile > 65.0 {
                    interpretation
                        .push_str(" High yield stress potentially indicating economic weakness.");
                }
            }
            CreditSpreadKind::Bbb => {
                if percentile < 35.0 {
                    interpretation.push_str(
                        " Investment grade spreads leaving little room for deterioration.",
                    );
                } else if percentile > 65.0 {
                    interpretation.push_str(" BBB spreads widening - watch for fallen angels.");
                }
            }
            CreditSpreadKind::CorporateMaster => {}
        }

        interpretation
    }

    /// Classify a currency's move against the dollar over a window.
    pub fn interpret_currency_move(return_pct: Option<f64>, window: ReturnWindow) -> String {
        let return_pct = match return_pct {
            Some(r) => r,
            None => return "Data not available".to_string(),
        };

        let (stable, large) = window.thresholds();
        let magnitude = if return_pct > large {
            "Significant strengthening"
        } else if return_pct > stable {
            "Moderate strengthening"
        } else if return_pct.abs() <= stable {
            "Relatively stable"
        } else if return_pct < -large {
            "Significant weakening"
        } else {
            "Moderate weakening"
        };

        format!("{} vs USD", magnitude)
    }

    /// Recession risk from the two recession spreads: inversion depth
    /// accumulates a score that maps to a risk level.
    pub fn recession_indicator_summary(spreads: &YieldSpreads) -> RecessionIndicatorSummary {
        let mut risk_score = 0u32;
        let mut signals = Vec::new();

        if let Some(spread) = &spreads.spread_10y2y {
            if spread.current < -0.5 {
                risk_score += 3;
                signals.push("10Y-2Y deeply inverted (strong recession signal)".to_string());
            } else if spread.current < 0.0 {
                risk_score += 2;
                signals.push("10Y-2Y inverted (recession warning)".to_string());
            } else if spread.current < 0.25 {
                risk_score += 1;
                signals.push("10Y-2Y very flat (growth concerns)".to_string());
            }
        }

        if let Some(spread) = &spreads.spread_10y3m {
            if spread.current < -0.3 {
                risk_score += 3;
                signals.push("10Y-3M deeply inverted (strong recession signal)".to_string());
            } else if spread.current < 0.0 {
                risk_score += 2;
                signals.push("10Y-3M inverted (recession warning)".to_string());
            }
        }

        let (risk_level, risk_class, summary) = if risk_score >= 5 {
            (
                RecessionRisk::High,
                StatusClass::Danger,
                "Multiple strong recession signals present",
            )
        } else if risk_score >= 3 {
            (
                RecessionRisk::Elevated,
                StatusClass::Warning,
                "Some recession warning signs present",
            )
        } else if risk_score >= 1 {
            (
                RecessionRisk::Moderate,
                StatusClass::Caution,
                "Economic growth concerns but no strong recession signals",
            )
        } else {
            (
                RecessionRisk::Low,
                StatusClass::Normal,
                "Yield curve suggests healthy economic expectations",
            )
        };

        RecessionIndicatorSummary {
            risk_level,
            risk_class,
            risk_score,
            summary,
            signals,
        }
    }

    /// Equal-weighted fear/greed composite from whichever components have
    /// data. `None` when nothing is available.
    pub fn fear_greed_index(inputs: &FearGreedInputs) -> Option<FearGreedIndex> {
        let mut components = Vec::new();

        if let Some(vix) = inputs.vix {
            // VIX 10 scores 100 (extreme greed), 40 scores 0 (extreme fear)
            let score = (100.0 - (vix - 10.0) / 30.0 * 100.0).clamp(0.0, 100.0);
            components.push(FearGreedComponent {
                label: "VIX Level",
                score,
                value: vix,
            });
        }

        if let Some(term) = inputs.vix_term_structure {
            // Contango +5 scores 100, flat 50, backwardation -5 scores 0
            let score = (50.0 + term / 5.0 * 50.0).clamp(0.0, 100.0);
            components.push(FearGreedComponent {
                label: "VIX Term Structure",
                score,
                value: term,
            });
        }

        if let Some(percentile) = inputs.high_yield_percentile {
            // Tight spreads (low percentile) read as greed
            components.push(FearGreedComponent {
                label: "Credit Spreads",
                score: 100.0 - percentile,
                value: percentile,
            });
        }

        if let Some(pct_vs_ma) = inputs.sp500_pct_vs_200dma {
            // +10% above the 200-day MA scores 100, -10% below scores 0
            let score = (50.0 + pct_vs_ma / 10.0 * 50.0).clamp(0.0, 100.0);
            components.push(FearGreedComponent {
                label: "S&P 500 Trend",
                score,
                value: pct_vs_ma,
            });
        }

        if components.is_empty() {
            return None;
        }

        let overall =
            components.iter().map(|c| c.score).sum::<f64>() / components.len() as f64;
        let status = Self::fear_greed_status(overall);

        Some(FearGreedIndex {
            overall,
            status,
            components,
        })
    }

    pub fn fear_greed_status(overall: f64) -> &'static str {
        if overall >= 80.0 {
            "EXTREME GREED"
        } else if overall >= 60.0 {
            "GREED"
        } else if overall >= 40.0 {
            "NEUTRAL"
        } else if overall >= 20.0 {
            "FEAR"
        } else {
            "EXTREME FEAR"
        }
    }
}
