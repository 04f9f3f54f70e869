use analysis_core::{PriceBar, TrendAnalysis, TrendDirection};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Ordinary least-squares fit of `y` on a 0-based index.
///
/// Returns (slope, intercept, r_squared, p_value) where the p-value is the
/// two-sided significance of the slope via Student's t with n-2 degrees of
/// freedom.
pub fn linear_regression(y: &[f64]) -> Option<(f64, f64, f64, f64)> {
    let n = y.len();
    if n < 3 {
        return None;
    }

    let nf = n as f64;
    let sum_x: f64 = (0..n).map(|i| i as f64).sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = y.iter().enumerate().map(|(i, v)| i as f64 * v).sum();
    let sum_x2: f64 = (0..n).map(|i| (i as f64).powi(2)).sum();

    let denom = nf * sum_x2 - sum_x * sum_x;
    if denom == 0.0 {
        return None;
    }

    let slope = (nf * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / nf;

    let mean_y = sum_y / nf;
    let ss_tot: f64 = y.iter().map(|v| (v - mean_y).powi(2)).sum();
    let ss_res: f64 = y
        .iter()
        .enumerate()
        .map(|(i, v)| (v - (intercept + slope * i as f64)).powi(2))
        .sum();

    let r_squared = if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    };

    // Two-sided p-value for the slope; a perfect fit pins it to zero
    let p_value = if r_squared >= 1.0 {
        0.0
    } else {
        let t_stat = (r_squared * (nf - 2.0) / (1.0 - r_squared)).sqrt();
        match StudentsT::new(0.0, 1.0, nf - 2.0) {
            Ok(dist) => 2.0 * (1.0 - dist.cdf(t_stat)),
            Err(_) => 1.0,
        }
    };

    Some((slope, intercept, r_squared, p_value))
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Regression trend over the most recent `period_days` bars.
///
/// Projects the fitted line 30 and 90 days past the last bar and reports
/// the implied upside from the last close, plus 20/50-day moving averages
/// when enough of the window exists. Requires at least 10 bars.
pub fn calculate_trend(bars: &[PriceBar], period_days: usize) -> Option<TrendAnalysis> {
    if bars.is_empty() {
        return None;
    }

    let start = bars.len().saturating_sub(period_days);
    let recent = &bars[start..];
    if recent.len() < 10 {
        return None;
    }

    let closes: Vec<f64> = recent.iter().map(|b| b.close).collect();
    let (slope, intercept, r_squared, p_value) = linear_regression(&closes)?;

    let last_index = (closes.len() - 1) as f64;
    let current_price = *closes.last().unwrap();

    let target_30d = intercept + slope * (last_index + 30.0);
    let target_90d = intercept + slope * (last_index + 90.0);

    let direction = if slope > 0.0 {
        TrendDirection::Bullish
    } else {
        TrendDirection::Bearish
    };

    let ma_20 = if closes.len() >= 20 {
        Some(mean(&closes[closes.len() - 20..]))
    } else {
        None
    };
    let ma_50 = if closes.len() >= 50 {
        Some(mean(&closes[closes.len() - 50..]))
    } else {
        None
    };

    Some(TrendAnalysis {
        slope,
        r_squared,
        p_value,
        direction,
        current_price,
        target_30d,
        target_90d,
        upside_30d_percent: (target_30d - current_price) / current_price * 100.0,
        upside_90d_percent: (target_90d - current_price) / current_price * 100.0,
        ma_20,
        ma_50,
    })
}
