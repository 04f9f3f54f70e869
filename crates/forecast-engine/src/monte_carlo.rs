use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use statrs::distribution::Normal;

use crate::models::PriceHistogram;

/// Fixed base seed: the simulation is deliberately reproducible so two
/// identical invocations produce bit-identical distributions.
pub const MC_BASE_SEED: u64 = 42;

const TRADING_DAYS_PER_YEAR: u32 = 252;

/// Simulate geometric daily price paths and return the terminal prices.
///
/// Each path gets its own `StdRng` seeded from `MC_BASE_SEED` plus the
/// path index, which keeps the rayon fan-out deterministic under any
/// thread schedule. Prices are floored at 0.01 every step.
pub fn simulate_terminal_prices(
    current_price: f64,
    expected_return: f64,
    volatility: f64,
    years: u32,
    simulations: u32,
) -> Vec<f64> {
    let total_days = years * TRADING_DAYS_PER_YEAR;
    let daily_return = expected_return / TRADING_DAYS_PER_YEAR as f64;
    let daily_vol = volatility / (TRADING_DAYS_PER_YEAR as f64).sqrt();

    // Zero or invalid volatility degenerates to a pure-drift walk
    let normal = Normal::new(daily_return, daily_vol).ok();

    (0..simulations)
        .into_par_iter()
        .map(|path| {
            let mut rng = StdRng::seed_from_u64(MC_BASE_SEED.wrapping_add(path as u64));
            let mut price = current_price;
            for _ in 0..total_days {
                let step = match &normal {
                    Some(dist) => dist.sample(&mut rng),
                    None => daily_return,
                };
                price = (price * (1.0 + step)).max(0.01);
            }
            price
        })
        .collect()
}

/// Linear-interpolated percentile over a sorted slice
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (rank - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

/// Equal-width histogram with `bins + 1` edges
pub fn histogram(values: &[f64], bins: usize) -> PriceHistogram {
    if values.is_empty() || bins == 0 {
        return PriceHistogram {
            bins: Vec::new(),
            counts: Vec::new(),
        };
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max <= min {
        return PriceHistogram {
            bins: vec![min, max],
            counts: vec![values.len() as u32],
        };
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0u32; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let edges = (0..=bins).map(|i| min + width * i as f64).collect();

    PriceHistogram {
        bins: edges,
        counts,
    }
}
