use analysis_core::{PivotPoints, PriceBar, SupportResistance};

/// Raw local extremes from a windowed scan of the bar series.
///
/// A high is a resistance point when it is the maximum within its
/// `±window` neighborhood; a low is a support point when it is the
/// neighborhood minimum. Only interior bars (a full window on both sides)
/// are considered.
pub fn find_level_points(bars: &[PriceBar], window: usize) -> (Vec<f64>, Vec<f64>) {
    let mut support_points = Vec::new();
    let mut resistance_points = Vec::new();

    if bars.len() < window * 2 {
        return (support_points, resistance_points);
    }

    for i in window..bars.len() - window {
        let neighborhood = &bars[i - window..=i + window];

        let max_high = neighborhood
            .iter()
            .map(|b| b.high)
            .fold(f64::NEG_INFINITY, f64::max);
        if bars[i].high == max_high {
            resistance_points.push(bars[i].high);
        }

        let min_low = neighborhood
            .iter()
            .map(|b| b.low)
            .fold(f64::INFINITY, f64::min);
        if bars[i].low == min_low {
            support_points.push(bars[i].low);
        }
    }

    (support_points, resistance_points)
}

/// Greedy left-to-right clustering of sorted levels.
///
/// Adjacent levels within `tolerance` (relative to the last member of the
/// running cluster) merge into a single representative mean, so a price
/// zone tested several times collapses to one level.
pub fn cluster_levels(levels: &[f64], tolerance: f64) -> Vec<f64> {
    if levels.is_empty() {
        return Vec::new();
    }

    let mut sorted = levels.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut clusters = Vec::new();
    let mut current: Vec<f64> = vec![sorted[0]];

    for &level in &sorted[1..] {
        let last = *current.last().unwrap();
        if last != 0.0 && (level - last) / last <= tolerance {
            current.push(level);
        } else {
            clusters.push(current.iter().sum::<f64>() / current.len() as f64);
            current = vec![level];
        }
    }
    clusters.push(current.iter().sum::<f64>() / current.len() as f64);

    clusters
}

/// Support and resistance levels from clustered local extremes.
///
/// Returns the top `num_levels` support levels (the highest clustered
/// lows, closest below a plausible current price) and the bottom
/// `num_levels` resistance levels (the lowest clustered highs). Needs at
/// least `2 * window` bars; fewer yields empty lists.
pub fn support_resistance(bars: &[PriceBar], window: usize, num_levels: usize) -> SupportResistance {
    let (support_points, resistance_points) = find_level_points(bars, window);

    let support_clustered = cluster_levels(&support_points, 0.02);
    let resistance_clustered = cluster_levels(&resistance_points, 0.02);

    let support_levels = support_clustered
        .iter()
        .skip(support_clustered.len().saturating_sub(num_levels))
        .copied()
        .collect();
    let resistance_levels = resistance_clustered.iter().take(num_levels).copied().collect();

    SupportResistance {
        support_levels,
        resistance_levels,
    }
}

/// Classic floor-trader pivots from the latest bar.
pub fn pivot_points(bars: &[PriceBar]) -> Option<PivotPoints> {
    let last = bars.last()?;
    let (high, low, close) = (last.high, last.low, last.close);

    let pivot = (high + low + close) / 3.0;

    Some(PivotPoints {
        pivot,
        r1: 2.0 * pivot - low,
        r2: pivot + (high - low),
        r3: high + 2.0 * (pivot - low),
        s1: 2.0 * pivot - high,
        s2: pivot - (high - low),
        s3: low - 2.0 * (high - pivot),
    })
}
