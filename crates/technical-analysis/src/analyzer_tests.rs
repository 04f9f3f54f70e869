#[cfg(test)]
mod tests {
    use crate::levels::cluster_levels;
    use crate::TechnicalAnalyzer;
    use analysis_core::{PriceBar, TrendDirection};
    use chrono::{Duration, NaiveDate};

    fn bar(day: i64, low: f64, high: f64, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(day),
            open: close,
            high,
            low,
            close,
            volume: 1_000_000.0,
        }
    }

    /// Two price regimes (~155 then ~105), each with two support dips
    /// within 1% of each other and two resistance spikes. Background lows
    /// drift so flat-tie artifacts cannot register as extremes.
    fn two_regime_bars() -> Vec<PriceBar> {
        let mut bars = Vec::new();
        for i in 0..100i64 {
            let (mut low, mut high, close) = if i < 50 {
                let drift = 0.01 * i as f64;
                (154.0 + drift, 156.0 + drift, 155.0 + drift)
            } else {
                let drift = 0.01 * (i - 50) as f64;
                (105.0 - drift, 106.0 - drift, 105.5 - drift)
            };

            match i {
                15 => low = 150.0,
                35 => low = 150.6,
                65 => low = 100.0,
                85 => low = 100.9,
                25 => high = 160.0,
                42 => high = 160.5,
                70 => high = 110.0,
                88 => high = 110.4,
                _ => {}
            }

            bars.push(bar(i, low, high, close));
        }
        bars
    }

    #[test]
    fn test_cluster_levels_merges_within_tolerance() {
        let clustered = cluster_levels(&[100.0, 100.9, 150.0, 150.6, 100.4], 0.02);
        assert_eq!(clustered.len(), 2);
        assert!((clustered[0] - 100.433).abs() < 0.01);
        assert!((clustered[1] - 150.3).abs() < 0.01);
    }

    #[test]
    fn test_cluster_levels_empty() {
        assert!(cluster_levels(&[], 0.02).is_empty());
    }

    #[test]
    fn test_support_clusters_collapse_to_two_levels() {
        // Six raw dip points in two zones must come back as two levels
        let analyzer = TechnicalAnalyzer::new(two_regime_bars());
        let levels = analyzer.calculate_support_resistance(10, 3);

        assert_eq!(levels.support_levels.len(), 2, "{:?}", levels.support_levels);
        assert!((levels.support_levels[0] - 100.45).abs() < 0.1);
        assert!((levels.support_levels[1] - 150.3).abs() < 0.1);
    }

    #[test]
    fn test_support_resistance_insufficient_bars() {
        let bars: Vec<PriceBar> = (0..30).map(|i| bar(i, 99.0, 101.0, 100.0)).collect();
        let analyzer = TechnicalAnalyzer::new(bars);
        let levels = analyzer.calculate_support_resistance(20, 3);

        assert!(levels.support_levels.is_empty());
        assert!(levels.resistance_levels.is_empty());
    }

    #[test]
    fn test_pivot_points_from_latest_bar() {
        let bars = vec![bar(0, 95.0, 105.0, 101.0), bar(1, 90.0, 110.0, 100.0)];
        let analyzer = TechnicalAnalyzer::new(bars);
        let pivots = analyzer.calculate_pivot_points().unwrap();

        assert!((pivots.pivot - 100.0).abs() < 1e-9);
        assert!((pivots.r1 - 110.0).abs() < 1e-9);
        assert!((pivots.s1 - 90.0).abs() < 1e-9);
        assert!((pivots.r2 - 120.0).abs() < 1e-9);
        assert!((pivots.s2 - 80.0).abs() < 1e-9);
        assert!((pivots.r3 - 130.0).abs() < 1e-9);
        assert!((pivots.s3 - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_pivot_points_empty() {
        let analyzer = TechnicalAnalyzer::new(Vec::new());
        assert!(analyzer.calculate_pivot_points().is_none());
    }

    #[test]
    fn test_trend_on_linear_series() {
        let bars: Vec<PriceBar> = (0..30)
            .map(|i| {
                let price = 100.0 + i as f64;
                bar(i, price - 1.0, price + 1.0, price)
            })
            .collect();
        let analyzer = TechnicalAnalyzer::new(bars);
        let trend = analyzer.calculate_trend(90).unwrap();

        assert!((trend.slope - 1.0).abs() < 1e-9);
        assert!((trend.r_squared - 1.0).abs() < 1e-9);
        assert!(trend.p_value < 1e-6);
        assert_eq!(trend.direction, TrendDirection::Bullish);
        // Fitted line extended 30 days past the last index
        assert!((trend.target_30d - 159.0).abs() < 1e-6);
        assert!((trend.target_90d - 219.0).abs() < 1e-6);
        assert!((trend.upside_30d_percent - 30.0 / 129.0 * 100.0).abs() < 1e-6);
        assert!((trend.ma_20.unwrap() - 119.5).abs() < 1e-9);
        assert!(trend.ma_50.is_none());
    }

    #[test]
    fn test_trend_bearish_direction() {
        let bars: Vec<PriceBar> = (0..20)
            .map(|i| {
                let price = 200.0 - 2.0 * i as f64;
                bar(i, price - 1.0, price + 1.0, price)
            })
            .collect();
        let analyzer = TechnicalAnalyzer::new(bars);
        let trend = analyzer.calculate_trend(90).unwrap();

        assert_eq!(trend.direction, TrendDirection::Bearish);
        assert!(trend.target_30d < trend.current_price);
    }

    #[test]
    fn test_trend_insufficient_bars() {
        let bars: Vec<PriceBar> = (0..9).map(|i| bar(i, 99.0, 101.0, 100.0)).collect();
        let analyzer = TechnicalAnalyzer::new(bars);
        assert!(analyzer.calculate_trend(90).is_none());
    }

    #[test]
    fn test_price_targets_straddle_current_price() {
        let analyzer = TechnicalAnalyzer::new(two_regime_bars());
        let targets = analyzer.calculate_support_resistance_targets(120.0);

        let resistance = targets.next_resistance.unwrap();
        let support = targets.next_support.unwrap();
        assert!(resistance > 120.0);
        assert!(support < 120.0);
        assert!(targets.upside_to_resistance.unwrap() > 0.0);
        assert!(targets.downside_to_support.unwrap() > 0.0);
    }

    #[test]
    fn test_all_indicators_degrade_independently() {
        // 12 bars: enough for pivots and trend, not for 20-bar level scans
        let bars: Vec<PriceBar> = (0..12)
            .map(|i| {
                let price = 100.0 + i as f64;
                bar(i, price - 1.0, price + 1.0, price)
            })
            .collect();
        let analyzer = TechnicalAnalyzer::new(bars);
        let indicators = analyzer.calculate_all_indicators(111.0);

        assert!(indicators.support_levels.is_empty());
        assert!(indicators.pivot_points.is_some());
        assert!(indicators.trend.is_some());
        assert_eq!(indicators.data_points, 12);
    }

    #[test]
    fn test_snapshot_carries_trend_fields() {
        let analyzer = TechnicalAnalyzer::new(two_regime_bars());
        let snapshot = analyzer.snapshot("TEST", 105.0);

        assert_eq!(snapshot.ticker, "TEST");
        // At the default 20-bar window only the deepest dip survives as an
        // interior extreme
        assert_eq!(snapshot.support_levels.len(), 1);
        assert!((snapshot.support_levels[0] - 100.0).abs() < 1e-9);
        assert!(snapshot.pivot_points.is_some());
        assert!(snapshot.trend_slope.is_some());
        assert!(snapshot.trend_target_30d.is_some());
        assert_eq!(snapshot.data_points, 100);
    }
}
