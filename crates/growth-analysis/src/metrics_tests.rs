#[cfg(test)]
mod tests {
    use crate::GrowthAnalyzer;
    use analysis_core::{FinancialMetric, FinancialRecord, GrowthStage, MarginTrend, PeriodType};
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn annual(date: &str, revenue: Option<f64>, earnings: Option<f64>) -> FinancialRecord {
        let mut r = FinancialRecord::new("TEST", d(date), PeriodType::Annual);
        r.revenue = revenue;
        r.earnings = earnings;
        r
    }

    fn quarterly(date: &str, revenue: Option<f64>, net_income: Option<f64>) -> FinancialRecord {
        let mut r = FinancialRecord::new("TEST", d(date), PeriodType::Quarterly);
        r.revenue = revenue;
        r.earnings = net_income;
        r.net_income = net_income;
        r
    }

    /// Quarterly series growing at a fixed rate per quarter, newest last
    fn growing_quarters(start: f64, rate: f64, count: usize) -> Vec<FinancialRecord> {
        let dates = [
            "2022-03-31",
            "2022-06-30",
            "2022-09-30",
            "2022-12-31",
            "2023-03-31",
            "2023-06-30",
            "2023-09-30",
            "2023-12-31",
            "2024-03-31",
            "2024-06-30",
            "2024-09-30",
            "2024-12-31",
        ];
        let mut value = start;
        let mut records = Vec::new();
        for date in dates.iter().take(count) {
            records.push(quarterly(date, Some(value), Some(value * 0.2)));
            value *= 1.0 + rate;
        }
        records
    }

    #[test]
    fn test_cagr_two_points_three_years() {
        let analyzer = GrowthAnalyzer::new(vec![
            annual("2020-12-31", Some(100.0), None),
            annual("2023-12-31", Some(200.0), None),
        ]);

        let cagr = analyzer
            .calculate_cagr(FinancialMetric::Revenue, 3)
            .unwrap();
        // (200/100)^(1/3) - 1, with the exponent over the true elapsed span
        assert!((cagr - 0.2599).abs() < 0.002, "got {}", cagr);
    }

    #[test]
    fn test_cagr_uses_actual_elapsed_span() {
        // Nominal window is 5 years but only ~2 years of data exist;
        // the exponent must use the real span, not the parameter.
        let analyzer = GrowthAnalyzer::new(vec![
            annual("2021-12-31", Some(100.0), None),
            annual("2023-12-31", Some(121.0), None),
        ]);

        let cagr = analyzer
            .calculate_cagr(FinancialMetric::Revenue, 5)
            .unwrap();
        assert!((cagr - 0.10).abs() < 0.005, "got {}", cagr);
    }

    #[test]
    fn test_cagr_insufficient_points() {
        let analyzer = GrowthAnalyzer::new(vec![annual("2023-12-31", Some(100.0), None)]);
        assert!(analyzer.calculate_cagr(FinancialMetric::Revenue, 3).is_none());
    }

    #[test]
    fn test_cagr_zero_values_excluded() {
        // Zero rows are treated as missing, leaving a single qualifying point
        let analyzer = GrowthAnalyzer::new(vec![
            annual("2021-12-31", Some(0.0), None),
            annual("2023-12-31", Some(200.0), None),
        ]);
        assert!(analyzer.calculate_cagr(FinancialMetric::Revenue, 3).is_none());
    }

    #[test]
    fn test_cagr_span_under_half_year() {
        let analyzer = GrowthAnalyzer::new(vec![
            annual("2023-10-31", Some(100.0), None),
            annual("2023-12-31", Some(120.0), None),
        ]);
        assert!(analyzer.calculate_cagr(FinancialMetric::Revenue, 3).is_none());
    }

    #[test]
    fn test_cagr_negative_start() {
        let analyzer = GrowthAnalyzer::new(vec![
            annual("2020-12-31", None, Some(-50.0)),
            annual("2023-12-31", None, Some(80.0)),
        ]);
        assert!(analyzer.calculate_cagr(FinancialMetric::Earnings, 3).is_none());
    }

    #[test]
    fn test_cagr_ignores_quarterly_rows() {
        let mut records = growing_quarters(100.0, 0.10, 8);
        records.push(annual("2023-12-31", Some(1000.0), None));
        let analyzer = GrowthAnalyzer::new(records);

        // Only one annual point exists, so no CAGR despite plenty of quarters
        assert!(analyzer.calculate_cagr(FinancialMetric::Revenue, 3).is_none());
    }

    #[test]
    fn test_average_quarterly_growth() {
        let analyzer = GrowthAnalyzer::new(growing_quarters(100.0, 0.10, 5));
        let growth = analyzer
            .calculate_average_quarterly_growth(FinancialMetric::Revenue, 8)
            .unwrap();
        assert!((growth - 0.10).abs() < 1e-9, "got {}", growth);
    }

    #[test]
    fn test_average_quarterly_growth_no_valid_pairs() {
        // Every prior value non-positive, so no pair qualifies
        let analyzer = GrowthAnalyzer::new(vec![
            quarterly("2023-09-30", None, Some(-5.0)),
            quarterly("2023-12-31", None, Some(-3.0)),
        ]);
        assert!(analyzer
            .calculate_average_quarterly_growth(FinancialMetric::Earnings, 8)
            .is_none());
    }

    #[test]
    fn test_consistency_score_bounds() {
        let analyzer = GrowthAnalyzer::new(growing_quarters(100.0, 0.10, 8));
        let score = analyzer.calculate_consistency_score(FinancialMetric::Revenue, 12);
        assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn test_consistency_score_monotonic_growth() {
        // Strictly increasing positive growth: full positive score, full
        // average-growth score, and near-zero CV
        let analyzer = GrowthAnalyzer::new(growing_quarters(100.0, 0.10, 12));
        let score = analyzer.calculate_consistency_score(FinancialMetric::Revenue, 12);
        assert!(score > 80.0, "got {}", score);
    }

    #[test]
    fn test_consistency_score_too_few_quarters() {
        let analyzer = GrowthAnalyzer::new(growing_quarters(100.0, 0.10, 2));
        assert_eq!(
            analyzer.calculate_consistency_score(FinancialMetric::Revenue, 12),
            0.0
        );
    }

    #[test]
    fn test_consistency_score_volatile_series() {
        let values = [100.0, 140.0, 90.0, 150.0, 85.0, 160.0, 80.0, 170.0];
        let dates = [
            "2022-03-31",
            "2022-06-30",
            "2022-09-30",
            "2022-12-31",
            "2023-03-31",
            "2023-06-30",
            "2023-09-30",
            "2023-12-31",
        ];
        let records: Vec<_> = values
            .iter()
            .zip(dates.iter())
            .map(|(v, date)| quarterly(date, Some(*v), Some(*v)))
            .collect();
        let analyzer = GrowthAnalyzer::new(records);

        let volatile = analyzer.calculate_consistency_score(FinancialMetric::Revenue, 12);
        let steady = GrowthAnalyzer::new(growing_quarters(100.0, 0.10, 8))
            .calculate_consistency_score(FinancialMetric::Revenue, 12);
        assert!(volatile < steady);
    }

    #[test]
    fn test_acceleration_turnaround() {
        // Declining history, positive recent quarters: historical average
        // is negative, so any positive recent growth counts as accelerating
        let values = [100.0, 80.0, 64.0, 51.2, 56.3, 62.0, 68.2, 75.0];
        let dates = [
            "2022-03-31",
            "2022-06-30",
            "2022-09-30",
            "2022-12-31",
            "2023-03-31",
            "2023-06-30",
            "2023-09-30",
            "2023-12-31",
        ];
        let records: Vec<_> = values
            .iter()
            .zip(dates.iter())
            .map(|(v, date)| quarterly(date, Some(*v), Some(*v)))
            .collect();
        let analyzer = GrowthAnalyzer::new(records);

        assert!(analyzer.detect_growth_acceleration(FinancialMetric::Revenue));
    }

    #[test]
    fn test_acceleration_decelerating_series() {
        // Strong early growth fading out: recent < historical
        let values = [100.0, 130.0, 169.0, 219.7, 285.6, 291.3, 297.1, 300.0];
        let dates = [
            "2022-03-31",
            "2022-06-30",
            "2022-09-30",
            "2022-12-31",
            "2023-03-31",
            "2023-06-30",
            "2023-09-30",
            "2023-12-31",
        ];
        let records: Vec<_> = values
            .iter()
            .zip(dates.iter())
            .map(|(v, date)| quarterly(date, Some(*v), Some(*v)))
            .collect();
        let analyzer = GrowthAnalyzer::new(records);

        assert!(!analyzer.detect_growth_acceleration(FinancialMetric::Revenue));
    }

    #[test]
    fn test_acceleration_requires_six_quarters() {
        let analyzer = GrowthAnalyzer::new(growing_quarters(100.0, 0.50, 5));
        assert!(!analyzer.detect_growth_acceleration(FinancialMetric::Revenue));
    }

    #[test]
    fn test_acceleration_baseline_overlaps_recent_window() {
        // The historical baseline includes the recent four quarters, which
        // biases short histories toward acceleration: a pickup in the last
        // four quarters drags the baseline up with it, yet still clears the
        // 1.05 margin here. Preserved observed behavior, not a target.
        let values = [100.0, 102.0, 104.0, 106.1, 116.7, 128.4, 141.2, 155.4];
        let dates = [
            "2022-03-31",
            "2022-06-30",
            "2022-09-30",
            "2022-12-31",
            "2023-03-31",
            "2023-06-30",
            "2023-09-30",
            "2023-12-31",
        ];
        let records: Vec<_> = values
            .iter()
            .zip(dates.iter())
            .map(|(v, date)| quarterly(date, Some(*v), Some(*v)))
            .collect();
        let analyzer = GrowthAnalyzer::new(records);

        assert!(analyzer.detect_growth_acceleration(FinancialMetric::Revenue));
    }

    #[test]
    fn test_consecutive_profitable_quarters() {
        let records = vec![
            quarterly("2023-03-31", Some(100.0), Some(-2.0)),
            quarterly("2023-06-30", Some(110.0), Some(5.0)),
            quarterly("2023-09-30", Some(121.0), Some(8.0)),
            quarterly("2023-12-31", Some(133.0), Some(12.0)),
        ];
        let analyzer = GrowthAnalyzer::new(records);
        assert_eq!(analyzer.count_consecutive_profitable_quarters(), 3);
    }

    #[test]
    fn test_consecutive_profitable_stops_on_missing() {
        let records = vec![
            quarterly("2023-06-30", Some(110.0), None),
            quarterly("2023-09-30", Some(121.0), Some(8.0)),
            quarterly("2023-12-31", Some(133.0), Some(12.0)),
        ];
        let analyzer = GrowthAnalyzer::new(records);
        assert_eq!(analyzer.count_consecutive_profitable_quarters(), 2);
    }

    #[test]
    fn test_peg_rejects_non_positive_pe() {
        let analyzer = GrowthAnalyzer::new(growing_quarters(100.0, 0.10, 8));

        let zero = analyzer.calculate_peg_ratio(Some(0.0));
        assert!(zero.peg_3y_cagr.is_none());
        assert!(zero.peg_quarterly.is_none());
        assert!(zero.peg_average.is_none());

        let negative = analyzer.calculate_peg_ratio(Some(-5.0));
        assert!(negative.peg_average.is_none());
    }

    #[test]
    fn test_peg_from_quarterly_growth() {
        let analyzer = GrowthAnalyzer::new(growing_quarters(100.0, 0.10, 8));
        let pegs = analyzer.calculate_peg_ratio(Some(30.0));

        // No annual rows, so only the quarterly variant exists:
        // annualized growth = 1.1^4 - 1 = 46.41%
        assert!(pegs.peg_3y_cagr.is_none());
        let peg_q = pegs.peg_quarterly.unwrap();
        assert!((peg_q - 30.0 / 46.41).abs() < 0.01, "got {}", peg_q);
        assert_eq!(pegs.peg_average, pegs.peg_quarterly);
    }

    #[test]
    fn test_apply_external_peg_recomputes_average() {
        let analyzer = GrowthAnalyzer::new(growing_quarters(100.0, 0.10, 8));
        let mut metrics = analyzer.calculate_all_metrics(None, None).unwrap();

        analyzer.apply_peg_ratios(&mut metrics, Some(30.0), Some(0.25));

        let external = metrics.peg_external.unwrap();
        assert!((external - 30.0 / 25.0).abs() < 1e-9);

        let expected_avg = (metrics.peg_quarterly.unwrap() + external) / 2.0;
        assert!((metrics.peg_average.unwrap() - expected_avg).abs() < 1e-9);
    }

    #[test]
    fn test_fcf_metrics_from_snapshot() {
        let records = growing_quarters(100.0, 0.10, 8);
        // Latest quarter net income drives the cash conversion ratio
        let last_ni = records.last().unwrap().net_income.unwrap();
        let analyzer = GrowthAnalyzer::new(records);

        let fcf = analyzer.calculate_fcf_metrics(Some(50.0), Some(500.0));
        assert!((fcf.fcf_margin.unwrap() - 0.10).abs() < 1e-9);
        assert!((fcf.cash_conversion_ratio.unwrap() - 50.0 / last_ni).abs() < 1e-9);
        assert!(fcf.fcf_cagr_3y.is_none()); // no annual FCF history
    }

    #[test]
    fn test_rule_of_40() {
        assert_eq!(
            GrowthAnalyzer::calculate_rule_of_40(Some(0.25), Some(0.18)),
            Some(43.0)
        );
        assert!(GrowthAnalyzer::calculate_rule_of_40(None, Some(0.18)).is_none());
        assert!(GrowthAnalyzer::calculate_rule_of_40(Some(0.25), None).is_none());
    }

    #[test]
    fn test_operating_leverage() {
        // Earnings growing faster than revenue
        let dates = [
            "2023-03-31",
            "2023-06-30",
            "2023-09-30",
            "2023-12-31",
        ];
        let mut records = Vec::new();
        let mut revenue = 100.0;
        let mut earnings = 10.0;
        for date in dates {
            records.push(quarterly(date, Some(revenue), Some(earnings)));
            revenue *= 1.10;
            earnings *= 1.20;
        }
        let analyzer = GrowthAnalyzer::new(records);

        let leverage = analyzer.calculate_operating_leverage().unwrap();
        assert!((leverage - 2.0).abs() < 0.01, "got {}", leverage);
    }

    #[test]
    fn test_margin_trend_requires_four_quarters() {
        let mut records = growing_quarters(100.0, 0.10, 3);
        for r in &mut records {
            r.profit_margin_quarterly = Some(0.15);
        }
        let analyzer = GrowthAnalyzer::new(records);
        assert!(analyzer.calculate_margin_trend().is_none());
    }

    #[test]
    fn test_margin_trend_expanding() {
        let margins = [0.10, 0.10, 0.10, 0.10, 0.14, 0.14, 0.14, 0.14];
        let mut records = growing_quarters(100.0, 0.10, 8);
        for (r, m) in records.iter_mut().zip(margins.iter()) {
            r.profit_margin_quarterly = Some(*m);
        }
        let analyzer = GrowthAnalyzer::new(records);
        assert_eq!(analyzer.calculate_margin_trend(), Some(MarginTrend::Expanding));
    }

    #[test]
    fn test_margin_trend_stable() {
        let mut records = growing_quarters(100.0, 0.10, 8);
        for r in &mut records {
            r.profit_margin_quarterly = Some(0.15);
        }
        let analyzer = GrowthAnalyzer::new(records);
        assert_eq!(analyzer.calculate_margin_trend(), Some(MarginTrend::Stable));
    }

    #[test]
    fn test_growth_stage_early_growth() {
        let mut records = vec![
            annual("2020-12-31", Some(100.0), Some(100.0)),
            annual("2023-12-31", Some(500.0), Some(500.0)),
        ];
        records.extend(growing_quarters(100.0, 0.10, 4));
        for r in &mut records {
            if r.period_type == PeriodType::Quarterly {
                r.profit_margin_quarterly = Some(0.05);
            }
        }
        let analyzer = GrowthAnalyzer::new(records);
        let metrics = analyzer.calculate_all_metrics(None, None).unwrap();

        // >50% CAGR with sub-10% margins
        assert_eq!(metrics.growth_stage, Some(GrowthStage::EarlyGrowth));
    }

    #[test]
    fn test_growth_stage_declining() {
        let records = vec![
            annual("2020-12-31", Some(500.0), Some(500.0)),
            annual("2023-12-31", Some(300.0), Some(300.0)),
        ];
        let analyzer = GrowthAnalyzer::new(records);
        let metrics = analyzer.calculate_all_metrics(None, None).unwrap();

        assert_eq!(metrics.growth_stage, Some(GrowthStage::Declining));
    }

    #[test]
    fn test_growth_stage_unavailable_without_cagr() {
        let analyzer = GrowthAnalyzer::new(growing_quarters(100.0, 0.10, 4));
        let metrics = analyzer.calculate_all_metrics(None, None).unwrap();
        assert!(metrics.growth_stage.is_none());
    }

    #[test]
    fn test_all_metrics_empty_history() {
        let analyzer = GrowthAnalyzer::new(Vec::new());
        assert!(analyzer.calculate_all_metrics(None, None).is_none());
    }

    #[test]
    fn test_steady_grower_end_to_end() {
        // 10% QoQ growth each quarter with matching positive net income:
        // steady, not accelerating, and near the top of the consistency scale
        let records = vec![
            quarterly("2023-03-31", Some(100.0), Some(10.0)),
            quarterly("2023-06-30", Some(110.0), Some(11.0)),
            quarterly("2023-09-30", Some(121.0), Some(12.1)),
            quarterly("2023-12-31", Some(133.1), Some(13.31)),
        ];
        let analyzer = GrowthAnalyzer::new(records);
        let metrics = analyzer.calculate_all_metrics(None, None).unwrap();

        assert!(!metrics.revenue_growth_accelerating);
        assert!(metrics.revenue_consistency_score > 95.0);
        assert_eq!(metrics.consecutive_profitable_quarters, 4);
        assert_eq!(metrics.data_points_count, 4);
        assert_eq!(metrics.oldest_data_date, Some(d("2023-03-31")));
        assert_eq!(metrics.newest_data_date, Some(d("2023-12-31")));
    }
}
