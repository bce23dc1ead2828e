use stock_ai::indicators::{
    build_report, compute_indicators, rsi, sma, IndicatorParams, PricePoint, PriceSeries,
    RsiZone, Signal,
};
use stock_ai::AnalysisError;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes("TEST.NS", start(), closes)
    }

    #[test]
    fn test_short_series_is_insufficient() {
        let params = IndicatorParams::default();
        for n in [0usize, 1, 15, 21, 29] {
            let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
            let err = compute_indicators(&series(&closes), &params).unwrap_err();
            assert_eq!(err, AnalysisError::InsufficientData { required: 30, available: n });
        }
    }

    #[test]
    fn test_thirty_points_is_enough() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 3) as f64).collect();
        assert!(compute_indicators(&series(&closes), &IndicatorParams::default()).is_ok());
    }

    #[test]
    fn test_constant_series_is_neutral_hold() {
        for price in [0.1, 0.3, 0.7, 2.3, 19.9, 245.35, 1234.56] {
            let closes = vec![price; 45];
            let (out, signal) =
                compute_indicators(&series(&closes), &IndicatorParams::default()).unwrap();

            for (i, value) in out.sma.iter().enumerate() {
                match value {
                    Some(v) => assert_eq!(*v, price, "sma at {} for price {}", i, price),
                    None => assert!(i < 19),
                }
            }
            assert!(out.rsi.iter().flatten().all(|r| *r == 50.0));
            assert_eq!(signal, Signal::Hold, "price {}", price);
        }
    }

    #[test]
    fn test_strict_uptrend_never_buys() {
        let closes: Vec<f64> = (0..60).map(|i| 50.0 + 0.75 * i as f64).collect();
        let (out, signal) = compute_indicators(&series(&closes), &IndicatorParams::default()).unwrap();

        assert!(out.rsi.iter().flatten().all(|r| *r == 100.0));
        let latest = out.latest().unwrap();
        assert!(latest.close > latest.sma);
        assert_eq!(signal, Signal::Hold);
    }

    #[test]
    fn test_literal_uptrend_values() {
        let closes: Vec<f64> = (10..=31).map(|v| v as f64).collect();
        assert_eq!(closes.len(), 22);

        let sma_out = sma(&closes, 20);
        assert!(sma_out[..19].iter().all(|v| v.is_none()));
        assert_relative_eq!(sma_out[21].unwrap(), 21.5);

        let rsi_out = rsi(&closes, 14);
        assert!(rsi_out[..14].iter().all(|v| v.is_none()));
        assert!(rsi_out[14..].iter().all(|v| *v == Some(100.0)));
    }

    #[test]
    fn test_uptrend_with_pullbacks_buys() {
        // +2, -1 alternating: RS = 14 / 7 -> RSI 66.67, price above SMA
        let closes: Vec<f64> = (0..40)
            .map(|i| {
                let m = (i / 2) as f64;
                if i % 2 == 0 { 100.0 + m } else { 102.0 + m }
            })
            .collect();
        let report = build_report(&series(&closes), &IndicatorParams::default()).unwrap();

        assert_relative_eq!(report.latest.rsi, 100.0 - 100.0 / 3.0, epsilon = 1e-9);
        assert!(report.latest.close > report.latest.sma);
        assert_eq!(report.signal, Signal::Buy);
        assert_eq!(report.rsi_zone, RsiZone::Neutral);
    }

    #[test]
    fn test_strict_downtrend_is_oversold_hold() {
        let closes: Vec<f64> = (0..40).map(|i| 300.0 - 2.0 * i as f64).collect();
        let report = build_report(&series(&closes), &IndicatorParams::default()).unwrap();

        assert_eq!(report.latest.rsi, 0.0);
        assert_eq!(report.rsi_zone, RsiZone::Oversold);
        assert_eq!(report.signal, Signal::Hold);
    }

    #[test]
    fn test_series_alignment() {
        let closes: Vec<f64> = (0..35).map(|i| 100.0 + (i % 5) as f64).collect();
        let (out, _) = compute_indicators(&series(&closes), &IndicatorParams::default()).unwrap();

        assert_eq!(out.len(), 35);
        assert_eq!(out.sma.len(), 35);
        assert_eq!(out.rsi.len(), 35);
        assert_eq!(out.dates[0], start());
        assert_eq!(out.sma.iter().position(|v| v.is_some()), Some(19));
        assert_eq!(out.rsi.iter().position(|v| v.is_some()), Some(14));
    }

    #[test]
    fn test_duplicate_dates_rejected() {
        let mut points: Vec<PricePoint> = series(&vec![100.0; 40]).points;
        points[20].date = points[19].date;
        let err = compute_indicators(&PriceSeries::new("DUP.NS", points), &IndicatorParams::default())
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidInput");
    }

    #[test]
    fn test_empty_feed_result_is_insufficient() {
        let err = compute_indicators(&PriceSeries::new("GONE.NS", Vec::new()), &IndicatorParams::default())
            .unwrap_err();
        assert_eq!(err.kind(), "InsufficientData");
    }
}
