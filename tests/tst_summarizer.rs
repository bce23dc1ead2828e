use stock_ai::options::{summarize_chain, OptionChain, OptionRecord};
use stock_ai::AnalysisError;

#[cfg(test)]
mod tests {
    use super::*;

    fn strikes(records: &[OptionRecord]) -> Vec<f64> {
        records.iter().map(|r| r.strike).collect()
    }

    #[test]
    fn test_three_strike_example() {
        let records = vec![
            OptionRecord::new(100.0, 500, 800),
            OptionRecord::new(105.0, 900, 300),
            OptionRecord::new(110.0, 200, 700),
        ];
        let summary = summarize_chain(&records).unwrap();

        assert_eq!(summary.total_call_oi, 1600);
        assert_eq!(summary.total_put_oi, 1800);
        assert_eq!(summary.put_call_ratio, 1.125);
        assert_eq!(strikes(&summary.top_resistance), vec![105.0, 100.0, 110.0]);
        assert_eq!(strikes(&summary.top_support), vec![100.0, 110.0, 105.0]);
        // Only three strikes, so every one is in both lists; first by call OI wins
        assert_eq!(summary.max_pain_strike, Some(105.0));
    }

    #[test]
    fn test_disjoint_top_lists_have_no_max_pain() {
        let records = vec![
            OptionRecord::new(24_000.0, 10, 900),
            OptionRecord::new(24_100.0, 20, 800),
            OptionRecord::new(24_200.0, 30, 700),
            OptionRecord::new(24_300.0, 700, 30),
            OptionRecord::new(24_400.0, 800, 20),
            OptionRecord::new(24_500.0, 900, 10),
        ];
        let summary = summarize_chain(&records).unwrap();

        assert_eq!(strikes(&summary.top_resistance), vec![24_500.0, 24_400.0, 24_300.0]);
        assert_eq!(strikes(&summary.top_support), vec![24_000.0, 24_100.0, 24_200.0]);
        assert_eq!(summary.max_pain_strike, None);
    }

    #[test]
    fn test_overlap_returns_shared_strike() {
        let records = vec![
            OptionRecord::new(24_000.0, 10, 900),
            OptionRecord::new(24_100.0, 600, 850),
            OptionRecord::new(24_200.0, 30, 700),
            OptionRecord::new(24_300.0, 700, 30),
            OptionRecord::new(24_400.0, 800, 20),
            OptionRecord::new(24_500.0, 900, 10),
        ];
        let summary = summarize_chain(&records).unwrap();

        assert_eq!(strikes(&summary.top_resistance), vec![24_500.0, 24_400.0, 24_300.0]);
        assert_eq!(summary.max_pain_strike, None);

        // Lift 24_100 into the call top-3 as well
        let mut records = records;
        records[1].call_oi = 1_000;
        let summary = summarize_chain(&records).unwrap();
        assert_eq!(strikes(&summary.top_resistance), vec![24_100.0, 24_500.0, 24_400.0]);
        assert_eq!(strikes(&summary.top_support), vec![24_000.0, 24_100.0, 24_200.0]);
        assert_eq!(summary.max_pain_strike, Some(24_100.0));
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let records = vec![
            OptionRecord::new(110.0, 400, 400),
            OptionRecord::new(100.0, 400, 400),
            OptionRecord::new(120.0, 400, 400),
            OptionRecord::new(90.0, 400, 400),
        ];
        let summary = summarize_chain(&records).unwrap();
        assert_eq!(strikes(&summary.top_resistance), vec![110.0, 100.0, 120.0]);
        assert_eq!(strikes(&summary.top_support), vec![110.0, 100.0, 120.0]);
        assert_eq!(summary.max_pain_strike, Some(110.0));
    }

    #[test]
    fn test_empty_snapshot() {
        assert_eq!(summarize_chain(&[]).unwrap_err(), AnalysisError::EmptySnapshot);
    }

    #[test]
    fn test_zero_call_oi_gives_zero_ratio() {
        let records = vec![
            OptionRecord::new(100.0, 0, 250),
            OptionRecord::new(105.0, 0, 0),
        ];
        let summary = summarize_chain(&records).unwrap();
        assert_eq!(summary.total_call_oi, 0);
        assert_eq!(summary.total_put_oi, 250);
        assert_eq!(summary.put_call_ratio, 0.0);
    }

    #[test]
    fn test_large_totals_do_not_overflow() {
        let records = vec![OptionRecord::new(100.0, u32::MAX as u64, u32::MAX as u64); 8];
        let summary = summarize_chain(&records).unwrap();
        assert_eq!(summary.total_call_oi, 8 * u32::MAX as u64);
        assert_eq!(summary.put_call_ratio, 1.0);
    }

    #[test]
    fn test_overflowing_totals_are_rejected() {
        let records = vec![
            OptionRecord::new(100.0, u64::MAX, 10),
            OptionRecord::new(105.0, 1, 10),
        ];
        let err = summarize_chain(&records).unwrap_err();
        assert_eq!(err.kind(), "InvalidInput");
    }

    #[test]
    fn test_out_of_range_open_interest_is_rejected() {
        for oi in ["1e20", "18446744073709551616", "10.5", "-3"] {
            let body = format!(
                r#"{{"records": {{"data": []}}, "filtered": {{"data": [
                    {{"strikePrice": 26000, "CE": {{"openInterest": {oi}}}}},
                    {{"strikePrice": 26100, "CE": {{"openInterest": {oi}}}}}
                ]}}}}"#
            );
            let chain: OptionChain = serde_json::from_str(&body).unwrap();
            let err = chain.into_snapshot("NIFTY", "30-Dec-2025").unwrap_err();
            assert_eq!(err.kind(), "FeedUnavailable", "openInterest {}", oi);
        }
    }

    #[test]
    fn test_nse_payload_to_summary() {
        let body = r#"{
            "records": {
                "timestamp": "26-Dec-2025 15:30:00",
                "underlyingValue": 26042.3,
                "data": []
            },
            "filtered": {
                "data": [
                    {"expiryDates": "30-Dec-2025", "strikePrice": 25900,
                     "CE": {"openInterest": 1200}, "PE": {"openInterest": 5400}},
                    {"expiryDates": "30-Dec-2025", "strikePrice": 26000,
                     "CE": {"openInterest": 8800}, "PE": {"openInterest": 7100}},
                    {"expiryDates": "30-Dec-2025", "strikePrice": 26100,
                     "CE": {"openInterest": 9600}},
                    {"expiryDates": "30-Dec-2025", "strikePrice": 26200,
                     "PE": {"openInterest": 300}}
                ],
                "CE": {"totOI": 19600},
                "PE": {"totOI": 12800}
            }
        }"#;
        let chain: OptionChain = serde_json::from_str(body).unwrap();
        let snapshot = chain.into_snapshot("NIFTY", "30-Dec-2025").unwrap();

        assert_eq!(snapshot.records.len(), 4);
        assert_eq!(snapshot.records[2], OptionRecord::new(26_100.0, 9_600, 0));
        assert_eq!(snapshot.underlying_value, Some(26_042.3));

        let summary = summarize_chain(&snapshot.records).unwrap();
        assert_eq!(summary.total_call_oi, 19_600);
        assert_eq!(summary.total_put_oi, 12_800);
        assert_eq!(strikes(&summary.top_resistance), vec![26_100.0, 26_000.0, 25_900.0]);
        assert_eq!(strikes(&summary.top_support), vec![26_000.0, 25_900.0, 26_200.0]);
        assert_eq!(summary.max_pain_strike, Some(26_000.0));
    }

    #[test]
    fn test_nse_payload_with_bad_strike_is_rejected_whole() {
        let body = r#"{
            "records": {"data": []},
            "filtered": {"data": [
                {"strikePrice": 26000, "CE": {"openInterest": 10}},
                {"strikePrice": null, "CE": {"openInterest": 10}}
            ]}
        }"#;
        let chain: OptionChain = serde_json::from_str(body).unwrap();
        let err = chain.into_snapshot("NIFTY", "30-Dec-2025").unwrap_err();
        assert_eq!(err.kind(), "FeedUnavailable");
    }

    #[test]
    fn test_records_fallback_filters_by_expiry() {
        let body = r#"{
            "records": {"data": [
                {"expiryDates": "30-Dec-2025", "strikePrice": 26000, "CE": {"openInterest": 10}},
                {"expiryDates": "27-Jan-2026", "strikePrice": 26000, "CE": {"openInterest": 99}}
            ]}
        }"#;
        let chain: OptionChain = serde_json::from_str(body).unwrap();
        let snapshot = chain.into_snapshot("NIFTY", "30-dec-2025").unwrap();
        assert_eq!(snapshot.records, vec![OptionRecord::new(26_000.0, 10, 0)]);
    }
}
