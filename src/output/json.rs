//! JSON serialization of round reports.

use ctprobe_core::Report;

/// Serialize a report to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for Report).
pub fn to_json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}

/// Serialize a report to a pretty-printed JSON string.
pub fn to_json_pretty(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctprobe_core::{BankTag, LeakStatistics, Verdict};

    #[test]
    fn report_fields_are_named() {
        let report = Report {
            measurements: 4_000,
            statistics: Some(LeakStatistics {
                bank: BankTag::Raw,
                max_t: 2.0,
                max_tau: 0.0005,
                needed: 100_000.0,
            }),
            verdict: Verdict::MaybeConstantTime,
        };
        let value: serde_json::Value = serde_json::from_str(&to_json(&report).unwrap()).unwrap();

        assert_eq!(value["measurements"], 4_000);
        assert_eq!(value["statistics"]["bank"], "Raw");
        assert_eq!(value["statistics"]["max_t"], 2.0);
        assert_eq!(value["verdict"], "MaybeConstantTime");
    }

    #[test]
    fn pending_verdict_keeps_remaining_count() {
        let report = Report {
            measurements: 10,
            statistics: None,
            verdict: Verdict::NotEnoughMeasurements { remaining: 2_990 },
        };
        let json = to_json_pretty(&report).unwrap();
        assert!(json.contains("\"remaining\": 2990"));
        assert!(json.contains("\"statistics\": null"));
    }
}
