//! Verification result handed to the embedding application.

use serde::{Deserialize, Serialize};

/// Error code reported when a stored region could not be evaluated.
pub const ERROR_INVALID_REGION: &str = "invalid-region";

/// Outcome of one verification attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResponse {
    pub success: bool,
    /// 1.0 on success, 0.0 on failure.
    pub score: f64,
    /// ISO-8601 UTC time of the attempt.
    pub challenge_ts: String,
    /// Host identity of the verifier.
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_codes: Option<Vec<String>>,
}

impl VerificationResponse {
    /// Build a response stamped with the current time.
    pub fn new(success: bool, hostname: impl Into<String>, error_codes: Vec<String>) -> Self {
        Self {
            success,
            score: if success { 1.0 } else { 0.0 },
            challenge_ts: current_timestamp(),
            hostname: hostname.into(),
            error_codes: (!error_codes.is_empty()).then_some(error_codes),
        }
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn current_timestamp() -> String {
    let since_epoch = web_time::SystemTime::now()
        .duration_since(web_time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format_timestamp(since_epoch.as_secs(), since_epoch.subsec_millis())
}

fn format_timestamp(secs: u64, millis: u32) -> String {
    let (year, month, day) = civil_from_days(secs / 86400);
    let secs_today = secs % 86400;
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        year,
        month,
        day,
        secs_today / 3600,
        (secs_today % 3600) / 60,
        secs_today % 60,
        millis
    )
}

/// Convert days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: u64) -> (u64, u64, u64) {
    // Shift the epoch to 0000-03-01 so leap days fall at the end of a year.
    let z = days + 719_468;
    let era = z / 146_097;
    let day_of_era = z % 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = year_of_era + era * 400 + u64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0, 0), "1970-01-01T00:00:00.000Z");
        assert_eq!(format_timestamp(951_782_400, 5), "2000-02-29T00:00:00.005Z");
        assert_eq!(format_timestamp(1_709_210_096, 789), "2024-02-29T12:34:56.789Z");
        assert_eq!(format_timestamp(1_735_689_599, 999), "2024-12-31T23:59:59.999Z");
    }

    #[test]
    fn test_current_timestamp_shape() {
        let ts = current_timestamp();
        assert_eq!(ts.len(), 24);
        assert!(ts.ends_with('Z'));
        assert_eq!(&ts[10..11], "T");
    }

    #[test]
    fn test_response_json() {
        let response = VerificationResponse::new(true, "example.org", Vec::new());
        assert_eq!(response.score, 1.0);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["hostname"], "example.org");
        assert!(json.get("error_codes").is_none());

        let failed = VerificationResponse::new(false, "h", vec![ERROR_INVALID_REGION.to_string()]);
        assert_eq!(failed.score, 0.0);
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["error_codes"][0], "invalid-region");
    }
}
