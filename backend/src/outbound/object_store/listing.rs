//! Latest-export selection over listed object keys.

use chrono::NaiveDateTime;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TIMESTAMP_LEN: usize = 15;
const EXPORT_EXTENSION: &str = ".json";

/// Newest export among `keys`.
///
/// A key qualifies when it ends with `{pattern}YYYYMMDD_HHMMSS.json`; keys
/// whose timestamp does not parse are skipped. Ties keep the first key seen.
///
/// # Examples
/// ```
/// use project_explorer::outbound::object_store::select_latest_key;
///
/// let keys = [
///     "dumps/jobs_20250101_090000.json",
///     "dumps/jobs_20250301_090000.json",
///     "dumps/jobs_20251301_090000.json",
/// ];
/// assert_eq!(
///     select_latest_key(keys, "jobs_"),
///     Some("dumps/jobs_20250301_090000.json")
/// );
/// ```
pub fn select_latest_key<'a>(
    keys: impl IntoIterator<Item = &'a str>,
    pattern: &str,
) -> Option<&'a str> {
    let mut latest: Option<(NaiveDateTime, &'a str)> = None;
    for key in keys {
        let Some(timestamp) = export_timestamp(key, pattern) else {
            continue;
        };
        if latest.is_none_or(|(current, _)| timestamp > current) {
            latest = Some((timestamp, key));
        }
    }
    latest.map(|(_, key)| key)
}

fn export_timestamp(key: &str, pattern: &str) -> Option<NaiveDateTime> {
    let stem = key.strip_suffix(EXPORT_EXTENSION)?;
    let (_, raw) = stem.rsplit_once(pattern)?;
    if raw.len() != TIMESTAMP_LEN {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PATTERN: &str = "ridership_modeling_jobs_";

    #[rstest]
    fn newest_valid_timestamp_wins() {
        let keys = [
            "ridership_modeling_dumps/ridership_modeling_jobs_20250510_081500.json",
            "ridership_modeling_dumps/ridership_modeling_jobs_20250601_000000.json",
            "ridership_modeling_dumps/ridership_modeling_jobs_20259999_000000.json",
            "ridership_modeling_dumps/ridership_modeling_jobs_20250701_000000.json.bak",
            "ridership_modeling_dumps/ridership_modeling_jobs_latest.json",
            "ridership_modeling_dumps/other_20260101_000000.json",
        ];
        assert_eq!(
            select_latest_key(keys, PATTERN),
            Some("ridership_modeling_dumps/ridership_modeling_jobs_20250601_000000.json")
        );
    }

    #[rstest]
    #[case(&[])]
    #[case(&["ridership_modeling_dumps/readme.txt"])]
    #[case(&["ridership_modeling_dumps/ridership_modeling_jobs_2025060_000000.json"])]
    fn no_matching_key_yields_none(#[case] keys: &[&str]) {
        assert_eq!(select_latest_key(keys.iter().copied(), PATTERN), None);
    }
}
