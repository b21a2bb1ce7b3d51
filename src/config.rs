use std::time::Duration;

pub const DEFAULT_MAX_RECORDS_PER_PAGE: i64 = 10;
pub const DEFAULT_PAGE_CACHE_TTL_SECS: u64 = 20;

/// Page size for every listing endpoint. Overridable through the
/// MAX_RECORDS_PER_PAGE environment variable.
pub fn max_records_per_page() -> i64 {
    std::env::var("MAX_RECORDS_PER_PAGE")
        .ok()
        .and_then(|value| value.parse().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MAX_RECORDS_PER_PAGE)
}

/// How long a cached index page stays fresh (PAGE_CACHE_TTL_SECS).
pub fn page_cache_ttl() -> Duration {
    let secs = std::env::var("PAGE_CACHE_TTL_SECS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_PAGE_CACHE_TTL_SECS);
    Duration::from_secs(secs)
}
