use rand::Rng;

const TWO_DAYS_SECS: i64 = 2 * 24 * 60 * 60;
const MIN_LAG_SECS: i64 = 60;

/// A uniformly random timestamp in `(now - 2 days, now - 60 s)`, used for
/// every seal and wrap `created_at` to frustrate traffic correlation
/// (§4.D, §8 "tweaked timestamp range").
pub fn tweaked_past_timestamp(now: i64) -> i64 {
    let earliest = now - TWO_DAYS_SECS;
    let latest = now - MIN_LAG_SECS;
    rand::rng().random_range(earliest..latest)
}
