use super::window::is_weekend;
use super::ActivityProfile;
use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;

/// `(end hour, level)` pairs. A bucket covers the hours since the previous bucket's end.
const BUCKETS: [(u32, f64); 6] = [
    // night
    (7, 0.15),
    // morning
    (11, 0.40),
    // afternoon
    (17, 0.60),
    // evening peak
    (21, 1.0),
    // late night
    (23, 0.70),
    // night
    (24, 0.15),
];

const WEEKEND_FACTOR: f64 = 1.20;

/// A regional web shop. Busiest after work, and busier still on weekends.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreRegional {
    tz: Tz,
}

impl StoreRegional {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl ActivityProfile for StoreRegional {
    fn activity_level(&self, at: DateTime<Utc>) -> f64 {
        let local = at.with_timezone(&self.tz);
        let hour = local.hour();
        let level = BUCKETS
            .iter()
            .find(|(end, _)| hour < *end)
            .map_or(BUCKETS[0].1, |(_, level)| *level);

        if is_weekend(local.weekday()) {
            level * WEEKEND_FACTOR
        } else {
            level
        }
    }
}
