use super::window::{is_weekend, HourWindow};
use super::ActivityProfile;
use chrono::{DateTime, Datelike, Timelike, Utc};

/// Evening shopping hours of the three markets, in UTC hours.
const EVENINGS: [HourWindow; 3] = [
    // Americas, wraps past midnight UTC
    HourWindow::new(23, 4),
    // Europe
    HourWindow::new(17, 21),
    // Asia-Pacific
    HourWindow::new(10, 14),
];

const WEEKEND_FACTOR: f64 = 1.10;
const FLOOR: f64 = 0.40;

/// A worldwide web shop following the evening across timezones.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreGlobal;

impl ActivityProfile for StoreGlobal {
    fn activity_level(&self, at: DateTime<Utc>) -> f64 {
        let hour = at.hour();
        let busiest = EVENINGS
            .iter()
            .map(|evening| match evening.distance(hour) {
                0 => 1.0,
                1 => 0.6,
                2 => 0.3,
                _ => 0.0,
            })
            .fold(0.0, f64::max);

        let mut level = FLOOR + (1.0 - FLOOR) * busiest;
        if is_weekend(at.weekday()) {
            level *= WEEKEND_FACTOR;
        }
        level.max(FLOOR)
    }
}
