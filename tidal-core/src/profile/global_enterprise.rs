use super::window::{is_weekend, HourWindow};
use super::ActivityProfile;
use chrono::{DateTime, Datelike, Timelike, Utc};

/// Business days of the three regions, in UTC hours.
const REGIONS: [HourWindow; 3] = [
    // Americas
    HourWindow::new(13, 22),
    // Europe
    HourWindow::new(7, 16),
    // Asia-Pacific
    HourWindow::new(0, 9),
];

const QUIET_HOURS: HourWindow = HourWindow::new(2, 4);
const QUIET_FACTOR: f64 = 0.80;
const WEEKEND_FACTOR: f64 = 0.60;
const FLOOR: f64 = 0.30;

/// A company with offices on three continents: somebody is always working.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalEnterprise;

impl ActivityProfile for GlobalEnterprise {
    fn activity_level(&self, at: DateTime<Utc>) -> f64 {
        let hour = at.hour();
        let busiest = REGIONS
            .iter()
            .map(|region| match region.distance(hour) {
                0 => 1.0,
                1 => 0.5,
                _ => 0.0,
            })
            .fold(0.0, f64::max);

        let mut level = FLOOR + (1.0 - FLOOR) * busiest;
        if QUIET_HOURS.contains(hour) {
            level *= QUIET_FACTOR;
        }
        if is_weekend(at.weekday()) {
            level *= WEEKEND_FACTOR;
        }
        level.clamp(FLOOR, 1.0)
    }
}
