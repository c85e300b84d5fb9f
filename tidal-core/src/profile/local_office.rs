use super::window::is_weekend;
use super::ActivityProfile;
use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;

const PEAK: f64 = 1.0;
const LUNCH: f64 = 0.50;
const BREAK: f64 = 0.70;
const NIGHT: f64 = 0.05;
const EVENING_FLOOR: f64 = 0.20;
const WEEKEND: f64 = 0.10;

/// A single office in one timezone: busy nine-to-five-ish, dead at night and on weekends.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalOffice {
    tz: Tz,
}

impl LocalOffice {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl ActivityProfile for LocalOffice {
    fn activity_level(&self, at: DateTime<Utc>) -> f64 {
        let local = at.with_timezone(&self.tz);
        if is_weekend(local.weekday()) {
            return WEEKEND;
        }

        let (hour, minute) = (local.hour(), local.minute());
        let clock = hour as f64 + minute as f64 / 60.0;

        match hour {
            // Arrivals: 06:00 -> 08:00
            6 | 7 => NIGHT + (PEAK - NIGHT) * (clock - 6.0) / 2.0,
            8..=17 => office_hours(hour, minute),
            // Departures: 18:00 -> 22:00
            18..=21 => PEAK - (PEAK - EVENING_FLOOR) * (clock - 18.0) / 4.0,
            _ => NIGHT,
        }
    }
}

fn office_hours(hour: u32, minute: u32) -> f64 {
    match (hour, minute) {
        (12, _) => LUNCH,
        (10 | 15, 30..=44) => BREAK,
        _ => PEAK,
    }
}
