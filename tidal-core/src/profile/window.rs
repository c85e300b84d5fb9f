use chrono::Weekday;

/// A span of whole hours, `[start, end)`. When `start > end` the window wraps
/// past midnight.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HourWindow {
    start: u32,
    end: u32,
}

impl HourWindow {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, hour: u32) -> bool {
        if self.start <= self.end {
            hour >= self.start && hour < self.end
        } else {
            hour >= self.start || hour < self.end
        }
    }

    /// Hours between `hour` and the nearest edge of the window, zero inside it.
    /// The hour just before `start` and the hour starting at `end` are both one step out.
    pub fn distance(&self, hour: u32) -> u32 {
        if self.contains(hour) {
            return 0;
        }
        let until_open = (self.start + 24 - hour) % 24;
        let since_close = (hour + 24 - self.end) % 24 + 1;
        until_open.min(since_close)
    }
}

pub(crate) fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}
