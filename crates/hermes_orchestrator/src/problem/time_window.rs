use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

/// Offsets from the start of the planning horizon
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TimeWindow {
    start: SignedDuration,
    end: Option<SignedDuration>,
    day_index: Option<i64>,
}

impl TimeWindow {
    pub fn new(start: SignedDuration, end: Option<SignedDuration>) -> Self {
        TimeWindow {
            start,
            end,
            day_index: None,
        }
    }

    pub fn start(&self) -> SignedDuration {
        self.start
    }

    pub fn end(&self) -> Option<SignedDuration> {
        self.end
    }

    pub fn day_index(&self) -> Option<i64> {
        self.day_index
    }

    /// Still open for an arrival strictly before its end
    pub fn is_open_after(&self, time: SignedDuration) -> bool {
        match self.end {
            Some(end) => end > time,
            None => true,
        }
    }
}

#[derive(Default)]
pub struct TimeWindowBuilder {
    start: Option<SignedDuration>,
    end: Option<SignedDuration>,
    day_index: Option<i64>,
}

impl TimeWindowBuilder {
    pub fn with_start(mut self, start: SignedDuration) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: SignedDuration) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_day_index(mut self, day_index: i64) -> Self {
        self.day_index = Some(day_index);
        self
    }

    pub fn build(self) -> TimeWindow {
        TimeWindow {
            start: self.start.unwrap_or(SignedDuration::ZERO),
            end: self.end,
            day_index: self.day_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let time_window = TimeWindowBuilder::default()
            .with_start(SignedDuration::from_hours(8))
            .with_end(SignedDuration::from_hours(10))
            .with_day_index(2)
            .build();

        assert_eq!(time_window.start(), SignedDuration::from_hours(8));
        assert_eq!(time_window.end(), Some(SignedDuration::from_hours(10)));
        assert_eq!(time_window.day_index(), Some(2));
    }

    #[test]
    fn test_is_open_after() {
        let time_window = TimeWindow::new(SignedDuration::ZERO, Some(SignedDuration::from_secs(100)));

        assert!(time_window.is_open_after(SignedDuration::from_secs(99)));
        assert!(!time_window.is_open_after(SignedDuration::from_secs(100)));
        assert!(TimeWindow::new(SignedDuration::ZERO, None).is_open_after(SignedDuration::MAX));
    }
}
