use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress marker for a unit, in milliseconds since epoch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watermark(i64);

impl Watermark {
    /// Returned for units with no recorded progress, so any positive update time is newer
    pub const ZERO: Watermark = Watermark(0);

    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for Watermark {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `(low, expected_high)` pair attached to a work unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkInterval {
    low: Watermark,
    expected_high: Watermark,
}

impl WatermarkInterval {
    /// Build an interval, or `None` when `low` is after `expected_high`
    pub fn new(low: Watermark, expected_high: Watermark) -> Option<Self> {
        (low <= expected_high).then_some(Self { low, expected_high })
    }

    pub fn low(&self) -> Watermark {
        self.low
    }

    pub fn expected_high(&self) -> Watermark {
        self.expected_high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_ordering() {
        let interval = WatermarkInterval::new(Watermark::new(50), Watermark::new(200)).unwrap();
        assert_eq!(interval.low().value(), 50);
        assert_eq!(interval.expected_high().value(), 200);

        assert!(WatermarkInterval::new(Watermark::new(5), Watermark::new(5)).is_some());
        assert!(WatermarkInterval::new(Watermark::new(6), Watermark::new(5)).is_none());
    }

    #[test]
    fn test_watermark_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Watermark::new(42)).unwrap(), "42");
        assert_eq!(Watermark::default(), Watermark::ZERO);
    }
}
