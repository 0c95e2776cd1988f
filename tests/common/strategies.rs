use proptest::prelude::*;

/// Millisecond instants small enough to keep `low + 1` in range
pub fn instant_strategy() -> impl Strategy<Value = i64> {
    0i64..=1_000_000_000_000
}

/// Partition values that are valid in a complete name
pub fn partition_value_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9_-]{0,15}"
}

/// Per-partition `(update_time, low_watermark)` pairs, below an expected high of 10^12
pub fn partition_times_strategy() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((0i64..1_000, 0i64..1_000), 0..12)
}
