use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock timestamp carried on alerts and position updates.
pub type EpochMillis = u64;

pub fn now_epoch_millis() -> EpochMillis {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| EpochMillis::try_from(elapsed.as_millis()).unwrap_or(EpochMillis::MAX))
        .unwrap_or_default()
}

/// Milliseconds from `earlier` to `now`, zero if the clock went backwards.
pub fn millis_since(earlier: EpochMillis, now: EpochMillis) -> EpochMillis {
    now.saturating_sub(earlier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_past_2020() {
        assert!(now_epoch_millis() > 1_577_836_800_000);
    }

    #[test]
    fn elapsed_saturates() {
        assert_eq!(millis_since(1_000, 1_500), 500);
        assert_eq!(millis_since(2_000, 1_500), 0);
    }
}
