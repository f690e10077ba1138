use time::OffsetDateTime;

/// How long the scheduler should sleep before firing a scheduled start.
/// A fire time already in the past clamps to zero (fire immediately), which
/// is how a timer lost to a restart catches up.
pub fn fire_delay(scheduled_at: OffsetDateTime, now: OffsetDateTime) -> std::time::Duration {
    let until = scheduled_at - now;
    if until.is_negative() {
        std::time::Duration::ZERO
    } else {
        until.unsigned_abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn future_fire_time_waits_the_difference() {
        let now = datetime!(2024-05-01 12:00 UTC);
        let at = datetime!(2024-05-01 12:30 UTC);
        assert_eq!(fire_delay(at, now), std::time::Duration::from_secs(30 * 60));
    }

    #[test]
    fn past_fire_time_clamps_to_zero() {
        let now = datetime!(2024-05-01 12:00 UTC);
        let at = datetime!(2024-05-01 11:00 UTC);
        assert_eq!(fire_delay(at, now), std::time::Duration::ZERO);
    }

    #[test]
    fn exact_fire_time_is_zero() {
        let now = datetime!(2024-05-01 12:00 UTC);
        assert_eq!(fire_delay(now, now), std::time::Duration::ZERO);
    }
}
