use shared::Seconds;
use spacetimedb::{ScheduleAt, Timestamp};

/// Seconds elapsed from `epoch` to `now`; `None` if `now` is earlier than `epoch`.
pub fn seconds_since(now: Timestamp, epoch: Timestamp) -> Option<Seconds> {
    now.time_duration_since(epoch)
        .map(|dur| dur.to_micros())
        .filter(|micros| *micros >= 0)
        .map(|micros| micros as Seconds / 1_000_000.0)
}

pub fn interval_seconds(scheduled_at: ScheduleAt) -> Option<Seconds> {
    match scheduled_at {
        ScheduleAt::Interval(dt) => Some(dt.to_micros() as Seconds / 1_000_000.0),
        _ => None,
    }
}
