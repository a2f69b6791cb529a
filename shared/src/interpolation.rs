use crate::{Seconds, transform::Transform};

/// Progress of the current blend, in `[0, 1]`.
///
/// `clamp01((now - last_arrival) * sends_per_second)`: the blend always completes over one
/// nominal send period, whatever the real arrival interval was. Without any arrival yet, or
/// when the elapsed time is not a finite number (either sign), the blend counts as finished.
/// A finite clock that reads earlier than the last arrival yields 0.
pub fn blend_fraction(now: Seconds, last_arrival: Option<Seconds>, sends_per_second: u32) -> f32 {
    let Some(last_arrival) = last_arrival else {
        return 1.0;
    };

    let raw = (now - last_arrival) * sends_per_second as Seconds;
    if !raw.is_finite() {
        return 1.0;
    }
    raw.clamp(0.0, 1.0) as f32
}

/// Observer-only blend endpoints.
///
/// Written when a snapshot arrives, read every rendered frame. `last_arrival` is `None` until
/// the first snapshot, which makes the observer hold still at `goal`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InterpolationState {
    pub start: Transform,
    pub goal: Transform,
    pub last_arrival: Option<Seconds>,
}

impl InterpolationState {
    /// State of a freshly set up observer resting at `rest`.
    pub fn at_rest(rest: Transform) -> Self {
        Self {
            start: rest,
            goal: rest,
            last_arrival: None,
        }
    }

    pub fn fraction(&self, now: Seconds, sends_per_second: u32) -> f32 {
        blend_fraction(now, self.last_arrival, sends_per_second)
    }

    /// Blended pose at `now`.
    pub fn sample(&self, now: Seconds, sends_per_second: u32) -> Transform {
        self.start.blend(&self.goal, self.fraction(now, sends_per_second))
    }

    /// Begin a new blend from `start` toward `goal`, starting at `now`.
    pub fn retarget(&mut self, start: Transform, goal: Transform, now: Seconds) {
        self.start = start;
        self.goal = goal;
        self.last_arrival = Some(now);
    }
}
