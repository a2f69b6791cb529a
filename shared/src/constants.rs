/// Default number of snapshots the authority emits per second.
///
/// The observer blend also completes over exactly one nominal period (`1 / SENDS_PER_SECOND`),
/// regardless of the real arrival interval.
pub const DEFAULT_SENDS_PER_SECOND: u32 = 60;

/// Threshold on the sine of the angle between two orientations below which `slerp` is
/// numerically undefined and the blend falls back to normalized lerp.
pub const SLERP_EPSILON: f32 = 1.0e-6;

/// Wall-clock time in seconds, as supplied by the host's clock.
///
/// Every operation takes `now` as an argument instead of reading a clock, so the whole core
/// can be driven by a fake time source in tests.
pub type Seconds = f64;
