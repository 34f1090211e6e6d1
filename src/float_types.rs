// Re-export parry for the appropriate float size
#[cfg(feature = "f64")]
pub use parry3d_f64 as parry3d;

#[cfg(feature = "f32")]
pub use parry3d;

// Our Real scalar type:
#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

/// Tolerance used when classifying a point against a [`Plane`](crate::plane::Plane).
///
/// Compared against the raw signed distance `normal · p - offset` where
/// `normal` is **not** unit length, so the effective tolerance scales with the
/// magnitude of the plane normal (and therefore with triangle size and
/// coordinate magnitude). See the note on [`Plane`](crate::plane::Plane).
pub const EPSILON: Real = 1e-5;
