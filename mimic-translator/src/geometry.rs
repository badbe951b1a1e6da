use nalgebra as na;

/// Unit vector pointing along `v`.
///
/// Returns the zero vector when `v` has no length. Callers read that as
/// "direction undefined" and fall back to a neutral angle.
pub fn normalize3(v: &na::Vector3<f32>) -> na::Vector3<f32> {
    let magnitude = v.norm();
    // only an exactly degenerate vector has no direction
    #[allow(clippy::float_cmp)]
    if magnitude == 0.0 {
        return na::Vector3::zeros();
    }
    v / magnitude
}

/// Planar counterpart of [`normalize3`].
pub fn normalize2(v: &na::Vector2<f32>) -> na::Vector2<f32> {
    let magnitude = v.norm();
    #[allow(clippy::float_cmp)]
    if magnitude == 0.0 {
        return na::Vector2::zeros();
    }
    v / magnitude
}

/// Angle between two planar vectors in `[0, π]`.
///
/// The cosine is clamped before `acos` so rounding can't push it outside the
/// domain. A zero-length input yields `0.0`.
pub fn angle_between_2d(a: &na::Vector2<f32>, b: &na::Vector2<f32>) -> f32 {
    let lengths = a.norm() * b.norm();
    #[allow(clippy::float_cmp)]
    if lengths == 0.0 {
        return 0.0;
    }
    clamp(a.dot(b) / lengths, -1.0, 1.0).acos()
}

/// Clamp `x` into `[lo, hi]`.
///
/// Unlike `f32::clamp` this never panics on an inverted range; `hi` wins.
pub fn clamp(x: f32, lo: f32, hi: f32) -> f32 {
    x.max(lo).min(hi)
}
