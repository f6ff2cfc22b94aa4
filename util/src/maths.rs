//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Saturate `value` so that it lies within `[min, max]`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T 
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Saturate `value` symmetrically, so that it lies within `[-limit, limit]`.
pub fn limit<T>(value: T, limit: T) -> T
where
    T: Float
{
    clamp(&value, &(-limit.abs()), &limit.abs())
}

/// Wrap an angle into the range (-pi, pi].
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap_or_else(T::zero);
    let tau_t: T = pi_t + pi_t;

    // Map into [-pi, pi), then move the lower bound across so -pi becomes pi
    let wrapped = rem_euclid(angle + pi_t, tau_t) - pi_t;

    if wrapped <= -pi_t {
        wrapped + tau_t
    }
    else {
        wrapped
    }
}

/// Get the signed shortest angular distance from `from` to `to`, in (-pi, pi].
///
/// Adding the result to `from` gives an angle equivalent to `to`.
pub fn shortest_ang_dist<T>(from: T, to: T) -> T
where
    T: Float
{
    wrap_pi(to - from)
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_wrap_pi() {
        assert_relative_eq!(wrap_pi(0f64), 0f64);
        assert_relative_eq!(wrap_pi(PI), PI);
        assert_relative_eq!(wrap_pi(-PI), PI);
        assert_relative_eq!(wrap_pi(PI / 2.0 + 2.0 * PI), PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(wrap_pi(-PI / 2.0 - 4.0 * PI), -PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_shortest_ang_dist() {
        assert_relative_eq!(shortest_ang_dist(1f64, 2f64), 1f64);
        assert_relative_eq!(shortest_ang_dist(2f64, 1f64), -1f64);
        assert_relative_eq!(shortest_ang_dist(0f64, 2.0 * PI), 0f64, epsilon = 1e-12);

        // Crossing the +-pi seam takes the short way round
        assert_relative_eq!(shortest_ang_dist(PI - 0.1, -PI + 0.1), 0.2, epsilon = 1e-12);
        assert_relative_eq!(shortest_ang_dist(-PI + 0.1, PI - 0.1), -0.2, epsilon = 1e-12);

        // Exactly opposite is reported as +pi
        assert_relative_eq!(shortest_ang_dist(PI, 0f64), PI);
        assert_relative_eq!(shortest_ang_dist(0f64, PI), PI);
    }

    #[test]
    fn test_limit() {
        assert_eq!(limit(0.5f64, 0.3), 0.3);
        assert_eq!(limit(-0.5f64, 0.3), -0.3);
        assert_eq!(limit(0.1f64, 0.3), 0.1);
        assert_eq!(clamp(&2f64, &-1.0, &1.0), 1.0);
    }
}
