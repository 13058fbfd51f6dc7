//! Utility functions for brickrun

use bevy::prelude::*;
use std::f32::consts::PI;

/// Overlap between two axis-aligned boxes given centers and half sizes.
/// Returns `None` when the boxes only touch or are apart.
pub fn aabb_overlap(a_pos: Vec2, a_half: Vec2, b_pos: Vec2, b_half: Vec2) -> Option<Vec2> {
    let diff = a_pos - b_pos;
    let overlap = a_half + b_half - diff.abs();
    if overlap.x <= 0.0 || overlap.y <= 0.0 {
        None
    } else {
        Some(overlap)
    }
}

/// Sine ease in/out over t in [0, 1]
pub fn ease_sine_in_out(t: f32) -> f32 {
    -((PI * t.clamp(0.0, 1.0)).cos() - 1.0) / 2.0
}

/// Sine ease in over t in [0, 1]
pub fn ease_sine_in(t: f32) -> f32 {
    1.0 - (t.clamp(0.0, 1.0) * PI / 2.0).cos()
}

/// Yoyo bob offset: 0 -> amplitude -> 0, one leg every `half_period` seconds
pub fn bob_offset(elapsed: f32, amplitude: f32, half_period: f32) -> f32 {
    if half_period <= 0.0 {
        return 0.0;
    }
    let phase = (elapsed / half_period).rem_euclid(2.0);
    let leg = if phase < 1.0 { phase } else { 2.0 - phase };
    amplitude * ease_sine_in_out(leg)
}

/// Move a value toward a target by a maximum delta
pub fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_touching_is_none() {
        let a = aabb_overlap(Vec2::ZERO, Vec2::splat(10.0), Vec2::new(20.0, 0.0), Vec2::splat(10.0));
        assert!(a.is_none());
        let b = aabb_overlap(Vec2::ZERO, Vec2::splat(10.0), Vec2::new(15.0, 4.0), Vec2::splat(10.0));
        assert_eq!(b, Some(Vec2::new(5.0, 16.0)));
    }

    #[test]
    fn test_bob_yoyo() {
        assert!(bob_offset(0.0, 6.0, 0.8).abs() < 1e-4);
        assert!((bob_offset(0.8, 6.0, 0.8) - 6.0).abs() < 1e-4);
        assert!(bob_offset(1.6, 6.0, 0.8).abs() < 1e-3);
        assert!((bob_offset(0.4, 6.0, 0.8) - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_move_toward() {
        assert_eq!(move_toward(0.0, 10.0, 3.0), 3.0);
        assert_eq!(move_toward(9.0, 10.0, 3.0), 10.0);
        assert_eq!(move_toward(0.0, -10.0, 4.0), -4.0);
    }
}
