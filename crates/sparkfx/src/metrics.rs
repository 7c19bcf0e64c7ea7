//! Spread measurements over a particle set.
//!
//! Dispersion is the standard deviation of all pairwise distances. It is
//! used to check that friction settles velocities and attraction gathers
//! positions. O(n²); meant for tests and tooling, not the frame path.

use sparkfx_core::Vec2;

use crate::particle::Particle;

/// Standard deviation of pairwise position distances.
pub fn position_dispersion<'a>(particles: impl IntoIterator<Item = &'a Particle>) -> f32 {
    let points: Vec<Vec2> = particles.into_iter().map(|p| p.position).collect();
    pairwise_distance_std_dev(&points)
}

/// Standard deviation of pairwise velocity distances.
pub fn velocity_dispersion<'a>(particles: impl IntoIterator<Item = &'a Particle>) -> f32 {
    let points: Vec<Vec2> = particles.into_iter().map(|p| p.velocity).collect();
    pairwise_distance_std_dev(&points)
}

/// Standard deviation of the distances between every pair of points.
///
/// Zero for fewer than two points.
#[must_use]
pub fn pairwise_distance_std_dev(points: &[Vec2]) -> f32 {
    if points.len() < 2 {
        return 0.0;
    }

    let mut count = 0.0_f64;
    let mut sum = 0.0_f64;
    let mut sum_sq = 0.0_f64;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            let d = f64::from(a.distance(*b));
            count += 1.0;
            sum += d;
            sum_sq += d * d;
        }
    }

    let mean = sum / count;
    let variance = (sum_sq / count - mean * mean).max(0.0);
    variance.sqrt() as f32
}
