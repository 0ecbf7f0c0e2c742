use crate::geometry::{Ray, Vec3f};
use crate::scene::{Primitive, Scene};

// upper bound on samples along one ray; RenderConfig::validate rejects configs above it
pub const MAX_MARCH_STEPS: u64 = 10_000_000;

#[derive(Clone, Debug)]
pub struct Hit<'a> {
    pub primitive: &'a Primitive,
    pub index: usize,
    // first sample inside `primitive`, at most one step past its surface
    pub position: Vec3f,
}

/// Number of increments needed to travel `max_distance`: one `initial_step`,
/// then as many `step`s as it takes to reach the budget.
pub fn step_count(max_distance: f64, step: f64, initial_step: f64) -> Option<u64> {
    if !(step > 0.0 && initial_step > 0.0) || max_distance.is_nan() {
        return None;
    }
    if max_distance <= 0.0 {
        return Some(0);
    }
    let remaining = ((max_distance - initial_step) / step).ceil().max(0.0);
    if remaining.is_finite() && remaining < MAX_MARCH_STEPS as f64 {
        Some(1 + remaining as u64)
    } else {
        None
    }
}

/// Walks `ray` in fixed increments until `max_distance` has been travelled.
/// Primitives are tested in scene order and the first one containing the sample
/// is returned, which is not necessarily the one nearest to the ray origin.
pub fn march<'a>(
    scene: &'a Scene,
    ray: &Ray,
    max_distance: f64,
    step: f64,
    initial_step: f64,
) -> Option<Hit<'a>> {
    let steps = match step_count(max_distance, step, initial_step) {
        Some(steps) => steps,
        None => {
            log::debug!(
                "refusing to march {} with step {} / {}",
                max_distance,
                step,
                initial_step
            );
            return None;
        }
    };
    let mut position = ray.origin;
    let mut increment = initial_step;
    for _ in 0..steps {
        position += ray.direction() * increment;
        if let Some((index, primitive)) = scene
            .primitives
            .iter()
            .enumerate()
            .find(|(_, primitive)| primitive.contains(&position))
        {
            return Some(Hit {
                primitive,
                index,
                position,
            });
        }
        increment = step;
    }
    None
}
