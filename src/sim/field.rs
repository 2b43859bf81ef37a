//! Force field from player-placed wells
//!
//! Each well contributes an inverse-square pull (or push) on every dynamic
//! body. Contributions are summed, applied to velocity, and the resulting
//! speed is clamped so orbits can't run away.

use glam::Vec2;

use super::bodies::{Debris, Particle, Well};
use crate::clamp_length;
use crate::tuning::Tuning;

/// Acceleration contributed by one well on a body at `pos`
///
/// Distance is clamped below at `min_gravity_dist` and the magnitude at
/// `max_force`. Attractors point toward the well, repulsors away from it.
pub fn well_force(pos: Vec2, well: &Well, tuning: &Tuning) -> Vec2 {
    let delta = well.pos - pos;
    let raw_dist = delta.length();
    if raw_dist <= f32::EPSILON {
        // Sitting on the well: direction undefined
        return Vec2::ZERO;
    }

    let dist = raw_dist.max(tuning.min_gravity_dist);
    let magnitude = (tuning.g_constant * (well.strength.abs() / tuning.default_strength)
        / (dist * dist))
        .min(tuning.max_force);

    let dir = delta / raw_dist;
    if well.is_attractor() {
        dir * magnitude
    } else {
        -dir * magnitude
    }
}

/// Summed acceleration of all wells at a point
pub fn field_at(pos: Vec2, wells: &[Well], tuning: &Tuning) -> Vec2 {
    wells
        .iter()
        .fold(Vec2::ZERO, |acc, well| acc + well_force(pos, well, tuning))
}

/// Accumulate well forces into `vel` and clamp the resulting speed
///
/// `response` scales how strongly the body feels the field (1.0 for the
/// particle). Position is not touched.
pub fn apply_forces(
    pos: Vec2,
    vel: &mut Vec2,
    wells: &[Well],
    dt: f32,
    response: f32,
    tuning: &Tuning,
) {
    let accel = field_at(pos, wells, tuning) * response;
    *vel = clamp_length(*vel + accel * dt, tuning.max_speed);
}

/// Advance a position by a velocity
#[inline]
pub fn integrate(pos: Vec2, vel: Vec2, dt: f32) -> Vec2 {
    pos + vel * dt
}

/// Semi-implicit Euler step for the particle
pub fn step_particle(particle: &mut Particle, wells: &[Well], dt: f32, tuning: &Tuning) {
    apply_forces(particle.pos, &mut particle.vel, wells, dt, 1.0, tuning);
    particle.pos = integrate(particle.pos, particle.vel, dt);
}

/// Step debris: weaker field response, plus rotation
pub fn step_debris(debris: &mut Debris, wells: &[Well], dt: f32, tuning: &Tuning) {
    apply_forces(
        debris.pos,
        &mut debris.vel,
        wells,
        dt,
        tuning.debris_field_factor,
        tuning,
    );
    debris.pos = integrate(debris.pos, debris.vel, dt);
    debris.rotation = (debris.rotation + debris.spin * dt) % std::f32::consts::TAU;
}

/// Advance render-only well pulse phases
pub fn advance_well_phases(wells: &mut [Well], rate: f32, dt: f32) {
    for well in wells {
        well.phase = (well.phase + rate * dt) % std::f32::consts::TAU;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use proptest::prelude::*;

    fn well(x: f32, y: f32, strength: f32) -> Well {
        Well {
            id: 1,
            pos: Vec2::new(x, y),
            strength,
            phase: 0.0,
        }
    }

    #[test]
    fn test_attractor_pulls_repulsor_pushes() {
        let tuning = Tuning::default();
        let body = Vec2::new(100.0, 100.0);
        let pull = well_force(body, &well(200.0, 100.0, 100.0), &tuning);
        let push = well_force(body, &well(200.0, 100.0, -100.0), &tuning);
        assert!(pull.x > 0.0);
        assert!(push.x < 0.0);
        assert!((pull.x + push.x).abs() < 1e-6);
    }

    #[test]
    fn test_force_golden_value() {
        // G * (|s| / 100) / d² = 1000 * 1 / 200² = 0.025
        let tuning = Tuning::default();
        let f = well_force(Vec2::new(200.0, 300.0), &well(400.0, 300.0, 100.0), &tuning);
        assert!((f.x - 0.025).abs() < 1e-6);
        assert!(f.y.abs() < 1e-6);
    }

    #[test]
    fn test_force_clamped_near_well() {
        let tuning = Tuning::default();
        let f = well_force(Vec2::new(399.0, 300.0), &well(400.0, 300.0, 300.0), &tuning);
        assert!((f.length() - tuning.max_force).abs() < 1e-6);
    }

    #[test]
    fn test_body_on_well_gets_no_force() {
        let tuning = Tuning::default();
        let f = well_force(Vec2::new(400.0, 300.0), &well(400.0, 300.0, 100.0), &tuning);
        assert_eq!(f, Vec2::ZERO);
    }

    #[test]
    fn test_attractor_to_the_right_pulls_steadily() {
        let tuning = Tuning::default();
        let wells = [well(400.0, 300.0, 100.0)];
        let mut particle = Particle::new(Vec2::new(200.0, 300.0), Vec2::ZERO);

        let mut prev_x = particle.pos.x;
        for _ in 0..60 {
            if (wells[0].pos - particle.pos).length() < tuning.min_gravity_dist {
                break;
            }
            step_particle(&mut particle, &wells, SIM_DT, &tuning);
            assert!(particle.pos.x > prev_x, "x must strictly increase");
            assert!((particle.pos.y - 300.0).abs() < 1e-4);
            prev_x = particle.pos.x;
        }
    }

    #[test]
    fn test_debris_feels_weaker_field() {
        let tuning = Tuning::default();
        let wells = [well(400.0, 300.0, 100.0)];
        let mut particle = Particle::new(Vec2::new(200.0, 300.0), Vec2::ZERO);
        let mut debris = Debris {
            pos: Vec2::new(200.0, 300.0),
            vel: Vec2::ZERO,
            radius: 10.0,
            rotation: 0.0,
            spin: 0.1,
            outline: Vec::new(),
        };
        step_particle(&mut particle, &wells, SIM_DT, &tuning);
        step_debris(&mut debris, &wells, SIM_DT, &tuning);
        assert!((debris.vel.x - particle.vel.x * DEBRIS_FIELD_FACTOR).abs() < 1e-6);
        assert!((debris.rotation - 0.1).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn per_well_force_is_bounded(
            bx in -100.0f32..900.0, by in -100.0f32..700.0,
            wx in 0.0f32..800.0, wy in 0.0f32..600.0,
            strength in -300.0f32..300.0,
        ) {
            let tuning = Tuning::default();
            let f = well_force(Vec2::new(bx, by), &well(wx, wy, strength), &tuning);
            prop_assert!(f.length() <= tuning.max_force + 1e-5);
        }

        #[test]
        fn speed_clamped_after_integration(
            vx in -50.0f32..50.0, vy in -50.0f32..50.0,
            wells in prop::collection::vec((0.0f32..800.0, 0.0f32..600.0, -300.0f32..300.0), 0..5),
        ) {
            let tuning = Tuning::default();
            let wells: Vec<Well> = wells.into_iter().map(|(x, y, s)| well(x, y, s)).collect();
            let mut particle = Particle::new(Vec2::new(400.0, 300.0), Vec2::new(vx, vy));
            step_particle(&mut particle, &wells, SIM_DT, &tuning);
            prop_assert!(particle.vel.length() <= tuning.max_speed + 1e-4);
        }
    }
}
