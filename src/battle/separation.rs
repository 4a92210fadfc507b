//! Separation between nearby units
//!
//! Only moving or attacking units take part: a unit standing idle (or
//! dead) neither pushes nor is pushed. Each neighbor inside the avoidance
//! radius contributes a push away from itself, scaled by
//! `1 - distance / radius` and doubled inside personal space. The pushes
//! are averaged, so a crowd never produces an unbounded force.

use crate::battle::constants::{
    MIN_SEPARATION_PUSH, PATH_BLOCK_ANGLE_DEG, PATH_BLOCK_SPACE_FACTOR,
    PERSONAL_SPACE_MULTIPLIER,
};
use crate::battle::roster::UnitSnapshot;
use crate::battle::spatial::SparseHashGrid;
use crate::core::config::SeparationConfig;
use crate::core::types::{Seconds, Vec2};

/// Separation velocity for `acting`, scanning the whole roster
pub fn compute_separation(
    acting: &UnitSnapshot,
    roster: &[UnitSnapshot],
    config: &SeparationConfig,
) -> Vec2 {
    separation_from(acting, roster.iter(), config)
}

/// Separation velocity for `acting`, using a grid built over `snapshot`
pub fn compute_separation_indexed(
    acting: &UnitSnapshot,
    snapshot: &[UnitSnapshot],
    grid: &SparseHashGrid,
    config: &SeparationConfig,
) -> Vec2 {
    let candidates = grid
        .query_radius(acting.position, config.avoidance_radius, snapshot)
        .into_iter()
        .filter_map(|i| snapshot.get(i));
    separation_from(acting, candidates, config)
}

fn separation_from<'a>(
    acting: &UnitSnapshot,
    candidates: impl Iterator<Item = &'a UnitSnapshot>,
    config: &SeparationConfig,
) -> Vec2 {
    if !acting.state.is_mobile() {
        return Vec2::ZERO;
    }

    let mut force = Vec2::ZERO;
    let mut neighbors = 0usize;

    for other in candidates {
        if !pushes(acting, other, config) {
            continue;
        }

        let distance = acting.position.distance(&other.position);
        if distance >= config.avoidance_radius || distance <= config.min_separation_distance {
            continue;
        }

        let mut strength = 1.0 - distance / config.avoidance_radius;
        if distance < config.personal_space {
            strength *= PERSONAL_SPACE_MULTIPLIER;
        }

        let away = (acting.position - other.position).normalize();
        force += away * (strength * config.avoidance_force);
        neighbors += 1;
    }

    if neighbors == 0 {
        return Vec2::ZERO;
    }

    force / neighbors as f32
}

/// Turn a separation velocity into this tick's displacement
///
/// Negligible pushes are dropped so settled units stop jittering.
pub fn separation_displacement(velocity: Vec2, dt: Seconds) -> Vec2 {
    let step = velocity * dt;
    if step.length() > MIN_SEPARATION_PUSH {
        step
    } else {
        Vec2::ZERO
    }
}

fn pushes(acting: &UnitSnapshot, other: &UnitSnapshot, config: &SeparationConfig) -> bool {
    other.id != acting.id
        && other.state.is_mobile()
        && (!config.avoid_only_allies || other.team == acting.team)
}

/// Whether no unit that counts for separation stands in the way
///
/// A unit blocks the path when it is closer than the destination, lies
/// within a narrow cone around the heading and is near enough to bump
/// into. Dead units never block; idle ones do.
pub fn is_path_clear(
    acting: &UnitSnapshot,
    destination: Vec2,
    roster: &[UnitSnapshot],
    config: &SeparationConfig,
) -> bool {
    let heading = destination - acting.position;
    let travel = heading.length();
    let block_distance = config.personal_space * PATH_BLOCK_SPACE_FACTOR;

    !roster.iter().any(|other| {
        if other.id == acting.id || !other.is_alive() {
            return false;
        }
        if config.avoid_only_allies && other.team != acting.team {
            return false;
        }

        let to_other = other.position - acting.position;
        let dist = to_other.length();
        dist < travel && dist < block_distance && heading.angle_to(&to_other) < PATH_BLOCK_ANGLE_DEG
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::UnitId;
    use crate::units::combat_unit::UnitState;
    use crate::units::stats::Team;

    fn snap(id: u32, team: Team, x: f32, y: f32, state: UnitState) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId(id),
            team,
            position: Vec2::new(x, y),
            state,
        }
    }

    #[test]
    fn test_two_allies_push_apart_equally() {
        let config = SeparationConfig::default();
        let a = snap(0, Team::Friendly, 0.0, 0.0, UnitState::Moving);
        let b = snap(1, Team::Friendly, 10.0, 0.0, UnitState::Moving);
        let roster = vec![a, b];

        let push_a = compute_separation(&a, &roster, &config);
        let push_b = compute_separation(&b, &roster, &config);

        // (1 - 10/50) * 2 * 100 = 160
        assert!((push_a.length() - 160.0).abs() < 1e-3);
        assert!((push_a.length() - push_b.length()).abs() < 1e-4);
        assert!(push_a.x < 0.0 && push_b.x > 0.0);
        assert!((push_a + push_b).length() < 1e-4);
    }

    #[test]
    fn test_outside_personal_space_not_doubled() {
        let config = SeparationConfig::default();
        let a = snap(0, Team::Friendly, 0.0, 0.0, UnitState::Attacking);
        let b = snap(1, Team::Friendly, 40.0, 0.0, UnitState::Moving);
        let push = compute_separation(&a, &[a, b], &config);
        // (1 - 40/50) * 100 = 20
        assert!((push.length() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_pushes_are_averaged() {
        let config = SeparationConfig::default();
        let a = snap(0, Team::Friendly, 0.0, 0.0, UnitState::Moving);
        let left = snap(1, Team::Friendly, -10.0, 0.0, UnitState::Moving);
        let right = snap(2, Team::Friendly, 20.0, 0.0, UnitState::Moving);
        let push = compute_separation(&a, &[a, left, right], &config);
        // left pushes +160, right pushes -120, average +20
        assert!((push.x - 20.0).abs() < 1e-3);
        assert!(push.y.abs() < 1e-4);
    }

    #[test]
    fn test_no_neighbors_gives_zero() {
        let config = SeparationConfig::default();
        let a = snap(0, Team::Friendly, 0.0, 0.0, UnitState::Moving);
        let far = snap(1, Team::Friendly, 80.0, 0.0, UnitState::Moving);
        assert_eq!(compute_separation(&a, &[a, far], &config), Vec2::ZERO);
    }

    #[test]
    fn test_idle_and_dead_units_neither_push_nor_are_pushed() {
        let config = SeparationConfig::default();
        let idle = snap(0, Team::Friendly, 0.0, 0.0, UnitState::Idle);
        let moving = snap(1, Team::Friendly, 5.0, 0.0, UnitState::Moving);
        let dead = snap(2, Team::Friendly, 6.0, 0.0, UnitState::Dead);
        let roster = vec![idle, moving, dead];

        assert_eq!(compute_separation(&idle, &roster, &config), Vec2::ZERO);
        assert_eq!(compute_separation(&moving, &roster, &config), Vec2::ZERO);
    }

    #[test]
    fn test_enemies_ignored_when_allies_only() {
        let mut config = SeparationConfig::default();
        let a = snap(0, Team::Friendly, 0.0, 0.0, UnitState::Moving);
        let enemy = snap(1, Team::Enemy, 10.0, 0.0, UnitState::Attacking);
        assert_eq!(compute_separation(&a, &[a, enemy], &config), Vec2::ZERO);

        config.avoid_only_allies = false;
        assert!(compute_separation(&a, &[a, enemy], &config).length() > 0.0);
    }

    #[test]
    fn test_coincident_units_skipped() {
        let config = SeparationConfig::default();
        let a = snap(0, Team::Friendly, 0.0, 0.0, UnitState::Moving);
        let b = snap(1, Team::Friendly, 0.0, 0.0, UnitState::Moving);
        assert_eq!(compute_separation(&a, &[a, b], &config), Vec2::ZERO);
    }

    #[test]
    fn test_indexed_matches_full_scan() {
        let config = SeparationConfig::default();
        let roster = vec![
            snap(0, Team::Friendly, 0.0, 0.0, UnitState::Moving),
            snap(1, Team::Friendly, 12.0, 5.0, UnitState::Moving),
            snap(2, Team::Friendly, -20.0, 30.0, UnitState::Attacking),
            snap(3, Team::Friendly, 45.0, -10.0, UnitState::Moving),
            snap(4, Team::Friendly, 200.0, 0.0, UnitState::Moving),
        ];
        let grid = SparseHashGrid::from_snapshot(config.avoidance_radius, &roster);
        for unit in &roster {
            let full = compute_separation(unit, &roster, &config);
            let indexed = compute_separation_indexed(unit, &roster, &grid, &config);
            assert!((full - indexed).length() < 1e-3);
        }
    }

    #[test]
    fn test_small_displacement_dropped() {
        assert_eq!(separation_displacement(Vec2::new(0.5, 0.0), 0.01), Vec2::ZERO);
        let step = separation_displacement(Vec2::new(160.0, 0.0), 0.1);
        assert!((step.x - 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_path_blocked_by_ally_ahead() {
        let config = SeparationConfig::default();
        let me = snap(0, Team::Friendly, 0.0, 0.0, UnitState::Moving);
        let ally = snap(1, Team::Friendly, 20.0, 2.0, UnitState::Idle);
        assert!(!is_path_clear(&me, Vec2::new(100.0, 0.0), &[me, ally], &config));
    }

    #[test]
    fn test_path_clear_when_ally_off_heading() {
        let config = SeparationConfig::default();
        let me = snap(0, Team::Friendly, 0.0, 0.0, UnitState::Moving);
        let beside = snap(1, Team::Friendly, 0.0, 20.0, UnitState::Idle);
        let far_ahead = snap(2, Team::Friendly, 90.0, 0.0, UnitState::Idle);
        let roster = vec![me, beside, far_ahead];
        assert!(is_path_clear(&me, Vec2::new(100.0, 0.0), &roster, &config));
    }
}
