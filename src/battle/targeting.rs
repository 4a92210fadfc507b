//! Target acquisition
//!
//! A unit re-runs its policy only when it has no target or its target is
//! dead or gone from the roster.

use ordered_float::OrderedFloat;

use crate::battle::roster::UnitSnapshot;
use crate::core::types::UnitId;

/// Strategy for choosing whom a unit attacks
pub trait TargetingPolicy {
    /// Pick a target for `acting` among `roster`; pure query
    fn select_target(&self, acting: &UnitSnapshot, roster: &[UnitSnapshot]) -> Option<UnitId>;
}

/// Closest living unit of the other team
///
/// Ties on exact distance go to the unit earliest in roster order.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestEnemy;

impl TargetingPolicy for NearestEnemy {
    fn select_target(&self, acting: &UnitSnapshot, roster: &[UnitSnapshot]) -> Option<UnitId> {
        roster
            .iter()
            .filter(|other| is_eligible(acting, other))
            .min_by_key(|other| OrderedFloat(acting.position.distance(&other.position)))
            .map(|other| other.id)
    }
}

/// Whether `other` may be attacked by `acting`
pub fn is_eligible(acting: &UnitSnapshot, other: &UnitSnapshot) -> bool {
    other.id != acting.id && other.is_alive() && other.team != acting.team
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec2;
    use crate::units::combat_unit::UnitState;
    use crate::units::stats::Team;

    fn snap(id: u32, team: Team, x: f32, state: UnitState) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId(id),
            team,
            position: Vec2::new(x, 0.0),
            state,
        }
    }

    #[test]
    fn test_selects_nearest_enemy() {
        let me = snap(0, Team::Friendly, 0.0, UnitState::Idle);
        let roster = vec![
            me,
            snap(1, Team::Enemy, 10.0, UnitState::Idle),
            snap(2, Team::Enemy, 4.0, UnitState::Idle),
            snap(3, Team::Enemy, 7.0, UnitState::Idle),
        ];
        assert_eq!(NearestEnemy.select_target(&me, &roster), Some(UnitId(2)));
    }

    #[test]
    fn test_never_selects_self_ally_or_dead() {
        let me = snap(0, Team::Friendly, 0.0, UnitState::Idle);
        let roster = vec![
            me,
            snap(1, Team::Friendly, 1.0, UnitState::Idle),
            snap(2, Team::Enemy, 2.0, UnitState::Dead),
            snap(3, Team::Enemy, 9.0, UnitState::Moving),
        ];
        assert_eq!(NearestEnemy.select_target(&me, &roster), Some(UnitId(3)));
    }

    #[test]
    fn test_none_without_eligible_enemy() {
        let me = snap(0, Team::Enemy, 0.0, UnitState::Idle);
        let roster = vec![
            me,
            snap(1, Team::Enemy, 1.0, UnitState::Idle),
            snap(2, Team::Friendly, 2.0, UnitState::Dead),
        ];
        assert_eq!(NearestEnemy.select_target(&me, &roster), None);
    }

    #[test]
    fn test_tie_goes_to_earliest_in_roster() {
        let me = snap(0, Team::Friendly, 0.0, UnitState::Idle);
        let roster = vec![
            me,
            snap(5, Team::Enemy, 3.0, UnitState::Idle),
            snap(4, Team::Enemy, -3.0, UnitState::Idle),
        ];
        assert_eq!(NearestEnemy.select_target(&me, &roster), Some(UnitId(5)));
    }
}
