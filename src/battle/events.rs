//! Battle events handed to the presentation layer
//!
//! The simulation never drives animation, health bars or screen fades
//! directly. It records what happened in a `BattleEventLog` and whoever
//! owns the presentation drains the log after each frame.

use serde::Serialize;

use crate::core::types::{GridCoord, Seconds, UnitId};
use crate::units::stats::Team;

/// Animation a unit should start playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnimationCue {
    PlayIdle,
    PlayMove,
    PlayAttack,
    PlayDeath,
}

/// Outcome of a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BattleOutcome {
    #[default]
    Undecided,
    Victory,
    Defeat,
}

/// Direction of the round-transition fade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FadeDirection {
    /// Fade the screen to black
    ToBlack,
    /// Fade back from black
    FromBlack,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BattleEventType {
    BattleStarted { friendly: usize, enemy: usize },
    TargetAcquired { unit_id: UnitId, target_id: UnitId },
    Animation { unit_id: UnitId, cue: AnimationCue },
    HealthChanged { unit_id: UnitId, current: u32, max: u32 },
    UnitDied { unit_id: UnitId, team: Team },
    CorpseRemoved { unit_id: UnitId },
    BattleEnded { outcome: BattleOutcome },
    FadeRequested { direction: FadeDirection },
    FadeTimedOut { direction: FadeDirection },
    BoardCleared,
    HeroRespawned { name: String, cell: GridCoord },
    RespawnSkipped { name: String, cell: GridCoord },
    ResolutionCancelled,
    RoundReset,
}

/// Log entry for battle events
#[derive(Debug, Clone, Serialize)]
pub struct BattleEvent {
    pub time: Seconds,
    pub event_type: BattleEventType,
    pub description: String,
}

/// Events from a single frame (or accumulated over several)
#[derive(Debug, Clone, Default)]
pub struct BattleEventLog {
    pub events: Vec<BattleEvent>,
}

impl BattleEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event_type: BattleEventType, description: String, time: Seconds) {
        self.events.push(BattleEvent {
            time,
            event_type,
            description,
        });
    }

    pub fn append(&mut self, other: &mut BattleEventLog) {
        self.events.append(&mut other.events);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattleEventType> {
        self.events.iter().map(|e| &e.event_type)
    }

    /// Animation cues emitted for one unit, in order
    pub fn cues_for(&self, unit_id: UnitId) -> Vec<AnimationCue> {
        self.iter()
            .filter_map(|e| match e {
                BattleEventType::Animation { unit_id: id, cue } if *id == unit_id => Some(*cue),
                _ => None,
            })
            .collect()
    }

    /// The outcome this log announces, if any
    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.iter().find_map(|e| match e {
            BattleEventType::BattleEnded { outcome } => Some(*outcome),
            _ => None,
        })
    }

    pub fn fade_requests(&self) -> Vec<FadeDirection> {
        self.iter()
            .filter_map(|e| match e {
                BattleEventType::FadeRequested { direction } => Some(*direction),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cues_filtered_by_unit() {
        let mut log = BattleEventLog::new();
        log.push(
            BattleEventType::Animation { unit_id: UnitId(1), cue: AnimationCue::PlayMove },
            String::new(),
            0.0,
        );
        log.push(
            BattleEventType::Animation { unit_id: UnitId(2), cue: AnimationCue::PlayIdle },
            String::new(),
            0.0,
        );
        log.push(
            BattleEventType::Animation { unit_id: UnitId(1), cue: AnimationCue::PlayAttack },
            String::new(),
            0.1,
        );
        assert_eq!(
            log.cues_for(UnitId(1)),
            vec![AnimationCue::PlayMove, AnimationCue::PlayAttack]
        );
    }

    #[test]
    fn test_outcome_lookup() {
        let mut log = BattleEventLog::new();
        assert_eq!(log.outcome(), None);
        log.push(
            BattleEventType::BattleEnded { outcome: BattleOutcome::Defeat },
            "Battle ended: Defeat".into(),
            4.0,
        );
        assert_eq!(log.outcome(), Some(BattleOutcome::Defeat));
    }

    #[test]
    fn test_append_moves_events() {
        let mut a = BattleEventLog::new();
        let mut b = BattleEventLog::new();
        b.push(BattleEventType::BoardCleared, "cleared".into(), 1.0);
        a.append(&mut b);
        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
    }
}
