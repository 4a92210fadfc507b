//! Battle execution - the per-tick simulation loop
//!
//! Each tick runs in three phases over a snapshot of the roster taken at
//! the start of the tick:
//!
//! 1. Decide: cooldowns, targeting, state transitions and the intended
//!    displacement of every living unit, all read from the snapshot.
//! 2. Strike: ready attackers apply damage in roster order. A strike at a
//!    unit that died earlier in the phase does nothing, and a unit killed
//!    before its turn never strikes.
//! 3. Commit: surviving units apply their displacement.
//!
//! Computing every displacement before committing any keeps separation
//! and targeting independent of roster order. A neighbor pushes according
//! to its state in the snapshot while the acting unit uses the state it
//! just chose, so allies that all leave Idle on the same tick do not push
//! each other until the next one.

use std::sync::Arc;

use crate::battle::events::{AnimationCue, BattleEventLog, BattleEventType, BattleOutcome};
use crate::battle::roster::{Roster, UnitSnapshot};
use crate::battle::separation::{compute_separation_indexed, separation_displacement};
use crate::battle::spatial::SparseHashGrid;
use crate::battle::targeting::{NearestEnemy, TargetingPolicy};
use crate::core::config::BattleConfig;
use crate::core::types::{GridCoord, Seconds, UnitId, Vec2};
use crate::units::combat_unit::{DamageOutcome, UnitState};
use crate::units::stats::{Team, UnitStats};

/// What a unit decided to do this tick
#[derive(Debug, Clone, Copy)]
struct Intent {
    unit_id: UnitId,
    displacement: Vec2,
    strike: Option<UnitId>,
    /// The unit switched to Attacking this tick and already got its cue
    entered_attack: bool,
}

/// Complete battle state
pub struct BattleState {
    pub roster: Roster,
    pub elapsed: Seconds,
    pub outcome: BattleOutcome,
    config: BattleConfig,
    targeting: Box<dyn TargetingPolicy>,
    /// Teams that had at least one unit when spawned into this battle
    teams_present: [bool; 2],
}

impl BattleState {
    pub fn new(config: BattleConfig) -> Self {
        Self {
            roster: Roster::new(),
            elapsed: 0.0,
            outcome: BattleOutcome::Undecided,
            config,
            targeting: Box::new(NearestEnemy),
            teams_present: [false; 2],
        }
    }

    /// Replace the targeting policy
    pub fn with_targeting(mut self, policy: impl TargetingPolicy + 'static) -> Self {
        self.targeting = Box::new(policy);
        self
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn spawn(
        &mut self,
        stats: Arc<UnitStats>,
        position: Vec2,
        origin_cell: Option<GridCoord>,
    ) -> UnitId {
        self.teams_present[stats.team as usize] = true;
        self.roster.spawn(stats, position, origin_cell)
    }

    pub fn is_finished(&self) -> bool {
        self.outcome != BattleOutcome::Undecided
    }

    pub fn alive_count(&self, team: Team) -> usize {
        self.roster.alive_count(team)
    }

    /// Whether the battle can never end on its own
    ///
    /// True when a side was never present, or both sides are wiped out in
    /// the same tick. Neither case counts as victory or defeat.
    pub fn is_stalled(&self) -> bool {
        if self.is_finished() {
            return false;
        }
        let both_present = self.teams_present.iter().all(|&p| p);
        !both_present
            || (self.alive_count(Team::Friendly) == 0 && self.alive_count(Team::Enemy) == 0)
    }

    /// Whether both teams have fielded units in this battle
    pub fn had_both_teams(&self) -> bool {
        self.teams_present.iter().all(|&p| p)
    }

    /// Drop every unit and start over with an undecided outcome
    pub fn reset(&mut self) {
        self.roster.clear();
        self.elapsed = 0.0;
        self.outcome = BattleOutcome::Undecided;
        self.teams_present = [false; 2];
    }

    /// Restore health to a living unit, clamped at its maximum
    pub fn heal(&mut self, unit_id: UnitId, amount: u32) -> BattleEventLog {
        let mut events = BattleEventLog::new();
        let now = self.elapsed;
        if let Some(unit) = self.roster.get_mut(unit_id) {
            let healed = unit.heal(amount);
            if healed > 0 {
                events.push(
                    BattleEventType::HealthChanged {
                        unit_id,
                        current: unit.current_health(),
                        max: unit.max_health(),
                    },
                    format!("{} healed for {}", unit.name(), healed),
                    now,
                );
            }
        }
        events
    }

    /// Run a single simulation tick
    pub fn run_tick(&mut self, dt: Seconds) -> BattleEventLog {
        let mut events = BattleEventLog::new();

        if self.is_finished() {
            return events;
        }

        self.elapsed += dt;

        // ===== PHASE 1: DECIDE =====
        let intents = self.phase_decide(dt, &mut events);

        // ===== PHASE 2: STRIKE =====
        self.phase_strike(&intents, &mut events);

        // ===== PHASE 3: COMMIT =====
        self.phase_commit(&intents);

        self.remove_corpses(&mut events);

        if let Some(outcome) = check_battle_end(self) {
            self.outcome = outcome;
            tracing::info!(
                "Battle ended: {:?} after {:.2}s ({} friendly, {} enemy alive)",
                outcome,
                self.elapsed,
                self.alive_count(Team::Friendly),
                self.alive_count(Team::Enemy)
            );
            events.push(
                BattleEventType::BattleEnded { outcome },
                format!("Battle ended: {:?}", outcome),
                self.elapsed,
            );
        }

        events
    }

    fn phase_decide(&mut self, dt: Seconds, events: &mut BattleEventLog) -> Vec<Intent> {
        let now = self.elapsed;
        let snapshot = self.roster.snapshot();
        let grid = SparseHashGrid::from_snapshot(self.config.separation.avoidance_radius, &snapshot);
        let mut intents = Vec::with_capacity(snapshot.len());

        for (i, view) in snapshot.iter().enumerate() {
            let current_target = self.roster.units()[i]
                .target
                .and_then(|t| self.roster.index_of(t))
                .filter(|&j| snapshot[j].is_alive());

            let unit = &mut self.roster.units_mut()[i];

            if unit.is_dead() {
                unit.tick_corpse(dt);
                continue;
            }

            unit.tick_cooldown(dt);

            let target_idx = match current_target {
                Some(j) => Some(j),
                None => {
                    let picked = self.targeting.select_target(view, &snapshot);
                    unit.target = picked;
                    if let Some(target_id) = picked {
                        tracing::debug!("{} ({}) targets {}", unit.name(), unit.id, target_id);
                        events.push(
                            BattleEventType::TargetAcquired {
                                unit_id: unit.id,
                                target_id,
                            },
                            format!("{} acquired target {}", unit.name(), target_id),
                            now,
                        );
                    }
                    picked.and_then(|t| self.roster.index_of(t))
                }
            };

            let unit = &mut self.roster.units_mut()[i];
            let mut displacement = Vec2::ZERO;
            let mut strike = None;

            let next_state = match target_idx {
                None => UnitState::Idle,
                Some(j) => {
                    let target_pos = snapshot[j].position;
                    let distance = view.position.distance(&target_pos);
                    if distance <= unit.stats.attack_range {
                        if unit.ready_to_attack() {
                            strike = Some(snapshot[j].id);
                        }
                        UnitState::Attacking
                    } else {
                        let step = (unit.stats.move_speed * dt).min(distance);
                        displacement = (target_pos - view.position).normalize() * step;
                        UnitState::Moving
                    }
                }
            };

            let changed = unit.set_state(next_state);
            if changed {
                let cue = match next_state {
                    UnitState::Idle => AnimationCue::PlayIdle,
                    UnitState::Moving => AnimationCue::PlayMove,
                    UnitState::Attacking => AnimationCue::PlayAttack,
                    UnitState::Dead => AnimationCue::PlayDeath,
                };
                events.push(
                    BattleEventType::Animation {
                        unit_id: unit.id,
                        cue,
                    },
                    format!("{} is now {:?}", unit.name(), next_state),
                    now,
                );
            }

            if next_state.is_mobile() {
                let acting = UnitSnapshot {
                    state: next_state,
                    ..*view
                };
                let velocity =
                    compute_separation_indexed(&acting, &snapshot, &grid, &self.config.separation);
                displacement += separation_displacement(velocity, dt);
            }

            intents.push(Intent {
                unit_id: unit.id,
                displacement,
                strike,
                entered_attack: changed && next_state == UnitState::Attacking,
            });
        }

        intents
    }

    fn phase_strike(&mut self, intents: &[Intent], events: &mut BattleEventLog) {
        let now = self.elapsed;

        for intent in intents {
            let Some(target_id) = intent.strike else {
                continue;
            };

            let (damage, attacker_name) = match self.roster.get(intent.unit_id) {
                Some(attacker) if attacker.ready_to_attack() => {
                    (attacker.stats.damage, attacker.name().to_string())
                }
                _ => continue,
            };

            let Some(target) = self.roster.get_mut(target_id) else {
                continue;
            };

            let outcome = target.take_damage(damage);
            if outcome == DamageOutcome::Ignored {
                tracing::debug!("{} struck at dead {}; ignored", attacker_name, target_id);
                continue;
            }

            let target_name = target.name().to_string();
            let target_team = target.team();
            let current = target.current_health();
            let max = target.max_health();

            if let Some(attacker) = self.roster.get_mut(intent.unit_id) {
                attacker.reset_cooldown();
            }

            if !intent.entered_attack {
                events.push(
                    BattleEventType::Animation {
                        unit_id: intent.unit_id,
                        cue: AnimationCue::PlayAttack,
                    },
                    format!("{} attacks {}", attacker_name, target_name),
                    now,
                );
            }

            if damage > 0 {
                events.push(
                    BattleEventType::HealthChanged {
                        unit_id: target_id,
                        current,
                        max,
                    },
                    format!("{} hits {} for {}", attacker_name, target_name, damage),
                    now,
                );
            }

            if outcome == DamageOutcome::Killed {
                tracing::debug!("{} ({}) killed by {}", target_name, target_id, attacker_name);
                events.push(
                    BattleEventType::UnitDied {
                        unit_id: target_id,
                        team: target_team,
                    },
                    format!("{} died", target_name),
                    now,
                );
                events.push(
                    BattleEventType::Animation {
                        unit_id: target_id,
                        cue: AnimationCue::PlayDeath,
                    },
                    format!("{} falls", target_name),
                    now,
                );
            }
        }
    }

    fn phase_commit(&mut self, intents: &[Intent]) {
        for intent in intents {
            if intent.displacement == Vec2::ZERO {
                continue;
            }
            if let Some(unit) = self.roster.get_mut(intent.unit_id) {
                if unit.is_alive() {
                    unit.position += intent.displacement;
                }
            }
        }
    }

    fn remove_corpses(&mut self, events: &mut BattleEventLog) {
        let retention = self.config.combat.corpse_retention;
        if retention <= 0.0 {
            return;
        }

        let removed = self
            .roster
            .remove_where(|u| u.is_dead() && u.dead_for() >= retention);
        for unit_id in removed {
            events.push(
                BattleEventType::CorpseRemoved { unit_id },
                format!("Corpse of {} removed", unit_id),
                self.elapsed,
            );
        }
    }
}

/// Check if the battle has ended
///
/// Victory needs no live enemies and at least one live friendly; defeat is
/// the mirror. A battle that never had both teams, or where both are wiped
/// out together, has no outcome.
pub fn check_battle_end(state: &BattleState) -> Option<BattleOutcome> {
    if !state.had_both_teams() {
        return None;
    }

    let friendly = state.alive_count(Team::Friendly);
    let enemy = state.alive_count(Team::Enemy);

    match (friendly, enemy) {
        (f, 0) if f > 0 => Some(BattleOutcome::Victory),
        (0, e) if e > 0 => Some(BattleOutcome::Defeat),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero(hp: u32, dmg: u32) -> Arc<UnitStats> {
        Arc::new(
            UnitStats::new("Hero", Team::Friendly)
                .with_health(hp)
                .with_damage(dmg),
        )
    }

    fn grunt(hp: u32, dmg: u32) -> Arc<UnitStats> {
        Arc::new(
            UnitStats::new("Grunt", Team::Enemy)
                .with_health(hp)
                .with_damage(dmg),
        )
    }

    fn run_until_done(state: &mut BattleState, dt: Seconds, max_seconds: Seconds) -> BattleEventLog {
        let mut all = BattleEventLog::new();
        while !state.is_finished() && state.elapsed < max_seconds {
            let mut events = state.run_tick(dt);
            all.append(&mut events);
        }
        all
    }

    #[test]
    fn test_harmless_defender_dies_in_two_cycles() {
        let mut state = BattleState::new(BattleConfig::default());
        let a = state.spawn(hero(100, 10), Vec2::ZERO, None);
        let b = state.spawn(grunt(15, 0), Vec2::ZERO, None);

        run_until_done(&mut state, 0.5, 2.0);

        assert_eq!(state.outcome, BattleOutcome::Victory);
        assert!(state.elapsed <= 2.0);
        assert_eq!(state.roster.get(a).unwrap().current_health(), 100);
        assert!(state.roster.get(b).unwrap().is_dead());
    }

    #[test]
    fn test_exchange_leaves_attacker_at_ninety() {
        let mut state = BattleState::new(BattleConfig::default());
        let a = state.spawn(hero(100, 10), Vec2::ZERO, None);
        let b = state.spawn(grunt(15, 10), Vec2::ZERO, None);

        run_until_done(&mut state, 0.5, 2.0);

        assert_eq!(state.outcome, BattleOutcome::Victory);
        assert_eq!(state.roster.get(a).unwrap().current_health(), 90);
        assert_eq!(state.roster.get(b).unwrap().current_health(), 0);
    }

    #[test]
    fn test_cooldown_limits_damage_per_period() {
        let mut state = BattleState::new(BattleConfig::default());
        state.spawn(hero(100, 10), Vec2::ZERO, None);
        let b = state.spawn(grunt(1000, 0), Vec2::ZERO, None);

        // Ten ticks inside one cooldown window
        for _ in 0..10 {
            state.run_tick(0.05);
        }
        assert_eq!(state.roster.get(b).unwrap().current_health(), 990);
    }

    #[test]
    fn test_unit_moves_toward_target_then_attacks() {
        let mut state = BattleState::new(BattleConfig::default());
        let a = state.spawn(hero(100, 10), Vec2::ZERO, None);
        let b = state.spawn(grunt(100, 0), Vec2::new(5.0, 0.0), None);

        let events = state.run_tick(0.5);
        let hero_pos = state.roster.get(a).unwrap().position;
        assert!((hero_pos.x - 1.0).abs() < 1e-4);
        assert_eq!(events.cues_for(a), vec![AnimationCue::PlayMove]);
        assert_eq!(state.roster.get(b).unwrap().position.x, 4.0);

        // Both close the gap; within range they switch to Attacking
        let mut all = BattleEventLog::new();
        for _ in 0..4 {
            let mut e = state.run_tick(0.5);
            all.append(&mut e);
        }
        assert_eq!(state.roster.get(a).unwrap().state(), UnitState::Attacking);
        assert!(all.cues_for(a).contains(&AnimationCue::PlayAttack));
    }

    #[test]
    fn test_allies_leaving_idle_push_from_second_tick() {
        let mut state = BattleState::new(BattleConfig::default());
        let a = state.spawn(hero(100, 10), Vec2::ZERO, None);
        let b = state.spawn(hero(100, 10), Vec2::new(0.0, 10.0), None);
        state.spawn(grunt(100, 0), Vec2::new(1000.0, 0.0), None);

        // Neighbors were Idle in the snapshot: no push yet
        state.run_tick(0.1);
        assert_eq!(state.roster.get(a).unwrap().position.y, 0.0);
        assert_eq!(state.roster.get(a).unwrap().state(), UnitState::Moving);
        assert_eq!(state.roster.get(b).unwrap().state(), UnitState::Moving);

        state.run_tick(0.1);
        assert!(state.roster.get(a).unwrap().position.y < -1.0);
        assert!(state.roster.get(b).unwrap().position.y > 11.0);
    }

    #[test]
    fn test_movement_never_overshoots() {
        let mut state = BattleState::new(BattleConfig::default());
        let runner = UnitStats::new("Runner", Team::Friendly)
            .with_move_speed(100.0)
            .with_attack_range(0.5);
        let post = UnitStats::new("Post", Team::Enemy).with_move_speed(0.0);
        let a = state.spawn(Arc::new(runner), Vec2::ZERO, None);
        state.spawn(Arc::new(post), Vec2::new(3.0, 0.0), None);

        state.run_tick(1.0);
        assert!(state.roster.get(a).unwrap().position.x <= 3.0 + 1e-4);
    }

    #[test]
    fn test_idle_without_enemies() {
        let mut state = BattleState::new(BattleConfig::default());
        let a = state.spawn(hero(100, 10), Vec2::ZERO, None);
        let events = state.run_tick(0.1);

        assert_eq!(state.roster.get(a).unwrap().state(), UnitState::Idle);
        assert!(events.cues_for(a).is_empty());
        // One-sided battles never resolve
        assert_eq!(state.outcome, BattleOutcome::Undecided);
        assert!(state.is_stalled());
    }

    #[test]
    fn test_empty_roster_stalls() {
        let mut state = BattleState::new(BattleConfig::default());
        for _ in 0..100 {
            state.run_tick(0.1);
        }
        assert_eq!(check_battle_end(&state), None);
        assert!(state.is_stalled());
    }

    #[test]
    fn test_killed_unit_does_not_strike_back() {
        let mut state = BattleState::new(BattleConfig::default());
        let a = state.spawn(hero(100, 50), Vec2::ZERO, None);
        state.spawn(grunt(50, 30), Vec2::ZERO, None);

        state.run_tick(0.1);
        assert_eq!(state.roster.get(a).unwrap().current_health(), 100);
        assert_eq!(state.outcome, BattleOutcome::Victory);
    }

    #[test]
    fn test_death_emits_events_once() {
        let mut state = BattleState::new(BattleConfig::default());
        state.spawn(hero(100, 50), Vec2::ZERO, None);
        let b = state.spawn(grunt(50, 0), Vec2::ZERO, None);

        let events = state.run_tick(0.1);
        let deaths = events
            .iter()
            .filter(|e| matches!(e, BattleEventType::UnitDied { unit_id, .. } if *unit_id == b))
            .count();
        assert_eq!(deaths, 1);
        assert_eq!(events.cues_for(b).last(), Some(&AnimationCue::PlayDeath));
        assert_eq!(events.outcome(), Some(BattleOutcome::Victory));
    }

    #[test]
    fn test_corpses_removed_after_retention() {
        let mut state = BattleState::new(BattleConfig::default());
        state.spawn(hero(100, 5), Vec2::ZERO, None);
        let b = state.spawn(grunt(5, 0), Vec2::ZERO, None);
        state.spawn(grunt(1000, 0), Vec2::new(10.0, 0.0), None);

        state.run_tick(0.5);
        assert!(state.roster.get(b).unwrap().is_dead());

        let mut removed = false;
        for _ in 0..8 {
            let events = state.run_tick(0.5);
            removed |= events
                .iter()
                .any(|e| matches!(e, BattleEventType::CorpseRemoved { unit_id } if *unit_id == b));
        }
        assert!(removed);
        assert!(!state.roster.contains(b));
    }

    #[test]
    fn test_retargets_after_target_dies() {
        let mut state = BattleState::new(BattleConfig::default());
        let a = state.spawn(hero(100, 100), Vec2::ZERO, None);
        let near = state.spawn(grunt(10, 0), Vec2::new(1.0, 0.0), None);
        let far = state.spawn(grunt(10, 0), Vec2::new(8.0, 0.0), None);

        state.run_tick(0.1);
        assert!(state.roster.get(near).unwrap().is_dead());

        state.run_tick(0.1);
        assert_eq!(state.roster.get(a).unwrap().target, Some(far));
    }

    #[test]
    fn test_heal_emits_health_change() {
        let mut state = BattleState::new(BattleConfig::default());
        let b = state.spawn(grunt(100, 0), Vec2::ZERO, None);
        state.roster.get_mut(b).unwrap().take_damage(40);

        let events = state.heal(b, 100);
        assert_eq!(state.roster.get(b).unwrap().current_health(), 100);
        assert!(matches!(
            events.iter().next(),
            Some(BattleEventType::HealthChanged { current: 100, max: 100, .. })
        ));
    }

    #[test]
    fn test_finished_battle_does_not_tick() {
        let mut state = BattleState::new(BattleConfig::default());
        state.spawn(hero(100, 100), Vec2::ZERO, None);
        state.spawn(grunt(10, 0), Vec2::ZERO, None);
        state.run_tick(0.1);
        assert!(state.is_finished());

        let elapsed = state.elapsed;
        assert!(state.run_tick(0.1).is_empty());
        assert_eq!(state.elapsed, elapsed);
    }
}
