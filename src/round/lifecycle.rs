//! Round lifecycle: placement, battle, resolution
//!
//! `BattleSimulation` owns the placement board and the battle. Starting a
//! battle saves the friendly placements, locks the board and builds the
//! roster from every occupant. A victory runs the resolution schedule,
//! which clears the board and puts the saved heroes back where they
//! stood. A defeat halts the round until `restart`.

use std::fmt;
use std::sync::Arc;

use crate::battle::events::{BattleEventLog, BattleEventType, BattleOutcome};
use crate::battle::execution::BattleState;
use crate::board::layout::IsoLayout;
use crate::board::placement::PlacementBoard;
use crate::core::config::BattleConfig;
use crate::core::error::{BattleError, PlacementError, Result};
use crate::core::types::{GridCoord, Seconds};
use crate::round::resolution::{ResolutionAction, ResolutionSchedule};
use crate::units::stats::{Team, UnitStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Board editable, no battle running
    Placement,
    /// Combat running, board locked
    Active,
    /// Applying the outcome of the last battle
    Resolving(BattleOutcome),
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundPhase::Placement => write!(f, "Placement"),
            RoundPhase::Active => write!(f, "Active"),
            RoundPhase::Resolving(outcome) => write!(f, "Resolving({:?})", outcome),
        }
    }
}

/// A friendly unit as placed before the battle, kept for respawn
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRecord {
    pub cell: GridCoord,
    pub stats: UnitStats,
}

pub struct BattleSimulation {
    config: BattleConfig,
    board: PlacementBoard,
    layout: IsoLayout,
    battle: BattleState,
    phase: RoundPhase,
    saved: Vec<PlacementRecord>,
    resolution: Option<ResolutionSchedule>,
    /// Simulated time across all phases
    clock: Seconds,
}

impl BattleSimulation {
    pub fn new(config: BattleConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            board: PlacementBoard::from_config(&config.board),
            layout: IsoLayout::from_config(&config.board),
            battle: BattleState::new(config.clone()),
            config,
            phase: RoundPhase::Placement,
            saved: Vec::new(),
            resolution: None,
            clock: 0.0,
        })
    }

    /// Replace the battle state, e.g. to install another targeting policy
    pub fn with_battle(mut self, battle: BattleState) -> Self {
        self.battle = battle;
        self
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn board(&self) -> &PlacementBoard {
        &self.board
    }

    /// Mutable board access, e.g. for a wave spawner
    ///
    /// The board's own lock still applies.
    pub fn board_mut(&mut self) -> &mut PlacementBoard {
        &mut self.board
    }

    pub fn layout(&self) -> &IsoLayout {
        &self.layout
    }

    pub fn battle(&self) -> &BattleState {
        &self.battle
    }

    pub fn saved_placements(&self) -> &[PlacementRecord] {
        &self.saved
    }

    pub fn resolution(&self) -> Option<&ResolutionSchedule> {
        self.resolution.as_ref()
    }

    pub fn clock(&self) -> Seconds {
        self.clock
    }

    pub fn place(
        &mut self,
        cell: GridCoord,
        stats: Arc<UnitStats>,
    ) -> std::result::Result<(), PlacementError> {
        let result = self.board.place(cell, stats);
        if let Err(err) = &result {
            tracing::debug!("Placement at {} rejected: {}", cell, err);
        }
        result
    }

    pub fn remove(&mut self, cell: GridCoord) -> std::result::Result<(), PlacementError> {
        let result = self.board.remove(cell).map(|_| ());
        if let Err(err) = &result {
            tracing::debug!("Removal at {} rejected: {}", cell, err);
        }
        result
    }

    /// Whether a battle can sensibly start: placement phase with a hero on the board
    pub fn can_start(&self) -> bool {
        self.phase == RoundPhase::Placement && self.board.count(Team::Friendly) > 0
    }

    pub fn alive_count(&self, team: Team) -> usize {
        self.battle.alive_count(team)
    }

    /// An active battle that can never reach victory or defeat
    pub fn is_stalled(&self) -> bool {
        self.phase == RoundPhase::Active && self.battle.is_stalled()
    }

    /// Lock the board and start combat with everything placed on it
    ///
    /// Starting while a victory is still resolving cancels the resolution
    /// and completes its cleanup first.
    pub fn start_battle(&mut self) -> Result<BattleEventLog> {
        let mut events = BattleEventLog::new();

        match self.phase {
            RoundPhase::Placement => {}
            RoundPhase::Resolving(BattleOutcome::Victory) => self.cancel_resolution(&mut events),
            other => {
                return Err(BattleError::InvalidPhase {
                    expected: "Placement",
                    actual: other.to_string(),
                });
            }
        }

        if !self.can_start() {
            tracing::warn!("Starting a battle with no friendly units; it cannot be won");
        }

        self.saved = self
            .board
            .occupants(Team::Friendly)
            .map(|(cell, unit)| PlacementRecord {
                cell,
                stats: unit.stats.as_ref().clone(),
            })
            .collect();

        self.board.lock();
        self.battle.reset();

        let occupants: Vec<(GridCoord, Arc<UnitStats>)> = [Team::Friendly, Team::Enemy]
            .iter()
            .flat_map(|&team| {
                self.board
                    .occupants(team)
                    .map(|(cell, unit)| (cell, Arc::clone(&unit.stats)))
                    .collect::<Vec<_>>()
            })
            .collect();

        for (cell, stats) in occupants {
            if let Err(err) = stats.validate() {
                tracing::warn!("Excluding {} at {} from battle: {}", stats.name, cell, err);
                continue;
            }
            let position = self.layout.cell_to_world(cell);
            self.battle.spawn(stats, position, Some(cell));
        }

        let friendly = self.battle.alive_count(Team::Friendly);
        let enemy = self.battle.alive_count(Team::Enemy);
        if friendly == 0 || enemy == 0 {
            tracing::warn!(
                "Battle started with {} friendly and {} enemy units; it will stall",
                friendly,
                enemy
            );
        }

        tracing::info!("Battle started: {} friendly vs {} enemy", friendly, enemy);
        events.push(
            BattleEventType::BattleStarted { friendly, enemy },
            format!("Battle started: {} vs {}", friendly, enemy),
            self.clock,
        );
        self.phase = RoundPhase::Active;
        Ok(events)
    }

    /// Advance the round by `dt` seconds
    pub fn advance(&mut self, dt: Seconds) -> BattleEventLog {
        let mut events = BattleEventLog::new();
        self.clock += dt;

        match self.phase {
            RoundPhase::Placement | RoundPhase::Resolving(BattleOutcome::Defeat) => {}
            RoundPhase::Active => {
                events = self.battle.run_tick(dt);
                for event in &mut events.events {
                    event.time = self.clock;
                }
                if self.battle.is_finished() {
                    self.enter_resolution();
                }
            }
            RoundPhase::Resolving(_) => {
                let actions = match self.resolution.as_mut() {
                    Some(schedule) => schedule.advance(dt),
                    None => Vec::new(),
                };
                self.apply_actions(actions, &mut events);
            }
        }

        events
    }

    /// Confirm that the fade the round is waiting on has finished
    pub fn complete_fade(&mut self) -> bool {
        self.resolution
            .as_mut()
            .map(|schedule| schedule.complete_fade())
            .unwrap_or(false)
    }

    /// Drop everything and return to an empty, unlocked board
    pub fn restart(&mut self) -> BattleEventLog {
        let mut events = BattleEventLog::new();
        self.resolution = None;
        self.board.clear_all();
        self.board.unlock();
        self.battle.reset();
        self.saved.clear();
        self.phase = RoundPhase::Placement;

        tracing::info!("Round restarted");
        events.push(BattleEventType::RoundReset, "Round restarted".into(), self.clock);
        events
    }

    fn enter_resolution(&mut self) {
        let outcome = self.battle.outcome;
        self.phase = RoundPhase::Resolving(outcome);

        match outcome {
            BattleOutcome::Victory => {
                tracing::info!("Victory; respawning {} heroes", self.saved.len());
                self.resolution = Some(ResolutionSchedule::new(
                    self.config.round.clone(),
                    self.saved.len(),
                ));
            }
            _ => {
                tracing::info!("Defeat; round halted until restart");
                self.resolution = None;
            }
        }
    }

    fn cancel_resolution(&mut self, events: &mut BattleEventLog) {
        tracing::info!("Resolution cancelled by new battle start");
        events.push(
            BattleEventType::ResolutionCancelled,
            "Resolution cancelled".into(),
            self.clock,
        );
        let actions = match self.resolution.as_mut() {
            Some(schedule) => schedule.fast_forward(),
            None => Vec::new(),
        };
        self.apply_actions(actions, events);
        self.resolution = None;
        self.phase = RoundPhase::Placement;
    }

    fn apply_actions(&mut self, actions: Vec<ResolutionAction>, events: &mut BattleEventLog) {
        for action in actions {
            match action {
                ResolutionAction::RequestFade(direction) => {
                    events.push(
                        BattleEventType::FadeRequested { direction },
                        format!("Fade {:?}", direction),
                        self.clock,
                    );
                }
                ResolutionAction::FadeTimedOut(direction) => {
                    tracing::warn!("Fade {:?} not confirmed in time; continuing", direction);
                    events.push(
                        BattleEventType::FadeTimedOut { direction },
                        format!("Fade {:?} timed out", direction),
                        self.clock,
                    );
                }
                ResolutionAction::ClearBoard => {
                    self.board.clear_all();
                    self.battle.reset();
                    self.board.unlock();
                    events.push(BattleEventType::BoardCleared, "Board cleared".into(), self.clock);
                }
                ResolutionAction::Respawn(index) => self.respawn(index, events),
                ResolutionAction::Finished => {
                    tracing::info!("Round reset; back to placement");
                    self.resolution = None;
                    self.phase = RoundPhase::Placement;
                    events.push(BattleEventType::RoundReset, "Round reset".into(), self.clock);
                }
            }
        }
    }

    fn respawn(&mut self, index: usize, events: &mut BattleEventLog) {
        let Some(record) = self.saved.get(index) else {
            return;
        };
        let name = record.stats.name.clone();
        let cell = record.cell;

        match self.board.place(cell, Arc::new(record.stats.clone())) {
            Ok(()) => {
                tracing::debug!("Respawned {} at {}", name, cell);
                events.push(
                    BattleEventType::HeroRespawned { name: name.clone(), cell },
                    format!("{} respawned at {}", name, cell),
                    self.clock,
                );
            }
            Err(err) => {
                tracing::warn!("Could not respawn {} at {}: {}", name, cell, err);
                events.push(
                    BattleEventType::RespawnSkipped { name: name.clone(), cell },
                    format!("{} not respawned: {}", name, err),
                    self.clock,
                );
            }
        }
    }
}
