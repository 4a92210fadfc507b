//! Live combat unit: stats plus mutable per-battle state
//!
//! Health and state move together: health reaches zero exactly when the
//! unit enters `Dead`, and nothing in the normal flow leaves `Dead`.

use std::sync::Arc;

use serde::Serialize;

use crate::core::types::{GridCoord, Seconds, UnitId, Vec2};
use crate::units::stats::{Team, UnitStats};

/// Behavior state of a combat unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum UnitState {
    #[default]
    Idle,
    Moving,
    Attacking,
    Dead,
}

impl UnitState {
    /// States in which separation pushes and is pushed
    pub fn is_mobile(&self) -> bool {
        matches!(self, UnitState::Moving | UnitState::Attacking)
    }
}

/// Result of applying damage to a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Unit was already dead; nothing changed
    Ignored,
    Wounded { remaining: u32 },
    Killed,
}

/// A unit taking part in the current battle
#[derive(Debug, Clone)]
pub struct CombatUnit {
    pub id: UnitId,
    pub stats: Arc<UnitStats>,
    pub position: Vec2,
    /// Board cell the unit was placed on, if it came from the board
    pub origin_cell: Option<GridCoord>,
    /// Current target, resolved through the roster each tick
    pub target: Option<UnitId>,
    current_health: u32,
    state: UnitState,
    attack_cooldown: Seconds,
    /// Time spent dead, for corpse removal
    dead_for: Seconds,
}

impl CombatUnit {
    pub fn new(id: UnitId, stats: Arc<UnitStats>, position: Vec2) -> Self {
        Self {
            id,
            current_health: stats.max_health,
            stats,
            position,
            origin_cell: None,
            target: None,
            state: UnitState::Idle,
            attack_cooldown: 0.0,
            dead_for: 0.0,
        }
    }

    pub fn with_origin_cell(mut self, cell: GridCoord) -> Self {
        self.origin_cell = Some(cell);
        self
    }

    pub fn team(&self) -> Team {
        self.stats.team
    }

    pub fn name(&self) -> &str {
        &self.stats.name
    }

    pub fn current_health(&self) -> u32 {
        self.current_health
    }

    pub fn max_health(&self) -> u32 {
        self.stats.max_health
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    pub fn attack_cooldown(&self) -> Seconds {
        self.attack_cooldown
    }

    pub fn dead_for(&self) -> Seconds {
        self.dead_for
    }

    pub fn is_alive(&self) -> bool {
        self.state != UnitState::Dead
    }

    pub fn is_dead(&self) -> bool {
        self.state == UnitState::Dead
    }

    /// Move to a new living state; returns true if the state changed
    ///
    /// Dead units ignore this: only damage moves a unit into `Dead`.
    pub fn set_state(&mut self, new_state: UnitState) -> bool {
        if self.is_dead() || new_state == UnitState::Dead || self.state == new_state {
            return false;
        }
        self.state = new_state;
        true
    }

    /// Count the cooldown down, clamped at zero
    pub fn tick_cooldown(&mut self, dt: Seconds) {
        if self.attack_cooldown > 0.0 {
            self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        }
    }

    pub fn ready_to_attack(&self) -> bool {
        self.is_alive() && self.attack_cooldown <= 0.0
    }

    /// Start a fresh cooldown after a strike
    pub fn reset_cooldown(&mut self) {
        self.attack_cooldown = self.stats.attack_cooldown();
    }

    pub fn tick_corpse(&mut self, dt: Seconds) {
        if self.is_dead() {
            self.dead_for += dt;
        }
    }

    /// Apply damage, clamping health at zero
    ///
    /// Damage against a dead unit is a no-op.
    pub fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        if self.is_dead() {
            return DamageOutcome::Ignored;
        }

        self.current_health = self.current_health.saturating_sub(amount);
        if self.current_health == 0 {
            self.state = UnitState::Dead;
            self.target = None;
            self.attack_cooldown = 0.0;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded {
                remaining: self.current_health,
            }
        }
    }

    /// Restore health up to the maximum; returns the amount actually healed
    pub fn heal(&mut self, amount: u32) -> u32 {
        if self.is_dead() {
            return 0;
        }
        let before = self.current_health;
        self.current_health = self
            .current_health
            .saturating_add(amount)
            .min(self.stats.max_health);
        self.current_health - before
    }
}
