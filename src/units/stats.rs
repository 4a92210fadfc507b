//! Unit stats: the immutable-per-battle configuration of a combat unit

use serde::{Deserialize, Serialize};

use crate::battle::constants::MAX_ATTACK_SPEED;
use crate::core::error::{BattleError, Result};
use crate::core::types::Seconds;

/// Side a unit fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Team {
    #[default]
    Friendly = 0,
    Enemy = 1,
}

/// Combat role of a unit
///
/// Advisory only: no behavior branches on it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    #[default]
    Melee,
    Ranged,
    Tank,
    Support,
}

/// Combat configuration of one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    pub name: String,
    pub max_health: u32,
    /// Damage dealt per attack
    pub damage: u32,
    /// Attacks per second, in (0, 5]
    pub attack_speed: f32,
    pub attack_range: f32,
    /// World units per second
    pub move_speed: f32,
    #[serde(default)]
    pub team: Team,
    #[serde(default)]
    pub archetype: Archetype,
}

impl Default for UnitStats {
    fn default() -> Self {
        Self {
            name: "Warrior".to_string(),
            max_health: 100,
            damage: 10,
            attack_speed: 1.0,
            attack_range: 1.5,
            move_speed: 2.0,
            team: Team::Friendly,
            archetype: Archetype::Melee,
        }
    }
}

impl UnitStats {
    pub fn new(name: impl Into<String>, team: Team) -> Self {
        Self {
            name: name.into(),
            team,
            ..Self::default()
        }
    }

    pub fn with_health(mut self, max_health: u32) -> Self {
        self.max_health = max_health;
        self
    }

    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_attack_speed(mut self, attack_speed: f32) -> Self {
        self.attack_speed = attack_speed;
        self
    }

    pub fn with_attack_range(mut self, attack_range: f32) -> Self {
        self.attack_range = attack_range;
        self
    }

    pub fn with_move_speed(mut self, move_speed: f32) -> Self {
        self.move_speed = move_speed;
        self
    }

    pub fn with_archetype(mut self, archetype: Archetype) -> Self {
        self.archetype = archetype;
        self
    }

    /// Copy of these stats fighting for another side
    pub fn on_team(&self, team: Team) -> Self {
        Self {
            team,
            ..self.clone()
        }
    }

    /// Time between damage applications
    pub fn attack_cooldown(&self) -> Seconds {
        1.0 / self.attack_speed
    }

    /// Check the stats can drive a unit through a battle
    ///
    /// Zero damage is accepted: such a unit still walks up and swings,
    /// it just never hurts anyone.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| BattleError::InvalidStats {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty".into()));
        }
        if self.max_health == 0 {
            return Err(invalid("max_health must be positive".into()));
        }
        if !(self.attack_speed > 0.0 && self.attack_speed <= MAX_ATTACK_SPEED) {
            return Err(invalid(format!(
                "attack_speed {} outside (0, {}]",
                self.attack_speed, MAX_ATTACK_SPEED
            )));
        }
        if !(self.attack_range > 0.0) {
            return Err(invalid(format!(
                "attack_range {} must be positive",
                self.attack_range
            )));
        }
        if !(self.move_speed > 0.0) {
            return Err(invalid(format!("move_speed {} must be positive", self.move_speed)));
        }
        Ok(())
    }
}
