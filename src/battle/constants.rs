//! Battle system constants - fixed rules that are not worth configuring

// Unit stat bounds: attack speed is in (0, MAX_ATTACK_SPEED]
pub const MAX_ATTACK_SPEED: f32 = 5.0;

// Separation: strength multiplier once a neighbor is inside personal space
pub const PERSONAL_SPACE_MULTIPLIER: f32 = 2.0;

// Separation pushes smaller than this are dropped
pub const MIN_SEPARATION_PUSH: f32 = 0.01;

// Path check: allies within this cone (degrees) of the heading block the way
pub const PATH_BLOCK_ANGLE_DEG: f32 = 30.0;
pub const PATH_BLOCK_SPACE_FACTOR: f32 = 2.0;

// Headless runner
pub const DEFAULT_TICK_SECONDS: f32 = 1.0 / 60.0;
pub const DEFAULT_MAX_BATTLE_SECONDS: f32 = 600.0;
