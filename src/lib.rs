//! Brew Dungeon - a frame-stepped coffee-shop dungeon crawler
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (movement, combat, bosses, progression)
//! - `tuning`: Archetype stat tables and the permanent upgrade catalog
//! - `settings`: Run configuration
//! - `persistence`: Meta-progression save record and upgrade shop
//! - `autopilot`: Demo driver that plays the game from a state snapshot

pub mod autopilot;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{QualityPreset, RunConfig};

use glam::Vec2;

/// Game configuration constants (all durations in ticks)
pub mod consts {
    /// Logical canvas / room dimensions
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;
    /// Inset from the room edge that entities are clamped to
    pub const ROOM_MARGIN: f32 = 50.0;

    pub const ROOMS_PER_FLOOR: usize = 6;
    pub const TOTAL_FLOORS: u32 = 3;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 20.0;
    pub const PLAYER_SPEED: f32 = 3.0;
    pub const PLAYER_HP: f32 = 100.0;
    pub const PLAYER_SHOOT_COOLDOWN: u32 = 12;
    /// Fire-rate buffs can never push the cooldown below this
    pub const PLAYER_MIN_SHOOT_COOLDOWN: u32 = 4;
    pub const PLAYER_DASH_COOLDOWN: u32 = 90;
    pub const PLAYER_DASH_DURATION: u32 = 10;
    pub const PLAYER_DASH_SPEED: f32 = 10.0;
    pub const PLAYER_ULTIMATE_COOLDOWN: u32 = 600;
    pub const PLAYER_INVINCIBLE_AFTER_HIT: u32 = 30;
    /// Invincibility granted when the shield eats a hit
    pub const SHIELD_INVINCIBLE: u32 = 20;
    /// Re-trigger window while standing in a hazard zone
    pub const HAZARD_INVINCIBLE: u32 = 12;

    /// Player projectile ("bean")
    pub const BEAN_SPEED: f32 = 7.0;
    pub const BEAN_DAMAGE: f32 = 20.0;
    pub const BEAN_SIZE: f32 = 5.0;
    pub const BEAN_LIFETIME: u32 = 60;

    /// Dash burst reaches this far past both radii
    pub const DASH_BURST_REACH: f32 = 20.0;
    pub const DASH_BURST_DAMAGE: f32 = 15.0;
    pub const ULTIMATE_RADIUS: f32 = 200.0;
    pub const ULTIMATE_DAMAGE: f32 = 50.0;

    /// Hostile bullets fired by regular enemies
    pub const ENEMY_BULLET_SPEED: f32 = 3.0;
    pub const ENEMY_BULLET_SIZE: f32 = 4.0;
    pub const ENEMY_BULLET_LIFETIME: u32 = 90;

    /// Burn (canela) proc
    pub const BURN_CHANCE_PER_STACK: f64 = 0.25;
    pub const BURN_DURATION: u32 = 120;
    pub const BURN_DAMAGE_PER_TICK: f32 = 0.25;

    /// Pickups, doors and the exit portal
    pub const PICKUP_RADIUS: f32 = 12.0;
    pub const DOOR_REACH: f32 = 20.0;
    pub const PORTAL_RADIUS: f32 = 25.0;
    pub const NORTH_DOOR_Y: f32 = ROOM_MARGIN;
    pub const SOUTH_DOOR_Y: f32 = CANVAS_HEIGHT - ROOM_MARGIN;
    /// Where the player lands after moving forward into a room
    pub const FORWARD_ENTRY_Y: f32 = CANVAS_HEIGHT - 110.0;
    /// Where the player lands after walking back through a south door
    pub const BACKWARD_ENTRY_Y: f32 = 110.0;

    /// Fade transition between rooms; the swap happens at the midpoint
    pub const TRANSITION_DURATION: u32 = 40;
    pub const CLEAR_MESSAGE_DURATION: u32 = 90;
    /// Rooms cleared faster than this get the "fast brew" banner
    pub const FAST_CLEAR_THRESHOLD: u32 = 600;
    pub const FAST_CLEAR_MESSAGE_DURATION: u32 = 120;
    pub const SCREEN_SHAKE_DECAY: f32 = 0.5;
}

/// Unit vector from `from` toward `to`, zero if they coincide
#[inline]
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Unit vector pointing along `angle` (radians)
#[inline]
pub fn unit_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
