//! Run state and core simulation types
//!
//! One `RunState` owns everything that changes during a run. The renderer
//! and UI shell only read it between ticks.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::rooms::generate_floor;
use crate::consts::*;
use crate::settings::RunConfig;
use crate::tuning::{BossKind, EnemyKind, UpgradeKind};

/// Top-level phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// In the hub between runs
    #[default]
    Lobby,
    /// Active gameplay
    Playing,
    /// Boss down, waiting for a buff pick
    Reward,
    /// Player died
    GameOver,
    /// Final boss of the final floor cleared
    Victory,
}

/// Permanent upgrade levels (meta-progression, read-only during a run)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Upgrades {
    pub max_hp_bonus: u32,
    pub damage_bonus: u32,
    pub speed_bonus: u32,
    pub dash_cdr_bonus: u32,
}

impl Upgrades {
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::MaxHp => self.max_hp_bonus,
            UpgradeKind::Damage => self.damage_bonus,
            UpgradeKind::Speed => self.speed_bonus,
            UpgradeKind::DashCdr => self.dash_cdr_bonus,
        }
    }

    pub fn level_mut(&mut self, kind: UpgradeKind) -> &mut u32 {
        match kind {
            UpgradeKind::MaxHp => &mut self.max_hp_bonus,
            UpgradeKind::Damage => &mut self.damage_bonus,
            UpgradeKind::Speed => &mut self.speed_bonus,
            UpgradeKind::DashCdr => &mut self.dash_cdr_bonus,
        }
    }

    pub fn max_hp(&self) -> f32 {
        PLAYER_HP + self.max_hp_bonus as f32 * 25.0
    }

    pub fn damage_mult(&self) -> f32 {
        1.0 + self.damage_bonus as f32 * 0.1
    }

    pub fn speed_mult(&self) -> f32 {
        1.0 + self.speed_bonus as f32 * 0.1
    }

    pub fn dash_cooldown(&self) -> u32 {
        let cdr = (1.0 - self.dash_cdr_bonus as f32 * 0.15).max(0.0);
        (PLAYER_DASH_COOLDOWN as f32 * cdr).round() as u32
    }
}

/// Per-run buff stack counts, reset every run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunBuffs {
    pub torrado: u32,
    pub leite_aveia: u32,
    pub chantilly: u32,
    pub termo: u32,
    pub canela: u32,
    pub descaf: u32,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Unit vector toward the aim point
    pub facing: Vec2,
    pub shoot_cooldown: u32,
    pub dash_cooldown: u32,
    /// Ticks left in the active dash
    pub dash_timer: u32,
    pub ultimate_cooldown: u32,
    pub invincible_timer: u32,
    /// One-shot shield (leite de aveia)
    pub shield: bool,
}

impl Player {
    pub fn new(max_hp: f32) -> Self {
        Self {
            pos: Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0),
            size: PLAYER_SIZE,
            hp: max_hp,
            max_hp,
            facing: Vec2::new(0.0, -1.0),
            shoot_cooldown: 0,
            dash_cooldown: 0,
            dash_timer: 0,
            ultimate_cooldown: 0,
            invincible_timer: 0,
            shield: false,
        }
    }

    #[inline]
    pub fn is_dashing(&self) -> bool {
        self.dash_timer > 0
    }

    #[inline]
    pub fn is_invincible(&self) -> bool {
        self.invincible_timer > 0
    }

    /// Heal, never past max
    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }
}

/// A regular enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Ticks until the next retarget
    pub move_timer: u32,
    pub target_pos: Vec2,
    /// Ticks until the next shot (ranged kinds only)
    pub shoot_timer: u32,
    pub burn_timer: u32,
    pub drop_gold: u32,
}

impl Enemy {
    pub fn new(kind: EnemyKind, pos: Vec2, hp_mult: f32, rng: &mut impl Rng) -> Self {
        let stats = kind.stats();
        Self {
            kind,
            pos,
            size: stats.size,
            hp: stats.hp * hp_mult,
            max_hp: stats.hp * hp_mult,
            move_timer: rng.random_range(20..=60),
            target_pos: pos,
            shoot_timer: rng.random_range(30..=90),
            burn_timer: 0,
            drop_gold: stats.gold,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }
}

/// The floor's boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub kind: BossKind,
    pub pos: Vec2,
    pub size: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub target_pos: Vec2,
    pub move_timer: u32,
    pub shoot_timer: u32,
    pub summon_timer: u32,
    /// Archetype-specific pattern counter
    pub phase: u32,
    /// Rotation accumulator driving aim patterns (radians)
    pub angle: f32,
    /// Steam king near-invisibility window
    pub invisible_timer: u32,
    pub burn_timer: u32,
    pub drop_gold: u32,
}

/// PCG stream for `RunState::fx_rng`, kept apart from the gameplay stream
const FX_STREAM: u64 = 0xF0F0_BEEF;

/// Where every boss starts
pub const BOSS_SPAWN: Vec2 = Vec2::new(CANVAS_WIDTH / 2.0, 200.0);

impl Boss {
    pub fn new(kind: BossKind, hp_mult: f32) -> Self {
        let stats = kind.stats();
        Self {
            kind,
            pos: BOSS_SPAWN,
            size: stats.size,
            hp: stats.hp * hp_mult,
            max_hp: stats.hp * hp_mult,
            target_pos: BOSS_SPAWN,
            move_timer: 60,
            shoot_timer: 90,
            summon_timer: 300,
            phase: 0,
            angle: 0.0,
            invisible_timer: 0,
            burn_timer: 0,
            drop_gold: stats.gold,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Draw alpha hint for the renderer
    pub fn visibility(&self) -> f32 {
        if self.invisible_timer > 0 { 0.15 } else { 1.0 }
    }
}

/// A projectile or hazard zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub damage: f32,
    /// Player-owned
    pub friendly: bool,
    pub lifetime: u32,
    /// Stationary floor hazard (steam king); never friendly
    pub hazard: bool,
}

impl Projectile {
    pub fn friendly(pos: Vec2, vel: Vec2, size: f32, damage: f32, lifetime: u32) -> Self {
        Self { pos, vel, size, damage, friendly: true, lifetime, hazard: false }
    }

    pub fn hostile(pos: Vec2, vel: Vec2, size: f32, damage: f32, lifetime: u32) -> Self {
        Self { pos, vel, size, damage, friendly: false, lifetime, hazard: false }
    }

    /// Lingering player-only damage zone
    pub fn hazard(pos: Vec2, size: f32, damage: f32, lifetime: u32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            damage,
            friendly: false,
            lifetime,
            hazard: true,
        }
    }
}

/// Cosmetic particle (never affects gameplay)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub lifetime: f32,
    pub max_lifetime: f32,
    pub color: u32,
    pub size: f32,
}

impl Particle {
    /// Fade-out alpha in [0, 1]
    pub fn alpha(&self) -> f32 {
        if self.max_lifetime <= 0.0 {
            0.0
        } else {
            (self.lifetime / self.max_lifetime).clamp(0.0, 1.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Health,
    Gold,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub pos: Vec2,
    pub kind: PickupKind,
    pub value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorDirection {
    North,
    South,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Door {
    pub pos: Vec2,
    pub direction: DoorDirection,
    /// Index of the destination room on this floor
    pub leads_to: usize,
}

/// One room of a floor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    pub walls: Vec<Rect>,
    pub pickups: Vec<Pickup>,
    pub doors: Vec<Door>,
    /// Flips false -> true once and never back
    pub cleared: bool,
    pub is_boss_room: bool,
}

impl Room {
    /// Drop every enemy at or below zero HP
    pub fn remove_dead(&mut self) {
        self.enemies.retain(Enemy::is_alive);
    }

    /// True when nothing hostile is left standing
    pub fn is_clear(&self) -> bool {
        self.enemies.is_empty() && self.boss.as_ref().is_none_or(|b| !b.is_alive())
    }

    pub fn door(&self, direction: DoorDirection) -> Option<&Door> {
        self.doors.iter().find(|d| d.direction == direction)
    }
}

/// Exit portal spawned in a cleared non-boss room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitPortal {
    pub pos: Vec2,
    pub active: bool,
}

/// Pending fade transition to another room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Ticks remaining; the swap happens at the midpoint
    pub timer: u32,
    pub floor: u32,
    pub room: usize,
}

/// Completed room time for the run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTime {
    pub floor: u32,
    pub room: usize,
    pub ticks: u32,
}

/// Complete run state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub phase: Phase,
    pub config: RunConfig,
    pub player: Player,
    pub rooms: Vec<Room>,
    pub floor: u32,
    pub current_room: usize,
    pub projectiles: Vec<Projectile>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub exit_portal: Option<ExitPortal>,
    /// Gold collected this run
    pub gold_collected: u64,
    pub rooms_cleared: u32,
    pub run_timer: u64,
    pub room_timer: u32,
    pub room_times: Vec<RoomTime>,
    pub screen_shake: f32,
    pub damage_flash: u32,
    pub clear_message_timer: u32,
    pub fast_clear_timer: u32,
    pub transition: Option<Transition>,
    /// Offered buffs; only non-empty during `Phase::Reward`
    pub reward_choices: Vec<super::buffs::RunBuffId>,
    pub upgrades: Upgrades,
    pub run_buffs: RunBuffs,
    /// Gameplay randomness: AI, procs, rewards, generation
    pub rng: Pcg32,
    /// Cosmetic randomness only (particles)
    pub fx_rng: Pcg32,
}

impl RunState {
    /// Start a run with default configuration
    pub fn new(upgrades: Upgrades, seed: u64) -> Self {
        Self::with_config(upgrades, RunConfig::default(), seed)
    }

    pub fn with_config(upgrades: Upgrades, config: RunConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let fx_rng = Pcg32::new(seed, FX_STREAM);
        let rooms = generate_floor(0, config.rooms_per_floor, &mut rng);
        log::info!(
            "Run started (seed {}, {} floors x {} rooms)",
            seed,
            config.total_floors,
            config.rooms_per_floor
        );

        Self {
            phase: Phase::Playing,
            config,
            player: Player::new(upgrades.max_hp()),
            rooms,
            floor: 0,
            current_room: 0,
            projectiles: Vec::new(),
            particles: Vec::new(),
            exit_portal: None,
            gold_collected: 0,
            rooms_cleared: 0,
            run_timer: 0,
            room_timer: 0,
            room_times: Vec::new(),
            screen_shake: 0.0,
            damage_flash: 0,
            clear_message_timer: 0,
            fast_clear_timer: 0,
            transition: None,
            reward_choices: Vec::new(),
            upgrades,
            run_buffs: RunBuffs::default(),
            rng,
            fx_rng,
        }
    }

    /// Room the player is standing in
    pub fn room(&self) -> &Room {
        &self.rooms[self.current_room]
    }

    pub fn room_mut(&mut self) -> &mut Room {
        &mut self.rooms[self.current_room]
    }

    pub fn is_last_floor(&self) -> bool {
        self.floor + 1 >= self.config.total_floors
    }

    pub fn is_last_room(&self) -> bool {
        self.current_room + 1 >= self.rooms.len()
    }

    pub fn total_rooms(&self) -> usize {
        self.config.total_rooms()
    }

    /// Outgoing damage multiplier (upgrades x run buffs)
    pub fn damage_mult(&self) -> f32 {
        self.upgrades.damage_mult() * self.run_buffs.damage_mult()
    }

    /// Spawn a radial puff of particles, respecting the quality cap.
    /// Draws only from `fx_rng`.
    pub fn spawn_particles(&mut self, pos: Vec2, color: u32, count: usize, speed: f32) {
        let free = self.config.max_particles().saturating_sub(self.particles.len());
        let fx = &mut self.fx_rng;
        for _ in 0..count.min(free) {
            let angle = fx.random_range(0.0..std::f32::consts::TAU);
            let spd = fx.random_range(0.0..speed.max(f32::EPSILON));
            let lifetime = fx.random_range(20.0..40.0);
            let size = fx.random_range(2.0..5.0);
            self.particles.push(Particle {
                pos,
                vel: crate::unit_from_angle(angle) * spd,
                lifetime,
                max_lifetime: 40.0,
                color,
                size,
            });
        }
    }
}

/// Start a run (the shell's "start run" entry point)
pub fn create_initial_state(upgrades: Upgrades, seed: u64) -> RunState {
    RunState::new(upgrades, seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = create_initial_state(Upgrades::default(), 7);
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.rooms.len(), ROOMS_PER_FLOOR);
        assert_eq!(state.current_room, 0);
        assert_eq!(state.player.hp, PLAYER_HP);
        assert_eq!(state.run_buffs, RunBuffs::default());
        assert!(state.transition.is_none());
        assert!(state.reward_choices.is_empty());
    }

    #[test]
    fn test_max_hp_upgrade_applies() {
        let upgrades = Upgrades { max_hp_bonus: 2, ..Default::default() };
        let state = RunState::new(upgrades, 1);
        assert_eq!(state.player.max_hp, 150.0);
        assert_eq!(state.player.hp, 150.0);
    }

    #[test]
    fn test_dash_cooldown_reduction() {
        assert_eq!(Upgrades::default().dash_cooldown(), 90);
        let upgrades = Upgrades { dash_cdr_bonus: 2, ..Default::default() };
        assert_eq!(upgrades.dash_cooldown(), 63);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut player = Player::new(100.0);
        player.hp = 90.0;
        player.heal(25.0);
        assert_eq!(player.hp, 100.0);
    }

    #[test]
    fn test_remove_dead_is_idempotent() {
        let mut state = RunState::new(Upgrades::default(), 3);
        let room = &mut state.rooms[1];
        room.enemies[0].hp = 0.0;
        room.remove_dead();
        let after_first: Vec<f32> = room.enemies.iter().map(|e| e.hp).collect();
        room.remove_dead();
        let after_second: Vec<f32> = room.enemies.iter().map(|e| e.hp).collect();
        assert_eq!(after_first, after_second);
        assert!(room.enemies.iter().all(Enemy::is_alive));
    }

    #[test]
    fn test_particle_cap() {
        let mut state = RunState::new(Upgrades::default(), 3);
        state.config.quality = crate::QualityPreset::Low;
        state.spawn_particles(Vec2::ZERO, 0xFFFFFF, 500, 3.0);
        assert_eq!(state.particles.len(), 100);
        assert!(state.particles.iter().all(|p| p.alpha() <= 1.0));
    }

    #[test]
    fn test_state_serializes() {
        let state = RunState::new(Upgrades::default(), 11);
        let json = serde_json::to_string(&state).unwrap();
        let back: RunState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rooms.len(), state.rooms.len());
        assert_eq!(back.player.hp, state.player.hp);
    }
}
