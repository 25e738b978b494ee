//! Boss behaviors
//!
//! Each archetype advances its own pattern through `BossBehavior`; bounds
//! clamping, burn and contact damage are shared and live in `update_boss`.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::{circles_overlap, clamp_to_room};
use super::state::{BOSS_SPAWN, Boss, Enemy, Projectile, RunState};
use super::tick::{apply_player_damage, damage_boss};
use crate::consts::*;
use crate::tuning::{BossKind, EnemyKind};
use crate::{direction, unit_from_angle};

/// Everything a boss may touch while advancing its pattern
pub struct BossContext<'a> {
    pub player_pos: Vec2,
    pub projectiles: &'a mut Vec<Projectile>,
    /// Live enemies of the boss room (reinforcements go here)
    pub enemies: &'a mut Vec<Enemy>,
    pub rng: &'a mut Pcg32,
}

/// One tick of archetype-specific boss logic
pub trait BossBehavior {
    fn advance(&self, boss: &mut Boss, ctx: &mut BossContext<'_>);
}

/// Behavior implementing the given boss kind
pub fn behavior_for(kind: BossKind) -> &'static dyn BossBehavior {
    match kind {
        BossKind::Grinder => &Grinder,
        BossKind::SteamKing => &SteamKing,
        BossKind::OverflowingPot => &OverflowingPot,
    }
}

/// Count a timer down; true on the tick it hits zero
fn expired(timer: &mut u32) -> bool {
    *timer = timer.saturating_sub(1);
    *timer == 0
}

/// Walks toward where the player was, sweeping radial bursts
pub struct Grinder;

impl Grinder {
    const RETARGET: u32 = 45;
    const BURST_INTERVAL: u32 = 50;
    const BURST_COUNT: u32 = 8;
    const SPIN: f32 = 0.05;
    const BULLET_SPEED: f32 = 3.5;
    const BULLET_SIZE: f32 = 6.0;
    const BULLET_DAMAGE: f32 = 12.0;
    const BULLET_LIFETIME: u32 = 120;
}

impl BossBehavior for Grinder {
    fn advance(&self, boss: &mut Boss, ctx: &mut BossContext<'_>) {
        boss.angle += Self::SPIN;

        if expired(&mut boss.move_timer) {
            boss.move_timer = Self::RETARGET;
            boss.target_pos = ctx.player_pos;
        }
        let speed = boss.kind.stats().speed;
        if boss.pos.distance(boss.target_pos) > speed {
            boss.pos += direction(boss.pos, boss.target_pos) * speed;
        }

        if expired(&mut boss.shoot_timer) {
            boss.shoot_timer = Self::BURST_INTERVAL;
            for i in 0..Self::BURST_COUNT {
                let angle = boss.angle + TAU * i as f32 / Self::BURST_COUNT as f32;
                ctx.projectiles.push(Projectile::hostile(
                    boss.pos,
                    unit_from_angle(angle) * Self::BULLET_SPEED,
                    Self::BULLET_SIZE,
                    Self::BULLET_DAMAGE,
                    Self::BULLET_LIFETIME,
                ));
            }
            boss.phase += 1;
        }
    }
}

/// Drifts around, seeds the floor with scalding hazard zones and fades out
/// once per full turn of its angle accumulator
pub struct SteamKing;

impl SteamKing {
    const DRIFT_INTERVAL: u32 = 120;
    const DRIFT_RANGE: f32 = 150.0;
    const HAZARD_INTERVAL: u32 = 150;
    const HAZARD_COUNT: u32 = 3;
    const HAZARD_SIZE: f32 = 35.0;
    const HAZARD_DAMAGE: f32 = 8.0;
    const HAZARD_LIFETIME: u32 = 240;
    const SPIN: f32 = 0.02;
    const INVISIBLE_DURATION: u32 = 90;
}

impl BossBehavior for SteamKing {
    fn advance(&self, boss: &mut Boss, ctx: &mut BossContext<'_>) {
        boss.angle += Self::SPIN;
        boss.invisible_timer = boss.invisible_timer.saturating_sub(1);

        // One vanish per completed turn
        let cycle = (boss.angle / TAU) as u32;
        if cycle > boss.phase {
            boss.phase = cycle;
            boss.invisible_timer = Self::INVISIBLE_DURATION;
        }

        if expired(&mut boss.move_timer) {
            boss.move_timer = Self::DRIFT_INTERVAL;
            let offset = Vec2::new(
                ctx.rng.random_range(-Self::DRIFT_RANGE..Self::DRIFT_RANGE),
                ctx.rng.random_range(-Self::DRIFT_RANGE..Self::DRIFT_RANGE),
            );
            boss.target_pos = clamp_to_room(boss.pos + offset, boss.size);
            boss.pos = boss.target_pos;
        }

        if expired(&mut boss.shoot_timer) {
            boss.shoot_timer = Self::HAZARD_INTERVAL;
            let inset = ROOM_MARGIN + Self::HAZARD_SIZE;
            for _ in 0..Self::HAZARD_COUNT {
                let pos = Vec2::new(
                    ctx.rng.random_range(inset..CANVAS_WIDTH - inset),
                    ctx.rng.random_range(inset..CANVAS_HEIGHT - inset),
                );
                ctx.projectiles.push(Projectile::hazard(
                    pos,
                    Self::HAZARD_SIZE,
                    Self::HAZARD_DAMAGE,
                    Self::HAZARD_LIFETIME,
                ));
            }
        }
    }
}

/// Anchored in place; alternating rings and milk-blob reinforcements
pub struct OverflowingPot;

impl OverflowingPot {
    pub const ANCHOR: Vec2 = BOSS_SPAWN;
    const RING_INTERVAL: u32 = 70;
    const RING_COUNT: u32 = 16;
    const BULLET_SPEED: f32 = 2.5;
    const BULLET_SIZE: f32 = 6.0;
    const BULLET_DAMAGE: f32 = 10.0;
    const BULLET_LIFETIME: u32 = 150;
    const SUMMON_INTERVAL: u32 = 300;
    const SUMMON_COUNT: usize = 2;
    const SUMMON_HP: f32 = 0.5;
    const MAX_ROOM_ENEMIES: usize = 6;
    const SPIN: f32 = 0.01;
}

impl BossBehavior for OverflowingPot {
    fn advance(&self, boss: &mut Boss, ctx: &mut BossContext<'_>) {
        boss.pos = Self::ANCHOR;
        boss.angle += Self::SPIN;

        if expired(&mut boss.shoot_timer) {
            boss.shoot_timer = Self::RING_INTERVAL;
            // Odd rings sit halfway between the previous ring's bullets
            let offset = if boss.phase % 2 == 0 { 0.0 } else { PI / Self::RING_COUNT as f32 };
            for i in 0..Self::RING_COUNT {
                let angle = offset + TAU * i as f32 / Self::RING_COUNT as f32;
                ctx.projectiles.push(Projectile::hostile(
                    boss.pos,
                    unit_from_angle(angle) * Self::BULLET_SPEED,
                    Self::BULLET_SIZE,
                    Self::BULLET_DAMAGE,
                    Self::BULLET_LIFETIME,
                ));
            }
            boss.phase += 1;
        }

        if expired(&mut boss.summon_timer) {
            boss.summon_timer = Self::SUMMON_INTERVAL;
            let room_left = Self::MAX_ROOM_ENEMIES.saturating_sub(ctx.enemies.len());
            for k in 0..Self::SUMMON_COUNT.min(room_left) {
                let side = if k % 2 == 0 { -1.0 } else { 1.0 };
                let spot = boss.pos + Vec2::new(side * (boss.size + 30.0), boss.size + 20.0);
                let kind = EnemyKind::MilkBlob;
                let pos = clamp_to_room(spot, kind.stats().size);
                ctx.enemies.push(Enemy::new(kind, pos, Self::SUMMON_HP, &mut *ctx.rng));
            }
        }
    }
}

/// Advance the current room's boss by one tick
pub fn update_boss(state: &mut RunState) {
    let room_index = state.current_room;
    let Some(mut boss) = state.rooms[room_index].boss.take() else {
        return;
    };
    if !boss.is_alive() {
        state.rooms[room_index].boss = Some(boss);
        return;
    }

    {
        let mut ctx = BossContext {
            player_pos: state.player.pos,
            projectiles: &mut state.projectiles,
            enemies: &mut state.rooms[room_index].enemies,
            rng: &mut state.rng,
        };
        behavior_for(boss.kind).advance(&mut boss, &mut ctx);
    }
    boss.pos = clamp_to_room(boss.pos, boss.size);

    let burning = boss.burn_timer > 0;
    boss.burn_timer = boss.burn_timer.saturating_sub(1);
    let (pos, size, contact) = (boss.pos, boss.size, boss.kind.stats().damage);
    state.rooms[room_index].boss = Some(boss);

    let burn = BURN_DAMAGE_PER_TICK * state.damage_mult();
    if burning && damage_boss(state, burn) {
        return;
    }

    let player = &state.player;
    if !player.is_invincible() && circles_overlap(player.pos, player.size, pos, size) {
        apply_player_damage(state, contact, PLAYER_INVINCIBLE_AFTER_HIT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Upgrades;
    use rand::SeedableRng;

    fn ctx_parts() -> (Vec<Projectile>, Vec<Enemy>, Pcg32) {
        (Vec::new(), Vec::new(), Pcg32::seed_from_u64(17))
    }

    #[test]
    fn test_grinder_burst_rotates() {
        let (mut projectiles, mut enemies, mut rng) = ctx_parts();
        let mut boss = Boss::new(BossKind::Grinder, 1.0);
        boss.shoot_timer = 1;
        let mut ctx = BossContext {
            player_pos: Vec2::new(400.0, 500.0),
            projectiles: &mut projectiles,
            enemies: &mut enemies,
            rng: &mut rng,
        };
        Grinder.advance(&mut boss, &mut ctx);
        let first = ctx.projectiles[0].vel;
        assert_eq!(ctx.projectiles.len(), 8);

        boss.shoot_timer = 1;
        Grinder.advance(&mut boss, &mut ctx);
        assert_eq!(ctx.projectiles.len(), 16);
        let second = ctx.projectiles[8].vel;
        // Second burst is rotated by the spin accumulated in between
        assert!(first.angle_to(second).abs() > 1e-3);
    }

    #[test]
    fn test_grinder_walks_toward_player() {
        let (mut projectiles, mut enemies, mut rng) = ctx_parts();
        let mut boss = Boss::new(BossKind::Grinder, 1.0);
        boss.move_timer = 1;
        let player_pos = Vec2::new(400.0, 500.0);
        let mut ctx = BossContext {
            player_pos,
            projectiles: &mut projectiles,
            enemies: &mut enemies,
            rng: &mut rng,
        };
        let before = boss.pos.distance(player_pos);
        Grinder.advance(&mut boss, &mut ctx);
        Grinder.advance(&mut boss, &mut ctx);
        assert!(boss.pos.distance(player_pos) < before);
    }

    #[test]
    fn test_steam_king_drops_stationary_hazards() {
        let (mut projectiles, mut enemies, mut rng) = ctx_parts();
        let mut boss = Boss::new(BossKind::SteamKing, 1.0);
        boss.shoot_timer = 1;
        let mut ctx = BossContext {
            player_pos: Vec2::ZERO,
            projectiles: &mut projectiles,
            enemies: &mut enemies,
            rng: &mut rng,
        };
        SteamKing.advance(&mut boss, &mut ctx);
        assert_eq!(ctx.projectiles.len(), 3);
        assert!(ctx.projectiles.iter().all(|p| p.hazard && !p.friendly && p.vel == Vec2::ZERO));
    }

    #[test]
    fn test_steam_king_vanishes_each_turn() {
        let (mut projectiles, mut enemies, mut rng) = ctx_parts();
        let mut boss = Boss::new(BossKind::SteamKing, 1.0);
        let mut ctx = BossContext {
            player_pos: Vec2::ZERO,
            projectiles: &mut projectiles,
            enemies: &mut enemies,
            rng: &mut rng,
        };
        let ticks_per_turn = (TAU / SteamKing::SPIN).ceil() as u32 + 1;
        let mut vanished = false;
        for _ in 0..ticks_per_turn {
            SteamKing.advance(&mut boss, &mut ctx);
            vanished |= boss.invisible_timer > 0;
        }
        assert!(vanished);
        assert_eq!(boss.phase, 1);
    }

    #[test]
    fn test_pot_rings_alternate_and_stay_put() {
        let (mut projectiles, mut enemies, mut rng) = ctx_parts();
        let mut boss = Boss::new(BossKind::OverflowingPot, 1.0);
        boss.pos = Vec2::new(100.0, 100.0);
        boss.shoot_timer = 1;
        let mut ctx = BossContext {
            player_pos: Vec2::ZERO,
            projectiles: &mut projectiles,
            enemies: &mut enemies,
            rng: &mut rng,
        };
        OverflowingPot.advance(&mut boss, &mut ctx);
        assert_eq!(boss.pos, OverflowingPot::ANCHOR);
        boss.shoot_timer = 1;
        OverflowingPot.advance(&mut boss, &mut ctx);
        assert_eq!(ctx.projectiles.len(), 32);
        let a = ctx.projectiles[0].vel;
        let b = ctx.projectiles[16].vel;
        assert!((a.angle_to(b).abs() - PI / 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_pot_summons_capped_reinforcements() {
        let (mut projectiles, mut enemies, mut rng) = ctx_parts();
        let mut boss = Boss::new(BossKind::OverflowingPot, 1.0);
        let mut ctx = BossContext {
            player_pos: Vec2::ZERO,
            projectiles: &mut projectiles,
            enemies: &mut enemies,
            rng: &mut rng,
        };
        for _ in 0..10 {
            boss.summon_timer = 1;
            OverflowingPot.advance(&mut boss, &mut ctx);
        }
        assert_eq!(ctx.enemies.len(), OverflowingPot::MAX_ROOM_ENEMIES);
        let blob = EnemyKind::MilkBlob.stats();
        assert!(ctx.enemies.iter().all(|e| e.kind == EnemyKind::MilkBlob && e.hp == blob.hp * 0.5));
    }

    #[test]
    fn test_burned_out_boss_deals_no_contact() {
        let mut state = RunState::new(Upgrades::default(), 4);
        state.current_room = state.rooms.len() - 1;
        let boss = state.rooms[state.current_room].boss.as_mut().unwrap();
        boss.hp = 0.1;
        boss.burn_timer = 5;
        let (pos, gold) = (boss.pos, boss.drop_gold as u64);
        state.player.pos = pos;
        update_boss(&mut state);
        let boss = state.rooms[state.current_room].boss.as_ref().unwrap();
        assert!(!boss.is_alive());
        assert_eq!(state.player.hp, state.player.max_hp);
        assert_eq!(state.gold_collected, gold);
    }

    #[test]
    fn test_boss_contact_damages_player() {
        let mut state = RunState::new(Upgrades::default(), 4);
        state.current_room = state.rooms.len() - 1;
        let boss_pos = state.rooms[state.current_room].boss.as_ref().unwrap().pos;
        state.player.pos = boss_pos;
        update_boss(&mut state);
        assert!(state.player.hp < state.player.max_hp);
        assert!(state.player.is_invincible());
    }
}
