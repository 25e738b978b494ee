//! Fixed timestep simulation tick
//!
//! One call to `update` advances the run by exactly one tick. Every wait is
//! a countdown field decremented here; nothing reads the wall clock.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::boss::update_boss;
use super::buffs::draw_rewards;
use super::collision::{circles_overlap, clamp_to_room, out_of_canvas, push_out_of_wall};
use super::rooms::generate_floor;
use super::state::{DoorDirection, ExitPortal, Phase, PickupKind, Projectile, RoomTime, RunState, Transition};
use crate::consts::*;
use crate::direction;

const COLOR_HIT: u32 = 0x8B4513;
const COLOR_KILL: u32 = 0xFFD700;
const COLOR_HURT: u32 = 0xFF4444;
const COLOR_SHIELD: u32 = 0x87CEEB;
const COLOR_DASH: u32 = 0xD2B48C;
const COLOR_ULTIMATE: u32 = 0xFF8C00;
const COLOR_HEAL: u32 = 0x44FF44;
const COLOR_WALL: u32 = 0x888888;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Movement intent; any non-zero length, normalized by the engine
    pub move_dir: Vec2,
    /// Aim point in canvas coordinates
    pub aim: Vec2,
    /// Fire held
    pub fire: bool,
    pub dash: bool,
    pub ultimate: bool,
}

impl TickInput {
    /// Movement vector from four held direction keys
    pub fn keys_to_move(up: bool, down: bool, left: bool, right: bool) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(left, right), axis(up, down))
    }
}

/// Advance the run by one tick
pub fn update(state: &mut RunState, input: &TickInput) {
    if state.phase != Phase::Playing {
        return;
    }
    if step_transition(state) {
        return;
    }

    advance_timers(state);
    move_player(state, input);
    decay_cooldowns(state);
    activate_abilities(state, input);
    shoot(state, input);
    update_enemies(state);
    update_boss(state);
    update_projectiles(state);
    update_particles(state);
    check_room_clear(state);

    // A boss clear halts play until a reward is picked
    if state.phase == Phase::Playing {
        collect_pickups(state);
        check_portal(state);
        check_doors(state);
    }

    check_death(state);
}

/// Arm the standard forward progression: next room, next floor, or victory
pub fn advance_forward(state: &mut RunState) {
    if state.transition.is_some() {
        return;
    }
    let target = if !state.is_last_room() {
        Some((state.floor, state.current_room + 1))
    } else if !state.is_last_floor() {
        Some((state.floor + 1, 0))
    } else {
        None
    };

    match target {
        Some((floor, room)) => {
            log::debug!("Transition armed to floor {} room {}", floor + 1, room + 1);
            state.transition = Some(Transition { timer: TRANSITION_DURATION, floor, room });
        }
        None => {
            log::info!(
                "Victory! {} gold, {} rooms in {} ticks",
                state.gold_collected,
                state.rooms_cleared,
                state.run_timer
            );
            state.phase = Phase::Victory;
        }
    }
}

/// Count down a pending transition; true while one is in progress
fn step_transition(state: &mut RunState) -> bool {
    let Some(mut transition) = state.transition else {
        return false;
    };
    transition.timer = transition.timer.saturating_sub(1);
    if transition.timer == TRANSITION_DURATION / 2 {
        enter_room(state, transition.floor, transition.room);
    }
    state.transition = (transition.timer > 0).then_some(transition);
    true
}

/// Mid-fade swap into a new room (and floor, when it changes)
fn enter_room(state: &mut RunState, floor: u32, room: usize) {
    if floor != state.floor {
        state.floor = floor;
        state.rooms = generate_floor(floor, state.config.rooms_per_floor, &mut state.rng);
    }
    state.current_room = room;
    state.player.pos = Vec2::new(CANVAS_WIDTH / 2.0, FORWARD_ENTRY_Y);
    state.projectiles.clear();
    state.exit_portal = None;
    state.clear_message_timer = 0;
    state.fast_clear_timer = 0;
    state.room_timer = 0;
    if state.run_buffs.has_room_shield() {
        state.player.shield = true;
    }
}

fn advance_timers(state: &mut RunState) {
    state.run_timer += 1;
    state.room_timer += 1;
    state.screen_shake = (state.screen_shake - SCREEN_SHAKE_DECAY).max(0.0);
    state.damage_flash = state.damage_flash.saturating_sub(1);
    state.clear_message_timer = state.clear_message_timer.saturating_sub(1);
    state.fast_clear_timer = state.fast_clear_timer.saturating_sub(1);
}

fn move_player(state: &mut RunState, input: &TickInput) {
    let speed_mult = state.upgrades.speed_mult() * state.run_buffs.speed_mult();
    let dash_speed = state.run_buffs.dash_speed();
    let room = &state.rooms[state.current_room];
    let player = &mut state.player;

    let step = if player.is_dashing() {
        player.facing * dash_speed
    } else {
        input.move_dir.normalize_or_zero() * PLAYER_SPEED * speed_mult
    };
    player.pos += step;

    let aim = direction(player.pos, input.aim);
    if aim != Vec2::ZERO {
        player.facing = aim;
    }

    player.pos = clamp_to_room(player.pos, player.size);
    for wall in &room.walls {
        player.pos = push_out_of_wall(player.pos, player.size, wall);
    }
}

fn decay_cooldowns(state: &mut RunState) {
    let player = &mut state.player;
    player.shoot_cooldown = player.shoot_cooldown.saturating_sub(1);
    player.dash_cooldown = player.dash_cooldown.saturating_sub(1);
    player.dash_timer = player.dash_timer.saturating_sub(1);
    player.ultimate_cooldown = player.ultimate_cooldown.saturating_sub(1);
    player.invincible_timer = player.invincible_timer.saturating_sub(1);
}

fn activate_abilities(state: &mut RunState, input: &TickInput) {
    let damage_mult = state.damage_mult();

    if input.dash && state.player.dash_cooldown == 0 && !state.player.is_dashing() {
        let player = &mut state.player;
        player.dash_timer = PLAYER_DASH_DURATION;
        player.dash_cooldown = state.upgrades.dash_cooldown();
        player.invincible_timer = player.invincible_timer.max(PLAYER_DASH_DURATION);
        let (origin, size) = (player.pos, player.size);

        state.spawn_particles(origin, COLOR_DASH, 10, 2.0);
        area_damage(
            state,
            origin,
            |target_size| size + target_size + DASH_BURST_REACH,
            DASH_BURST_DAMAGE * damage_mult,
        );
    }

    if input.ultimate && state.player.ultimate_cooldown == 0 {
        state.player.ultimate_cooldown = PLAYER_ULTIMATE_COOLDOWN;
        let origin = state.player.pos;
        state.screen_shake = 8.0;
        state.spawn_particles(origin, COLOR_ULTIMATE, 40, 6.0);
        area_damage(state, origin, |_| ULTIMATE_RADIUS, ULTIMATE_DAMAGE * damage_mult);
    }
}

/// Hit every living enemy and the boss whose center lies within
/// `reach(target_size)` of `origin`
fn area_damage(state: &mut RunState, origin: Vec2, reach: impl Fn(f32) -> f32, damage: f32) {
    for i in 0..state.room().enemies.len() {
        let enemy = &state.room().enemies[i];
        if enemy.is_alive() && origin.distance(enemy.pos) < reach(enemy.size) {
            damage_enemy(state, i, damage);
        }
    }
    let boss_in_reach = state
        .room()
        .boss
        .as_ref()
        .is_some_and(|b| b.is_alive() && origin.distance(b.pos) < reach(b.size));
    if boss_in_reach {
        damage_boss(state, damage);
    }
}

fn shoot(state: &mut RunState, input: &TickInput) {
    let player = &state.player;
    if !input.fire || player.shoot_cooldown > 0 || player.is_dashing() {
        return;
    }

    let mut aim = direction(player.pos, input.aim);
    if aim == Vec2::ZERO {
        aim = player.facing;
    }
    let bean = Projectile::friendly(
        player.pos + aim * player.size,
        aim * BEAN_SPEED,
        BEAN_SIZE,
        BEAN_DAMAGE * state.damage_mult(),
        BEAN_LIFETIME,
    );
    state.player.shoot_cooldown = state.run_buffs.shoot_cooldown();
    state.projectiles.push(bean);
}

fn update_enemies(state: &mut RunState) {
    let room_index = state.current_room;
    let burn_damage = BURN_DAMAGE_PER_TICK * state.damage_mult();

    for i in 0..state.rooms[room_index].enemies.len() {
        if !state.rooms[room_index].enemies[i].is_alive() {
            continue;
        }

        let burning = {
            let enemy = &mut state.rooms[room_index].enemies[i];
            let burning = enemy.burn_timer > 0;
            enemy.burn_timer = enemy.burn_timer.saturating_sub(1);
            burning
        };
        if burning && damage_enemy(state, i, burn_damage) {
            continue;
        }

        let player_pos = state.player.pos;
        let enemy = &mut state.rooms[room_index].enemies[i];
        let stats = enemy.kind.stats();

        enemy.move_timer = enemy.move_timer.saturating_sub(1);
        if enemy.move_timer == 0 {
            enemy.move_timer = state.rng.random_range(40..=80);
            let jitter = Vec2::new(
                state.rng.random_range(-40.0..40.0),
                state.rng.random_range(-40.0..40.0),
            );
            enemy.target_pos = enemy.pos + direction(enemy.pos, player_pos) * 100.0 + jitter;
        }
        let step = direction(enemy.pos, enemy.target_pos) * stats.speed;
        enemy.pos = clamp_to_room(enemy.pos + step, enemy.size);

        enemy.shoot_timer = enemy.shoot_timer.saturating_sub(1);
        if enemy.shoot_timer == 0 {
            enemy.shoot_timer = state.rng.random_range(60..=120);
            if enemy.kind.is_ranged() {
                let aim = direction(enemy.pos, player_pos);
                state.projectiles.push(Projectile::hostile(
                    enemy.pos,
                    aim * ENEMY_BULLET_SPEED,
                    ENEMY_BULLET_SIZE,
                    stats.damage,
                    ENEMY_BULLET_LIFETIME,
                ));
            }
        }

        let (pos, size) = (enemy.pos, enemy.size);
        if circles_overlap(state.player.pos, state.player.size, pos, size) {
            apply_player_damage(state, stats.damage, PLAYER_INVINCIBLE_AFTER_HIT);
        }
    }
}

/// Shared player damage path for contact, bullets and hazards.
///
/// A held shield eats the whole hit. Returns false if the player was
/// invincible and nothing happened.
pub(crate) fn apply_player_damage(state: &mut RunState, amount: f32, invincibility: u32) -> bool {
    let player = &mut state.player;
    if player.is_invincible() {
        return false;
    }
    let pos = player.pos;

    if player.shield {
        player.shield = false;
        player.invincible_timer = SHIELD_INVINCIBLE;
        state.spawn_particles(pos, COLOR_SHIELD, 12, 3.0);
        return true;
    }

    player.hp -= amount;
    player.invincible_timer = invincibility;
    state.screen_shake = 5.0;
    state.damage_flash = 6;
    state.spawn_particles(pos, COLOR_HURT, 8, 3.0);
    true
}

/// Damage enemy `index` of the current room; true on the killing blow
pub(crate) fn damage_enemy(state: &mut RunState, index: usize, damage: f32) -> bool {
    let enemy = &mut state.room_mut().enemies[index];
    if !enemy.is_alive() {
        return false;
    }
    enemy.hp -= damage;
    if enemy.is_alive() {
        return false;
    }

    let (pos, gold) = (enemy.pos, enemy.drop_gold);
    state.gold_collected += u64::from(gold);
    state.spawn_particles(pos, COLOR_KILL, 15, 4.0);
    true
}

/// Damage the current room's boss; true on the killing blow
pub(crate) fn damage_boss(state: &mut RunState, damage: f32) -> bool {
    let Some(boss) = state.room_mut().boss.as_mut() else {
        return false;
    };
    if !boss.is_alive() {
        return false;
    }
    boss.hp -= damage;
    if boss.is_alive() {
        return false;
    }

    let (pos, gold, kind) = (boss.pos, boss.drop_gold, boss.kind);
    state.gold_collected += u64::from(gold);
    state.screen_shake = 10.0;
    state.spawn_particles(pos, COLOR_KILL, 50, 6.0);
    log::info!("Boss defeated: {} (floor {})", kind.as_str(), state.floor + 1);
    true
}

fn update_projectiles(state: &mut RunState) {
    let projectiles = std::mem::take(&mut state.projectiles);
    let mut kept = Vec::with_capacity(projectiles.len());

    for mut proj in projectiles {
        if !proj.hazard {
            proj.pos += proj.vel;
        }
        proj.lifetime = proj.lifetime.saturating_sub(1);
        if proj.lifetime == 0 {
            continue;
        }

        if !proj.hazard {
            if out_of_canvas(proj.pos) {
                continue;
            }
            if state.room().walls.iter().any(|w| w.contains(proj.pos)) {
                state.spawn_particles(proj.pos, COLOR_WALL, 3, 1.5);
                continue;
            }
        }

        let player = &state.player;
        let touches_player = circles_overlap(proj.pos, proj.size, player.pos, player.size);
        if proj.friendly {
            if strike(state, &proj) {
                continue;
            }
        } else if proj.hazard {
            if touches_player {
                apply_player_damage(state, proj.damage, HAZARD_INVINCIBLE);
            }
        } else if touches_player && apply_player_damage(state, proj.damage, PLAYER_INVINCIBLE_AFTER_HIT) {
            continue;
        }

        kept.push(proj);
    }

    state.projectiles = kept;
}

/// Resolve a friendly projectile against the first enemy it touches, then
/// the boss; true if it hit something
fn strike(state: &mut RunState, proj: &Projectile) -> bool {
    let burn_chance = state.run_buffs.burn_chance();
    let target = state
        .room()
        .enemies
        .iter()
        .position(|e| e.is_alive() && circles_overlap(proj.pos, proj.size, e.pos, e.size));

    if let Some(index) = target {
        let killed = damage_enemy(state, index, proj.damage);
        if !killed && burn_chance > 0.0 && state.rng.random_bool(burn_chance) {
            state.room_mut().enemies[index].burn_timer = BURN_DURATION;
        }
        state.spawn_particles(proj.pos, COLOR_HIT, 5, 2.0);
        return true;
    }

    let boss_hit = state
        .room()
        .boss
        .as_ref()
        .is_some_and(|b| b.is_alive() && circles_overlap(proj.pos, proj.size, b.pos, b.size));
    if boss_hit {
        let killed = damage_boss(state, proj.damage);
        if !killed && burn_chance > 0.0 && state.rng.random_bool(burn_chance) {
            if let Some(boss) = state.room_mut().boss.as_mut() {
                boss.burn_timer = BURN_DURATION;
            }
        }
        state.spawn_particles(proj.pos, COLOR_HIT, 5, 2.0);
        return true;
    }
    false
}

fn update_particles(state: &mut RunState) {
    for p in &mut state.particles {
        p.pos += p.vel;
        p.vel *= 0.95;
        p.lifetime -= 1.0;
    }
    state.particles.retain(|p| p.lifetime > 0.0);
}

fn check_room_clear(state: &mut RunState) {
    let room = state.room_mut();
    room.remove_dead();
    if room.boss.as_ref().is_some_and(|b| !b.is_alive()) {
        room.boss = None;
    }
    if room.cleared || !room.is_clear() {
        return;
    }
    room.cleared = true;
    let is_boss_room = room.is_boss_room;

    let ticks = state.room_timer;
    state.room_times.push(RoomTime { floor: state.floor, room: state.current_room, ticks });
    state.room_timer = 0;
    state.rooms_cleared += 1;
    state.clear_message_timer = CLEAR_MESSAGE_DURATION;
    if ticks < FAST_CLEAR_THRESHOLD {
        state.fast_clear_timer = FAST_CLEAR_MESSAGE_DURATION;
    }
    log::info!(
        "Room cleared: floor {} room {} in {} ticks ({}/{})",
        state.floor + 1,
        state.current_room + 1,
        ticks,
        state.rooms_cleared,
        state.total_rooms()
    );

    if is_boss_room {
        state.exit_portal = None;
        state.reward_choices = draw_rewards(state.config.reward_choices, &mut state.rng);
        state.phase = Phase::Reward;
        log::info!("Reward phase: {} choices", state.reward_choices.len());
    } else {
        let inset = ROOM_MARGIN + PORTAL_RADIUS;
        let pos = Vec2::new(
            state.rng.random_range(inset..CANVAS_WIDTH - inset),
            state.rng.random_range(inset..CANVAS_HEIGHT - inset),
        );
        state.exit_portal = Some(ExitPortal { pos, active: true });
    }
}

fn collect_pickups(state: &mut RunState) {
    let (pos, size) = (state.player.pos, state.player.size);
    let room_index = state.current_room;
    let pickups = std::mem::take(&mut state.rooms[room_index].pickups);
    let (taken, left): (Vec<_>, Vec<_>) = pickups
        .into_iter()
        .partition(|p| circles_overlap(pos, size, p.pos, PICKUP_RADIUS));
    state.rooms[room_index].pickups = left;

    for pickup in taken {
        match pickup.kind {
            PickupKind::Health => {
                state.player.heal(pickup.value as f32);
                state.spawn_particles(pickup.pos, COLOR_HEAL, 8, 2.0);
            }
            PickupKind::Gold => {
                state.gold_collected += u64::from(pickup.value);
                state.spawn_particles(pickup.pos, COLOR_KILL, 6, 2.0);
            }
        }
    }
}

fn check_portal(state: &mut RunState) {
    let player = &state.player;
    let touched = match state.exit_portal.as_mut() {
        Some(portal) if portal.active && circles_overlap(player.pos, player.size, portal.pos, PORTAL_RADIUS) => {
            portal.active = false;
            true
        }
        _ => false,
    };
    if touched {
        advance_forward(state);
    }
}

/// Doors only work once the room is cleared. North goes through the fade
/// like a portal; south is an instant step back.
fn check_doors(state: &mut RunState) {
    if state.transition.is_some() || !state.room().cleared {
        return;
    }
    let player = &state.player;
    let door = state
        .room()
        .doors
        .iter()
        .find(|d| circles_overlap(player.pos, player.size, d.pos, DOOR_REACH))
        .map(|d| (d.direction, d.leads_to));

    match door {
        Some((DoorDirection::North, _)) => advance_forward(state),
        Some((DoorDirection::South, target)) => {
            log::debug!("Back through south door to room {}", target + 1);
            state.current_room = target;
            state.projectiles.clear();
            state.exit_portal = None;
            state.room_timer = 0;
            state.player.pos = Vec2::new(CANVAS_WIDTH / 2.0, BACKWARD_ENTRY_Y);
        }
        _ => {}
    }
}

fn check_death(state: &mut RunState) {
    if state.player.hp > 0.0 {
        return;
    }
    state.phase = Phase::GameOver;
    state.reward_choices.clear();
    state.transition = None;
    let pos = state.player.pos;
    state.spawn_particles(pos, COLOR_HURT, 30, 5.0);
    log::info!(
        "Game over on floor {} room {} ({} gold)",
        state.floor + 1,
        state.current_room + 1,
        state.gold_collected
    );
}
