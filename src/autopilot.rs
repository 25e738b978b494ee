//! Idle/demo driver
//!
//! Builds a `TickInput` from a read-only look at the run state: kite and
//! shoot the nearest threat, then head for the portal or the north door.

use glam::Vec2;

use crate::consts::*;
use crate::direction;
use crate::sim::{DoorDirection, Phase, RunState, TickInput};

/// Preferred distance band to the current target
const KITE_MIN: f32 = 150.0;
const KITE_MAX: f32 = 260.0;
/// Enemies inside the ultimate radius before it's worth firing
const ULTIMATE_CROWD: usize = 3;

/// Pick this tick's input for the autopilot
pub fn drive(state: &RunState) -> TickInput {
    let mut input = TickInput::default();
    if state.phase != Phase::Playing || state.transition.is_some() {
        return input;
    }

    let player = &state.player;
    let room = state.room();
    let time = state.run_timer as f32;

    // Nearest living threat, enemies first then the boss
    let target = room
        .enemies
        .iter()
        .filter(|e| e.is_alive())
        .map(|e| (e.pos, e.size))
        .chain(room.boss.iter().filter(|b| b.is_alive()).map(|b| (b.pos, b.size)))
        .min_by(|a, b| {
            player
                .pos
                .distance(a.0)
                .partial_cmp(&player.pos.distance(b.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    if let Some((pos, size)) = target {
        input.aim = pos;
        input.fire = true;

        let dist = player.pos.distance(pos);
        let toward = direction(player.pos, pos);
        let strafe = toward.perp() * (time * 0.02).sin().signum();
        input.move_dir = if dist < KITE_MIN {
            -toward + strafe * 0.5
        } else if dist > KITE_MAX {
            toward + strafe * 0.3
        } else {
            strafe
        };

        let dash_reach = player.size + size + DASH_BURST_REACH;
        input.dash = dist < dash_reach && player.dash_cooldown == 0;

        let crowd = room
            .enemies
            .iter()
            .filter(|e| e.is_alive() && player.pos.distance(e.pos) < ULTIMATE_RADIUS)
            .count();
        let boss_close = room
            .boss
            .as_ref()
            .is_some_and(|b| b.is_alive() && player.pos.distance(b.pos) < ULTIMATE_RADIUS);
        input.ultimate = player.ultimate_cooldown == 0 && (crowd >= ULTIMATE_CROWD || boss_close);
    } else if room.cleared {
        // Grab loot first, then leave
        let nearest_pickup = room.pickups.iter().map(|p| p.pos).min_by(|a, b| {
            player
                .pos
                .distance(*a)
                .partial_cmp(&player.pos.distance(*b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let portal = state.exit_portal.as_ref().filter(|p| p.active).map(|p| p.pos);
        let exit = portal.or_else(|| room.door(DoorDirection::North).map(|d| d.pos));

        if let Some(goal) = nearest_pickup.or(exit) {
            let toward = direction(player.pos, goal);
            // Wobble so walls between us and the goal get slid around
            let wobble = toward.perp() * (time * 0.05).sin() * 0.6;
            input.move_dir = toward + wobble;
            input.aim = goal;
        }
    }

    // Step out of hazard zones whatever else is going on
    if let Some(hazard) = state
        .projectiles
        .iter()
        .find(|p| p.hazard && player.pos.distance(p.pos) < p.size + player.size)
    {
        let away = direction(hazard.pos, player.pos);
        input.move_dir = if away == Vec2::ZERO { Vec2::X } else { away };
    }

    input
}
