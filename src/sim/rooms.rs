//! Procedural floor generation
//!
//! A floor is a linear chain of rooms: room `i` leads north to `i + 1` and
//! south back to `i - 1`. The last room holds the boss, and room 0 never
//! has obstacles.

use glam::Vec2;
use rand::Rng;

use super::collision::Rect;
use super::state::{Boss, Door, DoorDirection, Enemy, Pickup, PickupKind, Room};
use crate::consts::*;
use crate::tuning::{BossKind, ENEMY_POOL, floor_multiplier};

/// Inset used for pickup placement
const SPAWN_MARGIN: f32 = 70.0;
/// Enemies spawn this much further in than pickups
const ENEMY_SPAWN_INSET: f32 = 50.0;
const MAX_ENEMIES_PER_ROOM: usize = 8;
const HEALTH_PICKUP_CHANCE: f64 = 0.4;
const HEALTH_PICKUP_VALUE: u32 = 25;

/// Build the rooms of one floor
pub fn generate_floor(floor: u32, room_count: usize, rng: &mut impl Rng) -> Vec<Room> {
    let hp_mult = floor_multiplier(floor);
    let mut rooms = Vec::with_capacity(room_count);

    for i in 0..room_count {
        let is_boss_room = i + 1 == room_count;

        let enemies = if is_boss_room {
            Vec::new()
        } else {
            let count = (3 + floor as usize + i / 2).min(MAX_ENEMIES_PER_ROOM);
            // Later floors unlock more of the pool
            let pool_size = (floor as usize + 2).min(ENEMY_POOL.len());
            (0..count)
                .map(|_| {
                    let kind = ENEMY_POOL[rng.random_range(0..pool_size)];
                    let pos = random_point(rng, SPAWN_MARGIN + ENEMY_SPAWN_INSET);
                    Enemy::new(kind, pos, hp_mult, rng)
                })
                .collect()
        };

        let boss = is_boss_room.then(|| Boss::new(BossKind::for_floor(floor), hp_mult));

        let mut pickups = Vec::new();
        if is_boss_room || rng.random_bool(HEALTH_PICKUP_CHANCE) {
            pickups.push(Pickup {
                pos: random_point(rng, SPAWN_MARGIN),
                kind: PickupKind::Health,
                value: HEALTH_PICKUP_VALUE,
            });
        }
        let gold_count = rng.random_range(1..=3);
        for _ in 0..gold_count {
            pickups.push(Pickup {
                pos: random_point(rng, SPAWN_MARGIN),
                kind: PickupKind::Gold,
                value: rng.random_range(1..=3),
            });
        }

        let mut doors = Vec::new();
        if !is_boss_room {
            doors.push(Door {
                pos: Vec2::new(CANVAS_WIDTH / 2.0, NORTH_DOOR_Y),
                direction: DoorDirection::North,
                leads_to: i + 1,
            });
        }
        if i > 0 {
            doors.push(Door {
                pos: Vec2::new(CANVAS_WIDTH / 2.0, SOUTH_DOOR_Y),
                direction: DoorDirection::South,
                leads_to: i - 1,
            });
        }

        let walls = if i == 0 { Vec::new() } else { generate_walls(i, rng) };

        rooms.push(Room {
            enemies,
            boss,
            walls,
            pickups,
            doors,
            cleared: false,
            is_boss_room,
        });
    }

    log::info!(
        "Floor {} generated: {} rooms, boss {}",
        floor + 1,
        room_count,
        BossKind::for_floor(floor).as_str()
    );
    rooms
}

/// Obstacle layout picked by room index
fn generate_walls(room_index: usize, rng: &mut impl Rng) -> Vec<Rect> {
    const THICKNESS: f32 = 20.0;
    const MARGIN: f32 = 60.0;

    match room_index % 3 {
        // Center pillars
        0 => vec![
            Rect::new(300.0, 220.0, 40.0, 40.0),
            Rect::new(460.0, 340.0, 40.0, 40.0),
        ],
        // L-shaped partitions
        1 => vec![
            Rect::new(250.0, 200.0, THICKNESS, 120.0),
            Rect::new(250.0, 200.0, 100.0, THICKNESS),
            Rect::new(500.0, 300.0, THICKNESS, 120.0),
            Rect::new(430.0, 400.0, 90.0, THICKNESS),
        ],
        // Scattered blocks
        _ => (0..3)
            .map(|_| {
                let x = rng.random_range(MARGIN + 80.0..=CANVAS_WIDTH - MARGIN - 120.0).floor();
                let y = rng.random_range(MARGIN + 80.0..=CANVAS_HEIGHT - MARGIN - 120.0).floor();
                let w = rng.random_range(30..=60) as f32;
                let h = rng.random_range(30..=60) as f32;
                Rect::new(x, y, w, h)
            })
            .collect(),
    }
}

/// Uniform point inset `margin` from every room edge
fn random_point(rng: &mut impl Rng, margin: f32) -> Vec2 {
    Vec2::new(
        rng.random_range(margin..CANVAS_WIDTH - margin),
        rng.random_range(margin..CANVAS_HEIGHT - margin),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn floor(index: u32) -> Vec<Room> {
        let mut rng = Pcg32::seed_from_u64(42 + index as u64);
        generate_floor(index, ROOMS_PER_FLOOR, &mut rng)
    }

    #[test]
    fn test_floor_is_linear_chain() {
        let rooms = floor(0);
        assert_eq!(rooms.len(), ROOMS_PER_FLOOR);
        for (i, room) in rooms.iter().enumerate() {
            let north = room.door(DoorDirection::North).map(|d| d.leads_to);
            let south = room.door(DoorDirection::South).map(|d| d.leads_to);
            if i + 1 < rooms.len() {
                assert_eq!(north, Some(i + 1));
            } else {
                assert_eq!(north, None);
            }
            if i > 0 {
                assert_eq!(south, Some(i - 1));
            } else {
                assert_eq!(south, None);
            }
        }
    }

    #[test]
    fn test_boss_room_is_last() {
        for f in 0..4 {
            let rooms = floor(f);
            let (last, rest) = rooms.split_last().unwrap();
            assert!(last.is_boss_room);
            assert!(last.enemies.is_empty());
            let boss = last.boss.as_ref().unwrap();
            assert_eq!(boss.kind, BossKind::for_floor(f));
            assert_eq!(boss.max_hp, boss.kind.stats().hp * floor_multiplier(f));
            assert!(last.pickups.iter().any(|p| p.kind == PickupKind::Health));
            assert!(rest.iter().all(|r| !r.is_boss_room && r.boss.is_none()));
        }
    }

    #[test]
    fn test_enemy_counts_scale_and_cap() {
        let rooms = floor(0);
        for (i, room) in rooms.iter().take(ROOMS_PER_FLOOR - 1).enumerate() {
            assert_eq!(room.enemies.len(), (3 + i / 2).min(MAX_ENEMIES_PER_ROOM));
        }
        let mut rng = Pcg32::seed_from_u64(9);
        let deep = generate_floor(9, 20, &mut rng);
        assert!(deep.iter().all(|r| r.enemies.len() <= MAX_ENEMIES_PER_ROOM));
    }

    #[test]
    fn test_first_floor_pool_is_restricted() {
        let rooms = floor(0);
        for enemy in rooms.iter().flat_map(|r| &r.enemies) {
            assert!(ENEMY_POOL[..2].contains(&enemy.kind));
        }
    }

    #[test]
    fn test_enemy_hp_scales_with_floor() {
        let rooms = floor(2);
        for enemy in rooms.iter().flat_map(|r| &r.enemies) {
            assert_eq!(enemy.max_hp, enemy.kind.stats().hp * floor_multiplier(2));
            assert_eq!(enemy.hp, enemy.max_hp);
        }
    }

    #[test]
    fn test_pickups_within_bounds() {
        for room in floor(1) {
            let gold = room.pickups.iter().filter(|p| p.kind == PickupKind::Gold).count();
            assert!((1..=3).contains(&gold));
            for pickup in &room.pickups {
                assert!(pickup.pos.x >= SPAWN_MARGIN && pickup.pos.x <= CANVAS_WIDTH - SPAWN_MARGIN);
                assert!(pickup.pos.y >= SPAWN_MARGIN && pickup.pos.y <= CANVAS_HEIGHT - SPAWN_MARGIN);
            }
        }
    }

    #[test]
    fn test_entry_room_has_no_walls() {
        for f in 0..3 {
            let rooms = floor(f);
            assert!(rooms[0].walls.is_empty());
            assert_eq!(rooms[1].walls.len(), 4); // L-shapes
            assert_eq!(rooms[2].walls.len(), 3); // scatter
            assert_eq!(rooms[3].walls.len(), 2); // pillars
        }
    }
}
