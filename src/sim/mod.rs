//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Fixed tick only, every wait is a countdown
//! - One seeded RNG owned by the run state
//! - No rendering, input or storage dependencies

pub mod boss;
pub mod buffs;
pub mod collision;
pub mod rooms;
pub mod state;
pub mod tick;

pub use boss::{BossBehavior, BossContext, behavior_for};
pub use buffs::{RUN_BUFF_POOL, RunBuff, RunBuffId, apply_run_buff, draw_rewards};
pub use collision::{Rect, circles_overlap, clamp_to_room, push_out_of_wall};
pub use rooms::generate_floor;
pub use state::{
    Boss, Door, DoorDirection, Enemy, ExitPortal, Particle, Phase, Pickup, PickupKind, Player,
    Projectile, Room, RoomTime, RunBuffs, RunState, Transition, Upgrades, create_initial_state,
};
pub use tick::{TickInput, advance_forward, update};
