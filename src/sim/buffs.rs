//! Run-scoped buffs offered after each boss kill
//!
//! Two buffs act once when picked (termo, leite de aveia). The rest are
//! read live from the stack counts every tick.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::state::{Phase, RunBuffs, RunState};
use super::tick::advance_forward;
use crate::consts::{BURN_CHANCE_PER_STACK, PLAYER_DASH_SPEED, PLAYER_MIN_SHOOT_COOLDOWN, PLAYER_SHOOT_COOLDOWN};

/// Max HP (and heal) granted per termo pick
pub const TERMO_MAX_HP: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunBuffId {
    /// +20% damage per stack
    Torrado,
    /// Shield that eats one hit per room
    LeiteAveia,
    /// +20% fire rate per stack
    Chantilly,
    /// +50 max HP, applied on pick
    Termo,
    /// 25% burn proc per stack
    Canela,
    /// +20% move and dash speed per stack
    Descaf,
}

/// Display metadata for one buff
#[derive(Debug, Clone, Copy)]
pub struct RunBuff {
    pub id: RunBuffId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

pub const RUN_BUFF_POOL: [RunBuff; 6] = [
    RunBuff {
        id: RunBuffId::Torrado,
        name: "Grão Torrado",
        description: "+20% damage on every attack",
        icon: "🔥",
    },
    RunBuff {
        id: RunBuffId::LeiteAveia,
        name: "Leite de Aveia",
        description: "Shield that absorbs 1 hit per room",
        icon: "🛡️",
    },
    RunBuff {
        id: RunBuffId::Chantilly,
        name: "Chantilly Extra",
        description: "+20% attack speed",
        icon: "🍦",
    },
    RunBuff {
        id: RunBuffId::Termo,
        name: "Termo Térmico",
        description: "+50 max HP",
        icon: "☕",
    },
    RunBuff {
        id: RunBuffId::Canela,
        name: "Canela em Pó",
        description: "25% chance to burn enemies",
        icon: "✨",
    },
    RunBuff {
        id: RunBuffId::Descaf,
        name: "Descafeinado Gelado",
        description: "+20% speed and dash range",
        icon: "💨",
    },
];

impl RunBuffId {
    pub fn info(self) -> &'static RunBuff {
        RUN_BUFF_POOL
            .iter()
            .find(|b| b.id == self)
            .unwrap_or_else(|| unreachable!("every buff id is in the pool"))
    }
}

impl RunBuffs {
    pub fn stacks(&self, id: RunBuffId) -> u32 {
        match id {
            RunBuffId::Torrado => self.torrado,
            RunBuffId::LeiteAveia => self.leite_aveia,
            RunBuffId::Chantilly => self.chantilly,
            RunBuffId::Termo => self.termo,
            RunBuffId::Canela => self.canela,
            RunBuffId::Descaf => self.descaf,
        }
    }

    fn stacks_mut(&mut self, id: RunBuffId) -> &mut u32 {
        match id {
            RunBuffId::Torrado => &mut self.torrado,
            RunBuffId::LeiteAveia => &mut self.leite_aveia,
            RunBuffId::Chantilly => &mut self.chantilly,
            RunBuffId::Termo => &mut self.termo,
            RunBuffId::Canela => &mut self.canela,
            RunBuffId::Descaf => &mut self.descaf,
        }
    }

    pub fn damage_mult(&self) -> f32 {
        1.0 + self.torrado as f32 * 0.2
    }

    pub fn speed_mult(&self) -> f32 {
        1.0 + self.descaf as f32 * 0.2
    }

    pub fn dash_speed(&self) -> f32 {
        PLAYER_DASH_SPEED * self.speed_mult()
    }

    /// Shoot cooldown after fire-rate stacks, never below the floor
    pub fn shoot_cooldown(&self) -> u32 {
        let rate = 1.0 + self.chantilly as f32 * 0.2;
        ((PLAYER_SHOOT_COOLDOWN as f32 / rate).round() as u32).max(PLAYER_MIN_SHOOT_COOLDOWN)
    }

    pub fn burn_chance(&self) -> f64 {
        (self.canela as f64 * BURN_CHANCE_PER_STACK).min(1.0)
    }

    pub fn has_room_shield(&self) -> bool {
        self.leite_aveia > 0
    }
}

/// `count` distinct buffs drawn uniformly without replacement
pub fn draw_rewards(count: usize, rng: &mut impl Rng) -> Vec<RunBuffId> {
    RUN_BUFF_POOL
        .choose_multiple(rng, count)
        .map(|b| b.id)
        .collect()
}

/// Apply a chosen reward and move on, the way touching a portal would.
///
/// Only a buff on offer during the reward phase is accepted; anything else
/// is logged and ignored. Returns whether the pick was applied.
pub fn apply_run_buff(state: &mut RunState, buff: RunBuffId) -> bool {
    if state.phase != Phase::Reward || !state.reward_choices.contains(&buff) {
        log::warn!(
            "Ignoring buff pick {} (phase {:?}, offered {:?})",
            buff.info().name,
            state.phase,
            state.reward_choices
        );
        return false;
    }

    *state.run_buffs.stacks_mut(buff) += 1;

    match buff {
        RunBuffId::Termo => {
            state.player.max_hp += TERMO_MAX_HP;
            state.player.heal(TERMO_MAX_HP);
        }
        RunBuffId::LeiteAveia => {
            state.player.shield = true;
        }
        _ => {}
    }

    log::info!(
        "Buff picked: {} (x{})",
        buff.info().name,
        state.run_buffs.stacks(buff)
    );

    state.reward_choices.clear();
    state.phase = Phase::Playing;
    advance_forward(state);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Upgrades;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashSet;

    fn reward_state(offered: &[RunBuffId]) -> RunState {
        let mut state = RunState::new(Upgrades::default(), 2);
        state.phase = Phase::Reward;
        state.reward_choices = offered.to_vec();
        state
    }

    #[test]
    fn test_pick_after_death_is_ignored() {
        let mut state = reward_state(&[RunBuffId::Termo]);
        state.phase = Phase::GameOver;
        state.player.hp = 0.0;
        assert!(!apply_run_buff(&mut state, RunBuffId::Termo));
        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.player.hp, 0.0);
        assert_eq!(state.run_buffs.termo, 0);
        assert!(state.transition.is_none());
    }

    #[test]
    fn test_unoffered_pick_is_ignored() {
        let mut state = reward_state(&[RunBuffId::Canela, RunBuffId::Descaf]);
        assert!(!apply_run_buff(&mut state, RunBuffId::Torrado));
        assert_eq!(state.phase, Phase::Reward);
        assert_eq!(state.run_buffs, RunBuffs::default());
        assert_eq!(state.reward_choices.len(), 2);
        assert!(state.transition.is_none());
    }

    #[test]
    fn test_draw_three_distinct() {
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..50 {
            let picks = draw_rewards(3, &mut rng);
            assert_eq!(picks.len(), 3);
            let unique: HashSet<_> = picks.iter().collect();
            assert_eq!(unique.len(), 3);
            assert!(picks.iter().all(|id| RUN_BUFF_POOL.iter().any(|b| b.id == *id)));
        }
    }

    #[test]
    fn test_draw_more_than_catalog() {
        let mut rng = Pcg32::seed_from_u64(5);
        for k in [6, 7, 100] {
            let picks = draw_rewards(k, &mut rng);
            assert_eq!(picks.len(), RUN_BUFF_POOL.len());
            let unique: HashSet<_> = picks.iter().collect();
            assert_eq!(unique.len(), RUN_BUFF_POOL.len());
        }
    }

    #[test]
    fn test_shoot_cooldown_has_floor() {
        let mut buffs = RunBuffs::default();
        assert_eq!(buffs.shoot_cooldown(), PLAYER_SHOOT_COOLDOWN);
        buffs.chantilly = 1;
        assert_eq!(buffs.shoot_cooldown(), 10);
        buffs.chantilly = 50;
        assert_eq!(buffs.shoot_cooldown(), PLAYER_MIN_SHOOT_COOLDOWN);
    }

    #[test]
    fn test_burn_chance_caps() {
        let buffs = RunBuffs { canela: 9, ..Default::default() };
        assert_eq!(buffs.burn_chance(), 1.0);
    }

    #[test]
    fn test_termo_raises_max_and_heals() {
        let mut state = reward_state(&[RunBuffId::Termo]);
        state.player.hp = 40.0;
        assert!(apply_run_buff(&mut state, RunBuffId::Termo));
        assert_eq!(state.run_buffs.termo, 1);
        assert_eq!(state.player.max_hp, 150.0);
        assert_eq!(state.player.hp, 90.0);
        assert_eq!(state.phase, Phase::Playing);
    }

    #[test]
    fn test_leite_arms_shield_and_queues_transition() {
        let mut state = reward_state(&[RunBuffId::LeiteAveia, RunBuffId::Canela]);
        state.current_room = state.rooms.len() - 1;
        assert!(apply_run_buff(&mut state, RunBuffId::LeiteAveia));
        assert!(state.player.shield);
        assert!(state.reward_choices.is_empty());
        let transition = state.transition.expect("next floor transition");
        assert_eq!((transition.floor, transition.room), (1, 0));
    }

    #[test]
    fn test_continuous_buffs_are_not_baked_in() {
        let mut state = reward_state(&[RunBuffId::Torrado]);
        let before = state.player.clone();
        assert!(apply_run_buff(&mut state, RunBuffId::Torrado));
        assert_eq!(state.player.max_hp, before.max_hp);
        assert!((state.run_buffs.damage_mult() - 1.2).abs() < 1e-6);
    }
}
