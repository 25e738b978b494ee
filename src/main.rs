//! Headless demo: plays seeded runs with the autopilot and banks the gold
//!
//! Usage: `brew-dungeon [seed] [runs] [config.json] [save_dir]`

#[cfg(not(target_arch = "wasm32"))]
use brew_dungeon::{
    RunConfig, autopilot,
    persistence::{DEFAULT_SLOT, FileStore, MemoryStore, SaveRecord, SaveStore},
    sim::{self, Phase, RunState},
    tuning::SHOP_ITEMS,
};

/// Give up on a run after this many ticks (20 minutes at 60 Hz)
#[cfg(not(target_arch = "wasm32"))]
const MAX_TICKS: u64 = 60 * 60 * 20;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Brew Dungeon (headless) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed: u64 = args.first().and_then(|s| s.parse().ok()).unwrap_or(0xC0FFEE);
    let runs: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(1);
    let config = match args.get(2) {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(json) => RunConfig::from_json_or_default(&json),
            Err(e) => {
                log::warn!("Can't read config {}: {}", path, e);
                RunConfig::default()
            }
        },
        None => RunConfig::default(),
    };
    let mut store: Box<dyn SaveStore> = match args.get(3) {
        Some(dir) => Box::new(FileStore::new(dir)),
        None => Box::new(MemoryStore::new()),
    };

    let mut record = store.load_or_default(DEFAULT_SLOT);
    for run in 0..runs {
        spend_gold(&mut record);
        let state = play(record.upgrades, config.clone(), seed.wrapping_add(run));
        record.fold_run(&state);
        if let Err(e) = store.save(DEFAULT_SLOT, &record) {
            log::error!("Failed to save progress: {}", e);
        }
    }

    log::info!(
        "Done: {} runs, {} victories, {} gold banked, upgrades {:?}",
        record.runs_played,
        record.victories,
        record.gold,
        record.upgrades
    );
}

/// Buy the cheapest affordable upgrades until the bank runs dry
#[cfg(not(target_arch = "wasm32"))]
fn spend_gold(record: &mut SaveRecord) {
    loop {
        let cheapest = SHOP_ITEMS
            .iter()
            .filter(|item| record.next_cost(item.kind).is_some_and(|cost| cost <= record.gold))
            .min_by_key(|item| item.cost);
        let Some(item) = cheapest else {
            break;
        };
        if let Err(e) = record.buy_upgrade(item.kind) {
            log::warn!("Shop refused {}: {}", item.name, e);
            break;
        }
    }
}

/// Play one run to completion (or the tick cap)
#[cfg(not(target_arch = "wasm32"))]
fn play(upgrades: sim::Upgrades, config: RunConfig, seed: u64) -> RunState {
    let mut state = RunState::with_config(upgrades, config, seed);

    while state.run_timer < MAX_TICKS {
        match state.phase {
            Phase::Playing => {
                let input = autopilot::drive(&state);
                sim::update(&mut state, &input);
            }
            Phase::Reward => {
                let Some(&pick) = state.reward_choices.first() else {
                    log::error!("Reward phase without choices");
                    break;
                };
                sim::apply_run_buff(&mut state, pick);
            }
            Phase::Lobby | Phase::GameOver | Phase::Victory => break,
        }
    }

    let best = state.room_times.iter().map(|t| t.ticks).min().unwrap_or(0);
    log::info!(
        "Run {:?}: floor {}/{}, {}/{} rooms, {} gold, {} ticks (fastest room {} ticks)",
        state.phase,
        state.floor + 1,
        state.config.total_floors,
        state.rooms_cleared,
        state.total_rooms(),
        state.gold_collected,
        state.run_timer,
        best
    );
    state
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm shell drives the library directly
}
