//! Fixed-step tick simulator (`spec.md` §4.4): phases P1-P4 run in order,
//! each seeing the effects of every earlier phase within the same tick.

pub mod bonuses;
pub mod bullets;
pub mod collision;
pub mod combat;
pub mod enemies;
pub mod players;
pub mod spawn;
pub mod weapons;

use crate::config::Config;
use crate::state::SessionState;

/// Runs one full tick. `dt` is the wall-clock delta since the previous
/// tick, already capped to `Config::max_dt` by the caller (`spec.md` §9,
/// "Time handling"); `now` is the injected clock's current reading.
pub fn tick(state: &mut SessionState, config: &Config, dt: f64, now: f64) {
    let mut rng = state.tick_rng();

    players::run(state, config, &mut rng, dt, now);
    enemies::run(state, config, &mut rng, dt, now);
    bullets::run(state, config, &mut rng, dt, now);
    bonuses::run(state, config, now);
}
