//! Diagnostics coalescer (§4.F): a periodic timer that posts `TimerTick` to
//! the state actor. Coalescing itself is structural — `pendingDiagnostics` is
//! a set keyed by URI, not a queue — so this module is only the ticking.

use std::time::Duration;

use tokio::time::{interval_at, Instant};

use crate::state::{StateEvent, StateHandle};

const FIRST_TICK_DELAY: Duration = Duration::from_secs(1);
const TICK_PERIOD: Duration = Duration::from_millis(250);

/// Spawns the background tick loop. Intended to be called once, from
/// `initialize` (§4.G), after the solution has been loaded.
pub fn spawn(state: StateHandle) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + FIRST_TICK_DELAY, TICK_PERIOD);
        loop {
            ticker.tick().await;
            state.post(StateEvent::TimerTick);
        }
    })
}
