//! The per-timeline tick routine.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::data::TimelineTable;
use crate::host::{dispatch, EntityHost};
use crate::scoreboard::{Objective, TimelineState};

/// What one call to [`tick`] did.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Timer value the rules were matched against.
    pub timer: i32,
    /// Number of actions dispatched.
    pub fired: usize,
    /// Whether the loop reset fired (`timer >= max_offset`).
    pub reset: bool,
}

/// Advance one timeline by one tick.
///
/// 1. dispatch every action registered at the current `timer`, in registration order;
/// 2. if `timer >= max_offset`, zero `flags` and set `timer` to `-1`;
/// 3. add 1 to `timer`.
///
/// The `>=` guard also catches counters that were skipped or fast-forwarded past
/// the end, so any out-of-range value self-corrects on the next call.
pub fn tick(
    table: &TimelineTable,
    state: &mut TimelineState,
    host: &mut dyn EntityHost,
) -> TickReport {
    let timer = state.timer;
    let actions = table.actions_at(timer);
    for action in actions {
        trace!("{} @{}: {:?}", table.name(), timer, action);
        dispatch(host, action);
    }

    // max_offset <= i32::MAX is enforced when the table is built.
    let reset = i64::from(timer) >= i64::from(table.max_offset());
    if reset {
        debug!(
            "{}: timer {} reached end (max offset {}), looping",
            table.name(),
            timer,
            table.max_offset()
        );
        state.flags = 0;
        host.score_written(table.name(), Objective::Flags, 0);
        state.timer = -1;
        host.score_written(table.name(), Objective::Timer, -1);
    }

    let advanced = state.add(Objective::Timer, 1);
    host.score_written(table.name(), Objective::Timer, advanced);

    TickReport {
        timer,
        fired: actions.len(),
        reset,
    }
}
