//! Stamps for app update signals.
//!
//! Apps see updates in stamp order, so two launches delivered within one millisecond must still
//! receive distinct, ascending stamps.

use std::cell::Cell;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

thread_local! {
    static LAST_UPDATE_STAMP_MS: Cell<u64> = const { Cell::new(0) };
}

fn wall_clock_ms() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now().max(0.0) as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}

// Wall clock when it moved forward, otherwise one past the previous stamp.
fn stamp_after(previous: u64, wall_clock: u64) -> u64 {
    wall_clock.max(previous.saturating_add(1))
}

/// Returns the unix-millisecond stamp for the next update signal on this thread.
pub fn next_update_stamp_ms() -> u64 {
    let wall_clock = wall_clock_ms();
    LAST_UPDATE_STAMP_MS.with(|last| {
        let stamp = stamp_after(last.get(), wall_clock);
        last.set(stamp);
        stamp
    })
}
