//! Clock and timers.
//!
//! The browser calls `draw_web()` at whatever rate it likes. `GameTime`
//! turns those frame timestamps into whole 100 ms ticks so the battle
//! pacing is deterministic, and `Countdown` is the single cancelable timer
//! the encounter uses for its suspension points.

/// Logic rate of the arena.
pub const TICKS_PER_SEC: u32 = 10;

/// Longest frame gap that still counts in full. A backgrounded tab would
/// otherwise dump seconds of ticks into one frame.
const MAX_FRAME_MS: f64 = 500.0;

// ── Frame Clock ───────────────────────────────────────────────

pub struct GameTime {
    ms_per_tick: f64,
    /// Milliseconds seen but not yet turned into ticks.
    carry_ms: f64,
    pub total_ticks: u64,
    last_frame_ms: Option<f64>,
}

impl GameTime {
    pub fn new(ticks_per_sec: u32) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec.max(1) as f64,
            carry_ms: 0.0,
            total_ticks: 0,
            last_frame_ms: None,
        }
    }

    /// Feed a frame timestamp (`performance.now()`), get back how many ticks
    /// elapsed since the previous frame. The first frame yields zero.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = self
            .last_frame_ms
            .map(|prev| (now_ms - prev).clamp(0.0, MAX_FRAME_MS))
            .unwrap_or(0.0);
        self.last_frame_ms = Some(now_ms);

        self.carry_ms += delta;
        let ticks = (self.carry_ms / self.ms_per_tick) as u32;
        self.carry_ms -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        ticks
    }
}

// ── Countdown ─────────────────────────────────────────────────

/// A one-shot timer measured in ticks.
///
/// `advance` reports expiry exactly once; after that, or after `cancel`,
/// the countdown is inert. Owners hold it by value, so dropping the owner
/// drops the timer with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    armed: bool,
}

impl Countdown {
    pub fn start(ticks: u32) -> Self {
        Self { remaining: ticks, armed: true }
    }

    /// A countdown that never fires.
    pub fn idle() -> Self {
        Self { remaining: 0, armed: false }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn remaining(&self) -> u32 {
        if self.armed { self.remaining } else { 0 }
    }

    /// Disarm. Returns true only the first time it stops a live timer.
    pub fn cancel(&mut self) -> bool {
        std::mem::replace(&mut self.armed, false)
    }

    /// Move time forward. Returns true on the call that runs it out.
    pub fn advance(&mut self, ticks: u32) -> bool {
        if !self.armed {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(ticks);
        if self.remaining == 0 {
            self.armed = false;
            return true;
        }
        false
    }
}
