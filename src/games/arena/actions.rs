//! Click action ids for the arena screens.

// ── Town ─────────────────────────────────────────────────────
pub const FIGHT_BASE: u16 = 10; // + monster index at the current location
pub const LOCATION_TAB_BASE: u16 = 20; // + index into ALL_LOCATIONS
pub const OPEN_STORE: u16 = 30;
pub const OPEN_GEAR: u16 = 31;
pub const TOGGLE_COUNTER_MODE: u16 = 32;
pub const BACK: u16 = 33;
pub const RANDOM_FIGHT: u16 = 34;

// ── Store ────────────────────────────────────────────────────
pub const STORE_BUY_TAB: u16 = 40;
pub const STORE_SELL_TAB: u16 = 41;
pub const SELL_ALL: u16 = 42;
pub const KIND_TAB_BASE: u16 = 44; // + ToolKind index, 4 kinds
pub const BUY_BASE: u16 = 100; // + index within the selected kind
pub const SELL_BASE: u16 = 150; // + index into the owned list

// ── Gear ─────────────────────────────────────────────────────
pub const GEAR_BASE: u16 = 200; // + index into the owned gear list

// ── Battle ───────────────────────────────────────────────────
pub const ACT_ATTACK: u16 = 50;
pub const ACT_GUARD: u16 = 51;
pub const ACT_ITEMS: u16 = 52;
pub const ACT_TALK: u16 = 53;
pub const ACT_ESCAPE: u16 = 54;
pub const ACT_PASS: u16 = 55;
pub const ACT_GEAR: u16 = 56;
pub const ACT_LEAVE: u16 = 57;
pub const ITEM_BASE: u16 = 250; // + index into the usable potion list

pub const COUNTER_D: u16 = 60;
pub const COUNTER_S: u16 = 61;
pub const COUNTER_UP: u16 = 62;
pub const COUNTER_LEFT: u16 = 63;
pub const COUNTER_RIGHT: u16 = 64;

pub const CONTINUE: u16 = 70;
