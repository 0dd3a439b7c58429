//! Player persistence.
//!
//! ## Versioning
//!
//! - `SAVE_VERSION`: current format. Bump it when fields are added.
//! - `MIN_COMPATIBLE_VERSION`: oldest format still readable. Only bump it
//!   when a field changes meaning or disappears.
//!
//! Saves at or above the minimum load with missing fields filled from
//! `PlayerState::default()`. Anything older, or anything that fails to
//! parse, is deleted and the player starts fresh.

use serde::{Deserialize, Serialize};

use super::error::SaveError;
use super::inventory::repair_slots;
use super::state::PlayerState;
use crate::console;

pub const SAVE_VERSION: u32 = 1;
pub const MIN_COMPATIBLE_VERSION: u32 = 1;

/// localStorage key.
pub const STORAGE_KEY: &str = "dragonRPG_player";

#[derive(Serialize, Deserialize)]
struct SaveData {
    version: u32,
    #[serde(default)]
    player: PlayerState,
}

pub fn encode(player: &PlayerState) -> Result<String, SaveError> {
    let data = SaveData { version: SAVE_VERSION, player: player.clone() };
    Ok(serde_json::to_string(&data)?)
}

/// Parse and re-validate a saved player.
pub fn decode(json: &str) -> Result<PlayerState, SaveError> {
    let data: SaveData = serde_json::from_str(json)?;
    if data.version < MIN_COMPATIBLE_VERSION {
        return Err(SaveError::TooOld { found: data.version, min: MIN_COMPATIBLE_VERSION });
    }
    if data.version < SAVE_VERSION {
        console::log(&format!("reading save v{} as v{}", data.version, SAVE_VERSION));
    }
    let mut player = data.player;
    sanitize(&mut player);
    Ok(player)
}

/// Bring hand-edited or stale data back inside the player invariants.
fn sanitize(player: &mut PlayerState) {
    player.tools.prune();
    player.level = player.level.max(1);
    if player.max_health == 0 {
        player.max_health = player.max_health_base.max(1);
    }
    player.health = player.health.min(player.max_health);
    for slot in repair_slots(player) {
        console::warn(&format!("cleared {:?} slot holding an unowned or mismatched tool", slot));
    }
    player.reset_transient();
}

// ── Stores ────────────────────────────────────────────────────

/// Where the player lives between sessions.
pub trait PlayerStore {
    /// Never fails: missing or unusable data yields a fresh player.
    fn load(&mut self) -> PlayerState;

    fn save(&mut self, player: &PlayerState) -> Result<(), SaveError>;
}

/// Shared load path for string-backed stores. Returns the player and
/// whether the stored value should be thrown away.
fn load_raw(raw: Option<&str>) -> (PlayerState, bool) {
    match raw.map(decode) {
        None => (PlayerState::default(), false),
        Some(Ok(player)) => (player, false),
        Some(Err(err)) => {
            console::warn(&format!("discarding save data: {err}"));
            (PlayerState::default(), true)
        }
    }
}

/// Forgets everything. Every load is a new player.
#[derive(Default)]
pub struct NullStore;

impl PlayerStore for NullStore {
    fn load(&mut self) -> PlayerState {
        PlayerState::default()
    }

    fn save(&mut self, _player: &PlayerState) -> Result<(), SaveError> {
        Ok(())
    }
}

/// Holds the serialized save in memory, same format as localStorage.
#[derive(Default)]
pub struct MemoryStore {
    pub raw: Option<String>,
}

impl MemoryStore {
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self { raw: Some(raw.into()) }
    }
}

impl PlayerStore for MemoryStore {
    fn load(&mut self) -> PlayerState {
        let (player, discard) = load_raw(self.raw.as_deref());
        if discard {
            self.raw = None;
        }
        player
    }

    fn save(&mut self, player: &PlayerState) -> Result<(), SaveError> {
        self.raw = Some(encode(player)?);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    fn storage() -> Result<web_sys::Storage, SaveError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(SaveError::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl PlayerStore for LocalStorageStore {
    fn load(&mut self) -> PlayerState {
        let storage = match Self::storage() {
            Ok(s) => s,
            Err(err) => {
                console::warn(&err.to_string());
                return PlayerState::default();
            }
        };
        let raw = storage.get_item(STORAGE_KEY).ok().flatten();
        let (player, discard) = load_raw(raw.as_deref());
        if discard {
            let _ = storage.remove_item(STORAGE_KEY);
        }
        player
    }

    fn save(&mut self, player: &PlayerState) -> Result<(), SaveError> {
        let json = encode(player)?;
        Self::storage()?
            .set_item(STORAGE_KEY, &json)
            .map_err(|e| SaveError::Storage(format!("{e:?}")))
    }
}
