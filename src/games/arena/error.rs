//! Failure taxonomy for the arena.
//!
//! Nothing here is fatal: the turn engine turns every variant into a log
//! line or a no-op and the encounter carries on.

use thiserror::Error;

use super::state::{BattlePhase, EquipSlot};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArenaError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("{action} is not allowed during {phase:?}")]
    IllegalAction {
        action: &'static str,
        phase: BattlePhase,
    },

    #[error("no usable item")]
    EmptyInventory,

    #[error("cannot put '{tool_id}' in the {slot:?} slot")]
    InvalidEquip { slot: EquipSlot, tool_id: String },

    #[error("'{0}' is not in the inventory")]
    NotOwned(String),

    #[error("not enough coins for {0}")]
    CannotAfford(String),

    #[error("'{0}' is already owned")]
    AlreadyOwned(String),

    #[error("an encounter is already in progress")]
    EncounterInProgress,

    #[error("no encounter in progress")]
    NoEncounter,
}

/// Errors from the persistence adapter.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage unavailable")]
    StorageUnavailable,

    #[error("storage rejected the write: {0}")]
    Storage(String),

    #[error("save version {found} is older than the oldest supported ({min})")]
    TooOld { found: u32, min: u32 },
}
