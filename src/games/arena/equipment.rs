//! Combat stats derived from what the player has equipped.

use super::catalog::{tool_by_id, Tool};
use super::error::ArenaError;
use super::state::{EquipSlot, PlayerState};

/// Bare-handed attack power.
pub const FISTS_POWER: u32 = 5;

/// Resolve the tool in `slot`. `Ok(None)` means the slot is empty; an id
/// missing from the catalog is an error so the caller can warn and fall
/// back to baseline stats.
pub fn equipped(player: &PlayerState, slot: EquipSlot) -> Result<Option<&'static Tool>, ArenaError> {
    match player.slot(slot) {
        None => Ok(None),
        Some(id) => tool_by_id(id).map(Some),
    }
}

/// Power of the equipped weapon, before buffs. Weapons without power and
/// empty slots both hit like fists.
pub fn weapon_power(player: &PlayerState) -> Result<u32, ArenaError> {
    let power = match equipped(player, EquipSlot::Weapon)? {
        Some(tool) if tool.power > 0 => tool.power,
        _ => FISTS_POWER,
    };
    Ok(power)
}

/// Defense the equipped shield contributes to a guard, `Ok(None)` when no
/// shield is equipped.
pub fn shield_defense(player: &PlayerState) -> Result<Option<u32>, ArenaError> {
    Ok(equipped(player, EquipSlot::Shield)?.map(Tool::guard_defense))
}
