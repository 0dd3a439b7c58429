//! Equip, unequip and consume. Every operation validates first and leaves
//! the player untouched on error.

use super::catalog::{tool_by_id, Tool, ToolKind};
use super::error::ArenaError;
use super::state::{EquipSlot, PlayerState};

/// Put an owned tool of the matching kind into `slot`.
pub fn equip(player: &mut PlayerState, slot: EquipSlot, tool_id: &str) -> Result<&'static Tool, ArenaError> {
    let invalid = || ArenaError::InvalidEquip { slot, tool_id: tool_id.to_string() };
    if !player.tools.contains(tool_id) {
        return Err(invalid());
    }
    let tool = tool_by_id(tool_id)?;
    if tool.kind != slot.accepts() {
        return Err(invalid());
    }
    *player.slot_mut(slot) = Some(tool.id.to_string());
    Ok(tool)
}

/// Empty `slot`, returning what was in it. Emptying an empty slot is a no-op.
pub fn unequip(player: &mut PlayerState, slot: EquipSlot) -> Option<String> {
    player.slot_mut(slot).take()
}

/// Remove one copy of `tool_id`. Losing the last copy also empties any
/// slot holding it.
pub fn consume(player: &mut PlayerState, tool_id: &str) -> Result<(), ArenaError> {
    if !player.tools.remove_one(tool_id) {
        return Err(ArenaError::NotOwned(tool_id.to_string()));
    }
    if !player.tools.contains(tool_id) {
        for slot in [EquipSlot::Weapon, EquipSlot::Shield, EquipSlot::Armor] {
            if player.slot(slot) == Some(tool_id) {
                unequip(player, slot);
            }
        }
    }
    Ok(())
}

/// Owned potions in inventory order.
pub fn usable_potions(player: &PlayerState) -> Vec<(&'static Tool, u32)> {
    player
        .tools
        .iter()
        .filter_map(|(id, n)| tool_by_id(id).ok().map(|t| (t, n)))
        .filter(|(t, _)| t.kind == ToolKind::Potion)
        .collect()
}

/// What drinking a potion actually changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PotionUse {
    pub tool: &'static Tool,
    pub healed: u32,
}

/// Drink one potion: `Some(id)` for a specific one, `None` for the first
/// owned. Fails with `EmptyInventory` when nothing drinkable matches.
pub fn use_potion(player: &mut PlayerState, tool_id: Option<&str>) -> Result<PotionUse, ArenaError> {
    let tool = match tool_id {
        Some(id) => match tool_by_id(id) {
            Ok(t) if t.kind == ToolKind::Potion && player.tools.contains(id) => t,
            Ok(_) => return Err(ArenaError::EmptyInventory),
            Err(e) => return Err(e),
        },
        None => match usable_potions(player).first() {
            Some((t, _)) => *t,
            None => return Err(ArenaError::EmptyInventory),
        },
    };

    consume(player, tool.id)?;

    let before = player.health;
    player.heal(tool.effect.heal);
    player.buff_power = player.buff_power.saturating_add(tool.effect.power);
    player.agility = player.agility.saturating_add(tool.effect.agility);
    player.buff_defense = player.buff_defense.saturating_add(tool.effect.defense);

    Ok(PotionUse { tool, healed: player.health - before })
}

/// Clear slots that point at tools the player no longer owns or that no
/// longer fit the slot. Returns the slots that were cleared.
pub fn repair_slots(player: &mut PlayerState) -> Vec<EquipSlot> {
    let mut cleared = Vec::new();
    for slot in [EquipSlot::Weapon, EquipSlot::Shield, EquipSlot::Armor] {
        let valid = match player.slot(slot) {
            None => continue,
            Some(id) => {
                player.tools.contains(id)
                    && tool_by_id(id).map(|t| t.kind == slot.accepts()).unwrap_or(false)
            }
        };
        if !valid {
            unequip(player, slot);
            cleared.push(slot);
        }
    }
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::arena::state::Inventory;

    fn player_with(items: &[(&str, u32)]) -> PlayerState {
        let mut p = PlayerState::new();
        for (id, n) in items {
            p.tools.add(id, *n);
        }
        p
    }

    #[test]
    fn equip_owned_weapon() {
        let mut p = player_with(&[("dagger", 1)]);
        let tool = equip(&mut p, EquipSlot::Weapon, "dagger").unwrap();
        assert_eq!(tool.power, 8);
        assert_eq!(p.equipped_weapon.as_deref(), Some("dagger"));
    }

    #[test]
    fn equip_unowned_rejected() {
        let mut p = PlayerState::new();
        let before = p.clone();
        let err = equip(&mut p, EquipSlot::Weapon, "dagger").unwrap_err();
        assert!(matches!(err, ArenaError::InvalidEquip { .. }));
        assert_eq!(p, before);
    }

    #[test]
    fn equip_wrong_slot_rejected() {
        let mut p = player_with(&[("light_shield", 1)]);
        let before = p.clone();
        assert!(equip(&mut p, EquipSlot::Weapon, "light_shield").is_err());
        assert!(equip(&mut p, EquipSlot::Armor, "light_shield").is_err());
        assert_eq!(p, before);
        assert!(equip(&mut p, EquipSlot::Shield, "light_shield").is_ok());
    }

    #[test]
    fn potions_cannot_be_equipped() {
        let mut p = player_with(&[("health_potion", 1)]);
        for slot in [EquipSlot::Weapon, EquipSlot::Shield, EquipSlot::Armor] {
            assert!(equip(&mut p, slot, "health_potion").is_err());
        }
    }

    #[test]
    fn unequip_empty_slot_twice_is_noop() {
        let mut p = PlayerState::new();
        let before = p.clone();
        assert_eq!(unequip(&mut p, EquipSlot::Shield), None);
        assert_eq!(unequip(&mut p, EquipSlot::Shield), None);
        assert_eq!(p, before);
    }

    #[test]
    fn consuming_last_copy_clears_slot() {
        let mut p = player_with(&[("dagger", 2)]);
        equip(&mut p, EquipSlot::Weapon, "dagger").unwrap();
        consume(&mut p, "dagger").unwrap();
        assert_eq!(p.equipped_weapon.as_deref(), Some("dagger"));
        consume(&mut p, "dagger").unwrap();
        assert_eq!(p.equipped_weapon, None);
        assert_eq!(consume(&mut p, "dagger"), Err(ArenaError::NotOwned("dagger".into())));
    }

    #[test]
    fn health_potion_clamps_and_removes_one() {
        let mut p = player_with(&[("health_potion", 2)]);
        p.health = p.max_health - 10;
        let used = use_potion(&mut p, Some("health_potion")).unwrap();
        assert_eq!(p.health, p.max_health);
        assert_eq!(used.healed, 10);
        assert_eq!(p.tools.count("health_potion"), 1);
    }

    #[test]
    fn power_and_agility_potions() {
        let mut p = player_with(&[("power_potion", 1), ("agility_potion", 1)]);
        use_potion(&mut p, Some("power_potion")).unwrap();
        use_potion(&mut p, Some("agility_potion")).unwrap();
        assert_eq!(p.buff_power, 10);
        assert_eq!(p.agility, 10);
        assert_eq!(p.tools, Inventory::new());
    }

    #[test]
    fn defense_potion_sets_one_shot_absorb() {
        let mut p = player_with(&[("defense_potion", 1)]);
        use_potion(&mut p, None).unwrap();
        assert_eq!(p.buff_defense, 10);
    }

    #[test]
    fn first_potion_in_id_order() {
        let mut p = player_with(&[("power_potion", 1), ("agility_potion", 1)]);
        let used = use_potion(&mut p, None).unwrap();
        assert_eq!(used.tool.id, "agility_potion");
    }

    #[test]
    fn no_potion_is_empty_inventory() {
        let mut p = player_with(&[("dagger", 1)]);
        let before = p.clone();
        assert_eq!(use_potion(&mut p, None).unwrap_err(), ArenaError::EmptyInventory);
        assert_eq!(use_potion(&mut p, Some("dagger")).unwrap_err(), ArenaError::EmptyInventory);
        assert_eq!(use_potion(&mut p, Some("health_potion")).unwrap_err(), ArenaError::EmptyInventory);
        assert_eq!(p, before);
    }

    #[test]
    fn repair_clears_stale_slots() {
        let mut p = player_with(&[("light_shield", 1)]);
        p.equipped_weapon = Some("dagger".into());
        p.equipped_shield = Some("light_shield".into());
        p.equipped_armor = Some("light_shield".into());
        let cleared = repair_slots(&mut p);
        assert_eq!(cleared, vec![EquipSlot::Weapon, EquipSlot::Armor]);
        assert_eq!(p.equipped_shield.as_deref(), Some("light_shield"));
    }
}
