//! Static game data: tools, monsters and where they live.
//!
//! Everything here is read-only. Tools are keyed by string id because the
//! persisted inventory stores ids, not enum discriminants.

use rand::Rng;

use super::error::ArenaError;
use super::state::Coins;

// ── Tools ─────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolKind {
    Offense,
    Defense,
    Armor,
    Potion,
}

impl ToolKind {
    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Offense => "Weapons",
            ToolKind::Defense => "Shields",
            ToolKind::Armor => "Armor",
            ToolKind::Potion => "Potions",
        }
    }
}

/// Stat changes applied when a tool is used (potions) or worn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ToolEffect {
    pub heal: u32,
    pub power: u32,
    pub agility: u32,
    pub defense: u32,
}

const NO_EFFECT: ToolEffect = ToolEffect { heal: 0, power: 0, agility: 0, defense: 0 };

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tool {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: ToolKind,
    pub power: u32,
    pub defense: u32,
    pub effect: ToolEffect,
    pub consumable: bool,
    pub cost: Coins,
}

impl Tool {
    /// Defense this tool contributes when guarding. Shields carry it
    /// directly; worn items may carry it as an effect instead.
    pub fn guard_defense(&self) -> u32 {
        self.defense.max(self.effect.defense)
    }
}

const fn weapon(id: &'static str, name: &'static str, power: u32, cost: Coins) -> Tool {
    Tool { id, name, kind: ToolKind::Offense, power, defense: 0, effect: NO_EFFECT, consumable: false, cost }
}

const fn shield(id: &'static str, name: &'static str, defense: u32, cost: Coins) -> Tool {
    Tool { id, name, kind: ToolKind::Defense, power: 0, defense, effect: NO_EFFECT, consumable: false, cost }
}

const fn armor(id: &'static str, name: &'static str, defense: u32, effect: ToolEffect, cost: Coins) -> Tool {
    Tool { id, name, kind: ToolKind::Armor, power: 0, defense, effect, consumable: false, cost }
}

const fn potion(id: &'static str, name: &'static str, effect: ToolEffect, cost: Coins) -> Tool {
    Tool { id, name, kind: ToolKind::Potion, power: 0, defense: 0, effect, consumable: true, cost }
}

const fn fx(heal: u32, power: u32, agility: u32, defense: u32) -> ToolEffect {
    ToolEffect { heal, power, agility, defense }
}

const fn coins(gold: u32, silver: u32, bronze: u32) -> Coins {
    Coins { gold, silver, bronze }
}

pub const TOOLS: &[Tool] = &[
    weapon("dagger", "Dagger", 8, coins(0, 10, 0)),
    weapon("short_sword", "Short Sword", 12, coins(0, 15, 0)),
    weapon("longsword", "Longsword", 20, coins(1, 0, 0)),
    weapon("war_axe", "War Axe", 30, coins(2, 0, 0)),
    weapon("battle_hammer", "Battle Hammer", 35, coins(3, 0, 0)),
    weapon("spear", "Spear", 18, coins(0, 20, 0)),
    weapon("nunchucks", "Nunchucks", 20, coins(0, 15, 0)),
    weapon("short_bow", "Short Bow", 15, coins(0, 25, 0)),
    weapon("long_bow", "Long Bow", 25, coins(1, 5, 0)),
    weapon("crossbow", "Crossbow", 30, coins(2, 0, 0)),
    Tool {
        id: "ring_of_power",
        name: "Ring of Power",
        kind: ToolKind::Offense,
        power: 5,
        defense: 0,
        effect: fx(0, 5, 0, 0),
        consumable: false,
        cost: coins(1, 0, 0),
    },
    shield("light_shield", "Light Shield", 10, coins(0, 25, 0)),
    shield("heavy_shield", "Heavy Shield", 20, coins(1, 10, 0)),
    shield("magic_shield", "Magic Shield", 30, coins(2, 0, 0)),
    armor("leather_armor", "Leather Armor", 15, NO_EFFECT, coins(0, 20, 0)),
    armor("chain_mail", "Chain Mail", 25, NO_EFFECT, coins(1, 0, 0)),
    armor("plate_armor", "Plate Armor", 35, NO_EFFECT, coins(2, 0, 0)),
    armor("boots_of_speed", "Boots of Speed", 0, fx(0, 0, 5, 0), coins(0, 0, 50)),
    armor("cloak_of_resistance", "Cloak of Resistance", 0, fx(0, 0, 0, 5), coins(0, 0, 75)),
    potion("health_potion", "Health Potion", fx(50, 0, 0, 0), coins(0, 10, 0)),
    potion("health_elixir", "Health Elixir", fx(100, 0, 0, 0), coins(1, 0, 0)),
    potion("power_potion", "Power Potion", fx(0, 10, 0, 0), coins(0, 20, 0)),
    potion("elixir_of_strength", "Elixir of Strength", fx(0, 20, 0, 0), coins(1, 5, 0)),
    potion("agility_potion", "Agility Potion", fx(0, 0, 5, 0), coins(0, 15, 5)),
    potion("elixir_of_swiftness", "Elixir of Swiftness", fx(0, 0, 10, 0), coins(0, 30, 0)),
    potion("defense_potion", "Defense Potion", fx(0, 0, 0, 10), coins(0, 15, 0)),
    potion("elixir_of_fortitude", "Elixir of Fortitude", fx(0, 0, 0, 20), coins(1, 0, 0)),
];

pub fn all_tools() -> &'static [Tool] {
    TOOLS
}

/// Find a tool by id. Misses are reported so callers can fall back to
/// baseline stats.
pub fn tool_by_id(id: &str) -> Result<&'static Tool, ArenaError> {
    TOOLS
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| ArenaError::UnknownTool(id.to_string()))
}

// ── Monsters ──────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Location {
    Forest,
    Mountain,
    Cave,
    Swamp,
    Ruins,
    Lair,
}

impl Location {
    pub fn name(self) -> &'static str {
        match self {
            Location::Forest => "Forest",
            Location::Mountain => "Mountain",
            Location::Cave => "Cave",
            Location::Swamp => "Swamp",
            Location::Ruins => "Ruins",
            Location::Lair => "Dragon's Lair",
        }
    }
}

pub const ALL_LOCATIONS: &[Location] = &[
    Location::Forest,
    Location::Mountain,
    Location::Cave,
    Location::Swamp,
    Location::Ruins,
    Location::Lair,
];

/// The input that cancels a telegraphed monster attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterKey {
    D,
    S,
    Up,
    Left,
    Right,
}

impl CounterKey {
    pub fn label(self) -> &'static str {
        match self {
            CounterKey::D => "D",
            CounterKey::S => "S",
            CounterKey::Up => "↑",
            CounterKey::Left => "←",
            CounterKey::Right => "→",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MonsterAttack {
    pub name: &'static str,
    pub counter: CounterKey,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MonsterTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub power: u32,
    pub agility: u32,
    pub location: Location,
    pub xp_reward: u32,
    pub coin_reward: Coins,
    pub attacks: &'static [MonsterAttack],
}

const fn attack(name: &'static str, counter: CounterKey) -> MonsterAttack {
    MonsterAttack { name, counter }
}

pub const MONSTERS: &[MonsterTemplate] = &[
    MonsterTemplate {
        id: "goblin",
        name: "Goblin",
        power: 10,
        agility: 8,
        location: Location::Forest,
        xp_reward: 20,
        coin_reward: coins(0, 5, 10),
        attacks: &[
            attack("Slash", CounterKey::D),
            attack("Dagger Stab", CounterKey::S),
            attack("Headbutt", CounterKey::Up),
            attack("Pounce", CounterKey::Left),
            attack("Tail Whip", CounterKey::Right),
        ],
    },
    MonsterTemplate {
        id: "wolf",
        name: "Wolf",
        power: 15,
        agility: 12,
        location: Location::Mountain,
        xp_reward: 30,
        coin_reward: coins(0, 10, 0),
        attacks: &[
            attack("Bite", CounterKey::D),
            attack("Claw Swipe", CounterKey::S),
            attack("Howl", CounterKey::Up),
            attack("Pounce", CounterKey::Left),
            attack("Feral Bite", CounterKey::Right),
        ],
    },
    MonsterTemplate {
        id: "cave_troll",
        name: "Cave Troll",
        power: 25,
        agility: 4,
        location: Location::Cave,
        xp_reward: 50,
        coin_reward: coins(0, 15, 5),
        attacks: &[
            attack("Club Smash", CounterKey::D),
            attack("Crushing Blow", CounterKey::S),
            attack("Rock Throw", CounterKey::Up),
            attack("Stomp", CounterKey::Left),
            attack("Roar", CounterKey::Right),
        ],
    },
    MonsterTemplate {
        id: "wyvern",
        name: "Wyvern",
        power: 40,
        agility: 20,
        location: Location::Mountain,
        xp_reward: 80,
        coin_reward: coins(1, 0, 0),
        attacks: &[
            attack("Fire Breath", CounterKey::D),
            attack("Tail Swipe", CounterKey::S),
            attack("Wing Buffet", CounterKey::Up),
            attack("Dive Attack", CounterKey::Left),
            attack("Venom Spit", CounterKey::Right),
        ],
    },
    MonsterTemplate {
        id: "owlbear",
        name: "Owlbear",
        power: 30,
        agility: 10,
        location: Location::Forest,
        xp_reward: 60,
        coin_reward: coins(0, 20, 0),
        attacks: &[
            attack("Rending Claw", CounterKey::D),
            attack("Beak Peck", CounterKey::S),
            attack("Bear Hug", CounterKey::Up),
            attack("Roar", CounterKey::Left),
            attack("Charge", CounterKey::Right),
        ],
    },
    MonsterTemplate {
        id: "swamp_ghoul",
        name: "Swamp Ghoul",
        power: 20,
        agility: 6,
        location: Location::Swamp,
        xp_reward: 45,
        coin_reward: coins(0, 10, 5),
        attacks: &[
            attack("Claw Slash", CounterKey::D),
            attack("Ghastly Wail", CounterKey::S),
            attack("Necrotic Touch", CounterKey::Up),
            attack("Swamp Grab", CounterKey::Left),
            attack("Acid Spit", CounterKey::Right),
        ],
    },
    MonsterTemplate {
        id: "centaur",
        name: "Centaur",
        power: 35,
        agility: 15,
        location: Location::Ruins,
        xp_reward: 100,
        coin_reward: coins(2, 0, 0),
        attacks: &[
            attack("Spear Thrust", CounterKey::D),
            attack("Hoof Stomp", CounterKey::S),
            attack("Arc Strike", CounterKey::Up),
            attack("Arrow Shot", CounterKey::Left),
            attack("Charge", CounterKey::Right),
        ],
    },
    MonsterTemplate {
        id: "dragon",
        name: "Dragon",
        power: 500,
        agility: 50,
        location: Location::Lair,
        xp_reward: 500,
        coin_reward: coins(100_000, 0, 0),
        attacks: &[
            attack("Inferno Breath", CounterKey::D),
            attack("Claw Swipe", CounterKey::S),
            attack("Wing Buffet", CounterKey::Up),
            attack("Tail Smash", CounterKey::Left),
            attack("Roaring Crush", CounterKey::Right),
        ],
    },
];

pub fn all_monsters() -> &'static [MonsterTemplate] {
    MONSTERS
}

pub fn monster_by_id(id: &str) -> Option<&'static MonsterTemplate> {
    MONSTERS.iter().find(|m| m.id == id)
}

pub fn monsters_at(location: Location) -> Vec<&'static MonsterTemplate> {
    MONSTERS.iter().filter(|m| m.location == location).collect()
}

/// Pick a monster living at `location`, uniformly.
pub fn random_monster_at<R: Rng + ?Sized>(
    rng: &mut R,
    location: Location,
) -> Option<&'static MonsterTemplate> {
    let here = monsters_at(location);
    if here.is_empty() {
        return None;
    }
    Some(here[rng.gen_range(0..here.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn requires_eq<T: Eq>(a: &T, b: &T) -> bool {
        a == b
    }

    #[test]
    fn tools_have_full_equality() {
        let dagger = tool_by_id("dagger").unwrap();
        assert!(requires_eq(&dagger, &tool_by_id("dagger").unwrap()));
        assert!(!requires_eq(dagger, tool_by_id("health_potion").unwrap()));
    }

    #[test]
    fn tool_ids_are_unique() {
        for (i, a) in TOOLS.iter().enumerate() {
            for b in &TOOLS[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn lookup_known_tool() {
        let tool = tool_by_id("light_shield").unwrap();
        assert_eq!(tool.kind, ToolKind::Defense);
        assert_eq!(tool.guard_defense(), 10);
    }

    #[test]
    fn lookup_unknown_tool_is_error() {
        assert_eq!(
            tool_by_id("excalibur"),
            Err(ArenaError::UnknownTool("excalibur".into()))
        );
        assert!(tool_by_id("").is_err());
    }

    #[test]
    fn only_potions_are_consumable() {
        for tool in all_tools() {
            assert_eq!(tool.consumable, tool.kind == ToolKind::Potion, "{}", tool.id);
        }
    }

    #[test]
    fn cloak_guards_through_its_effect() {
        assert_eq!(tool_by_id("cloak_of_resistance").unwrap().guard_defense(), 5);
    }

    #[test]
    fn every_monster_has_attacks() {
        for m in all_monsters() {
            assert!(!m.attacks.is_empty(), "{}", m.id);
            assert!(m.power > 0);
        }
    }

    #[test]
    fn monsters_grouped_by_location() {
        let forest: Vec<&str> = monsters_at(Location::Forest).iter().map(|m| m.id).collect();
        assert_eq!(forest, vec!["goblin", "owlbear"]);
        assert_eq!(monsters_at(Location::Lair).len(), 1);
    }

    #[test]
    fn random_monster_stays_in_location() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let m = random_monster_at(&mut rng, Location::Mountain).unwrap();
            assert_eq!(m.location, Location::Mountain);
        }
    }

    #[test]
    fn monster_by_id_lookup() {
        assert_eq!(monster_by_id("wyvern").map(|m| m.power), Some(40));
        assert!(monster_by_id("kraken").is_none());
    }
}
