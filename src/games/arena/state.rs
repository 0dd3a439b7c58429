//! Arena state: player, monster instance, phases and results. No logic
//! beyond small accessors and clamping helpers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::{CounterKey, MonsterTemplate, ToolKind};

// ── Currency ──────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Coins {
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
}

impl Coins {
    pub const ZERO: Coins = Coins { gold: 0, silver: 0, bronze: 0 };

    pub fn new(gold: u32, silver: u32, bronze: u32) -> Self {
        Self { gold, silver, bronze }
    }

    /// Each denomination is compared on its own; there is no change-making.
    pub fn can_afford(&self, cost: &Coins) -> bool {
        self.gold >= cost.gold && self.silver >= cost.silver && self.bronze >= cost.bronze
    }

    /// Subtract `cost`, or leave `self` untouched and return false.
    pub fn try_spend(&mut self, cost: &Coins) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.gold -= cost.gold;
        self.silver -= cost.silver;
        self.bronze -= cost.bronze;
        true
    }

    pub fn add(&mut self, other: &Coins) {
        self.gold = self.gold.saturating_add(other.gold);
        self.silver = self.silver.saturating_add(other.silver);
        self.bronze = self.bronze.saturating_add(other.bronze);
    }

    pub fn times(&self, qty: u32) -> Coins {
        Coins {
            gold: self.gold.saturating_mul(qty),
            silver: self.silver.saturating_mul(qty),
            bronze: self.bronze.saturating_mul(qty),
        }
    }

    pub fn half(&self) -> Coins {
        Coins { gold: self.gold / 2, silver: self.silver / 2, bronze: self.bronze / 2 }
    }
}

impl std::fmt::Display for Coins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}g {}s {}b", self.gold, self.silver, self.bronze)
    }
}

// ── Inventory ─────────────────────────────────────────────────

/// Owned tools as `id -> count`. Iteration is ordered by id, which is
/// what "first matching" means everywhere in the arena.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory(BTreeMap<String, u32>);

impl Inventory {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn count(&self, id: &str) -> u32 {
        self.0.get(id).copied().unwrap_or(0)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.count(id) > 0
    }

    pub fn add(&mut self, id: &str, qty: u32) {
        if qty == 0 {
            return;
        }
        *self.0.entry(id.to_string()).or_insert(0) += qty;
    }

    /// Remove one copy. Returns false if none was owned.
    pub fn remove_one(&mut self, id: &str) -> bool {
        match self.0.get_mut(id) {
            Some(n) if *n > 1 => {
                *n -= 1;
                true
            }
            Some(_) => {
                self.0.remove(id);
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Distinct ids with their counts, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(id, n)| (id.as_str(), *n))
    }

    /// Drop zero counts left behind by hand-edited saves.
    pub(crate) fn prune(&mut self) {
        self.0.retain(|_, n| *n > 0);
    }
}

impl<const N: usize> From<[(&str, u32); N]> for Inventory {
    fn from(items: [(&str, u32); N]) -> Self {
        let mut inv = Inventory::new();
        for (id, qty) in items {
            inv.add(id, qty);
        }
        inv
    }
}

// ── Player ────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EquipSlot {
    Weapon,
    Shield,
    Armor,
}

impl EquipSlot {
    /// The only tool kind this slot accepts.
    pub fn accepts(self) -> ToolKind {
        match self {
            EquipSlot::Weapon => ToolKind::Offense,
            EquipSlot::Shield => ToolKind::Defense,
            EquipSlot::Armor => ToolKind::Armor,
        }
    }

    pub fn for_kind(kind: ToolKind) -> Option<EquipSlot> {
        match kind {
            ToolKind::Offense => Some(EquipSlot::Weapon),
            ToolKind::Defense => Some(EquipSlot::Shield),
            ToolKind::Armor => Some(EquipSlot::Armor),
            ToolKind::Potion => None,
        }
    }
}

pub const DEFAULT_HEALTH: u32 = 100;
pub const DEFAULT_AGILITY: u32 = 5;
pub const DEFAULT_COINS: Coins = Coins { gold: 1000, silver: 1000, bronze: 1000 };

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerState {
    pub health: u32,
    pub max_health_base: u32,
    pub max_health: u32,
    pub agility: u32,
    pub level: u32,
    pub xp: u32,
    pub coins: Coins,
    pub tools: Inventory,
    pub equipped_weapon: Option<String>,
    pub equipped_shield: Option<String>,
    pub equipped_armor: Option<String>,

    // Transient battle modifiers.
    pub is_guarding: bool,
    pub buff_power: u32,
    pub buff_defense: u32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            health: DEFAULT_HEALTH,
            max_health_base: DEFAULT_HEALTH,
            max_health: DEFAULT_HEALTH,
            agility: DEFAULT_AGILITY,
            level: 1,
            xp: 0,
            coins: DEFAULT_COINS,
            tools: Inventory::new(),
            equipped_weapon: None,
            equipped_shield: None,
            equipped_armor: None,
            is_guarding: false,
            buff_power: 0,
            buff_defense: 0,
        }
    }
}

impl PlayerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, slot: EquipSlot) -> Option<&str> {
        match slot {
            EquipSlot::Weapon => self.equipped_weapon.as_deref(),
            EquipSlot::Shield => self.equipped_shield.as_deref(),
            EquipSlot::Armor => self.equipped_armor.as_deref(),
        }
    }

    pub(crate) fn slot_mut(&mut self, slot: EquipSlot) -> &mut Option<String> {
        match slot {
            EquipSlot::Weapon => &mut self.equipped_weapon,
            EquipSlot::Shield => &mut self.equipped_shield,
            EquipSlot::Armor => &mut self.equipped_armor,
        }
    }

    /// Subtract damage, never going below zero.
    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Add health, never going above the maximum.
    pub fn heal(&mut self, amount: u32) {
        self.health = self.health.saturating_add(amount).min(self.max_health);
    }

    pub fn is_down(&self) -> bool {
        self.health == 0
    }

    pub fn xp_to_next(&self) -> u32 {
        self.level.saturating_mul(100)
    }

    /// Forget guard and buffs from a previous encounter.
    pub fn reset_transient(&mut self) {
        self.is_guarding = false;
        self.buff_power = 0;
        self.buff_defense = 0;
    }
}

// ── Monster Instance ──────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct MonsterInstance {
    pub template: &'static MonsterTemplate,
    pub current_health: u32,
    pub max_health: u32,
}

impl MonsterInstance {
    pub fn spawn(template: &'static MonsterTemplate) -> Self {
        let max_health = template.power.saturating_mul(5);
        Self { template, current_health: max_health, max_health }
    }

    pub fn name(&self) -> &'static str {
        self.template.name
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current_health = self.current_health.saturating_sub(amount);
    }

    pub fn is_down(&self) -> bool {
        self.current_health == 0
    }
}

// ── Phases / Commands / Results ───────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattlePhase {
    PlayerTurn,
    /// Transient: visible only while a player action is being applied.
    ResolvingPlayerAction,
    /// Waiting out the pacing delay before the monster acts.
    MonsterTurn,
    /// The monster has telegraphed an attack and the counter input is open.
    CounterWindow,
    Victory,
    Defeat,
    Escaped,
}

impl BattlePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, BattlePhase::Victory | BattlePhase::Defeat | BattlePhase::Escaped)
    }
}

/// Commands the player can submit on their turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Attack,
    Guard,
    /// Drink a potion. `None` picks the first usable one.
    UseItem(Option<String>),
    Talk,
    Escape,
    Pass,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Attack => "attack",
            ActionKind::Guard => "guard",
            ActionKind::UseItem(_) => "use item",
            ActionKind::Talk => "talk",
            ActionKind::Escape => "escape",
            ActionKind::Pass => "pass",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Victory,
    Defeat,
    Escaped,
}

/// What a victory paid out.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Reward {
    pub xp: u32,
    pub coins: Coins,
    pub levels_gained: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CounterPrompt {
    pub attack_name: &'static str,
    pub key: CounterKey,
    pub ticks_left: u32,
}

/// Read-only view of an encounter for renderers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub phase: BattlePhase,
    pub player_health: u32,
    pub player_max_health: u32,
    pub player_level: u32,
    pub is_guarding: bool,
    pub buff_power: u32,
    pub buff_defense: u32,
    pub monster_name: &'static str,
    pub monster_health: u32,
    pub monster_max_health: u32,
    pub counter: Option<CounterPrompt>,
}

/// Everything a renderer needs after one command or timer firing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionResult {
    pub log: Vec<String>,
    pub snapshot: Snapshot,
    pub terminal: Option<Outcome>,
    pub reward: Option<Reward>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_player_matches_config() {
        let p = PlayerState::new();
        assert_eq!(p.health, 100);
        assert_eq!(p.max_health, 100);
        assert_eq!(p.agility, 5);
        assert_eq!(p.level, 1);
        assert_eq!(p.coins, Coins::new(1000, 1000, 1000));
        assert!(p.tools.is_empty());
    }

    #[test]
    fn heal_clamps_to_max() {
        let mut p = PlayerState::new();
        p.health = 90;
        p.heal(50);
        assert_eq!(p.health, 100);
    }

    #[test]
    fn damage_clamps_to_zero() {
        let mut p = PlayerState::new();
        p.health = 3;
        p.take_damage(10);
        assert_eq!(p.health, 0);
        assert!(p.is_down());
    }

    #[test]
    fn monster_health_from_power() {
        let goblin = super::super::catalog::monster_by_id("goblin").unwrap();
        let mut m = MonsterInstance::spawn(goblin);
        assert_eq!(m.max_health, 50);
        m.take_damage(80);
        assert_eq!(m.current_health, 0);
    }

    #[test]
    fn inventory_counts() {
        let mut inv = Inventory::from([("health_potion", 2)]);
        assert_eq!(inv.count("health_potion"), 2);
        assert!(inv.remove_one("health_potion"));
        assert_eq!(inv.count("health_potion"), 1);
        assert!(inv.remove_one("health_potion"));
        assert!(!inv.contains("health_potion"));
        assert!(!inv.remove_one("health_potion"));
        assert!(inv.is_empty());
    }

    #[test]
    fn inventory_iterates_in_id_order() {
        let inv = Inventory::from([("spear", 1), ("dagger", 2), ("health_potion", 1)]);
        let ids: Vec<&str> = inv.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["dagger", "health_potion", "spear"]);
    }

    #[test]
    fn coins_spend_is_all_or_nothing() {
        let mut wallet = Coins::new(1, 5, 0);
        assert!(!wallet.try_spend(&Coins::new(0, 3, 1)));
        assert_eq!(wallet, Coins::new(1, 5, 0));
        assert!(wallet.try_spend(&Coins::new(1, 5, 0)));
        assert_eq!(wallet, Coins::ZERO);
    }

    #[test]
    fn coins_half_floors() {
        assert_eq!(Coins::new(1, 15, 5).half(), Coins::new(0, 7, 2));
    }

    #[test]
    fn player_serializes_inventory_as_map() {
        let mut p = PlayerState::new();
        p.tools.add("dagger", 1);
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"tools\":{\"dagger\":1}"));
    }

    #[test]
    fn terminal_phases() {
        assert!(BattlePhase::Victory.is_terminal());
        assert!(BattlePhase::Escaped.is_terminal());
        assert!(!BattlePhase::CounterWindow.is_terminal());
    }
}
