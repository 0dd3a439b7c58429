//! Dragon Arena: pick a monster, fight it turn by turn, spend the loot in
//! the store.

pub mod actions;
pub mod catalog;
pub mod damage;
pub mod equipment;
pub mod error;
pub mod inventory;
pub mod logic;
pub mod render;
pub mod rewards;
pub mod save;
pub mod state;
pub mod store;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::console;
use crate::games::Game;
use crate::input::{Arrow, ClickState, InputEvent};

use actions::*;
use catalog::{all_tools, monsters_at, random_monster_at, tool_by_id, CounterKey, Location, MonsterTemplate, Tool, ToolKind, ALL_LOCATIONS};
use error::ArenaError;
use logic::{Encounter, EncounterConfig};
use save::PlayerStore;
use state::{ActionKind, ActionResult, BattlePhase, EquipSlot, Outcome, PlayerState};
use store::StoreConfig;

/// Scroll-back kept for the log panel.
pub const LOG_CAPACITY: usize = 50;

/// 7 seconds at 10 ticks/sec.
pub const COUNTER_WINDOW_TICKS: u32 = 70;

pub const TOOL_KINDS: [ToolKind; 4] = [ToolKind::Offense, ToolKind::Defense, ToolKind::Armor, ToolKind::Potion];

/// Battle menu in display order; number keys follow it.
pub const BATTLE_MENU: [(char, &str, u16); 8] = [
    ('a', "Attack", ACT_ATTACK),
    ('g', "Guard", ACT_GUARD),
    ('i', "Items", ACT_ITEMS),
    ('t', "Talk", ACT_TALK),
    ('e', "Escape", ACT_ESCAPE),
    ('p', "Pass", ACT_PASS),
    ('w', "Gear", ACT_GEAR),
    ('q', "Leave", ACT_LEAVE),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Town,
    Store,
    Gear,
    Battle,
    BattleItems,
    BattleGear,
    /// Encounter over, waiting for the player to head back to town.
    Aftermath,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreTab {
    Buy,
    Sell,
}

// ── Log ───────────────────────────────────────────────────────

/// Bounded log; the oldest line goes first.
#[derive(Default)]
pub struct BattleLog {
    lines: VecDeque<String>,
}

impl BattleLog {
    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == LOG_CAPACITY {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    /// The newest `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &str> {
        self.lines.iter().skip(self.lines.len().saturating_sub(n)).map(String::as_str)
    }
}

// ── Game ──────────────────────────────────────────────────────

pub struct ArenaGame<S: PlayerStore> {
    store: S,
    /// The player while in town. During a fight the encounter owns it and
    /// this holds a placeholder.
    player: PlayerState,
    encounter: Option<Encounter<ChaCha8Rng>>,
    rng: ChaCha8Rng,
    pub screen: Screen,
    pub location: Location,
    pub store_tab: StoreTab,
    pub tool_kind: ToolKind,
    pub store_config: StoreConfig,
    pub counter_mode: bool,
    pub log: BattleLog,
    pub outcome: Option<Outcome>,
}

impl<S: PlayerStore> ArenaGame<S> {
    pub fn new(mut store: S, seed: u64) -> Self {
        let player = store.load();
        let mut log = BattleLog::default();
        log.push(format!("Level {} hero, {} in the purse.", player.level, player.coins));
        Self {
            store,
            player,
            encounter: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            screen: Screen::Town,
            location: Location::Forest,
            store_tab: StoreTab::Buy,
            tool_kind: ToolKind::Offense,
            store_config: StoreConfig::default(),
            counter_mode: false,
            log,
            outcome: None,
        }
    }

    pub fn player(&self) -> &PlayerState {
        match &self.encounter {
            Some(enc) => enc.player(),
            None => &self.player,
        }
    }

    pub fn encounter(&self) -> Option<&Encounter<ChaCha8Rng>> {
        self.encounter.as_ref()
    }

    fn persist(&mut self) {
        let result = match &self.encounter {
            Some(enc) => self.store.save(enc.player()),
            None => self.store.save(&self.player),
        };
        if let Err(err) = result {
            console::warn(&format!("save failed: {err}"));
        }
    }

    // ── Lists shared by input and render ──────────────────────

    pub fn location_monsters(&self) -> Vec<&'static MonsterTemplate> {
        monsters_at(self.location)
    }

    pub fn tools_of_kind(&self) -> Vec<&'static Tool> {
        all_tools().iter().filter(|t| t.kind == self.tool_kind).collect()
    }

    /// Owned tools the catalog knows, in inventory order.
    pub fn owned_tools(&self) -> Vec<(&'static Tool, u32)> {
        self.player()
            .tools
            .iter()
            .filter_map(|(id, n)| tool_by_id(id).ok().map(|t| (t, n)))
            .collect()
    }

    pub fn owned_gear(&self) -> Vec<&'static Tool> {
        self.owned_tools()
            .into_iter()
            .filter(|(t, _)| t.kind != ToolKind::Potion)
            .map(|(t, _)| t)
            .collect()
    }

    pub fn usable_potions(&self) -> Vec<(&'static Tool, u32)> {
        inventory::usable_potions(self.player())
    }

    // ── Town ──────────────────────────────────────────────────

    pub fn start_fight(&mut self, template: &'static MonsterTemplate) -> Result<(), ArenaError> {
        if self.encounter.is_some() {
            return Err(ArenaError::EncounterInProgress);
        }
        let mut config = EncounterConfig::default();
        if self.counter_mode {
            config = config.with_counter_window(COUNTER_WINDOW_TICKS);
        }
        let rng = ChaCha8Rng::seed_from_u64(self.rng.gen());
        let player = std::mem::take(&mut self.player);
        self.encounter = Some(Encounter::start(player, template, config, rng));
        self.outcome = None;
        self.screen = Screen::Battle;
        self.log.push(format!("A {} appears in the {}!", template.name, self.location.name()));
        Ok(())
    }

    fn fight_index(&mut self, idx: usize) -> bool {
        let Some(template) = self.location_monsters().get(idx).copied() else {
            return false;
        };
        if let Err(err) = self.start_fight(template) {
            self.log.push(err.to_string());
        }
        true
    }

    /// Fight whatever turns up at the current location.
    fn random_fight(&mut self) -> bool {
        let Some(template) = random_monster_at(&mut self.rng, self.location) else {
            return false;
        };
        if let Err(err) = self.start_fight(template) {
            self.log.push(err.to_string());
        }
        true
    }

    fn cycle_location(&mut self) {
        let i = ALL_LOCATIONS.iter().position(|l| *l == self.location).unwrap_or(0);
        self.location = ALL_LOCATIONS[(i + 1) % ALL_LOCATIONS.len()];
    }

    fn buy_index(&mut self, idx: usize) -> bool {
        let Some(tool) = self.tools_of_kind().get(idx).copied() else {
            return false;
        };
        match store::buy(&mut self.player, tool.id, 1, &self.store_config) {
            Ok(p) => self.log.push(format!("Bought {} x{} for {}.", p.tool.name, p.qty, p.paid)),
            Err(err) => self.log.push(format!("Can't buy: {}.", err)),
        }
        self.persist();
        true
    }

    fn sell_index(&mut self, idx: usize) -> bool {
        let Some((tool, _)) = self.owned_tools().get(idx).copied() else {
            return false;
        };
        match store::sell(&mut self.player, tool.id) {
            Ok(earned) => self.log.push(format!("Sold {} for {}.", tool.name, earned)),
            Err(err) => self.log.push(format!("Can't sell: {}.", err)),
        }
        self.persist();
        true
    }

    fn sell_everything(&mut self) {
        let earned = store::sell_all(&mut self.player);
        self.log.push(format!("Sold everything for {}.", earned));
        self.persist();
    }

    /// Equip the gear at `idx`, or take it off if it is already worn.
    fn toggle_gear(&mut self, idx: usize) -> bool {
        let Some(tool) = self.owned_gear().get(idx).copied() else {
            return false;
        };
        let Some(slot) = EquipSlot::for_kind(tool.kind) else {
            return false;
        };
        let worn = self.player().slot(slot) == Some(tool.id);
        let result = match (&mut self.encounter, worn) {
            (Some(enc), true) => enc.unequip(slot).map(|_| format!("Took off the {}.", tool.name)),
            (Some(enc), false) => enc.equip(slot, tool.id).map(|t| format!("Equipped the {}.", t.name)),
            (None, true) => {
                inventory::unequip(&mut self.player, slot);
                Ok(format!("Took off the {}.", tool.name))
            }
            (None, false) => {
                inventory::equip(&mut self.player, slot, tool.id).map(|t| format!("Equipped the {}.", t.name))
            }
        };
        match result {
            Ok(msg) => self.log.push(msg),
            Err(err) => self.log.push(err.to_string()),
        }
        self.persist();
        true
    }

    // ── Battle ────────────────────────────────────────────────

    pub fn battle_action(&mut self, action: ActionKind) -> Result<(), ArenaError> {
        let enc = self.encounter.as_mut().ok_or(ArenaError::NoEncounter)?;
        let res = enc.submit_action(action);
        self.absorb(res);
        Ok(())
    }

    pub fn counter(&mut self, key: CounterKey) -> bool {
        let Some(res) = self.encounter.as_mut().and_then(|enc| enc.counter_input(key)) else {
            return false;
        };
        self.absorb(res);
        true
    }

    pub fn leave_battle(&mut self) {
        if let Some(enc) = self.encounter.as_mut() {
            let res = enc.abandon();
            self.absorb(res);
        }
    }

    fn absorb(&mut self, res: ActionResult) {
        for line in res.log {
            self.log.push(line);
        }
        if let Some(outcome) = res.terminal {
            self.outcome = Some(outcome);
            self.screen = Screen::Aftermath;
            if let Some(reward) = res.reward {
                if reward.levels_gained > 0 {
                    console::log(&format!("level up x{}", reward.levels_gained));
                }
            }
        } else if self.screen == Screen::BattleItems {
            self.screen = Screen::Battle;
        }
        self.persist();
    }

    /// Take the player back from a finished encounter and return to town.
    pub fn finish_battle(&mut self) {
        if let Some(enc) = self.encounter.take() {
            self.player = enc.finish();
        }
        self.screen = Screen::Town;
        self.persist();
    }

    fn use_potion_index(&mut self, idx: usize) -> bool {
        let Some((tool, _)) = self.usable_potions().get(idx).copied() else {
            return false;
        };
        if let Err(err) = self.battle_action(ActionKind::UseItem(Some(tool.id.to_string()))) {
            self.log.push(err.to_string());
        }
        true
    }

    fn battle_phase(&self) -> Option<BattlePhase> {
        self.encounter.as_ref().map(|e| e.phase())
    }

    fn battle_menu(&mut self, action_id: u16) -> bool {
        let action = match action_id {
            ACT_ATTACK => ActionKind::Attack,
            ACT_GUARD => ActionKind::Guard,
            ACT_TALK => ActionKind::Talk,
            ACT_ESCAPE => ActionKind::Escape,
            ACT_PASS => ActionKind::Pass,
            ACT_ITEMS => {
                self.screen = Screen::BattleItems;
                return true;
            }
            ACT_GEAR => {
                self.screen = Screen::BattleGear;
                return true;
            }
            ACT_LEAVE => {
                self.leave_battle();
                return true;
            }
            _ => return false,
        };
        self.battle_action(action).is_ok()
    }

    // ── Input ─────────────────────────────────────────────────

    fn handle_click(&mut self, id: u16) -> bool {
        match id {
            BACK => self.go_back(),
            CONTINUE if self.screen == Screen::Aftermath => {
                self.finish_battle();
                true
            }
            COUNTER_D => self.counter(CounterKey::D),
            COUNTER_S => self.counter(CounterKey::S),
            COUNTER_UP => self.counter(CounterKey::Up),
            COUNTER_LEFT => self.counter(CounterKey::Left),
            COUNTER_RIGHT => self.counter(CounterKey::Right),
            _ => match self.screen {
                Screen::Town => match id {
                    OPEN_STORE => { self.screen = Screen::Store; true }
                    OPEN_GEAR => { self.screen = Screen::Gear; true }
                    TOGGLE_COUNTER_MODE => { self.counter_mode = !self.counter_mode; true }
                    RANDOM_FIGHT => self.random_fight(),
                    id if (LOCATION_TAB_BASE..LOCATION_TAB_BASE + ALL_LOCATIONS.len() as u16).contains(&id) => {
                        self.location = ALL_LOCATIONS[(id - LOCATION_TAB_BASE) as usize];
                        true
                    }
                    id if (FIGHT_BASE..LOCATION_TAB_BASE).contains(&id) => self.fight_index((id - FIGHT_BASE) as usize),
                    _ => false,
                },
                Screen::Store => match id {
                    STORE_BUY_TAB => { self.store_tab = StoreTab::Buy; true }
                    STORE_SELL_TAB => { self.store_tab = StoreTab::Sell; true }
                    SELL_ALL => { self.sell_everything(); true }
                    id if (KIND_TAB_BASE..KIND_TAB_BASE + 4).contains(&id) => {
                        self.tool_kind = TOOL_KINDS[(id - KIND_TAB_BASE) as usize];
                        true
                    }
                    id if (BUY_BASE..SELL_BASE).contains(&id) => self.buy_index((id - BUY_BASE) as usize),
                    id if (SELL_BASE..GEAR_BASE).contains(&id) => self.sell_index((id - SELL_BASE) as usize),
                    _ => false,
                },
                Screen::Gear | Screen::BattleGear => match id {
                    id if (GEAR_BASE..ITEM_BASE).contains(&id) => self.toggle_gear((id - GEAR_BASE) as usize),
                    _ => false,
                },
                Screen::Battle => self.battle_menu(id),
                Screen::BattleItems => match id {
                    id if id >= ITEM_BASE => self.use_potion_index((id - ITEM_BASE) as usize),
                    _ => false,
                },
                Screen::Aftermath => false,
            },
        }
    }

    /// One level up: sub-screens return to their parent.
    fn go_back(&mut self) -> bool {
        self.screen = match self.screen {
            Screen::Store | Screen::Gear => Screen::Town,
            Screen::BattleItems | Screen::BattleGear => Screen::Battle,
            _ => return false,
        };
        true
    }

    fn handle_key(&mut self, key: char) -> bool {
        let key = key.to_ascii_lowercase();
        let digit = key.to_digit(10).filter(|d| *d > 0).map(|d| d as usize - 1);

        if self.battle_phase() == Some(BattlePhase::CounterWindow) {
            match key {
                'd' => return self.counter(CounterKey::D),
                's' => return self.counter(CounterKey::S),
                _ => {}
            }
        }

        match self.screen {
            Screen::Town => match (key, digit) {
                (_, Some(i)) => self.fight_index(i),
                ('l', _) => { self.cycle_location(); true }
                ('r', _) => self.random_fight(),
                ('s', _) => self.handle_click(OPEN_STORE),
                ('g', _) => self.handle_click(OPEN_GEAR),
                ('c', _) => self.handle_click(TOGGLE_COUNTER_MODE),
                _ => false,
            },
            Screen::Store => match (key, digit) {
                (_, Some(i)) => match self.store_tab {
                    StoreTab::Buy => self.buy_index(i),
                    StoreTab::Sell => self.sell_index(i),
                },
                ('t', _) => {
                    self.store_tab = match self.store_tab {
                        StoreTab::Buy => StoreTab::Sell,
                        StoreTab::Sell => StoreTab::Buy,
                    };
                    true
                }
                ('k', _) => {
                    let i = TOOL_KINDS.iter().position(|k| *k == self.tool_kind).unwrap_or(0);
                    self.tool_kind = TOOL_KINDS[(i + 1) % TOOL_KINDS.len()];
                    true
                }
                ('x', _) => self.handle_click(SELL_ALL),
                ('q', _) | ('-', _) => self.go_back(),
                _ => false,
            },
            Screen::Gear | Screen::BattleGear => match (key, digit) {
                (_, Some(i)) => self.toggle_gear(i),
                ('q', _) | ('-', _) => self.go_back(),
                _ => false,
            },
            Screen::Battle => {
                let by_digit = digit.and_then(|i| BATTLE_MENU.get(i)).map(|(_, _, id)| *id);
                let by_letter = BATTLE_MENU.iter().find(|(c, _, _)| *c == key).map(|(_, _, id)| *id);
                match by_digit.or(by_letter) {
                    Some(id) => self.battle_menu(id),
                    None => false,
                }
            }
            Screen::BattleItems => match (key, digit) {
                (_, Some(i)) => self.use_potion_index(i),
                ('q', _) | ('-', _) => self.go_back(),
                _ => false,
            },
            Screen::Aftermath => match key {
                '\n' | ' ' => self.handle_click(CONTINUE),
                _ => false,
            },
        }
    }

    fn handle_arrow(&mut self, arrow: Arrow) -> bool {
        match arrow {
            Arrow::Up => self.counter(CounterKey::Up),
            Arrow::Left => self.counter(CounterKey::Left),
            Arrow::Right => self.counter(CounterKey::Right),
            Arrow::Down => false,
        }
    }
}

impl<S: PlayerStore> Game for ArenaGame<S> {
    fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Key(c) => self.handle_key(*c),
            InputEvent::Arrow(a) => self.handle_arrow(*a),
            InputEvent::Click(id) => self.handle_click(*id),
        }
    }

    fn tick(&mut self, delta_ticks: u32) {
        let Some(res) = self.encounter.as_mut().and_then(|enc| enc.tick(delta_ticks)) else {
            return;
        };
        self.absorb(res);
    }

    fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }
}
