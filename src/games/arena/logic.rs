//! Turn engine: one encounter between the player and a monster.
//!
//! Pure game logic, no rendering. Commands go in through `submit_action`,
//! `counter_input` and `tick`; each returns an `ActionResult` for the
//! renderer. Failures never escape as errors, they become log lines.

use rand::seq::SliceRandom;
use rand::Rng;

use super::catalog::{CounterKey, MonsterAttack, MonsterTemplate, Tool};
use super::damage::roll_damage;
use super::equipment::{shield_defense, weapon_power, FISTS_POWER};
use super::error::ArenaError;
use super::inventory;
use super::rewards::{settle_defeat, settle_victory};
use super::state::{
    ActionKind, ActionResult, BattlePhase, CounterPrompt, EquipSlot, MonsterInstance, Outcome,
    PlayerState, Reward, Snapshot,
};
use crate::console;
use crate::time::Countdown;

/// Used when a monster template lists no attacks.
static LUNGE: MonsterAttack = MonsterAttack { name: "Lunge", counter: CounterKey::D };

// ── Config ────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct EncounterConfig {
    /// Pause between the player's action and the monster's. Zero resolves
    /// the monster turn inside the same call.
    pub monster_delay_ticks: u32,
    /// `Some(n)` opens an n-tick counter window before every monster hit.
    pub counter_window_ticks: Option<u32>,
    pub escape_chance: f64,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self { monster_delay_ticks: 6, counter_window_ticks: None, escape_chance: 0.5 }
    }
}

impl EncounterConfig {
    /// Monster acts immediately; handy for scripted play and tests.
    pub fn instant() -> Self {
        Self { monster_delay_ticks: 0, ..Self::default() }
    }

    pub fn with_counter_window(mut self, ticks: u32) -> Self {
        self.counter_window_ticks = Some(ticks);
        self
    }

    fn escape_probability(&self) -> f64 {
        if self.escape_chance.is_nan() {
            0.0
        } else {
            self.escape_chance.clamp(0.0, 1.0)
        }
    }
}

// ── Encounter ─────────────────────────────────────────────────

pub struct Encounter<R: Rng> {
    player: PlayerState,
    monster: MonsterInstance,
    phase: BattlePhase,
    config: EncounterConfig,
    rng: R,
    monster_timer: Countdown,
    counter_timer: Countdown,
    pending_attack: Option<&'static MonsterAttack>,
    reward: Option<Reward>,
}

impl<R: Rng> Encounter<R> {
    /// Take ownership of the player and spawn `template`. Leftover guard
    /// and buffs from earlier fights are cleared.
    pub fn start(
        mut player: PlayerState,
        template: &'static MonsterTemplate,
        config: EncounterConfig,
        rng: R,
    ) -> Self {
        player.reset_transient();
        Self {
            player,
            monster: MonsterInstance::spawn(template),
            phase: BattlePhase::PlayerTurn,
            config,
            rng,
            monster_timer: Countdown::idle(),
            counter_timer: Countdown::idle(),
            pending_attack: None,
            reward: None,
        }
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn monster(&self) -> &MonsterInstance {
        &self.monster
    }

    pub fn reward(&self) -> Option<&Reward> {
        self.reward.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Give the player back. An unfinished encounter is abandoned first.
    pub fn finish(mut self) -> PlayerState {
        if !self.is_over() {
            self.abandon();
        }
        self.player
    }

    pub fn snapshot(&self) -> Snapshot {
        let counter = match (self.phase, self.pending_attack) {
            (BattlePhase::CounterWindow, Some(attack)) => Some(CounterPrompt {
                attack_name: attack.name,
                key: attack.counter,
                ticks_left: self.counter_timer.remaining(),
            }),
            _ => None,
        };
        Snapshot {
            phase: self.phase,
            player_health: self.player.health,
            player_max_health: self.player.max_health,
            player_level: self.player.level,
            is_guarding: self.player.is_guarding,
            buff_power: self.player.buff_power,
            buff_defense: self.player.buff_defense,
            monster_name: self.monster.name(),
            monster_health: self.monster.current_health,
            monster_max_health: self.monster.max_health,
            counter,
        }
    }

    fn result(&self, log: Vec<String>, terminal: Option<Outcome>) -> ActionResult {
        let reward = match terminal {
            Some(Outcome::Victory) => self.reward.clone(),
            _ => None,
        };
        ActionResult { log, snapshot: self.snapshot(), terminal, reward }
    }

    // ── Player Commands ───────────────────────────────────────

    /// Resolve one player command. Outside `PlayerTurn` the command is
    /// ignored and the state is left exactly as it was.
    pub fn submit_action(&mut self, action: ActionKind) -> ActionResult {
        let mut log = Vec::new();
        if self.phase != BattlePhase::PlayerTurn {
            let err = ArenaError::IllegalAction { action: action.name(), phase: self.phase };
            log.push(err.to_string());
            return self.result(log, None);
        }

        self.phase = BattlePhase::ResolvingPlayerAction;
        let terminal = match action {
            ActionKind::Attack => self.player_attack(&mut log),
            ActionKind::Guard => {
                self.player.is_guarding = true;
                log.push("You raise your guard.".to_string());
                self.begin_monster_turn(&mut log)
            }
            ActionKind::UseItem(id) => match inventory::use_potion(&mut self.player, id.as_deref()) {
                Ok(used) => {
                    log.push(describe_potion(used.tool, used.healed));
                    self.begin_monster_turn(&mut log)
                }
                Err(err) => {
                    log.push(format!("Can't use an item: {}.", err));
                    self.phase = BattlePhase::PlayerTurn;
                    None
                }
            },
            ActionKind::Talk => {
                log.push(format!("You try to talk to the {}. It does not respond.", self.monster.name()));
                self.begin_monster_turn(&mut log)
            }
            ActionKind::Escape => {
                if self.rng.gen_bool(self.config.escape_probability()) {
                    log.push("You escaped!".to_string());
                    self.end(Outcome::Escaped, &mut log)
                } else {
                    log.push("You failed to escape!".to_string());
                    self.begin_monster_turn(&mut log)
                }
            }
            ActionKind::Pass => {
                log.push("You wait.".to_string());
                self.begin_monster_turn(&mut log)
            }
        };
        self.result(log, terminal)
    }

    fn player_attack(&mut self, log: &mut Vec<String>) -> Option<Outcome> {
        let base = match weapon_power(&self.player) {
            Ok(power) => power,
            Err(err) => {
                console::warn(&format!("{}; attacking with fists", err));
                log.push(format!("Warning: {}. You fight bare-handed.", err));
                FISTS_POWER
            }
        };
        let power = base.saturating_add(std::mem::take(&mut self.player.buff_power));
        let damage = roll_damage(&mut self.rng, power, self.player.agility);
        self.monster.take_damage(damage);
        log.push(format!("You hit the {} for {} damage.", self.monster.name(), damage));

        if self.monster.is_down() {
            return self.end(Outcome::Victory, log);
        }
        self.begin_monster_turn(log)
    }

    /// Change equipment between actions. Does not use up the turn.
    pub fn equip(&mut self, slot: EquipSlot, tool_id: &str) -> Result<&'static Tool, ArenaError> {
        self.require_player_turn("equip")?;
        inventory::equip(&mut self.player, slot, tool_id)
    }

    pub fn unequip(&mut self, slot: EquipSlot) -> Result<Option<String>, ArenaError> {
        self.require_player_turn("unequip")?;
        Ok(inventory::unequip(&mut self.player, slot))
    }

    fn require_player_turn(&self, action: &'static str) -> Result<(), ArenaError> {
        if self.phase == BattlePhase::PlayerTurn {
            Ok(())
        } else {
            Err(ArenaError::IllegalAction { action, phase: self.phase })
        }
    }

    /// Leave mid-fight. Counts as an escape: no reward, no penalty.
    pub fn abandon(&mut self) -> ActionResult {
        let mut log = Vec::new();
        if self.is_over() {
            return self.result(log, None);
        }
        log.push(format!("You leave the {} behind.", self.monster.name()));
        let terminal = self.end(Outcome::Escaped, &mut log);
        self.result(log, terminal)
    }

    // ── Monster Turn ──────────────────────────────────────────

    fn begin_monster_turn(&mut self, log: &mut Vec<String>) -> Option<Outcome> {
        self.phase = BattlePhase::MonsterTurn;
        if self.config.monster_delay_ticks == 0 {
            return self.monster_act(log);
        }
        self.monster_timer = Countdown::start(self.config.monster_delay_ticks);
        None
    }

    fn monster_act(&mut self, log: &mut Vec<String>) -> Option<Outcome> {
        let attacks = self.monster.template.attacks;
        let attack = attacks.choose(&mut self.rng).unwrap_or(&LUNGE);

        match self.config.counter_window_ticks {
            Some(ticks) => {
                self.phase = BattlePhase::CounterWindow;
                self.pending_attack = Some(attack);
                self.counter_timer = Countdown::start(ticks);
                log.push(format!(
                    "The {} readies {}! Press [{}] to counter!",
                    self.monster.name(),
                    attack.name,
                    attack.counter.label()
                ));
                None
            }
            None => self.monster_hit(attack, log),
        }
    }

    fn monster_hit(&mut self, attack: &MonsterAttack, log: &mut Vec<String>) -> Option<Outcome> {
        let template = self.monster.template;
        let mut damage = roll_damage(&mut self.rng, template.power, template.agility);

        if std::mem::take(&mut self.player.is_guarding) {
            match shield_defense(&self.player) {
                Ok(Some(defense)) if defense > 0 => {
                    let blocked = defense.min(damage);
                    damage -= blocked;
                    log.push(format!("Your shield blocks {} damage.", blocked));
                }
                Ok(_) => log.push("Warning: you guard without a shield and block nothing.".to_string()),
                Err(err) => {
                    console::warn(&format!("{}; guard blocks nothing", err));
                    log.push(format!("Warning: {}. Your guard blocks nothing.", err));
                }
            }
        }

        let absorb = std::mem::take(&mut self.player.buff_defense);
        if absorb > 0 {
            let absorbed = absorb.min(damage);
            damage -= absorbed;
            log.push(format!("Your potion absorbs {} damage.", absorbed));
        }

        self.player.take_damage(damage);
        log.push(format!(
            "The {} uses {} and deals {} damage.",
            self.monster.name(),
            attack.name,
            damage
        ));

        if self.player.is_down() {
            return self.end(Outcome::Defeat, log);
        }
        self.phase = BattlePhase::PlayerTurn;
        None
    }

    // ── Counter Window ────────────────────────────────────────

    /// Feed a counter key. `None` when nothing is waiting for one or the
    /// key is wrong; only the first correct key inside the window counts.
    pub fn counter_input(&mut self, key: CounterKey) -> Option<ActionResult> {
        if self.phase != BattlePhase::CounterWindow {
            return None;
        }
        let attack = self.pending_attack?;
        if key != attack.counter {
            return None;
        }
        self.close_counter_window();
        self.player.is_guarding = false;
        self.phase = BattlePhase::PlayerTurn;
        let log = vec![format!("You countered the {}'s {}!", self.monster.name(), attack.name)];
        Some(self.result(log, None))
    }

    fn close_counter_window(&mut self) {
        self.counter_timer.cancel();
        self.pending_attack = None;
    }

    // ── Timers ────────────────────────────────────────────────

    /// Advance the pacing and counter timers. Returns a result only when a
    /// timer fired and something happened.
    pub fn tick(&mut self, delta_ticks: u32) -> Option<ActionResult> {
        if delta_ticks == 0 || self.is_over() {
            return None;
        }
        let mut log = Vec::new();
        let phase = self.phase;
        let terminal = match phase {
            BattlePhase::MonsterTurn if self.monster_timer.advance(delta_ticks) => self.monster_act(&mut log),
            BattlePhase::CounterWindow if self.counter_timer.advance(delta_ticks) => {
                let attack = self.pending_attack.take()?;
                log.push(format!("Too slow to counter {}!", attack.name));
                self.monster_hit(attack, &mut log)
            }
            _ => return None,
        };
        Some(self.result(log, terminal))
    }

    // ── Ending ────────────────────────────────────────────────

    fn end(&mut self, outcome: Outcome, log: &mut Vec<String>) -> Option<Outcome> {
        self.monster_timer.cancel();
        self.close_counter_window();
        match outcome {
            Outcome::Victory => {
                self.phase = BattlePhase::Victory;
                let reward = settle_victory(&mut self.player, self.monster.template);
                log.push(format!(
                    "The {} is defeated! +{} xp, {}",
                    self.monster.name(),
                    reward.xp,
                    reward.coins
                ));
                if reward.levels_gained > 0 {
                    log.push(format!("You reached level {}!", self.player.level));
                }
                self.reward = Some(reward);
            }
            Outcome::Defeat => {
                self.phase = BattlePhase::Defeat;
                log.push(format!("You were defeated by the {}.", self.monster.name()));
                settle_defeat(&mut self.player);
                log.push("You wake up in town, fully healed.".to_string());
            }
            Outcome::Escaped => {
                self.phase = BattlePhase::Escaped;
            }
        }
        Some(outcome)
    }
}

fn describe_potion(tool: &Tool, healed: u32) -> String {
    let fx = tool.effect;
    let mut parts = Vec::new();
    if fx.heal > 0 {
        parts.push(format!("restores {} health", healed));
    }
    if fx.power > 0 {
        parts.push(format!("+{} power on your next attack", fx.power));
    }
    if fx.agility > 0 {
        parts.push(format!("+{} agility", fx.agility));
    }
    if fx.defense > 0 {
        parts.push(format!("absorbs {} damage from the next hit", fx.defense));
    }
    if parts.is_empty() {
        format!("You drink the {}. Nothing happens.", tool.name)
    } else {
        format!("You drink the {}: {}.", tool.name, parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::arena::catalog::monster_by_id;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Every draw is zero: minimum damage, first attack in the list.
    fn zeros() -> StepRng {
        StepRng::new(0, 0)
    }

    fn goblin_fight(player: PlayerState, config: EncounterConfig) -> Encounter<StepRng> {
        Encounter::start(player, monster_by_id("goblin").unwrap(), config, zeros())
    }

    #[test]
    fn starts_on_player_turn_with_clean_modifiers() {
        let mut p = PlayerState::new();
        p.is_guarding = true;
        p.buff_power = 9;
        let enc = goblin_fight(p, EncounterConfig::default());
        assert_eq!(enc.phase(), BattlePhase::PlayerTurn);
        assert!(!enc.player().is_guarding);
        assert_eq!(enc.player().buff_power, 0);
        assert_eq!(enc.monster().max_health, 50);
    }

    #[test]
    fn fists_damage_in_range() {
        for seed in 0..200 {
            let rng = ChaCha8Rng::seed_from_u64(seed);
            let mut enc = Encounter::start(
                PlayerState::new(),
                monster_by_id("goblin").unwrap(),
                EncounterConfig::default(),
                rng,
            );
            enc.submit_action(ActionKind::Attack);
            let dealt = 50 - enc.monster().current_health;
            assert!((3..=8).contains(&dealt), "seed {} dealt {}", seed, dealt);
        }
    }

    #[test]
    fn attack_then_monster_turn_then_back() {
        let mut enc = goblin_fight(PlayerState::new(), EncounterConfig::default());
        let res = enc.submit_action(ActionKind::Attack);
        assert_eq!(res.snapshot.phase, BattlePhase::MonsterTurn);
        assert_eq!(res.snapshot.monster_health, 47);

        assert!(enc.tick(5).is_none());
        let res = enc.tick(1).unwrap();
        assert_eq!(res.snapshot.phase, BattlePhase::PlayerTurn);
        // goblin power 10 -> 7
        assert_eq!(res.snapshot.player_health, 93);
    }

    #[test]
    fn action_outside_player_turn_changes_nothing() {
        let mut enc = goblin_fight(PlayerState::new(), EncounterConfig::default());
        enc.submit_action(ActionKind::Pass);
        assert_eq!(enc.phase(), BattlePhase::MonsterTurn);

        let before_player = enc.player().clone();
        let before = enc.snapshot();
        for action in [ActionKind::Attack, ActionKind::Guard, ActionKind::Escape, ActionKind::UseItem(None)] {
            let res = enc.submit_action(action);
            assert!(res.terminal.is_none());
            assert!(res.log[0].contains("not allowed"));
        }
        assert_eq!(enc.snapshot(), before);
        assert_eq!(enc.player(), &before_player);
    }

    fn assert_actions_ignored(enc: &mut Encounter<StepRng>) {
        let before_player = enc.player().clone();
        let before = enc.snapshot();
        for action in [ActionKind::Attack, ActionKind::Guard, ActionKind::Escape, ActionKind::Pass, ActionKind::UseItem(None)] {
            let res = enc.submit_action(action);
            assert!(res.terminal.is_none());
            assert!(res.reward.is_none());
            assert!(res.log[0].contains("not allowed"));
            assert_eq!(res.snapshot, before);
        }
        assert_eq!(enc.snapshot(), before);
        assert_eq!(enc.player(), &before_player);
    }

    #[test]
    fn actions_ignored_in_every_phase_but_player_turn() {
        let mut p = PlayerState::new();
        p.tools.add("health_potion", 1);

        let config = EncounterConfig::instant().with_counter_window(5);
        let mut enc = goblin_fight(p.clone(), config);
        enc.submit_action(ActionKind::Pass);
        assert_eq!(enc.phase(), BattlePhase::CounterWindow);
        assert_actions_ignored(&mut enc);
        // The window is still live afterwards.
        assert!(enc.counter_input(CounterKey::D).is_some());

        let mut enc = goblin_fight(p.clone(), EncounterConfig::default());
        enc.monster.current_health = 1;
        enc.submit_action(ActionKind::Attack);
        assert_eq!(enc.phase(), BattlePhase::Victory);
        assert_actions_ignored(&mut enc);

        let config = EncounterConfig { escape_chance: 1.0, ..EncounterConfig::default() };
        let mut enc = goblin_fight(p, config);
        enc.submit_action(ActionKind::Escape);
        assert_eq!(enc.phase(), BattlePhase::Escaped);
        assert_actions_ignored(&mut enc);
    }

    #[test]
    fn monster_at_exactly_zero_is_victory() {
        let mut enc = goblin_fight(PlayerState::new(), EncounterConfig::default());
        enc.monster.current_health = 3;
        let res = enc.submit_action(ActionKind::Attack);
        assert_eq!(res.terminal, Some(Outcome::Victory));
        assert_eq!(enc.phase(), BattlePhase::Victory);
        assert_eq!(res.snapshot.monster_health, 0);
        assert!(!enc.monster_timer.is_armed());

        let reward = res.reward.unwrap();
        assert_eq!(reward.xp, 20);
        assert_eq!(enc.player().xp, 20);
        assert!(enc.submit_action(ActionKind::Attack).log[0].contains("not allowed"));
    }

    #[test]
    fn one_health_left_is_defeat_then_full_health() {
        let mut p = PlayerState::new();
        p.health = 1;
        let xp = p.xp;
        let mut enc = goblin_fight(p, EncounterConfig::instant());
        let res = enc.submit_action(ActionKind::Pass);
        assert_eq!(res.terminal, Some(Outcome::Defeat));
        assert_eq!(enc.phase(), BattlePhase::Defeat);
        let player = enc.finish();
        assert_eq!(player.health, player.max_health);
        assert_eq!(player.xp, xp);
    }

    #[test]
    fn certain_escape_leaves_player_unchanged() {
        let p = PlayerState::new();
        let config = EncounterConfig { escape_chance: 1.0, ..EncounterConfig::default() };
        let mut enc = goblin_fight(p.clone(), config);
        let res = enc.submit_action(ActionKind::Escape);
        assert_eq!(res.terminal, Some(Outcome::Escaped));
        assert!(res.reward.is_none());
        assert_eq!(enc.finish(), p);
    }

    #[test]
    fn failed_escape_hands_turn_to_monster() {
        let config = EncounterConfig { escape_chance: 0.0, ..EncounterConfig::instant() };
        let mut enc = goblin_fight(PlayerState::new(), config);
        let res = enc.submit_action(ActionKind::Escape);
        assert!(res.terminal.is_none());
        assert_eq!(res.snapshot.player_health, 93);
        assert_eq!(enc.phase(), BattlePhase::PlayerTurn);
    }

    #[test]
    fn health_potion_clamps_and_ends_turn() {
        let mut p = PlayerState::new();
        p.tools.add("health_potion", 2);
        p.health = p.max_health - 10;
        let mut enc = goblin_fight(p, EncounterConfig::default());
        let res = enc.submit_action(ActionKind::UseItem(Some("health_potion".into())));
        assert_eq!(res.snapshot.player_health, 100);
        assert_eq!(res.snapshot.phase, BattlePhase::MonsterTurn);
        assert_eq!(enc.player().tools.count("health_potion"), 1);
    }

    #[test]
    fn no_usable_item_keeps_the_turn() {
        let mut enc = goblin_fight(PlayerState::new(), EncounterConfig::instant());
        let res = enc.submit_action(ActionKind::UseItem(None));
        assert_eq!(res.snapshot.phase, BattlePhase::PlayerTurn);
        assert_eq!(res.snapshot.player_health, 100);
        assert!(res.log[0].contains("no usable item"));
    }

    #[test]
    fn power_buff_spent_on_next_attack() {
        let mut p = PlayerState::new();
        p.tools.add("power_potion", 1);
        let mut enc = goblin_fight(p, EncounterConfig::instant());
        enc.submit_action(ActionKind::UseItem(None));
        assert_eq!(enc.player().buff_power, 10);
        enc.submit_action(ActionKind::Attack);
        // floor((5 + 10) * 0.7)
        assert_eq!(enc.monster().current_health, 50 - 10);
        assert_eq!(enc.player().buff_power, 0);
    }

    #[test]
    fn guard_without_shield_warns_and_is_consumed() {
        let mut enc = goblin_fight(PlayerState::new(), EncounterConfig::instant());
        let res = enc.submit_action(ActionKind::Guard);
        assert!(res.log.iter().any(|l| l.contains("without a shield")));
        assert_eq!(res.snapshot.player_health, 93);
        assert!(!res.snapshot.is_guarding);
    }

    #[test]
    fn guard_with_shield_blocks_up_to_defense() {
        let mut p = PlayerState::new();
        p.tools.add("light_shield", 1);
        p.equipped_shield = Some("light_shield".into());
        let mut enc = goblin_fight(p, EncounterConfig::instant());
        let res = enc.submit_action(ActionKind::Guard);
        assert!(res.log.iter().any(|l| l.contains("blocks 7")));
        assert_eq!(res.snapshot.player_health, 100);
        assert!(!enc.player().is_guarding);

        // Not guarding: full hit.
        enc.submit_action(ActionKind::Pass);
        assert_eq!(enc.player().health, 93);
    }

    #[test]
    fn defense_potion_absorbs_next_hit_once() {
        let mut p = PlayerState::new();
        p.tools.add("defense_potion", 1);
        let mut enc = goblin_fight(p, EncounterConfig::instant());
        enc.submit_action(ActionKind::UseItem(None));
        assert_eq!(enc.player().health, 100);
        assert_eq!(enc.player().buff_defense, 0);
        enc.submit_action(ActionKind::Pass);
        assert_eq!(enc.player().health, 93);
    }

    #[test]
    fn unknown_weapon_falls_back_to_fists() {
        let mut p = PlayerState::new();
        p.equipped_weapon = Some("laser".into());
        let mut enc = goblin_fight(p, EncounterConfig::default());
        let res = enc.submit_action(ActionKind::Attack);
        assert!(res.log[0].contains("unknown tool 'laser'"));
        assert_eq!(enc.monster().current_health, 47);
    }

    #[test]
    fn talk_does_nothing_but_pass_the_turn() {
        let mut enc = goblin_fight(PlayerState::new(), EncounterConfig::default());
        let res = enc.submit_action(ActionKind::Talk);
        assert!(res.log[0].contains("does not respond"));
        assert_eq!(res.snapshot.monster_health, 50);
        assert_eq!(enc.phase(), BattlePhase::MonsterTurn);
    }

    #[test]
    fn equip_only_on_player_turn() {
        let mut p = PlayerState::new();
        p.tools.add("dagger", 1);
        let mut enc = goblin_fight(p, EncounterConfig::default());
        assert!(enc.equip(EquipSlot::Weapon, "dagger").is_ok());
        assert_eq!(enc.phase(), BattlePhase::PlayerTurn);

        enc.submit_action(ActionKind::Pass);
        let err = enc.unequip(EquipSlot::Weapon).unwrap_err();
        assert!(matches!(err, ArenaError::IllegalAction { .. }));
        assert_eq!(enc.player().equipped_weapon.as_deref(), Some("dagger"));
    }

    #[test]
    fn counter_key_cancels_the_hit() {
        let config = EncounterConfig::instant().with_counter_window(5);
        let mut enc = goblin_fight(PlayerState::new(), config);
        let res = enc.submit_action(ActionKind::Pass);
        assert_eq!(res.snapshot.phase, BattlePhase::CounterWindow);
        let prompt = res.snapshot.counter.unwrap();
        assert_eq!(prompt.attack_name, "Slash");
        assert_eq!(prompt.key, CounterKey::D);
        assert_eq!(prompt.ticks_left, 5);

        assert!(enc.counter_input(CounterKey::S).is_none());
        assert_eq!(enc.phase(), BattlePhase::CounterWindow);

        let res = enc.counter_input(CounterKey::D).unwrap();
        assert_eq!(res.snapshot.phase, BattlePhase::PlayerTurn);
        assert_eq!(res.snapshot.player_health, 100);

        // Window is gone: a second key and the old timeout do nothing.
        assert!(enc.counter_input(CounterKey::D).is_none());
        assert!(enc.tick(10).is_none());
        assert_eq!(enc.player().health, 100);
    }

    #[test]
    fn counter_timeout_hits_once() {
        let config = EncounterConfig::instant().with_counter_window(3);
        let mut enc = goblin_fight(PlayerState::new(), config);
        enc.submit_action(ActionKind::Pass);
        assert!(enc.tick(2).is_none());
        let res = enc.tick(1).unwrap();
        assert!(res.log[0].contains("Too slow"));
        assert_eq!(res.snapshot.player_health, 93);
        assert_eq!(res.snapshot.phase, BattlePhase::PlayerTurn);

        assert!(enc.counter_input(CounterKey::D).is_none());
        assert!(enc.tick(5).is_none());
        assert_eq!(enc.player().health, 93);
    }

    #[test]
    fn counter_window_after_pacing_delay() {
        let config = EncounterConfig::default().with_counter_window(4);
        let mut enc = goblin_fight(PlayerState::new(), config);
        enc.submit_action(ActionKind::Pass);
        let res = enc.tick(6).unwrap();
        assert_eq!(res.snapshot.phase, BattlePhase::CounterWindow);
        assert!(res.log[0].contains("Press [D]"));
    }

    #[test]
    fn abandon_tears_down_timers() {
        let mut enc = goblin_fight(PlayerState::new(), EncounterConfig::default());
        enc.submit_action(ActionKind::Pass);
        let res = enc.abandon();
        assert_eq!(res.terminal, Some(Outcome::Escaped));
        assert!(enc.tick(100).is_none());
        assert_eq!(enc.player().health, 100);
        assert!(enc.abandon().terminal.is_none());
    }

    #[test]
    fn finish_abandons_running_encounter() {
        let mut enc = goblin_fight(PlayerState::new(), EncounterConfig::default());
        enc.submit_action(ActionKind::Attack);
        let p = enc.finish();
        assert_eq!(p.xp, 0);
    }

    #[test]
    fn full_fight_to_victory() {
        let mut p = PlayerState::new();
        p.tools.add("war_axe", 1);
        p.equipped_weapon = Some("war_axe".into());
        let mut enc = goblin_fight(p, EncounterConfig::instant());
        // war axe 30 -> 21 per hit, goblin has 50
        enc.submit_action(ActionKind::Attack);
        enc.submit_action(ActionKind::Attack);
        let res = enc.submit_action(ActionKind::Attack);
        assert_eq!(res.terminal, Some(Outcome::Victory));
        let p = enc.finish();
        assert_eq!(p.health, 86);
        assert_eq!(p.xp, 20);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::games::arena::catalog::all_monsters;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn action_strategy() -> impl Strategy<Value = u8> {
        0u8..8
    }

    proptest! {
        #[test]
        fn prop_health_stays_in_bounds(
            seed in any::<u64>(),
            monster_idx in 0usize..8,
            steps in prop::collection::vec(action_strategy(), 1..60),
            potions in 0u32..4,
        ) {
            let mut p = PlayerState::new();
            p.tools.add("health_potion", potions);
            p.tools.add("defense_potion", potions);
            let template = &all_monsters()[monster_idx % all_monsters().len()];
            let config = EncounterConfig::default().with_counter_window(3);
            let mut enc = Encounter::start(p, template, config, ChaCha8Rng::seed_from_u64(seed));

            for step in steps {
                match step {
                    0 => { enc.submit_action(ActionKind::Attack); }
                    1 => { enc.submit_action(ActionKind::Guard); }
                    2 => { enc.submit_action(ActionKind::UseItem(None)); }
                    3 => { enc.submit_action(ActionKind::Pass); }
                    4 => { enc.counter_input(CounterKey::D); }
                    _ => { enc.tick(step as u32 - 3); }
                }
                let snap = enc.snapshot();
                prop_assert!(snap.player_health <= snap.player_max_health);
                prop_assert!(snap.monster_health <= snap.monster_max_health);
                if enc.phase() != BattlePhase::CounterWindow {
                    prop_assert!(snap.counter.is_none());
                }
            }
        }
    }
}
