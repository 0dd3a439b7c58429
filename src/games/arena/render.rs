//! Dragon Arena rendering.
//!
//! Layout: status bar + screen body + log. Every selectable row goes
//! through `push_choice` so it is both numbered and tappable.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{ClickableList, TabBar};

use super::actions::*;
use super::catalog::{CounterKey, ToolKind, ALL_LOCATIONS};
use super::save::PlayerStore;
use super::state::{BattlePhase, EquipSlot, Outcome, Snapshot};
use super::store::{can_buy, price_of, sell_price};
use super::{ArenaGame, Screen, StoreTab, BATTLE_MENU, TOOL_KINDS};

pub fn render<S: PlayerStore>(
    game: &ArenaGame<S>,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let narrow = is_narrow_layout(area.width);
    let log_h: u16 = if narrow { 6 } else { 9 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(8), Constraint::Length(log_h)])
        .split(area);

    render_status(game, f, chunks[0]);
    match game.screen {
        Screen::Town => render_town(game, f, chunks[1], click_state),
        Screen::Store => render_store(game, f, chunks[1], click_state),
        Screen::Gear | Screen::BattleGear => render_gear(game, f, chunks[1], click_state),
        Screen::Battle => render_battle(game, f, chunks[1], click_state),
        Screen::BattleItems => render_items(game, f, chunks[1], click_state),
        Screen::Aftermath => render_aftermath(game, f, chunks[1], click_state),
    }
    render_log(game, f, chunks[2]);
}

// ── Helpers ───────────────────────────────────────────────────

fn hp_bar(current: u32, max: u32, width: usize) -> (String, Color) {
    let ratio = if max > 0 { current as f64 / max as f64 } else { 0.0 };
    let filled = ((ratio * width as f64).round() as usize).min(width);
    let bar = "\u{2588}".repeat(filled) + &"\u{2591}".repeat(width - filled);
    let color = if ratio > 0.5 {
        Color::Green
    } else if ratio > 0.25 {
        Color::Yellow
    } else {
        Color::Red
    };
    (bar, color)
}

fn borders_for(width: u16) -> Borders {
    if is_narrow_layout(width) { Borders::TOP | Borders::BOTTOM } else { Borders::ALL }
}

fn panel(title: &str, width: u16, color: Color) -> Block<'static> {
    Block::default()
        .borders(borders_for(width))
        .border_style(Style::default().fg(color))
        .title(Span::styled(format!(" {} ", title), Style::default().fg(color)))
}

/// A numbered, tappable row: ` [key] label`.
fn push_choice(cl: &mut ClickableList<'static>, key: &str, label: String, action_id: u16, enabled: bool) {
    let (key_style, text_style) = if enabled {
        (Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD), Style::default().fg(Color::White))
    } else {
        (Style::default().fg(Color::DarkGray), Style::default().fg(Color::DarkGray))
    };
    cl.push_clickable(
        Line::from(vec![Span::styled(format!(" [{}] ", key), key_style), Span::styled(label, text_style)]),
        action_id,
    );
}

fn push_heading(cl: &mut ClickableList<'static>, text: String) {
    cl.push(Line::from(Span::styled(text, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))));
}

fn push_note(cl: &mut ClickableList<'static>, text: String) {
    cl.push(Line::from(Span::styled(text, Style::default().fg(Color::DarkGray))));
}

fn finish_list(cl: ClickableList<'static>, block: Block<'static>, f: &mut Frame, area: Rect, cs: &Rc<RefCell<ClickState>>) {
    let top = if block.inner(area).y > area.y { 1 } else { 0 };
    let bottom = if block.inner(area).bottom() < area.bottom() { 1 } else { 0 };
    cl.register_targets(area, &mut cs.borrow_mut(), top, bottom, 0, 0);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

fn counter_action(key: CounterKey) -> u16 {
    match key {
        CounterKey::D => COUNTER_D,
        CounterKey::S => COUNTER_S,
        CounterKey::Up => COUNTER_UP,
        CounterKey::Left => COUNTER_LEFT,
        CounterKey::Right => COUNTER_RIGHT,
    }
}

// ── Status ────────────────────────────────────────────────────

fn render_status<S: PlayerStore>(game: &ArenaGame<S>, f: &mut Frame, area: Rect) {
    let p = game.player();
    let line = Line::from(vec![
        Span::styled(format!(" Lv {} ", p.level), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::styled(format!("HP {}/{} ", p.health, p.max_health), Style::default().fg(Color::Green)),
        Span::styled(format!("XP {}/{} ", p.xp, p.xp_to_next()), Style::default().fg(Color::Magenta)),
        Span::styled(format!("AGI {} ", p.agility), Style::default().fg(Color::White)),
        Span::styled(format!("{}", p.coins), Style::default().fg(Color::Yellow)),
    ]);
    f.render_widget(
        Paragraph::new(line).block(panel("Dragon Arena", area.width, Color::DarkGray)),
        area,
    );
}

// ── Town ──────────────────────────────────────────────────────

fn render_town<S: PlayerStore>(game: &ArenaGame<S>, f: &mut Frame, area: Rect, cs: &Rc<RefCell<ClickState>>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(4)])
        .split(area);

    let mut tabs = TabBar::new("│");
    for (i, loc) in ALL_LOCATIONS.iter().enumerate() {
        let style = if *loc == game.location {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };
        tabs = tabs.tab(loc.name(), style, LOCATION_TAB_BASE + i as u16);
    }
    tabs.render(f, chunks[0], &mut cs.borrow_mut());

    let mut cl = ClickableList::new();
    push_heading(&mut cl, format!(" Monsters in the {}", game.location.name()));
    for (i, m) in game.location_monsters().iter().enumerate() {
        push_choice(
            &mut cl,
            &(i + 1).to_string(),
            format!("{}  power {}  agility {}  +{} xp  {}", m.name, m.power, m.agility, m.xp_reward, m.coin_reward),
            FIGHT_BASE + i as u16,
            true,
        );
    }
    cl.push(Line::from(""));
    push_choice(&mut cl, "R", "Random encounter".into(), RANDOM_FIGHT, true);
    push_choice(&mut cl, "L", "Next location".into(), LOCATION_TAB_BASE + next_location_index(game), true);
    push_choice(&mut cl, "S", "Store".into(), OPEN_STORE, true);
    push_choice(&mut cl, "G", "Gear".into(), OPEN_GEAR, true);
    let mode = if game.counter_mode { "on" } else { "off" };
    push_choice(&mut cl, "C", format!("Counter mode: {}", mode), TOGGLE_COUNTER_MODE, true);

    finish_list(cl, panel("Town", area.width, Color::Green), f, chunks[1], cs);
}

fn next_location_index<S: PlayerStore>(game: &ArenaGame<S>) -> u16 {
    let i = ALL_LOCATIONS.iter().position(|l| *l == game.location).unwrap_or(0);
    ((i + 1) % ALL_LOCATIONS.len()) as u16
}

// ── Store ─────────────────────────────────────────────────────

fn render_store<S: PlayerStore>(game: &ArenaGame<S>, f: &mut Frame, area: Rect, cs: &Rc<RefCell<ClickState>>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(4)])
        .split(area);

    let active = Style::default().fg(Color::Black).bg(Color::Yellow);
    let idle = Style::default().fg(Color::Gray);
    let (buy_style, sell_style) = match game.store_tab {
        StoreTab::Buy => (active, idle),
        StoreTab::Sell => (idle, active),
    };
    TabBar::new(" │ ")
        .tab("Buy", buy_style, STORE_BUY_TAB)
        .tab("Sell", sell_style, STORE_SELL_TAB)
        .render(f, chunks[0], &mut cs.borrow_mut());

    let mut cl = ClickableList::new();
    match game.store_tab {
        StoreTab::Buy => {
            let mut kinds = TabBar::new("│");
            for (i, kind) in TOOL_KINDS.iter().enumerate() {
                let style = if *kind == game.tool_kind { active } else { idle };
                kinds = kinds.tab(kind.label(), style, KIND_TAB_BASE + i as u16);
            }
            kinds.render(f, chunks[1], &mut cs.borrow_mut());

            let p = game.player();
            for (i, tool) in game.tools_of_kind().iter().enumerate() {
                let owned = p.tools.count(tool.id);
                let stat = match tool.kind {
                    ToolKind::Offense => format!("power {}", tool.power),
                    ToolKind::Defense | ToolKind::Armor => format!("defense {}", tool.guard_defense()),
                    ToolKind::Potion => describe_effect(tool.effect.heal, tool.effect.power, tool.effect.agility, tool.effect.defense),
                };
                let label = format!("{}  {}  {}  (own {})", tool.name, stat, price_of(tool, &game.store_config), owned);
                push_choice(&mut cl, &(i + 1).to_string(), label, BUY_BASE + i as u16, can_buy(p, tool, &game.store_config));
            }
        }
        StoreTab::Sell => {
            let owned = game.owned_tools();
            if owned.is_empty() {
                push_note(&mut cl, " Nothing to sell.".into());
            }
            for (i, (tool, count)) in owned.iter().enumerate() {
                let label = format!("{} x{}  sells for {}", tool.name, count, sell_price(tool));
                push_choice(&mut cl, &(i + 1).to_string(), label, SELL_BASE + i as u16, true);
            }
            cl.push(Line::from(""));
            push_choice(&mut cl, "X", "Sell everything".into(), SELL_ALL, !owned.is_empty());
        }
    }
    cl.push(Line::from(""));
    push_choice(&mut cl, "Q", "Back to town".into(), BACK, true);

    finish_list(cl, panel("Store", area.width, Color::Yellow), f, chunks[2], cs);
}

fn describe_effect(heal: u32, power: u32, agility: u32, defense: u32) -> String {
    let parts: Vec<String> = [("heal", heal), ("power", power), ("agility", agility), ("absorb", defense)]
        .iter()
        .filter(|(_, v)| *v > 0)
        .map(|(k, v)| format!("{} +{}", k, v))
        .collect();
    parts.join(" ")
}

// ── Gear ──────────────────────────────────────────────────────

fn render_gear<S: PlayerStore>(game: &ArenaGame<S>, f: &mut Frame, area: Rect, cs: &Rc<RefCell<ClickState>>) {
    let p = game.player();
    let mut cl = ClickableList::new();
    for (slot, name) in [(EquipSlot::Weapon, "Weapon"), (EquipSlot::Shield, "Shield"), (EquipSlot::Armor, "Armor")] {
        push_note(&mut cl, format!(" {:<7} {}", name, p.slot(slot).unwrap_or("-")));
    }
    cl.push(Line::from(""));

    let gear = game.owned_gear();
    if gear.is_empty() {
        push_note(&mut cl, " No gear. Visit the store.".into());
    }
    for (i, tool) in gear.iter().enumerate() {
        let worn = EquipSlot::for_kind(tool.kind).map(|s| p.slot(s) == Some(tool.id)).unwrap_or(false);
        let mark = if worn { "*" } else { " " };
        let label = format!("{}{} ({})", mark, tool.name, tool.kind.label());
        push_choice(&mut cl, &(i + 1).to_string(), label, GEAR_BASE + i as u16, true);
    }
    cl.push(Line::from(""));
    push_choice(&mut cl, "Q", "Back".into(), BACK, true);

    finish_list(cl, panel("Gear", area.width, Color::Blue), f, area, cs);
}

// ── Battle ────────────────────────────────────────────────────

fn render_combatants(snap: &Snapshot, f: &mut Frame, area: Rect) {
    let bar_w = (area.width as usize).saturating_sub(24).clamp(5, 30);
    let (m_bar, m_color) = hp_bar(snap.monster_health, snap.monster_max_health, bar_w);
    let (p_bar, p_color) = hp_bar(snap.player_health, snap.player_max_health, bar_w);

    let mut flags = Vec::new();
    if snap.is_guarding {
        flags.push("guarding".to_string());
    }
    if snap.buff_power > 0 {
        flags.push(format!("+{} power", snap.buff_power));
    }
    if snap.buff_defense > 0 {
        flags.push(format!("absorb {}", snap.buff_defense));
    }

    let lines = vec![
        Line::from(vec![
            Span::styled(format!(" {:<10}", snap.monster_name), Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::styled(m_bar, Style::default().fg(m_color)),
            Span::raw(format!(" {}/{}", snap.monster_health, snap.monster_max_health)),
        ]),
        Line::from(vec![
            Span::styled(format!(" {:<10}", "You"), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::styled(p_bar, Style::default().fg(p_color)),
            Span::raw(format!(" {}/{}", snap.player_health, snap.player_max_health)),
        ]),
        Line::from(Span::styled(format!(" {}", flags.join(", ")), Style::default().fg(Color::DarkGray))),
    ];
    f.render_widget(Paragraph::new(lines).block(panel("Battle", area.width, Color::Red)), area);
}

fn render_battle<S: PlayerStore>(game: &ArenaGame<S>, f: &mut Frame, area: Rect, cs: &Rc<RefCell<ClickState>>) {
    let Some(enc) = game.encounter() else {
        return;
    };
    let snap = enc.snapshot();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(4)])
        .split(area);
    render_combatants(&snap, f, chunks[0]);

    let mut cl = ClickableList::new();
    match (snap.phase, &snap.counter) {
        (BattlePhase::CounterWindow, Some(prompt)) => {
            push_heading(&mut cl, format!(" {} incoming! {:.1}s", prompt.attack_name, prompt.ticks_left as f64 / 10.0));
            for key in [CounterKey::D, CounterKey::S, CounterKey::Up, CounterKey::Left, CounterKey::Right] {
                push_choice(&mut cl, key.label(), "Counter".into(), counter_action(key), true);
            }
        }
        (BattlePhase::PlayerTurn, _) => {
            for (key, label, id) in BATTLE_MENU.iter() {
                push_choice(&mut cl, &key.to_ascii_uppercase().to_string(), label.to_string(), *id, true);
            }
        }
        _ => push_note(&mut cl, format!(" The {} is moving...", snap.monster_name)),
    }

    finish_list(cl, panel("Actions", area.width, Color::Yellow), f, chunks[1], cs);
}

fn render_items<S: PlayerStore>(game: &ArenaGame<S>, f: &mut Frame, area: Rect, cs: &Rc<RefCell<ClickState>>) {
    let mut cl = ClickableList::new();
    let potions = game.usable_potions();
    if potions.is_empty() {
        push_note(&mut cl, " No potions.".into());
    }
    for (i, (tool, count)) in potions.iter().enumerate() {
        let fx = tool.effect;
        let label = format!("{} x{}  {}", tool.name, count, describe_effect(fx.heal, fx.power, fx.agility, fx.defense));
        push_choice(&mut cl, &(i + 1).to_string(), label, ITEM_BASE + i as u16, true);
    }
    cl.push(Line::from(""));
    push_choice(&mut cl, "Q", "Back".into(), BACK, true);
    finish_list(cl, panel("Items", area.width, Color::Magenta), f, area, cs);
}

fn render_aftermath<S: PlayerStore>(game: &ArenaGame<S>, f: &mut Frame, area: Rect, cs: &Rc<RefCell<ClickState>>) {
    let mut cl = ClickableList::new();
    let (title, color) = match game.outcome {
        Some(Outcome::Victory) => ("Victory!", Color::Yellow),
        Some(Outcome::Defeat) => ("Defeated...", Color::Red),
        Some(Outcome::Escaped) | None => ("You got away.", Color::Gray),
    };
    cl.push(Line::from(""));
    cl.push(Line::from(Span::styled(format!(" {}", title), Style::default().fg(color).add_modifier(Modifier::BOLD))));
    if let Some(reward) = game.encounter().and_then(|e| e.reward()) {
        push_note(&mut cl, format!(" +{} xp, {}", reward.xp, reward.coins));
    }
    cl.push(Line::from(""));
    push_choice(&mut cl, "Enter", "Back to town".into(), CONTINUE, true);
    finish_list(cl, panel("Result", area.width, color), f, area, cs);
}

// ── Log ───────────────────────────────────────────────────────

fn render_log<S: PlayerStore>(game: &ArenaGame<S>, f: &mut Frame, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = game
        .log
        .tail(visible)
        .map(|l| Line::from(Span::styled(format!(" {}", l), Style::default().fg(Color::Gray))))
        .collect();
    f.render_widget(
        Paragraph::new(lines).block(panel("Log", area.width, Color::DarkGray)).wrap(Wrap { trim: false }),
        area,
    );
}
