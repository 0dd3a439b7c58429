//! Screens driven by the browser loop.

pub mod arena;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent};

/// What `main.rs` needs from a game.
pub trait Game {
    /// Returns true if the event did something.
    fn handle_input(&mut self, event: &InputEvent) -> bool;

    /// Advance by `delta_ticks` fixed ticks.
    fn tick(&mut self, delta_ticks: u32);

    fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>);
}
