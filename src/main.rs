mod console;
mod games;
mod input;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use games::arena::ArenaGame;
use games::Game;
use input::{pixel_x_to_col, pixel_y_to_row, Arrow, ClickState, InputEvent};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use time::{GameTime, TICKS_PER_SEC};

#[cfg(target_arch = "wasm32")]
type Store = games::arena::save::LocalStorageStore;
#[cfg(not(target_arch = "wasm32"))]
type Store = games::arena::save::MemoryStore;

#[cfg(target_arch = "wasm32")]
fn open_store() -> Store {
    games::arena::save::LocalStorageStore
}

#[cfg(not(target_arch = "wasm32"))]
fn open_store() -> Store {
    games::arena::save::MemoryStore::default()
}

/// Convert a pointer position to a terminal cell using the grid container's
/// bounding rect.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let col = pixel_x_to_col(mouse_x as f64 - rect.left(), rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(mouse_y as f64 - rect.top(), rect.height(), cs.terminal_rows)?;
    Some((col, row))
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let seed = js_sys::Date::now() as u64;
    let game: Rc<RefCell<Box<dyn Game>>> =
        Rc::new(RefCell::new(Box::new(ArenaGame::new(open_store(), seed))));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let clock = Rc::new(RefCell::new(GameTime::new(TICKS_PER_SEC)));

    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;
    console::log(&format!("started, seed {seed}"));

    // Mouse/touch
    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let action = {
                let cs = click_state.borrow();
                if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                    return;
                }
                dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs)
                    .and_then(|(col, row)| cs.hit_test(col, row))
            };

            if let Some(id) = action {
                game.borrow_mut().handle_input(&InputEvent::Click(id));
            }
        }
    });

    // Keyboard
    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            let event = match key_event.code {
                KeyCode::Char(c) => InputEvent::Key(c.to_ascii_lowercase()),
                KeyCode::Enter => InputEvent::Key('\n'),
                KeyCode::Esc => InputEvent::Key('q'),
                KeyCode::Up => InputEvent::Arrow(Arrow::Up),
                KeyCode::Down => InputEvent::Arrow(Arrow::Down),
                KeyCode::Left => InputEvent::Arrow(Arrow::Left),
                KeyCode::Right => InputEvent::Arrow(Arrow::Right),
                _ => return,
            };
            game.borrow_mut().handle_input(&event);
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            let delta = clock.borrow_mut().update(now_ms());
            if delta > 0 {
                game.borrow_mut().tick(delta);
            }

            let size = f.area();
            {
                let mut cs = click_state.borrow_mut();
                cs.terminal_cols = size.width;
                cs.terminal_rows = size.height;
                cs.clear_targets();
            }

            game.borrow().render(f, size, &click_state);
        }
    });

    Ok(())
}
