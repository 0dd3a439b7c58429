//! Widgets that render and register their own click targets in one go.
//!
//! - [`TabBar`]: one row of tabs.
//! - [`ClickableList`]: lines where some rows are buttons.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::{Color, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::ClickState;

// ── TabBar ────────────────────────────────────────────────────

/// Tabs separated by a fixed string. Click targets follow the rendered
/// label widths, so dynamic labels stay tappable.
///
/// ```ignore
/// TabBar::new(" │ ")
///     .tab("Buy", buy_style, STORE_BUY_TAB)
///     .tab("Sell", sell_style, STORE_SELL_TAB)
///     .render(f, area, &mut cs);
/// ```
pub struct TabBar<'a> {
    tabs: Vec<(String, Style, u16)>,
    separator: &'a str,
}

impl<'a> TabBar<'a> {
    pub fn new(separator: &'a str) -> Self {
        Self { tabs: Vec::new(), separator }
    }

    pub fn tab(mut self, label: impl Into<String>, style: Style, action_id: u16) -> Self {
        self.tabs.push((label.into(), style, action_id));
        self
    }

    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        let sep_width = Line::from(self.separator).width() as u16;
        let mut spans = Vec::new();
        let mut widths = Vec::new();

        for (i, (label, style, action_id)) in self.tabs.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(self.separator, Style::default().fg(Color::DarkGray)));
            }
            let padded = format!(" {} ", label);
            widths.push((Line::from(padded.as_str()).width() as u16, action_id));
            spans.push(Span::styled(padded, style));
        }

        f.render_widget(Paragraph::new(Line::from(spans)), area);
        cs.register_tab_targets(&widths, sep_width, area.x, area.y, area.width, area.height.max(1));
    }
}

// ── ClickableList ─────────────────────────────────────────────

/// Lines paired with click actions. Push lines in display order, then call
/// [`register_targets`](ClickableList::register_targets) once with the
/// area they are drawn into; row arithmetic is handled here.
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line index, action id)`
    actions: Vec<(u16, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self { lines: Vec::new(), actions: Vec::new() }
    }

    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    /// A line that triggers `action_id` when tapped, wherever it ends up.
    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        self.actions.push((self.lines.len() as u16, action_id));
        self.lines.push(line);
    }

    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Register targets for every clickable line.
    ///
    /// `top`/`bottom` are the rows taken by borders, `scroll` the paragraph
    /// scroll in visual rows. With `wrap_width > 0` lines are measured the way
    /// a wrapping `Paragraph` lays them out and every visual row they cover
    /// is clickable; with `0` each line is one row.
    pub fn register_targets(
        &self,
        area: Rect,
        cs: &mut ClickState,
        top: u16,
        bottom: u16,
        scroll: u16,
        wrap_width: u16,
    ) {
        let first_row = area.y + top;
        let end_row = area.y + area.height.saturating_sub(bottom);

        let mut starts = Vec::with_capacity(self.lines.len());
        let mut heights = Vec::with_capacity(self.lines.len());
        let mut cursor = 0u16;
        for line in &self.lines {
            let h = match wrap_width {
                0 => 1,
                w => Paragraph::new(line.clone()).wrap(Wrap { trim: false }).line_count(w).max(1) as u16,
            };
            starts.push(cursor);
            heights.push(h);
            cursor += h;
        }

        for &(idx, action_id) in &self.actions {
            let idx = idx as usize;
            for visual in starts[idx]..starts[idx] + heights[idx] {
                if visual < scroll {
                    continue;
                }
                let row = first_row + (visual - scroll);
                if row >= end_row {
                    break;
                }
                cs.add_row_target(area, row, action_id);
            }
        }
    }
}
