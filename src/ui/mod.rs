//! Single-screen interactive advisor.
//!
//! The screen re-derives bounds and recommendation from the pure query
//! layer on every interaction; the only state kept here is widget state
//! (selection, chosen target, scroll offsets).

use std::io::stdout;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Row, Table},
    Frame, Terminal,
};

use crate::core::recommend::{recommend, release_bounds, sorted_by_valve_size, ReleaseBounds};
use crate::domain::model::{Measurement, MeasurementTable};
use crate::utils::error::Result;

/// Left/Right sweep the target across the subset range in this many steps.
const TARGET_STEPS: f64 = 20.0;
const PAGE_STEPS: f64 = 4.0;

pub struct AdvisorApp {
    table: MeasurementTable,
    volume_types: Vec<String>,
    selected_type: usize,
    target: f64,
    show_table: bool,
    table_scroll: usize,
    should_quit: bool,
    show_help: bool,
}

impl AdvisorApp {
    pub fn new(table: MeasurementTable) -> Self {
        let volume_types: Vec<String> =
            table.volume_types().into_iter().map(String::from).collect();
        let mut app = Self {
            table,
            volume_types,
            selected_type: 0,
            target: 0.0,
            show_table: false,
            table_scroll: 0,
            should_quit: false,
            show_help: false,
        };
        app.reset_target();
        app
    }

    fn selected_volume_type(&self) -> Option<&str> {
        self.volume_types.get(self.selected_type).map(String::as_str)
    }

    fn subset(&self) -> Vec<&Measurement> {
        match self.selected_volume_type() {
            Some(volume_type) => self.table.filter_by_type(volume_type),
            None => Vec::new(),
        }
    }

    fn bounds(&self) -> Option<ReleaseBounds> {
        release_bounds(&self.subset())
    }

    /// New selection starts at the subset minimum, like the original
    /// slider default.
    fn reset_target(&mut self) {
        self.target = self.bounds().map(|b| b.min).unwrap_or(0.0);
        self.table_scroll = 0;
    }

    fn select_prev_type(&mut self) {
        if self.selected_type > 0 {
            self.selected_type -= 1;
            self.reset_target();
        }
    }

    fn select_next_type(&mut self) {
        if self.selected_type + 1 < self.volume_types.len() {
            self.selected_type += 1;
            self.reset_target();
        }
    }

    fn step_target(&mut self, steps: f64) {
        let Some(bounds) = self.bounds() else {
            return;
        };
        if bounds.is_fixed() {
            // single release value: the target stays pinned
            return;
        }
        let step = (bounds.max - bounds.min) / TARGET_STEPS;
        self.target = bounds.clamp(self.target + steps * step);
    }

    fn jump_target_min(&mut self) {
        if let Some(bounds) = self.bounds() {
            self.target = bounds.min;
        }
    }

    fn jump_target_max(&mut self) {
        if let Some(bounds) = self.bounds() {
            self.target = bounds.max;
        }
    }

    fn toggle_table(&mut self) {
        self.show_table = !self.show_table;
        self.table_scroll = 0;
    }

    fn scroll_table(&mut self, delta: i64) {
        if !self.show_table {
            return;
        }
        let len = self.subset().len();
        let max_scroll = len.saturating_sub(1);
        let next = self.table_scroll as i64 + delta;
        self.table_scroll = next.clamp(0, max_scroll as i64) as usize;
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.show_help {
            // any key dismisses help
            self.show_help = false;
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Up => self.select_prev_type(),
            KeyCode::Down => self.select_next_type(),
            KeyCode::Left | KeyCode::Char('h') => self.step_target(-1.0),
            KeyCode::Right | KeyCode::Char('l') => self.step_target(1.0),
            KeyCode::PageUp => self.step_target(PAGE_STEPS),
            KeyCode::PageDown => self.step_target(-PAGE_STEPS),
            KeyCode::Home => self.jump_target_min(),
            KeyCode::End => self.jump_target_max(),
            KeyCode::Char('t') | KeyCode::Enter => self.toggle_table(),
            KeyCode::Char('j') => self.scroll_table(1),
            KeyCode::Char('k') => self.scroll_table(-1),
            _ => {}
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(area);

        self.draw_title(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_status(frame, chunks[2]);

        if self.show_help {
            self.draw_help(frame, area);
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let title = Line::from(vec![
            Span::styled(
                " Blowdown Valve Size Advisor ",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("({} measurements)", self.table.len()),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(Paragraph::new(title), area);
    }

    fn draw_body(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::horizontal([Constraint::Length(26), Constraint::Min(30)]).split(area);
        self.draw_type_selector(frame, columns[0]);

        let right = if self.show_table {
            Layout::vertical([
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Min(4),
            ])
            .split(columns[1])
        } else {
            Layout::vertical([
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Length(0),
            ])
            .split(columns[1])
        };

        self.draw_target_gauge(frame, right[0]);
        self.draw_recommendation(frame, right[1]);
        if self.show_table {
            self.draw_data_table(frame, right[2]);
        }
    }

    fn draw_type_selector(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .volume_types
            .iter()
            .map(|t| ListItem::new(t.as_str()))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Volume Type"))
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(self.selected_type));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_target_gauge(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Target Release (MCF)");

        match self.bounds() {
            Some(bounds) if !bounds.is_fixed() => {
                let span = bounds.max - bounds.min;
                let ratio = ((self.target - bounds.min) / span).clamp(0.0, 1.0);
                let gauge = Gauge::default()
                    .block(block)
                    .gauge_style(Style::default().fg(Color::Cyan))
                    .ratio(ratio)
                    .label(format!(
                        "{} MCF  [{} .. {}]",
                        fmt_num(self.target),
                        fmt_num(bounds.min),
                        fmt_num(bounds.max)
                    ));
                frame.render_widget(gauge, area);
            }
            Some(bounds) => {
                let text = Line::from(Span::styled(
                    format!(
                        "⚠️ Only one release volume available: fixed at {} MCF",
                        fmt_num(bounds.min)
                    ),
                    Style::default().fg(Color::Yellow),
                ));
                frame.render_widget(Paragraph::new(text).block(block), area);
            }
            None => {
                let text = Line::from(Span::styled(
                    "No records for this volume type",
                    Style::default().fg(Color::Yellow),
                ));
                frame.render_widget(Paragraph::new(text).block(block), area);
            }
        }
    }

    fn draw_recommendation(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Recommendation");
        let subset = self.subset();

        let lines = match recommend(&subset, self.target) {
            Some(rec) => vec![
                Line::from(Span::styled(
                    format!("✅ Recommended Valve Size: {} in", fmt_num(rec.valve_size_in)),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("⏱️ Expected Duration: {} seconds", fmt_num(rec.duration_s)),
                    Style::default().fg(Color::Cyan),
                )),
                Line::from(Span::styled(
                    format!("📦 Actual Release Volume: {} MCF", fmt_num(rec.release_mcf)),
                    Style::default().fg(Color::Cyan),
                )),
            ],
            None => vec![Line::from(Span::styled(
                "⚠️ No suitable valve size found for the selected volume type and target release.",
                Style::default().fg(Color::Yellow),
            ))],
        };

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_data_table(&self, frame: &mut Frame, area: Rect) {
        let subset = self.subset();
        let sorted = sorted_by_valve_size(&subset);
        let recommended = recommend(&subset, self.target);

        let header = Row::new(vec!["Valve Size [in]", "Duration [s]", "Release [MCF]"])
            .style(Style::default().add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = sorted
            .iter()
            .skip(self.table_scroll)
            .map(|m| {
                let row = Row::new(vec![
                    fmt_num(m.valve_size_in),
                    fmt_num(m.duration_s),
                    fmt_num(m.release_mcf),
                ]);
                match recommended {
                    Some(rec) if std::ptr::eq(*m, rec) => {
                        row.style(Style::default().fg(Color::Green))
                    }
                    _ => row,
                }
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(16),
                Constraint::Length(14),
                Constraint::Length(14),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Data Table ({} records)", sorted.len())),
        );

        frame.render_widget(table, area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let hint = if self.show_table {
            " ↑/↓ type  ←/→ target  Home/End min/max  j/k scroll  t hide table  ? help  q quit"
        } else {
            " ↑/↓ type  ←/→ target  Home/End min/max  t show table  ? help  q quit"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray))),
            area,
        );
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let width = 52.min(area.width);
        let height = 12.min(area.height);
        let popup = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );

        let lines = vec![
            Line::from("Up/Down      select volume type"),
            Line::from("Left/Right   adjust target release"),
            Line::from("PgUp/PgDn    adjust in larger steps"),
            Line::from("Home/End     jump to min/max release"),
            Line::from("t / Enter    toggle the data table"),
            Line::from("j/k          scroll the data table"),
            Line::from("q / Esc      quit"),
            Line::from(""),
            Line::from("Any key closes this help."),
        ];

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Keys")),
            popup,
        );
    }
}

/// Run the interactive advisor over a loaded table.
pub fn run(table: MeasurementTable) -> Result<()> {
    let app = AdvisorApp::new(table);
    run_app(app)
}

fn run_app(mut app: AdvisorApp) -> Result<()> {
    terminal::enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Trim integral floats for display: 2.0 prints as "2", 2.5 stays "2.5".
pub fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Measurement;

    fn m(volume_type: &str, valve_size_in: f64, duration_s: f64, release_mcf: f64) -> Measurement {
        Measurement {
            volume_type: volume_type.to_string(),
            valve_size_in,
            duration_s,
            release_mcf,
        }
    }

    fn app() -> AdvisorApp {
        AdvisorApp::new(MeasurementTable::new(vec![
            m("Tank", 2.0, 10.0, 5.0),
            m("Tank", 3.0, 15.0, 8.0),
            m("Flare", 1.0, 5.0, 3.0),
            m("Flare", 2.0, 9.0, 3.0),
        ]))
    }

    #[test]
    fn starts_at_first_type_and_minimum_release() {
        let app = app();
        assert_eq!(app.selected_volume_type(), Some("Tank"));
        assert_eq!(app.target, 5.0);
    }

    #[test]
    fn selection_change_resets_target_to_new_minimum() {
        let mut app = app();
        app.jump_target_max();
        assert_eq!(app.target, 8.0);

        app.select_next_type();
        assert_eq!(app.selected_volume_type(), Some("Flare"));
        assert_eq!(app.target, 3.0);
    }

    #[test]
    fn selection_clamps_at_both_ends() {
        let mut app = app();
        app.select_prev_type();
        assert_eq!(app.selected_type, 0);
        app.select_next_type();
        app.select_next_type();
        assert_eq!(app.selected_volume_type(), Some("Flare"));
    }

    #[test]
    fn target_steps_stay_inside_bounds() {
        let mut app = app();
        for _ in 0..100 {
            app.step_target(1.0);
        }
        assert_eq!(app.target, 8.0);
        for _ in 0..100 {
            app.step_target(-1.0);
        }
        assert_eq!(app.target, 5.0);
    }

    #[test]
    fn fixed_bounds_pin_the_target() {
        let mut app = app();
        app.select_next_type();
        // Flare has a single unique release value
        assert!(app.bounds().unwrap().is_fixed());
        app.step_target(1.0);
        assert_eq!(app.target, 3.0);
    }

    #[test]
    fn table_scroll_clamps_to_subset() {
        let mut app = app();
        app.toggle_table();
        app.scroll_table(100);
        assert_eq!(app.table_scroll, 1);
        app.scroll_table(-100);
        assert_eq!(app.table_scroll, 0);
    }

    #[test]
    fn quit_keys_set_the_flag() {
        let mut app = app();
        app.handle_key(KeyEvent::from(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn number_formatting_trims_integral_values() {
        assert_eq!(fmt_num(2.0), "2");
        assert_eq!(fmt_num(2.5), "2.5");
        assert_eq!(fmt_num(0.0), "0");
    }
}
