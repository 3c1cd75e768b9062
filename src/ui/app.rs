use std::mem;

use chrono::{Local, NaiveDate};
use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap,
};
use ratatui::Frame;
use tracing::{info, warn};

use crate::client::BrewBackend;
use crate::models::{BrewField, Suggestions};

use super::forms::BrewForm;
use super::helpers::{scroll_offset, truncate};
use super::screens::{detail_rows, summary_line, table_columns, ListScreen, ListView};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Upper bound for a table column so one long note cannot eat the screen.
const MAX_COLUMN_WIDTH: usize = 24;
/// Lower bound so short labels still leave room for typical values.
const MIN_COLUMN_WIDTH: usize = 8;

/// Whether the user is browsing the log or filling in a new brew. The form
/// owns its draft; leaving the form drops it.
enum Mode {
    Browsing,
    Editing(BrewForm),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    backend: Box<dyn BrewBackend>,
    list: ListScreen,
    mode: Mode,
    suggestions: Suggestions,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the app and fetch the list once so the first frame has data.
    pub fn new(backend: Box<dyn BrewBackend>) -> Self {
        let mut app = Self {
            backend,
            list: ListScreen::new(Vec::new(), ListView::Collapsible),
            mode: Mode::Browsing,
            suggestions: Suggestions::new(),
            status: None,
        };
        app.reload_list();
        app
    }

    /// Apply one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Browsing);

        self.mode = match mode {
            Mode::Browsing => self.handle_list_key(code, &mut exit),
            Mode::Editing(form) => self.handle_form_key(code, form),
        };

        exit
    }

    /// Ctrl+S saves from anywhere inside the form.
    pub fn handle_ctrl_s(&mut self) {
        if let Mode::Editing(form) = mem::replace(&mut self.mode, Mode::Browsing) {
            self.mode = self.submit(form);
        }
    }

    fn handle_list_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Char('n') => return self.open_form(Local::now().date_naive()),
            KeyCode::Char('v') => self.list.toggle_view(),
            KeyCode::Char('r') => {
                if self.reload_list() {
                    self.set_status("Reloaded.", StatusKind::Info);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.list.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.list.move_selection(1),
            KeyCode::Left | KeyCode::Char('h') => self.list.scroll_columns(-1),
            KeyCode::Right | KeyCode::Char('l') => self.list.scroll_columns(1),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if self.list.view == ListView::Collapsible {
                    self.list.toggle_expanded();
                }
            }
            _ => {}
        }
        Mode::Browsing
    }

    fn handle_form_key(&mut self, code: KeyCode, mut form: BrewForm) -> Mode {
        match code {
            KeyCode::Esc => {
                if !form.cancel_autocomplete() {
                    self.set_status("New brew discarded.", StatusKind::Info);
                    return Mode::Browsing;
                }
            }
            KeyCode::Tab => {
                let consumed = form.has_active_suggestion() && form.accept_suggestion();
                if !consumed {
                    form.next_field();
                }
            }
            KeyCode::Right => {
                form.accept_suggestion();
            }
            KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => return self.submit(form),
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        form.update_suggestion(&self.suggestions);
        Mode::Editing(form)
    }

    /// Open the form on a fresh draft. Suggestions are refreshed each time;
    /// if they cannot be loaded the form still opens without hints.
    fn open_form(&mut self, today: NaiveDate) -> Mode {
        match self.backend.suggestions() {
            Ok(suggestions) => self.suggestions = suggestions,
            Err(err) => {
                warn!("could not load suggestions: {err}");
                self.suggestions.clear();
            }
        }
        self.clear_status();
        Mode::Editing(BrewForm::new(today))
    }

    /// Validate locally, then hand the draft to the backend. Any rejection
    /// keeps the form open with its draft intact.
    fn submit(&mut self, form: BrewForm) -> Mode {
        let payload = match form.submission() {
            Ok(payload) => payload,
            Err(err) => return self.reject(form, err.to_string()),
        };

        match self.backend.create(&payload) {
            Ok(brew) => {
                info!(id = brew.id, "saved brew");
                if self.reload_list() {
                    self.set_status(
                        format!("Saved brew #{} ({}).", brew.id, brew.fields.coffee),
                        StatusKind::Info,
                    );
                }
                Mode::Browsing
            }
            Err(err) => self.reject(form, err.to_string()),
        }
    }

    fn reject(&mut self, mut form: BrewForm, message: String) -> Mode {
        form.error = Some(message.clone());
        self.set_status(message, StatusKind::Error);
        Mode::Editing(form)
    }

    /// Refetch the list, keeping the chosen view. Returns `false` (with an
    /// error in the footer) when the backend fails.
    fn reload_list(&mut self) -> bool {
        match self.backend.list() {
            Ok(brews) => {
                self.list = ListScreen::new(brews, self.list.view);
                true
            }
            Err(err) => {
                self.set_status(err.to_string(), StatusKind::Error);
                false
            }
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(FOOTER_HEIGHT)])
            .split(frame.area());

        match &self.mode {
            Mode::Browsing => match self.list.view {
                _ if self.list.brews.is_empty() => self.draw_empty_list(frame, chunks[0]),
                ListView::Table => self.draw_table(frame, chunks[0]),
                ListView::Collapsible => self.draw_collapsible(frame, chunks[0]),
            },
            Mode::Editing(form) => self.draw_form(frame, chunks[0], form),
        }
        self.draw_footer(frame, chunks[1]);
    }

    fn draw_empty_list(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title("Brew Log").borders(Borders::ALL);
        let paragraph = Paragraph::new(Span::styled(
            "No brews yet. Press n to add one.",
            Style::default().fg(Color::Gray),
        ))
        .block(block);
        frame.render_widget(paragraph, area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        // Only as many columns as fit inside the borders, one space apart.
        let mut budget = area.width.saturating_sub(2) as usize;
        let mut columns = Vec::new();
        let mut widths: Vec<usize> = Vec::new();
        for column in table_columns().into_iter().skip(self.list.column_offset) {
            let width = self
                .list
                .brews
                .iter()
                .map(|brew| column.cell(brew).chars().count())
                .chain(std::iter::once(column.label().chars().count()))
                .max()
                .unwrap_or(MIN_COLUMN_WIDTH)
                .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
            if width > budget && !columns.is_empty() {
                break;
            }
            budget = budget.saturating_sub(width + 1);
            columns.push(column);
            widths.push(width);
        }

        let header = Row::new(
            columns
                .iter()
                .zip(&widths)
                .map(|(column, width)| Cell::from(truncate(column.label(), *width))),
        )
        .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = self.list.brews.iter().map(|brew| {
            Row::new(
                columns
                    .iter()
                    .zip(&widths)
                    .map(|(column, width)| Cell::from(truncate(&column.cell(brew), *width))),
            )
        });

        let constraints: Vec<Constraint> = widths
            .iter()
            .map(|width| Constraint::Length(*width as u16))
            .collect();

        let title = format!(
            "Brew Log · {} brews · columns {}-{} of {}",
            self.list.brews.len(),
            self.list.column_offset + 1,
            self.list.column_offset + columns.len(),
            table_columns().len()
        );
        let table = Table::new(rows, constraints)
            .header(header)
            .block(Block::default().title(title).borders(Borders::ALL))
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = TableState::default().with_selected(Some(self.list.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_collapsible(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .list
            .brews
            .iter()
            .map(|brew| {
                let expanded = self.list.is_expanded(brew);
                let marker = if expanded { "▾" } else { "▸" };
                let mut lines = vec![Line::from(format!("{marker} {}", summary_line(brew)))];
                if expanded {
                    lines.extend(detail_rows(brew).into_iter().map(|(label, value)| {
                        Line::from(vec![
                            Span::styled(
                                format!("    {label}: "),
                                Style::default().fg(Color::Cyan),
                            ),
                            Span::raw(value),
                        ])
                    }));
                }
                ListItem::new(lines)
            })
            .collect();

        let title = format!("Brew Log · {} brews", self.list.brews.len());
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Yellow));

        let mut state = ListState::default().with_selected(Some(self.list.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, form: &BrewForm) {
        let block = Block::default().title("New Brew").borders(Borders::ALL);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        // Two rows stay reserved for the blank spacer and the error/help line.
        let visible = inner.height.saturating_sub(2) as usize;
        let offset = scroll_offset(form.active, BrewField::ALL.len(), visible);

        let mut lines: Vec<Line> = BrewField::ALL
            .iter()
            .skip(offset)
            .take(visible)
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter/Ctrl+S to save • Tab to accept hint or move • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, inner);

        if form.active >= offset && form.active - offset < visible {
            let cursor_x = inner.x + form.cursor_column() as u16;
            let cursor_y = inner.y + (form.active - offset) as u16;
            frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), cursor_y));
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match (&self.mode, self.list.view) {
            (Mode::Editing(_), _) => &[
                ("[↑↓]", " Field   "),
                ("[Tab]", " Accept/Next   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            (Mode::Browsing, ListView::Table) => &[
                ("[n]", " New   "),
                ("[↑↓]", " Select   "),
                ("[←→]", " Columns   "),
                ("[v]", " List view   "),
                ("[r]", " Reload   "),
                ("[q]", " Quit"),
            ],
            (Mode::Browsing, ListView::Collapsible) => &[
                ("[n]", " New   "),
                ("[↑↓]", " Select   "),
                ("[Enter]", " Expand   "),
                ("[v]", " Table view   "),
                ("[r]", " Reload   "),
                ("[q]", " Quit"),
            ],
        };

        Line::from(
            keys.iter()
                .flat_map(|(key, text)| {
                    [Span::styled(*key, key_style), Span::raw(*text)]
                })
                .collect::<Vec<_>>(),
        )
    }
}
