use crate::controller::{Confirm, DiaryView, EntryView, Notice};
use crate::error::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{stdout, Stdout};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub enum Action {
    Write,
    Open(EntryView),
    Delete(String),
    ClearAll,
    Quit,
}

/// Which compose field receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Content,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ComposeStatus {
    Editing,
    Submit,
    Cancel,
}

/// Title and body being typed on the compose screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeForm {
    pub title: String,
    pub content: String,
    pub focus: Field,
}

impl Default for ComposeForm {
    fn default() -> Self {
        ComposeForm {
            title: String::new(),
            content: String::new(),
            focus: Field::Content,
        }
    }
}

impl ComposeForm {
    pub fn handle_key(&mut self, key: KeyEvent) -> ComposeStatus {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return ComposeStatus::Cancel,
            KeyCode::Char('s') if ctrl => return ComposeStatus::Submit,
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Field::Title => Field::Content,
                    Field::Content => Field::Title,
                };
            }
            KeyCode::Enter => match self.focus {
                Field::Title => self.focus = Field::Content,
                Field::Content => self.content.push('\n'),
            },
            KeyCode::Backspace => {
                self.focused_mut().pop();
            }
            KeyCode::Char(c) if !ctrl => self.focused_mut().push(c),
            _ => {}
        }
        ComposeStatus::Editing
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Title => &mut self.title,
            Field::Content => &mut self.content,
        }
    }
}

/// Maps a key in the confirmation dialog to a decision; `None` keeps it open.
pub fn confirm_decision(code: KeyCode) -> Option<bool> {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') => Some(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(false),
        _ => None,
    }
}

pub struct UI<B: Backend> {
    terminal: Terminal<B>,
    selected: usize,
    notice: Option<Notice>,
    last_view: DiaryView,
    restore_terminal: bool,
}

impl UI<CrosstermBackend<Stdout>> {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let setup = stdout()
            .execute(EnterAlternateScreen)
            .map_err(Into::into)
            .and_then(|_| UI::with_backend(CrosstermBackend::new(stdout())));

        let mut ui = or_restore(setup, restore_terminal)?;
        ui.restore_terminal = true;
        Ok(ui)
    }
}

/// Leaves raw mode and the alternate screen, ignoring failures.
fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = stdout().execute(LeaveAlternateScreen);
}

/// Runs `restore` when terminal setup failed half way.
fn or_restore<T>(setup: Result<T>, restore: impl FnOnce()) -> Result<T> {
    if setup.is_err() {
        restore();
    }
    setup
}

impl<B: Backend> UI<B> {
    pub fn with_backend(backend: B) -> Result<Self> {
        let terminal = Terminal::new(backend)?;
        Ok(UI {
            terminal,
            selected: 0,
            notice: None,
            last_view: DiaryView::default(),
            restore_terminal: false,
        })
    }

    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn display(&mut self, view: &DiaryView) -> Result<()> {
        if self.selected >= view.entries.len() {
            self.selected = view.entries.len().saturating_sub(1);
        }
        self.last_view = view.clone();

        let selected = self.selected;
        let notice = self.notice.clone();
        self.terminal
            .draw(|f| draw_main(f, view, selected, notice.as_ref()))?;
        Ok(())
    }

    /// Blocks for one key press and translates it against the current view.
    pub fn next_action(&mut self, view: &DiaryView) -> Result<Option<Action>> {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(self.handle_key(key, view)),
            _ => Ok(None),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, view: &DiaryView) -> Option<Action> {
        let has_entries = !view.is_empty();
        let can_clear = has_entries || view.storage_warning.is_some();
        match key.code {
            KeyCode::Char('w') => {
                self.notice = None;
                Some(Action::Write)
            }
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') if has_entries => {
                if self.selected + 1 < view.entries.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Enter if has_entries => view
                .entries
                .get(self.selected)
                .cloned()
                .map(Action::Open),
            KeyCode::Char('d') | KeyCode::Delete if has_entries => view
                .entries
                .get(self.selected)
                .map(|e| Action::Delete(e.id.clone())),
            KeyCode::Char('c') if can_clear => Some(Action::ClearAll),
            _ => None,
        }
    }

    /// Runs the compose screen. `None` when the user backs out.
    pub fn compose_entry(&mut self) -> Result<Option<(String, String)>> {
        let mut form = ComposeForm::default();
        loop {
            self.terminal.draw(|f| draw_compose(f, &form))?;

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match form.handle_key(key) {
                    ComposeStatus::Editing => {}
                    ComposeStatus::Submit => return Ok(Some((form.title, form.content))),
                    ComposeStatus::Cancel => {
                        self.notice = Some(Notice::Cancelled);
                        return Ok(None);
                    }
                }
            }
        }
    }

    pub fn view_full_entry(&mut self, entry: &EntryView) -> Result<()> {
        loop {
            self.terminal.draw(|f| draw_full_entry(f, entry))?;

            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    break;
                }
            }
        }
        Ok(())
    }

    fn draw_confirm(&mut self, prompt: &str) -> Result<()> {
        let view = &self.last_view;
        let selected = self.selected;
        let notice = self.notice.as_ref();
        self.terminal.draw(|f| {
            draw_main(f, view, selected, notice);
            draw_dialog(f, prompt);
        })?;
        Ok(())
    }
}

impl<B: Backend> Confirm for UI<B> {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        loop {
            self.draw_confirm(prompt)?;
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(decision) = confirm_decision(key.code) {
                    return Ok(decision);
                }
            }
        }
    }
}

impl<B: Backend> Drop for UI<B> {
    fn drop(&mut self) {
        if self.restore_terminal {
            restore_terminal();
        }
    }
}

fn heading(text: &str) -> Paragraph<'_> {
    Paragraph::new(text)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
}

fn instructions(text: &str) -> Paragraph<'_> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
}

fn draw_main(f: &mut Frame, view: &DiaryView, selected: usize, notice: Option<&Notice>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.area());

    f.render_widget(heading("Personal Diary"), chunks[0]);

    let list_block = Block::default().borders(Borders::ALL).title("Entries");
    if let Some(placeholder) = view.placeholder() {
        let empty = Paragraph::new(placeholder)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(list_block);
        f.render_widget(empty, chunks[1]);
    } else {
        let width = chunks[1].width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = view
            .entries
            .iter()
            .map(|entry| {
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(
                            format!("[{}] ", entry.timestamp),
                            Style::default().fg(Color::Gray),
                        ),
                        Span::styled(
                            truncate_to_width(&entry.title, width.saturating_sub(19)),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                    ]),
                    Line::from(Span::raw(format!(
                        "  {}",
                        truncate_to_width(entry.preview(), width.saturating_sub(2))
                    ))),
                ])
            })
            .collect();

        let entries_list = List::new(items)
            .block(list_block)
            .highlight_style(Style::default().fg(Color::Cyan))
            .highlight_symbol("> ");
        f.render_stateful_widget(
            entries_list,
            chunks[1],
            &mut ListState::default().with_selected(Some(selected)),
        );
    }

    let status = match (notice, &view.storage_warning) {
        (Some(notice), _) if notice.is_error() => Line::from(Span::styled(
            notice.message(),
            Style::default().fg(Color::Red),
        )),
        (_, Some(warning)) => Line::from(Span::styled(
            format!("Diary file unreadable, showing nothing: {warning}. Press c to clear it."),
            Style::default().fg(Color::Red),
        )),
        (Some(notice), None) => {
            let color = if notice.is_error() {
                Color::Red
            } else {
                Color::Green
            };
            Line::from(Span::styled(notice.message(), Style::default().fg(color)))
        }
        (None, None) => Line::default(),
    };
    f.render_widget(Paragraph::new(status).alignment(Alignment::Center), chunks[2]);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let controls = if view.storage_warning.is_some() {
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("w", bold),
            Span::raw(" to write, "),
            Span::styled("c", bold),
            Span::raw(" to clear all, "),
            Span::styled("q", bold),
            Span::raw(" to quit"),
        ])
    } else if view.is_empty() {
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("w", bold),
            Span::raw(" to write, "),
            Span::styled("q", bold),
            Span::raw(" to quit"),
        ])
    } else {
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("w", bold),
            Span::raw(" to write, "),
            Span::styled("Enter", bold),
            Span::raw(" to read, "),
            Span::styled("d", bold),
            Span::raw(" to delete, "),
            Span::styled("c", bold),
            Span::raw(" to clear all, "),
            Span::styled("q", bold),
            Span::raw(" to quit"),
        ])
    };
    f.render_widget(
        Paragraph::new(controls)
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center),
        chunks[3],
    );
}

fn draw_compose(f: &mut Frame, form: &ComposeForm) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.area());

    f.render_widget(heading("New Diary Entry"), chunks[0]);

    let field_block = |title: &'static str, field: Field| {
        let block = Block::default().borders(Borders::ALL).title(title);
        if form.focus == field {
            block.border_style(Style::default().fg(Color::Cyan))
        } else {
            block
        }
    };
    let with_cursor = |text: &str, field: Field| {
        if form.focus == field {
            format!("{text}\u{2588}")
        } else {
            text.to_string()
        }
    };

    let title = Paragraph::new(with_cursor(&form.title, Field::Title))
        .block(field_block("Title (optional)", Field::Title));
    f.render_widget(title, chunks[1]);

    let content = Paragraph::new(with_cursor(&form.content, Field::Content))
        .wrap(Wrap { trim: false })
        .block(field_block("Content", Field::Content));
    f.render_widget(content, chunks[2]);

    f.render_widget(
        instructions("Tab: Switch field, Ctrl+S: Save, Esc: Cancel"),
        chunks[3],
    );
}

fn draw_full_entry(f: &mut Frame, entry: &EntryView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.area());

    let title = heading(&entry.title).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .title(format!("Entry from {}", entry.timestamp)),
    );
    f.render_widget(title, chunks[0]);

    let content = Paragraph::new(entry.content.as_str())
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Content"));
    f.render_widget(content, chunks[1]);

    f.render_widget(instructions("Press any key to go back"), chunks[2]);
}

fn draw_dialog(f: &mut Frame, prompt: &str) {
    let area = centered_rect(50, 7, f.area());
    f.render_widget(Clear, area);
    let dialog = Paragraph::new(vec![
        Line::from(prompt),
        Line::default(),
        Line::from(vec![
            Span::styled("y", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(": Yes   "),
            Span::styled("n", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("/Esc: No"),
        ]),
    ])
    .wrap(Wrap { trim: true })
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title("Confirm"),
    );
    f.render_widget(dialog, area);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x) / 100) as u16;
    let width = width.max(20).min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Cuts `text` to at most `max` terminal columns, marking the cut with `…`.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('\u{2026}');
    out
}
