// Interactive calculator TUI - display, keypad, history and AI panels

use std::io::stdout;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use unicode_width::UnicodeWidthStr;

use nebula_config::ai::ResolvedAiConfig;
use nebula_config::settings::{Settings, StartupMode};
use nebula_gemini_client::{bold_segments, GeminiClient};
use nebula_session::history::EntryKind;
use nebula_session::state::{Mode, Session};

use crate::keys::{KeyDef, KeyKind, KEYPAD_COLS, SCIENTIFIC_KEYS, STANDARD_KEYS};

/// Which popup, if any, is on top of the keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overlay {
    None,
    History,
    Ai,
}

/// State of the Ask AI panel. One request in flight at most; while `busy`
/// is set, submission is a no-op.
struct AiPanel {
    query: String,
    response: String,
    busy: bool,
    rx: Option<mpsc::Receiver<Result<String, String>>>,
}

impl AiPanel {
    fn new() -> Self {
        Self {
            query: String::new(),
            response: String::new(),
            busy: false,
            rx: None,
        }
    }
}

struct TuiApp {
    session: Session,
    ai_config: ResolvedAiConfig,
    overlay: Overlay,
    ai: AiPanel,
    /// Highlighted key index into the active keypad slice
    cursor: usize,
    history_selected: usize,
    show_status_bar: bool,
    show_help: bool,
    should_quit: bool,
}

impl TuiApp {
    fn new(session: Session, ai_config: ResolvedAiConfig, show_status_bar: bool) -> Self {
        Self {
            session,
            ai_config,
            overlay: Overlay::None,
            ai: AiPanel::new(),
            cursor: 0,
            history_selected: 0,
            show_status_bar,
            show_help: false,
            should_quit: false,
        }
    }

    /// Keys visible in the current mode: scientific rows first, then the
    /// standard grid.
    fn active_keys(&self) -> Vec<&'static KeyDef> {
        let mut keys: Vec<&'static KeyDef> = Vec::new();
        if self.session.mode() == Mode::Scientific {
            keys.extend(SCIENTIFIC_KEYS.iter());
        }
        keys.extend(STANDARD_KEYS.iter());
        keys
    }

    // ── Event handling ───────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.show_help {
            // Any key dismisses help
            self.show_help = false;
            return;
        }

        match self.overlay {
            Overlay::History => self.handle_history_key(key),
            Overlay::Ai => self.handle_ai_key(key),
            Overlay::None => self.handle_main_key(key),
        }
    }

    fn handle_main_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('h') => {
                self.history_selected = 0;
                self.overlay = Overlay::History;
            }
            KeyCode::Char('a') => self.overlay = Overlay::Ai,
            KeyCode::Tab => {
                self.session.toggle_mode();
                self.cursor = 0;
            }
            KeyCode::Enter => self.session.equals(),
            KeyCode::Backspace => self.session.delete_last(),
            KeyCode::Esc => self.session.clear_all(),
            KeyCode::Up => self.move_cursor(-(KEYPAD_COLS as i32)),
            KeyCode::Down => self.move_cursor(KEYPAD_COLS as i32),
            KeyCode::Left => self.move_cursor(-1),
            KeyCode::Right => self.move_cursor(1),
            KeyCode::Char(' ') => self.press_highlighted(),
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                self.session.append(&c.to_string());
            }
            KeyCode::Char(c) if matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '^') => {
                self.session.append(&c.to_string());
            }
            _ => {}
        }
    }

    fn handle_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('q') => {
                self.overlay = Overlay::None;
            }
            KeyCode::Up => {
                self.history_selected = self.history_selected.saturating_sub(1);
            }
            KeyCode::Down => {
                let len = self.session.history().len();
                if len > 0 {
                    self.history_selected = (self.history_selected + 1).min(len - 1);
                }
            }
            KeyCode::Enter => {
                if self.session.select_history(self.history_selected) {
                    self.overlay = Overlay::None;
                }
            }
            KeyCode::Char('c') => {
                self.session.clear_history();
                self.history_selected = 0;
            }
            _ => {}
        }
    }

    fn handle_ai_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.overlay = Overlay::None,
            KeyCode::Enter => self.submit_ai(),
            KeyCode::Backspace => {
                self.ai.query.pop();
            }
            KeyCode::Char(c) => self.ai.query.push(c),
            _ => {}
        }
    }

    fn move_cursor(&mut self, delta: i32) {
        let len = self.active_keys().len() as i32;
        if len == 0 {
            return;
        }
        let next = self.cursor as i32 + delta;
        self.cursor = next.clamp(0, len - 1) as usize;
    }

    fn press_highlighted(&mut self) {
        let keys = self.active_keys();
        let Some(def) = keys.get(self.cursor).copied() else {
            return;
        };
        self.press(def);
    }

    fn press(&mut self, def: &KeyDef) {
        match def.kind {
            KeyKind::Clear => {
                if def.token == "AC" {
                    self.session.clear_all();
                } else {
                    self.session.delete_last();
                }
            }
            KeyKind::Action => self.session.equals(),
            _ => self.session.append(def.token),
        }
    }

    // ── AI request plumbing ──────────────────────────────────────

    /// Fire the outstanding query on a background thread. No-op while a
    /// request is pending or when the query is blank.
    fn submit_ai(&mut self) {
        let question = self.ai.query.trim().to_string();
        if question.is_empty() || self.ai.busy {
            return;
        }

        if !self.ai_config.status.is_ready() {
            self.ai.response = self
                .ai_config
                .blocking_reason
                .clone()
                .unwrap_or_else(|| "AI is not configured".to_string());
            return;
        }

        let api_key = self.ai_config.api_key.clone().unwrap_or_default();
        let model = self.ai_config.model.clone();
        let temperature = self.ai_config.temperature;

        let (tx, rx) = mpsc::channel();
        self.ai.busy = true;
        self.ai.response.clear();
        self.ai.rx = Some(rx);

        thread::spawn(move || {
            let client = GeminiClient::new(&api_key, &model, temperature);
            let outcome = client.solve(&question).map_err(|e| e.to_string());
            let _ = tx.send(outcome);
        });
    }

    /// Drain a finished AI request, if any. The busy flag is released on
    /// success, failure and sender disconnect alike, so it can never stick.
    fn poll_ai(&mut self) {
        let Some(rx) = &self.ai.rx else {
            return;
        };
        match rx.try_recv() {
            Ok(outcome) => {
                self.ai.busy = false;
                self.ai.rx = None;
                match outcome {
                    Ok(text) => {
                        self.ai.response = text;
                        let query = self.ai.query.trim().to_string();
                        self.session.ai_answered(&query);
                    }
                    Err(message) => {
                        self.ai.response = format!("Error: {}", message);
                    }
                }
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                self.ai.busy = false;
                self.ai.rx = None;
                self.ai.response = "Error: AI request was interrupted.".to_string();
            }
        }
    }

    // ── Drawing ──────────────────────────────────────────────────

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = if self.show_status_bar {
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(4),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area)
        } else {
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(4),
                Constraint::Min(3),
            ])
            .split(area)
        };

        self.draw_title(frame, chunks[0]);
        self.draw_display(frame, chunks[1]);
        self.draw_keypad(frame, chunks[2]);
        if self.show_status_bar {
            self.draw_status(frame, chunks[3]);
        }

        match self.overlay {
            Overlay::History => self.draw_history(frame, area),
            Overlay::Ai => self.draw_ai(frame, area),
            Overlay::None => {}
        }

        if self.show_help {
            self.draw_help(frame, area);
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let title = format!(
            " nebulacalc | {} | ai: {} ",
            self.session.mode().label(),
            self.ai_config.status.as_str(),
        );
        let para = Paragraph::new(Line::from(vec![Span::styled(
            title,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]))
        .style(Style::default().bg(Color::Cyan));
        frame.render_widget(para, area);
    }

    fn draw_display(&self, frame: &mut Frame, area: Rect) {
        let input = if self.session.input().is_empty() {
            "0".to_string()
        } else {
            self.session.input().to_string()
        };
        let result = if !self.session.result().is_empty() {
            self.session.result().to_string()
        } else if !self.session.input().is_empty() {
            "...".to_string()
        } else {
            "0".to_string()
        };

        let lines = vec![
            Line::from(Span::styled(input, Style::default().fg(Color::DarkGray))),
            Line::from(Span::styled(
                result,
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let para = Paragraph::new(lines)
            .alignment(Alignment::Right)
            .block(block);
        frame.render_widget(para, area);
    }

    fn draw_keypad(&self, frame: &mut Frame, area: Rect) {
        let keys = self.active_keys();
        let cell_width = 7usize;

        let mut lines: Vec<Line> = Vec::new();
        for (row_start, row) in keys.chunks(KEYPAD_COLS).enumerate() {
            let mut spans: Vec<Span> = vec![Span::raw(" ")];
            for (col, def) in row.iter().enumerate() {
                let index = row_start * KEYPAD_COLS + col;
                let style = if index == self.cursor {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    match def.kind {
                        KeyKind::Clear => Style::default().fg(Color::Red),
                        KeyKind::Action => Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                        KeyKind::Number => Style::default().fg(Color::White),
                        _ => Style::default().fg(Color::Gray),
                    }
                };
                spans.push(Span::styled(pad_center(def.label, cell_width), style));
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
            lines.push(Line::default());
        }

        let para = Paragraph::new(lines);
        frame.render_widget(para, area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let left = format!(" {} entries in history", self.session.history().len());
        let right = "Tab mode  h history  a ask-ai  ?: help  q quit ";

        let padding = (area.width as usize)
            .saturating_sub(left.chars().count() + right.chars().count());
        let status = format!("{}{:pad$}{}", left, "", right, pad = padding);

        let para = Paragraph::new(Line::from(vec![Span::styled(
            status,
            Style::default().fg(Color::Black).bg(Color::DarkGray),
        )]))
        .style(Style::default().bg(Color::DarkGray));
        frame.render_widget(para, area);
    }

    fn draw_history(&self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(area, 52, area.height.saturating_sub(4).min(24));

        let entries = self.session.history().entries();
        let mut lines: Vec<Line> = Vec::new();
        if entries.is_empty() {
            lines.push(Line::from(Span::styled(
                "  No history yet",
                Style::default().fg(Color::DarkGray),
            )));
        } else {
            // Three lines per entry; show what fits from the top
            let visible = (popup.height.saturating_sub(3) as usize / 3).max(1);
            let start = self.history_selected.saturating_sub(visible.saturating_sub(1));
            for (i, entry) in entries.iter().enumerate().skip(start).take(visible) {
                let selected = i == self.history_selected;
                let marker = if selected { "> " } else { "  " };
                let time = entry
                    .timestamp
                    .with_timezone(&chrono::Local)
                    .format("%H:%M:%S");
                let mut header = vec![Span::styled(
                    format!("{}{}", marker, time),
                    Style::default().fg(Color::DarkGray),
                )];
                if entry.kind == EntryKind::Ai {
                    header.push(Span::styled(
                        "  [AI]",
                        Style::default().fg(Color::Cyan),
                    ));
                }
                lines.push(Line::from(header));
                lines.push(Line::from(Span::styled(
                    format!("    {}", entry.expression),
                    if selected {
                        Style::default().fg(Color::White)
                    } else {
                        Style::default().fg(Color::Gray)
                    },
                )));
                lines.push(Line::from(Span::styled(
                    format!("    = {}", entry.result),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )));
            }
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" History ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .title_bottom(" Enter select  c clear  Esc close ")
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }

    fn draw_ai(&self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(area, 64, area.height.saturating_sub(4).min(20));

        let inner_width = popup.width.saturating_sub(4) as usize;
        let mut lines: Vec<Line> = Vec::new();

        if self.ai.busy {
            lines.push(Line::from(Span::styled(
                "  Gemini thinking...",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )));
        } else if self.ai.response.is_empty() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "  Ask a complex math question or word problem.",
                Style::default().fg(Color::DarkGray),
            )));
            lines.push(Line::from(Span::styled(
                "  \"What is the derivative of x^2 * sin(x)?\"",
                Style::default().fg(Color::DarkGray),
            )));
        } else {
            for raw_line in self.ai.response.lines() {
                for wrapped in wrap_line(raw_line, inner_width) {
                    let spans: Vec<Span> = bold_segments(&wrapped)
                        .into_iter()
                        .map(|segment| {
                            if segment.is_bold() {
                                Span::styled(
                                    segment.text().to_string(),
                                    Style::default()
                                        .fg(Color::Cyan)
                                        .add_modifier(Modifier::BOLD),
                                )
                            } else {
                                Span::styled(
                                    segment.text().to_string(),
                                    Style::default().fg(Color::White),
                                )
                            }
                        })
                        .collect();
                    lines.push(Line::from(spans));
                }
            }
        }

        // Query input pinned to the bottom of the popup
        let body_height = popup.height.saturating_sub(4) as usize;
        while lines.len() < body_height {
            lines.push(Line::default());
        }
        lines.truncate(body_height);
        lines.push(Line::from(Span::styled(
            "─".repeat(popup.width.saturating_sub(2) as usize),
            Style::default().fg(Color::DarkGray),
        )));
        let prompt = if self.ai.busy { "  ..." } else { "  > " };
        lines.push(Line::from(vec![
            Span::styled(prompt, Style::default().fg(Color::Cyan)),
            Span::styled(self.ai.query.clone(), Style::default().fg(Color::White)),
            Span::styled("_", Style::default().fg(Color::DarkGray)),
        ]));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Gemini Math Tutor ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .title_bottom(" Enter send  Esc close ")
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let help_lines = [
            "",
            "  Input",
            "  -----",
            "  0-9 .             Append number",
            "  + - * / ( ) ^     Append operator",
            "  Enter             Evaluate",
            "  Backspace         Delete last character",
            "  Esc               Clear all",
            "",
            "  Keypad",
            "  ------",
            "  arrows            Move highlight",
            "  Space             Press highlighted key",
            "  Tab               Standard/scientific mode",
            "",
            "  Panels",
            "  ------",
            "  h                 History",
            "  a                 Ask AI",
            "",
            "  General",
            "  -------",
            "  q / Ctrl+C        Quit",
            "  ?                 Toggle this help",
            "",
        ];
        let help_width: u16 = 44;
        let help_height: u16 = help_lines.len() as u16;

        let popup = centered_rect(area, help_width, help_height);

        let lines: Vec<Line> = help_lines
            .iter()
            .map(|s| Line::from(Span::styled(*s, Style::default().fg(Color::White))))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Keybindings ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

/// Center a popup of the given size inside `area`, clamped to fit.
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

/// Pad a label to `width` display columns, roughly centered.
fn pad_center(label: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(label);
    if w >= width {
        return label.to_string();
    }
    let left = (width - w) / 2;
    let right = width - w - left;
    format!("{}{}{}", " ".repeat(left), label, " ".repeat(right))
}

/// Greedy wrap at display width; long unbroken runs are split hard.
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if width == 0 || UnicodeWidthStr::width(line) <= width {
        return vec![line.to_string()];
    }
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;
    for word in line.split_inclusive(' ') {
        let word_width = UnicodeWidthStr::width(word);
        if current_width + word_width > width && !current.is_empty() {
            out.push(current.trim_end().to_string());
            current = String::new();
            current_width = 0;
        }
        if word_width > width {
            for ch in word.chars() {
                let ch_width = UnicodeWidthStr::width(ch.to_string().as_str());
                if current_width + ch_width > width {
                    out.push(current.trim_end().to_string());
                    current = String::new();
                    current_width = 0;
                }
                current.push(ch);
                current_width += ch_width;
            }
        } else {
            current.push_str(word);
            current_width += word_width;
        }
    }
    if !current.trim_end().is_empty() {
        out.push(current.trim_end().to_string());
    }
    out
}

/// Launch the interactive calculator.
pub fn run() -> Result<(), String> {
    let settings = Settings::load();
    let ai_config = ResolvedAiConfig::from_settings(&settings.ai);

    let mut session = Session::with_history_capacity(settings.history_max_entries);
    if settings.startup_mode == StartupMode::Scientific {
        session.set_mode(Mode::Scientific);
    }

    let app = TuiApp::new(session, ai_config, settings.show_status_bar);
    run_app(app)
}

fn run_app(mut app: TuiApp) -> Result<(), String> {
    terminal::enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {}", e))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| format!("failed to enter alternate screen: {}", e))?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create terminal: {}", e))?;

    loop {
        terminal
            .draw(|frame| app.draw(frame))
            .map_err(|e| format!("draw error: {}", e))?;

        if event::poll(Duration::from_millis(50)).map_err(|e| format!("event poll error: {}", e))?
        {
            if let Event::Key(key) =
                event::read().map_err(|e| format!("event read error: {}", e))?
            {
                app.handle_key(key);
            }
        }

        app.poll_ai();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
