//! Main TUI application state and logic

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::browser::{Outcome, PaperBrowser};
use crate::client::PaperClient;
use crate::config::Config;
use crate::errors::PaperError;
use crate::tui::card_list::CardList;
use crate::tui::events::AppEvent;
use crate::tui::search_form::{FormField, SearchForm};
use crate::tui::ui::{centered_rect, Styles};

/// Which region owns the keyboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    Form(FormField),
    Results,
}

impl Focus {
    fn next(self) -> Focus {
        match self {
            Focus::Form(field) => {
                let idx = FormField::ALL.iter().position(|f| *f == field).unwrap_or(0);
                match FormField::ALL.get(idx + 1) {
                    Some(next) => Focus::Form(*next),
                    None => Focus::Results,
                }
            }
            Focus::Results => Focus::Form(FormField::ALL[0]),
        }
    }

    fn previous(self) -> Focus {
        match self {
            Focus::Form(field) => {
                let idx = FormField::ALL.iter().position(|f| *f == field).unwrap_or(0);
                if idx == 0 {
                    Focus::Results
                } else {
                    Focus::Form(FormField::ALL[idx - 1])
                }
            }
            Focus::Results => Focus::Form(FormField::ALL[FormField::ALL.len() - 1]),
        }
    }
}

/// Main TUI application state
pub struct App {
    pub config: Config,
    pub browser: PaperBrowser,
    client: Arc<PaperClient>,

    pub form: SearchForm,
    pub cards: CardList,
    pub focus: Focus,

    // Global application state
    pub should_quit: bool,
    pub show_help_popup: bool,
    pub status_message: Option<String>,
    pub error_message: Option<String>,
    pub in_flight: usize,

    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
}

impl App {
    /// Create a new TUI application
    pub fn new(config: Config) -> Result<Self> {
        let client = Arc::new(PaperClient::new(&config)?);
        let browser = PaperBrowser::new(client.clone());
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Self {
            config,
            browser,
            client,

            form: SearchForm::new(),
            cards: CardList::new(),
            focus: Focus::Form(FormField::Course),

            should_quit: false,
            show_help_popup: false,
            status_message: None,
            error_message: None,
            in_flight: 0,

            events_tx,
            events_rx,
        })
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.start_load();

        loop {
            terminal.draw(|f| self.draw(f))?;

            while let Ok(event) = self.events_rx.try_recv() {
                self.handle_app_event(event);
            }

            if crossterm::event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = crossterm::event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key).await?;
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Request the unfiltered list in the background
    pub fn start_load(&mut self) {
        let generation = self.browser.next_generation();
        let source = self.browser.source();
        let tx = self.events_tx.clone();

        self.in_flight += 1;
        self.set_status("Loading papers...".to_string());

        tokio::spawn(async move {
            let result = source.list_papers().await;
            let _ = tx.send(AppEvent::LoadFinished { generation, result });
        });
    }

    /// Request a filtered search with the current form values in the background
    pub fn start_search(&mut self) {
        let filter = self.form.filter();
        info!("Search criteria: {:?}", filter);

        let generation = self.browser.next_generation();
        let source = self.browser.source();
        let tx = self.events_tx.clone();

        self.in_flight += 1;
        self.set_status("Searching papers...".to_string());

        tokio::spawn(async move {
            let result = source.search_papers(&filter).await;
            let _ = tx.send(AppEvent::SearchFinished { generation, result });
        });
    }

    /// Download the selected card's file in the background
    pub fn start_download(&mut self) {
        let Some(card) = self
            .cards
            .selected()
            .and_then(|i| self.browser.panel().cards().get(i))
            .cloned()
        else {
            self.set_error("No paper selected".to_string());
            return;
        };

        let Some(target) = card.download_target.clone() else {
            let err = PaperError::MissingDownloadTarget(card.title.clone());
            self.set_error(format!("Download failed: {}", err));
            return;
        };

        let client = Arc::clone(&self.client);
        let output_dir = self.config.download_dir.clone();
        let tx = self.events_tx.clone();
        let title = card.title;

        self.in_flight += 1;
        self.set_status(format!("Downloading {}...", title));

        tokio::spawn(async move {
            let result = client.download_file(&target, &title, &output_dir).await;
            let _ = tx.send(AppEvent::DownloadFinished { title, result });
        });
    }

    /// Apply a finished background task
    pub fn handle_app_event(&mut self, event: AppEvent) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match event {
            AppEvent::LoadFinished { generation, result } => {
                match self.browser.apply_load(generation, result) {
                    Outcome::Rendered(count) => {
                        self.refresh_selectors();
                        self.cards.reset(count);
                        self.set_status(format!("Loaded {} papers", count));
                    }
                    Outcome::Failed(e) => {
                        self.cards.reset(0);
                        self.set_error(format!("Load failed: {}", e));
                    }
                    // A search owns the cards, but the full set may still have arrived
                    Outcome::Stale => self.refresh_selectors(),
                }
            }
            AppEvent::SearchFinished { generation, result } => {
                match self.browser.apply_search(generation, result) {
                    Outcome::Rendered(count) => {
                        self.cards.reset(count);
                        self.set_status(format!("Found {} papers", count));
                    }
                    Outcome::Failed(e) => {
                        self.cards.reset(0);
                        self.set_error(format!("Search failed: {}", e));
                    }
                    Outcome::Stale => debug!("Ignoring superseded search result"),
                }
            }
            AppEvent::DownloadFinished { title, result } => match result {
                Ok(path) => {
                    self.set_status(format!("Saved '{}' to {}", title, path.display()));
                }
                Err(e) => {
                    self.set_error(format!("Download failed: {}", e));
                }
            },
        }
    }

    fn refresh_selectors(&mut self) {
        self.form.set_course_options(&self.browser.course_options());
        self.form.set_session_options(&self.browser.session_options());
    }

    /// Handle keyboard input events
    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        let typing = self.in_text_field();

        // Global shortcuts
        match key.code {
            KeyCode::F(1) => {
                self.show_help_popup = !self.show_help_popup;
                return Ok(());
            }
            KeyCode::Char('?') if !typing => {
                self.show_help_popup = !self.show_help_popup;
                return Ok(());
            }
            KeyCode::Esc if self.show_help_popup => {
                self.show_help_popup = false;
                return Ok(());
            }
            KeyCode::Char('q') if !typing => {
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::Tab => {
                self.set_focus(self.focus.next());
                return Ok(());
            }
            KeyCode::BackTab => {
                self.set_focus(self.focus.previous());
                return Ok(());
            }
            _ => {}
        }

        if self.show_help_popup {
            return Ok(());
        }

        match self.focus {
            Focus::Form(field) => self.handle_form_event(field, key),
            Focus::Results => self.handle_results_event(key),
        }

        Ok(())
    }

    fn handle_form_event(&mut self, field: FormField, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.start_search(),
            KeyCode::Char(' ') if field == FormField::SearchButton => self.start_search(),
            KeyCode::Up if !field.is_text() => self.form.select_previous(),
            KeyCode::Down if !field.is_text() => self.form.select_next(),
            KeyCode::Char('r') if !self.form.accepts_text(field) => self.start_load(),
            KeyCode::Char(c) => self.form.handle_char_input(c),
            KeyCode::Backspace => self.form.handle_backspace(),
            KeyCode::Delete => self.form.handle_delete(),
            KeyCode::Left => self.form.handle_cursor_left(),
            KeyCode::Right => self.form.handle_cursor_right(),
            KeyCode::Home => self.form.handle_cursor_home(),
            KeyCode::End => self.form.handle_cursor_end(),
            KeyCode::Esc => self.clear_messages(),
            _ => {}
        }
    }

    fn handle_results_event(&mut self, key: KeyEvent) {
        let count = self.browser.panel().cards().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.cards.navigate_up(count),
            KeyCode::Down | KeyCode::Char('j') => self.cards.navigate_down(count),
            KeyCode::Home => self.cards.go_to_first(count),
            KeyCode::End => self.cards.go_to_last(count),
            KeyCode::Enter | KeyCode::Char('d') => self.start_download(),
            KeyCode::Char('r') => self.start_load(),
            KeyCode::Char('/') => self.set_focus(Focus::Form(FormField::Subject)),
            KeyCode::Esc => self.set_focus(Focus::Form(FormField::Course)),
            _ => {}
        }
    }

    fn in_text_field(&self) -> bool {
        match self.focus {
            Focus::Form(field) => self.form.accepts_text(field),
            Focus::Results => false,
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.form.focus(match focus {
            Focus::Form(field) => Some(field),
            Focus::Results => None,
        });
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search form
                Constraint::Min(0),    // Cards
                Constraint::Length(3), // Status bar
            ])
            .split(size);

        self.form.draw(f, chunks[0]);

        let results_focused = self.focus == Focus::Results;
        self.cards
            .draw(f, chunks[1], self.browser.panel(), results_focused);

        self.draw_status_bar(f, chunks[2]);

        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    fn draw_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if let Some(ref err) = self.error_message {
            format!("Error: {}", err)
        } else if let Some(ref msg) = self.status_message {
            format!("Status: {}", msg)
        } else {
            "paperdesk | Tab: Move focus | Enter: Search | d: Download | q: Quit | F1/?: Help"
                .to_string()
        };

        let style = if self.error_message.is_some() {
            Styles::error()
        } else if self.in_flight > 0 {
            Styles::warning()
        } else if self.status_message.is_some() {
            Styles::success()
        } else {
            Styles::inactive()
        };

        let status_bar = Paragraph::new(status_text)
            .style(style)
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(status_bar, area);
    }

    fn draw_help_popup(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(70, 60, area);

        f.render_widget(Clear, popup_area);

        let help_popup = Paragraph::new(self.get_context_help())
            .block(
                Block::default()
                    .title("Help - Shortcuts")
                    .borders(Borders::ALL)
                    .style(Styles::warning()),
            )
            .style(Style::default());

        f.render_widget(help_popup, popup_area);
    }

    fn get_context_help(&self) -> String {
        let global_help = "Global Shortcuts:\n\
            Tab / Shift+Tab - Move focus\n\
            q - Quit (outside text fields)\n\
            Ctrl+C - Quit\n\
            F1 / ? - Toggle this help\n\n";

        let focus_help = match self.focus {
            Focus::Form(field) if field.is_text() => {
                "Text Field:\n\
                Type to edit, ←/→ move cursor\n\
                Enter - Search"
            }
            Focus::Form(field) if self.form.accepts_text(field) => {
                "Custom Selector:\n\
                Type a value (e.g. an id), ←/→ move cursor\n\
                ↑/↓ - Back to the listed options\n\
                Enter - Search"
            }
            Focus::Form(FormField::SearchButton) => {
                "Search Button:\n\
                Enter / Space - Search\n\
                r - Reload all papers"
            }
            Focus::Form(_) => {
                "Selector:\n\
                ↑/↓ - Change option, Custom... to type a value\n\
                Enter - Search\n\
                r - Reload all papers"
            }
            Focus::Results => {
                "Papers:\n\
                ↑/↓ - Navigate cards\n\
                Enter / d - Download paper\n\
                r - Reload all papers\n\
                / - Edit subject\n\
                Esc - Back to form"
            }
        };

        format!("{}{}", global_help, focus_help)
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.error_message = None;
    }

    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
        self.status_message = None;
    }

    pub fn clear_messages(&mut self) {
        self.status_message = None;
        self.error_message = None;
    }
}
