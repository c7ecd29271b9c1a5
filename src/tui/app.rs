//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Report generation through the risk pipeline

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    widgets::Block,
    Frame, Terminal,
};

use crate::adapters::{load_artifacts, RandomForest, StandardScaler};
use crate::application::RiskPipeline;
use crate::config::AppConfig;
use crate::domain::RiskReport;

use super::styles::MedicalTheme;
use super::ui::{
    form::{render_form, FormState},
    render_disclaimer,
    report::render_report,
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Report,
}

/// Main application state
pub struct App {
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    pipeline: RiskPipeline<RandomForest, StandardScaler>,

    form_state: FormState,

    /// Last generated report (shown on the report screen)
    report: Option<RiskReport>,
}

impl App {
    /// Load the model artifacts named by `config` and build the application.
    ///
    /// # Errors
    /// Returns error if the artifacts cannot be loaded or verified. There is
    /// no fallback model.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let model_dir = config.model_path.as_path();
        if !model_dir.exists() {
            return Err(anyhow!(
                "Model path not found at {:?}. Set HEALTHAI_MODEL_PATH to a directory containing forest.json and scaler.json.",
                model_dir
            ));
        }

        let (forest, scaler) = load_artifacts(model_dir, config.require_manifest)
            .map_err(|e| anyhow!("Failed to load model from {:?}: {}", model_dir, e))?;

        let pipeline = RiskPipeline::new(Arc::new(forest), Arc::new(scaler));
        Ok(Self::with_dependencies(pipeline))
    }

    /// Create application with an injected pipeline.
    #[must_use]
    pub fn with_dependencies(pipeline: RiskPipeline<RandomForest, StandardScaler>) -> Self {
        Self {
            screen: Screen::Form,
            should_quit: false,
            pipeline,
            form_state: FormState::default(),
            report: None,
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub fn report(&self) -> Option<&RiskReport> {
        self.report.as_ref()
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);
        self.form_state.clear_sensitive();

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&self, f: &mut Frame) {
        let area = f.area();
        f.render_widget(Block::default().style(MedicalTheme::background()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(area);

        match (self.screen, &self.report) {
            (Screen::Report, Some(report)) => render_report(f, chunks[0], report),
            _ => render_form(f, chunks[0], &self.form_state),
        }

        render_disclaimer(f, chunks[1]);
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Report => self.handle_report_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.form_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.form_state.next_field();
            }
            KeyCode::Left => {
                self.form_state.step(-1);
            }
            KeyCode::Right => {
                self.form_state.step(1);
            }
            KeyCode::Char(' ') => {
                self.form_state.toggle();
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.form_state.load_sample_data();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.form_state.reset();
            }
            KeyCode::Char(c) => {
                self.form_state.input_char(c);
            }
            KeyCode::Backspace => {
                self.form_state.delete_char();
            }
            KeyCode::Delete => {
                self.form_state.restore_default();
            }
            KeyCode::Enter => {
                self.submit_form();
            }
            _ => {}
        }
    }

    fn handle_report_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Esc => {
                self.report = None;
                self.screen = Screen::Form;
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.report = None;
                self.form_state.clear_sensitive();
                self.screen = Screen::Form;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let submission = match self.form_state.to_submission() {
            Ok(submission) => submission,
            Err(e) => {
                self.form_state.error_message = Some(e);
                return;
            }
        };

        match self.pipeline.generate_report(&submission) {
            Ok(report) => {
                self.report = Some(report);
                self.screen = Screen::Report;
            }
            Err(e) => {
                tracing::error!("Report generation failed");
                self.form_state.error_message = Some(e.to_string());
            }
        }
    }
}
