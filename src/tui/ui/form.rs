//! Patient health information form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{FieldKind, FieldSpec, PatientSubmission, SUBMISSION_FIELDS};
use crate::tui::styles::MedicalTheme;

/// Form field: its declared bounds plus the text being edited.
#[derive(Debug, Clone)]
pub struct FormField {
    pub spec: &'static FieldSpec,
    pub value: String,
}

impl FormField {
    fn new(spec: &'static FieldSpec) -> Self {
        Self {
            spec,
            value: format_value(spec, spec.default),
        }
    }

    fn set(&mut self, value: f64) {
        self.value.zeroize();
        self.value = format_value(self.spec, value);
    }
}

/// Render a value the way the field displays it.
fn format_value(spec: &FieldSpec, value: f64) -> String {
    match spec.kind {
        FieldKind::Decimal => format!("{value:.1}"),
        FieldKind::Integer | FieldKind::Boolean => format!("{value:.0}"),
    }
}

/// Patient form state
pub struct FormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
    /// Whether the focused buffer has been typed into since it gained focus
    editing: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            fields: SUBMISSION_FIELDS.iter().map(FormField::new).collect(),
            selected_field: 0,
            error_message: None,
            editing: false,
        }
    }
}

impl FormState {
    /// Focus field `index`; the next keystroke replaces its value.
    pub fn focus(&mut self, index: usize) {
        self.selected_field = index % self.fields.len();
        self.editing = false;
    }

    /// Move to the next field
    pub fn next_field(&mut self) {
        self.focus(self.selected_field + 1);
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.focus(self.fields.len() - 1);
        } else {
            self.focus(self.selected_field - 1);
        }
    }

    fn current(&mut self) -> &mut FormField {
        &mut self.fields[self.selected_field]
    }

    /// Type a character into the current field.
    ///
    /// The first keystroke after focus (or after a step, toggle or restore)
    /// replaces the shown value. Selectors take `0`/`1` only; `.` is accepted
    /// in decimal fields only. A keystroke that would push the value above the
    /// field's maximum is refused.
    pub fn input_char(&mut self, c: char) {
        let replace = !self.editing;
        let field = &mut self.fields[self.selected_field];
        let spec = field.spec;

        let allowed = match spec.kind {
            FieldKind::Boolean => c == '0' || c == '1',
            FieldKind::Integer => c.is_ascii_digit(),
            FieldKind::Decimal => c.is_ascii_digit() || c == '.',
        };
        if !allowed {
            return;
        }

        let mut candidate = if replace || spec.kind == FieldKind::Boolean {
            String::new()
        } else {
            field.value.clone()
        };
        let fits = !(c == '.' && candidate.contains('.')) && {
            candidate.push(c);
            candidate.parse::<f64>().map_or(true, |v| v <= spec.max)
        };
        if !fits {
            candidate.zeroize();
            return;
        }

        field.value.zeroize();
        field.value = candidate;
        self.editing = true;
        self.error_message = None;
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        self.current().value.pop();
        self.editing = true;
    }

    /// Restore the current field's default
    pub fn restore_default(&mut self) {
        let field = self.current();
        field.set(field.spec.default);
        self.editing = false;
        self.error_message = None;
    }

    /// Step the current field by `direction` steps, clamped to its bounds.
    ///
    /// Selectors toggle instead. Unparsable text steps from the default.
    pub fn step(&mut self, direction: i8) {
        let field = self.current();
        if field.spec.kind == FieldKind::Boolean {
            self.toggle();
            return;
        }

        let spec = field.spec;
        let current = field.value.parse::<f64>().unwrap_or(spec.default);
        let stepped = spec.clamp(current + spec.step * f64::from(direction));
        // Keep decimal steps on the one-decimal grid the field displays.
        let stepped = (stepped * 10.0).round() / 10.0;
        field.set(stepped);
        self.editing = false;
        self.error_message = None;
    }

    /// Flip a 0/1 selector; no effect on numeric fields.
    pub fn toggle(&mut self) {
        let field = self.current();
        if field.spec.kind != FieldKind::Boolean {
            return;
        }
        let next = if field.value == "1" { 0.0 } else { 1.0 };
        field.set(next);
        self.editing = false;
        self.error_message = None;
    }

    /// Wipe all field buffers from memory and restore defaults.
    pub fn clear_sensitive(&mut self) {
        for field in self.fields.iter_mut() {
            field.value.zeroize();
        }
        *self = Self::default();
    }

    /// Reset every field to its default
    pub fn reset(&mut self) {
        self.clear_sensitive();
    }

    /// Parse and bound-check every field.
    ///
    /// # Errors
    /// Returns a message naming the first field that fails to parse or lies
    /// outside its bounds.
    pub fn to_submission(&self) -> Result<PatientSubmission, String> {
        let mut values = Vec::with_capacity(self.fields.len());

        for field in self.fields.iter() {
            let spec = field.spec;
            let value: f64 = field
                .value
                .parse()
                .map_err(|_| format!("{}: Invalid number", spec.label))?;

            if !spec.accepts(value) {
                return Err(match spec.kind {
                    FieldKind::Boolean => format!("{}: Value must be 0 or 1", spec.label),
                    FieldKind::Integer => format!(
                        "{}: Value must be a whole number between {} and {}",
                        spec.label, spec.min, spec.max
                    ),
                    FieldKind::Decimal => format!(
                        "{}: Value must be between {} and {}",
                        spec.label, spec.min, spec.max
                    ),
                });
            }

            values.push(value);
        }

        PatientSubmission::from_vec(&values)
    }

    /// Load the sample patient
    pub fn load_sample_data(&mut self) {
        let sample = PatientSubmission::sample().to_vec();
        for (field, value) in self.fields.iter_mut().zip(sample) {
            field.set(value);
        }
        self.editing = false;
        self.error_message = None;
    }
}

/// Render the patient form
pub fn render_form(f: &mut Frame, area: Rect, state: &FormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("HealthAI Predictor", MedicalTheme::title()),
        Span::styled(
            " │ Patient Health Information",
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &FormState) {
    // Three columns of four, like the paper intake sheet.
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .margin(1)
        .split(area);

    let per_column = state.fields.len().div_ceil(3);
    for (col, chunk) in state.fields.chunks(per_column).enumerate() {
        render_field_column(
            f,
            columns[col],
            chunk,
            col * per_column,
            state.selected_field,
        );
    }
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let field_height = 3;
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(field_height))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let border_style = if is_selected {
            MedicalTheme::border_focused()
        } else {
            MedicalTheme::border()
        };

        let title_style = if is_selected {
            MedicalTheme::focused()
        } else {
            MedicalTheme::text_secondary()
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.spec.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value_display = match field.spec.kind {
            FieldKind::Boolean => {
                let text = if field.value == "1" { "Yes" } else { "No" };
                Span::styled(text, MedicalTheme::text())
            }
            _ => Span::styled(field.value.as_str(), MedicalTheme::text()),
        };

        let range = match field.spec.kind {
            FieldKind::Boolean => String::new(),
            _ => format!(
                "  {} ({}-{})",
                field.spec.unit, field.spec.min, field.spec.max
            ),
        };

        let content = Paragraph::new(Line::from(vec![
            Span::raw(" "),
            value_display,
            if is_selected {
                Span::styled("▌", MedicalTheme::cursor())
            } else {
                Span::raw("")
            },
            Span::styled(range, MedicalTheme::text_muted()),
        ]))
        .block(block);

        f.render_widget(content, chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &FormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[←→] ", MedicalTheme::key_hint()),
            Span::styled("Adjust ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Generate Medical Report ", MedicalTheme::key_desc()),
            Span::styled("[S] ", MedicalTheme::key_hint()),
            Span::styled("Sample ", MedicalTheme::key_desc()),
            Span::styled("[R] ", MedicalTheme::key_hint()),
            Span::styled("Reset ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(state: &mut FormState, name: &str) {
        let index = state
            .fields
            .iter()
            .position(|f| f.spec.name == name)
            .expect("field exists");
        state.focus(index);
    }

    fn type_str(state: &mut FormState, text: &str) {
        for c in text.chars() {
            state.input_char(c);
        }
    }

    #[test]
    fn test_typing_replaces_default() {
        let mut state = FormState::default();
        type_str(&mut state, "45");
        assert_eq!(state.fields[0].value, "45");
        assert!((state.to_submission().expect("valid").age - 45.0).abs() < f64::EPSILON);

        // Second visit replaces again instead of appending.
        state.next_field();
        state.prev_field();
        type_str(&mut state, "62");
        assert_eq!(state.fields[0].value, "62");
    }

    #[test]
    fn test_typing_refuses_values_above_max() {
        let mut state = FormState::default();
        type_str(&mut state, "450");
        assert_eq!(state.fields[0].value, "45");

        select(&mut state, "water_intake");
        type_str(&mut state, "7");
        assert_eq!(state.fields[state.selected_field].value, "2.0");
        type_str(&mut state, "5.5");
        assert_eq!(state.fields[state.selected_field].value, "5.5");
    }

    #[test]
    fn test_typing_after_step_replaces() {
        let mut state = FormState::default();
        select(&mut state, "stress_level");
        state.step(1);
        assert_eq!(state.fields[state.selected_field].value, "6");
        type_str(&mut state, "3");
        assert_eq!(state.fields[state.selected_field].value, "3");
        state.delete_char();
        type_str(&mut state, "9");
        assert_eq!(state.fields[state.selected_field].value, "9");
    }

    #[test]
    fn test_defaults_produce_valid_submission() {
        let state = FormState::default();
        let submission = state.to_submission().expect("defaults are in range");
        assert_eq!(submission, PatientSubmission::default());
    }

    #[test]
    fn test_sample_round_trips() {
        let mut state = FormState::default();
        state.load_sample_data();
        assert_eq!(
            state.to_submission().expect("valid"),
            PatientSubmission::sample()
        );
    }

    #[test]
    fn test_step_clamps_to_bounds() {
        let mut state = FormState::default();
        select(&mut state, "age");
        state.step(-1);
        assert_eq!(state.fields[state.selected_field].value, "1");
        for _ in 0..150 {
            state.step(1);
        }
        assert_eq!(state.fields[state.selected_field].value, "100");

        select(&mut state, "bmi");
        state.step(1);
        state.step(1);
        assert_eq!(state.fields[state.selected_field].value, "10.2");

        select(&mut state, "water_intake");
        for _ in 0..20 {
            state.step(1);
        }
        assert_eq!(state.fields[state.selected_field].value, "6.0");
    }

    #[test]
    fn test_boolean_toggle() {
        let mut state = FormState::default();
        select(&mut state, "smoking");
        state.toggle();
        assert_eq!(state.fields[state.selected_field].value, "1");
        state.step(1);
        assert_eq!(state.fields[state.selected_field].value, "0");
        state.input_char('7');
        assert_eq!(state.fields[state.selected_field].value, "0");
        state.input_char('1');
        assert!(state.to_submission().expect("valid").smoking);
    }

    #[test]
    fn test_decimal_point_only_in_decimal_fields() {
        let mut state = FormState::default();
        select(&mut state, "age");
        state.input_char('.');
        assert_eq!(state.fields[state.selected_field].value, "1");

        select(&mut state, "sleep_hours");
        type_str(&mut state, "6.5.");
        assert_eq!(state.fields[state.selected_field].value, "6.5");
    }

    #[test]
    fn test_out_of_range_is_rejected_with_field_name() {
        let mut state = FormState::default();
        select(&mut state, "glucose");
        state.fields[state.selected_field].value = "400".into();
        let err = state.to_submission().expect_err("out of range");
        assert!(err.starts_with("Glucose Level:"));

        state.restore_default();
        select(&mut state, "heart_rate");
        state.fields[state.selected_field].value.clear();
        let err = state.to_submission().expect_err("empty");
        assert_eq!(err, "Heart Rate: Invalid number");
    }

    #[test]
    fn test_clear_sensitive_restores_defaults() {
        let mut state = FormState::default();
        state.load_sample_data();
        state.selected_field = 5;
        state.clear_sensitive();
        assert_eq!(state.selected_field, 0);
        assert_eq!(
            state.to_submission().expect("valid"),
            PatientSubmission::default()
        );
    }
}
