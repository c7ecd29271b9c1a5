//! Medical report view: diagnosis, charts and final assessment.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{RiskProportion, RiskReport};
use crate::tui::styles::{MedicalTheme, LOGO};

/// Fixed description of the model behind every report.
const MODEL_NOTES: [(&str, &str); 4] = [
    ("Model", "Random Forest Classifier"),
    ("Learning Type", "Supervised Machine Learning"),
    ("Dataset", "Clinical + Lifestyle Health Records"),
    ("Output", "Individual Health Risk Score"),
];

/// Whole-number percentage, as drawn on the proportion chart.
fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

/// Render the full report
pub fn render_report(f: &mut Frame, area: Rect, report: &RiskReport) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Header with logo
            Constraint::Length(4), // Diagnosis
            Constraint::Min(10),   // Charts
            Constraint::Length(8), // Final assessment
            Constraint::Length(2), // Footer
        ])
        .split(area);

    render_report_header(f, chunks[0]);
    render_diagnosis(f, chunks[1], report);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[2]);
    render_proportion(f, charts[0], &report.proportion);
    render_top_factors(f, charts[1], report);

    render_assessment(f, chunks[3], report);
    render_report_footer(f, chunks[4]);
}

fn render_report_header(f: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(14), Constraint::Min(0)])
        .split(area);

    let logo = Paragraph::new(
        LOGO.lines()
            .skip_while(|l| l.is_empty())
            .map(|l| Line::from(Span::styled(l, MedicalTheme::title())))
            .collect::<Vec<_>>(),
    );
    f.render_widget(logo, columns[0]);

    let title = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("HealthAI Predictor", MedicalTheme::title())),
        Line::from(Span::styled(
            "AI Powered Medical Risk Analysis System",
            MedicalTheme::text_secondary(),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(title, columns[1]);
}

fn render_diagnosis(f: &mut Frame, area: Rect, report: &RiskReport) {
    let at_risk = report.prediction.is_at_risk();
    let style = MedicalTheme::diagnosis(at_risk);
    let verdict = if at_risk {
        "! High Health Risk"
    } else {
        "OK Healthy Individual"
    };

    let content = Paragraph::new(vec![
        Line::from(Span::styled(verdict, style.add_modifier(Modifier::BOLD))),
        Line::from(vec![
            Span::styled("Probability: ", style.add_modifier(Modifier::BOLD)),
            Span::styled(format!("{:.2}", report.prediction.probability), style),
        ]),
    ])
    .style(style)
    .block(
        Block::default()
            .title(Span::styled(" AI Diagnosis Result ", MedicalTheme::subtitle()))
            .borders(Borders::LEFT | Borders::TOP)
            .border_style(style),
    );

    f.render_widget(content, area);
}

fn render_proportion(f: &mut Frame, area: Rect, proportion: &RiskProportion) {
    let block = Block::default()
        .title(Span::styled(" Risk Distribution ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let styles = [MedicalTheme::danger(), MedicalTheme::success()];
    let bars: Vec<Bar> = proportion
        .slices()
        .iter()
        .zip(styles)
        .map(|((label, value), style)| {
            Bar::default()
                .value((value * 100.0).round() as u64)
                .text_value(percent(*value))
                .label(Line::from(*label))
                .style(style)
        })
        .collect();

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(9)
        .bar_gap(2)
        .max(100);
    f.render_widget(chart, chunks[0]);

    let legend = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{}: {}", RiskProportion::RISK_LABEL, percent(proportion.risk)),
            MedicalTheme::danger(),
        ),
        Span::raw("   "),
        Span::styled(
            format!(
                "{}: {}",
                RiskProportion::HEALTHY_LABEL,
                percent(proportion.healthy)
            ),
            MedicalTheme::success(),
        ),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(legend, chunks[1]);
}

fn render_top_factors(f: &mut Frame, area: Rect, report: &RiskReport) {
    let block = Block::default()
        .title(Span::styled(" Top Risk Factors ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let note_height = u16::from(report.has_mislabeled_factors());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(note_height)])
        .split(inner);

    // Bars are scaled against the largest importance; values are shown as-is.
    let max = report
        .top_factors
        .first()
        .map_or(1.0, |top| top.importance)
        .max(f64::MIN_POSITIVE);
    let bars: Vec<Bar> = report
        .top_factors
        .iter()
        .map(|factor| {
            let label = if factor.is_mislabeled() {
                format!("{}*", factor.label)
            } else {
                factor.label.clone()
            };
            Bar::default()
                .value((factor.importance / max * 1000.0).round() as u64)
                .text_value(format!("{:.3}", factor.importance))
                .label(Line::from(label))
                .style(MedicalTheme::focused())
        })
        .collect();

    let chart = BarChart::default()
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(1)
        .max(1000);
    f.render_widget(chart, chunks[0]);

    if note_height > 0 {
        let note = Paragraph::new(Line::from(Span::styled(
            "* label is positional; importance belongs to another feature",
            MedicalTheme::text_muted(),
        )));
        f.render_widget(note, chunks[1]);
    }
}

fn render_assessment(f: &mut Frame, area: Rect, report: &RiskReport) {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Overall Risk Category: ", MedicalTheme::text()),
            Span::styled(
                report.risk_level.to_string(),
                MedicalTheme::risk_level(report.risk_level),
            ),
        ]),
        Line::from(Span::styled(
            report.risk_level.description(),
            MedicalTheme::text_secondary(),
        )),
    ];
    lines.extend(MODEL_NOTES.iter().map(|(key, value)| {
        Line::from(vec![
            Span::styled("✔ ", MedicalTheme::success()),
            Span::styled(format!("{key}: "), MedicalTheme::subtitle()),
            Span::styled(*value, MedicalTheme::text()),
        ])
    }));

    let content = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(
                " Final Medical Assessment ",
                MedicalTheme::subtitle(),
            ))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border_focused()),
    );

    f.render_widget(content, area);
}

fn render_report_footer(f: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[Enter/Esc] ", MedicalTheme::key_hint()),
        Span::styled("Edit Values ", MedicalTheme::key_desc()),
        Span::styled("[N] ", MedicalTheme::key_hint()),
        Span::styled("New Patient (clears form) ", MedicalTheme::key_desc()),
        Span::styled("[Q] ", MedicalTheme::key_hint()),
        Span::styled("Quit", MedicalTheme::key_desc()),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Prediction, TopFactor, TOP_FACTOR_LABELS};
    use ratatui::{backend::TestBackend, Terminal};

    fn factors(sources: [&str; 5]) -> Vec<TopFactor> {
        TOP_FACTOR_LABELS
            .iter()
            .zip(sources)
            .enumerate()
            .map(|(i, (label, source))| TopFactor {
                label: (*label).to_string(),
                importance: 0.2 - i as f64 * 0.03,
                source_feature: source.to_string(),
            })
            .collect()
    }

    fn draw(report: &RiskReport) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
        terminal
            .draw(|f| render_report(f, f.area(), report))
            .expect("draw");
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_moderate_report_renders() {
        let report = RiskReport::new(
            Prediction {
                label: 1,
                probability: 0.55,
            },
            factors(["bmi", "age", "blood_pressure", "glucose", "stress_level"]),
        );
        let screen = draw(&report);

        assert!(screen.contains("HealthAI Predictor"));
        assert!(screen.contains("AI Powered Medical Risk Analysis System"));
        assert!(screen.contains("High Health Risk"));
        assert!(screen.contains("Probability: 0.55"));
        assert!(screen.contains("High Risk: 55%"));
        assert!(screen.contains("Healthy: 45%"));
        assert!(screen.contains("Overall Risk Category: MODERATE RISK"));
        assert!(screen.contains("Random Forest Classifier"));
        assert!(!screen.contains("label is positional"));
        assert!(screen.contains("[N] New Patient (clears form)"));
    }

    #[test]
    fn test_healthy_report_and_mislabel_note() {
        let report = RiskReport::new(
            Prediction {
                label: 0,
                probability: 0.12,
            },
            factors(["glucose", "age", "blood_pressure", "bmi", "stress_level"]),
        );
        let screen = draw(&report);

        assert!(screen.contains("Healthy Individual"));
        assert!(screen.contains("Probability: 0.12"));
        assert!(screen.contains("Overall Risk Category: LOW RISK"));
        assert!(screen.contains("BMI*"));
        assert!(screen.contains("label is positional"));
    }

    #[test]
    fn test_percent_formatting() {
        assert_eq!(percent(0.4), "40%");
        assert_eq!(percent(0.996), "100%");
        assert_eq!(percent(0.0), "0%");
    }
}
