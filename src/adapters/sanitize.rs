//! Log sanitization for patient metrics.
//!
//! Formatted log lines pass through [`SanitizingMakeWriter`] before reaching
//! the sink. Vital-sign `name=value` pairs, report ids and e-mail addresses are
//! replaced by placeholders. Call sites should still avoid logging submissions;
//! this only catches what slips through.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

/// Maximum number of bytes sanitized per line unless configured otherwise.
pub const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

struct Rule {
    regex: Regex,
    replacement: &'static str,
}

struct Patterns {
    set: RegexSet,
    rules: Vec<Rule>,
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn get_patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| {
        let rules: Vec<(&'static str, &'static str)> = vec![
            // Report ids
            (
                r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
                "[REDACTED-ID]",
            ),
            // Submission fields, as written by Debug/Display or key=value logging
            (
                r"(?i)\b(age|bmi|blood_pressure|glucose|heart_rate|sleep_hours|stress_level|exercise_hours|water_intake|smoking|alcohol|medical_history)\b(\s*[:=]\s*)(?:-?\d+(?:\.\d+)?|true|false)",
                "${1}${2}[REDACTED]",
            ),
            (
                r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
                "[REDACTED-EMAIL]",
            ),
        ];

        let set = RegexSet::new(rules.iter().map(|(p, _)| *p)).expect("Valid regex set");
        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| Rule {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement,
            })
            .collect();

        Patterns { set, rules }
    })
}

/// Replace patient metrics and identifiers in `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, DEFAULT_SANITIZE_MAX_BYTES)
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = get_patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for idx in patterns.set.matches(prefix).into_iter() {
        let rule = &patterns.rules[idx];
        result = rule
            .regex
            .replace_all(&result, rule.replacement)
            .into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// A `tracing_subscriber` writer wrapper that sanitizes each formatted line
/// before it is written to the underlying sink.
#[derive(Debug)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
    max_bytes: usize,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self::with_limit(inner, DEFAULT_SANITIZE_MAX_BYTES)
    }

    /// Wrap `inner`, truncating lines longer than `max_bytes`.
    #[must_use]
    pub fn with_limit(inner: M, max_bytes: usize) -> Self {
        Self {
            inner,
            max_bytes: max_bytes.max(1),
        }
    }
}

impl<M: Clone> Clone for SanitizingMakeWriter<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            max_bytes: self.max_bytes,
        }
    }
}

pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
    max_bytes: usize,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn new(inner: W, max_bytes: usize) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            max_bytes,
        }
    }

    fn sanitize(&self, bytes: &[u8]) -> String {
        sanitize_with_limit(&String::from_utf8_lossy(bytes), self.max_bytes)
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let sanitized = self.sanitize(&line[..pos]);
            self.inner.write_all(sanitized.as_bytes())?;
            self.inner.write_all(b"\n")?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A formatter that never emits a newline must not grow the buffer forever.
        let hard_cap = self.max_bytes.saturating_mul(2);
        if self.buffer.len() > hard_cap {
            let sanitized = self.sanitize(&self.buffer);
            self.inner.write_all(sanitized.as_bytes())?;
            self.inner.write_all(b"\n")?;
            self.buffer.clear();
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let sanitized = self.sanitize(&self.buffer);
            self.inner.write_all(sanitized.as_bytes())?;
            self.buffer.clear();
        }
        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer(), self.max_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sanitize_vitals() {
        let input = "submission age=45 glucose: 110 bmi=27.5 smoking=false";
        let sanitized = sanitize(input);
        assert!(!sanitized.contains("45"));
        assert!(!sanitized.contains("110"));
        assert!(!sanitized.contains("27.5"));
        assert!(sanitized.contains("age=[REDACTED]"));
        assert!(sanitized.contains("glucose: [REDACTED]"));
        assert!(sanitized.contains("smoking=[REDACTED]"));
    }

    #[test]
    fn test_sanitize_debug_output_of_submission() {
        let s = crate::domain::PatientSubmission::sample();
        let sanitized = sanitize(&format!("{s:?}"));
        assert!(!sanitized.contains("130.0"));
        assert!(sanitized.contains("blood_pressure: [REDACTED]"));
    }

    #[test]
    fn test_sanitize_report_id() {
        let sanitized = sanitize("report 550e8400-e29b-41d4-a716-446655440000 rendered");
        assert!(sanitized.contains("[REDACTED-ID]"));
        assert!(!sanitized.contains("550e8400"));
    }

    #[test]
    fn test_probability_and_plain_text_pass_through() {
        let line = "Report generated: label=1 probability=0.55 risk=MODERATE RISK";
        assert_eq!(sanitize(line), line);
        assert_eq!(
            sanitize("Loaded forest (trees=3)"),
            "Loaded forest (trees=3)"
        );
    }

    #[test]
    fn test_truncates_large_inputs() {
        let sanitized = sanitize_with_limit("prefix age=45 and a long tail", 10);
        assert!(sanitized.ends_with("[TRUNCATED]"));
    }

    #[test]
    fn test_writer_sanitizes_per_line() {
        let mut out = Vec::new();
        {
            let mut w = SanitizingWriter::new(&mut out, DEFAULT_SANITIZE_MAX_BYTES);
            w.write_all(b"first age=").expect("write");
            w.write_all(b"61\nsecond line\n").expect("write");
            w.flush().expect("flush");
        }
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, "first age=[REDACTED]\nsecond line\n");
    }

    #[test]
    fn test_writer_uses_configured_limit() {
        let make = SanitizingMakeWriter::with_limit(std::io::sink, 12);
        assert_eq!(make.max_bytes, 12);

        let mut out = Vec::new();
        {
            let mut w = SanitizingWriter::new(&mut out, 12);
            w.write_all(b"short\n").expect("write");
            w.write_all(b"heart_rate=75 tail\n").expect("write");
            w.flush().expect("flush");
        }
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, "short\nheart_rate=[REDACTED] [TRUNCATED]\n");
    }
}
