//! Step trace recorder
//!
//! Ciphers report each transformed unit (a letter, a digraph, a Hill
//! block, a transposition column) as a [`Step`]. The trace is what the
//! step-by-step tables display, and it doubles as a test oracle.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One transformed unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Index of the unit among transformed units (pass-through chars excluded)
    pub position: usize,
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub output: String,
}

impl Step {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            position: 0,
            input: input.into(),
            key: None,
            shift: None,
            detail: None,
            output: output.into(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_shift(mut self, shift: i64) -> Self {
        self.shift = Some(shift);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Result of one encrypt/decrypt call
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CipherOutput {
    pub output: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
}

impl CipherOutput {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            steps: Vec::new(),
        }
    }

    /// Plain-text step table
    pub fn render_steps(&self) -> String {
        let mut out = String::new();
        out.push_str("  #     IN        KEY       SHIFT   OUT\n");
        out.push_str("  ----  --------  --------  ------  --------\n");
        for step in &self.steps {
            out.push_str(&format!(
                "  {:<4}  {:<8}  {:<8}  {:<6}  {}",
                step.position + 1,
                step.input,
                step.key.as_deref().unwrap_or("-"),
                step.shift.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
                step.output,
            ));
            if let Some(detail) = &step.detail {
                out.push_str(&format!("  ({detail})"));
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for CipherOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.output)
    }
}

/// Collects steps while a transform runs
#[derive(Debug, Clone, Default)]
pub struct Trace {
    enabled: bool,
    recorded: usize,
    steps: Vec<Step>,
}

impl Trace {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            recorded: 0,
            steps: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record a step; its position is assigned here
    pub fn record(&mut self, mut step: Step) {
        step.position = self.recorded;
        self.recorded += 1;
        if self.enabled {
            self.steps.push(step);
        }
    }

    /// Number of units recorded, kept even when steps are discarded
    pub fn len(&self) -> usize {
        self.recorded
    }

    pub fn is_empty(&self) -> bool {
        self.recorded == 0
    }

    pub fn finish(self, output: impl Into<String>) -> CipherOutput {
        CipherOutput {
            output: output.into(),
            steps: self.steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_assigned_in_order() {
        let mut trace = Trace::new(true);
        trace.record(Step::new("A", "D").with_shift(3));
        trace.record(Step::new("B", "E").with_shift(3));
        let out = trace.finish("DE");
        assert_eq!(out.steps.len(), 2);
        assert_eq!(out.steps[1].position, 1);
        assert_eq!(out.steps[0].shift, Some(3));
    }

    #[test]
    fn test_disabled_trace_counts_but_drops() {
        let mut trace = Trace::new(false);
        trace.record(Step::new("A", "B"));
        assert_eq!(trace.len(), 1);
        assert!(trace.finish("B").steps.is_empty());
    }

    #[test]
    fn test_render_steps() {
        let mut trace = Trace::new(true);
        trace.record(Step::new("A", "K").with_key("K").with_shift(10));
        let table = trace.finish("K").render_steps();
        assert!(table.contains("A"));
        assert!(table.contains("10"));
        assert_eq!(table.lines().count(), 3);
    }

    #[test]
    fn test_json_skips_empty_fields() {
        let mut trace = Trace::new(true);
        trace.record(Step::new("A", "Z"));
        let json = serde_json::to_string(&trace.finish("Z")).unwrap();
        assert!(!json.contains("key"));
        assert!(json.contains("\"output\":\"Z\""));
    }
}
