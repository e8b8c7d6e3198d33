use std::sync::LazyLock;

use regex::Regex;

use crate::entry::{
    DIAGNOSIS_MARKER, ENTRY_MARKER, HEALTH_CONTEXT_MARKER, HISTORY_LABEL, SEPARATOR,
    SYMPTOMS_MARKER,
};

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"# Medical History - User [^\n]+\n\n\*\*Created:\*\* [^\n]+\n")
        .expect("header pattern is valid")
});

/// Which field of an entry the line scanner is currently inside. One
/// enumerated state instead of three independent flags, so invalid
/// combinations cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Symptoms,
    HealthContext,
    Diagnosis,
}

/// Reconstructs a session log keeping only patient-asserted fields.
///
/// Pure and deterministic; performs no I/O. The derived view is recomputed
/// on every read and never persisted. Guarantee: the output contains zero
/// characters that appeared strictly after a diagnosis marker within an
/// entry, up to the next separator or marker line.
///
/// Line transitions:
/// - `### Session ...` flushes the current block and starts a new one
///   (section is deliberately left as-is, matching the original scanner).
/// - a symptoms / health-context marker enters that section and is kept.
/// - a diagnosis marker enters `Diagnosis` and is dropped along with
///   everything that follows it.
/// - a line that is exactly `---` resets to `None` without being kept.
/// - any other line is kept only inside `Symptoms` or `HealthContext`.
///
/// At end of input the pending block is flushed unless the scanner is still
/// inside a diagnosis section. That drops a final entry whose diagnosis has
/// no trailing separator, symptoms included. Compatibility with the
/// original behavior; pinned by `trailing_diagnosis_without_separator_drops_entry`.
pub fn filter_history(log: &str) -> String {
    let mut completed: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut section = Section::None;

    for line in log.split('\n') {
        if line.starts_with(ENTRY_MARKER) {
            flush(&mut current, &mut completed);
            current.push(line);
        } else if line.contains(SYMPTOMS_MARKER) {
            section = Section::Symptoms;
            current.push(line);
        } else if line.contains(HEALTH_CONTEXT_MARKER) {
            section = Section::HealthContext;
            current.push(line);
        } else if line.contains(DIAGNOSIS_MARKER) {
            section = Section::Diagnosis;
        } else if line == SEPARATOR {
            section = Section::None;
        } else if matches!(section, Section::Symptoms | Section::HealthContext) {
            current.push(line);
        }
    }

    if section != Section::Diagnosis {
        flush(&mut current, &mut completed);
    }

    let header = HEADER_RE.find(log).map(|m| m.as_str()).unwrap_or("");

    let mut out = String::from(header);
    out.push('\n');
    out.push_str(SEPARATOR);
    out.push_str("\n\n");
    out.push_str(HISTORY_LABEL);
    out.push('\n');
    if !completed.is_empty() {
        out.push('\n');
        out.push_str(&completed.join("\n\n"));
        out.push('\n');
    }
    out
}

fn flush(current: &mut Vec<&str>, completed: &mut Vec<String>) {
    if current.is_empty() {
        return;
    }
    let block = current.join("\n").trim_end().to_string();
    if !block.is_empty() {
        completed.push(block);
    }
    current.clear();
}
