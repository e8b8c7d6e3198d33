use chrono::{TimeZone, Utc};
use triage_backend::{filter_history, render_header, SessionEntry};

const SAMPLE_LOG: &str = include_str!("fixtures/sample_log.md");

fn log_with(entries: &[(&str, Option<&str>, &str)]) -> String {
    let mut log = render_header("prop-user", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    for (i, (symptoms, context, diagnosis)) in entries.iter().enumerate() {
        log.push_str(
            &SessionEntry {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, i as u32 + 1, 0, 0).unwrap(),
                symptoms: symptoms.to_string(),
                health_context: context.map(str::to_string),
                diagnosis: diagnosis.to_string(),
            }
            .render(),
        );
    }
    log
}

#[test]
fn sample_log_filtered_view_has_no_model_text() {
    let view = filter_history(SAMPLE_LOG);

    assert!(view.starts_with("# Medical History - User demo-user\n"));
    assert!(view.contains("persistent dry cough for two weeks, worse at night"));
    assert!(view.contains("non-smoker, works in a dusty warehouse"));
    assert!(view.contains("cough resolved, now mild sore throat"));

    assert!(!view.contains("airway irritation"));
    assert!(!view.contains("dust mask"));
    assert!(!view.contains("viral infection"));
    assert!(!view.contains("**Diagnosis & Recommendations:**"));
    assert_eq!(view.matches("### Session").count(), 2);
}

#[test]
fn well_formed_logs_keep_every_user_field_and_no_model_output() {
    let entries: &[(&str, Option<&str>, &str)] = &[
        ("fever and chills", Some("recently traveled"), "Could be malaria, get tested."),
        ("mild headache", None, "Probably dehydration."),
        ("sore wrist\nswelling on the left side", Some("plays tennis"), "RSI.\nRest it."),
    ];
    let view = filter_history(&log_with(entries));

    let mut cursor = 0;
    for (symptoms, context, diagnosis) in entries {
        // User-asserted fields verbatim, in original order.
        let at = view[cursor..]
            .find(symptoms)
            .unwrap_or_else(|| panic!("symptoms {symptoms:?} missing or out of order"));
        cursor += at + symptoms.len();
        if let Some(context) = context {
            assert!(view.contains(context), "context {context:?} missing");
        }
        // Zero substrings of any model output.
        for line in diagnosis.lines() {
            assert!(!view.contains(line), "model text {line:?} leaked into the view");
        }
    }
}

#[test]
fn single_entry_with_diagnosis_reduces_to_symptoms_only() {
    let view = filter_history(&log_with(&[(
        "cough",
        None,
        "A long diagnosis paragraph that must disappear.",
    )]));

    let history_body = view
        .split("## Session History")
        .nth(1)
        .expect("view carries the history label");
    let content_lines: Vec<&str> = history_body
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with("### Session"))
        .collect();

    assert_eq!(content_lines, vec!["**Symptoms Reported:**", "cough"]);
}

#[test]
fn filtering_a_filtered_view_is_a_fixed_point() {
    let view = filter_history(SAMPLE_LOG);
    assert_eq!(view, filter_history(&view));
}

#[test]
fn empty_input_yields_bare_section_label() {
    let view = filter_history("");
    assert_eq!(view, "\n---\n\n## Session History\n");
}
