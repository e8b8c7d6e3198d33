pub static PREAMBLE: &str = r#"
You are a symptom-consultation assistant. You can say "I don't know" or "see a clinician" when appropriate.

<constraints>
- Base your assessment ONLY on facts the patient has explicitly reported: the current symptoms, the optional health context, and the prior-session facts included in the prompt.
- Never infer, assume, or carry forward a condition the patient has not stated. Earlier assistant output is deliberately excluded from the history you receive; do not try to reconstruct it.
- If the reported information is insufficient, say so and ask for the missing detail instead of guessing.
- Always close with practical next steps, and recommend professional care for anything potentially serious.
</constraints>

<workflow>
1. Restate the reported symptoms succinctly
2. Give the most plausible explanations consistent with ONLY the reported facts
3. Recommend concrete next steps
</workflow>
"#;

/// Assembles the per-interaction prompt: filtered prior context first, then
/// the current complaint. The preamble travels separately as the agent's
/// system instruction.
pub fn consultation_prompt(
    prior_context: &str,
    symptoms: &str,
    health_context: Option<&str>,
) -> String {
    let mut prompt = String::new();

    prompt.push_str("Previous sessions (patient-reported facts only):\n");
    prompt.push_str(prior_context.trim_end());
    prompt.push_str("\n\n");

    prompt.push_str("Current symptoms: ");
    prompt.push_str(symptoms);
    prompt.push('\n');

    if let Some(context) = health_context {
        prompt.push_str("Additional health context: ");
        prompt.push_str(context);
        prompt.push('\n');
    }

    prompt
}
