use chrono::{DateTime, Utc};

/// Line prefix that starts a session entry.
pub const ENTRY_MARKER: &str = "### Session";
pub const SYMPTOMS_MARKER: &str = "**Symptoms Reported:**";
pub const HEALTH_CONTEXT_MARKER: &str = "**Additional Health Context:**";
pub const DIAGNOSIS_MARKER: &str = "**Diagnosis & Recommendations:**";
/// A line that is exactly this rule terminates an entry.
pub const SEPARATOR: &str = "---";

pub const HISTORY_LABEL: &str = "## Session History";

/// One completed interaction, created only after the model stream finishes.
/// A failed or partial stream never becomes an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEntry {
    pub timestamp: DateTime<Utc>,
    pub symptoms: String,
    pub health_context: Option<String>,
    pub diagnosis: String,
}

impl SessionEntry {
    /// Serializes the entry with the fixed grammar the provenance filter
    /// parses back out. The health-context section is omitted entirely when
    /// absent.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push('\n');
        out.push_str(ENTRY_MARKER);
        out.push(' ');
        out.push_str(&self.timestamp.to_rfc3339());
        out.push_str("\n\n");

        out.push_str(SYMPTOMS_MARKER);
        out.push('\n');
        out.push_str(&self.symptoms);
        out.push_str("\n\n");

        if let Some(context) = &self.health_context {
            out.push_str(HEALTH_CONTEXT_MARKER);
            out.push('\n');
            out.push_str(context);
            out.push_str("\n\n");
        }

        out.push_str(DIAGNOSIS_MARKER);
        out.push('\n');
        out.push_str(&self.diagnosis);
        out.push_str("\n\n");
        out.push_str(SEPARATOR);
        out.push('\n');
        out
    }
}

/// Header written once when a user's log is first created.
pub fn render_header(user_id: &str, created: DateTime<Utc>) -> String {
    format!(
        "# Medical History - User {}\n\n**Created:** {}\n\n{}\n\n{}\n",
        user_id,
        created.to_rfc3339(),
        SEPARATOR,
        HISTORY_LABEL,
    )
}
