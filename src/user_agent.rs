//! Identifying User-Agent string for abstract page requests.
//!
//! arXiv asks automated clients to identify themselves with a contact point,
//! so every request carries the tool name, version and a contact address.

/// Contact address advertised in the User-Agent header.
const CONTACT: &str = "researcher@institution.edu";

/// Default User-Agent for abstract page fetches.
#[must_use]
pub(crate) fn default_harvest_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("arxiv-harvester/{version} (academic-research-bot; contact: {CONTACT})")
}
