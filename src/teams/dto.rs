use serde::Deserialize;

/// Body for team create and full-replace update. A request without a
/// description clears it.
#[derive(Debug, Deserialize)]
pub struct TeamPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}
