use serde::Deserialize;
use serde::Serialize;

/// When a voter is allowed to see a poll's tally.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResultsVisibility {
    /// Visible once the voter has voted, or to everyone after completion.
    #[default]
    AfterVoteOrCompleted,
    /// Visible to everyone after completion only. No partial results.
    CompletedOnly,
    /// Always visible.
    Always,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ResultsConfig {
    #[serde(default)]
    pub visibility: ResultsVisibility,
}
