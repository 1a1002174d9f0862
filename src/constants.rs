// -
// Database namespaces

/// Sled database tree namespaces
pub(crate) const POLLS_TREE: &str = "_polls";
pub(crate) const VOTES_TREE: &str = "_votes";
pub(crate) const VOTER_POLLS_TREE: &str = "_voter_polls";
