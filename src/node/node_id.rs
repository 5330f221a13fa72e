use serde::{Deserialize, Serialize};

/// Name of a cluster member (`n1`) or client (`c4`), as assigned by the runtime
#[derive(
    Clone, Debug, Default, Deserialize, Serialize, PartialEq, PartialOrd, Ord, Eq, Hash,
)]
pub struct NodeName(String);

impl NodeName {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Clients are named with a `c` prefix, cluster members with `n`
    pub fn is_client(&self) -> bool {
        self.0.starts_with('c')
    }
}

impl From<&str> for NodeName {
    fn from(id: &str) -> Self {
        NodeName::new(id.to_string())
    }
}

impl From<String> for NodeName {
    fn from(id: String) -> Self {
        NodeName::new(id)
    }
}

impl std::fmt::Display for NodeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
