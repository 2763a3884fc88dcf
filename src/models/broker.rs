use serde::{Deserialize, Serialize};
use super::BrokerId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broker {
    pub id: BrokerId,
    #[serde(default)]
    pub rack: Option<String>,
}

impl Broker {
    pub fn new(id: BrokerId, rack: Option<String>) -> Self {
        Self { id, rack }
    }

    /// Convenience constructor for a broker tagged with a rack
    pub fn in_rack(id: BrokerId, rack: &str) -> Self {
        Self::new(id, Some(rack.to_string()))
    }

    pub fn rack(&self) -> Option<&str> {
        self.rack.as_deref()
    }
}
