use crate::models::BrokerId;
use crate::MigrationError;
use std::collections::VecDeque;

/// Circular sequence of target brokers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerRotation {
    brokers: VecDeque<BrokerId>,
}

impl BrokerRotation {
    /// Build a rotation in the given order, then rotate it left by `start_bias`
    /// positions.
    pub fn new(brokers: &[BrokerId], start_bias: usize) -> Result<Self, MigrationError> {
        if brokers.is_empty() {
            return Err(MigrationError::InvalidConfiguration(
                "broker rotation needs at least one target broker".to_string(),
            ));
        }

        let mut rotation = Self {
            brokers: brokers.iter().copied().collect(),
        };
        rotation.advance(start_bias);
        Ok(rotation)
    }

    /// Take the front broker and move it to the back.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<BrokerId> {
        let broker = self.brokers.pop_front()?;
        self.brokers.push_back(broker);
        Some(broker)
    }

    /// Rotate left by `steps` positions
    pub fn advance(&mut self, steps: usize) {
        if self.brokers.is_empty() {
            return;
        }
        let steps = steps % self.brokers.len();
        self.brokers.rotate_left(steps);
    }

    pub fn pop_front(&mut self) -> Option<BrokerId> {
        self.brokers.pop_front()
    }

    pub fn push_back(&mut self, broker: BrokerId) {
        self.brokers.push_back(broker);
    }

    pub fn push_front(&mut self, broker: BrokerId) {
        self.brokers.push_front(broker);
    }

    /// Brokers in current rotation order, front first
    pub fn iter(&self) -> impl Iterator<Item = BrokerId> + Clone + '_ {
        self.brokers.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.brokers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brokers.is_empty()
    }
}
