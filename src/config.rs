//! Engine configuration

/// Engine configuration options
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Buffer capacity of channel-backed delivery handles created through
    /// [`RelayEngine::subscribe`](crate::engine::RelayEngine::subscribe)
    pub event_capacity: usize,

    /// Initial capacity reserved for a new audio transfer's chunk table
    pub chunk_capacity_hint: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_capacity: 64,
            chunk_capacity_hint: 16,
        }
    }
}

impl EngineConfig {
    /// Set the delivery-handle buffer capacity
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Set the chunk-table preallocation hint
    pub fn chunk_capacity_hint(mut self, hint: usize) -> Self {
        self.chunk_capacity_hint = hint;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.event_capacity, 64);
        assert_eq!(config.chunk_capacity_hint, 16);
    }

    #[test]
    fn test_builder_chaining() {
        let config = EngineConfig::default().event_capacity(8).chunk_capacity_hint(0);
        assert_eq!(config.event_capacity, 8);
        assert_eq!(config.chunk_capacity_hint, 0);
    }

    #[test]
    fn test_event_capacity_floor() {
        // A zero-capacity channel would panic at construction
        let config = EngineConfig::default().event_capacity(0);
        assert_eq!(config.event_capacity, 1);
    }
}
