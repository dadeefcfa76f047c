// Sensify - Key-Value Storage Driver
//
// On-device string persistence. Only the emergency contact uses it.

use std::collections::HashMap;

pub trait KeyValueStore {
    fn get_string(&self, key: &str) -> anyhow::Result<Option<String>>;

    fn set_string(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// In-memory store for the host build and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_string(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set_string(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
