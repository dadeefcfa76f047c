// Sensify - Emergency Contact
//
// The one durable value in the app. Read once at startup, written only by
// an explicit save.

use crate::config::*;
use crate::drivers::storage::KeyValueStore;
use crate::error::{Result, SensifyError};

/// Strips everything but digits and enforces the minimum length.
pub fn normalize_number(input: &str) -> Result<String> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < EMERGENCY_CONTACT_MIN_DIGITS {
        return Err(SensifyError::InvalidContact {
            min: EMERGENCY_CONTACT_MIN_DIGITS,
        });
    }
    Ok(digits)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmergencyContact {
    number: Option<String>,
}

impl EmergencyContact {
    pub fn load(store: &impl KeyValueStore) -> Result<Self> {
        let number = store
            .get_string(EMERGENCY_CONTACT_KEY)
            .map_err(|e| SensifyError::Persistence(format!("{e:#}")))?;
        Ok(Self { number })
    }

    /// Validates and persists `input`. The in-memory value only changes
    /// once the write succeeded.
    pub fn save(&mut self, store: &mut impl KeyValueStore, input: &str) -> Result<&str> {
        let cleaned = normalize_number(input)?;
        store
            .set_string(EMERGENCY_CONTACT_KEY, &cleaned)
            .map_err(|e| {
                log::error!("save contact error: {:#}", e);
                SensifyError::Persistence(format!("{e:#}"))
            })?;
        log::info!("emergency contact saved");
        Ok(self.number.insert(cleaned).as_str())
    }

    pub fn number(&self) -> Option<&str> {
        self.number.as_deref()
    }

    pub fn display(&self) -> &str {
        self.number().unwrap_or("Not Set")
    }
}
