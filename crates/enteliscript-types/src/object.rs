//! BACnet object references.

use std::fmt;
use std::str::FromStr;

use crate::error::EnteliError;

/// A typed, instance-numbered BACnet object reference, e.g. `AV1` for
/// analog-value instance 1.
///
/// Parsed from the compact `<letters><digits>` form users type at the
/// command line. The type prefix is uppercased so `av1` and `AV1` refer
/// to the same object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    /// Object type abbreviation (e.g. `AV`, `BV`, `AI`).
    pub object_type: String,
    /// Instance number within the device.
    pub instance: u32,
}

impl ObjectRef {
    /// Build a reference from an explicit type and instance.
    pub fn new(object_type: &str, instance: u32) -> Self {
        Self {
            object_type: object_type.to_ascii_uppercase(),
            instance,
        }
    }
}

impl FromStr for ObjectRef {
    type Err = EnteliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s.find(|c: char| c.is_ascii_digit());
        let (letters, digits) = match split {
            Some(i) if i > 0 => s.split_at(i),
            _ => {
                return Err(EnteliError::Command(format!(
                    "malformed object reference '{s}' (expected <letters><digits>, e.g. AV1)"
                )));
            },
        };
        if !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(EnteliError::Command(format!(
                "malformed object reference '{s}' (expected <letters><digits>, e.g. AV1)"
            )));
        }
        let instance: u32 = digits.parse().map_err(|_| {
            EnteliError::Command(format!(
                "malformed object reference '{s}' (bad instance number '{digits}')"
            ))
        })?;
        Ok(Self::new(letters, instance))
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.object_type, self.instance)
    }
}
