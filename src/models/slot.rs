use serde::{Deserialize, Serialize};

/// A bookable half-hour slot.
///
/// `value` is the four digit 24-hour clock form the booking API expects
/// (`"0830"`), `label` is the human form (`"8:30"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TimeSlot {
    pub value: String,

    pub label: String,
}

impl TimeSlot {
    #[must_use]
    pub fn new(hour: u32, minute: u32) -> Self {
        Self {
            value: format!("{hour:02}{minute:02}"),
            label: format!("{hour}:{minute:02}"),
        }
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}
