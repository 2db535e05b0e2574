use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Info,
    Success,
    Error,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    High,
}

/// Structured event record handed downstream; the core never decides how
/// an event is displayed, only how important it is.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EngineEvent {
    pub message: String,
    pub kind: EventKind,
    pub importance: Importance,
    pub tick: u64,
}

impl EngineEvent {
    pub fn info(tick: u64, importance: Importance, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: EventKind::Info,
            importance,
            tick,
        }
    }

    pub fn success(tick: u64, importance: Importance, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: EventKind::Success,
            importance,
            tick,
        }
    }

    pub fn error(tick: u64, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: EventKind::Error,
            importance: Importance::High,
            tick,
        }
    }
}

/// Per-tick counters, reset at the top of every tick. Behaviors append,
/// the engine reads them into the summary and running totals.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickCounters {
    pub insects_eaten: u32,
    pub eggs_eaten: u32,
    pub birds_hunted: u32,
    pub insects_born: u32,
    pub insects_died_of_old_age: u32,
    pub insects_poisoned: u32,
    pub eggs_laid: u32,
    pub flowers_pollinated: u32,
    pub flowers_withered: u32,
}
