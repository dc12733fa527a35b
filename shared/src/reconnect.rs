use std::time::Duration;

use rust_fsm::StateMachineImpl;
use serde::{Deserialize, Serialize};

use crate::fsm::{ConnectionEvent, ConnectionPhase};

/// Retry rule for a dropped socket. The delay is fixed; it does not grow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    pub max_attempts: u32,
    #[serde(with = "millis")]
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 5,
            delay: Duration::from_millis(3000),
        }
    }
}

impl ReconnectPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn delay_millis(&self) -> u32 {
        u32::try_from(self.delay.as_millis()).unwrap_or(u32::MAX)
    }
}

/// What the socket owner should do after a drop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconnectAction {
    /// Arm a timer for `delay`, then call [`Reconnector::retry_due`].
    Retry { attempt: u32, delay: Duration },
    GiveUp,
    /// The drop arrived in a phase that does not react to it (e.g. after close).
    Ignore,
}

/// Drives [`ConnectionPhase`] and counts retries since the last successful open.
#[derive(Clone, Debug)]
pub struct Reconnector {
    policy: ReconnectPolicy,
    phase: ConnectionPhase,
    attempts: u32,
}

impl Reconnector {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            phase: ConnectionPhase::INITIAL_STATE,
            attempts: 0,
        }
    }

    pub fn phase(&self) -> &ConnectionPhase {
        &self.phase
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    fn apply(&mut self, event: ConnectionEvent) -> bool {
        match ConnectionPhase::transition(&self.phase, &event) {
            Some(next) => {
                self.phase = next;
                true
            }
            None => false,
        }
    }

    /// Start (or restart) connecting. Returns false when already live.
    pub fn connect(&mut self) -> bool {
        if self.apply(ConnectionEvent::Connect) {
            self.attempts = 0;
            true
        } else {
            false
        }
    }

    pub fn opened(&mut self) -> bool {
        if self.apply(ConnectionEvent::Opened) {
            self.attempts = 0;
            true
        } else {
            false
        }
    }

    pub fn dropped(&mut self) -> ReconnectAction {
        if !matches!(self.phase, ConnectionPhase::Connecting | ConnectionPhase::Open) {
            return ReconnectAction::Ignore;
        }

        if self.policy.enabled && self.attempts < self.policy.max_attempts {
            self.apply(ConnectionEvent::Dropped);
            self.attempts += 1;
            ReconnectAction::Retry {
                attempt: self.attempts,
                delay: self.policy.delay,
            }
        } else {
            self.apply(ConnectionEvent::GiveUp);
            ReconnectAction::GiveUp
        }
    }

    /// The retry timer fired. Returns true if a new connection should be opened.
    pub fn retry_due(&mut self) -> bool {
        self.apply(ConnectionEvent::RetryDue)
    }

    pub fn close(&mut self) -> bool {
        self.apply(ConnectionEvent::Close)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(delay: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
