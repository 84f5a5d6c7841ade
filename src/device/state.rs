use crate::error::StateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Disconnected,
    Connecting,
    Connected,
    Subscribed,
    Disconnecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    BeginConnect,
    ConnectSucceeded,
    ConnectFailed,
    SubscribeSucceeded,
    BeginTeardown,
    TeardownComplete,
}

/// Lifecycle state of the single device session.
///
/// Phases only move forward, except for teardown which is allowed from every phase and always
/// ends in `Disconnected`. `subscription_active` is true only between a successful subscribe and
/// the end of the matching teardown.
#[derive(Debug, Clone)]
pub struct SessionState {
    phase: Phase,
    target_name: String,
    subscription_active: bool,
}

impl SessionState {
    pub fn new(target_name: impl Into<String>) -> Self {
        SessionState {
            phase: Phase::Disconnected,
            target_name: target_name.into(),
            subscription_active: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn subscription_active(&self) -> bool {
        self.subscription_active
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.phase, Phase::Connected | Phase::Subscribed)
    }

    /// The phase `event` would lead to, without applying it.
    pub fn next_phase(&self, event: SessionEvent) -> Result<Phase, StateError> {
        use Phase::*;
        use SessionEvent::*;

        let next = match (self.phase, event) {
            (Disconnected, BeginConnect) => Connecting,
            (Connecting, ConnectSucceeded) => Connected,
            (Connecting, ConnectFailed) => Disconnected,
            (Connected, SubscribeSucceeded) => Subscribed,
            (Disconnected, BeginTeardown) => Disconnected,
            (_, BeginTeardown) => Disconnecting,
            (Disconnecting | Disconnected, TeardownComplete) => Disconnected,
            (from, event) => return Err(StateError::InvalidTransition { from, event }),
        };

        Ok(next)
    }

    pub fn apply(&mut self, event: SessionEvent) -> Result<Phase, StateError> {
        let next = self.next_phase(event)?;

        match event {
            SessionEvent::SubscribeSucceeded => self.subscription_active = true,
            SessionEvent::TeardownComplete => self.subscription_active = false,
            _ => {},
        }

        self.phase = next;
        Ok(next)
    }
}
