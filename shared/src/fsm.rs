use rust_fsm::*;

/// Lifecycle of a reconnecting socket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// Created but never asked to connect.
    Idle,
    Connecting,
    Open,
    /// Waiting for the retry timer after a drop.
    Reconnecting,
    /// Retries used up (or reconnection disabled); stays down until asked again.
    Exhausted,
    /// Shut down on purpose.
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionEvent {
    Connect,
    Opened,
    Dropped,
    GiveUp,
    RetryDue,
    Close,
}

impl StateMachineImpl for ConnectionPhase {
    type Input = ConnectionEvent;
    type State = ConnectionPhase;
    type Output = ();
    const INITIAL_STATE: Self::State = ConnectionPhase::Idle;

    fn transition(state: &Self::State, input: &Self::Input) -> Option<Self::State> {
        use ConnectionEvent as E;
        use ConnectionPhase as P;

        match (state, input) {
            (P::Idle | P::Exhausted | P::Closed, E::Connect) => Some(P::Connecting),
            (P::Connecting, E::Opened) => Some(P::Open),
            (P::Connecting | P::Open, E::Dropped) => Some(P::Reconnecting),
            (P::Connecting | P::Open, E::GiveUp) => Some(P::Exhausted),
            (P::Reconnecting, E::RetryDue) => Some(P::Connecting),
            (P::Closed, E::Close) => None,
            (_, E::Close) => Some(P::Closed),
            _ => None,
        }
    }

    fn output(_state: &Self::State, _input: &Self::Input) -> Option<Self::Output> {
        None
    }
}

impl Default for ConnectionPhase {
    fn default() -> Self {
        <ConnectionPhase as StateMachineImpl>::INITIAL_STATE
    }
}

impl ConnectionPhase {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionPhase::Idle => "idle",
            ConnectionPhase::Connecting => "connecting",
            ConnectionPhase::Open => "connected",
            ConnectionPhase::Reconnecting => "reconnecting",
            ConnectionPhase::Exhausted => "disconnected",
            ConnectionPhase::Closed => "closed",
        }
    }

    /// True while the socket may still come up without outside help.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            ConnectionPhase::Connecting | ConnectionPhase::Open | ConnectionPhase::Reconnecting
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(state: ConnectionPhase, input: ConnectionEvent) -> Option<ConnectionPhase> {
        ConnectionPhase::transition(&state, &input)
    }

    #[test]
    fn starts_idle_without_outputs() {
        assert_eq!(ConnectionPhase::INITIAL_STATE, ConnectionPhase::Idle);
        assert_eq!(ConnectionPhase::default(), ConnectionPhase::INITIAL_STATE);
        assert_eq!(ConnectionPhase::output(&ConnectionPhase::Idle, &ConnectionEvent::Connect), None);
    }

    #[test]
    fn happy_path() {
        assert_eq!(step(ConnectionPhase::Idle, ConnectionEvent::Connect), Some(ConnectionPhase::Connecting));
        assert_eq!(step(ConnectionPhase::Connecting, ConnectionEvent::Opened), Some(ConnectionPhase::Open));
        assert_eq!(step(ConnectionPhase::Open, ConnectionEvent::Dropped), Some(ConnectionPhase::Reconnecting));
        assert_eq!(step(ConnectionPhase::Reconnecting, ConnectionEvent::RetryDue), Some(ConnectionPhase::Connecting));
    }

    #[test]
    fn close_wins_from_any_live_phase() {
        for phase in [
            ConnectionPhase::Idle,
            ConnectionPhase::Connecting,
            ConnectionPhase::Open,
            ConnectionPhase::Reconnecting,
            ConnectionPhase::Exhausted,
        ] {
            assert_eq!(step(phase, ConnectionEvent::Close), Some(ConnectionPhase::Closed));
        }
        assert_eq!(step(ConnectionPhase::Closed, ConnectionEvent::Close), None);
    }

    #[test]
    fn closed_socket_ignores_network_events() {
        assert_eq!(step(ConnectionPhase::Closed, ConnectionEvent::Dropped), None);
        assert_eq!(step(ConnectionPhase::Closed, ConnectionEvent::RetryDue), None);
        assert_eq!(step(ConnectionPhase::Exhausted, ConnectionEvent::RetryDue), None);
    }
}
