use crate::error::FlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Disconnected,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Connect,
    Disconnect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeStatus {
    Unarmed,
    Armed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeAction {
    MintConfirmed,
    BurnConfirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Session(SessionStatus),
    Bridge(BridgeStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: FlowState,
    pub to: FlowState,
    pub reason: &'static str,
}

/// Connecting while connected rebuilds the session; disconnecting twice is a no-op.
pub fn session_transition(
    from: SessionStatus,
    action: SessionAction,
) -> (SessionStatus, StateTransition) {
    let (to, reason) = match (from, action) {
        (SessionStatus::Disconnected, SessionAction::Connect) => {
            (SessionStatus::Connected, "session_connected")
        }
        (SessionStatus::Connected, SessionAction::Connect) => {
            (SessionStatus::Connected, "session_replaced")
        }
        (SessionStatus::Connected, SessionAction::Disconnect) => {
            (SessionStatus::Disconnected, "session_disconnected")
        }
        (SessionStatus::Disconnected, SessionAction::Disconnect) => {
            (SessionStatus::Disconnected, "already_disconnected")
        }
    };
    (
        to,
        StateTransition {
            from: FlowState::Session(from),
            to: FlowState::Session(to),
            reason,
        },
    )
}

pub fn bridge_transition(
    from: BridgeStatus,
    action: BridgeAction,
) -> Result<(BridgeStatus, StateTransition), FlowError> {
    let (to, reason) = match (from, action) {
        (BridgeStatus::Unarmed, BridgeAction::MintConfirmed) => (BridgeStatus::Armed, "bridge_armed"),
        (BridgeStatus::Armed, BridgeAction::MintConfirmed) => {
            (BridgeStatus::Armed, "pending_token_overwritten")
        }
        (BridgeStatus::Armed, BridgeAction::BurnConfirmed) => {
            (BridgeStatus::Unarmed, "pending_token_burned")
        }
        (BridgeStatus::Unarmed, BridgeAction::BurnConfirmed) => return Err(FlowError::NotArmed),
    };
    Ok((
        to,
        StateTransition {
            from: FlowState::Bridge(from),
            to: FlowState::Bridge(to),
            reason,
        },
    ))
}
