//! State machine for invitations
//!
//! An invitation starts `pending` and is resolved exactly once into either
//! `accepted` or `declined`. Both resolutions are terminal. Whether a terminal
//! invitation may be resolved again is decided by the caller's
//! [`ResolutionPolicy`].

use serde::{Deserialize, Serialize};
use sharekit_common::{ResolutionPolicy, StateError};

// ============================================================================
// Invitation State Machine
// ============================================================================

/// Persisted status of an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
}

impl InvitationStatus {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Declined)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [InvitationStatus] {
        match self {
            Self::Pending => &[Self::Accepted, Self::Declined],
            Self::Accepted => &[],
            Self::Declined => &[],
        }
    }

    /// Value stored in the `status` field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events that trigger invitation state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationEvent {
    /// Invitee accepts and joins the category
    Accept,
    /// Invitee declines
    Decline,
}

impl InvitationEvent {
    /// Status an invitation ends up in once this event is applied
    pub fn target(&self) -> InvitationStatus {
        match self {
            Self::Accept => InvitationStatus::Accepted,
            Self::Decline => InvitationStatus::Declined,
        }
    }
}

impl std::fmt::Display for InvitationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => write!(f, "accept"),
            Self::Decline => write!(f, "decline"),
        }
    }
}

/// Invitation state machine
pub struct InvitationStateMachine;

impl InvitationStateMachine {
    /// Attempt a state transition, rejecting anything out of a terminal state
    pub fn transition(
        current: InvitationStatus,
        event: InvitationEvent,
    ) -> Result<InvitationStatus, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        match (current, event) {
            (InvitationStatus::Pending, InvitationEvent::Accept) => Ok(InvitationStatus::Accepted),
            (InvitationStatus::Pending, InvitationEvent::Decline) => {
                Ok(InvitationStatus::Declined)
            }
            _ => Err(StateError::InvalidTransition {
                from: current.to_string(),
                event: event.to_string(),
            }),
        }
    }

    /// Resolve an invitation under `policy`.
    ///
    /// `Permissive` lets a terminal invitation be resolved again, landing on the
    /// event's target status regardless of where it was.
    pub fn resolve(
        current: InvitationStatus,
        event: InvitationEvent,
        policy: ResolutionPolicy,
    ) -> Result<InvitationStatus, StateError> {
        match policy {
            ResolutionPolicy::Strict => Self::transition(current, event),
            ResolutionPolicy::Permissive => Ok(event.target()),
        }
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(current: InvitationStatus, event: &InvitationEvent) -> bool {
        Self::transition(current, *event).is_ok()
    }
}

// ============================================================================
// Tests
// ============================================================================
