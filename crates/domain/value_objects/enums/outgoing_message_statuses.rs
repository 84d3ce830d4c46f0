use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Queue row lifecycle. Only `Pending -> Sent`, `Pending -> Pending` (retry)
/// and `Pending -> Dead` are legal; `Sent` and `Dead` are terminal.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutgoingMessageStatus {
    #[default]
    Pending,
    Sent,
    Dead,
}

impl OutgoingMessageStatus {
    pub fn can_transition_to(&self, next: OutgoingMessageStatus) -> bool {
        matches!(
            (self, next),
            (OutgoingMessageStatus::Pending, OutgoingMessageStatus::Pending)
                | (OutgoingMessageStatus::Pending, OutgoingMessageStatus::Sent)
                | (OutgoingMessageStatus::Pending, OutgoingMessageStatus::Dead)
        )
    }
}

impl Display for OutgoingMessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            OutgoingMessageStatus::Pending => "pending",
            OutgoingMessageStatus::Sent => "sent",
            OutgoingMessageStatus::Dead => "dead",
        };
        write!(f, "{}", status)
    }
}

impl FromStr for OutgoingMessageStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "pending" => Ok(OutgoingMessageStatus::Pending),
            "sent" => Ok(OutgoingMessageStatus::Sent),
            "dead" => Ok(OutgoingMessageStatus::Dead),
            other => Err(format!("Unsupported outgoing message status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_never_move() {
        for terminal in [OutgoingMessageStatus::Sent, OutgoingMessageStatus::Dead] {
            for next in [
                OutgoingMessageStatus::Pending,
                OutgoingMessageStatus::Sent,
                OutgoingMessageStatus::Dead,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn pending_moves_anywhere() {
        let pending = OutgoingMessageStatus::Pending;
        assert!(pending.can_transition_to(OutgoingMessageStatus::Pending));
        assert!(pending.can_transition_to(OutgoingMessageStatus::Sent));
        assert!(pending.can_transition_to(OutgoingMessageStatus::Dead));
    }
}
