//! Which ticket status changes are allowed.

use std::fmt;
use std::str::FromStr;

use crate::models::TicketStatus;
use crate::models::TicketStatus::{InProgress, Resolved, Todo, WaitingVendor};

/// Allowed moves under [`TransitionPolicy::Strict`], as (from, to) pairs.
const STRICT_TRANSITIONS: &[(TicketStatus, TicketStatus)] = &[
    (Todo, InProgress),
    (Todo, WaitingVendor),
    (Todo, Resolved),
    (InProgress, Todo),
    (InProgress, WaitingVendor),
    (InProgress, Resolved),
    (WaitingVendor, InProgress),
    (WaitingVendor, Resolved),
    (Resolved, InProgress),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Any status may follow any other (the board lets agents drag freely).
    #[default]
    Permissive,
    /// Only the moves listed in the transition table.
    Strict,
}

impl TransitionPolicy {
    /// Setting a ticket to the status it already has is always allowed.
    pub fn allows(self, from: TicketStatus, to: TicketStatus) -> bool {
        if from == to {
            return true;
        }
        match self {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::Strict => STRICT_TRANSITIONS.contains(&(from, to)),
        }
    }

    pub fn allowed_targets(self, from: TicketStatus) -> Vec<TicketStatus> {
        TicketStatus::ALL
            .into_iter()
            .filter(|&to| to != from && self.allows(from, to))
            .collect()
    }
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(TransitionPolicy::Permissive),
            "strict" => Ok(TransitionPolicy::Strict),
            other => Err(format!(
                "Invalid transition policy '{}'. Must be one of: permissive, strict",
                other
            )),
        }
    }
}

impl fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionPolicy::Permissive => f.write_str("permissive"),
            TransitionPolicy::Strict => f.write_str("strict"),
        }
    }
}
