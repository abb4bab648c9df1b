use stl_core::Role;
use stl_state::IncidentError;
use thiserror::Error;

use crate::policy::DisputeAction;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArbitrationError {
    /// Caller's role is below the minimum for the action.
    #[error("{role} may not {action}; requires {required} or higher")]
    Unauthorized {
        action: DisputeAction,
        role: Role,
        required: Role,
    },

    /// A dispute must state a reason.
    #[error("dispute reason is empty")]
    EmptyReason,

    /// The reason could not be canonicalized for hashing.
    #[error("reason canonicalization failed: {0}")]
    Canonicalization(String),

    #[error(transparent)]
    Transition(#[from] IncidentError),
}
