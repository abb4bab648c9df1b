//! # Dispute Authorization
//!
//! Roles are ordered, so each action needs only a minimum role. By default
//! any verifier may challenge a revealed incident and only the primary
//! auditor may close the challenge.

use serde::{Deserialize, Serialize};
use stl_core::Role;

use crate::error::ArbitrationError;

/// A dispute-related ledger action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeAction {
    Open,
    Resolve,
}

impl std::fmt::Display for DisputeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Open => "open a dispute",
            Self::Resolve => "resolve a dispute",
        })
    }
}

/// Minimum roles for dispute actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputePolicy {
    pub open_minimum: Role,
    pub resolve_minimum: Role,
}

impl Default for DisputePolicy {
    fn default() -> Self {
        Self {
            open_minimum: Role::Verifier,
            resolve_minimum: Role::PrimaryAuditor,
        }
    }
}

impl DisputePolicy {
    pub fn required(&self, action: DisputeAction) -> Role {
        match action {
            DisputeAction::Open => self.open_minimum,
            DisputeAction::Resolve => self.resolve_minimum,
        }
    }

    pub fn authorize(&self, action: DisputeAction, role: Role) -> Result<(), ArbitrationError> {
        let required = self.required(action);
        if role.at_least(required) {
            Ok(())
        } else {
            Err(ArbitrationError::Unauthorized {
                action,
                role,
                required,
            })
        }
    }
}
