//! # Domain Enumerations
//!
//! Incident type codes as the contract stores them, and the role hierarchy
//! used for dispute authorization.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Traffic incident category. The numeric code is what the ledger stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    Collision,
    Speeding,
    IllegalParking,
    RedLight,
    LaneInvasion,
    /// Any category without a dedicated code.
    Other,
}

impl IncidentType {
    /// All categories, in code order.
    pub fn all() -> &'static [IncidentType] {
        &[
            Self::Collision,
            Self::Speeding,
            Self::IllegalParking,
            Self::RedLight,
            Self::LaneInvasion,
            Self::Other,
        ]
    }

    /// Contract type code.
    pub fn code(&self) -> u8 {
        match self {
            Self::Collision => 1,
            Self::Speeding => 2,
            Self::IllegalParking => 3,
            Self::RedLight => 4,
            Self::LaneInvasion => 5,
            Self::Other => 99,
        }
    }

    /// Decode a contract type code. Unlisted codes read as `Other` so that
    /// records written by newer clients still display.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Collision,
            2 => Self::Speeding,
            3 => Self::IllegalParking,
            4 => Self::RedLight,
            5 => Self::LaneInvasion,
            _ => Self::Other,
        }
    }

    /// Map a field label to a category. Matches the snake_case names and the
    /// Spanish labels used on the reporting form; anything else is `Other`.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "collision" | "colisión" | "colision" => Self::Collision,
            "speeding" | "exceso de velocidad" => Self::Speeding,
            "illegal_parking" | "estacionamiento indebido" => Self::IllegalParking,
            "red_light" | "semáforo en rojo" | "semaforo en rojo" => Self::RedLight,
            "lane_invasion" | "invasión de carril" | "invasion de carril" => Self::LaneInvasion,
            _ => Self::Other,
        }
    }

    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collision => "collision",
            Self::Speeding => "speeding",
            Self::IllegalParking => "illegal_parking",
            Self::RedLight => "red_light",
            Self::LaneInvasion => "lane_invasion",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for IncidentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller role, ordered by privilege.
///
/// `Reporter < Verifier < SecondaryAuditor < PrimaryAuditor`. Authorization
/// checks compare with `>=` against a minimum role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Field agent who commits and reveals incidents.
    Reporter,
    /// May challenge a revealed incident.
    Verifier,
    /// Reviews disputes but cannot close them.
    SecondaryAuditor,
    /// Closes disputes.
    PrimaryAuditor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reporter => "reporter",
            Self::Verifier => "verifier",
            Self::SecondaryAuditor => "secondary_auditor",
            Self::PrimaryAuditor => "primary_auditor",
        }
    }

    /// Whether this role meets the given minimum.
    pub fn at_least(&self, minimum: Role) -> bool {
        *self >= minimum
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "reporter" | "agent" => Ok(Self::Reporter),
            "verifier" => Ok(Self::Verifier),
            "secondary_auditor" | "secondary" => Ok(Self::SecondaryAuditor),
            "primary_auditor" | "primary" | "auditor" => Ok(Self::PrimaryAuditor),
            _ => Err(ValidationError::UnknownRole(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_codes_round_trip() {
        for t in IncidentType::all() {
            assert_eq!(IncidentType::from_code(t.code()), *t);
        }
        assert_eq!(IncidentType::from_code(42), IncidentType::Other);
    }

    #[test]
    fn spanish_labels_map_to_codes() {
        assert_eq!(IncidentType::from_label("Colisión").code(), 1);
        assert_eq!(IncidentType::from_label("Exceso de velocidad").code(), 2);
        assert_eq!(IncidentType::from_label("Semáforo en rojo").code(), 4);
        assert_eq!(IncidentType::from_label("Otro").code(), 99);
    }

    #[test]
    fn role_ordering() {
        assert!(Role::PrimaryAuditor > Role::SecondaryAuditor);
        assert!(Role::SecondaryAuditor > Role::Verifier);
        assert!(Role::Verifier > Role::Reporter);
        assert!(Role::SecondaryAuditor.at_least(Role::Verifier));
        assert!(!Role::Reporter.at_least(Role::Verifier));
    }

    #[test]
    fn role_parsing() {
        assert_eq!("primary-auditor".parse::<Role>().unwrap(), Role::PrimaryAuditor);
        assert_eq!("Verifier".parse::<Role>().unwrap(), Role::Verifier);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn role_display_parses_back() {
        for r in [
            Role::Reporter,
            Role::Verifier,
            Role::SecondaryAuditor,
            Role::PrimaryAuditor,
        ] {
            assert_eq!(r.to_string().parse::<Role>().unwrap(), r);
        }
    }
}
