//! Personnel record model.
//!
//! # Responsibility
//! - Define the shared personnel fields plus coach/player variant data.
//! - Provide the discriminator used by every file codec.
//! - Validate numeric and timestamp invariants before records are stored.
//!
//! # Invariants
//! - `salary`, `height` and `weight` are finite and non-negative.
//! - `updated_at` is never earlier than `created_at`.
//! - The variant of a record never changes after creation.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Integer identity of a personnel record.
pub type PersonalId = i64;

/// Sentinel id for records not yet stored.
pub const UNASSIGNED_ID: PersonalId = 0;

/// Coaching specialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialization {
    #[serde(rename = "ENTRENADOR_PRINCIPAL")]
    HeadCoach,
    #[serde(rename = "ENTRENADOR_ASISTENTE")]
    AssistantCoach,
    #[serde(rename = "ENTRENADOR_PORTEROS")]
    GoalkeeperCoach,
}

/// Field position of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "PORTERO")]
    Goalkeeper,
    #[serde(rename = "DEFENSA")]
    Defender,
    #[serde(rename = "CENTROCAMPISTA")]
    Midfielder,
    #[serde(rename = "DELANTERO")]
    Forward,
}

impl Specialization {
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::HeadCoach => "ENTRENADOR_PRINCIPAL",
            Self::AssistantCoach => "ENTRENADOR_ASISTENTE",
            Self::GoalkeeperCoach => "ENTRENADOR_PORTEROS",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "ENTRENADOR_PRINCIPAL" => Some(Self::HeadCoach),
            "ENTRENADOR_ASISTENTE" => Some(Self::AssistantCoach),
            "ENTRENADOR_PORTEROS" => Some(Self::GoalkeeperCoach),
            _ => None,
        }
    }
}

impl Position {
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Goalkeeper => "PORTERO",
            Self::Defender => "DEFENSA",
            Self::Midfielder => "CENTROCAMPISTA",
            Self::Forward => "DELANTERO",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "PORTERO" => Some(Self::Goalkeeper),
            "DEFENSA" => Some(Self::Defender),
            "CENTROCAMPISTA" => Some(Self::Midfielder),
            "DELANTERO" => Some(Self::Forward),
            _ => None,
        }
    }
}

/// Closed discriminator for personnel variants.
///
/// Wire names are the tags written to every file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonalTag {
    Coach,
    Player,
}

impl PersonalTag {
    /// Returns the tag string written to files.
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Coach => "Entrenador",
            Self::Player => "Jugador",
        }
    }

    /// Parses a tag string read from a file.
    ///
    /// Returns `None` for anything outside the closed set; callers must treat
    /// that as an error rather than falling back to a default variant.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "Entrenador" => Some(Self::Coach),
            "Jugador" => Some(Self::Player),
            _ => None,
        }
    }
}

impl Display for PersonalTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Player-only attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub position: Position,
    pub shirt_number: u32,
    /// Meters.
    pub height: f64,
    /// Kilograms.
    pub weight: f64,
    pub goals: u32,
    pub matches_played: u32,
}

/// Variant-specific part of a personnel record.
#[derive(Debug, Clone, PartialEq)]
pub enum PersonalKind {
    Coach { specialization: Specialization },
    Player(PlayerStats),
}

impl PersonalKind {
    pub fn tag(&self) -> PersonalTag {
        match self {
            Self::Coach { .. } => PersonalTag::Coach,
            Self::Player(_) => PersonalTag::Player,
        }
    }
}

/// Common fields supplied when creating a record.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub hire_date: NaiveDate,
    pub salary: f64,
    pub origin_country: String,
}

/// Canonical personnel record.
///
/// Equality is field-wise across common and variant fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Personal {
    pub id: PersonalId,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub hire_date: NaiveDate,
    pub salary: f64,
    pub origin_country: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub kind: PersonalKind,
}

/// Record-level invariant violation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("id must not be negative, got {0}")]
    NegativeId(PersonalId),
    #[error("`{field}` must be a non-negative number, got {value}")]
    NegativeValue { field: &'static str, value: f64 },
    #[error("updated_at {updated_at} is earlier than created_at {created_at}")]
    TimestampsOutOfOrder {
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    },
}

impl Personal {
    /// Creates an unassigned record with both timestamps set to now.
    pub fn new(info: PersonalInfo, kind: PersonalKind) -> Self {
        let now = now();
        Self {
            id: UNASSIGNED_ID,
            first_name: info.first_name,
            last_name: info.last_name,
            birth_date: info.birth_date,
            hire_date: info.hire_date,
            salary: info.salary,
            origin_country: info.origin_country,
            created_at: now,
            updated_at: now,
            kind,
        }
    }

    pub fn coach(info: PersonalInfo, specialization: Specialization) -> Self {
        Self::new(info, PersonalKind::Coach { specialization })
    }

    pub fn player(info: PersonalInfo, stats: PlayerStats) -> Self {
        Self::new(info, PersonalKind::Player(stats))
    }

    /// Discriminator accessor used by codecs for dispatch.
    pub fn tag(&self) -> PersonalTag {
        self.kind.tag()
    }

    pub fn is_coach(&self) -> bool {
        self.tag() == PersonalTag::Coach
    }

    pub fn is_player(&self) -> bool {
        self.tag() == PersonalTag::Player
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns whether the store still has to assign an id.
    pub fn is_unassigned(&self) -> bool {
        self.id == UNASSIGNED_ID
    }

    /// Checks record-level invariants.
    ///
    /// Uniqueness of ids is a collection property and is checked by callers.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id < 0 {
            return Err(ValidationError::NegativeId(self.id));
        }
        ensure_non_negative("salary", self.salary)?;
        if let PersonalKind::Player(stats) = &self.kind {
            ensure_non_negative("height", stats.height)?;
            ensure_non_negative("weight", stats.weight)?;
        }
        if self.updated_at < self.created_at {
            return Err(ValidationError::TimestampsOutOfOrder {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }
}

/// Local wall-clock time used for record timestamps.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    // NaN and infinities are rejected alongside negatives.
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NegativeValue { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> PersonalInfo {
        PersonalInfo {
            first_name: "Luis".to_string(),
            last_name: "Aragonés".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1938, 7, 28).unwrap(),
            hire_date: NaiveDate::from_ymd_opt(2004, 7, 1).unwrap(),
            salary: 90_000.0,
            origin_country: "España".to_string(),
        }
    }

    #[test]
    fn tag_wire_names_roundtrip() {
        for tag in [PersonalTag::Coach, PersonalTag::Player] {
            assert_eq!(PersonalTag::from_wire(tag.as_wire()), Some(tag));
        }
        assert_eq!(PersonalTag::from_wire("Arbitro"), None);
        assert_eq!(PersonalTag::from_wire("jugador"), None);
    }

    #[test]
    fn new_record_is_unassigned_with_equal_timestamps() {
        let coach = Personal::coach(info(), Specialization::HeadCoach);
        assert!(coach.is_unassigned());
        assert!(coach.is_coach());
        assert_eq!(coach.created_at, coach.updated_at);
        assert_eq!(coach.full_name(), "Luis Aragonés");
        coach.validate().unwrap();
    }

    #[test]
    fn validate_rejects_negative_and_nan_values() {
        let mut coach = Personal::coach(info(), Specialization::AssistantCoach);
        coach.salary = -1.0;
        assert!(matches!(
            coach.validate(),
            Err(ValidationError::NegativeValue { field: "salary", .. })
        ));

        let mut player = Personal::player(
            info(),
            PlayerStats {
                position: Position::Forward,
                shirt_number: 9,
                height: f64::NAN,
                weight: 80.0,
                goals: 0,
                matches_played: 0,
            },
        );
        assert!(matches!(
            player.validate(),
            Err(ValidationError::NegativeValue { field: "height", .. })
        ));
        player.id = -4;
        assert_eq!(player.validate(), Err(ValidationError::NegativeId(-4)));
    }

    #[test]
    fn validate_rejects_reversed_timestamps() {
        let mut coach = Personal::coach(info(), Specialization::GoalkeeperCoach);
        coach.updated_at = coach.created_at - chrono::Duration::seconds(1);
        assert!(matches!(
            coach.validate(),
            Err(ValidationError::TimestampsOutOfOrder { .. })
        ));
    }
}
