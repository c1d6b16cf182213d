//! Data-transfer shapes shared by the file codecs.
//!
//! # Responsibility
//! - Flatten `Personal` into a tagged row (`tipo` + optional variant columns).
//! - Map rows back to the closed variant set, rejecting unknown tags.
//!
//! # Invariants
//! - Every DTO maps to exactly one `Personal` or fails; nothing is dropped.
//! - Non-zero ids are unique within one decoded file.
//! - Unknown extra fields are ignored (no `deny_unknown_fields`).

use crate::error::{PersonalError, PersonalResult};
use crate::model::personal::{
    Personal, PersonalId, PersonalKind, PersonalTag, PlayerStats, Position, Specialization,
    UNASSIGNED_ID,
};
use crate::storage::FileFormat;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Flat row used by the CSV and JSON codecs.
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalDto {
    pub id: PersonalId,
    #[serde(rename = "tipo")]
    pub tag: String,
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellidos")]
    pub last_name: String,
    #[serde(rename = "fecha_nacimiento")]
    pub birth_date: NaiveDate,
    #[serde(rename = "fecha_incorporacion")]
    pub hire_date: NaiveDate,
    #[serde(rename = "salario")]
    pub salary: f64,
    #[serde(rename = "pais_origen")]
    pub origin_country: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(rename = "especialidad", default)]
    pub specialization: Option<Specialization>,
    #[serde(rename = "posicion", default)]
    pub position: Option<Position>,
    #[serde(rename = "dorsal", default)]
    pub shirt_number: Option<u32>,
    #[serde(rename = "altura", default)]
    pub height: Option<f64>,
    #[serde(rename = "peso", default)]
    pub weight: Option<f64>,
    #[serde(rename = "goles", default)]
    pub goals: Option<u32>,
    #[serde(rename = "partidos_jugados", default)]
    pub matches_played: Option<u32>,
}

/// Column names written as the CSV header, in `PersonalDto` field order.
pub const CSV_HEADERS: [&str; 17] = [
    "id",
    "tipo",
    "nombre",
    "apellidos",
    "fecha_nacimiento",
    "fecha_incorporacion",
    "salario",
    "pais_origen",
    "created_at",
    "updated_at",
    "especialidad",
    "posicion",
    "dorsal",
    "altura",
    "peso",
    "goles",
    "partidos_jugados",
];

impl From<&Personal> for PersonalDto {
    fn from(value: &Personal) -> Self {
        let mut dto = Self {
            id: value.id,
            tag: value.tag().as_wire().to_string(),
            first_name: value.first_name.clone(),
            last_name: value.last_name.clone(),
            birth_date: value.birth_date,
            hire_date: value.hire_date,
            salary: value.salary,
            origin_country: value.origin_country.clone(),
            created_at: value.created_at,
            updated_at: value.updated_at,
            specialization: None,
            position: None,
            shirt_number: None,
            height: None,
            weight: None,
            goals: None,
            matches_played: None,
        };

        match &value.kind {
            PersonalKind::Coach { specialization } => {
                dto.specialization = Some(*specialization);
            }
            PersonalKind::Player(stats) => {
                dto.position = Some(stats.position);
                dto.shirt_number = Some(stats.shirt_number);
                dto.height = Some(stats.height);
                dto.weight = Some(stats.weight);
                dto.goals = Some(stats.goals);
                dto.matches_played = Some(stats.matches_played);
            }
        }
        dto
    }
}

impl PersonalDto {
    /// Maps the row to its variant.
    ///
    /// # Errors
    /// - `UnknownVariant` when `tipo` is outside the closed set.
    /// - `MalformedInput` when variant fields are missing or the record
    ///   violates model invariants.
    pub fn into_personal(self, format: FileFormat) -> PersonalResult<Personal> {
        let tag = PersonalTag::from_wire(&self.tag)
            .ok_or_else(|| PersonalError::UnknownVariant(self.tag.clone()))?;
        let id = self.id;
        let missing = |field: &str| {
            PersonalError::malformed(
                format,
                format!("record {id} of type {tag} is missing `{field}`"),
            )
        };

        let kind = match tag {
            PersonalTag::Coach => PersonalKind::Coach {
                specialization: self.specialization.ok_or_else(|| missing("especialidad"))?,
            },
            PersonalTag::Player => PersonalKind::Player(PlayerStats {
                position: self.position.ok_or_else(|| missing("posicion"))?,
                shirt_number: self.shirt_number.ok_or_else(|| missing("dorsal"))?,
                height: self.height.ok_or_else(|| missing("altura"))?,
                weight: self.weight.ok_or_else(|| missing("peso"))?,
                goals: self.goals.ok_or_else(|| missing("goles"))?,
                matches_played: self
                    .matches_played
                    .ok_or_else(|| missing("partidos_jugados"))?,
            }),
        };

        let personal = Personal {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            birth_date: self.birth_date,
            hire_date: self.hire_date,
            salary: self.salary,
            origin_country: self.origin_country,
            created_at: self.created_at,
            updated_at: self.updated_at,
            kind,
        };
        personal
            .validate()
            .map_err(|err| PersonalError::malformed(format, format!("record {id}: {err}")))?;
        Ok(personal)
    }
}

/// One `<personal>` element.
///
/// The tag and the free-text fields are attributes: element text is trimmed
/// by the reader, attribute values keep surrounding whitespace. Absent variant
/// fields are omitted rather than written empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalXmlDto {
    #[serde(rename = "@tipo")]
    pub tag: String,
    #[serde(rename = "@nombre")]
    pub first_name: String,
    #[serde(rename = "@apellidos")]
    pub last_name: String,
    #[serde(rename = "@paisOrigen")]
    pub origin_country: String,
    pub id: PersonalId,
    #[serde(rename = "fechaNacimiento")]
    pub birth_date: NaiveDate,
    #[serde(rename = "fechaIncorporacion")]
    pub hire_date: NaiveDate,
    #[serde(rename = "salario")]
    pub salary: f64,
    #[serde(rename = "createdAt")]
    pub created_at: NaiveDateTime,
    #[serde(rename = "updatedAt")]
    pub updated_at: NaiveDateTime,
    #[serde(
        rename = "especialidad",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub specialization: Option<String>,
    #[serde(rename = "posicion", default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(rename = "dorsal", default, skip_serializing_if = "Option::is_none")]
    pub shirt_number: Option<u32>,
    #[serde(rename = "altura", default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(rename = "peso", default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(rename = "goles", default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<u32>,
    #[serde(
        rename = "partidosJugados",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub matches_played: Option<u32>,
}

/// Root `<equipo>` element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "equipo")]
pub struct EquipoXmlDto {
    #[serde(rename = "personal", default)]
    pub members: Vec<PersonalXmlDto>,
}

impl From<PersonalDto> for PersonalXmlDto {
    fn from(value: PersonalDto) -> Self {
        Self {
            tag: value.tag,
            first_name: value.first_name,
            last_name: value.last_name,
            origin_country: value.origin_country,
            id: value.id,
            birth_date: value.birth_date,
            hire_date: value.hire_date,
            salary: value.salary,
            created_at: value.created_at,
            updated_at: value.updated_at,
            specialization: value.specialization.map(|item| item.as_wire().to_string()),
            position: value.position.map(|item| item.as_wire().to_string()),
            shirt_number: value.shirt_number,
            height: value.height,
            weight: value.weight,
            goals: value.goals,
            matches_played: value.matches_played,
        }
    }
}

impl PersonalXmlDto {
    /// Converts to the flat row, parsing enum text.
    pub fn into_dto(self) -> PersonalResult<PersonalDto> {
        let id = self.id;
        let specialization = self
            .specialization
            .map(|value| {
                Specialization::from_wire(value.trim()).ok_or_else(|| {
                    PersonalError::malformed(
                        FileFormat::Xml,
                        format!("record {id}: unknown especialidad `{value}`"),
                    )
                })
            })
            .transpose()?;
        let position = self
            .position
            .map(|value| {
                Position::from_wire(value.trim()).ok_or_else(|| {
                    PersonalError::malformed(
                        FileFormat::Xml,
                        format!("record {id}: unknown posicion `{value}`"),
                    )
                })
            })
            .transpose()?;

        Ok(PersonalDto {
            id,
            tag: self.tag,
            first_name: self.first_name,
            last_name: self.last_name,
            birth_date: self.birth_date,
            hire_date: self.hire_date,
            salary: self.salary,
            origin_country: self.origin_country,
            created_at: self.created_at,
            updated_at: self.updated_at,
            specialization,
            position,
            shirt_number: self.shirt_number,
            height: self.height,
            weight: self.weight,
            goals: self.goals,
            matches_played: self.matches_played,
        })
    }
}

/// Maps decoded rows to records, enforcing per-file id uniqueness.
///
/// Records with the unassigned id `0` are exempt; the service assigns them.
pub fn records_from_dtos(
    format: FileFormat,
    dtos: Vec<PersonalDto>,
) -> PersonalResult<Vec<Personal>> {
    let mut seen = HashSet::with_capacity(dtos.len());
    let mut records = Vec::with_capacity(dtos.len());
    for dto in dtos {
        let personal = dto.into_personal(format)?;
        if personal.id != UNASSIGNED_ID && !seen.insert(personal.id) {
            return Err(PersonalError::malformed(
                format,
                format!("duplicate id {}", personal.id),
            ));
        }
        records.push(personal);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::personal::PersonalInfo;

    fn coach() -> Personal {
        let mut coach = Personal::coach(
            PersonalInfo {
                first_name: "Vicente".to_string(),
                last_name: "del Bosque".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1950, 12, 23).unwrap(),
                hire_date: NaiveDate::from_ymd_opt(2008, 7, 1).unwrap(),
                salary: 120_000.0,
                origin_country: "España".to_string(),
            },
            Specialization::HeadCoach,
        );
        coach.id = 1;
        coach
    }

    #[test]
    fn coach_dto_leaves_player_columns_empty() {
        let dto = PersonalDto::from(&coach());
        assert_eq!(dto.tag, "Entrenador");
        assert_eq!(dto.specialization, Some(Specialization::HeadCoach));
        assert_eq!(dto.position, None);
        assert_eq!(dto.matches_played, None);
    }

    #[test]
    fn unknown_tag_is_rejected_before_variant_fields() {
        let mut dto = PersonalDto::from(&coach());
        dto.tag = "Utillero".to_string();
        let err = dto.into_personal(FileFormat::Json).unwrap_err();
        assert!(matches!(err, PersonalError::UnknownVariant(tag) if tag == "Utillero"));
    }

    #[test]
    fn player_tag_without_player_fields_is_malformed() {
        let mut dto = PersonalDto::from(&coach());
        dto.tag = "Jugador".to_string();
        let err = dto.into_personal(FileFormat::Csv).unwrap_err();
        assert!(matches!(err, PersonalError::MalformedInput { .. }));
    }

    #[test]
    fn duplicate_ids_fail_the_whole_batch() {
        let dto = PersonalDto::from(&coach());
        let err = records_from_dtos(FileFormat::Json, vec![dto.clone(), dto]).unwrap_err();
        assert!(matches!(err, PersonalError::MalformedInput { .. }));
    }

    #[test]
    fn unassigned_ids_may_repeat() {
        let mut first = coach();
        first.id = UNASSIGNED_ID;
        let dto = PersonalDto::from(&first);
        let records = records_from_dtos(FileFormat::Json, vec![dto.clone(), dto]).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn xml_dto_rejects_unknown_position_text() {
        let mut xml = PersonalXmlDto::from(PersonalDto::from(&coach()));
        xml.position = Some("LIBERO".to_string());
        assert!(matches!(
            xml.into_dto(),
            Err(PersonalError::MalformedInput { .. })
        ));
    }
}
