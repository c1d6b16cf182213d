//! JSON codec: a pretty-printed array of tagged records.

use super::dto::{records_from_dtos, PersonalDto};
use super::{FileFormat, PersonalStorage};
use crate::error::{PersonalError, PersonalResult};
use crate::model::personal::Personal;

/// JSON implementation of [`PersonalStorage`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStorage;

impl PersonalStorage for JsonStorage {
    fn format(&self) -> FileFormat {
        FileFormat::Json
    }

    fn decode(&self, bytes: &[u8]) -> PersonalResult<Vec<Personal>> {
        let dtos: Vec<PersonalDto> = serde_json::from_slice(bytes)
            .map_err(|err| PersonalError::malformed(FileFormat::Json, err))?;
        records_from_dtos(FileFormat::Json, dtos)
    }

    fn encode(&self, records: &[Personal]) -> PersonalResult<Vec<u8>> {
        let dtos: Vec<PersonalDto> = records.iter().map(PersonalDto::from).collect();
        serde_json::to_vec_pretty(&dtos)
            .map_err(|err| PersonalError::malformed(FileFormat::Json, err))
    }
}
