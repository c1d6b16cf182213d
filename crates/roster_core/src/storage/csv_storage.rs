//! CSV codec: header row followed by one row per record.

use super::dto::{records_from_dtos, PersonalDto, CSV_HEADERS};
use super::{FileFormat, PersonalStorage};
use crate::error::{PersonalError, PersonalResult};
use crate::model::personal::Personal;

/// CSV implementation of [`PersonalStorage`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvStorage;

impl PersonalStorage for CsvStorage {
    fn format(&self) -> FileFormat {
        FileFormat::Csv
    }

    fn decode(&self, bytes: &[u8]) -> PersonalResult<Vec<Personal>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes);

        let mut dtos = Vec::new();
        for row in reader.deserialize::<PersonalDto>() {
            dtos.push(row.map_err(|err| PersonalError::malformed(FileFormat::Csv, err))?);
        }
        records_from_dtos(FileFormat::Csv, dtos)
    }

    fn encode(&self, records: &[Personal]) -> PersonalResult<Vec<u8>> {
        // The header is written explicitly so an empty export still carries it.
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        let to_malformed = |err: csv::Error| PersonalError::malformed(FileFormat::Csv, err);

        writer.write_record(CSV_HEADERS).map_err(to_malformed)?;
        for record in records {
            writer
                .serialize(PersonalDto::from(record))
                .map_err(to_malformed)?;
        }
        writer
            .into_inner()
            .map_err(|err| PersonalError::malformed(FileFormat::Csv, err.error()))
    }
}
