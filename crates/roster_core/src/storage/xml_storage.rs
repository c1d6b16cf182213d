//! XML codec: `<equipo>` root with one `<personal tipo="...">` per record.

use super::dto::{records_from_dtos, EquipoXmlDto, PersonalDto, PersonalXmlDto};
use super::{FileFormat, PersonalStorage};
use crate::error::{PersonalError, PersonalResult};
use crate::model::personal::Personal;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;

const ROOT_ELEMENT: &str = "equipo";
const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const INDENT_SIZE: usize = 4;

/// XML implementation of [`PersonalStorage`].
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlStorage;

impl PersonalStorage for XmlStorage {
    fn format(&self) -> FileFormat {
        FileFormat::Xml
    }

    fn decode(&self, bytes: &[u8]) -> PersonalResult<Vec<Personal>> {
        let text = std::str::from_utf8(bytes)
            .map_err(|err| PersonalError::malformed(FileFormat::Xml, err))?;
        check_root_element(text)?;
        let root: EquipoXmlDto = quick_xml::de::from_str(text)
            .map_err(|err| PersonalError::malformed(FileFormat::Xml, err))?;

        let dtos = root
            .members
            .into_iter()
            .map(PersonalXmlDto::into_dto)
            .collect::<PersonalResult<Vec<_>>>()?;
        records_from_dtos(FileFormat::Xml, dtos)
    }

    fn encode(&self, records: &[Personal]) -> PersonalResult<Vec<u8>> {
        let root = EquipoXmlDto {
            members: records
                .iter()
                .map(|record| PersonalXmlDto::from(PersonalDto::from(record)))
                .collect(),
        };

        let mut body = String::from(XML_DECLARATION);
        let mut serializer = quick_xml::se::Serializer::new(&mut body);
        serializer.indent(' ', INDENT_SIZE);
        root.serialize(serializer)
            .map_err(|err| PersonalError::malformed(FileFormat::Xml, err))?;
        body.push('\n');
        Ok(body.into_bytes())
    }
}

/// The deserializer accepts any root name, so the root is checked up front.
fn check_root_element(text: &str) -> PersonalResult<()> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) | Ok(Event::Empty(start)) => {
                let name = start.name();
                if name.as_ref() == ROOT_ELEMENT.as_bytes() {
                    return Ok(());
                }
                return Err(PersonalError::malformed(
                    FileFormat::Xml,
                    format!(
                        "expected root element <{ROOT_ELEMENT}>, found <{}>",
                        String::from_utf8_lossy(name.as_ref())
                    ),
                ));
            }
            Ok(Event::Eof) => {
                return Err(PersonalError::malformed(
                    FileFormat::Xml,
                    "document has no root element",
                ))
            }
            Ok(_) => {}
            Err(err) => return Err(PersonalError::malformed(FileFormat::Xml, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::XmlStorage;
    use crate::error::PersonalError;
    use crate::model::personal::{PersonalKind, Specialization};
    use crate::storage::PersonalStorage;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<equipo>
    <personal tipo="Entrenador" nombre="Carlo" apellidos="Ancelotti" paisOrigen="Italia">
        <id>1</id>
        <fechaNacimiento>1959-06-10</fechaNacimiento>
        <fechaIncorporacion>2021-06-01</fechaIncorporacion>
        <salario>200000.0</salario>
        <createdAt>2024-01-01T10:00:00</createdAt>
        <updatedAt>2024-01-01T10:00:00</updatedAt>
        <especialidad>ENTRENADOR_PRINCIPAL</especialidad>
        <apodo>Carletto</apodo>
    </personal>
</equipo>
"#;

    #[test]
    fn decodes_attribute_tag_and_ignores_unknown_elements() {
        let records = XmlStorage.decode(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].kind,
            PersonalKind::Coach {
                specialization: Specialization::HeadCoach
            }
        );
    }

    #[test]
    fn unknown_tag_attribute_is_rejected() {
        let body = SAMPLE.replace("tipo=\"Entrenador\"", "tipo=\"Presidente\"");
        let err = XmlStorage.decode(body.as_bytes()).unwrap_err();
        assert!(matches!(err, PersonalError::UnknownVariant(tag) if tag == "Presidente"));
    }

    #[test]
    fn truncated_document_is_malformed() {
        let err = XmlStorage
            .decode(b"<equipo><personal tipo=\"Jugador\"><id>1</id>")
            .unwrap_err();
        assert!(matches!(err, PersonalError::MalformedInput { .. }));
    }

    #[test]
    fn encoding_is_stable_and_uses_root_element() {
        let records = XmlStorage.decode(SAMPLE.as_bytes()).unwrap();
        let first = XmlStorage.encode(&records).unwrap();
        let second = XmlStorage.encode(&records).unwrap();
        assert_eq!(first, second);

        let text = String::from_utf8(first).unwrap();
        assert!(text.contains("<equipo>"));
        assert!(text.contains(
            "<personal tipo=\"Entrenador\" nombre=\"Carlo\" apellidos=\"Ancelotti\" paisOrigen=\"Italia\">"
        ));
        assert!(!text.contains("<posicion"));
    }

    #[test]
    fn other_root_element_is_malformed() {
        let body = SAMPLE.replace("<equipo>", "<plantilla>").replace("</equipo>", "</plantilla>");
        let err = XmlStorage.decode(body.as_bytes()).unwrap_err();
        assert!(matches!(err, PersonalError::MalformedInput { .. }));
    }

    #[test]
    fn empty_root_decodes_to_no_records() {
        assert!(XmlStorage.decode(b"<equipo/>").unwrap().is_empty());
    }
}
