//! Named SQL scripts supplied to the lifecycle manager.

use super::{DbError, DbResult};
use std::borrow::Cow;
use std::io::Read;
use std::path::PathBuf;

const DEFAULT_SCHEMA_SQL: &str = include_str!("../../resources/schema.sql");
const DEFAULT_DATA_SQL: &str = include_str!("../../resources/data.sql");

#[derive(Debug, Clone, PartialEq, Eq)]
enum ScriptOrigin {
    Inline(Cow<'static, str>),
    File(PathBuf),
}

/// A schema or seed script. Its SQL is opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSource {
    name: String,
    origin: ScriptOrigin,
}

impl ScriptSource {
    pub fn inline(name: impl Into<String>, sql: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            origin: ScriptOrigin::Inline(sql.into()),
        }
    }

    /// Script read from `path` each time it runs.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            origin: ScriptOrigin::File(path),
        }
    }

    /// Buffers a text stream into an inline script.
    pub fn from_reader(name: impl Into<String>, mut reader: impl Read) -> DbResult<Self> {
        let name = name.into();
        let mut sql = String::new();
        reader
            .read_to_string(&mut sql)
            .map_err(|err| DbError::ScriptUnavailable {
                name: name.clone(),
                reason: err.to_string(),
            })?;
        Ok(Self::inline(name, sql))
    }

    /// Bundled `schema.sql`.
    pub fn default_schema() -> Self {
        Self::inline("schema.sql", DEFAULT_SCHEMA_SQL)
    }

    /// Bundled `data.sql`.
    pub fn default_data() -> Self {
        Self::inline("data.sql", DEFAULT_DATA_SQL)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the script text.
    pub fn load(&self) -> DbResult<Cow<'_, str>> {
        match &self.origin {
            ScriptOrigin::Inline(sql) => Ok(Cow::Borrowed(sql.as_ref())),
            ScriptOrigin::File(path) => std::fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|err| DbError::ScriptUnavailable {
                    name: self.name.clone(),
                    reason: err.to_string(),
                }),
        }
    }
}
