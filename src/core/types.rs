use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of the collection, stored verbatim in the backing file.
///
/// `year` stays textual: clients send whatever they like there and the store
/// never interprets it. Keys that were added to the file by hand are kept in
/// `extra` and written back untouched; requests can never set them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub year: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Record {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        color: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
            year: year.into(),
            extra: Map::new(),
        }
    }

    /// Keys present in the backing file that the record type does not model.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Partial update addressed to the record with `id`.
///
/// Absent fields keep their stored value. `id` itself is never rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub id: i64,
    pub name: Option<String>,
    pub color: Option<String>,
    pub year: Option<String>,
}

impl RecordPatch {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn has_changes(&self) -> bool {
        self.name.is_some() || self.color.is_some() || self.year.is_some()
    }

    /// Merges the present fields into `record`.
    pub fn apply_to(&self, record: &mut Record) {
        if let Some(name) = &self.name {
            record.name.clone_from(name);
        }
        if let Some(color) = &self.color {
            record.color.clone_from(color);
        }
        if let Some(year) = &self.year {
            record.year.clone_from(year);
        }
    }
}
