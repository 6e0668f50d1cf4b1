//! Entity factory keyed by the record's type tag.

use serde_json::Value;
use tracing::warn;

use crate::mirror::ClientEntity;
use crate::record::RecordView;
use crate::ReconstructError;

/// Everything one payload produced: the mirrors that built and the records
/// that did not, in payload order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconstruction {
    pub entities: Vec<ClientEntity>,
    pub errors: Vec<ReconstructError>,
}

impl Reconstruction {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Builds display mirrors from wire records.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityFactory;

impl EntityFactory {
    pub fn new() -> Self {
        Self
    }

    /// Reconstruct one record.
    ///
    /// # Errors
    ///
    /// [`ReconstructError::MissingEntityType`] when the record has no type
    /// tag, [`ReconstructError::UnknownEntityType`] for an unrecognized tag,
    /// and [`ReconstructError::MalformedRecord`] for everything else.
    pub fn create_entity(&self, record: &Value) -> Result<ClientEntity, ReconstructError> {
        let view = RecordView::parse(record)?;
        ClientEntity::from_view(&view)
    }

    /// Reconstruct a whole payload. Each record succeeds or fails on its
    /// own; a payload that is not a list is a single malformed-record error.
    pub fn reconstruct(&self, payload: &Value) -> Reconstruction {
        let Some(records) = payload.as_array() else {
            warn!("payload is not an entity list");
            return Reconstruction {
                entities: Vec::new(),
                errors: vec![ReconstructError::malformed("payload is not an entity list")],
            };
        };

        let mut result = Reconstruction::default();
        for (index, record) in records.iter().enumerate() {
            match self.create_entity(record) {
                Ok(entity) => result.entities.push(entity),
                Err(err) => {
                    warn!(index, error = %err, "skipping entity record");
                    result.errors.push(err);
                }
            }
        }
        result
    }
}
