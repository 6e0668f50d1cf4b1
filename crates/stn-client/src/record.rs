//! Read-only view over one flat wire record.
//!
//! A record is `{ id, type, extensions: [{ kind, ...fields }] }`. The view
//! validates the envelope once and then hands out typed fields by extension
//! kind.

use serde::de::DeserializeOwned;
use serde_json::Value;
use stn_ecs::prelude::{EntityId, EntityType, ExtensionKind};

use crate::ReconstructError;

#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    id: EntityId,
    entity_type: EntityType,
    extensions: &'a [Value],
}

impl<'a> RecordView<'a> {
    /// Validate the envelope. The type tag is checked first, so a record
    /// that is not an object at all reports a missing type.
    pub fn parse(record: &'a Value) -> Result<Self, ReconstructError> {
        let Some(tag) = record.get("type").and_then(Value::as_str) else {
            return Err(ReconstructError::MissingEntityType {
                record: record.to_string(),
            });
        };
        let entity_type: EntityType =
            tag.parse()
                .map_err(|_| ReconstructError::UnknownEntityType {
                    type_tag: tag.to_owned(),
                })?;

        let id = record
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| ReconstructError::malformed(format!("{tag} record has no string id")))?
            .parse::<EntityId>()
            .map_err(|e| ReconstructError::malformed(e.to_string()))?;

        let extensions = match record.get("extensions") {
            Some(Value::Array(list)) => list.as_slice(),
            None => &[],
            Some(_) => {
                return Err(ReconstructError::malformed(format!(
                    "entity {id}: extensions is not a list"
                )))
            }
        };

        Ok(Self {
            id,
            entity_type,
            extensions,
        })
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// The serialized extension of `kind`, if the record carries one.
    pub fn extension(&self, kind: ExtensionKind) -> Option<&'a Value> {
        self.extensions
            .iter()
            .find(|ext| ext.get("kind").and_then(Value::as_str) == Some(kind.as_str()))
    }

    pub fn has(&self, kind: ExtensionKind) -> bool {
        self.extension(kind).is_some()
    }

    /// A field that must be present.
    pub fn field<T: DeserializeOwned>(
        &self,
        kind: ExtensionKind,
        name: &str,
    ) -> Result<T, ReconstructError> {
        self.optional_field(kind, name)?.ok_or_else(|| {
            ReconstructError::malformed(format!(
                "entity {} ({}): missing {}.{}",
                self.id, self.entity_type, kind, name
            ))
        })
    }

    /// A field that may be absent, along with its whole extension. A
    /// present field of the wrong shape is still an error.
    pub fn optional_field<T: DeserializeOwned>(
        &self,
        kind: ExtensionKind,
        name: &str,
    ) -> Result<Option<T>, ReconstructError> {
        let Some(value) = self.extension(kind).and_then(|ext| ext.get(name)) else {
            return Ok(None);
        };
        if value.is_null() {
            return Ok(None);
        }
        T::deserialize(value).map(Some).map_err(|e| {
            ReconstructError::malformed(format!(
                "entity {} ({}): bad {}.{}: {e}",
                self.id, self.entity_type, kind, name
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stn_ecs::prelude::Vec2;

    #[test]
    fn reads_typed_fields_by_kind() {
        let record = json!({
            "id": "12",
            "type": "zombie",
            "extensions": [
                { "kind": "positionable", "position": { "x": 1.5, "y": 2.0 }, "size": { "x": 16.0, "y": 16.0 } },
                { "kind": "destructible", "health": 2, "maxHealth": 3 }
            ]
        });
        let view = RecordView::parse(&record).unwrap();
        assert_eq!(view.id(), EntityId::from_raw(12));
        assert_eq!(view.entity_type(), EntityType::Zombie);
        let position: Vec2 = view.field(ExtensionKind::Positionable, "position").unwrap();
        assert_eq!(position, Vec2::new(1.5, 2.0));
        let health: u32 = view.field(ExtensionKind::Destructible, "health").unwrap();
        assert_eq!(health, 2);
        assert!(!view.has(ExtensionKind::Ignitable));
    }

    #[test]
    fn missing_and_unknown_type_tags() {
        let err = RecordView::parse(&json!({ "id": "1" })).unwrap_err();
        assert!(matches!(err, ReconstructError::MissingEntityType { .. }));

        let err = RecordView::parse(&json!(null)).unwrap_err();
        assert!(matches!(err, ReconstructError::MissingEntityType { .. }));

        let err = RecordView::parse(&json!({ "id": "1", "type": "dragon" })).unwrap_err();
        assert_eq!(
            err,
            ReconstructError::UnknownEntityType {
                type_tag: "dragon".to_owned()
            }
        );
    }

    #[test]
    fn numeric_ids_are_malformed() {
        let err = RecordView::parse(&json!({ "id": 1, "type": "wall" })).unwrap_err();
        assert!(matches!(err, ReconstructError::MalformedRecord { .. }));
    }

    #[test]
    fn wrong_field_shape_is_reported() {
        let record = json!({
            "id": "3",
            "type": "wall",
            "extensions": [{ "kind": "destructible", "health": "full", "maxHealth": 10 }]
        });
        let view = RecordView::parse(&record).unwrap();
        let err = view.field::<u32>(ExtensionKind::Destructible, "health").unwrap_err();
        assert!(err.to_string().contains("destructible.health"));
        let missing = view.field::<Vec2>(ExtensionKind::Positionable, "position").unwrap_err();
        assert!(missing.to_string().contains("missing positionable.position"));
    }
}
