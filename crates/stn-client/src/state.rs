//! Client-side world kept in step with the server's per-tick payloads.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use stn_ecs::prelude::{EntityId, EntityType};
use tracing::debug;

use crate::factory::EntityFactory;
use crate::mirror::{ClientEntity, PlayerMirror};
use crate::ReconstructError;

/// The latest mirror of every entity the server reported.
///
/// Each payload is the full live set, so applying one refreshes known ids in
/// place, creates mirrors for new ids and drops ids the payload no longer
/// lists.
#[derive(Debug, Clone, Default)]
pub struct ClientState {
    factory: EntityFactory,
    entities: BTreeMap<EntityId, ClientEntity>,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one payload and return the records that failed. A failed
    /// record for a known id keeps its previous mirror.
    pub fn apply(&mut self, payload: &Value) -> Vec<ReconstructError> {
        let Some(records) = payload.as_array() else {
            return vec![ReconstructError::malformed("payload is not an entity list")];
        };

        let mut errors = Vec::new();
        let mut seen = BTreeSet::new();
        for record in records {
            let id = record
                .get("id")
                .and_then(Value::as_str)
                .and_then(|raw| raw.parse::<EntityId>().ok());
            if let Some(id) = id {
                seen.insert(id);
            }
            let result = match id.and_then(|id| self.entities.get_mut(&id)) {
                Some(mirror) => mirror.deserialize(record),
                None => self.factory.create_entity(record).map(|entity| {
                    self.entities.insert(entity.id(), entity);
                }),
            };
            if let Err(err) = result {
                errors.push(err);
            }
        }

        let before = self.entities.len();
        self.entities.retain(|id, _| seen.contains(id));
        debug!(
            entities = self.entities.len(),
            dropped = before - self.entities.len(),
            errors = errors.len(),
            "applied payload"
        );
        errors
    }

    pub fn get(&self, id: EntityId) -> Option<&ClientEntity> {
        self.entities.get(&id)
    }

    pub fn player(&self, id: EntityId) -> Option<&PlayerMirror> {
        match self.entities.get(&id)? {
            ClientEntity::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn entities(&self) -> impl Iterator<Item = &ClientEntity> + '_ {
        self.entities.values()
    }

    pub fn of_type(&self, entity_type: EntityType) -> impl Iterator<Item = &ClientEntity> + '_ {
        self.entities
            .values()
            .filter(move |e| e.entity_type() == entity_type)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
