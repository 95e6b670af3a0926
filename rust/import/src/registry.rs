// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity registry
//!
//! One entity per step id for the lifetime of an import session. Entries
//! are never replaced or evicted.

use crate::entity::IfcEntity;
use crate::error::{Error, Result};
use crate::topology::IfcLoop;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: FxHashMap<u32, IfcEntity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached entity for a step id; never constructs
    pub fn lookup(&self, step_id: u32) -> Option<&IfcEntity> {
        self.entities.get(&step_id)
    }

    /// Insert a newly constructed entity
    ///
    /// A second registration under the same step id is a resolver bug and
    /// comes back as [`Error::DuplicateStepId`]; the first entity stays.
    pub fn register(&mut self, step_id: u32, entity: IfcEntity) -> Result<()> {
        if entity.step_id() != step_id {
            return Err(Error::StepIdMismatch {
                key: step_id,
                entity: entity.step_id(),
            });
        }
        match self.entities.entry(step_id) {
            Entry::Occupied(_) => Err(Error::DuplicateStepId(step_id)),
            Entry::Vacant(slot) => {
                slot.insert(entity);
                Ok(())
            }
        }
    }

    pub fn contains(&self, step_id: u32) -> bool {
        self.entities.contains_key(&step_id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All entries in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &IfcEntity)> {
        self.entities.iter().map(|(&id, entity)| (id, entity))
    }

    /// Registered loops in arbitrary order
    pub fn loops(&self) -> impl Iterator<Item = &Rc<IfcLoop>> {
        self.entities.values().filter_map(IfcEntity::as_loop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::IfcVertex;
    use ifc_topo_core::IfcType;
    use nalgebra::Point3;

    fn vertex(step_id: u32) -> IfcEntity {
        IfcEntity::Vertex(Rc::new(IfcVertex::new(
            step_id,
            IfcType::IfcVertexPoint,
            Some(Point3::origin()),
        )))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = EntityRegistry::new();
        assert!(registry.lookup(7).is_none());

        registry.register(7, vertex(7)).unwrap();
        assert!(registry.contains(7));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup(7).map(IfcEntity::step_id), Some(7));
        assert_eq!(registry.loops().count(), 0);
    }

    #[test]
    fn test_duplicate_step_id_keeps_first() {
        let mut registry = EntityRegistry::new();
        registry.register(7, vertex(7)).unwrap();
        let first = registry.lookup(7).and_then(IfcEntity::as_vertex).cloned().unwrap();

        let err = registry.register(7, vertex(7)).unwrap_err();
        assert!(matches!(err, Error::DuplicateStepId(7)));

        let still = registry.lookup(7).and_then(IfcEntity::as_vertex).unwrap();
        assert!(Rc::ptr_eq(&first, still));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_step_id_mismatch() {
        let mut registry = EntityRegistry::new();
        let err = registry.register(8, vertex(7)).unwrap_err();
        assert!(matches!(err, Error::StepIdMismatch { key: 8, entity: 7 }));
        assert!(registry.is_empty());
    }
}
