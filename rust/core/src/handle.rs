// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Opaque handles to decoded records

use std::fmt;
use std::sync::Arc;

use crate::attribute::{AttributeValue, DecodedEntity};
use crate::schema::{IfcSchemaVersion, IfcType};

/// Reference to one record of the exchange graph, or to nothing.
///
/// Cloning is cheap: the decoded record is shared with the decoder cache.
#[derive(Debug, Clone, Default)]
pub struct IfcAnyHandle {
    entity: Option<Arc<DecodedEntity>>,
}

impl IfcAnyHandle {
    /// Handle that refers to no record
    pub fn null() -> Self {
        Self::default()
    }

    /// Wrap a decoded record
    pub fn new(entity: Arc<DecodedEntity>) -> Self {
        Self {
            entity: Some(entity),
        }
    }

    /// Null, or carrying the reserved step id 0.
    #[inline]
    pub fn is_null_or_empty(&self) -> bool {
        self.entity.as_ref().map_or(true, |e| e.id == 0)
    }

    #[inline]
    pub fn step_id(&self) -> Option<u32> {
        self.entity.as_ref().map(|e| e.id)
    }

    #[inline]
    pub fn declared_type(&self) -> Option<IfcType> {
        self.entity.as_ref().map(|e| e.ifc_type)
    }

    /// Keyword as written in the file
    #[inline]
    pub fn type_name(&self) -> Option<&str> {
        self.entity.as_deref().map(|e| e.type_name.as_str())
    }

    /// True when the record's type is `base` or a descendant of it.
    pub fn is_subtype_of(&self, base: IfcType) -> bool {
        self.declared_type()
            .map_or(false, |t| t.is_subtype_of(base))
    }

    /// Like [`is_subtype_of`](Self::is_subtype_of), but also requires both
    /// types to exist in `version`.
    pub fn is_valid_subtype_of(&self, base: IfcType, version: IfcSchemaVersion) -> bool {
        self.declared_type()
            .map_or(false, |t| t.is_valid_subtype_of(base, version))
    }

    #[inline]
    pub fn entity(&self) -> Option<&DecodedEntity> {
        self.entity.as_deref()
    }

    #[inline]
    pub fn attribute(&self, index: usize) -> Option<&AttributeValue> {
        self.entity()?.get(index)
    }
}

impl fmt::Display for IfcAnyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entity() {
            Some(e) => write!(f, "#{}={}", e.id, e.type_name),
            None => f.write_str("<null>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly_loop_handle(id: u32) -> IfcAnyHandle {
        IfcAnyHandle::new(Arc::new(DecodedEntity::new(
            id,
            "IFCPOLYLOOP",
            vec![AttributeValue::List(vec![])],
        )))
    }

    #[test]
    fn test_null_handle() {
        let handle = IfcAnyHandle::null();
        assert!(handle.is_null_or_empty());
        assert_eq!(handle.step_id(), None);
        assert!(!handle.is_subtype_of(IfcType::IfcLoop));
        assert_eq!(handle.to_string(), "<null>");
    }

    #[test]
    fn test_zero_step_id_is_empty() {
        assert!(poly_loop_handle(0).is_null_or_empty());
    }

    #[test]
    fn test_subtype_queries() {
        let handle = poly_loop_handle(42);
        assert!(!handle.is_null_or_empty());
        assert_eq!(handle.step_id(), Some(42));
        assert_eq!(handle.declared_type(), Some(IfcType::IfcPolyLoop));
        assert!(handle.is_subtype_of(IfcType::IfcLoop));
        assert!(!handle.is_subtype_of(IfcType::IfcEdgeLoop));
        assert!(handle.is_valid_subtype_of(IfcType::IfcPolyLoop, IfcSchemaVersion::Ifc2x));
        assert_eq!(handle.to_string(), "#42=IFCPOLYLOOP");
    }
}
