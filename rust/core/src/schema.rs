// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC Schema Types
//!
//! Fast type checking using an enum instead of string comparison, plus the
//! supertype table and schema versions needed for subtype dispatch.

use std::fmt;

use smallvec::SmallVec;

use crate::error::{Error, Result};

/// IFC schema releases, ordered oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IfcSchemaVersion {
    Ifc2x,
    Ifc2x2,
    Ifc2x3,
    Ifc4,
    Ifc4x1,
    Ifc4x2,
    Ifc4x3,
}

impl IfcSchemaVersion {
    /// Map a FILE_SCHEMA identifier to a release.
    ///
    /// Accepts the common spellings: `IFC2X_FINAL`, `IFC2X2_FINAL`,
    /// `IFC2X3`, `IFC2X3_TC1`, `IFC4`, `IFC4_ADD2_TC1`, `IFC4X1`, `IFC4X3_ADD2`.
    pub fn from_identifier(identifier: &str) -> Result<Self> {
        let upper = identifier.trim().to_ascii_uppercase();
        // Longest prefixes first: IFC4X3 must not match as IFC4.
        let version = if upper.starts_with("IFC4X3") {
            Self::Ifc4x3
        } else if upper.starts_with("IFC4X2") {
            Self::Ifc4x2
        } else if upper.starts_with("IFC4X1") {
            Self::Ifc4x1
        } else if upper.starts_with("IFC4") {
            Self::Ifc4
        } else if upper.starts_with("IFC2X3") {
            Self::Ifc2x3
        } else if upper.starts_with("IFC2X2") {
            Self::Ifc2x2
        } else if upper.starts_with("IFC2X") {
            Self::Ifc2x
        } else {
            return Err(Error::UnsupportedSchema(identifier.to_string()));
        };
        Ok(version)
    }

    /// Canonical identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ifc2x => "IFC2X",
            Self::Ifc2x2 => "IFC2X2",
            Self::Ifc2x3 => "IFC2X3",
            Self::Ifc4 => "IFC4",
            Self::Ifc4x1 => "IFC4X1",
            Self::Ifc4x2 => "IFC4X2",
            Self::Ifc4x3 => "IFC4X3",
        }
    }
}

impl fmt::Display for IfcSchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answers version-gating queries for a loaded file.
pub trait SchemaVersionOracle {
    /// Schema declared by (or forced for) the active file
    fn schema_version(&self) -> IfcSchemaVersion;

    /// True when the active schema is `version` or newer.
    fn schema_at_least(&self, version: IfcSchemaVersion) -> bool {
        self.schema_version() >= version
    }
}

impl SchemaVersionOracle for IfcSchemaVersion {
    fn schema_version(&self) -> IfcSchemaVersion {
        *self
    }
}

/// IFC Entity Types
/// Topology and geometry types reachable from loops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IfcType {
    // Abstract roots
    IfcRepresentationItem,
    IfcTopologicalRepresentationItem,
    IfcGeometricRepresentationItem,

    // Loops
    IfcLoop,
    IfcEdgeLoop,
    IfcPolyLoop,
    IfcVertexLoop,

    // Edges
    IfcEdge,
    IfcEdgeCurve,
    IfcOrientedEdge,
    IfcSubedge,

    // Vertices
    IfcVertex,
    IfcVertexPoint,

    // Faces
    IfcFace,
    IfcFaceBound,
    IfcFaceOuterBound,

    // Points
    IfcPoint,
    IfcCartesianPoint,

    // Curve types
    IfcCurve,
    IfcLine,
    IfcBoundedCurve,
    IfcPolyline,
    IfcTrimmedCurve,
    IfcCompositeCurve,
    IfcBSplineCurve,
    IfcConic,
    IfcCircle,
    IfcEllipse,

    // Fallback for unknown types
    Unknown(u16), // Store hash for unknown types
}

impl IfcType {
    /// Parse IFC type from an upper-case STEP keyword
    pub fn from_name(s: &str) -> Self {
        match s {
            "IFCREPRESENTATIONITEM" => Self::IfcRepresentationItem,
            "IFCTOPOLOGICALREPRESENTATIONITEM" => Self::IfcTopologicalRepresentationItem,
            "IFCGEOMETRICREPRESENTATIONITEM" => Self::IfcGeometricRepresentationItem,

            "IFCLOOP" => Self::IfcLoop,
            "IFCEDGELOOP" => Self::IfcEdgeLoop,
            "IFCPOLYLOOP" => Self::IfcPolyLoop,
            "IFCVERTEXLOOP" => Self::IfcVertexLoop,

            "IFCEDGE" => Self::IfcEdge,
            "IFCEDGECURVE" => Self::IfcEdgeCurve,
            "IFCORIENTEDEDGE" => Self::IfcOrientedEdge,
            "IFCSUBEDGE" => Self::IfcSubedge,

            "IFCVERTEX" => Self::IfcVertex,
            "IFCVERTEXPOINT" => Self::IfcVertexPoint,

            "IFCFACE" => Self::IfcFace,
            "IFCFACEBOUND" => Self::IfcFaceBound,
            "IFCFACEOUTERBOUND" => Self::IfcFaceOuterBound,

            "IFCPOINT" => Self::IfcPoint,
            "IFCCARTESIANPOINT" => Self::IfcCartesianPoint,

            "IFCCURVE" => Self::IfcCurve,
            "IFCLINE" => Self::IfcLine,
            "IFCBOUNDEDCURVE" => Self::IfcBoundedCurve,
            "IFCPOLYLINE" => Self::IfcPolyline,
            "IFCTRIMMEDCURVE" => Self::IfcTrimmedCurve,
            "IFCCOMPOSITECURVE" => Self::IfcCompositeCurve,
            "IFCBSPLINECURVE" => Self::IfcBSplineCurve,
            "IFCCONIC" => Self::IfcConic,
            "IFCCIRCLE" => Self::IfcCircle,
            "IFCELLIPSE" => Self::IfcEllipse,

            _ => Self::Unknown(simple_hash(s)),
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IfcRepresentationItem => "IFCREPRESENTATIONITEM",
            Self::IfcTopologicalRepresentationItem => "IFCTOPOLOGICALREPRESENTATIONITEM",
            Self::IfcGeometricRepresentationItem => "IFCGEOMETRICREPRESENTATIONITEM",

            Self::IfcLoop => "IFCLOOP",
            Self::IfcEdgeLoop => "IFCEDGELOOP",
            Self::IfcPolyLoop => "IFCPOLYLOOP",
            Self::IfcVertexLoop => "IFCVERTEXLOOP",

            Self::IfcEdge => "IFCEDGE",
            Self::IfcEdgeCurve => "IFCEDGECURVE",
            Self::IfcOrientedEdge => "IFCORIENTEDEDGE",
            Self::IfcSubedge => "IFCSUBEDGE",

            Self::IfcVertex => "IFCVERTEX",
            Self::IfcVertexPoint => "IFCVERTEXPOINT",

            Self::IfcFace => "IFCFACE",
            Self::IfcFaceBound => "IFCFACEBOUND",
            Self::IfcFaceOuterBound => "IFCFACEOUTERBOUND",

            Self::IfcPoint => "IFCPOINT",
            Self::IfcCartesianPoint => "IFCCARTESIANPOINT",

            Self::IfcCurve => "IFCCURVE",
            Self::IfcLine => "IFCLINE",
            Self::IfcBoundedCurve => "IFCBOUNDEDCURVE",
            Self::IfcPolyline => "IFCPOLYLINE",
            Self::IfcTrimmedCurve => "IFCTRIMMEDCURVE",
            Self::IfcCompositeCurve => "IFCCOMPOSITECURVE",
            Self::IfcBSplineCurve => "IFCBSPLINECURVE",
            Self::IfcConic => "IFCCONIC",
            Self::IfcCircle => "IFCCIRCLE",
            Self::IfcEllipse => "IFCELLIPSE",

            Self::Unknown(_) => "UNKNOWN",
        }
    }

    /// Direct supertype in the EXPRESS hierarchy
    pub fn supertype(&self) -> Option<IfcType> {
        let parent = match self {
            Self::IfcRepresentationItem | Self::Unknown(_) => return None,
            Self::IfcTopologicalRepresentationItem | Self::IfcGeometricRepresentationItem => {
                Self::IfcRepresentationItem
            }

            Self::IfcLoop
            | Self::IfcEdge
            | Self::IfcVertex
            | Self::IfcFace
            | Self::IfcFaceBound => Self::IfcTopologicalRepresentationItem,
            Self::IfcEdgeLoop | Self::IfcPolyLoop | Self::IfcVertexLoop => Self::IfcLoop,
            Self::IfcEdgeCurve | Self::IfcOrientedEdge | Self::IfcSubedge => Self::IfcEdge,
            Self::IfcVertexPoint => Self::IfcVertex,
            Self::IfcFaceOuterBound => Self::IfcFaceBound,

            Self::IfcPoint | Self::IfcCurve => Self::IfcGeometricRepresentationItem,
            Self::IfcCartesianPoint => Self::IfcPoint,
            Self::IfcLine | Self::IfcBoundedCurve | Self::IfcConic => Self::IfcCurve,
            Self::IfcPolyline
            | Self::IfcTrimmedCurve
            | Self::IfcCompositeCurve
            | Self::IfcBSplineCurve => Self::IfcBoundedCurve,
            Self::IfcCircle | Self::IfcEllipse => Self::IfcConic,
        };
        Some(parent)
    }

    /// This type followed by every supertype up to the root
    pub fn ancestry(&self) -> SmallVec<[IfcType; 6]> {
        let mut chain = SmallVec::new();
        let mut current = Some(*self);
        while let Some(t) = current {
            chain.push(t);
            current = t.supertype();
        }
        chain
    }

    /// True when `self` is `base` or one of its descendants.
    pub fn is_subtype_of(&self, base: IfcType) -> bool {
        self.ancestry().contains(&base)
    }

    /// First schema release declaring this type.
    ///
    /// The edge-based topology types arrived with IFC2x2; earlier files only
    /// carry poly loops.
    pub fn introduced_in(&self) -> IfcSchemaVersion {
        match self {
            Self::IfcEdgeLoop
            | Self::IfcVertexLoop
            | Self::IfcEdge
            | Self::IfcEdgeCurve
            | Self::IfcOrientedEdge
            | Self::IfcSubedge
            | Self::IfcVertex
            | Self::IfcVertexPoint => IfcSchemaVersion::Ifc2x2,
            Self::IfcBSplineCurve => IfcSchemaVersion::Ifc2x2,
            _ => IfcSchemaVersion::Ifc2x,
        }
    }

    /// True when `self` is a subtype of `base` and both exist in `version`.
    pub fn is_valid_subtype_of(&self, base: IfcType, version: IfcSchemaVersion) -> bool {
        self.is_subtype_of(base)
            && self.introduced_in() <= version
            && base.introduced_in() <= version
    }

    /// Check if this is a topological loop type
    pub fn is_loop(&self) -> bool {
        self.is_subtype_of(Self::IfcLoop)
    }
}

impl fmt::Display for IfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Simple hash function for unknown IFC types
fn simple_hash(s: &str) -> u16 {
    let mut hash: u32 = 5381;
    for byte in s.bytes() {
        hash = ((hash << 5).wrapping_add(hash)).wrapping_add(byte as u32);
    }
    (hash & 0xFFFF) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(IfcType::from_name("IFCPOLYLOOP"), IfcType::IfcPolyLoop);
        assert_eq!(IfcType::from_name("IFCEDGELOOP"), IfcType::IfcEdgeLoop);
        assert_eq!(IfcType::IfcOrientedEdge.as_str(), "IFCORIENTEDEDGE");
        assert!(matches!(
            IfcType::from_name("IFCCUSTOMLOOP"),
            IfcType::Unknown(_)
        ));
    }

    #[test]
    fn test_subtype_chain() {
        assert!(IfcType::IfcEdgeLoop.is_subtype_of(IfcType::IfcLoop));
        assert!(IfcType::IfcPolyLoop.is_subtype_of(IfcType::IfcTopologicalRepresentationItem));
        assert!(IfcType::IfcCircle.is_subtype_of(IfcType::IfcCurve));
        assert!(!IfcType::IfcPolyLoop.is_subtype_of(IfcType::IfcEdgeLoop));
        assert!(!IfcType::IfcEdge.is_loop());
        assert!(!IfcType::Unknown(7).is_subtype_of(IfcType::IfcLoop));
        assert_eq!(
            IfcType::IfcFaceOuterBound.ancestry().as_slice(),
            &[
                IfcType::IfcFaceOuterBound,
                IfcType::IfcFaceBound,
                IfcType::IfcTopologicalRepresentationItem,
                IfcType::IfcRepresentationItem,
            ]
        );
    }

    #[test]
    fn test_valid_subtype_respects_version() {
        assert!(!IfcType::IfcEdgeLoop.is_valid_subtype_of(IfcType::IfcLoop, IfcSchemaVersion::Ifc2x));
        assert!(IfcType::IfcEdgeLoop.is_valid_subtype_of(IfcType::IfcLoop, IfcSchemaVersion::Ifc2x2));
        assert!(IfcType::IfcPolyLoop.is_valid_subtype_of(IfcType::IfcPolyLoop, IfcSchemaVersion::Ifc2x));
    }

    #[test]
    fn test_schema_identifiers() {
        assert_eq!(
            IfcSchemaVersion::from_identifier("IFC2X3").unwrap(),
            IfcSchemaVersion::Ifc2x3
        );
        assert_eq!(
            IfcSchemaVersion::from_identifier("IFC2X2_FINAL").unwrap(),
            IfcSchemaVersion::Ifc2x2
        );
        assert_eq!(
            IfcSchemaVersion::from_identifier("IFC2X_FINAL").unwrap(),
            IfcSchemaVersion::Ifc2x
        );
        assert_eq!(
            IfcSchemaVersion::from_identifier("IFC4_ADD2_TC1").unwrap(),
            IfcSchemaVersion::Ifc4
        );
        assert_eq!(
            IfcSchemaVersion::from_identifier("ifc4x3_add2").unwrap(),
            IfcSchemaVersion::Ifc4x3
        );
        assert!(IfcSchemaVersion::from_identifier("CIS2").is_err());
    }

    #[test]
    fn test_schema_oracle() {
        let oracle = IfcSchemaVersion::Ifc2x3;
        assert!(oracle.schema_at_least(IfcSchemaVersion::Ifc2x2));
        assert!(oracle.schema_at_least(IfcSchemaVersion::Ifc2x3));
        assert!(!oracle.schema_at_least(IfcSchemaVersion::Ifc4));
    }
}
