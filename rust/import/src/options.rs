// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Import session configuration

use ifc_topo_core::IfcSchemaVersion;

/// Settings for one [`ImportFile`](crate::ImportFile) session
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ImportOptions {
    /// Distance below which two points are the same vertex, in output units
    pub vertex_tolerance: f64,
    /// Multiplier from file length units to output units (0.001 for mm -> m)
    pub length_scale: f64,
    /// Mirror every recorded diagnostic as a tracing event
    pub trace_diagnostics: bool,
    /// Use this schema instead of the file's FILE_SCHEMA
    pub schema_override: Option<IfcSchemaVersion>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            vertex_tolerance: 1e-6,
            length_scale: 1.0,
            trace_diagnostics: true,
            schema_override: None,
        }
    }
}

impl ImportOptions {
    pub fn with_vertex_tolerance(mut self, tolerance: f64) -> Self {
        self.vertex_tolerance = tolerance;
        self
    }

    pub fn with_length_scale(mut self, scale: f64) -> Self {
        self.length_scale = scale;
        self
    }

    pub fn with_trace_diagnostics(mut self, enabled: bool) -> Self {
        self.trace_diagnostics = enabled;
        self
    }

    pub fn with_schema(mut self, version: IfcSchemaVersion) -> Self {
        self.schema_override = Some(version);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = ImportOptions::default()
            .with_length_scale(0.001)
            .with_schema(IfcSchemaVersion::Ifc2x3)
            .with_trace_diagnostics(false);
        assert_eq!(options.length_scale, 0.001);
        assert_eq!(options.vertex_tolerance, 1e-6);
        assert_eq!(options.schema_override, Some(IfcSchemaVersion::Ifc2x3));
        assert!(!options.trace_diagnostics);
    }
}
