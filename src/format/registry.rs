//! Format registry for discovering and accessing annotation formats.

use std::collections::HashMap;

use crate::format::formats::IsiFormat;
use crate::format::traits::AnnotationFormat;

/// Registry of available annotation formats.
///
/// Built-in formats are registered on creation. The registry is a plain
/// value owned by the caller; nothing is registered process-wide.
pub struct FormatRegistry {
    formats: HashMap<&'static str, Box<dyn AnnotationFormat>>,
}

impl FormatRegistry {
    /// Create a new registry with all built-in formats registered.
    pub fn new() -> Self {
        let mut registry = Self {
            formats: HashMap::new(),
        };

        registry.register(Box::new(IsiFormat));

        registry
    }

    /// Register a format implementation, replacing any with the same ID.
    pub fn register(&mut self, format: Box<dyn AnnotationFormat>) {
        log::debug!("Registering format '{}' v{}", format.id(), format.version());
        self.formats.insert(format.id(), format);
    }

    /// Get a format by its ID.
    pub fn get(&self, id: &str) -> Option<&dyn AnnotationFormat> {
        self.formats.get(id).map(|f| f.as_ref())
    }

    /// Find formats that can import files with the given extension.
    pub fn importers_for(&self, ext: &str) -> Vec<&dyn AnnotationFormat> {
        self.formats
            .values()
            .filter(|f| {
                f.import_extensions()
                    .iter()
                    .any(|e| e.eq_ignore_ascii_case(ext))
            })
            .map(|f| f.as_ref())
            .collect()
    }

    /// Get all format IDs.
    pub fn ids(&self) -> Vec<&'static str> {
        self.formats.keys().copied().collect()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}
