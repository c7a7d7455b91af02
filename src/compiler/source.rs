// Output asset representations

use crate::source_map::{compose, SharedSourceMap};
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Source text together with the map that describes exactly that text
#[derive(Debug, Clone)]
pub struct SourceAndMap {
    pub source: String,
    pub map: Option<SharedSourceMap>,
}

/// A named, in-memory output file
///
/// Assets expose their text and optional source map either through two
/// separate accessors or through the atomic `source_and_map` accessor.
/// Asset kinds that cannot offer an atomic read return `None` from it.
pub trait Source: Send + Sync + fmt::Debug {
    fn source(&self) -> Cow<'_, str>;

    fn map(&self) -> Option<SharedSourceMap>;

    fn source_and_map(&self) -> Option<SourceAndMap> {
        None
    }

    /// Provenance view for assets produced by a map-carrying transform
    fn as_source_map_source(&self) -> Option<&SourceMapSource> {
        None
    }

    fn size(&self) -> usize {
        self.source().len()
    }
}

/// Shared handle to an asset stored in a compilation
pub type SharedSource = Arc<dyn Source>;

/// Plain text asset without a source map
#[derive(Debug, Clone)]
pub struct RawSource {
    value: String,
}

impl RawSource {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl Source for RawSource {
    fn source(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.value)
    }

    fn map(&self) -> Option<SharedSourceMap> {
        None
    }

    fn source_and_map(&self) -> Option<SourceAndMap> {
        Some(SourceAndMap {
            source: self.value.clone(),
            map: None,
        })
    }
}

/// Asset carrying generated code, its map and the provenance it came from
///
/// `map` describes `value` in terms of `original_source` (registered under
/// `name`). When `inner_source_map` is present it describes `original_source`
/// in terms of the true originals, and `Source::map` returns the composition
/// of both.
pub struct SourceMapSource {
    value: String,
    name: String,
    map: SharedSourceMap,
    original_source: String,
    inner_source_map: Option<SharedSourceMap>,
    resolved: OnceLock<SharedSourceMap>,
}

impl SourceMapSource {
    pub fn new(
        value: impl Into<String>,
        name: impl Into<String>,
        map: SharedSourceMap,
        original_source: impl Into<String>,
        inner_source_map: Option<SharedSourceMap>,
    ) -> Self {
        Self {
            value: value.into(),
            name: name.into(),
            map,
            original_source: original_source.into(),
            inner_source_map,
            resolved: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source text the outer map refers to
    pub fn original_source(&self) -> &str {
        &self.original_source
    }

    /// Map produced by the last transform, before composition
    pub fn outer_source_map(&self) -> &SharedSourceMap {
        &self.map
    }

    /// Map that described `original_source` before the last transform
    pub fn inner_source_map(&self) -> Option<&SharedSourceMap> {
        self.inner_source_map.as_ref()
    }

    fn resolve_map(&self) -> SharedSourceMap {
        self.resolved
            .get_or_init(|| match &self.inner_source_map {
                Some(inner) => Arc::new(compose(inner, &self.map, &self.name)),
                None => self.embed_original_source(),
            })
            .clone()
    }

    /// A single-source map without embedded contents gets the original text
    fn embed_original_source(&self) -> SharedSourceMap {
        if self.map.get_source_count() != 1 || self.map.get_source_contents(0).is_some() {
            return self.map.clone();
        }

        let mut map = (*self.map).clone();
        map.set_source_contents(0, Some(&self.original_source));
        Arc::new(map)
    }
}

impl fmt::Debug for SourceMapSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceMapSource")
            .field("name", &self.name)
            .field("size", &self.value.len())
            .field("has_inner_source_map", &self.inner_source_map.is_some())
            .finish()
    }
}

impl Source for SourceMapSource {
    fn source(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.value)
    }

    fn map(&self) -> Option<SharedSourceMap> {
        Some(self.resolve_map())
    }

    fn source_and_map(&self) -> Option<SourceAndMap> {
        Some(SourceAndMap {
            source: self.value.clone(),
            map: Some(self.resolve_map()),
        })
    }

    fn as_source_map_source(&self) -> Option<&SourceMapSource> {
        Some(self)
    }
}
