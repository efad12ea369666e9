//! Field keys, sampling types, and chunk identifiers.

use std::fmt;

/// Identifies a field: a `(category, name)` pair.
///
/// The category separates field kinds: `"gas"` for cell-sampled fluid
/// fields, a particle type such as `"io"` for particle fields, and on-disk
/// namespaces such as `"ramses"`, `"gravity"` or `"ramses-rt"` for raw
/// storage. The pair is the lookup identity within a registry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey {
    /// Field kind or namespace.
    pub category: String,
    /// Field name within the category.
    pub name: String,
}

impl FieldKey {
    /// Build a key from any string-like pair.
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "('{}', '{}')", self.category, self.name)
    }
}

impl<C: Into<String>, N: Into<String>> From<(C, N)> for FieldKey {
    fn from((category, name): (C, N)) -> Self {
        Self::new(category, name)
    }
}

/// Whether a field is defined per mesh cell or per particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SamplingType {
    /// One value per mesh cell.
    Cell,
    /// One value per particle.
    Particle,
}

impl fmt::Display for SamplingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cell => write!(f, "cell"),
            Self::Particle => write!(f, "particle"),
        }
    }
}

/// Identifies a spatial or particle-index chunk of a dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(pub u32);

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ChunkId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// The subset of a dataset over which field arrays are materialized.
///
/// The engine treats a chunk as opaque: only the raw-data loader knows
/// which cells or particles it covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk identity, passed through to the loader.
    pub id: ChunkId,
    /// Number of cells or particles in the chunk.
    pub len: usize,
}

impl Chunk {
    /// A chunk with the given id and element count.
    pub fn new(id: u32, len: usize) -> Self {
        Self {
            id: ChunkId(id),
            len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_from_tuple() {
        let k: FieldKey = ("gas", "density").into();
        assert_eq!(k, FieldKey::new("gas", "density"));
        assert_eq!(k.to_string(), "('gas', 'density')");
    }

    #[test]
    fn keys_distinguish_category() {
        assert_ne!(
            FieldKey::new("gas", "density"),
            FieldKey::new("ramses", "density")
        );
    }
}
