//! Graph store capability
//!
//! The resource engines never touch storage directly. They open a
//! transaction on a [`GraphStore`], read and write whole named graphs through
//! it, and end it by dropping it. Read transactions share the store; a write
//! transaction excludes everyone else.

mod memory;

pub use memory::MemoryGraphStore;

use crate::rdf::Graph;
use crate::sparql::{QuerySolution, SparqlError, SparqlResults};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use thiserror::Error;

/// Store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Neither the slug nor any counter value produced an unused URI
    #[error("Could not mint a URI under {container} after {attempts} attempts")]
    MintExhausted { container: String, attempts: u64 },

    /// A minted or supplied URI is not a valid IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    /// Query failed
    #[error("Query error: {0}")]
    Query(#[from] SparqlError),

    /// The quad index rejected a write
    #[error("Storage error: {0}")]
    Storage(#[from] oxigraph::store::StorageError),

    /// A thread panicked while holding the store lock
    #[error("Store lock poisoned")]
    LockPoisoned,

    /// Query returned a different result kind than the caller asked for
    #[error("Unexpected result kind for {0} query")]
    UnexpectedResult(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A store of named graphs
pub trait GraphStore: Send + Sync {
    /// Open a shared read transaction
    fn begin_read(&self) -> StoreResult<Box<dyn ReadTransaction + '_>>;

    /// Open an exclusive write transaction
    fn begin_write(&self) -> StoreResult<Box<dyn WriteTransaction + '_>>;
}

/// Reads available inside any transaction
pub trait ReadTransaction {
    /// Copy of the graph stored under `uri`
    fn get_graph(&self, uri: &str) -> Option<Graph>;

    /// Check if a graph is stored under `uri`
    fn contains_graph(&self, uri: &str) -> bool;

    /// Run a SPARQL query over every stored graph
    fn query(&self, sparql: &str) -> StoreResult<SparqlResults>;

    /// Run a CONSTRUCT query
    fn construct(&self, sparql: &str) -> StoreResult<Graph> {
        match self.query(sparql)? {
            SparqlResults::Graph(graph) => Ok(graph),
            _ => Err(StoreError::UnexpectedResult("CONSTRUCT")),
        }
    }

    /// Run a SELECT query
    fn select(&self, sparql: &str) -> StoreResult<Vec<QuerySolution>> {
        match self.query(sparql)? {
            SparqlResults::Bindings { solutions, .. } => Ok(solutions),
            _ => Err(StoreError::UnexpectedResult("SELECT")),
        }
    }
}

/// Writes, available only inside an exclusive transaction
pub trait WriteTransaction: ReadTransaction {
    /// Store `graph` under `uri`, replacing what was there
    fn put_graph(&mut self, uri: &str, graph: Graph) -> StoreResult<()>;

    /// Remove the graph under `uri`; false if there was none
    fn delete_graph(&mut self, uri: &str) -> StoreResult<bool>;

    /// Reserve an unused member URI under `container`
    ///
    /// The sanitized `slug` is tried first; after that `prefix` followed by a
    /// per-container counter. A name is in use when a graph is stored under
    /// it or under one of its `?`-suffixed side graphs.
    fn mint_graph_uri(
        &mut self,
        container: &str,
        prefix: &str,
        slug: Option<&str>,
    ) -> StoreResult<String>;
}

const SLUG_ENCODE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^')
    .add(b'%');

/// Turn a client slug into a single path segment
///
/// Separators and whitespace are dropped and the rest percent-encoded.
/// Returns `None` when nothing usable is left.
pub fn sanitize_slug(slug: &str) -> Option<String> {
    let cleaned: String = slug
        .chars()
        .filter(|c| !matches!(c, '/' | '?' | '#') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return None;
    }
    Some(utf8_percent_encode(&cleaned, SLUG_ENCODE).to_string())
}

/// URI of the member `name` of `container`
pub fn child_uri(container: &str, name: &str) -> String {
    if container.ends_with('/') {
        format!("{}{}", container, name)
    } else {
        format!("{}/{}", container, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_slug() {
        assert_eq!(sanitize_slug("hello").as_deref(), Some("hello"));
        assert_eq!(sanitize_slug("a/b?c#d").as_deref(), Some("abcd"));
        assert_eq!(sanitize_slug("my doc").as_deref(), Some("mydoc"));
        assert_eq!(sanitize_slug("50%").as_deref(), Some("50%25"));
        assert_eq!(sanitize_slug("<x>").as_deref(), Some("%3Cx%3E"));
        assert_eq!(sanitize_slug(" / "), None);
        assert_eq!(sanitize_slug(".."), None);
    }

    #[test]
    fn test_child_uri() {
        assert_eq!(child_uri("http://example.org/c", "r"), "http://example.org/c/r");
        assert_eq!(child_uri("http://example.org/c/", "r"), "http://example.org/c/r");
    }
}
