//! Samyama LDP
//!
//! A Linked Data Platform container engine over named RDF graphs. Resources
//! are named graphs addressed by URI; containers keep containment and
//! membership triples, and serve their members as a lazily rebuilt chain of
//! pages.
//!
//! # Architecture
//!
//! - [`store`]: the graph store capability and an in-memory store
//! - [`rdf`]: graph container, vocabulary, parsers and serializers
//! - [`sparql`]: query parsing, evaluation and result formats for the in-memory store
//! - [`resource`]: resource kinds, URIs, metadata and validators
//! - [`container`]: containers, membership and RDF sources
//! - [`page`]: per-container page chains
//! - [`nonrdf`]: binary resources
//! - [`engine`]: the GET/POST/PUT/PATCH/DELETE surface
//!
//! ## Example Usage
//!
//! ```rust
//! use samyama_ldp::{EngineConfig, LdpEngine, WriteRequest};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let config = EngineConfig {
//!     base_uri: "http://example.org/ldp/".to_string(),
//!     binary_dir: dir.path().to_path_buf(),
//!     ..EngineConfig::default()
//! };
//! let engine = LdpEngine::in_memory(config).unwrap();
//! engine.ensure_root_container().unwrap();
//!
//! let turtle = b"<> <http://purl.org/dc/terms/title> \"Hello\" .";
//! let request = WriteRequest::new(turtle, "text/turtle", "alice").with_slug("hello");
//! let uri = engine.post("http://example.org/ldp/", &request).unwrap();
//! assert_eq!(uri, "http://example.org/ldp/hello");
//!
//! let page = engine.get("http://example.org/ldp/?firstPage", "text/turtle").unwrap();
//! assert!(String::from_utf8(page.body).unwrap().contains("hello"));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod container;
pub mod engine;
pub mod error;
pub mod nonrdf;
pub mod page;
pub mod rdf;
pub mod resource;
pub mod sparql;
pub mod store;

// Re-export main types for convenience
pub use config::{ConfigError, ConfigResult, EngineConfig};

pub use container::{ContainerConfig, ContainerEngine, Membership};

pub use engine::LdpEngine;

pub use error::{LdpError, LdpResult};

pub use nonrdf::NonRdfSourceEngine;

pub use page::{PageEngine, PageState, PageView};

pub use rdf::{
    ExpandedJsonLd, Graph, JsonLdCodec, Literal, NamedNode, RdfCodec, RdfFormat, Serializer,
    Term, Triple,
};

pub use resource::{
    Metadata, Representation, ResourceEngine, ResourceHandler, ResourceKind, ResourceRecord,
    ResourceUri, Suffix, WriteRequest,
};

pub use sparql::{QuerySolution, ResultFormat, SparqlError, SparqlResult, SparqlResults};

pub use store::{GraphStore, MemoryGraphStore, ReadTransaction, StoreError, WriteTransaction};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.1.0");
    }
}
