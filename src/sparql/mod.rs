//! SPARQL support for the in-memory store
//!
//! Queries are parsed and evaluated by oxigraph over the quads the store
//! mirrors from its named graphs. The default graph is the union of all
//! named graphs. Results are drained into [`SparqlResults`] before the
//! store lock is released.
//!
//! # Example
//!
//! ```rust
//! use oxigraph::model::{LiteralRef, NamedNodeRef, QuadRef};
//! use oxigraph::store::Store;
//! use samyama_ldp::sparql;
//!
//! let store = Store::new().unwrap();
//! let alice = NamedNodeRef::new("http://example.org/alice").unwrap();
//! let name = NamedNodeRef::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! store
//!     .insert(QuadRef::new(alice, name, LiteralRef::new_simple_literal("Alice"), alice))
//!     .unwrap();
//!
//! let results = sparql::execute(
//!     &store,
//!     "SELECT ?name WHERE { ?s <http://xmlns.com/foaf/0.1/name> ?name }",
//! )
//! .unwrap();
//! assert_eq!(results.len(), 1);
//! ```

mod parser;
mod results;

pub use parser::SparqlParser;
pub use results::{QuerySolution, ResultFormat, SparqlResults};

use oxigraph::store::Store;
use thiserror::Error;

/// SPARQL errors
#[derive(Error, Debug)]
pub enum SparqlError {
    /// Query text does not parse
    #[error("Parse error: {0}")]
    Parse(String),

    /// Query uses a feature the store does not offer
    #[error("Unsupported query feature: {0}")]
    Unsupported(String),

    /// Evaluation failed
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Results could not be written
    #[error("Results error: {0}")]
    Results(String),
}

pub type SparqlResult<T> = Result<T, SparqlError>;

/// Parse and evaluate `query` over `store`
pub fn execute(store: &Store, query: &str) -> SparqlResult<SparqlResults> {
    let query = SparqlParser::parse(query)?;
    let results = store
        .query(query)
        .map_err(|e| SparqlError::Evaluation(e.to_string()))?;
    SparqlResults::collect(results)
}
