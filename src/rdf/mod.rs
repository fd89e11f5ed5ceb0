//! RDF support for the resource engines
//!
//! This module provides:
//! - [`Graph`]: an insertion-ordered set of triples, the unit every resource is stored as
//! - [`namespace`]: the LDP, Dublin Core and engine configuration vocabularies
//! - Serialization (Turtle, N-Triples, RDF/XML, JSON-LD) behind the [`Serializer`] capability
//!
//! Terms are the `oxrdf` types, re-exported here.
//!
//! # Example
//!
//! ```rust
//! use samyama_ldp::rdf::{Graph, NamedNode, Literal, Triple, RdfCodec, RdfFormat, Serializer};
//!
//! let mut graph = Graph::new();
//! graph.insert(Triple::new(
//!     NamedNode::new("http://example.org/alice").unwrap(),
//!     NamedNode::new("http://xmlns.com/foaf/0.1/name").unwrap(),
//!     Literal::new_simple_literal("Alice"),
//! ));
//!
//! let codec = RdfCodec::new(None);
//! let turtle = codec.serialize(&graph, RdfFormat::Turtle).unwrap();
//! let back = codec.parse(&turtle, "text/turtle", "http://example.org/").unwrap();
//! assert_eq!(back, graph);
//! ```

mod graph;
pub mod namespace;
mod serialization;

pub use graph::Graph;

pub use serialization::{
    ExpandedJsonLd, JsonLdCodec, ParseError, ParseResult, RdfCodec, RdfFormat, SerializeError,
    SerializeResult, Serializer,
};

pub use oxrdf::{
    BlankNode, Literal, NamedNode, NamedNodeRef, Subject, SubjectRef, Term, TermRef, Triple,
    Variable,
};
