//! RDF serialization formats
//!
//! Supports:
//! - Turtle (TTL)
//! - N-Triples (NT)
//! - RDF/XML
//! - JSON-LD, through an injected [`JsonLdCodec`]

mod jsonld;
mod rdfxml;
mod rio;
mod turtle;

pub use jsonld::ExpandedJsonLd;

use super::Graph;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// RDF serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    /// Turtle format (.ttl)
    Turtle,
    /// N-Triples format (.nt)
    NTriples,
    /// RDF/XML format (.rdf)
    RdfXml,
    /// JSON-LD format (.jsonld)
    JsonLd,
}

impl RdfFormat {
    /// Canonical media type
    pub fn media_type(self) -> &'static str {
        match self {
            RdfFormat::Turtle => "text/turtle",
            RdfFormat::NTriples => "application/n-triples",
            RdfFormat::RdfXml => "application/rdf+xml",
            RdfFormat::JsonLd => "application/ld+json",
        }
    }

    /// Format for a `Content-Type` value, ignoring parameters
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let mime: mime::Mime = media_type.trim().parse().ok()?;
        match mime.essence_str() {
            "text/turtle" | "application/x-turtle" => Some(RdfFormat::Turtle),
            "application/n-triples" => Some(RdfFormat::NTriples),
            "application/rdf+xml" => Some(RdfFormat::RdfXml),
            "application/ld+json" => Some(RdfFormat::JsonLd),
            _ => None,
        }
    }

    /// Pick a format for an `Accept` value
    ///
    /// Entries are tried in order; a wildcard or an empty header selects
    /// Turtle. Quality values are not weighed.
    pub fn negotiate(accept: &str) -> Option<Self> {
        if accept.trim().is_empty() {
            return Some(RdfFormat::Turtle);
        }
        for entry in accept.split(',') {
            let Ok(mime) = entry.trim().parse::<mime::Mime>() else {
                continue;
            };
            match mime.essence_str() {
                "*/*" | "text/*" => return Some(RdfFormat::Turtle),
                essence => {
                    if let Some(format) = Self::from_media_type(essence) {
                        return Some(format);
                    }
                }
            }
        }
        None
    }
}

/// Parse errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// Turtle or N-Triples syntax error
    #[error("Turtle syntax error: {0}")]
    Turtle(#[from] rio_turtle::TurtleError),

    /// RDF/XML syntax error
    #[error("RDF/XML syntax error: {0}")]
    RdfXml(#[from] rio_xml::RdfXmlError),

    /// JSON-LD error
    #[error("JSON-LD error: {0}")]
    JsonLd(String),

    /// A parsed term is not valid RDF
    #[error("Invalid term: {0}")]
    InvalidTerm(String),

    /// Base IRI could not be parsed
    #[error("Invalid base IRI: {0}")]
    InvalidBase(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Serialization errors
#[derive(Error, Debug)]
pub enum SerializeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub type SerializeResult<T> = Result<T, SerializeError>;

/// JSON-LD conversion capability
pub trait JsonLdCodec: Send + Sync {
    /// Serialize a graph to a JSON-LD document
    fn to_json_ld(&self, graph: &Graph) -> SerializeResult<String>;

    /// Parse a JSON-LD document, resolving relative IRIs against `base_iri`
    fn from_json_ld(&self, input: &str, base_iri: &str) -> ParseResult<Graph>;
}

/// Parse/serialize capability used by the resource engines
pub trait Serializer: Send + Sync {
    /// Parse `content` of the given media type
    fn parse(&self, content: &[u8], media_type: &str, base_iri: &str) -> ParseResult<Graph>;

    /// Serialize a graph to the given format
    fn serialize(&self, graph: &Graph, format: RdfFormat) -> SerializeResult<Vec<u8>>;
}

/// Serializer backed by rio, with optional JSON-LD support
pub struct RdfCodec {
    json_ld: Option<Arc<dyn JsonLdCodec>>,
}

impl RdfCodec {
    /// Create a codec; JSON-LD requests fail without a `json_ld` codec
    pub fn new(json_ld: Option<Arc<dyn JsonLdCodec>>) -> Self {
        if json_ld.is_some() {
            info!("JSON-LD support enabled");
        } else {
            info!("JSON-LD support not configured; JSON-LD requests will be rejected");
        }
        Self { json_ld }
    }

    /// Codec with the expanded-form JSON-LD implementation
    pub fn with_expanded_json_ld() -> Self {
        Self::new(Some(Arc::new(ExpandedJsonLd)))
    }

    /// Check if JSON-LD was configured
    pub fn supports_json_ld(&self) -> bool {
        self.json_ld.is_some()
    }

    fn json_ld(&self) -> Option<&dyn JsonLdCodec> {
        self.json_ld.as_deref()
    }
}

impl Serializer for RdfCodec {
    fn parse(&self, content: &[u8], media_type: &str, base_iri: &str) -> ParseResult<Graph> {
        let format = RdfFormat::from_media_type(media_type)
            .ok_or_else(|| ParseError::UnsupportedFormat(media_type.to_string()))?;
        match format {
            RdfFormat::Turtle => turtle::parse_turtle(content, base_iri),
            RdfFormat::NTriples => turtle::parse_ntriples(content),
            RdfFormat::RdfXml => rdfxml::parse(content, base_iri),
            RdfFormat::JsonLd => {
                let codec = self
                    .json_ld()
                    .ok_or_else(|| ParseError::UnsupportedFormat(media_type.to_string()))?;
                let input = std::str::from_utf8(content)
                    .map_err(|e| ParseError::JsonLd(e.to_string()))?;
                codec.from_json_ld(input, base_iri)
            }
        }
    }

    fn serialize(&self, graph: &Graph, format: RdfFormat) -> SerializeResult<Vec<u8>> {
        match format {
            RdfFormat::Turtle => turtle::serialize_turtle(graph),
            RdfFormat::NTriples => turtle::serialize_ntriples(graph),
            RdfFormat::RdfXml => rdfxml::serialize(graph),
            RdfFormat::JsonLd => {
                let codec = self.json_ld().ok_or_else(|| {
                    SerializeError::UnsupportedFormat(format.media_type().to_string())
                })?;
                Ok(codec.to_json_ld(graph)?.into_bytes())
            }
        }
    }
}
