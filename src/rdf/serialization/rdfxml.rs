//! RDF/XML format implementation

use super::rio::{convert_triple, format_graph};
use super::{ParseError, ParseResult, SerializeError, SerializeResult};
use crate::rdf::Graph;
use oxiri::Iri;
use rio_api::parser::TriplesParser;
use rio_xml::{RdfXmlFormatter, RdfXmlParser};

/// Parse an RDF/XML document, resolving relative IRIs against `base_iri`
pub(super) fn parse(content: &[u8], base_iri: &str) -> ParseResult<Graph> {
    let base = Iri::parse(base_iri.to_string())
        .map_err(|e| ParseError::InvalidBase(e.to_string()))?;
    let mut parser = RdfXmlParser::new(content, Some(base));
    let mut graph = Graph::new();
    parser.parse_all(&mut |t| -> Result<(), ParseError> {
        graph.insert(convert_triple(t)?);
        Ok(())
    })?;
    Ok(graph)
}

/// Serialize a graph to RDF/XML
pub(super) fn serialize(graph: &Graph) -> SerializeResult<Vec<u8>> {
    let mut formatter = RdfXmlFormatter::new(Vec::new())?;
    format_graph(&mut formatter, graph)?;
    formatter
        .finish()
        .map_err(|e| SerializeError::Serialize(e.to_string()))
}
