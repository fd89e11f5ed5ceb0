//! Turtle and N-Triples implementation

use super::rio::{convert_triple, format_graph};
use super::{ParseError, ParseResult, SerializeError, SerializeResult};
use crate::rdf::Graph;
use oxiri::Iri;
use rio_api::parser::TriplesParser;
use rio_turtle::{NTriplesFormatter, NTriplesParser, TurtleFormatter, TurtleParser};

/// Parse a Turtle document, resolving relative IRIs against `base_iri`
pub(super) fn parse_turtle(content: &[u8], base_iri: &str) -> ParseResult<Graph> {
    let base = Iri::parse(base_iri.to_string())
        .map_err(|e| ParseError::InvalidBase(e.to_string()))?;
    let mut parser = TurtleParser::new(content, Some(base));
    let mut graph = Graph::new();
    parser.parse_all(&mut |t| -> Result<(), ParseError> {
        graph.insert(convert_triple(t)?);
        Ok(())
    })?;
    Ok(graph)
}

/// Parse an N-Triples document
pub(super) fn parse_ntriples(content: &[u8]) -> ParseResult<Graph> {
    let mut parser = NTriplesParser::new(content);
    let mut graph = Graph::new();
    parser.parse_all(&mut |t| -> Result<(), ParseError> {
        graph.insert(convert_triple(t)?);
        Ok(())
    })?;
    Ok(graph)
}

/// Serialize a graph to Turtle
pub(super) fn serialize_turtle(graph: &Graph) -> SerializeResult<Vec<u8>> {
    let mut formatter = TurtleFormatter::new(Vec::new());
    format_graph(&mut formatter, graph)?;
    formatter
        .finish()
        .map_err(|e| SerializeError::Serialize(e.to_string()))
}

/// Serialize a graph to N-Triples
pub(super) fn serialize_ntriples(graph: &Graph) -> SerializeResult<Vec<u8>> {
    let mut formatter = NTriplesFormatter::new(Vec::new());
    format_graph(&mut formatter, graph)?;
    formatter
        .finish()
        .map_err(|e| SerializeError::Serialize(e.to_string()))
}
