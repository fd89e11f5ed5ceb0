//! SPARQL parser

use super::{SparqlError, SparqlResult};
use oxigraph::sparql::Query;

/// SPARQL parser
pub struct SparqlParser;

impl SparqlParser {
    /// Parse a SPARQL query string
    ///
    /// Dataset clauses (`FROM`, `FROM NAMED`) are rejected: queries always
    /// run against every graph in the store, with the union of all graphs
    /// as default graph.
    pub fn parse(query: &str) -> SparqlResult<Query> {
        let mut query = Query::parse(query, None).map_err(|e| SparqlError::Parse(e.to_string()))?;
        if !query.dataset().is_default_dataset() {
            return Err(SparqlError::Unsupported("FROM / FROM NAMED".to_string()));
        }
        query.dataset_mut().set_default_graph_as_union();
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select() {
        let query = SparqlParser::parse("SELECT * WHERE { ?s ?p ?o }").unwrap();
        assert!(query.to_string().contains("SELECT"));
    }

    #[test]
    fn test_syntax_error() {
        let result = SparqlParser::parse("SELECT WHERE {");
        assert!(matches!(result, Err(SparqlError::Parse(_))));
    }

    #[test]
    fn test_dataset_clause_rejected() {
        let result = SparqlParser::parse("SELECT * FROM <http://example.org/g> WHERE { ?s ?p ?o }");
        assert!(matches!(result, Err(SparqlError::Unsupported(_))));
    }
}
