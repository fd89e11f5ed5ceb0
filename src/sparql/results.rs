//! SPARQL query results

use super::{SparqlError, SparqlResult};
use crate::rdf::Graph;
use oxigraph::sparql::QueryResults;
use oxrdf::{Term, Variable};
use sparesults::{QueryResultsFormat, QueryResultsSerializer};
use std::collections::HashMap;
use std::io::Write;

/// SPARQL result format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultFormat {
    /// SPARQL Query Results XML
    #[default]
    Xml,
    /// SPARQL Query Results JSON
    Json,
}

impl ResultFormat {
    /// Format for a name or media type; anything unrecognized is XML
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" | "application/sparql-results+json" | "application/json" => ResultFormat::Json,
            _ => ResultFormat::Xml,
        }
    }

    /// Media type of the serialized results
    pub fn media_type(self) -> &'static str {
        match self {
            ResultFormat::Xml => "application/sparql-results+xml",
            ResultFormat::Json => "application/sparql-results+json",
        }
    }
}

impl From<ResultFormat> for QueryResultsFormat {
    fn from(format: ResultFormat) -> Self {
        match format {
            ResultFormat::Xml => QueryResultsFormat::Xml,
            ResultFormat::Json => QueryResultsFormat::Json,
        }
    }
}

/// Query solution (variable bindings)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySolution {
    /// Variable name → RDF term bindings
    pub bindings: HashMap<String, Term>,
}

impl QuerySolution {
    /// Create a new query solution
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a binding
    pub fn get(&self, variable: &str) -> Option<&Term> {
        self.bindings.get(variable)
    }

    /// Add a binding
    pub fn bind(&mut self, variable: impl Into<String>, term: Term) {
        self.bindings.insert(variable.into(), term);
    }
}

impl From<HashMap<String, Term>> for QuerySolution {
    fn from(bindings: HashMap<String, Term>) -> Self {
        Self { bindings }
    }
}

/// SPARQL query results
#[derive(Debug, Clone)]
pub enum SparqlResults {
    /// Bindings from SELECT query
    Bindings {
        /// Projected variables, in order
        variables: Vec<Variable>,
        /// Solutions
        solutions: Vec<QuerySolution>,
    },
    /// Boolean from ASK query
    Boolean(bool),
    /// Graph from CONSTRUCT query
    Graph(Graph),
}

impl SparqlResults {
    /// Drain evaluated results into owned solutions, a boolean or a graph
    pub fn collect(results: QueryResults) -> SparqlResult<Self> {
        match results {
            QueryResults::Solutions(iter) => {
                let variables = iter.variables().to_vec();
                let mut solutions = Vec::new();
                for solution in iter {
                    let solution = solution.map_err(evaluation_error)?;
                    let bindings: HashMap<String, Term> = solution
                        .iter()
                        .map(|(variable, term)| (variable.as_str().to_string(), term.clone()))
                        .collect();
                    solutions.push(QuerySolution::from(bindings));
                }
                Ok(SparqlResults::Bindings {
                    variables,
                    solutions,
                })
            }
            QueryResults::Boolean(value) => Ok(SparqlResults::Boolean(value)),
            QueryResults::Graph(triples) => {
                let mut graph = Graph::new();
                for triple in triples {
                    graph.insert(triple.map_err(evaluation_error)?);
                }
                Ok(SparqlResults::Graph(graph))
            }
        }
    }

    /// Number of solutions, triples, or 1 for a boolean
    pub fn len(&self) -> usize {
        match self {
            SparqlResults::Bindings { solutions, .. } => solutions.len(),
            SparqlResults::Boolean(_) => 1,
            SparqlResults::Graph(graph) => graph.len(),
        }
    }

    /// Check if there are no solutions or triples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write SELECT or ASK results in `format`
    ///
    /// Graph results are RDF and go through the RDF serializer instead.
    pub fn write<W: Write>(&self, out: W, format: ResultFormat) -> SparqlResult<W> {
        let serializer = QueryResultsSerializer::from_format(format.into());
        match self {
            SparqlResults::Bindings {
                variables,
                solutions,
            } => {
                let mut writer = serializer
                    .serialize_solutions_to_writer(out, variables.clone())
                    .map_err(results_error)?;
                for solution in solutions {
                    writer
                        .serialize(variables.iter().filter_map(|v| {
                            solution.get(v.as_str()).map(|t| (v.as_ref(), t.as_ref()))
                        }))
                        .map_err(results_error)?;
                }
                writer.finish().map_err(results_error)
            }
            SparqlResults::Boolean(value) => serializer
                .serialize_boolean_to_writer(out, *value)
                .map_err(results_error),
            SparqlResults::Graph(_) => Err(SparqlError::Results(
                "graph results must be written with an RDF serializer".to_string(),
            )),
        }
    }
}

fn results_error(err: std::io::Error) -> SparqlError {
    SparqlError::Results(err.to_string())
}

fn evaluation_error(err: impl std::fmt::Display) -> SparqlError {
    SparqlError::Evaluation(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::NamedNode;

    fn one_solution() -> SparqlResults {
        let mut solution = QuerySolution::new();
        solution.bind("s", NamedNode::new("http://example.org/a").unwrap().into());
        SparqlResults::Bindings {
            variables: vec![Variable::new("s").unwrap()],
            solutions: vec![solution],
        }
    }

    #[test]
    fn test_format_names() {
        assert_eq!(ResultFormat::from_name("json"), ResultFormat::Json);
        assert_eq!(
            ResultFormat::from_name("application/sparql-results+json"),
            ResultFormat::Json
        );
        assert_eq!(ResultFormat::from_name("xml"), ResultFormat::Xml);
        assert_eq!(ResultFormat::from_name("csv"), ResultFormat::Xml);
    }

    #[test]
    fn test_write_json() {
        let out = one_solution().write(Vec::new(), ResultFormat::Json).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"head\""));
        assert!(text.contains("http://example.org/a"));
    }

    #[test]
    fn test_write_xml_boolean() {
        let out = SparqlResults::Boolean(true)
            .write(Vec::new(), ResultFormat::Xml)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("<boolean>true</boolean>"));
    }

    #[test]
    fn test_graph_results_rejected() {
        let result = SparqlResults::Graph(Graph::new()).write(Vec::new(), ResultFormat::Xml);
        assert!(matches!(result, Err(SparqlError::Results(_))));
    }
}
