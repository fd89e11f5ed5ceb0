//! JSON-LD in expanded form
//!
//! Output is one node object per subject, properties keyed by full IRIs.
//! Input must be expanded as well: `@context` is rejected rather than
//! half-applied.

use super::{JsonLdCodec, ParseError, ParseResult, SerializeError, SerializeResult};
use crate::rdf::Graph;
use indexmap::IndexMap;
use oxiri::Iri;
use oxrdf::vocab::{rdf, xsd};
use oxrdf::{BlankNode, Literal, NamedNode, Subject, Term, Triple};
use serde_json::{json, Map, Value};

/// Expanded-form JSON-LD codec
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandedJsonLd;

impl JsonLdCodec for ExpandedJsonLd {
    fn to_json_ld(&self, graph: &Graph) -> SerializeResult<String> {
        let mut nodes: IndexMap<String, Map<String, Value>> = IndexMap::new();

        for triple in graph.iter() {
            let id = match &triple.subject {
                Subject::NamedNode(n) => n.as_str().to_string(),
                Subject::BlankNode(b) => format!("_:{}", b.as_str()),
                #[allow(unreachable_patterns)]
                _ => continue,
            };
            let node = nodes.entry(id.clone()).or_insert_with(|| {
                let mut node = Map::new();
                node.insert("@id".to_string(), Value::String(id));
                node
            });

            if triple.predicate.as_ref() == rdf::TYPE {
                if let Term::NamedNode(class) = &triple.object {
                    push(node, "@type", Value::String(class.as_str().to_string()));
                    continue;
                }
            }
            let value = match &triple.object {
                Term::NamedNode(n) => json!({ "@id": n.as_str() }),
                Term::BlankNode(b) => json!({ "@id": format!("_:{}", b.as_str()) }),
                Term::Literal(l) => literal_value(l),
                #[allow(unreachable_patterns)]
                _ => continue,
            };
            push(node, triple.predicate.as_str(), value);
        }

        let document: Vec<Value> = nodes.into_values().map(Value::Object).collect();
        serde_json::to_string_pretty(&document).map_err(|e| SerializeError::Serialize(e.to_string()))
    }

    fn from_json_ld(&self, input: &str, base_iri: &str) -> ParseResult<Graph> {
        let base = Iri::parse(base_iri.to_string())
            .map_err(|e| ParseError::InvalidBase(e.to_string()))?;
        let document: Value =
            serde_json::from_str(input).map_err(|e| ParseError::JsonLd(e.to_string()))?;

        let mut reader = Reader {
            base,
            graph: Graph::new(),
        };
        match &document {
            Value::Array(items) => {
                for item in items {
                    reader.node(item)?;
                }
            }
            Value::Object(object) => {
                if let Some(Value::Array(items)) = object.get("@graph") {
                    for item in items {
                        reader.node(item)?;
                    }
                } else {
                    reader.node(&document)?;
                }
            }
            _ => return Err(ParseError::JsonLd("expected an object or an array".to_string())),
        }
        Ok(reader.graph)
    }
}

fn push(node: &mut Map<String, Value>, key: &str, value: Value) {
    match node.entry(key.to_string()).or_insert_with(|| Value::Array(Vec::new())) {
        Value::Array(values) => values.push(value),
        other => *other = Value::Array(vec![other.take(), value]),
    }
}

fn literal_value(l: &Literal) -> Value {
    if let Some(language) = l.language() {
        json!({ "@value": l.value(), "@language": language })
    } else if l.datatype() == xsd::STRING {
        json!({ "@value": l.value() })
    } else {
        json!({ "@value": l.value(), "@type": l.datatype().as_str() })
    }
}

struct Reader {
    base: Iri<String>,
    graph: Graph,
}

impl Reader {
    /// Read a node object and return its subject
    fn node(&mut self, value: &Value) -> ParseResult<Subject> {
        let Value::Object(object) = value else {
            return Err(ParseError::JsonLd("expected a node object".to_string()));
        };
        if object.contains_key("@context") {
            return Err(ParseError::JsonLd(
                "@context is not supported, send expanded JSON-LD".to_string(),
            ));
        }

        let subject: Subject = match object.get("@id") {
            Some(Value::String(id)) => self.reference(id)?,
            Some(_) => return Err(ParseError::JsonLd("@id must be a string".to_string())),
            None => BlankNode::default().into(),
        };

        for (key, values) in object {
            if key == "@type" {
                for class in as_array(values) {
                    let Value::String(class) = class else {
                        return Err(ParseError::JsonLd("@type must be an IRI".to_string()));
                    };
                    let class = self.iri(class)?;
                    self.graph
                        .insert(Triple::new(subject.clone(), rdf::TYPE.into_owned(), class));
                }
                continue;
            }
            if key.starts_with('@') {
                continue;
            }
            let Ok(predicate) = NamedNode::new(key.as_str()) else {
                // Terms that are not absolute IRIs are dropped, as an expander would.
                continue;
            };
            for value in as_array(values) {
                let object = self.object(value)?;
                self.graph
                    .insert(Triple::new(subject.clone(), predicate.clone(), object));
            }
        }
        Ok(subject)
    }

    fn object(&mut self, value: &Value) -> ParseResult<Term> {
        match value {
            Value::String(s) => Ok(Literal::new_simple_literal(s.as_str()).into()),
            Value::Bool(b) => Ok(Literal::new_typed_literal(b.to_string(), xsd::BOOLEAN).into()),
            Value::Number(n) => {
                let datatype = if n.is_f64() { xsd::DOUBLE } else { xsd::INTEGER };
                Ok(Literal::new_typed_literal(n.to_string(), datatype).into())
            }
            Value::Object(object) => {
                if let Some(literal) = object.get("@value") {
                    return self.value_object(object, literal);
                }
                if object.len() == 1 {
                    if let Some(Value::String(id)) = object.get("@id") {
                        return Ok(self.reference(id)?.into());
                    }
                }
                Ok(match self.node(value)? {
                    Subject::NamedNode(n) => n.into(),
                    Subject::BlankNode(b) => b.into(),
                    #[allow(unreachable_patterns)]
                    _ => return Err(ParseError::JsonLd("unsupported node".to_string())),
                })
            }
            _ => Err(ParseError::JsonLd(format!("unsupported value: {}", value))),
        }
    }

    fn value_object(&self, object: &Map<String, Value>, literal: &Value) -> ParseResult<Term> {
        let lexical = match literal {
            Value::String(s) => s.clone(),
            Value::Bool(_) | Value::Number(_) => literal.to_string(),
            _ => return Err(ParseError::JsonLd("@value must be a scalar".to_string())),
        };
        if let Some(Value::String(language)) = object.get("@language") {
            return Literal::new_language_tagged_literal(lexical, language.as_str())
                .map(Term::from)
                .map_err(|e| ParseError::InvalidTerm(e.to_string()));
        }
        if let Some(Value::String(datatype)) = object.get("@type") {
            return Ok(Literal::new_typed_literal(lexical, self.iri(datatype)?).into());
        }
        Ok(Literal::new_simple_literal(lexical).into())
    }

    fn reference(&self, id: &str) -> ParseResult<Subject> {
        match id.strip_prefix("_:") {
            Some(label) => BlankNode::new(label)
                .map(Subject::from)
                .map_err(|e| ParseError::InvalidTerm(e.to_string())),
            None => Ok(self.iri(id)?.into()),
        }
    }

    fn iri(&self, iri: &str) -> ParseResult<NamedNode> {
        let resolved = self
            .base
            .resolve(iri)
            .map_err(|e| ParseError::InvalidTerm(e.to_string()))?;
        Ok(NamedNode::new_unchecked(resolved.into_inner()))
    }
}

fn as_array(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(values) => values.iter().collect(),
        other => vec![other],
    }
}
