//! Conversions between rio's borrowed model and oxrdf terms

use super::ParseError;
use crate::rdf::Graph;
use oxrdf::vocab::xsd;
use oxrdf::{BlankNode, Literal, NamedNode, Subject, Term, Triple};
use rio_api::formatter::TriplesFormatter;
use rio_api::model as rio;

/// Turn a parsed rio triple into an owned oxrdf triple
pub(super) fn convert_triple(triple: rio::Triple<'_>) -> Result<Triple, ParseError> {
    Ok(Triple::new(
        convert_subject(triple.subject)?,
        convert_named_node(triple.predicate)?,
        convert_object(triple.object)?,
    ))
}

fn convert_named_node(node: rio::NamedNode<'_>) -> Result<NamedNode, ParseError> {
    NamedNode::new(node.iri).map_err(|e| ParseError::InvalidTerm(e.to_string()))
}

fn convert_blank_node(node: rio::BlankNode<'_>) -> Result<BlankNode, ParseError> {
    BlankNode::new(node.id).map_err(|e| ParseError::InvalidTerm(e.to_string()))
}

fn convert_subject(subject: rio::Subject<'_>) -> Result<Subject, ParseError> {
    match subject {
        rio::Subject::NamedNode(n) => Ok(convert_named_node(n)?.into()),
        rio::Subject::BlankNode(b) => Ok(convert_blank_node(b)?.into()),
        _ => Err(ParseError::InvalidTerm("quoted triples are not supported".to_string())),
    }
}

fn convert_object(object: rio::Term<'_>) -> Result<Term, ParseError> {
    match object {
        rio::Term::NamedNode(n) => Ok(convert_named_node(n)?.into()),
        rio::Term::BlankNode(b) => Ok(convert_blank_node(b)?.into()),
        rio::Term::Literal(rio::Literal::Simple { value }) => {
            Ok(Literal::new_simple_literal(value).into())
        }
        rio::Term::Literal(rio::Literal::LanguageTaggedString { value, language }) => {
            Literal::new_language_tagged_literal(value, language)
                .map(Term::from)
                .map_err(|e| ParseError::InvalidTerm(e.to_string()))
        }
        rio::Term::Literal(rio::Literal::Typed { value, datatype }) => {
            Ok(Literal::new_typed_literal(value, convert_named_node(datatype)?).into())
        }
        _ => Err(ParseError::InvalidTerm("quoted triples are not supported".to_string())),
    }
}

/// Feed every triple of `graph` to a rio formatter
pub(super) fn format_graph<F: TriplesFormatter>(
    formatter: &mut F,
    graph: &Graph,
) -> Result<(), F::Error> {
    for triple in graph.iter() {
        let subject = match &triple.subject {
            Subject::NamedNode(n) => rio::Subject::NamedNode(rio::NamedNode { iri: n.as_str() }),
            Subject::BlankNode(b) => rio::Subject::BlankNode(rio::BlankNode { id: b.as_str() }),
            #[allow(unreachable_patterns)]
            _ => continue,
        };
        let object = match &triple.object {
            Term::NamedNode(n) => rio::Term::NamedNode(rio::NamedNode { iri: n.as_str() }),
            Term::BlankNode(b) => rio::Term::BlankNode(rio::BlankNode { id: b.as_str() }),
            Term::Literal(l) => rio::Term::Literal(literal(l)),
            #[allow(unreachable_patterns)]
            _ => continue,
        };
        formatter.format(&rio::Triple {
            subject,
            predicate: rio::NamedNode {
                iri: triple.predicate.as_str(),
            },
            object,
        })?;
    }
    Ok(())
}

fn literal(l: &Literal) -> rio::Literal<'_> {
    if let Some(language) = l.language() {
        rio::Literal::LanguageTaggedString {
            value: l.value(),
            language,
        }
    } else if l.datatype() == xsd::STRING {
        rio::Literal::Simple { value: l.value() }
    } else {
        rio::Literal::Typed {
            value: l.value(),
            datatype: rio::NamedNode {
                iri: l.datatype().as_str(),
            },
        }
    }
}
