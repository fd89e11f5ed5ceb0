//! Metadata stamping, validators and RDF parse/serialize dispatch

use crate::error::{LdpError, LdpResult};
use crate::rdf::namespace::{dcterms, xsd};
use crate::rdf::{Graph, RdfFormat, Serializer};
use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use oxrdf::{Literal, NamedNode, Term};
use sha2::{Digest, Sha256};
use std::sync::{Arc, Mutex};

/// Shared services for every resource engine
///
/// Timestamps come from a monotonic clock with microsecond resolution, so
/// two updates of the same resource never produce the same ETag.
pub struct ResourceEngine {
    serializer: Arc<dyn Serializer>,
    clock: Mutex<DateTime<Utc>>,
}

impl ResourceEngine {
    pub fn new(serializer: Arc<dyn Serializer>) -> Self {
        Self {
            serializer,
            clock: Mutex::new(DateTime::<Utc>::MIN_UTC),
        }
    }

    /// Current time as an `xsd:dateTime` literal, strictly after the previous call
    pub fn now(&self) -> LdpResult<Literal> {
        let mut last = self.clock.lock()?;
        let mut now = Utc::now().trunc_subsecs(6);
        if now <= *last {
            now = *last + Duration::microseconds(1);
        }
        *last = now;
        Ok(Literal::new_typed_literal(
            now.to_rfc3339_opts(SecondsFormat::Micros, true),
            xsd::DATE_TIME,
        ))
    }

    /// An IRI user becomes a node, anything else a plain literal
    pub fn user_term(user: &str) -> Term {
        match NamedNode::new(user) {
            Ok(node) if user.contains(':') => node.into(),
            _ => Literal::new_simple_literal(user).into(),
        }
    }

    /// Add creator, contributor, created and modified where absent
    pub fn stamp_created(&self, graph: &mut Graph, subject: &NamedNode, user: &str) -> LdpResult<()> {
        let now = self.now()?;
        let user = Self::user_term(user);
        for (predicate, value) in [
            (dcterms::CREATOR, user.clone()),
            (dcterms::CONTRIBUTOR, user),
            (dcterms::CREATED, now.clone().into()),
            (dcterms::MODIFIED, now.into()),
        ] {
            if graph.object(subject.as_ref(), predicate).is_none() {
                graph.set(subject.as_ref(), predicate, value);
            }
        }
        Ok(())
    }

    /// Refresh modified and contributor
    pub fn stamp_modified(&self, graph: &mut Graph, subject: &NamedNode, user: &str) -> LdpResult<()> {
        graph.set(subject.as_ref(), dcterms::MODIFIED, self.now()?);
        graph.set(subject.as_ref(), dcterms::CONTRIBUTOR, Self::user_term(user));
        Ok(())
    }

    /// Refresh modified only
    pub fn touch(&self, graph: &mut Graph, subject: &NamedNode) -> LdpResult<()> {
        graph.set(subject.as_ref(), dcterms::MODIFIED, self.now()?);
        Ok(())
    }

    /// Copy creator and created from `old` when `new` lacks them
    pub fn carry_over(old: &Graph, new: &mut Graph, subject: &NamedNode) {
        for predicate in [dcterms::CREATOR, dcterms::CREATED] {
            if new.object(subject.as_ref(), predicate).is_some() {
                continue;
            }
            if let Some(value) = old.object(subject.as_ref(), predicate) {
                new.set(subject.as_ref(), predicate, value.clone());
            }
        }
    }

    /// Current ETag of a stored graph, before serialization
    pub fn current_etag(graph: &Graph, subject: &NamedNode) -> String {
        match graph.object(subject.as_ref(), dcterms::MODIFIED) {
            Some(Term::Literal(modified)) => modified.value().to_string(),
            _ => String::new(),
        }
    }

    /// Check if `content_type` is an RDF syntax
    pub fn is_rdf(content_type: &str) -> bool {
        RdfFormat::from_media_type(content_type).is_some()
    }

    /// Parse request content, resolving relative IRIs against `base`
    pub fn parse(&self, content: &[u8], content_type: &str, base: &str) -> LdpResult<Graph> {
        Ok(self.serializer.parse(content, content_type, base)?)
    }

    /// Serialize for an `Accept` value; returns body and media type
    pub fn serialize(&self, graph: &Graph, accept: &str) -> LdpResult<(Vec<u8>, &'static str)> {
        let format = RdfFormat::negotiate(accept)
            .ok_or_else(|| LdpError::UnsupportedMediaType(accept.to_string()))?;
        Ok((self.serializer.serialize(graph, format)?, format.media_type()))
    }

    /// Serialize in a fixed format
    pub fn serialize_as(&self, graph: &Graph, format: RdfFormat) -> LdpResult<Vec<u8>> {
        Ok(self.serializer.serialize(graph, format)?)
    }
}

/// Lowercase hex SHA-256 of `content`
pub fn content_hash(content: &[u8]) -> String {
    format!("{:x}", Sha256::digest(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::RdfCodec;

    fn engine() -> ResourceEngine {
        ResourceEngine::new(Arc::new(RdfCodec::new(None)))
    }

    fn subject() -> NamedNode {
        NamedNode::new("http://example.org/r").unwrap()
    }

    #[test]
    fn test_clock_is_strictly_monotonic() {
        let engine = engine();
        let mut previous = String::new();
        for _ in 0..50 {
            let now = engine.now().unwrap().value().to_string();
            assert!(now > previous);
            previous = now;
        }
    }

    #[test]
    fn test_stamp_created_keeps_existing() {
        let engine = engine();
        let s = subject();
        let mut graph = Graph::new();
        graph.set(s.as_ref(), dcterms::CREATOR, Literal::new_simple_literal("original"));

        engine.stamp_created(&mut graph, &s, "alice").unwrap();
        assert_eq!(
            graph.object(s.as_ref(), dcterms::CREATOR),
            Some(&Term::from(Literal::new_simple_literal("original")))
        );
        assert_eq!(
            graph.object(s.as_ref(), dcterms::CONTRIBUTOR),
            Some(&Term::from(Literal::new_simple_literal("alice")))
        );
        assert!(graph.object(s.as_ref(), dcterms::CREATED).is_some());
    }

    #[test]
    fn test_stamp_modified_changes_etag() {
        let engine = engine();
        let s = subject();
        let mut graph = Graph::new();
        engine.stamp_created(&mut graph, &s, "alice").unwrap();
        let before = ResourceEngine::current_etag(&graph, &s);

        engine
            .stamp_modified(&mut graph, &s, "http://example.org/bob")
            .unwrap();
        assert_ne!(ResourceEngine::current_etag(&graph, &s), before);
        assert_eq!(
            graph.object(s.as_ref(), dcterms::CONTRIBUTOR),
            Some(&Term::from(NamedNode::new("http://example.org/bob").unwrap()))
        );
        assert_eq!(graph.objects(s.as_ref(), dcterms::MODIFIED).len(), 1);
    }

    #[test]
    fn test_carry_over() {
        let engine = engine();
        let s = subject();
        let mut old = Graph::new();
        engine.stamp_created(&mut old, &s, "alice").unwrap();
        let mut new = Graph::new();
        ResourceEngine::carry_over(&old, &mut new, &s);
        assert_eq!(
            new.object(s.as_ref(), dcterms::CREATED),
            old.object(s.as_ref(), dcterms::CREATED)
        );
        assert!(new.object(s.as_ref(), dcterms::MODIFIED).is_none());
    }

    #[test]
    fn test_etag_empty_without_modified() {
        assert_eq!(ResourceEngine::current_etag(&Graph::new(), &subject()), "");
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_serialize_negotiation() {
        let engine = engine();
        let (_, media_type) = engine.serialize(&Graph::new(), "application/rdf+xml").unwrap();
        assert_eq!(media_type, "application/rdf+xml");
        let result = engine.serialize(&Graph::new(), "image/png");
        assert!(matches!(result, Err(LdpError::UnsupportedMediaType(_))));
    }
}
