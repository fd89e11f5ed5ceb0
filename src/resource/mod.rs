//! Resources and the interface every resource variant implements
//!
//! A resource is a URI, a graph (or, for binaries, a side graph plus file
//! content), a [`ResourceKind`] tag and Dublin Core metadata. Per-kind
//! behaviour lives behind [`ResourceHandler`].

mod metadata;
mod uri;

pub use metadata::{content_hash, ResourceEngine};
pub use uri::{config_uri, first_page_uri, page_uri, ResourceUri, Suffix};

use crate::error::{LdpError, LdpResult};
use crate::rdf::namespace::{dcterms, ldp, rdf};
use crate::rdf::Graph;
use oxrdf::{NamedNodeRef, Term};

/// Interaction model of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    RdfSource,
    BasicContainer,
    DirectContainer,
    IndirectContainer,
    NonRdfSource,
    Page,
}

impl ResourceKind {
    /// Check if members can be posted to this kind
    pub fn is_container(self) -> bool {
        matches!(
            self,
            ResourceKind::BasicContainer
                | ResourceKind::DirectContainer
                | ResourceKind::IndirectContainer
        )
    }

    /// The `ldp:` class of this kind
    pub fn type_iri(self) -> NamedNodeRef<'static> {
        match self {
            ResourceKind::RdfSource => ldp::RDF_SOURCE,
            ResourceKind::BasicContainer => ldp::BASIC_CONTAINER,
            ResourceKind::DirectContainer => ldp::DIRECT_CONTAINER,
            ResourceKind::IndirectContainer => ldp::INDIRECT_CONTAINER,
            ResourceKind::NonRdfSource => ldp::NON_RDF_SOURCE,
            ResourceKind::Page => ldp::PAGE,
        }
    }

    /// Value for a `Link: <...>; rel="type"` header
    pub fn link_type(self) -> &'static str {
        self.type_iri().as_str()
    }

    /// Kind declared by the `rdf:type` triples of `subject` in `graph`
    ///
    /// The most specific container class wins; a plain `ldp:Container` is a
    /// basic container and anything else an RDF source.
    pub fn from_graph(subject: NamedNodeRef<'_>, graph: &Graph) -> Self {
        let types = graph.objects(subject, rdf::TYPE);
        let declares = |class: NamedNodeRef<'_>| {
            types
                .iter()
                .any(|t| matches!(t, Term::NamedNode(n) if n.as_ref() == class))
        };
        if declares(ldp::INDIRECT_CONTAINER) {
            ResourceKind::IndirectContainer
        } else if declares(ldp::DIRECT_CONTAINER) {
            ResourceKind::DirectContainer
        } else if declares(ldp::BASIC_CONTAINER) || declares(ldp::CONTAINER) {
            ResourceKind::BasicContainer
        } else if declares(ldp::PAGE) {
            ResourceKind::Page
        } else if declares(ldp::NON_RDF_SOURCE) {
            ResourceKind::NonRdfSource
        } else {
            ResourceKind::RdfSource
        }
    }
}

/// Dublin Core metadata of a resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub creator: Option<Term>,
    pub contributor: Option<Term>,
    /// Lexical `xsd:dateTime`
    pub created: Option<String>,
    /// Lexical `xsd:dateTime`, also the ETag of RDF resources
    pub modified: Option<String>,
}

impl Metadata {
    /// Read the metadata of `subject` from `graph`
    pub fn from_graph(subject: NamedNodeRef<'_>, graph: &Graph) -> Self {
        let lexical = |term: Option<&Term>| match term {
            Some(Term::Literal(l)) => Some(l.value().to_string()),
            _ => None,
        };
        Self {
            creator: graph.object(subject, dcterms::CREATOR).cloned(),
            contributor: graph.object(subject, dcterms::CONTRIBUTOR).cloned(),
            created: lexical(graph.object(subject, dcterms::CREATED)),
            modified: lexical(graph.object(subject, dcterms::MODIFIED)),
        }
    }
}

/// What a URI resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub uri: String,
    pub kind: ResourceKind,
    pub metadata: Metadata,
}

/// A serialized resource, ready for a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representation {
    pub body: Vec<u8>,
    pub etag: String,
    pub content_type: String,
    pub kind: ResourceKind,
}

/// Content and headers of a POST, PUT or PATCH
#[derive(Debug, Clone, Copy)]
pub struct WriteRequest<'a> {
    pub content: &'a [u8],
    pub content_type: &'a str,
    pub user: &'a str,
    /// Suggested name for a new member
    pub slug: Option<&'a str>,
    /// Raw `If-Match` header value
    pub if_match: Option<&'a str>,
}

impl<'a> WriteRequest<'a> {
    pub fn new(content: &'a [u8], content_type: &'a str, user: &'a str) -> Self {
        Self {
            content,
            content_type,
            user,
            slug: None,
            if_match: None,
        }
    }

    pub fn with_slug(mut self, slug: &'a str) -> Self {
        self.slug = Some(slug);
        self
    }

    pub fn with_if_match(mut self, if_match: &'a str) -> Self {
        self.if_match = Some(if_match);
        self
    }
}

/// Operations every resource variant answers
pub trait ResourceHandler: Send + Sync {
    /// Serialize the resource (or one of its suffix views) for `accept`
    fn get(&self, uri: &ResourceUri, accept: &str) -> LdpResult<Representation>;

    /// Create a member of `container`; returns the new URI
    fn post(&self, container: &str, _request: &WriteRequest<'_>) -> LdpResult<String> {
        Err(LdpError::MethodNotAllowed(format!("POST to {}", container)))
    }

    /// Replace the resource; returns the new ETag
    fn put(&self, uri: &str, request: &WriteRequest<'_>) -> LdpResult<String>;

    /// Update the resource; returns the new ETag
    fn patch(&self, uri: &str, _request: &WriteRequest<'_>) -> LdpResult<String> {
        Err(LdpError::MethodNotAllowed(format!("PATCH on {}", uri)))
    }

    /// Remove the resource
    fn delete(&self, uri: &str) -> LdpResult<()>;
}

/// Check an `If-Match` header value against the current ETag
///
/// Accepts `*`, weak validators and comma-separated lists.
pub fn etag_matches(if_match: &str, current: &str) -> bool {
    if_match.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == current
    })
}

fn normalize_etag(value: &str) -> &str {
    let value = value.trim();
    let value = value.strip_prefix("W/").unwrap_or(value);
    value.trim_matches('"')
}

/// Fail unless `if_match` is absent or matches `current`
pub(crate) fn check_if_match(uri: &str, if_match: Option<&str>, current: &str) -> LdpResult<()> {
    match if_match {
        Some(expected) if !etag_matches(expected, current) => {
            tracing::warn!("Precondition failed for {}: {} != {}", uri, expected, current);
            Err(LdpError::PreconditionFailed {
                uri: uri.to_string(),
                expected: expected.to_string(),
                current: current.to_string(),
            })
        }
        _ => Ok(()),
    }
}
