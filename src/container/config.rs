//! Per-container configuration
//!
//! Membership settings are read from the container graph (falling back to
//! the config graph); paging and member-info settings from the config side
//! graph `<container>?_config`. Anything missing or malformed takes its
//! default, so a container without a config graph is still fully usable.

use crate::rdf::namespace::{cfg, ldp, rdfs, xsd};
use crate::rdf::Graph;
use crate::resource::config_uri;
use crate::store::{sanitize_slug, ReadTransaction};
use oxrdf::{Literal, NamedNode, NamedNodeRef, Term, Triple};

/// Container configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Predicate of membership triples
    pub membership_predicate: NamedNode,
    /// Subject of membership triples; `None` means the container itself
    pub membership_subject: Option<NamedNode>,
    /// For indirect containers, the property of a new member whose value is recorded
    pub inserted_content_relation: Option<NamedNode>,
    /// Members per page
    pub page_size: usize,
    /// Merge each member's own triples into container and page views
    pub member_info: bool,
    /// Restrict member info to these predicates; `None` includes all
    pub member_filter: Option<Vec<NamedNode>>,
    /// Page ordering, most significant first
    pub sort_predicates: Vec<NamedNode>,
    /// Prefix of counter-minted member names
    pub resource_uri_prefix: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            membership_predicate: rdfs::MEMBER.into_owned(),
            membership_subject: None,
            inserted_content_relation: None,
            page_size: Self::DEFAULT_PAGE_SIZE,
            member_info: false,
            member_filter: None,
            sort_predicates: Vec::new(),
            resource_uri_prefix: Self::DEFAULT_RESOURCE_PREFIX.to_string(),
        }
    }
}

impl ContainerConfig {
    pub const DEFAULT_PAGE_SIZE: usize = 100;
    pub const DEFAULT_RESOURCE_PREFIX: &'static str = "res";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_membership(mut self, predicate: NamedNode, subject: Option<NamedNode>) -> Self {
        self.membership_predicate = predicate;
        self.membership_subject = subject;
        self
    }

    pub fn with_inserted_content_relation(mut self, predicate: NamedNode) -> Self {
        self.inserted_content_relation = Some(predicate);
        self
    }

    pub fn with_member_info(mut self, filter: Option<Vec<NamedNode>>) -> Self {
        self.member_info = true;
        self.member_filter = filter;
        self
    }

    pub fn with_sort_predicates(mut self, predicates: Vec<NamedNode>) -> Self {
        self.sort_predicates = predicates;
        self
    }

    pub fn with_resource_uri_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.resource_uri_prefix = prefix.into();
        self
    }

    /// Load the configuration of `container`
    pub fn load<T: ReadTransaction + ?Sized>(tx: &T, container: &str, defaults: &Self) -> Self {
        let container_graph = tx.get_graph(container);
        let config_graph = tx.get_graph(&config_uri(container));
        Self::from_graphs(
            container,
            container_graph.as_ref(),
            config_graph.as_ref(),
            defaults,
        )
    }

    /// Build from the container graph and the config graph, either may be absent
    pub fn from_graphs(
        container: &str,
        container_graph: Option<&Graph>,
        config_graph: Option<&Graph>,
        defaults: &Self,
    ) -> Self {
        let subject = NamedNode::new_unchecked(container);
        let s = subject.as_ref();
        let empty = Graph::new();
        let container_graph = container_graph.unwrap_or(&empty);
        let config_graph = config_graph.unwrap_or(&empty);

        let membership_node = |predicates: &[NamedNodeRef<'_>]| {
            [container_graph, config_graph].into_iter().find_map(|graph| {
                predicates
                    .iter()
                    .find_map(|p| graph.object(s, *p).and_then(named_node))
            })
        };

        let mut config = defaults.clone();
        if let Some(predicate) =
            membership_node(&[ldp::HAS_MEMBER_RELATION, ldp::MEMBERSHIP_PREDICATE])
        {
            config.membership_predicate = predicate;
        }
        if let Some(subject) =
            membership_node(&[ldp::MEMBERSHIP_RESOURCE, ldp::MEMBERSHIP_SUBJECT])
        {
            config.membership_subject = Some(subject);
        }
        if let Some(relation) = membership_node(&[ldp::INSERTED_CONTENT_RELATION]) {
            config.inserted_content_relation = Some(relation);
        }

        if let Some(page_size) = config_graph
            .object(s, cfg::PAGE_SIZE)
            .and_then(literal_value)
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n >= 1)
        {
            config.page_size = page_size;
        }
        if let Some(member_info) = config_graph
            .object(s, cfg::MEMBER_INFO)
            .and_then(literal_value)
        {
            config.member_info = matches!(member_info.as_str(), "true" | "1");
        }
        let filter: Vec<NamedNode> = config_graph
            .objects(s, cfg::MEMBER_FILTER)
            .into_iter()
            .filter_map(named_node)
            .collect();
        if !filter.is_empty() {
            config.member_filter = Some(filter);
        }
        if let Some(head) = config_graph.object(s, cfg::PAGE_SORT_PREDICATES) {
            config.sort_predicates = config_graph
                .read_list(head)
                .iter()
                .filter_map(named_node)
                .collect();
        }
        if let Some(prefix) = config_graph
            .object(s, cfg::RESOURCE_URI_PREFIX)
            .and_then(literal_value)
            .and_then(|p| sanitize_slug(&p))
        {
            config.resource_uri_prefix = prefix;
        }
        config
    }

    /// The config side graph for `container`
    pub fn to_graph(&self, container: &str) -> Graph {
        let subject = NamedNode::new_unchecked(container);
        let mut graph = Graph::new();
        graph.insert(Triple::new(
            subject.clone(),
            cfg::PAGE_SIZE,
            Literal::new_typed_literal(self.page_size.to_string(), xsd::INTEGER),
        ));
        graph.insert(Triple::new(
            subject.clone(),
            cfg::MEMBER_INFO,
            Literal::new_typed_literal(self.member_info.to_string(), xsd::BOOLEAN),
        ));
        for predicate in self.member_filter.iter().flatten() {
            graph.insert(Triple::new(subject.clone(), cfg::MEMBER_FILTER, predicate.clone()));
        }
        if !self.sort_predicates.is_empty() {
            let head = graph.insert_list(self.sort_predicates.iter().cloned().map(Term::from));
            graph.insert(Triple::new(subject.clone(), cfg::PAGE_SORT_PREDICATES, head));
        }
        graph.insert(Triple::new(
            subject,
            cfg::RESOURCE_URI_PREFIX,
            Literal::new_simple_literal(&self.resource_uri_prefix),
        ));
        graph
    }

    /// Membership declarations that belong in the container graph
    pub fn membership_triples(&self, container: &str) -> Vec<Triple> {
        let subject = NamedNode::new_unchecked(container);
        let mut triples = vec![
            Triple::new(
                subject.clone(),
                ldp::HAS_MEMBER_RELATION,
                self.membership_predicate.clone(),
            ),
            Triple::new(
                subject.clone(),
                ldp::MEMBERSHIP_RESOURCE,
                self.membership_subject.clone().unwrap_or_else(|| subject.clone()),
            ),
        ];
        if let Some(relation) = &self.inserted_content_relation {
            triples.push(Triple::new(
                subject,
                ldp::INSERTED_CONTENT_RELATION,
                relation.clone(),
            ));
        }
        triples
    }
}

fn named_node(term: &Term) -> Option<NamedNode> {
    match term {
        Term::NamedNode(n) => Some(n.clone()),
        _ => None,
    }
}

fn literal_value(term: &Term) -> Option<String> {
    match term {
        Term::Literal(l) => Some(l.value().trim().to_string()),
        _ => None,
    }
}
