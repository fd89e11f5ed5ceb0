//! Membership and containment bookkeeping
//!
//! Containment `(container, ldp:contains, resource)` always lives in the
//! container graph. Membership `(subject, predicate, member)` lives in the
//! membership subject's graph when the subject is a separate resource that
//! exists, and in the container graph otherwise.

use super::ContainerConfig;
use crate::error::{LdpError, LdpResult};
use crate::rdf::namespace::ldp;
use crate::rdf::Graph;
use crate::resource::ResourceEngine;
use crate::store::{ReadTransaction, WriteTransaction};
use oxrdf::{NamedNode, Subject, Term, Triple};
use tracing::{debug, warn};

/// Resolved membership settings of one container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub container: NamedNode,
    pub subject: NamedNode,
    pub predicate: NamedNode,
    /// Graph holding the membership triples
    pub graph: String,
    pub inserted_content_relation: Option<NamedNode>,
}

impl Membership {
    /// Resolve against the current store contents
    pub fn resolve<T: ReadTransaction + ?Sized>(
        tx: &T,
        container: &str,
        config: &ContainerConfig,
    ) -> Self {
        let container = NamedNode::new_unchecked(container);
        let subject = config
            .membership_subject
            .clone()
            .unwrap_or_else(|| container.clone());
        let graph = if subject != container && tx.contains_graph(subject.as_str()) {
            subject.as_str().to_string()
        } else {
            if subject != container {
                warn!(
                    "Membership subject {} of {} has no graph, storing membership in the container",
                    subject, container
                );
            }
            container.as_str().to_string()
        };
        Self {
            predicate: config.membership_predicate.clone(),
            inserted_content_relation: config.inserted_content_relation.clone(),
            container,
            subject,
            graph,
        }
    }

    /// Check if membership triples are kept in the container graph
    pub fn in_container_graph(&self) -> bool {
        self.graph == self.container.as_str()
    }

    /// The membership triple for `member`
    pub fn triple(&self, member: Term) -> Triple {
        Triple::new(self.subject.clone(), self.predicate.clone(), member)
    }

    /// The term recorded as member when `resource` is created with `content`
    ///
    /// Indirect containers record the value of the inserted content relation
    /// when the content has one.
    pub fn member_for(&self, resource: &NamedNode, content: &Graph) -> Term {
        self.inserted_content_relation
            .as_ref()
            .and_then(|relation| content.object(resource.as_ref(), relation.as_ref()))
            .cloned()
            .unwrap_or_else(|| resource.clone().into())
    }

    /// CONSTRUCT query listing the membership triples
    pub fn construct_query(&self) -> String {
        format!(
            "CONSTRUCT {{ <{s}> <{p}> ?member }} WHERE {{ GRAPH <{g}> {{ <{s}> <{p}> ?member }} }}",
            s = self.subject.as_str(),
            p = self.predicate.as_str(),
            g = self.graph,
        )
    }

    /// SELECT query for one page of members
    ///
    /// Sort values come from each member's own graph through `OPTIONAL`, so
    /// members without a value are still listed. The member itself is the
    /// last sort key, which keeps `OFFSET`/`LIMIT` batches disjoint.
    pub fn page_query(&self, sort_predicates: &[NamedNode], offset: usize, limit: usize) -> String {
        let mut query = format!(
            "SELECT DISTINCT ?member WHERE {{ GRAPH <{g}> {{ <{s}> <{p}> ?member }}",
            s = self.subject.as_str(),
            p = self.predicate.as_str(),
            g = self.graph,
        );
        for (i, predicate) in sort_predicates.iter().enumerate() {
            query.push_str(&format!(
                " OPTIONAL {{ GRAPH ?member {{ ?member <{}> ?sort{} }} }}",
                predicate.as_str(),
                i
            ));
        }
        query.push_str(" } ORDER BY");
        for i in 0..sort_predicates.len() {
            query.push_str(&format!(" ?sort{}", i));
        }
        query.push_str(&format!(" ?member OFFSET {} LIMIT {}", offset, limit));
        query
    }

    /// Remove membership and containment triples from a container graph
    pub fn non_member_view(&self, container_graph: &Graph) -> Graph {
        let mut view = container_graph.clone();
        view.remove_all(self.container.as_ref(), ldp::CONTAINS);
        if self.in_container_graph() {
            view.remove_all(self.subject.as_ref(), self.predicate.as_ref());
        }
        view
    }
}

/// Record `resource` in its container
///
/// Writes containment into the container graph and `member` into the
/// membership graph, refreshing `modified` on both.
pub fn link<T: WriteTransaction + ?Sized>(
    tx: &mut T,
    resources: &ResourceEngine,
    membership: &Membership,
    resource: &NamedNode,
    member: Term,
) -> LdpResult<()> {
    update(tx, resources, membership, resource, member, true)?;
    debug!("Linked {} into {}", resource, membership.container);
    Ok(())
}

/// Remove `resource` from its container
pub fn unlink<T: WriteTransaction + ?Sized>(
    tx: &mut T,
    resources: &ResourceEngine,
    membership: &Membership,
    resource: &NamedNode,
    member: Term,
) -> LdpResult<()> {
    update(tx, resources, membership, resource, member, false)?;
    debug!("Unlinked {} from {}", resource, membership.container);
    Ok(())
}

fn update<T: WriteTransaction + ?Sized>(
    tx: &mut T,
    resources: &ResourceEngine,
    membership: &Membership,
    resource: &NamedNode,
    member: Term,
    add: bool,
) -> LdpResult<()> {
    let apply = |graph: &mut Graph, triple: Triple| {
        if add {
            graph.insert(triple);
        } else {
            graph.remove(&triple);
        }
    };
    let container_uri = membership.container.as_str();
    let mut container_graph = tx
        .get_graph(container_uri)
        .ok_or_else(|| LdpError::not_found(container_uri))?;

    apply(
        &mut container_graph,
        Triple::new(membership.container.clone(), ldp::CONTAINS, resource.clone()),
    );
    if membership.in_container_graph() {
        apply(&mut container_graph, membership.triple(member));
    } else {
        let mut membership_graph = tx.get_graph(&membership.graph).unwrap_or_default();
        apply(&mut membership_graph, membership.triple(member));
        resources.touch(&mut membership_graph, &membership.subject)?;
        tx.put_graph(&membership.graph, membership_graph)?;
    }
    resources.touch(&mut container_graph, &membership.container)?;
    tx.put_graph(container_uri, container_graph)?;
    Ok(())
}

/// Swap the membership triple of a member whose recorded term changed
///
/// Containment is left alone; only the membership graph is rewritten.
pub fn rebind<T: WriteTransaction + ?Sized>(
    tx: &mut T,
    resources: &ResourceEngine,
    membership: &Membership,
    old: Term,
    new: Term,
) -> LdpResult<()> {
    if old == new {
        return Ok(());
    }
    let mut graph = tx.get_graph(&membership.graph).unwrap_or_default();
    graph.remove(&membership.triple(old));
    graph.insert(membership.triple(new));
    resources.touch(&mut graph, &membership.subject)?;
    tx.put_graph(&membership.graph, graph)?;
    debug!("Rebound a member of {}", membership.container);
    Ok(())
}

/// Containers other than `uri` that name it as their membership subject
pub fn hosted_by<T: ReadTransaction + ?Sized>(tx: &T, uri: &str) -> LdpResult<Vec<String>> {
    let query = format!(
        "SELECT DISTINCT ?c WHERE {{ GRAPH ?c {{ {{ ?c <{r}> <{u}> }} UNION {{ ?c <{s}> <{u}> }} }} FILTER(?c != <{u}>) }}",
        r = ldp::MEMBERSHIP_RESOURCE.as_str(),
        s = ldp::MEMBERSHIP_SUBJECT.as_str(),
        u = uri
    );
    Ok(tx
        .select(&query)?
        .into_iter()
        .filter_map(|solution| match solution.get("c") {
            Some(Term::NamedNode(c)) => Some(c.as_str().to_string()),
            _ => None,
        })
        .collect())
}

/// The container whose graph holds `(container, ldp:contains, uri)`
pub fn find_owner<T: ReadTransaction + ?Sized>(tx: &T, uri: &str) -> LdpResult<Option<String>> {
    let query = format!(
        "SELECT ?c WHERE {{ GRAPH ?c {{ ?c <{}> <{}> }} }} LIMIT 1",
        ldp::CONTAINS.as_str(),
        uri
    );
    Ok(tx
        .select(&query)?
        .into_iter()
        .find_map(|solution| match solution.get("c") {
            Some(Term::NamedNode(c)) => Some(c.as_str().to_string()),
            _ => None,
        }))
}

/// Each member's own triples (subject = member), optionally filtered by predicate
pub fn expand_members<'m, T: ReadTransaction + ?Sized>(
    tx: &T,
    members: impl IntoIterator<Item = &'m Term>,
    filter: Option<&[NamedNode]>,
) -> Graph {
    let mut info = Graph::new();
    for member in members {
        let Term::NamedNode(member) = member else {
            continue;
        };
        let Some(graph) = tx.get_graph(member.as_str()) else {
            continue;
        };
        info.extend(graph.into_iter().filter(|t| {
            matches!(&t.subject, Subject::NamedNode(s) if s == member)
                && filter.map_or(true, |f| f.contains(&t.predicate))
        }));
    }
    info
}
