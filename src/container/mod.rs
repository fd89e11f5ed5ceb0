//! Containers and RDF sources
//!
//! [`ContainerEngine`] answers requests on containers, on their RDF
//! members and on container pages. Every write runs inside one store write
//! transaction; the affected containers are marked dirty after it ends.

mod config;
mod membership;

pub use config::ContainerConfig;
pub use membership::{expand_members, find_owner, hosted_by, link, rebind, unlink, Membership};

use crate::error::{LdpError, LdpResult};
use crate::nonrdf::NonRdfSourceEngine;
use crate::page::{destroy_chain, PageEngine};
use crate::rdf::namespace::{ldp, rdf};
use crate::rdf::Graph;
use crate::resource::{
    check_if_match, config_uri, content_hash, Representation, ResourceEngine, ResourceHandler,
    ResourceKind, ResourceUri, Suffix, WriteRequest,
};
use crate::store::{GraphStore, ReadTransaction, WriteTransaction};
use oxrdf::{NamedNode, Term, Triple};
use std::sync::Arc;
use tracing::{debug, info};

/// Engine for containers, RDF sources and pages
pub struct ContainerEngine {
    store: Arc<dyn GraphStore>,
    resources: Arc<ResourceEngine>,
    pages: Arc<PageEngine>,
    binaries: Arc<NonRdfSourceEngine>,
    defaults: ContainerConfig,
}

impl ContainerEngine {
    pub fn new(
        store: Arc<dyn GraphStore>,
        resources: Arc<ResourceEngine>,
        pages: Arc<PageEngine>,
        binaries: Arc<NonRdfSourceEngine>,
        defaults: ContainerConfig,
    ) -> Self {
        Self {
            store,
            resources,
            pages,
            binaries,
            defaults,
        }
    }

    /// Create an empty container with its config graph
    pub fn create_container(
        &self,
        uri: &str,
        kind: ResourceKind,
        config: &ContainerConfig,
        user: &str,
    ) -> LdpResult<()> {
        if !kind.is_container() {
            return Err(LdpError::BadRequest(format!("{:?} is not a container kind", kind)));
        }
        let node = NamedNode::new(uri)?;
        let mut tx = self.store.begin_write()?;
        if tx.contains_graph(uri) {
            return Err(LdpError::Conflict(format!("{} already exists", uri)));
        }

        let mut graph = Graph::new();
        graph.insert(Triple::new(node.clone(), rdf::TYPE, kind.type_iri().into_owned()));
        graph.extend(config.membership_triples(uri));
        self.resources.stamp_created(&mut graph, &node, user)?;
        tx.put_graph(uri, graph)?;
        tx.put_graph(&config_uri(uri), config.to_graph(uri))?;
        drop(tx);

        self.pages.mark_dirty(uri)?;
        info!("Created {:?} {}", kind, uri);
        Ok(())
    }

    /// Container graph plus its membership listing and member info
    fn container_view<T: ReadTransaction + ?Sized>(
        &self,
        tx: &T,
        uri: &str,
        mut graph: Graph,
    ) -> LdpResult<Graph> {
        let config = ContainerConfig::load(tx, uri, &self.defaults);
        let membership = Membership::resolve(tx, uri, &config);
        let listing = tx.construct(&membership.construct_query())?;
        graph.merge(&listing);

        if config.member_info {
            let members: Vec<&Term> = listing.iter().map(|t| &t.object).collect();
            let info = expand_members(tx, members, config.member_filter.as_deref());
            graph.merge(&info);
        }
        Ok(graph)
    }

    fn render(
        &self,
        graph: &Graph,
        etag: String,
        accept: &str,
        kind: ResourceKind,
    ) -> LdpResult<Representation> {
        let (body, content_type) = self.resources.serialize(graph, accept)?;
        let etag = if etag.is_empty() {
            content_hash(&body)
        } else {
            etag
        };
        Ok(Representation {
            body,
            etag,
            content_type: content_type.to_string(),
            kind,
        })
    }

    /// Keep containment, membership and interaction model of a replaced container
    fn keep_server_managed<T: ReadTransaction + ?Sized>(
        &self,
        tx: &T,
        node: &NamedNode,
        kind: ResourceKind,
        old: &Graph,
        new: &mut Graph,
    ) {
        let uri = node.as_str();
        let config_graph = tx.get_graph(&config_uri(uri));
        let config =
            ContainerConfig::from_graphs(uri, Some(old), config_graph.as_ref(), &self.defaults);
        let membership = Membership::resolve(tx, uri, &config);

        new.remove_all(node.as_ref(), ldp::CONTAINS);
        new.extend(old.triples_for(node.as_ref(), ldp::CONTAINS).cloned());
        if membership.in_container_graph() {
            new.remove_all(membership.subject.as_ref(), membership.predicate.as_ref());
            new.extend(
                old.triples_for(membership.subject.as_ref(), membership.predicate.as_ref())
                    .cloned(),
            );
        }
        for predicate in [
            ldp::HAS_MEMBER_RELATION,
            ldp::MEMBERSHIP_RESOURCE,
            ldp::MEMBERSHIP_PREDICATE,
            ldp::MEMBERSHIP_SUBJECT,
            ldp::INSERTED_CONTENT_RELATION,
        ] {
            if new.object(node.as_ref(), predicate).is_none() {
                new.extend(old.triples_for(node.as_ref(), predicate).cloned());
            }
        }
        if ResourceKind::from_graph(node.as_ref(), new) != kind {
            new.insert(Triple::new(node.clone(), rdf::TYPE, kind.type_iri().into_owned()));
        }
    }

    /// Keep an indirect member's membership triple in step with its content
    fn follow_member_term<T: WriteTransaction + ?Sized>(
        &self,
        tx: &mut T,
        node: &NamedNode,
        old: &Graph,
        new: &Graph,
    ) -> LdpResult<()> {
        let Some(owner) = find_owner(&*tx, node.as_str())? else {
            return Ok(());
        };
        let config = ContainerConfig::load(&*tx, &owner, &self.defaults);
        let membership = Membership::resolve(&*tx, &owner, &config);
        if membership.inserted_content_relation.is_none() {
            return Ok(());
        }
        let before = membership.member_for(node, old);
        let after = membership.member_for(node, new);
        rebind(tx, &self.resources, &membership, before, after)
    }

    /// Carry the membership triples other containers keep in `uri` into `graph`
    ///
    /// Returns those containers. When `uri` is being created, their triples
    /// move over from the container graphs that held them so far.
    fn adopt_membership<T: WriteTransaction + ?Sized>(
        &self,
        tx: &mut T,
        uri: &str,
        old: Option<&Graph>,
        graph: &mut Graph,
    ) -> LdpResult<Vec<String>> {
        let hosted = hosted_by(&*tx, uri)?;
        for container in &hosted {
            let config = ContainerConfig::load(&*tx, container, &self.defaults);
            let membership = Membership::resolve(&*tx, container, &config);
            let subject = membership.subject.as_ref();
            let predicate = membership.predicate.as_ref();
            graph.remove_all(subject, predicate);
            match old {
                Some(old) => graph.extend(old.triples_for(subject, predicate).cloned()),
                None => {
                    let Some(mut container_graph) = tx.get_graph(container) else {
                        continue;
                    };
                    graph.extend(container_graph.triples_for(subject, predicate).cloned());
                    container_graph.remove_all(subject, predicate);
                    tx.put_graph(container, container_graph)?;
                }
            }
            debug!("Kept membership of {} in {}", container, uri);
        }
        Ok(hosted)
    }

    /// Move the membership triples kept in `uri` back to their containers
    fn release_membership<T: WriteTransaction + ?Sized>(
        &self,
        tx: &mut T,
        uri: &str,
    ) -> LdpResult<Vec<String>> {
        let hosted = hosted_by(&*tx, uri)?;
        let Some(graph) = tx.get_graph(uri) else {
            return Ok(hosted);
        };
        for container in &hosted {
            let config = ContainerConfig::load(&*tx, container, &self.defaults);
            let membership = Membership::resolve(&*tx, container, &config);
            if membership.in_container_graph() {
                continue;
            }
            let Some(mut container_graph) = tx.get_graph(container) else {
                continue;
            };
            container_graph.extend(
                graph
                    .triples_for(membership.subject.as_ref(), membership.predicate.as_ref())
                    .cloned(),
            );
            tx.put_graph(container, container_graph)?;
            debug!("Moved membership of {} out of {}", container, uri);
        }
        Ok(hosted)
    }

    /// Containers whose pages a change to `uri` invalidates
    fn affected<T: ReadTransaction + ?Sized>(
        tx: &T,
        uri: &str,
        kind: ResourceKind,
    ) -> LdpResult<Vec<String>> {
        let mut affected: Vec<String> = find_owner(tx, uri)?.into_iter().collect();
        if kind.is_container() {
            affected.push(uri.to_string());
        }
        Ok(affected)
    }

    fn mark_all_dirty(&self, containers: &[String]) -> LdpResult<()> {
        for container in containers {
            self.pages.mark_dirty(container)?;
        }
        Ok(())
    }
}

impl ResourceHandler for ContainerEngine {
    fn get(&self, uri: &ResourceUri, accept: &str) -> LdpResult<Representation> {
        let base = uri.base();
        match uri.suffix() {
            Suffix::FirstPage => {
                let view = self.pages.first_page(base)?;
                self.render(&view.graph, view.etag, accept, ResourceKind::Page)
            }
            Suffix::Page(n) => {
                let view = self.pages.page(base, n)?;
                self.render(&view.graph, view.etag, accept, ResourceKind::Page)
            }
            Suffix::None => {
                let node = NamedNode::new(base)?;
                let tx = self.store.begin_read()?;
                let graph = tx.get_graph(base).ok_or_else(|| LdpError::not_found(base))?;
                let kind = ResourceKind::from_graph(node.as_ref(), &graph);
                let etag = ResourceEngine::current_etag(&graph, &node);
                let graph = if kind.is_container() {
                    self.container_view(&*tx, base, graph)?
                } else {
                    graph
                };
                drop(tx);
                self.render(&graph, etag, accept, kind)
            }
            Suffix::NonMemberProperties => {
                let node = NamedNode::new(base)?;
                let tx = self.store.begin_read()?;
                let graph = tx.get_graph(base).ok_or_else(|| LdpError::not_found(base))?;
                let kind = ResourceKind::from_graph(node.as_ref(), &graph);
                if !kind.is_container() {
                    return Err(LdpError::not_found(&uri.to_string()));
                }
                let config = ContainerConfig::load(&*tx, base, &self.defaults);
                let membership = Membership::resolve(&*tx, base, &config);
                drop(tx);
                let etag = ResourceEngine::current_etag(&graph, &node);
                self.render(&membership.non_member_view(&graph), etag, accept, kind)
            }
            Suffix::Config => {
                let tx = self.store.begin_read()?;
                if !tx.contains_graph(base) {
                    return Err(LdpError::not_found(base));
                }
                let graph = match tx.get_graph(&config_uri(base)) {
                    Some(graph) => graph,
                    None => ContainerConfig::load(&*tx, base, &self.defaults).to_graph(base),
                };
                drop(tx);
                self.render(&graph, String::new(), accept, ResourceKind::RdfSource)
            }
        }
    }

    fn post(&self, container: &str, request: &WriteRequest<'_>) -> LdpResult<String> {
        if !ResourceEngine::is_rdf(request.content_type) {
            return self.binaries.create(container, request);
        }
        let container_node = NamedNode::new(container)?;
        let mut tx = self.store.begin_write()?;
        let container_graph = tx
            .get_graph(container)
            .ok_or_else(|| LdpError::not_found(container))?;
        if !ResourceKind::from_graph(container_node.as_ref(), &container_graph).is_container() {
            return Err(LdpError::MethodNotAllowed(format!("{} is not a container", container)));
        }

        let config = ContainerConfig::load(&*tx, container, &self.defaults);
        let uri = tx.mint_graph_uri(container, &config.resource_uri_prefix, request.slug)?;
        let node = NamedNode::new(uri.as_str())?;
        let mut graph = self
            .resources
            .parse(request.content, request.content_type, &uri)?;

        let membership = Membership::resolve(&*tx, container, &config);
        let member = membership.member_for(&node, &graph);
        self.resources.stamp_created(&mut graph, &node, request.user)?;
        tx.put_graph(&uri, graph)?;
        link(&mut *tx, &self.resources, &membership, &node, member)?;
        drop(tx);

        self.pages.mark_dirty(container)?;
        info!("Created {} in {}", uri, container);
        Ok(uri)
    }

    fn put(&self, uri: &str, request: &WriteRequest<'_>) -> LdpResult<String> {
        if !ResourceEngine::is_rdf(request.content_type) {
            return Err(LdpError::UnsupportedMediaType(request.content_type.to_string()));
        }
        let node = NamedNode::new(uri)?;
        let mut tx = self.store.begin_write()?;
        let mut graph = self
            .resources
            .parse(request.content, request.content_type, uri)?;

        let old = tx.get_graph(uri);
        let mut affected = match &old {
            None => {
                self.resources.stamp_created(&mut graph, &node, request.user)?;
                info!("Created {} by PUT", uri);
                Vec::new()
            }
            Some(old) => {
                check_if_match(uri, request.if_match, &ResourceEngine::current_etag(old, &node))?;
                let kind = ResourceKind::from_graph(node.as_ref(), old);
                ResourceEngine::carry_over(old, &mut graph, &node);
                if kind.is_container() {
                    self.keep_server_managed(&*tx, &node, kind, old, &mut graph);
                }
                self.resources
                    .stamp_modified(&mut graph, &node, request.user)?;
                self.follow_member_term(&mut *tx, &node, old, &graph)?;
                info!("Replaced {}", uri);
                Self::affected(&*tx, uri, kind)?
            }
        };
        affected.extend(self.adopt_membership(&mut *tx, uri, old.as_ref(), &mut graph)?);
        let etag = ResourceEngine::current_etag(&graph, &node);
        tx.put_graph(uri, graph)?;
        drop(tx);

        self.mark_all_dirty(&affected)?;
        Ok(etag)
    }

    fn patch(&self, uri: &str, request: &WriteRequest<'_>) -> LdpResult<String> {
        let node = NamedNode::new(uri)?;
        let mut tx = self.store.begin_write()?;
        let mut graph = tx.get_graph(uri).ok_or_else(|| LdpError::not_found(uri))?;
        check_if_match(uri, request.if_match, &ResourceEngine::current_etag(&graph, &node))?;
        let kind = ResourceKind::from_graph(node.as_ref(), &graph);

        self.resources
            .stamp_modified(&mut graph, &node, request.user)?;
        let etag = ResourceEngine::current_etag(&graph, &node);
        tx.put_graph(uri, graph)?;
        let affected = Self::affected(&*tx, uri, kind)?;
        drop(tx);

        self.mark_all_dirty(&affected)?;
        info!("Patched {} (metadata only)", uri);
        Ok(etag)
    }

    fn delete(&self, uri: &str) -> LdpResult<()> {
        let node = NamedNode::new(uri)?;
        let mut tx = self.store.begin_write()?;
        let graph = tx.get_graph(uri).ok_or_else(|| LdpError::not_found(uri))?;
        let kind = ResourceKind::from_graph(node.as_ref(), &graph);

        let owner = find_owner(&*tx, uri)?;
        if let Some(owner) = &owner {
            let config = ContainerConfig::load(&*tx, owner, &self.defaults);
            let membership = Membership::resolve(&*tx, owner, &config);
            let member = membership.member_for(&node, &graph);
            unlink(&mut *tx, &self.resources, &membership, &node, member)?;
        }
        let mut affected: Vec<String> = owner.into_iter().collect();
        affected.extend(self.release_membership(&mut *tx, uri)?);
        tx.delete_graph(uri)?;
        if kind.is_container() {
            tx.delete_graph(&config_uri(uri))?;
            destroy_chain(&mut *tx, uri)?;
        }
        drop(tx);

        self.mark_all_dirty(&affected)?;
        if kind.is_container() {
            self.pages.forget(uri)?;
        }
        info!("Deleted {}", uri);
        Ok(())
    }
}
