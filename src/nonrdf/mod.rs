//! Non-RDF sources
//!
//! Binary members are stored as files named by the SHA-256 of their URI.
//! Everything else about them lives in the side graph `<uri>?_config`:
//! content type, suggested filename, owning container, Dublin Core metadata
//! and, once deleted, a `cfg:deleted` tombstone. Tombstoned side graphs stay
//! in the store so the URI is never minted again.

use crate::container::{find_owner, link, unlink, ContainerConfig, Membership};
use crate::error::{LdpError, LdpResult};
use crate::page::PageEngine;
use crate::rdf::namespace::{cfg, ldp, rdf};
use crate::rdf::Graph;
use crate::resource::{
    check_if_match, config_uri, content_hash, Representation, ResourceEngine, ResourceHandler,
    ResourceKind, ResourceUri, Suffix, WriteRequest,
};
use crate::store::{GraphStore, ReadTransaction, WriteTransaction};
use oxrdf::{Literal, NamedNode, Term, Triple};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Engine for binary resources
pub struct NonRdfSourceEngine {
    store: Arc<dyn GraphStore>,
    resources: Arc<ResourceEngine>,
    pages: Arc<PageEngine>,
    binary_dir: PathBuf,
    defaults: ContainerConfig,
}

impl NonRdfSourceEngine {
    /// Create the engine, creating `binary_dir` if needed
    pub fn new(
        store: Arc<dyn GraphStore>,
        resources: Arc<ResourceEngine>,
        pages: Arc<PageEngine>,
        binary_dir: impl Into<PathBuf>,
        defaults: ContainerConfig,
    ) -> LdpResult<Self> {
        let binary_dir = binary_dir.into();
        fs::create_dir_all(&binary_dir)?;
        Ok(Self {
            store,
            resources,
            pages,
            binary_dir,
            defaults,
        })
    }

    pub fn binary_dir(&self) -> &Path {
        &self.binary_dir
    }

    /// File holding the content of `uri`
    pub fn file_path(&self, uri: &str) -> PathBuf {
        self.binary_dir.join(content_hash(uri.as_bytes()))
    }

    /// Check if `uri` names a binary, live or tombstoned
    pub fn is_binary<T: ReadTransaction + ?Sized>(tx: &T, uri: &str) -> bool {
        if tx.contains_graph(uri) {
            return false;
        }
        let node = NamedNode::new_unchecked(uri);
        tx.get_graph(&config_uri(uri)).map_or(false, |side| {
            ResourceKind::from_graph(node.as_ref(), &side) == ResourceKind::NonRdfSource
        })
    }

    /// Side graph of a live binary
    pub fn side_graph<T: ReadTransaction + ?Sized>(tx: &T, uri: &str) -> LdpResult<Graph> {
        let node = NamedNode::new(uri)?;
        let side = tx
            .get_graph(&config_uri(uri))
            .filter(|side| {
                ResourceKind::from_graph(node.as_ref(), side) == ResourceKind::NonRdfSource
                    && side.object(node.as_ref(), cfg::DELETED).is_none()
            })
            .ok_or_else(|| LdpError::not_found(uri))?;
        Ok(side)
    }

    fn read_content(&self, uri: &str) -> LdpResult<Vec<u8>> {
        match fs::read(self.file_path(uri)) {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(LdpError::not_found(uri)),
            Err(err) => Err(err.into()),
        }
    }

    fn write_content(&self, uri: &str, content: &[u8]) -> LdpResult<()> {
        let path = self.file_path(uri);
        fs::write(&path, content)?;
        debug!("Wrote {} bytes for {} to {}", content.len(), uri, path.display());
        Ok(())
    }

    fn new_side_graph(
        &self,
        node: &NamedNode,
        container: Option<&str>,
        request: &WriteRequest<'_>,
    ) -> LdpResult<Graph> {
        let mut side = Graph::new();
        side.insert(Triple::new(node.clone(), rdf::TYPE, ldp::NON_RDF_SOURCE.into_owned()));
        side.insert(Triple::new(
            node.clone(),
            cfg::CONTENT_TYPE,
            Literal::new_simple_literal(request.content_type),
        ));
        if let Some(slug) = request.slug {
            side.insert(Triple::new(
                node.clone(),
                cfg::FILENAME,
                Literal::new_simple_literal(slug),
            ));
        }
        if let Some(container) = container {
            side.insert(Triple::new(node.clone(), cfg::CONTAINER, NamedNode::new(container)?));
        }
        self.resources.stamp_created(&mut side, node, request.user)?;
        Ok(side)
    }

    /// Create a binary member of `container`; returns its URI
    pub fn create(&self, container: &str, request: &WriteRequest<'_>) -> LdpResult<String> {
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
        self.write_content(&uri, request.content)?;
        let side = self.new_side_graph(&node, Some(container), request)?;
        tx.put_graph(&config_uri(&uri), side)?;

        let membership = Membership::resolve(&*tx, container, &config);
        link(&mut *tx, &self.resources, &membership, &node, node.clone().into())?;
        drop(tx);

        self.pages.mark_dirty(container)?;
        info!(
            "Created binary {} in {} ({}, {} bytes)",
            uri,
            container,
            request.content_type,
            request.content.len()
        );
        Ok(uri)
    }

    /// Create a binary outside any container; returns its ETag
    pub fn create_standalone(&self, uri: &str, request: &WriteRequest<'_>) -> LdpResult<String> {
        let node = NamedNode::new(uri)?;
        let mut tx = self.store.begin_write()?;
        if tx.contains_graph(uri) || Self::side_graph(&*tx, uri).is_ok() {
            return Err(LdpError::Conflict(format!("{} already exists", uri)));
        }
        self.write_content(uri, request.content)?;
        let side = self.new_side_graph(&node, None, request)?;
        tx.put_graph(&config_uri(uri), side)?;
        drop(tx);

        info!("Created standalone binary {}", uri);
        Ok(content_hash(request.content))
    }
}

impl ResourceHandler for NonRdfSourceEngine {
    fn get(&self, uri: &ResourceUri, accept: &str) -> LdpResult<Representation> {
        let base = uri.base();
        let side = {
            let tx = self.store.begin_read()?;
            Self::side_graph(&*tx, base)?
        };
        match uri.suffix() {
            Suffix::None => {
                let node = NamedNode::new(base)?;
                let body = self.read_content(base)?;
                let content_type = match side.object(node.as_ref(), cfg::CONTENT_TYPE) {
                    Some(Term::Literal(ct)) => ct.value().to_string(),
                    _ => "application/octet-stream".to_string(),
                };
                Ok(Representation {
                    etag: content_hash(&body),
                    body,
                    content_type,
                    kind: ResourceKind::NonRdfSource,
                })
            }
            Suffix::Config => {
                let node = NamedNode::new(base)?;
                let etag = ResourceEngine::current_etag(&side, &node);
                let (body, content_type) = self.resources.serialize(&side, accept)?;
                Ok(Representation {
                    body,
                    etag,
                    content_type: content_type.to_string(),
                    kind: ResourceKind::RdfSource,
                })
            }
            _ => Err(LdpError::not_found(&uri.to_string())),
        }
    }

    fn put(&self, uri: &str, request: &WriteRequest<'_>) -> LdpResult<String> {
        let if_match = request
            .if_match
            .ok_or_else(|| LdpError::PreconditionRequired(format!("If-Match required for {}", uri)))?;
        let node = NamedNode::new(uri)?;
        let mut tx = self.store.begin_write()?;
        let mut side = Self::side_graph(&*tx, uri)?;
        let current = content_hash(&self.read_content(uri)?);
        check_if_match(uri, Some(if_match), &current)?;

        self.write_content(uri, request.content)?;
        side.set(
            node.as_ref(),
            cfg::CONTENT_TYPE,
            Literal::new_simple_literal(request.content_type),
        );
        self.resources.stamp_modified(&mut side, &node, request.user)?;
        tx.put_graph(&config_uri(uri), side)?;
        let owner = find_owner(&*tx, uri)?;
        drop(tx);

        if let Some(owner) = owner {
            self.pages.mark_dirty(&owner)?;
        }
        info!("Replaced binary {} ({} bytes)", uri, request.content.len());
        Ok(content_hash(request.content))
    }

    fn delete(&self, uri: &str) -> LdpResult<()> {
        let node = NamedNode::new(uri)?;
        let mut tx = self.store.begin_write()?;
        let mut side = Self::side_graph(&*tx, uri)?;

        let owner = find_owner(&*tx, uri)?;
        if let Some(owner) = &owner {
            let config = ContainerConfig::load(&*tx, owner, &self.defaults);
            let membership = Membership::resolve(&*tx, owner, &config);
            unlink(&mut *tx, &self.resources, &membership, &node, node.clone().into())?;
        }
        match fs::remove_file(self.file_path(uri)) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        side.set(node.as_ref(), cfg::DELETED, self.resources.now()?);
        tx.put_graph(&config_uri(uri), side)?;
        drop(tx);

        if let Some(owner) = &owner {
            self.pages.mark_dirty(owner)?;
        }
        info!("Deleted binary {}", uri);
        Ok(())
    }
}
