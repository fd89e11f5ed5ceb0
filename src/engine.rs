//! The LDP request surface
//!
//! [`LdpEngine`] wires the store, the serializer and the per-kind engines
//! together. Each call resolves which kind of resource a URI names and
//! dispatches to the matching [`ResourceHandler`].

use crate::config::EngineConfig;
use crate::container::{ContainerConfig, ContainerEngine};
use crate::error::{LdpError, LdpResult};
use crate::nonrdf::NonRdfSourceEngine;
use crate::page::{PageEngine, PageState};
use crate::rdf::{RdfCodec, RdfFormat, Serializer};
use crate::resource::{
    config_uri, Metadata, Representation, ResourceEngine, ResourceHandler, ResourceKind,
    ResourceRecord, ResourceUri, Suffix, WriteRequest,
};
use crate::sparql::{ResultFormat, SparqlResults};
use crate::store::{GraphStore, MemoryGraphStore, ReadTransaction};
use oxrdf::NamedNode;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info};

/// User recorded as creator of the root container
const SYSTEM_USER: &str = "system";

/// Linked Data Platform engine
pub struct LdpEngine {
    config: EngineConfig,
    store: Arc<dyn GraphStore>,
    resources: Arc<ResourceEngine>,
    pages: Arc<PageEngine>,
    containers: ContainerEngine,
    binaries: Arc<NonRdfSourceEngine>,
}

impl LdpEngine {
    /// Build an engine over `store`
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn GraphStore>,
        serializer: Arc<dyn Serializer>,
    ) -> LdpResult<Self> {
        config
            .validate()
            .map_err(|e| LdpError::BadRequest(e.to_string()))?;
        let defaults = config.container_defaults();
        let resources = Arc::new(ResourceEngine::new(serializer));
        let pages = Arc::new(PageEngine::new(
            Arc::clone(&store),
            Arc::clone(&resources),
            defaults.clone(),
        ));
        let binaries = Arc::new(NonRdfSourceEngine::new(
            Arc::clone(&store),
            Arc::clone(&resources),
            Arc::clone(&pages),
            config.binary_dir.clone(),
            defaults.clone(),
        )?);
        let containers = ContainerEngine::new(
            Arc::clone(&store),
            Arc::clone(&resources),
            Arc::clone(&pages),
            Arc::clone(&binaries),
            defaults,
        );
        info!("LDP engine ready at {}", config.base_uri);
        Ok(Self {
            config,
            store,
            resources,
            pages,
            containers,
            binaries,
        })
    }

    /// Engine over a fresh [`MemoryGraphStore`] with expanded JSON-LD support
    pub fn in_memory(config: EngineConfig) -> LdpResult<Self> {
        let store = Arc::new(MemoryGraphStore::with_max_mint_attempts(
            config.max_mint_attempts,
        )?);
        let serializer = Arc::new(RdfCodec::with_expanded_json_ld());
        Self::new(config, store, serializer)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    /// Create the root container at `base_uri` unless it exists
    ///
    /// Returns true when it was created.
    pub fn ensure_root_container(&self) -> LdpResult<bool> {
        let root = self.config.base_uri.as_str();
        if self.store.begin_read()?.contains_graph(root) {
            return Ok(false);
        }
        self.create_container(root, ResourceKind::BasicContainer, None, SYSTEM_USER)?;
        Ok(true)
    }

    /// Create a container; `config` falls back to the engine defaults
    pub fn create_container(
        &self,
        uri: &str,
        kind: ResourceKind,
        config: Option<ContainerConfig>,
        user: &str,
    ) -> LdpResult<()> {
        let parsed = ResourceUri::parse(uri)?;
        if parsed.suffix() != Suffix::None {
            return Err(LdpError::BadRequest(format!("{} is not a resource URI", uri)));
        }
        let config = config.unwrap_or_else(|| self.config.container_defaults());
        self.containers.create_container(uri, kind, &config, user)
    }

    /// Kind and metadata of the resource `uri` names
    pub fn resolve(&self, uri: &str) -> LdpResult<ResourceRecord> {
        let parsed = ResourceUri::parse(uri)?;
        let base = parsed.base();
        let node = NamedNode::new(base)?;
        let tx = self.store.begin_read()?;

        let (kind, metadata) = match tx.get_graph(base) {
            Some(graph) => (
                ResourceKind::from_graph(node.as_ref(), &graph),
                Metadata::from_graph(node.as_ref(), &graph),
            ),
            None if NonRdfSourceEngine::is_binary(&*tx, base) => {
                let side = NonRdfSourceEngine::side_graph(&*tx, base)?;
                (
                    ResourceKind::NonRdfSource,
                    Metadata::from_graph(node.as_ref(), &side),
                )
            }
            None => return Err(LdpError::not_found(base)),
        };
        let kind = match parsed.suffix() {
            Suffix::None => kind,
            Suffix::FirstPage | Suffix::Page(_) if kind.is_container() => ResourceKind::Page,
            Suffix::NonMemberProperties if kind.is_container() => kind,
            Suffix::Config => ResourceKind::RdfSource,
            _ => return Err(LdpError::not_found(uri)),
        };
        Ok(ResourceRecord {
            uri: uri.to_string(),
            kind,
            metadata,
        })
    }

    /// Handler for the resource at `base`
    fn handler(&self, base: &str) -> LdpResult<&dyn ResourceHandler> {
        let tx = self.store.begin_read()?;
        if NonRdfSourceEngine::is_binary(&*tx, base) {
            debug!("{} handled as non-RDF source", base);
            Ok(self.binaries.as_ref())
        } else {
            Ok(&self.containers)
        }
    }

    fn writable(uri: &str) -> LdpResult<ResourceUri> {
        let parsed = ResourceUri::parse(uri)?;
        match parsed.suffix() {
            Suffix::None => Ok(parsed),
            _ => Err(LdpError::MethodNotAllowed(format!(
                "{} is managed by the server",
                uri
            ))),
        }
    }

    /// GET `uri` serialized for `accept`
    pub fn get(&self, uri: &str, accept: &str) -> LdpResult<Representation> {
        let parsed = ResourceUri::parse(uri)?;
        self.handler(parsed.base())?.get(&parsed, accept)
    }

    /// POST a new member to `container`; returns its URI
    pub fn post(&self, container: &str, request: &WriteRequest<'_>) -> LdpResult<String> {
        let parsed = Self::writable(container)?;
        self.handler(parsed.base())?.post(parsed.base(), request)
    }

    /// PUT `uri`; returns the new ETag
    ///
    /// An absent URI is created: non-RDF content becomes a standalone binary.
    /// A deleted binary counts as absent, so PUT recreates it.
    pub fn put(&self, uri: &str, request: &WriteRequest<'_>) -> LdpResult<String> {
        let parsed = Self::writable(uri)?;
        let base = parsed.base();
        let absent = {
            let tx = self.store.begin_read()?;
            !tx.contains_graph(base)
                && (!tx.contains_graph(&config_uri(base))
                    || (NonRdfSourceEngine::is_binary(&*tx, base)
                        && NonRdfSourceEngine::side_graph(&*tx, base).is_err()))
        };
        if absent {
            if ResourceEngine::is_rdf(request.content_type) {
                return self.containers.put(base, request);
            }
            return self.binaries.create_standalone(base, request);
        }
        self.handler(base)?.put(base, request)
    }

    /// PATCH `uri`; returns the new ETag
    pub fn patch(&self, uri: &str, request: &WriteRequest<'_>) -> LdpResult<String> {
        let parsed = Self::writable(uri)?;
        self.handler(parsed.base())?.patch(parsed.base(), request)
    }

    /// DELETE `uri`
    pub fn delete(&self, uri: &str) -> LdpResult<()> {
        let parsed = Self::writable(uri)?;
        self.handler(parsed.base())?.delete(parsed.base())
    }

    /// Run a SPARQL query and write its results to `out`
    ///
    /// Solutions and booleans use the SPARQL result formats; graphs are
    /// written as RDF/XML for [`ResultFormat::Xml`] and JSON-LD for
    /// [`ResultFormat::Json`].
    pub fn query<W: Write>(&self, mut out: W, sparql: &str, format: ResultFormat) -> LdpResult<W> {
        let results = self.store.begin_read()?.query(sparql)?;
        match results {
            SparqlResults::Graph(graph) => {
                let rdf_format = match format {
                    ResultFormat::Xml => RdfFormat::RdfXml,
                    ResultFormat::Json => RdfFormat::JsonLd,
                };
                let body = self.resources.serialize_as(&graph, rdf_format)?;
                out.write_all(&body)?;
                Ok(out)
            }
            results => Ok(results.write(out, format)?),
        }
    }

    /// Paging state of `container`
    pub fn page_state(&self, container: &str) -> LdpResult<PageState> {
        self.pages.state(container)
    }
}
