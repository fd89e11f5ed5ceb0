//! Lazily materialized container pages
//!
//! Each container has an explicit [`PageState`]. Any mutation of the
//! container or of one of its members marks it [`PageState::Dirty`]; the next
//! request for the first page rebuilds the whole chain
//! `?firstPage → ?p=2 → … → rdf:nil` and marks it Clean. Recomputation
//! holds the container's state mutex, so concurrent first-page requests run
//! it once and the later callers see the Clean result.
//!
//! Lock order is always state mutex, then store lock.

use crate::container::{expand_members, ContainerConfig, Membership};
use crate::error::{LdpError, LdpResult};
use crate::rdf::namespace::{ldp, rdf};
use crate::rdf::Graph;
use crate::resource::{first_page_uri, page_uri, ResourceEngine, ResourceKind};
use crate::store::{GraphStore, ReadTransaction, StoreResult, WriteTransaction};
use oxrdf::{NamedNode, Term, Triple};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Paging state of one container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// The stored chain reflects the current membership
    Clean,
    /// The chain must be rebuilt before the first page is served
    Dirty,
}

/// A page ready for serialization
#[derive(Debug, Clone)]
pub struct PageView {
    pub graph: Graph,
    /// `dcterms:modified` of the page, stamped at recomputation
    pub etag: String,
}

/// Outcome of one recomputation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecomputeStats {
    pub pages: u64,
    pub members: usize,
}

/// Builds and serves container pages
pub struct PageEngine {
    store: Arc<dyn GraphStore>,
    resources: Arc<ResourceEngine>,
    defaults: ContainerConfig,
    states: Mutex<HashMap<String, Arc<Mutex<PageState>>>>,
}

impl PageEngine {
    pub fn new(
        store: Arc<dyn GraphStore>,
        resources: Arc<ResourceEngine>,
        defaults: ContainerConfig,
    ) -> Self {
        Self {
            store,
            resources,
            defaults,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// State mutex of `container`; containers start Dirty
    fn state_for(&self, container: &str) -> LdpResult<Arc<Mutex<PageState>>> {
        let mut states = self.states.lock()?;
        Ok(Arc::clone(
            states
                .entry(container.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(PageState::Dirty))),
        ))
    }

    /// Current state of `container`; untracked containers are Dirty
    pub fn state(&self, container: &str) -> LdpResult<PageState> {
        let state = self.states.lock()?.get(container).cloned();
        match state {
            Some(state) => Ok(*state.lock()?),
            None => Ok(PageState::Dirty),
        }
    }

    /// Invalidate the chain of `container`
    ///
    /// Must not be called while holding a store transaction.
    pub fn mark_dirty(&self, container: &str) -> LdpResult<()> {
        let state = self.state_for(container)?;
        *state.lock()? = PageState::Dirty;
        debug!("Marked {} dirty", container);
        Ok(())
    }

    /// Drop the state of a deleted container
    pub fn forget(&self, container: &str) -> LdpResult<()> {
        self.states.lock()?.remove(container);
        Ok(())
    }

    /// Serve the first page, rebuilding the chain first if needed
    pub fn first_page(&self, container: &str) -> LdpResult<PageView> {
        let first = first_page_uri(container);
        if !self.store.begin_read()?.contains_graph(container) {
            return Err(LdpError::not_found(&first));
        }
        let state = self.state_for(container)?;
        let mut guard = state.lock()?;

        let missing = !self.store.begin_read()?.contains_graph(&first);
        if *guard == PageState::Dirty || missing {
            match self.recompute(container) {
                Ok(_) => *guard = PageState::Clean,
                Err(err @ LdpError::NotFound(_)) => {
                    // Deleted meanwhile, or not a container
                    drop(guard);
                    self.forget(container)?;
                    return Err(err);
                }
                Err(err) => return Err(err),
            }
        }
        drop(guard);
        self.view(container, &first)
    }

    /// Serve page `n` ≥ 2 as last computed
    pub fn page(&self, container: &str, n: u64) -> LdpResult<PageView> {
        self.view(container, &page_uri(container, n))
    }

    /// Rebuild the page chain of `container`
    ///
    /// Callers hold the container's state mutex.
    fn recompute(&self, container: &str) -> LdpResult<RecomputeStats> {
        let mut tx = self.store.begin_write()?;
        let container_graph = tx
            .get_graph(container)
            .ok_or_else(|| LdpError::not_found(container))?;
        let container_node = NamedNode::new(container)?;
        if !ResourceKind::from_graph(container_node.as_ref(), &container_graph).is_container() {
            return Err(LdpError::not_found(&first_page_uri(container)));
        }

        destroy_chain(&mut *tx, container)?;

        let config = ContainerConfig::load(&*tx, container, &self.defaults);
        let membership = Membership::resolve(&*tx, container, &config);
        let page_size = config.page_size.max(1);

        let mut offset = 0;
        let mut number: u64 = 1;
        let mut members = 0;
        let mut pending: Option<(String, Graph)> = None;
        loop {
            let query = membership.page_query(&config.sort_predicates, offset, page_size);
            let batch: Vec<Term> = tx
                .select(&query)?
                .into_iter()
                .filter_map(|solution| solution.get("member").cloned())
                .collect();

            if batch.is_empty() && number > 1 {
                // The previous page was full and turned out to be the last one.
                if let Some((uri, mut graph)) = pending.take() {
                    let node = NamedNode::new_unchecked(uri.as_str());
                    graph.set(node.as_ref(), ldp::NEXT_PAGE, rdf::NIL.into_owned());
                    tx.put_graph(&uri, graph)?;
                }
                number -= 1;
                break;
            }

            let uri = page_uri(container, number);
            let last = batch.len() < page_size;
            let next: Term = if last {
                rdf::NIL.into_owned().into()
            } else {
                NamedNode::new_unchecked(page_uri(container, number + 1)).into()
            };
            members += batch.len();
            let graph = self.build_page(&uri, &container_node, &membership, &config, batch, next)?;

            if let Some((previous_uri, previous)) = pending.take() {
                tx.put_graph(&previous_uri, previous)?;
            }
            if last {
                tx.put_graph(&uri, graph)?;
                break;
            }
            pending = Some((uri, graph));
            offset += page_size;
            number += 1;
        }
        drop(tx);

        info!(
            "Recomputed {} pages for {} ({} members)",
            number, container, members
        );
        Ok(RecomputeStats {
            pages: number,
            members,
        })
    }

    fn build_page(
        &self,
        uri: &str,
        container: &NamedNode,
        membership: &Membership,
        config: &ContainerConfig,
        batch: Vec<Term>,
        next: Term,
    ) -> LdpResult<Graph> {
        let page = NamedNode::new_unchecked(uri);
        let mut graph = Graph::new();
        graph.insert(Triple::new(page.clone(), rdf::TYPE, ldp::PAGE.into_owned()));
        graph.insert(Triple::new(page.clone(), ldp::PAGE_OF, container.clone()));
        graph.insert(Triple::new(page.clone(), ldp::NEXT_PAGE, next));
        if !config.sort_predicates.is_empty() {
            let head = graph.insert_list(config.sort_predicates.iter().cloned().map(Term::from));
            graph.insert(Triple::new(page.clone(), ldp::PAGE_SORT_PREDICATES, head));
        }
        self.resources.touch(&mut graph, &page)?;
        for member in batch {
            graph.insert(membership.triple(member));
        }
        Ok(graph)
    }

    /// Page graph merged with the container's non-member view and member info
    fn view(&self, container: &str, uri: &str) -> LdpResult<PageView> {
        let tx = self.store.begin_read()?;
        let page = tx.get_graph(uri).ok_or_else(|| LdpError::not_found(uri))?;
        let container_graph = tx
            .get_graph(container)
            .ok_or_else(|| LdpError::not_found(container))?;
        let config = ContainerConfig::load(&*tx, container, &self.defaults);
        let membership = Membership::resolve(&*tx, container, &config);

        let page_node = NamedNode::new_unchecked(uri);
        let etag = ResourceEngine::current_etag(&page, &page_node);

        let mut graph = page;
        graph.merge(&membership.non_member_view(&container_graph));
        if config.member_info {
            let members: Vec<Term> = graph
                .triples_for(membership.subject.as_ref(), membership.predicate.as_ref())
                .map(|t| t.object.clone())
                .collect();
            let info = expand_members(&*tx, &members, config.member_filter.as_deref());
            graph.merge(&info);
        }
        Ok(PageView { graph, etag })
    }
}

/// Delete the page chain of `container`, following `ldp:nextPage` from the first page
pub fn destroy_chain<T: WriteTransaction + ?Sized>(
    tx: &mut T,
    container: &str,
) -> StoreResult<usize> {
    let mut visited = HashSet::new();
    let mut current = first_page_uri(container);
    let page_prefix = format!("{}?p=", container);
    let mut destroyed = 0;
    loop {
        if !visited.insert(current.clone()) {
            break;
        }
        let Some(graph) = tx.get_graph(&current) else {
            break;
        };
        tx.delete_graph(&current)?;
        destroyed += 1;
        let node = NamedNode::new_unchecked(current.as_str());
        match graph.object(node.as_ref(), ldp::NEXT_PAGE) {
            Some(Term::NamedNode(next)) if next.as_str().starts_with(&page_prefix) => {
                current = next.as_str().to_string();
            }
            _ => break,
        }
    }
    debug!("Destroyed {} pages of {}", destroyed, container);
    Ok(destroyed)
}
