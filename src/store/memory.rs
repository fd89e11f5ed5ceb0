//! In-memory graph store
//!
//! Named graphs live in a sorted map behind one `RwLock`, each graph keeping
//! the order its triples were written in. Every write is mirrored into an
//! oxigraph [`Store`] as the quads of that named graph, and SPARQL runs
//! there. A read transaction holds the read guard, a write transaction the
//! write guard, so a writer sees no interleaving and readers never see a
//! half-applied write.

use super::{child_uri, sanitize_slug, GraphStore, ReadTransaction, StoreError, StoreResult, WriteTransaction};
use crate::rdf::Graph;
use crate::sparql::{self, SparqlResults};
use oxigraph::store::Store;
use oxrdf::NamedNode;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

struct StoreState {
    /// Graph URI → graph
    graphs: BTreeMap<String, Graph>,
    /// The same graphs as quads, for query evaluation
    quads: Store,
    /// Container URI → last counter value handed out
    counters: HashMap<String, u64>,
}

/// Graph store held entirely in memory
pub struct MemoryGraphStore {
    state: RwLock<StoreState>,
    max_mint_attempts: u64,
}

impl MemoryGraphStore {
    /// Default bound on counter attempts per mint
    pub const DEFAULT_MAX_MINT_ATTEMPTS: u64 = 10_000;

    /// Create an empty store
    pub fn new() -> StoreResult<Self> {
        Self::with_max_mint_attempts(Self::DEFAULT_MAX_MINT_ATTEMPTS)
    }

    /// Create an empty store with a custom minting bound
    pub fn with_max_mint_attempts(max_mint_attempts: u64) -> StoreResult<Self> {
        let state = StoreState {
            graphs: BTreeMap::new(),
            quads: Store::new()?,
            counters: HashMap::new(),
        };
        Ok(Self {
            state: RwLock::new(state),
            max_mint_attempts: max_mint_attempts.max(1),
        })
    }

    fn read_state(&self) -> StoreResult<RwLockReadGuard<'_, StoreState>> {
        self.state.read().map_err(|_| StoreError::LockPoisoned)
    }
}

impl GraphStore for MemoryGraphStore {
    fn begin_read(&self) -> StoreResult<Box<dyn ReadTransaction + '_>> {
        Ok(Box::new(MemoryReadTransaction {
            state: self.read_state()?,
        }))
    }

    fn begin_write(&self) -> StoreResult<Box<dyn WriteTransaction + '_>> {
        let state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(Box::new(MemoryWriteTransaction {
            state,
            max_mint_attempts: self.max_mint_attempts,
        }))
    }
}

struct MemoryReadTransaction<'a> {
    state: RwLockReadGuard<'a, StoreState>,
}

impl ReadTransaction for MemoryReadTransaction<'_> {
    fn get_graph(&self, uri: &str) -> Option<Graph> {
        self.state.graphs.get(uri).cloned()
    }

    fn contains_graph(&self, uri: &str) -> bool {
        self.state.graphs.contains_key(uri)
    }

    fn query(&self, query: &str) -> StoreResult<SparqlResults> {
        Ok(sparql::execute(&self.state.quads, query)?)
    }
}

struct MemoryWriteTransaction<'a> {
    state: RwLockWriteGuard<'a, StoreState>,
    max_mint_attempts: u64,
}

impl ReadTransaction for MemoryWriteTransaction<'_> {
    fn get_graph(&self, uri: &str) -> Option<Graph> {
        self.state.graphs.get(uri).cloned()
    }

    fn contains_graph(&self, uri: &str) -> bool {
        self.state.graphs.contains_key(uri)
    }

    fn query(&self, query: &str) -> StoreResult<SparqlResults> {
        Ok(sparql::execute(&self.state.quads, query)?)
    }
}

impl WriteTransaction for MemoryWriteTransaction<'_> {
    fn put_graph(&mut self, uri: &str, graph: Graph) -> StoreResult<()> {
        let name = NamedNode::new(uri).map_err(|_| StoreError::InvalidIri(uri.to_string()))?;
        let state = &mut *self.state;
        state.quads.remove_named_graph(name.as_ref())?;
        state
            .quads
            .extend(graph.iter().map(|triple| triple.clone().in_graph(name.clone())))?;
        state.graphs.insert(uri.to_string(), graph);
        Ok(())
    }

    fn delete_graph(&mut self, uri: &str) -> StoreResult<bool> {
        let state = &mut *self.state;
        if state.graphs.remove(uri).is_none() {
            return Ok(false);
        }
        if let Ok(name) = NamedNode::new(uri) {
            state.quads.remove_named_graph(name.as_ref())?;
        }
        Ok(true)
    }

    fn mint_graph_uri(
        &mut self,
        container: &str,
        prefix: &str,
        slug: Option<&str>,
    ) -> StoreResult<String> {
        let state = &mut *self.state;

        if let Some(slug) = slug.and_then(sanitize_slug) {
            let uri = child_uri(container, &slug);
            if !is_used(&state.graphs, &uri) {
                return checked_iri(uri);
            }
            debug!("Slug {} already taken under {}", slug, container);
        }

        let counter = state.counters.entry(container.to_string()).or_insert(0);
        for _ in 0..self.max_mint_attempts {
            *counter += 1;
            let uri = child_uri(container, &format!("{}{}", prefix, counter));
            if !is_used(&state.graphs, &uri) {
                return checked_iri(uri);
            }
        }
        Err(StoreError::MintExhausted {
            container: container.to_string(),
            attempts: self.max_mint_attempts,
        })
    }
}

/// A name is taken by its own graph or by any `?`-suffixed side graph
fn is_used(graphs: &BTreeMap<String, Graph>, uri: &str) -> bool {
    if graphs.contains_key(uri) {
        return true;
    }
    let side = format!("{}?", uri);
    graphs
        .range::<str, _>((Bound::Included(side.as_str()), Bound::Unbounded))
        .next()
        .is_some_and(|(key, _)| key.starts_with(&side))
}

fn checked_iri(uri: String) -> StoreResult<String> {
    match NamedNode::new(uri.as_str()) {
        Ok(_) => Ok(uri),
        Err(_) => Err(StoreError::InvalidIri(uri)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{Literal, NamedNode, Term, Triple};

    const C: &str = "http://example.org/c";

    fn one_triple(subject: &str) -> Graph {
        let mut graph = Graph::new();
        graph.insert(Triple::new(
            NamedNode::new(subject).unwrap(),
            NamedNode::new("http://purl.org/dc/terms/title").unwrap(),
            Literal::new_simple_literal("t"),
        ));
        graph
    }

    #[test]
    fn test_put_get_delete() {
        let store = MemoryGraphStore::new().unwrap();
        {
            let mut tx = store.begin_write().unwrap();
            tx.put_graph(C, one_triple(C)).unwrap();
            assert!(tx.contains_graph(C));
        }
        assert!(store.begin_read().unwrap().contains_graph(C));

        let mut tx = store.begin_write().unwrap();
        assert!(tx.delete_graph(C).unwrap());
        assert!(!tx.delete_graph(C).unwrap());
        assert!(tx.get_graph(C).is_none());
    }

    #[test]
    fn test_mint_prefers_slug() {
        let store = MemoryGraphStore::new().unwrap();
        let mut tx = store.begin_write().unwrap();
        let uri = tx.mint_graph_uri(C, "res", Some("hello world")).unwrap();
        assert_eq!(uri, "http://example.org/c/helloworld");
    }

    #[test]
    fn test_mint_falls_back_to_counter() {
        let store = MemoryGraphStore::new().unwrap();
        let mut tx = store.begin_write().unwrap();
        tx.put_graph("http://example.org/c/taken", Graph::new()).unwrap();
        tx.put_graph("http://example.org/c/res1?_config", Graph::new()).unwrap();

        let uri = tx.mint_graph_uri(C, "res", Some("taken")).unwrap();
        assert_eq!(uri, "http://example.org/c/res2");
        tx.put_graph(&uri, Graph::new()).unwrap();

        let uri = tx.mint_graph_uri(C, "res", None).unwrap();
        assert_eq!(uri, "http://example.org/c/res3");
    }

    #[test]
    fn test_mint_exhausted() {
        let store = MemoryGraphStore::with_max_mint_attempts(2).unwrap();
        let mut tx = store.begin_write().unwrap();
        tx.put_graph("http://example.org/c/res1", Graph::new()).unwrap();
        tx.put_graph("http://example.org/c/res2", Graph::new()).unwrap();

        let result = tx.mint_graph_uri(C, "res", None);
        assert!(matches!(result, Err(StoreError::MintExhausted { attempts: 2, .. })));
    }

    #[test]
    fn test_query_passthrough() {
        let store = MemoryGraphStore::new().unwrap();
        {
            let mut tx = store.begin_write().unwrap();
            tx.put_graph(C, one_triple(C)).unwrap();
        }
        let tx = store.begin_read().unwrap();
        let solutions = tx
            .select("SELECT ?g WHERE { GRAPH ?g { ?s ?p ?o } }")
            .unwrap();
        assert_eq!(solutions.len(), 1);

        let graph = tx
            .construct("CONSTRUCT { ?s ?p ?o } WHERE { GRAPH ?g { ?s ?p ?o } }")
            .unwrap();
        assert_eq!(graph.len(), 1);

        let result = tx.construct("SELECT * WHERE { ?s ?p ?o }");
        assert!(matches!(result, Err(StoreError::UnexpectedResult(_))));
    }

    #[test]
    fn test_readers_share() {
        let store = MemoryGraphStore::new().unwrap();
        let first = store.begin_read().unwrap();
        let second = store.begin_read().unwrap();
        assert!(!first.contains_graph(C));
        assert!(!second.contains_graph(C));
    }

    #[test]
    fn test_queries_see_replaced_and_deleted_graphs() {
        let store = MemoryGraphStore::new().unwrap();
        let mut tx = store.begin_write().unwrap();
        tx.put_graph(C, one_triple(C)).unwrap();
        tx.put_graph(C, one_triple("http://example.org/other")).unwrap();

        let subjects = tx.select("SELECT ?s WHERE { GRAPH ?g { ?s ?p ?o } }").unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(
            subjects[0].get("s"),
            Some(&Term::from(NamedNode::new("http://example.org/other").unwrap()))
        );

        tx.delete_graph(C).unwrap();
        assert!(tx.select("SELECT ?s WHERE { ?s ?p ?o }").unwrap().is_empty());
    }

    #[test]
    fn test_default_graph_is_union() {
        let store = MemoryGraphStore::new().unwrap();
        {
            let mut tx = store.begin_write().unwrap();
            tx.put_graph(C, one_triple(C)).unwrap();
            tx.put_graph("http://example.org/d", one_triple("http://example.org/d"))
                .unwrap();
        }
        let tx = store.begin_read().unwrap();
        assert_eq!(tx.select("SELECT ?s WHERE { ?s ?p ?o }").unwrap().len(), 2);
    }

    #[test]
    fn test_side_graph_of_longer_name_does_not_block() {
        let store = MemoryGraphStore::new().unwrap();
        let mut tx = store.begin_write().unwrap();
        tx.put_graph("http://example.org/c/res10?_config", Graph::new()).unwrap();
        tx.put_graph("http://example.org/c/res1x", Graph::new()).unwrap();
        let uri = tx.mint_graph_uri(C, "res", None).unwrap();
        assert_eq!(uri, "http://example.org/c/res1");
    }
}
