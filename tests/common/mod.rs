#![allow(dead_code)]

use samyama_ldp::rdf::namespace::{ldp, rdf};
use samyama_ldp::{
    EngineConfig, Graph, LdpEngine, NamedNode, RdfCodec, ReadTransaction, Serializer, Term,
    WriteRequest,
};
use tempfile::TempDir;

pub const BASE: &str = "http://example.org/ldp/";
pub const NAME: &str = "http://xmlns.com/foaf/0.1/name";

pub struct TestEngine {
    pub engine: LdpEngine,
    // Keeps the binary directory alive for the engine's lifetime
    _dir: TempDir,
}

impl std::ops::Deref for TestEngine {
    type Target = LdpEngine;

    fn deref(&self) -> &LdpEngine {
        &self.engine
    }
}

pub fn engine() -> TestEngine {
    let dir = TempDir::new().unwrap();
    let config = EngineConfig {
        base_uri: BASE.to_string(),
        binary_dir: dir.path().to_path_buf(),
        ..EngineConfig::default()
    };
    let engine = LdpEngine::in_memory(config).unwrap();
    engine.ensure_root_container().unwrap();
    TestEngine { engine, _dir: dir }
}

pub fn node(iri: &str) -> NamedNode {
    NamedNode::new(iri).unwrap()
}

/// Turtle for a resource carrying a foaf:name
pub fn named(name: &str) -> String {
    format!("<> <{}> \"{}\" .", NAME, name)
}

pub fn post_named(engine: &LdpEngine, container: &str, name: &str) -> String {
    let body = named(name);
    let request = WriteRequest::new(body.as_bytes(), "text/turtle", "alice").with_slug(name);
    engine.post(container, &request).unwrap()
}

/// GET `uri` as Turtle and parse the body back
pub fn fetch(engine: &LdpEngine, uri: &str) -> Graph {
    let representation = engine.get(uri, "text/turtle").unwrap();
    RdfCodec::new(None)
        .parse(&representation.body, "text/turtle", uri)
        .unwrap()
}

/// Stored graph, bypassing the engine
pub fn stored(engine: &LdpEngine, uri: &str) -> Option<Graph> {
    engine.store().begin_read().unwrap().get_graph(uri)
}

pub fn objects(graph: &Graph, subject: &str, predicate: &str) -> Vec<Term> {
    let subject = node(subject);
    let predicate = node(predicate);
    graph
        .objects(subject.as_ref(), predicate.as_ref())
        .into_iter()
        .cloned()
        .collect()
}

/// Follow the page chain from `?firstPage`; returns each page's members in order
pub fn walk_pages(engine: &LdpEngine, container: &str, predicate: &str) -> Vec<Vec<Term>> {
    let mut pages = Vec::new();
    let mut current = format!("{}?firstPage", container);
    for _ in 0..1000 {
        let graph = fetch(engine, &current);
        let page = node(&current);
        assert!(graph.has(page.as_ref(), rdf::TYPE, ldp::PAGE));
        assert!(graph.has(page.as_ref(), ldp::PAGE_OF, node(container).as_ref()));
        pages.push(objects(&graph, container, predicate));

        match graph.object(page.as_ref(), ldp::NEXT_PAGE) {
            Some(Term::NamedNode(next)) if next.as_ref() == rdf::NIL => return pages,
            Some(Term::NamedNode(next)) => current = next.as_str().to_string(),
            other => panic!("page {} has nextPage {:?}", current, other),
        }
    }
    panic!("page chain of {} does not terminate", container);
}
