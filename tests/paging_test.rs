mod common;

use common::*;
use samyama_ldp::rdf::namespace::{ldp, rdf, rdfs};
use samyama_ldp::{
    ContainerConfig, LdpEngine, LdpError, Literal, ResourceKind, Term, WriteRequest,
    WriteTransaction,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

const RANK: &str = "http://example.org/vocab#rank";

fn paged(engine: &LdpEngine, name: &str, config: ContainerConfig) -> String {
    let uri = format!("{}{}", BASE, name);
    engine
        .create_container(&uri, ResourceKind::BasicContainer, Some(config), "alice")
        .unwrap();
    uri
}

fn terms(uris: &[String]) -> Vec<Term> {
    uris.iter().map(|u| Term::from(node(u))).collect()
}

#[test]
fn test_five_members_page_size_two() {
    let engine = engine();
    let container = paged(&engine, "a", ContainerConfig::new().with_page_size(2));
    let m: Vec<String> = (1..=5)
        .map(|i| post_named(&engine, &container, &format!("m{}", i)))
        .collect();

    let first = fetch(&engine, &format!("{}?firstPage", container));
    let first_node = node(&format!("{}?firstPage", container));
    assert_eq!(objects(&first, &container, rdfs::MEMBER.as_str()), terms(&m[0..2]));
    assert_eq!(
        first.object(first_node.as_ref(), ldp::NEXT_PAGE),
        Some(&Term::from(node(&format!("{}?p=2", container))))
    );

    let page_a = fetch(&engine, &format!("{}?p=2", container));
    assert_eq!(objects(&page_a, &container, rdfs::MEMBER.as_str()), terms(&m[2..4]));
    assert_eq!(
        page_a.object(node(&format!("{}?p=2", container)).as_ref(), ldp::NEXT_PAGE),
        Some(&Term::from(node(&format!("{}?p=3", container))))
    );

    let page_b = fetch(&engine, &format!("{}?p=3", container));
    assert_eq!(objects(&page_b, &container, rdfs::MEMBER.as_str()), terms(&m[4..5]));
    assert_eq!(
        page_b.object(node(&format!("{}?p=3", container)).as_ref(), ldp::NEXT_PAGE),
        Some(&rdf::NIL.into_owned().into())
    );

    assert!(matches!(
        engine.get(&format!("{}?p=4", container), "text/turtle"),
        Err(LdpError::NotFound(_))
    ));
}

#[test]
fn test_pages_cover_every_member_exactly_once() {
    for page_size in [1, 2, 3, 7, 10] {
        for count in [0, 1, 6, 10, 11] {
            let engine = engine();
            let container = paged(
                &engine,
                "c",
                ContainerConfig::new().with_page_size(page_size),
            );
            let posted: Vec<String> = (0..count)
                .map(|i| post_named(&engine, &container, &format!("m{}", i)))
                .collect();

            // Unsorted pages list members by URI
            let mut expected = posted.clone();
            expected.sort();

            let pages = walk_pages(&engine, &container, rdfs::MEMBER.as_str());
            let listed: Vec<Term> = pages.iter().flatten().cloned().collect();
            assert_eq!(listed, terms(&expected), "page size {} with {} members", page_size, count);

            let unique: HashSet<&Term> = listed.iter().collect();
            assert_eq!(unique.len(), count);
            let expected_pages = if count == 0 { 1 } else { (count + page_size - 1) / page_size };
            assert_eq!(pages.len(), expected_pages);
            assert!(pages.iter().skip(1).all(|page| !page.is_empty()));
        }
    }
}

#[test]
fn test_exact_multiple_has_no_trailing_page() {
    let engine = engine();
    let container = paged(&engine, "exact", ContainerConfig::new().with_page_size(3));
    for i in 0..6 {
        post_named(&engine, &container, &format!("m{}", i));
    }

    let pages = walk_pages(&engine, &container, rdfs::MEMBER.as_str());
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1].len(), 3);
    assert!(stored(&engine, &format!("{}?p=3", container)).is_none());
}

#[test]
fn test_empty_container_first_page() {
    let engine = engine();
    let container = paged(&engine, "empty", ContainerConfig::new());
    let pages = walk_pages(&engine, &container, rdfs::MEMBER.as_str());
    assert_eq!(pages, vec![Vec::<Term>::new()]);
}

#[test]
fn test_sort_predicates_order_pages() {
    let engine = engine();
    let config = ContainerConfig::new()
        .with_page_size(2)
        .with_sort_predicates(vec![node(RANK), node(NAME)]);
    let container = paged(&engine, "sorted", config);

    let mut expected = Vec::new();
    for (rank, name) in [(3, "c"), (1, "z"), (2, "b"), (1, "a"), (10, "d")] {
        let body = format!(
            "<> <{}> {} ; <{}> \"{}\" .",
            RANK, rank, NAME, name
        );
        let request = WriteRequest::new(body.as_bytes(), "text/turtle", "alice").with_slug(name);
        let uri = engine.post(&container, &request).unwrap();
        expected.push(((rank, name), uri));
    }
    expected.sort();
    let expected: Vec<String> = expected.into_iter().map(|(_, uri)| uri).collect();

    let pages = walk_pages(&engine, &container, rdfs::MEMBER.as_str());
    let listed: Vec<Term> = pages.into_iter().flatten().collect();
    assert_eq!(listed, terms(&expected));

    let first = fetch(&engine, &format!("{}?firstPage", container));
    let head = first
        .object(node(&format!("{}?firstPage", container)).as_ref(), ldp::PAGE_SORT_PREDICATES)
        .cloned()
        .unwrap();
    assert_eq!(first.read_list(&head), vec![Term::from(node(RANK)), Term::from(node(NAME))]);
}

#[test]
fn test_members_without_sort_value_are_listed() {
    let engine = engine();
    let config = ContainerConfig::new()
        .with_page_size(10)
        .with_sort_predicates(vec![node(RANK)]);
    let container = paged(&engine, "partial", config);

    let ranked = {
        let body = format!("<> <{}> 5 .", RANK);
        let request = WriteRequest::new(body.as_bytes(), "text/turtle", "alice");
        engine.post(&container, &request).unwrap()
    };
    let unranked = post_named(&engine, &container, "nobody");

    let pages = walk_pages(&engine, &container, rdfs::MEMBER.as_str());
    assert_eq!(pages, vec![terms(&[unranked, ranked])]);
}

#[test]
fn test_first_page_reflects_every_mutation() {
    let engine = engine();
    let config = ContainerConfig::new()
        .with_page_size(2)
        .with_sort_predicates(vec![node(NAME)]);
    let container = paged(&engine, "fresh", config);
    let first_uri = format!("{}?firstPage", container);

    let b = post_named(&engine, &container, "b");
    assert_eq!(walk_pages(&engine, &container, rdfs::MEMBER.as_str()), vec![terms(&[b.clone()])]);

    let a = post_named(&engine, &container, "a");
    assert_eq!(
        walk_pages(&engine, &container, rdfs::MEMBER.as_str()),
        vec![terms(&[a.clone(), b.clone()])]
    );

    // Renaming a member reorders the pages
    let body = named("c");
    engine
        .put(&a, &WriteRequest::new(body.as_bytes(), "text/turtle", "alice"))
        .unwrap();
    assert_eq!(
        walk_pages(&engine, &container, rdfs::MEMBER.as_str()),
        vec![terms(&[b.clone(), a.clone()])]
    );

    let etag_before = engine.get(&first_uri, "text/turtle").unwrap().etag;
    engine.delete(&b).unwrap();
    let after = engine.get(&first_uri, "text/turtle").unwrap();
    assert_ne!(after.etag, etag_before);
    assert_eq!(
        walk_pages(&engine, &container, rdfs::MEMBER.as_str()),
        vec![terms(&[a])]
    );
}

#[test]
fn test_page_carries_container_properties_and_member_info() {
    let engine = engine();
    let config = ContainerConfig::new()
        .with_page_size(1)
        .with_member_info(None);
    let container = paged(&engine, "info", config);
    let first = post_named(&engine, &container, "one");
    let second = post_named(&engine, &container, "two");

    let page = fetch(&engine, &format!("{}?firstPage", container));
    assert!(page.has(node(&container).as_ref(), rdf::TYPE, ldp::BASIC_CONTAINER));
    assert!(objects(&page, &container, ldp::CONTAINS.as_str()).is_empty());
    assert_eq!(
        objects(&page, &first, NAME),
        vec![Term::from(Literal::new_simple_literal("one"))]
    );
    assert!(objects(&page, &second, NAME).is_empty());
}

#[test]
fn test_concurrent_first_page_requests() {
    let engine = Arc::new(engine());
    let container = paged(&engine, "busy", ContainerConfig::new().with_page_size(4));
    for i in 0..9 {
        post_named(&engine, &container, &format!("m{}", i));
    }

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let uri = format!("{}?firstPage", container);
            thread::spawn(move || engine.get(&uri, "text/turtle").unwrap())
        })
        .collect();
    let bodies: Vec<Vec<u8>> = handles
        .into_iter()
        .map(|h| h.join().unwrap().body)
        .collect();
    assert!(bodies.windows(2).all(|w| w[0] == w[1]));

    let pages = walk_pages(&engine, &container, rdfs::MEMBER.as_str());
    assert_eq!(pages.iter().map(Vec::len).collect::<Vec<_>>(), vec![4, 4, 1]);
}

#[test]
fn test_page_size_from_config_graph() {
    let engine = engine();
    let container = paged(&engine, "cfg", ContainerConfig::new());
    let config_uri = format!("{}?_config", container);
    {
        let mut graph = stored(&engine, &config_uri).unwrap();
        graph.set(
            node(&container).as_ref(),
            samyama_ldp::rdf::namespace::cfg::PAGE_SIZE,
            Literal::new_simple_literal("2"),
        );
        let mut tx = engine.store().begin_write().unwrap();
        tx.put_graph(&config_uri, graph).unwrap();
    }
    for i in 0..3 {
        post_named(&engine, &container, &format!("m{}", i));
    }
    let pages = walk_pages(&engine, &container, rdfs::MEMBER.as_str());
    assert_eq!(pages.len(), 2);
}

#[test]
fn test_unsorted_pages_are_stable_across_batches() {
    let engine = engine();
    let container = paged(&engine, "stable", ContainerConfig::new().with_page_size(3));
    let mut posted: Vec<String> = ["delta", "alpha", "echo", "charlie", "bravo", "foxtrot", "golf"]
        .iter()
        .map(|name| post_named(&engine, &container, name))
        .collect();
    posted.sort();

    let pages = walk_pages(&engine, &container, rdfs::MEMBER.as_str());
    assert_eq!(pages.iter().map(Vec::len).collect::<Vec<_>>(), vec![3, 3, 1]);
    assert_eq!(pages.into_iter().flatten().collect::<Vec<_>>(), terms(&posted));
}
