use anyhow::Context;
use samyama_ldp::{
    ContainerConfig, EngineConfig, LdpEngine, NamedNode, ResourceKind, ResultFormat, WriteRequest,
};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_file(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => EngineConfig::default(),
    };

    println!("Samyama LDP v{}", samyama_ldp::version());
    println!("==========================================");
    println!();

    let engine = LdpEngine::in_memory(config)?;
    if engine.ensure_root_container()? {
        println!("✓ Created root container {}", engine.config().base_uri);
    }

    demo_paging(&engine)?;
    demo_binary(&engine)?;
    demo_query(&engine)?;

    println!("\n✅ Demo finished");
    Ok(())
}

fn demo_paging(engine: &LdpEngine) -> anyhow::Result<()> {
    println!("=== Demo 1: Container paging ===");
    let base = engine.config().base_uri.clone();
    let container = format!("{}people", base);
    let config = ContainerConfig::new()
        .with_page_size(2)
        .with_sort_predicates(vec![NamedNode::new("http://xmlns.com/foaf/0.1/name")?]);
    engine.create_container(&container, ResourceKind::BasicContainer, Some(config), "demo")?;
    println!("✓ Created {} (page size 2, sorted by foaf:name)", container);

    for name in ["Charlie", "Alice", "Bob"] {
        let turtle = format!("<> <http://xmlns.com/foaf/0.1/name> \"{}\" .", name);
        let request = WriteRequest::new(turtle.as_bytes(), "text/turtle", "demo")
            .with_slug(name);
        let uri = engine.post(&container, &request)?;
        println!("✓ Posted {}", uri);
    }

    let mut next = Some(format!("{}?firstPage", container));
    while let Some(page) = next.take() {
        let representation = engine.get(&page, "text/turtle")?;
        let body = String::from_utf8(representation.body)?;
        println!("\n--- {} (ETag {}) ---\n{}", page, representation.etag, body);
        let candidate = format!("{}?p=", container);
        next = body
            .split(|c: char| c == '<' || c == '>')
            .find(|token| token.starts_with(&candidate) && *token != page)
            .map(str::to_string);
    }
    Ok(())
}

fn demo_binary(engine: &LdpEngine) -> anyhow::Result<()> {
    println!("\n=== Demo 2: Non-RDF resources ===");
    let base = engine.config().base_uri.clone();
    let request = WriteRequest::new(b"plain bytes", "text/plain", "demo").with_slug("notes.txt");
    let uri = engine.post(&base, &request)?;
    let representation = engine.get(&uri, "*/*")?;
    println!(
        "✓ Stored {} ({}, ETag {})",
        uri, representation.content_type, representation.etag
    );
    Ok(())
}

fn demo_query(engine: &LdpEngine) -> anyhow::Result<()> {
    println!("\n=== Demo 3: SPARQL passthrough ===");
    let query = "SELECT ?s ?name WHERE { GRAPH ?g { ?s <http://xmlns.com/foaf/0.1/name> ?name } } ORDER BY ?name";
    let out = engine.query(Vec::new(), query, ResultFormat::Json)?;
    println!("{}", String::from_utf8(out)?);
    Ok(())
}
