//! In-memory RDF graph
//!
//! A graph is a set of triples kept in insertion order, so serializing the
//! same graph twice yields the same bytes. Lookups are linear scans; resource
//! graphs are small and the store indexes graphs by name, not by term.

use indexmap::IndexSet;
use oxrdf::vocab::rdf;
use oxrdf::{BlankNode, NamedNodeRef, Subject, SubjectRef, Term, TermRef, Triple};

/// A set of triples in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    triples: IndexSet<Triple>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple; returns false if it was already present
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    /// Remove a triple, keeping the order of the others
    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.shift_remove(triple)
    }

    /// Check if a triple is present
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Number of triples
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Add every triple of `other` that is not already present
    pub fn merge(&mut self, other: &Graph) {
        for triple in other.iter() {
            self.triples.insert(triple.clone());
        }
    }

    /// Triples with the given subject and predicate
    pub fn triples_for<'a>(
        &'a self,
        subject: impl Into<SubjectRef<'a>>,
        predicate: impl Into<NamedNodeRef<'a>>,
    ) -> impl Iterator<Item = &'a Triple> {
        let subject = subject.into();
        let predicate = predicate.into();
        self.triples
            .iter()
            .filter(move |t| t.subject.as_ref() == subject && t.predicate.as_ref() == predicate)
    }

    /// First object for (subject, predicate)
    pub fn object<'a>(
        &'a self,
        subject: impl Into<SubjectRef<'a>>,
        predicate: impl Into<NamedNodeRef<'a>>,
    ) -> Option<&'a Term> {
        self.triples_for(subject, predicate).map(|t| &t.object).next()
    }

    /// All objects for (subject, predicate)
    pub fn objects<'a>(
        &'a self,
        subject: impl Into<SubjectRef<'a>>,
        predicate: impl Into<NamedNodeRef<'a>>,
    ) -> Vec<&'a Term> {
        self.triples_for(subject, predicate).map(|t| &t.object).collect()
    }

    /// Check for (subject, predicate, object)
    pub fn has<'a>(
        &self,
        subject: impl Into<SubjectRef<'a>>,
        predicate: impl Into<NamedNodeRef<'a>>,
        object: impl Into<TermRef<'a>>,
    ) -> bool {
        let subject = subject.into();
        let predicate = predicate.into();
        let object = object.into();
        self.triples.iter().any(|t| {
            t.subject.as_ref() == subject
                && t.predicate.as_ref() == predicate
                && t.object.as_ref() == object
        })
    }

    /// Remove every (subject, predicate, *) triple; returns how many went
    pub fn remove_all<'a>(
        &mut self,
        subject: impl Into<SubjectRef<'a>>,
        predicate: impl Into<NamedNodeRef<'a>>,
    ) -> usize {
        let subject = subject.into();
        let predicate = predicate.into();
        let before = self.triples.len();
        self.triples
            .retain(|t| !(t.subject.as_ref() == subject && t.predicate.as_ref() == predicate));
        before - self.triples.len()
    }

    /// Keep only the triples matching `keep`
    pub fn retain(&mut self, keep: impl FnMut(&Triple) -> bool) {
        self.triples.retain(keep);
    }

    /// Replace every (subject, predicate, *) with a single object
    pub fn set<'a>(
        &mut self,
        subject: impl Into<SubjectRef<'a>>,
        predicate: impl Into<NamedNodeRef<'a>>,
        object: impl Into<Term>,
    ) {
        let subject = subject.into();
        let predicate = predicate.into();
        self.remove_all(subject, predicate);
        self.triples.insert(Triple::new(
            subject.into_owned(),
            predicate.into_owned(),
            object.into(),
        ));
    }

    /// Write `items` as an RDF collection and return its head
    pub fn insert_list(&mut self, items: impl IntoIterator<Item = Term>) -> Term {
        let items: Vec<Term> = items.into_iter().collect();
        let mut head: Term = rdf::NIL.into_owned().into();
        for item in items.into_iter().rev() {
            let node = BlankNode::default();
            self.insert(Triple::new(node.clone(), rdf::FIRST.into_owned(), item));
            self.insert(Triple::new(node.clone(), rdf::REST.into_owned(), head));
            head = node.into();
        }
        head
    }

    /// Read an RDF collection starting at `head`
    ///
    /// Stops at `rdf:nil`, at a malformed cell, or when a cell repeats.
    pub fn read_list(&self, head: &Term) -> Vec<Term> {
        let mut items = Vec::new();
        let mut seen = IndexSet::new();
        let mut current = head.clone();
        loop {
            let subject = match &current {
                Term::NamedNode(n) if n.as_ref() == rdf::NIL => break,
                Term::NamedNode(n) => Subject::NamedNode(n.clone()),
                Term::BlankNode(b) => Subject::BlankNode(b.clone()),
                _ => break,
            };
            if !seen.insert(subject.clone()) {
                break;
            }
            let Some(first) = self.object(subject.as_ref(), rdf::FIRST) else {
                break;
            };
            items.push(first.clone());
            match self.object(subject.as_ref(), rdf::REST) {
                Some(rest) => current = rest.clone(),
                None => break,
            }
        }
        items
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = indexmap::set::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = indexmap::set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{Literal, NamedNode};

    fn node(iri: &str) -> NamedNode {
        NamedNode::new(iri).unwrap()
    }

    #[test]
    fn test_insert_and_duplicate() {
        let mut graph = Graph::new();
        let triple = Triple::new(
            node("http://example.org/alice"),
            node("http://xmlns.com/foaf/0.1/name"),
            Literal::new_simple_literal("Alice"),
        );

        assert!(graph.insert(triple.clone()));
        assert!(!graph.insert(triple.clone()));
        assert_eq!(graph.len(), 1);
        assert!(graph.remove(&triple));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut graph = Graph::new();
        let p = node("http://example.org/p");
        for i in [3, 1, 2] {
            graph.insert(Triple::new(
                node("http://example.org/s"),
                p.clone(),
                Literal::new_simple_literal(i.to_string()),
            ));
        }
        let values: Vec<String> = graph
            .iter()
            .map(|t| match &t.object {
                Term::Literal(l) => l.value().to_string(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(values, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_set_replaces_objects() {
        let mut graph = Graph::new();
        let s = node("http://example.org/s");
        let p = node("http://example.org/p");
        graph.insert(Triple::new(s.clone(), p.clone(), Literal::new_simple_literal("a")));
        graph.insert(Triple::new(s.clone(), p.clone(), Literal::new_simple_literal("b")));

        graph.set(s.as_ref(), p.as_ref(), Literal::new_simple_literal("c"));

        let objects = graph.objects(s.as_ref(), p.as_ref());
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0], &Term::from(Literal::new_simple_literal("c")));
    }

    #[test]
    fn test_list_round_trip() {
        let mut graph = Graph::new();
        let items: Vec<Term> = vec![
            node("http://example.org/p1").into(),
            node("http://example.org/p2").into(),
        ];
        let head = graph.insert_list(items.clone());
        assert_eq!(graph.read_list(&head), items);

        let empty = graph.insert_list(Vec::new());
        assert!(graph.read_list(&empty).is_empty());
    }
}
