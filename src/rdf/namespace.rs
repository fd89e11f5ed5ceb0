//! Vocabulary used by the resource engines
//!
//! Terms are `NamedNodeRef` constants in the style of `oxrdf::vocab`.

pub use oxrdf::vocab::{rdf, xsd};

/// W3C Linked Data Platform vocabulary
pub mod ldp {
    use oxrdf::NamedNodeRef;

    pub const NAMESPACE: &str = "http://www.w3.org/ns/ldp#";

    pub const RESOURCE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#Resource");
    pub const RDF_SOURCE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#RDFSource");
    pub const NON_RDF_SOURCE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#NonRDFSource");
    pub const CONTAINER: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#Container");
    pub const BASIC_CONTAINER: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#BasicContainer");
    pub const DIRECT_CONTAINER: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#DirectContainer");
    pub const INDIRECT_CONTAINER: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#IndirectContainer");

    pub const CONTAINS: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#contains");
    pub const HAS_MEMBER_RELATION: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#hasMemberRelation");
    pub const MEMBERSHIP_RESOURCE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#membershipResource");
    /// Older spelling of `hasMemberRelation`
    pub const MEMBERSHIP_PREDICATE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#membershipPredicate");
    /// Older spelling of `membershipResource`
    pub const MEMBERSHIP_SUBJECT: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#membershipSubject");
    pub const INSERTED_CONTENT_RELATION: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#insertedContentRelation");

    pub const PAGE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#Page");
    pub const PAGE_OF: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#pageOf");
    pub const NEXT_PAGE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#nextPage");
    pub const PAGE_SORT_PREDICATES: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#pageSortPredicates");
}

/// RDF Schema terms
pub mod rdfs {
    use oxrdf::NamedNodeRef;

    pub const MEMBER: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#member");
}

/// Dublin Core terms used for resource metadata
pub mod dcterms {
    use oxrdf::NamedNodeRef;

    pub const CREATOR: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/terms/creator");
    pub const CONTRIBUTOR: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/terms/contributor");
    pub const CREATED: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/terms/created");
    pub const MODIFIED: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/terms/modified");
}

/// Engine configuration terms, read from `<uri>?_config` side graphs
pub mod cfg {
    use oxrdf::NamedNodeRef;

    pub const NAMESPACE: &str = "http://samyama.ai/ns/ldp/config#";

    pub const MEMBER_INFO: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://samyama.ai/ns/ldp/config#memberInfo");
    pub const MEMBER_FILTER: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://samyama.ai/ns/ldp/config#memberFilter");
    pub const PAGE_SIZE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://samyama.ai/ns/ldp/config#pageSize");
    pub const PAGE_SORT_PREDICATES: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://samyama.ai/ns/ldp/config#pageSortPredicates");
    pub const RESOURCE_URI_PREFIX: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://samyama.ai/ns/ldp/config#resourceURIPrefix");

    pub const CONTENT_TYPE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://samyama.ai/ns/ldp/config#contentType");
    pub const FILENAME: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://samyama.ai/ns/ldp/config#filename");
    pub const CONTAINER: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://samyama.ai/ns/ldp/config#container");
    pub const DELETED: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://samyama.ai/ns/ldp/config#deleted");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_live_in_their_namespace() {
        assert!(ldp::CONTAINS.as_str().starts_with(ldp::NAMESPACE));
        assert!(ldp::NEXT_PAGE.as_str().starts_with(ldp::NAMESPACE));
        assert!(cfg::PAGE_SIZE.as_str().starts_with(cfg::NAMESPACE));
        assert!(cfg::DELETED.as_str().starts_with(cfg::NAMESPACE));
    }

    #[test]
    fn test_terms_are_valid_iris() {
        for term in [ldp::PAGE, rdfs::MEMBER, dcterms::MODIFIED, cfg::MEMBER_INFO] {
            assert!(oxrdf::NamedNode::new(term.as_str()).is_ok());
        }
    }
}
