//! Resource URI grammar
//!
//! A request URI is a resource URI optionally followed by one of the
//! reserved `?` suffixes: `?firstPage`, `?p=<n>`, `?non-member-properties`
//! or `?_config`. Any other query string names nothing.

use crate::error::{LdpError, LdpResult};
use oxrdf::NamedNode;
use std::fmt;

/// Reserved suffix of a request URI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suffix {
    /// The resource itself
    None,
    /// `?firstPage`, recomputed if the container is dirty
    FirstPage,
    /// `?p=<n>`, n ≥ 2
    Page(u64),
    /// `?non-member-properties`
    NonMemberProperties,
    /// `?_config`
    Config,
}

/// A parsed request URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUri {
    base: String,
    suffix: Suffix,
}

impl ResourceUri {
    /// Split a request URI into resource URI and suffix
    pub fn parse(uri: &str) -> LdpResult<Self> {
        let (base, suffix) = match uri.split_once('?') {
            None => (uri, Suffix::None),
            Some((base, query)) => {
                let suffix = match query {
                    "firstPage" => Suffix::FirstPage,
                    "non-member-properties" => Suffix::NonMemberProperties,
                    "_config" => Suffix::Config,
                    _ => match query.strip_prefix("p=").and_then(|n| n.parse::<u64>().ok()) {
                        Some(n) if n >= 2 => Suffix::Page(n),
                        _ => return Err(LdpError::not_found(uri)),
                    },
                };
                (base, suffix)
            }
        };
        NamedNode::new(base)?;
        Ok(Self {
            base: base.to_string(),
            suffix,
        })
    }

    /// The resource URI without suffix
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn suffix(&self) -> Suffix {
        self.suffix
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.suffix {
            Suffix::None => write!(f, "{}", self.base),
            Suffix::FirstPage => write!(f, "{}", first_page_uri(&self.base)),
            Suffix::Page(n) => write!(f, "{}", page_uri(&self.base, n)),
            Suffix::NonMemberProperties => write!(f, "{}?non-member-properties", self.base),
            Suffix::Config => write!(f, "{}", config_uri(&self.base)),
        }
    }
}

/// URI of the first page of `container`
pub fn first_page_uri(container: &str) -> String {
    format!("{}?firstPage", container)
}

/// URI of page `n` (1-based) of `container`
pub fn page_uri(container: &str, n: u64) -> String {
    if n <= 1 {
        first_page_uri(container)
    } else {
        format!("{}?p={}", container, n)
    }
}

/// URI of the config side graph of `uri`
pub fn config_uri(uri: &str) -> String {
    format!("{}?_config", uri)
}
