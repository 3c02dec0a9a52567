//! Organization handle.

/// An organization that configures which relays it trusts.
///
/// Only the identifier is used for option lookups; the slug is carried for
/// log output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Organization {
    /// Unique organization identifier.
    pub id: i64,
    /// Human-readable short name.
    pub slug: String,
}

impl Organization {
    /// Creates a new organization handle.
    #[must_use]
    pub fn new(id: i64, slug: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_fields() {
        let org = Organization::new(7, "acme");
        assert_eq!(org.id, 7);
        assert_eq!(org.slug, "acme");
    }
}
