//! `table:id` identifier normalization (spec §9 "Record-identifier
//! normalisation").
//!
//! Callers may pass either the fully-qualified `table:id` form or a bare
//! `id`. A single helper strips the table prefix before interpolation into a
//! parameterised query; the reverse mapping happens at result decoding, in
//! the Query Layer's adapter (`memory-backend`).

use std::fmt;

/// A normalized `table:id` record identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId {
    pub table: String,
    pub id: String,
}

impl RecordId {
    /// Builds a `RecordId` from a known table and either a bare id or an
    /// already-qualified `table:id` string. If the input is qualified with a
    /// *different* table, the caller's table still wins — this mirrors how
    /// the backend would reject the mismatch, but the Query Layer chooses to
    /// be lenient and only look at the trailing id segment, since a caller
    /// passing a whole `entity:foo` string to `get_entity` means "foo".
    #[must_use]
    pub fn new(table: &str, raw: &str) -> Self {
        let id = raw.rsplit_once(':').map_or(raw, |(_, id)| id);
        Self {
            table: table.to_string(),
            id: id.to_string(),
        }
    }

    /// Returns the bare id, stripped of any table prefix.
    #[must_use]
    pub fn bare(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.table, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_table_prefix_when_present() {
        let rid = RecordId::new("entity", "entity:pref-typescript");
        assert_eq!(rid.bare(), "pref-typescript");
        assert_eq!(rid.to_string(), "entity:pref-typescript");
    }

    #[test]
    fn accepts_bare_id() {
        let rid = RecordId::new("entity", "pref-typescript");
        assert_eq!(rid.bare(), "pref-typescript");
        assert_eq!(rid.to_string(), "entity:pref-typescript");
    }

    #[test]
    fn uses_caller_table_even_if_raw_carries_another() {
        // A caller that (mistakenly) passes an episode id into get_entity
        // still gets an entity: prefixed id back — the Query Layer does not
        // silently switch tables.
        let rid = RecordId::new("entity", "episode:123");
        assert_eq!(rid.bare(), "123");
        assert_eq!(rid.table, "entity");
    }
}
