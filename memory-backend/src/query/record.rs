//! Shared identifier and result-decoding helpers used by every Query Layer
//! submodule.

use memory_core::{Error, RecordId, Result};
use serde::de::DeserializeOwned;
use surrealdb::sql::Thing;

/// Builds the `(tb, id)` variable pair a statement binds as
/// `type::thing($tb, $id)`, normalizing a caller-supplied id that may or may
/// not already carry a `table:` prefix (spec §9 "Record-identifier
/// normalisation").
pub(crate) fn id_variables(table: &'static str, raw_id: &str) -> Vec<(&'static str, serde_json::Value)> {
    let rid = RecordId::new(table, raw_id);
    vec![
        ("tb", serde_json::json!(table)),
        ("id", serde_json::json!(rid.bare())),
    ]
}

/// Re-qualifies a decoded [`Thing`] back into the `table:id` string form
/// every model type and tool response exposes to callers (spec §9: "the
/// session is responsible for mapping backend record identifiers to the
/// `table:id` string form exposed to callers" — this is that mapping's one
/// call site, mirrored with [`id_variables`] on the way in).
pub(crate) fn thing_id(thing: &Thing) -> String {
    format!("{}:{}", thing.tb, thing.id)
}

/// Decodes result set `index` of a response into `Vec<T>`, tagging any
/// decode failure as an internal error under `operation`.
pub(crate) fn take<T: DeserializeOwned>(
    response: &mut surrealdb::Response,
    index: usize,
    operation: &'static str,
) -> Result<Vec<T>> {
    response
        .take(index)
        .map_err(|e| Error::internal(operation, format!("failed to decode result set {index}: {e}")))
}

/// Decodes result set `index`, returning the first row only.
pub(crate) fn take_one<T: DeserializeOwned>(
    response: &mut surrealdb::Response,
    index: usize,
    operation: &'static str,
) -> Result<Option<T>> {
    Ok(take::<T>(response, index, operation)?.into_iter().next())
}
