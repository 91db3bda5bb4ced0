//! Version-sensitive SurrealQL fragments, isolated behind one file so a
//! backend version bump edits this module instead of every Query Layer
//! function (spec §9 "Backend version dependence").

/// Vector distance helper. SurrealDB 2.x exposes
/// `vector::similarity::cosine`; earlier releases used
/// `vector::distance::cosine` (and returned a distance, not a similarity).
/// Centralising the function name here means a downgrade only touches this
/// constant plus its sign convention, not every retrieval query.
pub const COSINE_SIMILARITY_FN: &str = "vector::similarity::cosine";

/// Full-text match operator. `@@` is the SurrealDB full-text search
/// operator against a `SEARCH` (BM25) index.
pub const FULLTEXT_MATCH_OP: &str = "@@";

/// BM25 relevance helper exposed alongside a `@@` match.
pub const BM25_SCORE_FN: &str = "search::score";
