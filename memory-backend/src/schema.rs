//! Schema Installer (spec §4.8): idempotent creation of tables, vector and
//! full-text indexes, analyzers, and the relation uniqueness constraint.
//!
//! Every statement uses `IF NOT EXISTS`, so running `install` twice is a
//! no-op on the second call (spec §8 "Schema install applied twice is a
//! no-op"). Changing the embedding dimension requires recreating the
//! indexes — that is a documented operational constraint, not something
//! this installer attempts to migrate live (spec §4.8 final line).

use memory_core::{Error, Result};
use tracing::info;

use crate::session::BackendSession;

/// HNSW construction-quality parameter (`EFC`).
const HNSW_EFC: u32 = 150;
/// HNSW connectivity parameter (`M`).
const HNSW_M: u32 = 12;

/// Issues every `DEFINE TABLE` / `DEFINE FIELD` / `DEFINE INDEX` /
/// `DEFINE ANALYZER` statement needed before the Tool Dispatcher accepts its
/// first call (spec §5 "Schema installation happens before the dispatcher
/// accepts any tool call").
pub async fn install(session: &BackendSession, embedding_dimension: usize) -> Result<()> {
    info!(dimension = embedding_dimension, "installing schema");

    run(session, ANALYZER_DDL).await?;
    run(session, ENTITY_DDL).await?;
    run(session, &entity_vector_index_ddl(embedding_dimension)).await?;
    run(session, EPISODE_DDL).await?;
    run(session, &episode_vector_index_ddl(embedding_dimension)).await?;
    run(session, PROCEDURE_DDL).await?;
    run(session, &procedure_vector_index_ddl(embedding_dimension)).await?;
    run(session, RELATION_DDL).await?;
    run(session, MENTIONS_DDL).await?;

    info!("schema install complete");
    Ok(())
}

async fn run(session: &BackendSession, statement: &str) -> Result<()> {
    session
        .query(statement, Vec::<(&'static str, serde_json::Value)>::new())
        .await
        .map_err(|e| Error::internal("schema_install", format!("{e}")))?;
    Ok(())
}

const ANALYZER_DDL: &str = r"
DEFINE ANALYZER IF NOT EXISTS memory_text
    TOKENIZERS class
    FILTERS lowercase, snowball(english);
";

const ENTITY_DDL: &str = r"
DEFINE TABLE IF NOT EXISTS entity SCHEMALESS;
DEFINE FIELD IF NOT EXISTS type ON entity TYPE string;
DEFINE FIELD IF NOT EXISTS labels ON entity TYPE array<string> DEFAULT [];
DEFINE FIELD IF NOT EXISTS content ON entity TYPE string;
DEFINE FIELD IF NOT EXISTS embedding ON entity TYPE array<float>;
DEFINE FIELD IF NOT EXISTS confidence ON entity TYPE float DEFAULT 1.0;
DEFINE FIELD IF NOT EXISTS source ON entity TYPE option<string>;
DEFINE FIELD IF NOT EXISTS decay_weight ON entity TYPE float DEFAULT 1.0;
DEFINE FIELD IF NOT EXISTS context ON entity TYPE option<string>;
DEFINE FIELD IF NOT EXISTS importance ON entity TYPE float DEFAULT 1.0;
DEFINE FIELD IF NOT EXISTS accessed ON entity TYPE datetime DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS access_count ON entity TYPE int DEFAULT 0;
DEFINE FIELD IF NOT EXISTS created ON entity TYPE datetime DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS updated ON entity TYPE datetime DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_entity_context ON entity FIELDS context;
DEFINE INDEX IF NOT EXISTS idx_entity_type ON entity FIELDS type;
DEFINE INDEX IF NOT EXISTS idx_entity_content_fts ON entity
    FIELDS content SEARCH ANALYZER memory_text BM25 HIGHLIGHTS;
";

fn entity_vector_index_ddl(dimension: usize) -> String {
    format!(
        "DEFINE INDEX IF NOT EXISTS idx_entity_embedding ON entity \
         FIELDS embedding HNSW DIMENSION {dimension} DIST COSINE EFC {HNSW_EFC} M {HNSW_M};"
    )
}

const EPISODE_DDL: &str = r"
DEFINE TABLE IF NOT EXISTS episode SCHEMALESS;
DEFINE FIELD IF NOT EXISTS content ON episode TYPE string;
DEFINE FIELD IF NOT EXISTS summary ON episode TYPE option<string>;
DEFINE FIELD IF NOT EXISTS context ON episode TYPE option<string>;
DEFINE FIELD IF NOT EXISTS timestamp ON episode TYPE datetime DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS embedding ON episode TYPE array<float>;
DEFINE FIELD IF NOT EXISTS access_count ON episode TYPE int DEFAULT 0;
DEFINE FIELD IF NOT EXISTS metadata ON episode TYPE object DEFAULT {};
DEFINE INDEX IF NOT EXISTS idx_episode_context ON episode FIELDS context;
DEFINE INDEX IF NOT EXISTS idx_episode_timestamp ON episode FIELDS timestamp;
DEFINE INDEX IF NOT EXISTS idx_episode_content_fts ON episode
    FIELDS content SEARCH ANALYZER memory_text BM25 HIGHLIGHTS;
";

fn episode_vector_index_ddl(dimension: usize) -> String {
    format!(
        "DEFINE INDEX IF NOT EXISTS idx_episode_embedding ON episode \
         FIELDS embedding HNSW DIMENSION {dimension} DIST COSINE EFC {HNSW_EFC} M {HNSW_M};"
    )
}

const PROCEDURE_DDL: &str = r"
DEFINE TABLE IF NOT EXISTS procedure SCHEMALESS;
DEFINE FIELD IF NOT EXISTS name ON procedure TYPE string;
DEFINE FIELD IF NOT EXISTS description ON procedure TYPE string;
DEFINE FIELD IF NOT EXISTS steps ON procedure TYPE array DEFAULT [];
DEFINE FIELD IF NOT EXISTS embedding ON procedure TYPE array<float>;
DEFINE FIELD IF NOT EXISTS labels ON procedure TYPE array<string> DEFAULT [];
DEFINE FIELD IF NOT EXISTS context ON procedure TYPE option<string>;
DEFINE FIELD IF NOT EXISTS access_count ON procedure TYPE int DEFAULT 0;
DEFINE FIELD IF NOT EXISTS lexical_text ON procedure TYPE string DEFAULT '';
DEFINE INDEX IF NOT EXISTS idx_procedure_context ON procedure FIELDS context;
DEFINE INDEX IF NOT EXISTS idx_procedure_lexical_fts ON procedure
    FIELDS lexical_text SEARCH ANALYZER memory_text BM25 HIGHLIGHTS;
";

fn procedure_vector_index_ddl(dimension: usize) -> String {
    format!(
        "DEFINE INDEX IF NOT EXISTS idx_procedure_embedding ON procedure \
         FIELDS embedding HNSW DIMENSION {dimension} DIST COSINE EFC {HNSW_EFC} M {HNSW_M};"
    )
}

const RELATION_DDL: &str = r"
DEFINE TABLE IF NOT EXISTS relates SCHEMALESS TYPE RELATION IN entity OUT entity;
DEFINE FIELD IF NOT EXISTS rel_type ON relates TYPE string;
DEFINE FIELD IF NOT EXISTS weight ON relates TYPE float DEFAULT 0.5;
DEFINE FIELD IF NOT EXISTS metadata ON relates TYPE object DEFAULT {};
DEFINE INDEX IF NOT EXISTS idx_relates_unique ON relates
    FIELDS in, out, rel_type UNIQUE;
";

const MENTIONS_DDL: &str = r"
DEFINE TABLE IF NOT EXISTS mentions SCHEMALESS TYPE RELATION IN episode OUT entity;
DEFINE INDEX IF NOT EXISTS idx_mentions_unique ON mentions FIELDS in, out UNIQUE;
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_index_ddl_embeds_the_configured_dimension() {
        let ddl = entity_vector_index_ddl(384);
        assert!(ddl.contains("DIMENSION 384"));
        assert!(ddl.contains("DIST COSINE"));
        assert!(ddl.contains(&format!("EFC {HNSW_EFC}")));
        assert!(ddl.contains(&format!("M {HNSW_M}")));
    }

    #[test]
    fn relation_ddl_declares_the_uniqueness_constraint() {
        assert!(RELATION_DDL.contains("UNIQUE"));
        assert!(RELATION_DDL.contains("in, out, rel_type"));
    }
}
