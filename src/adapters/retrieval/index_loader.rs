//! Loads a regulation's vector index from disk, building it on first use.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

use crate::domain::compliance::ComplianceDomain;
use crate::ports::Embedder;

use super::text_splitter::TextSplitter;
use super::vector_store::{IndexError, IndexedChunk, VectorStore};

const EMBED_BATCH_SIZE: usize = 64;

pub struct IndexLoader {
    data_dir: PathBuf,
    index_root: PathBuf,
    splitter: TextSplitter,
    embedder: Arc<dyn Embedder>,
}

impl IndexLoader {
    pub fn new(
        data_dir: impl AsRef<Path>,
        index_root: impl AsRef<Path>,
        splitter: TextSplitter,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            index_root: index_root.as_ref().to_path_buf(),
            splitter,
            embedder,
        }
    }

    pub fn embedder(&self) -> Arc<dyn Embedder> {
        Arc::clone(&self.embedder)
    }

    /// Bundled source text for a domain, e.g. `{data_dir}/gdpr.txt`.
    pub fn source_path(&self, domain: ComplianceDomain) -> PathBuf {
        self.data_dir.join(format!("{}.txt", domain.index_name()))
    }

    /// Returns the persisted index, or builds and persists it.
    ///
    /// An index produced with a different embedding model is rebuilt.
    pub async fn load_or_build(&self, domain: ComplianceDomain) -> Result<VectorStore, IndexError> {
        let name = domain.index_name();

        if let Some(store) = VectorStore::load(&self.index_root, name).await? {
            if store.model() == self.embedder.model_name() && !store.is_empty() {
                tracing::info!(index = name, chunks = store.len(), "Loaded vector index");
                return Ok(store);
            }
            tracing::warn!(
                index = name,
                stored_model = store.model(),
                current_model = self.embedder.model_name(),
                "Stored index does not match the embedding model, rebuilding"
            );
        }

        self.build(domain).await
    }

    /// Builds the index from source text and persists it, replacing any existing one.
    pub async fn build(&self, domain: ComplianceDomain) -> Result<VectorStore, IndexError> {
        let name = domain.index_name();
        let source_path = self.source_path(domain);

        let text = match fs::read_to_string(&source_path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(IndexError::MissingSource(source_path))
            }
            Err(e) => return Err(IndexError::Io(e.to_string())),
        };

        let source = source_path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        let pieces = self.splitter.split(&text);

        tracing::info!(
            index = name,
            chunks = pieces.len(),
            chunk_size = self.splitter.chunk_size(),
            chunk_overlap = self.splitter.chunk_overlap(),
            "Building vector index"
        );

        let mut store = VectorStore::new(name, self.embedder.model_name());
        for (batch_no, batch) in pieces.chunks(EMBED_BATCH_SIZE).enumerate() {
            let embeddings = self.embedder.embed_batch(batch).await?;
            for (offset, (text, embedding)) in batch.iter().zip(embeddings).enumerate() {
                store.insert(IndexedChunk {
                    text: text.clone(),
                    source: source.clone(),
                    chunk_index: batch_no * EMBED_BATCH_SIZE + offset,
                    embedding,
                });
            }
        }

        store.save(&self.index_root).await?;
        tracing::info!(index = name, chunks = store.len(), "Saved vector index");
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::retrieval::HashingEmbedder;
    use tempfile::TempDir;

    fn loader(dir: &TempDir, embedder: HashingEmbedder) -> IndexLoader {
        IndexLoader::new(
            dir.path().join("regulations-text"),
            dir.path().join("vector_dbs"),
            TextSplitter::new(100, 20),
            Arc::new(embedder),
        )
    }

    fn write_source(dir: &TempDir, file: &str, text: &str) {
        let data = dir.path().join("regulations-text");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(data.join(file), text).unwrap();
    }

    #[tokio::test]
    async fn builds_and_persists_when_missing() {
        let dir = TempDir::new().unwrap();
        write_source(&dir, "gdpr.txt", &"Article 6 Lawfulness of processing. ".repeat(20));

        let store = loader(&dir, HashingEmbedder::default())
            .load_or_build(ComplianceDomain::Gdpr)
            .await
            .unwrap();

        assert!(store.len() > 1);
        assert!(dir.path().join("vector_dbs/gdpr_index/index.json").exists());
    }

    #[tokio::test]
    async fn loads_existing_index_without_source() {
        let dir = TempDir::new().unwrap();
        write_source(&dir, "act.txt", "Article 5 Prohibited AI practices.");
        let built = loader(&dir, HashingEmbedder::default())
            .load_or_build(ComplianceDomain::AiAct)
            .await
            .unwrap();

        std::fs::remove_file(dir.path().join("regulations-text/act.txt")).unwrap();

        let loaded = loader(&dir, HashingEmbedder::default())
            .load_or_build(ComplianceDomain::AiAct)
            .await
            .unwrap();
        assert_eq!(loaded, built);
    }

    #[tokio::test]
    async fn rebuilds_when_model_differs() {
        let dir = TempDir::new().unwrap();
        write_source(&dir, "gdpr.txt", "Article 7 Conditions for consent.");
        loader(&dir, HashingEmbedder::new(16))
            .load_or_build(ComplianceDomain::Gdpr)
            .await
            .unwrap();

        let rebuilt = loader(&dir, HashingEmbedder::new(32))
            .load_or_build(ComplianceDomain::Gdpr)
            .await
            .unwrap();

        assert_eq!(rebuilt.model(), HashingEmbedder::new(32).model_name());
    }

    #[tokio::test]
    async fn missing_source_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = loader(&dir, HashingEmbedder::default())
            .load_or_build(ComplianceDomain::Gdpr)
            .await
            .unwrap_err();

        assert!(matches!(err, IndexError::MissingSource(p) if p.ends_with("gdpr.txt")));
    }

    #[tokio::test]
    async fn chunks_carry_source_and_position() {
        let dir = TempDir::new().unwrap();
        write_source(&dir, "gdpr.txt", &"Article 17 Right to erasure. ".repeat(10));

        let store = loader(&dir, HashingEmbedder::default())
            .build(ComplianceDomain::Gdpr)
            .await
            .unwrap();
        let query = HashingEmbedder::default().embed("erasure").await.unwrap();
        let results = store.search(&query, store.len());

        assert!(results.iter().all(|r| r.source == "gdpr.txt"));
        let mut indices: Vec<_> = results.iter().map(|r| r.chunk_index).collect();
        indices.sort();
        assert_eq!(indices, (0..store.len()).collect::<Vec<_>>());
    }
}
