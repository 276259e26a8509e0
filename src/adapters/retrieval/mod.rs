//! Retrieval Adapters
//!
//! Everything behind the `Retriever` port: splitting regulation text into
//! chunks, embedding them, persisting flat vector indices and searching them.
//!
//! ```ignore
//! let loader = IndexLoader::new("regulations-text", "vector_dbs", TextSplitter::new(100, 20), embedder.clone());
//! let store = loader.load_or_build(ComplianceDomain::Gdpr).await?;
//! let retriever = VectorStoreRetriever::new(store, embedder).with_top_k(4);
//! ```

mod fastembed_embedder;
mod hashing_embedder;
mod index_loader;
mod ollama_embedder;
mod retriever;
mod text_splitter;
mod vector_store;

pub use fastembed_embedder::{fastembed_model, FastEmbedEmbedder, DEFAULT_FASTEMBED_MODEL};
pub use hashing_embedder::{HashingEmbedder, DEFAULT_DIMENSION};
pub use index_loader::IndexLoader;
pub use ollama_embedder::OllamaEmbedder;
pub use retriever::{VectorStoreRetriever, DEFAULT_TOP_K};
pub use text_splitter::{TextSplitter, DEFAULT_SEPARATORS};
pub use vector_store::{cosine_similarity, IndexError, IndexedChunk, VectorStore};
