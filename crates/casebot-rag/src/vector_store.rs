//! Vector store implementations
//!
//! Both stores rank by cosine similarity: a higher score means a more relevant
//! document.

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, DeleteCollectionBuilder, Distance, PointStruct,
    ScoredPoint, SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue,
    VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use casebot_core::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use casebot_core::{
    Embedder, Error, Result, SearchConfig, SearchResult, VectorDocument, VectorStore,
};

use crate::embedding::{HashEmbedder, cosine_similarity};

/// Payload key holding the document text, as LangChain writes it
const CONTENT_KEY: &str = "page_content";
const METADATA_KEY: &str = "metadata";
const DOC_ID_KEY: &str = "doc_id";

/// Local in-memory vector store.
///
/// Results are ordered by descending score; equal scores are ordered by
/// ascending document id so repeated searches return the same ranking.
pub struct LocalVectorStore {
    documents: Arc<RwLock<HashMap<String, VectorDocument>>>,
    embedder: Arc<dyn Embedder>,
    collection_name: String,
    connected: bool,
}

impl LocalVectorStore {
    /// Create a new local vector store using the offline hash embedder
    pub fn new() -> Self {
        Self::with_embedder(Arc::new(HashEmbedder::new()))
    }

    pub fn with_embedder(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
            embedder,
            collection_name: "local".to_string(),
            connected: false,
        }
    }

    pub fn with_collection(mut self, name: impl Into<String>) -> Self {
        self.collection_name = name.into();
        self
    }

    async fn embedded(&self, mut document: VectorDocument) -> Result<VectorDocument> {
        if document.embedding.is_none() {
            document.embedding = Some(self.embedder.embed(&document.content).await?);
        }
        Ok(document)
    }

    fn lock_error<E: std::fmt::Display>(e: E) -> Error {
        Error::Retrieval(format!("Lock error: {}", e))
    }
}

impl Default for LocalVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn connect(&mut self) -> Result<()> {
        self.connected = true;
        Ok(())
    }

    async fn store(&self, document: VectorDocument) -> Result<String> {
        let document = self.embedded(document).await?;
        let id = document.id.clone();
        let mut docs = self.documents.write().map_err(Self::lock_error)?;
        docs.insert(id.clone(), document);
        Ok(id)
    }

    async fn store_batch(&self, documents: Vec<VectorDocument>) -> Result<Vec<String>> {
        let mut embedded = Vec::with_capacity(documents.len());
        for document in documents {
            embedded.push(self.embedded(document).await?);
        }

        let mut docs = self.documents.write().map_err(Self::lock_error)?;
        let ids = embedded
            .into_iter()
            .map(|document| {
                let id = document.id.clone();
                docs.insert(id.clone(), document);
                id
            })
            .collect();
        Ok(ids)
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<SearchResult> {
        if !self.connected {
            return Err(Error::Retrieval("Vector store not connected".to_string()));
        }

        let query_embedding = self.embedder.embed(query).await?;
        let docs = self.documents.read().map_err(Self::lock_error)?;

        let mut results: Vec<VectorDocument> = docs
            .values()
            .filter_map(|doc| {
                let embedding = doc.embedding.as_ref()?;
                let score = cosine_similarity(&query_embedding, embedding);
                Some(VectorDocument {
                    score: Some(score),
                    ..doc.clone()
                })
            })
            .filter(|doc| match config.score_threshold {
                Some(threshold) => doc.score.unwrap_or(0.0) >= threshold,
                None => true,
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .total_cmp(&a.score.unwrap_or(0.0))
                .then_with(|| a.id.cmp(&b.id))
        });
        results.truncate(config.top_k);

        let total = results.len();
        Ok(SearchResult {
            documents: results,
            total,
        })
    }

    async fn clear(&self) -> Result<()> {
        let mut docs = self.documents.write().map_err(Self::lock_error)?;
        docs.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let docs = self.documents.read().map_err(Self::lock_error)?;
        Ok(docs.len())
    }

    fn collection_name(&self) -> &str {
        &self.collection_name
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Qdrant-backed vector store.
///
/// The collection is expected to exist already (it is created by the
/// ingestion scripts); `connect` fails if it does not. Ranking and tie
/// breaking are Qdrant's.
pub struct QdrantVectorStore {
    url: String,
    collection_name: String,
    embedder: Arc<dyn Embedder>,
    timeout: Duration,
    client: Option<Qdrant>,
}

impl QdrantVectorStore {
    pub fn new(url: impl Into<String>, collection_name: impl Into<String>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            url: url.into(),
            collection_name: collection_name.into(),
            embedder,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            client: None,
        }
    }

    /// Bound every request, including the initial connection
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn client(&self) -> Result<&Qdrant> {
        self.client
            .as_ref()
            .ok_or_else(|| Error::Retrieval("Vector store not connected".to_string()))
    }

    fn qdrant_error(e: qdrant_client::QdrantError) -> Error {
        Error::Retrieval(e.to_string())
    }

    /// Stable Qdrant point id derived from the document id
    fn point_id(doc_id: &str) -> String {
        Uuid::from_bytes(md5::compute(doc_id.as_bytes()).0).to_string()
    }

    async fn to_point(&self, document: VectorDocument) -> Result<PointStruct> {
        let embedding = match document.embedding {
            Some(embedding) => embedding,
            None => self.embedder.embed(&document.content).await?,
        };

        let mut payload: HashMap<String, QdrantValue> = HashMap::new();
        payload.insert(CONTENT_KEY.to_string(), document.content.into());
        payload.insert(METADATA_KEY.to_string(), document.metadata.into());
        payload.insert(DOC_ID_KEY.to_string(), document.id.clone().into());

        Ok(PointStruct::new(Self::point_id(&document.id), embedding, payload))
    }

    fn to_document(point: ScoredPoint) -> VectorDocument {
        let point_id = match point.id.and_then(|id| id.point_id_options) {
            Some(PointIdOptions::Uuid(uuid)) => uuid,
            Some(PointIdOptions::Num(num)) => num.to_string(),
            None => "unknown".to_string(),
        };

        let mut payload = point.payload;
        let content = payload
            .remove(CONTENT_KEY)
            .map(|v| match v.kind {
                Some(Kind::StringValue(s)) => s,
                _ => String::new(),
            })
            .unwrap_or_default();
        let id = match payload.remove(DOC_ID_KEY).and_then(|v| v.kind) {
            Some(Kind::StringValue(s)) => s,
            _ => point_id,
        };
        let metadata = payload
            .remove(METADATA_KEY)
            .map(|v| qdrant_to_json(&v))
            .unwrap_or(serde_json::Value::Null);

        VectorDocument {
            id,
            content,
            embedding: None,
            metadata,
            score: Some(point.score),
        }
    }
}

/// Convert a Qdrant payload value into JSON
fn qdrant_to_json(value: &QdrantValue) -> serde_json::Value {
    match &value.kind {
        Some(Kind::StringValue(s)) => json!(s),
        Some(Kind::IntegerValue(i)) => json!(i),
        Some(Kind::DoubleValue(d)) => json!(d),
        Some(Kind::BoolValue(b)) => json!(b),
        Some(Kind::StructValue(s)) => serde_json::Value::Object(
            s.fields
                .iter()
                .map(|(k, v)| (k.clone(), qdrant_to_json(v)))
                .collect(),
        ),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.iter().map(qdrant_to_json).collect())
        }
        Some(Kind::NullValue(_)) | None => serde_json::Value::Null,
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn connect(&mut self) -> Result<()> {
        let client = Qdrant::from_url(&self.url)
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .build()
            .map_err(Self::qdrant_error)?;

        let collections = client.list_collections().await.map_err(Self::qdrant_error)?;
        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection_name);
        if !exists {
            return Err(Error::Retrieval(format!(
                "Collection '{}' does not exist at {}",
                self.collection_name, self.url
            )));
        }

        info!(url = %self.url, collection = %self.collection_name, "connected to Qdrant");
        self.client = Some(client);
        Ok(())
    }

    async fn store(&self, document: VectorDocument) -> Result<String> {
        let id = document.id.clone();
        self.store_batch(vec![document]).await?;
        Ok(id)
    }

    async fn store_batch(&self, documents: Vec<VectorDocument>) -> Result<Vec<String>> {
        let client = self.client()?;
        let ids: Vec<String> = documents.iter().map(|d| d.id.clone()).collect();

        let mut points = Vec::with_capacity(documents.len());
        for document in documents {
            points.push(self.to_point(document).await?);
        }

        client
            .upsert_points(UpsertPointsBuilder::new(&self.collection_name, points).wait(true))
            .await
            .map_err(Self::qdrant_error)?;
        Ok(ids)
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<SearchResult> {
        let client = self.client()?;
        let query_embedding = self.embedder.embed(query).await?;

        let mut request =
            SearchPointsBuilder::new(&self.collection_name, query_embedding, config.top_k as u64)
                .with_payload(true);
        if let Some(threshold) = config.score_threshold {
            request = request.score_threshold(threshold);
        }

        let response = client.search_points(request).await.map_err(Self::qdrant_error)?;
        let documents: Vec<VectorDocument> =
            response.result.into_iter().map(Self::to_document).collect();
        debug!(hits = documents.len(), collection = %self.collection_name, "qdrant search");

        let total = documents.len();
        Ok(SearchResult { documents, total })
    }

    async fn clear(&self) -> Result<()> {
        let client = self.client()?;
        client
            .delete_collection(DeleteCollectionBuilder::new(&self.collection_name))
            .await
            .map_err(Self::qdrant_error)?;
        client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection_name).vectors_config(
                    VectorParamsBuilder::new(self.embedder.dimension() as u64, Distance::Cosine),
                ),
            )
            .await
            .map_err(Self::qdrant_error)?;
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let client = self.client()?;
        let response = client
            .count(CountPointsBuilder::new(&self.collection_name).exact(true))
            .await
            .map_err(Self::qdrant_error)?;
        Ok(response.result.map(|r| r.count as usize).unwrap_or(0))
    }

    fn collection_name(&self) -> &str {
        &self.collection_name
    }

    fn is_connected(&self) -> bool {
        self.client.is_some()
    }
}
