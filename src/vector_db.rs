use async_trait::async_trait;
use mongodb::{
    bson::{doc, Bson, Document},
    Client,
};
use tracing::{debug, info};

use crate::{
    embeddings::Embedder,
    error::RagError,
    settings::{SearchSettings, Settings},
};

/// Runs an aggregation pipeline against the document store.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>, RagError>;
}

/// MongoDB Atlas collection with a vector search index.
pub struct MongoBackend {
    uri: String,
    database: String,
    collection: String,
    limit: u32,
}

impl MongoBackend {
    pub fn new(settings: &Settings) -> Self {
        Self {
            uri: settings.mongo_link.clone(),
            database: settings.search.database.clone(),
            collection: settings.search.collection.clone(),
            limit: settings.search.limit,
        }
    }
}

#[async_trait]
impl SearchBackend for MongoBackend {
    /// Connects on every call and reads at most `limit` documents.
    async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>, RagError> {
        let client = Client::with_uri_str(&self.uri).await?;
        let collection = client
            .database(&self.database)
            .collection::<Document>(&self.collection);
        info!(
            "Running vector search on '{}.{}'",
            self.database, self.collection
        );

        let mut cursor = collection.aggregate(pipeline).await?;
        let mut documents = Vec::new();
        while documents.len() < self.limit as usize && cursor.advance().await? {
            documents.push(cursor.deserialize_current()?);
        }
        Ok(documents)
    }
}

/// Builds the single `$vectorSearch` stage for `vector`.
pub fn vector_search_pipeline(vector: &[f64], search: &SearchSettings) -> Vec<Document> {
    let query_vector: Vec<Bson> = vector.iter().copied().map(Bson::Double).collect();
    vec![doc! {
        "$vectorSearch": {
            "queryVector": query_vector,
            "path": search.path.as_str(),
            "numCandidates": i64::from(search.num_candidates),
            "limit": i64::from(search.limit),
            "index": search.index.as_str(),
        }
    }]
}

/// Retrieves the text of the nearest document for a query.
pub struct VectorSearch<E, B> {
    embedder: E,
    backend: B,
    search: SearchSettings,
}

impl<E: Embedder, B: SearchBackend> VectorSearch<E, B> {
    pub fn new(embedder: E, backend: B, search: SearchSettings) -> Self {
        Self {
            embedder,
            backend,
            search,
        }
    }

    /// Returns the "text" field of the first document the index returns,
    /// or an empty string when nothing matched. Ordering is whatever the
    /// index produced.
    pub async fn query(&self, text: &str) -> Result<String, RagError> {
        let vector = self.embedder.embed(text).await?;
        let pipeline = vector_search_pipeline(&vector, &self.search);
        let documents = self.backend.aggregate(pipeline).await?;
        debug!("Vector search returned {} documents", documents.len());

        let Some(first) = documents.into_iter().next() else {
            info!("No document matched the query");
            return Ok(String::new());
        };
        first
            .get_str("text")
            .map(ToString::to_string)
            .map_err(|_| RagError::MissingText)
    }
}
