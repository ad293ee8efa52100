/// Appwrite document database as a popularity store
///
/// Documents live in one fixed database/collection pair with the attributes
/// `searchTerm`, `count`, `movie_id` and `poster_url`.
///
/// A hit is list-by-term followed by either the server's atomic
/// `count/increment` or a create. The increment cannot lose counts, but two
/// first-time hits racing on the same term can still both create; a unique
/// index on `searchTerm` turns the loser into a logged failure.
use reqwest::{Client as HttpClient, RequestBuilder};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{DocumentList, PopularityDocument, PopularityRecord},
    services::popularity::PopularityStore,
};

#[derive(Debug, Clone)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: Option<String>,
    pub database_id: String,
    pub collection_id: String,
}

#[derive(Clone)]
pub struct AppwriteStore {
    http_client: HttpClient,
    settings: AppwriteSettings,
}

fn equal_query(attribute: &str, value: &str) -> String {
    json!({ "method": "equal", "attribute": attribute, "values": [value] }).to_string()
}

fn order_desc_query(attribute: &str) -> String {
    json!({ "method": "orderDesc", "attribute": attribute }).to_string()
}

fn limit_query(limit: usize) -> String {
    json!({ "method": "limit", "values": [limit] }).to_string()
}

impl AppwriteStore {
    pub fn new(settings: AppwriteSettings) -> Self {
        Self {
            http_client: HttpClient::new(),
            settings: AppwriteSettings {
                endpoint: settings.endpoint.trim_end_matches('/').to_string(),
                ..settings
            },
        }
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.settings.endpoint, self.settings.database_id, self.settings.collection_id
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("X-Appwrite-Project", &self.settings.project_id);
        match &self.settings.api_key {
            Some(key) => request.header("X-Appwrite-Key", key),
            None => request,
        }
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> AppResult<T> {
        let response = self.authorize(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::DocumentStore(format!(
                "{} returned status {}: {}",
                operation, status, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn list(&self, queries: Vec<String>) -> AppResult<DocumentList> {
        let params: Vec<(&str, String)> = queries.into_iter().map(|q| ("queries[]", q)).collect();
        let request = self.http_client.get(self.documents_url()).query(&params);
        self.send(request, "listDocuments").await
    }

    async fn increment(&self, document_id: &str) -> AppResult<PopularityDocument> {
        let url = format!("{}/{}/count/increment", self.documents_url(), document_id);
        let request = self.http_client.patch(url).json(&json!({ "value": 1 }));
        self.send(request, "incrementDocumentAttribute").await
    }

    async fn create(
        &self,
        term: &str,
        movie_id: u64,
        poster_url: Option<String>,
    ) -> AppResult<PopularityDocument> {
        let data = PopularityDocument {
            id: String::new(),
            search_term: term.to_string(),
            count: 1,
            movie_id,
            poster_url,
        };
        let request = self.http_client.post(self.documents_url()).json(&json!({
            "documentId": Uuid::new_v4().simple().to_string(),
            "data": data,
        }));
        self.send(request, "createDocument").await
    }
}

#[async_trait::async_trait]
impl PopularityStore for AppwriteStore {
    async fn increment_or_insert(
        &self,
        term: &str,
        movie_id: u64,
        poster_url: Option<String>,
    ) -> AppResult<PopularityRecord> {
        let existing = self
            .list(vec![equal_query("searchTerm", term), limit_query(1)])
            .await?;

        let document = match existing.documents.into_iter().next() {
            Some(doc) => self.increment(&doc.id).await?,
            None => self.create(term, movie_id, poster_url).await?,
        };

        Ok(document.into())
    }

    async fn top(&self, limit: usize) -> AppResult<Vec<PopularityRecord>> {
        let list = self
            .list(vec![order_desc_query("count"), limit_query(limit)])
            .await?;
        Ok(list.documents.into_iter().map(PopularityRecord::from).collect())
    }

    fn name(&self) -> &'static str {
        "appwrite"
    }
}
