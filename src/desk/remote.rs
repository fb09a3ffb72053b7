//! Remote store contract and its HTTP implementation

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::error::{DeskError, DeskResult};
use crate::{
    config::DeskConfig,
    models::{Book, BookId, CreateBook, CreateHolder, Holder, HolderId},
};

/// Operations the desk performs against the book/holder service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list_books(&self) -> DeskResult<Vec<Book>>;

    async fn create_book(&self, book: &CreateBook) -> DeskResult<Book>;

    async fn delete_book(&self, id: BookId) -> DeskResult<()>;

    /// Any 2xx is success; the updated book comes back when the server
    /// sends one
    async fn checkout_book(&self, id: BookId, holder_id: HolderId) -> DeskResult<Option<Book>>;

    /// The server decides which holder the book goes back to
    async fn return_book(&self, id: BookId) -> DeskResult<Option<Book>>;

    async fn list_holders(&self) -> DeskResult<Vec<Holder>>;

    async fn create_holder(&self, holder: &CreateHolder) -> DeskResult<Holder>;

    async fn delete_holder(&self, id: HolderId) -> DeskResult<()>;
}

/// `RemoteStore` over the REST API
#[derive(Clone)]
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
}

impl HttpRemoteStore {
    /// `base_url` includes the API prefix, e.g. `http://localhost:5000/api`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn from_config(config: &DeskConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> DeskResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| DeskError::Transport(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(DeskError::Remote {
            status,
            message: extract_message(&body),
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> DeskResult<T> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| DeskError::Decode(e.to_string()))
    }

    /// Success body decoded as `T` when it is one, `None` otherwise
    async fn send_optional_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> DeskResult<Option<T>> {
        let body = self
            .send(request)
            .await?
            .bytes()
            .await
            .map_err(|e| DeskError::Transport(e.to_string()))?;
        Ok(decode_optional(&body))
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list_books(&self) -> DeskResult<Vec<Book>> {
        self.send_json(self.client.get(self.url("books/"))).await
    }

    async fn create_book(&self, book: &CreateBook) -> DeskResult<Book> {
        self.send_json(self.client.post(self.url("books/")).json(book)).await
    }

    async fn delete_book(&self, id: BookId) -> DeskResult<()> {
        self.send(self.client.delete(self.url(&format!("books/{}/", id))))
            .await
            .map(|_| ())
    }

    async fn checkout_book(&self, id: BookId, holder_id: HolderId) -> DeskResult<Option<Book>> {
        let request = self
            .client
            .post(self.url(&format!("books/{}/checkout/", id)))
            .json(&json!({ "holder_id": holder_id }));
        self.send_optional_json(request).await
    }

    async fn return_book(&self, id: BookId) -> DeskResult<Option<Book>> {
        self.send_optional_json(self.client.post(self.url(&format!("books/{}/return/", id))))
            .await
    }

    async fn list_holders(&self) -> DeskResult<Vec<Holder>> {
        self.send_json(self.client.get(self.url("holders/"))).await
    }

    async fn create_holder(&self, holder: &CreateHolder) -> DeskResult<Holder> {
        self.send_json(self.client.post(self.url("holders/")).json(holder)).await
    }

    async fn delete_holder(&self, id: HolderId) -> DeskResult<()> {
        self.send(self.client.delete(self.url(&format!("holders/{}/", id))))
            .await
            .map(|_| ())
    }
}

fn decode_optional<T: DeserializeOwned>(body: &[u8]) -> Option<T> {
    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Success body is not the expected shape: {}", e);
            None
        }
    }
}

/// Pull a human-readable message out of an error body.
/// Looks at `error`, then `message`, then `detail`.
pub(crate) fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message", "detail"]
        .iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(str::to_string)
}
