use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, multipart};
use serde::Deserialize;
use url::Url;

use super::download::{download_url, endpoint};
use super::error::ClientError;
use super::upload::LocalFile;
use crate::config::ClientConfig;
use crate::document::{CreatedDocument, Document, DocumentId};
use crate::dto::document::CreatedResponse;

/// Operations the portal needs from a document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates a document from one file. Stores only promise the new id back.
    async fn upload(&self, file: &LocalFile) -> Result<CreatedDocument, ClientError>;

    /// Every document of the implicit owner, in store order.
    async fn list(&self) -> Result<Vec<Document>, ClientError>;

    async fn delete(&self, id: &DocumentId) -> Result<(), ClientError>;
}

/// [`DocumentStore`] over the store's HTTP API.
#[derive(Clone)]
pub struct HttpDocumentStore {
    client: reqwest::Client,
    base_url: Url,
    bearer_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpDocumentStore {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = parse_base_url(&config.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            bearer_token: config.bearer_token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn upload(&self, file: &LocalFile) -> Result<CreatedDocument, ClientError> {
        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.media_type)?;
        let form = multipart::Form::new().part("file", part);

        let url = endpoint(&self.base_url, &["documents", "upload"]);
        let response = self.request(Method::POST, url).multipart(form).send().await?;
        let body: CreatedResponse = check(response).await?.json().await?;

        Ok(body.document)
    }

    async fn list(&self) -> Result<Vec<Document>, ClientError> {
        let url = endpoint(&self.base_url, &["documents"]);
        let response = self.request(Method::GET, url).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn delete(&self, id: &DocumentId) -> Result<(), ClientError> {
        let url = download_url(&self.base_url, id);
        let response = self.request(Method::DELETE, url).send().await?;
        check(response).await?;
        Ok(())
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw).map_err(|e| ClientError::InvalidBaseUrl(format!("{raw}: {e}")))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url)
}

/// Turns non-2xx responses into errors, keeping the store's message if it sent one.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };

    if status == StatusCode::NOT_FOUND {
        Err(ClientError::NotFound(message))
    } else {
        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }
}
