use crate::catalog::{Volume, VolumeList};
use crate::error::{Result, SearchError};
use crate::search::SearchProvider;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;

/// Google Books volumes 接口：`GET {base_url}?q={query}`
pub struct GoogleBooksProvider {
    client: Arc<Client>,
    base_url: String,
}

impl GoogleBooksProvider {
    pub fn new(client: Arc<Client>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SearchProvider for GoogleBooksProvider {
    async fn lookup(&self, query: &str) -> Result<Vec<Volume>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SearchError::ProviderFailure {
                status: Some(status),
                message: error_text,
            }
            .into());
        }

        let list = response
            .json::<VolumeList>()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        debug!(query = %query, items = list.items.len(), "Google Books 响应");
        Ok(list.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BookError;
    use crate::testing::OneShotServer;

    #[tokio::test]
    async fn test_lookup_sends_query_and_parses_items() {
        let server = OneShotServer::start(
            200,
            r#"{"items":[{"id":"A1","volumeInfo":{"title":"The Hobbit","authors":["J.R.R. Tolkien"]}}]}"#,
        )
        .await;
        let provider = GoogleBooksProvider::new(Arc::new(Client::new()), server.url("/volumes"));

        let volumes = provider.lookup("the hobbit").await.unwrap();
        assert_eq!(volumes.len(), 1);
        assert_eq!(volumes[0].id, "A1");
        assert_eq!(volumes[0].volume_info.title, "The Hobbit");

        let request = server.request().await;
        assert!(request.starts_with("GET /volumes?q=the+hobbit "), "{request}");
    }

    #[tokio::test]
    async fn test_non_success_status_is_provider_failure() {
        let server = OneShotServer::start(500, "boom").await;
        let provider = GoogleBooksProvider::new(Arc::new(Client::new()), server.url("/volumes"));

        let err = provider.lookup("dune").await.unwrap_err();
        match err {
            BookError::Search(SearchError::ProviderFailure { status, message }) => {
                assert_eq!(status, Some(500));
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let server = OneShotServer::start(200, "not json").await;
        let provider = GoogleBooksProvider::new(Arc::new(Client::new()), server.url("/volumes"));

        let err = provider.lookup("dune").await.unwrap_err();
        assert!(matches!(
            err,
            BookError::Search(SearchError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_provider_failure() {
        // 端口 1 上不会有服务监听
        let provider = GoogleBooksProvider::new(Arc::new(Client::new()), "http://127.0.0.1:1/volumes");

        let err = provider.lookup("dune").await.unwrap_err();
        assert!(matches!(
            err,
            BookError::Search(SearchError::ProviderFailure { status: None, .. })
        ));
    }
}
