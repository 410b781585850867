use crate::backend::WriteBackend;
use crate::catalog::CatalogRecord;
use crate::error::{BookError, Result, SaveError};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

pub const SAVE_BOOK: &str = r#"mutation saveBook($bookSaved: BookInput!) {
  saveBook(bookSaved: $bookSaved) {
    _id
    username
    savedBooks {
      bookId
    }
  }
}"#;

/// mutation 的 `bookSaved` 参数，字段名沿用后端 schema
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    pub book_id: String,
    pub authors: Vec<String>,
    pub title: String,
    pub description: String,
    pub image: String,
}

impl From<&CatalogRecord> for BookInput {
    fn from(record: &CatalogRecord) -> Self {
        Self {
            book_id: record.id().to_string(),
            authors: record.authors().to_vec(),
            title: record.title().to_string(),
            description: record.description().to_string(),
            image: record.image_url().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

fn write_failed(cause: impl Into<String>) -> BookError {
    BookError::Save(SaveError::WriteFailed(cause.into()))
}

pub fn assemble_req_header(token: &str) -> Result<HeaderMap> {
    let mut header_map = HeaderMap::new();

    header_map.insert(
        "Authorization",
        format!("Bearer {}", token)
            .parse()
            .map_err(|e| write_failed(format!("Invalid Authorization header: {}", e)))?,
    );
    header_map.insert(
        "Content-Type",
        "application/json"
            .parse()
            .map_err(|e| write_failed(format!("Invalid Content-Type header: {}", e)))?,
    );
    Ok(header_map)
}

/// 通过 GraphQL `saveBook` mutation 写入
pub struct GraphqlBackend {
    client: Arc<Client>,
    url: String,
}

impl GraphqlBackend {
    pub fn new(client: Arc<Client>, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl WriteBackend for GraphqlBackend {
    async fn save_book(&self, token: &str, record: &CatalogRecord) -> Result<()> {
        let body = json!({
            "query": SAVE_BOOK,
            "variables": { "bookSaved": BookInput::from(record) },
        });

        let response = self
            .client
            .post(&self.url)
            .headers(assemble_req_header(token)?)
            .json(&body)
            .send()
            .await
            .map_err(|e| write_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(write_failed(format!(
                "status {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let parsed = response
            .json::<GraphqlResponse>()
            .await
            .map_err(|e| write_failed(format!("invalid response: {}", e)))?;

        if !parsed.errors.is_empty() {
            let messages: Vec<String> = parsed.errors.into_iter().map(|e| e.message).collect();
            return Err(write_failed(messages.join("; ")));
        }
        if parsed.data.as_ref().is_none_or(Value::is_null) {
            return Err(write_failed("mutation returned no data"));
        }

        debug!(book_id = %record.id(), "saveBook mutation 成功");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{OneShotServer, record};

    #[test]
    fn test_book_input_wire_names() {
        let input = BookInput::from(&record("A1", "The Hobbit"));
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["bookId"], "A1");
        assert_eq!(value["title"], "The Hobbit");
        assert_eq!(value["image"], "");
        assert!(value["authors"].is_array());
    }

    #[tokio::test]
    async fn test_save_sends_bearer_and_full_record() {
        let server =
            OneShotServer::start(200, r#"{"data":{"saveBook":{"_id":"u1","username":"bilbo"}}}"#)
                .await;
        let backend = GraphqlBackend::new(Arc::new(Client::new()), server.url("/graphql"));

        backend
            .save_book("tok-123", &record("A1", "The Hobbit"))
            .await
            .unwrap();

        let request = server.request().await;
        assert!(request.starts_with("POST /graphql "));
        assert!(request.to_lowercase().contains("authorization: bearer tok-123"));
        assert!(request.contains(r#""bookId":"A1""#));
        assert!(request.contains(r#""title":"The Hobbit""#));
    }

    #[tokio::test]
    async fn test_graphql_errors_are_write_failures() {
        let server = OneShotServer::start(
            200,
            r#"{"errors":[{"message":"You need to be logged in!"}],"data":null}"#,
        )
        .await;
        let backend = GraphqlBackend::new(Arc::new(Client::new()), server.url("/graphql"));

        let err = backend
            .save_book("tok", &record("A1", "The Hobbit"))
            .await
            .unwrap_err();
        match err {
            BookError::Save(SaveError::WriteFailed(cause)) => {
                assert!(cause.contains("logged in"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_http_error_is_write_failure() {
        let server = OneShotServer::start(400, "bad request").await;
        let backend = GraphqlBackend::new(Arc::new(Client::new()), server.url("/graphql"));

        let err = backend
            .save_book("tok", &record("A1", "The Hobbit"))
            .await
            .unwrap_err();
        assert!(matches!(err, BookError::Save(SaveError::WriteFailed(_))));
    }
}
