//! 图书检索
//!
//! - [`SearchProvider`]：外部检索接口的抽象，返回原始 [`Volume`] 列表
//! - [`GoogleBooksProvider`]：基于 reqwest 的默认实现
//! - [`SearchNormalizer`]：校验查询词、调用提供方并归一化为 [`CatalogRecord`]

mod google_books;

pub use google_books::GoogleBooksProvider;

use crate::catalog::{CatalogRecord, Volume};
use crate::error::{Result, SearchError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// 外部检索提供方
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// 按关键词发起一次检索，结果保持提供方给出的顺序
    async fn lookup(&self, query: &str) -> Result<Vec<Volume>>;
}

/// 检索归一化器：不持有任何会话状态，结果由调用方决定如何使用
#[derive(Clone)]
pub struct SearchNormalizer {
    provider: Arc<dyn SearchProvider>,
}

impl SearchNormalizer {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    /// 空白查询直接返回 [`SearchError::EmptyQuery`]，不发请求。
    ///
    /// 不过滤、不去重：提供方返回重复 id 时原样保留。
    pub async fn search(&self, query: &str) -> Result<Vec<CatalogRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery.into());
        }

        let volumes = self.provider.lookup(query).await?;
        let records: Vec<CatalogRecord> = volumes.into_iter().map(CatalogRecord::from).collect();
        debug!(query = %query, hits = records.len(), "🔍 检索完成");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NO_AUTHOR_PLACEHOLDER;
    use crate::error::BookError;
    use crate::testing::{MockSearchProvider, volume};

    #[tokio::test]
    async fn test_whitespace_query_makes_no_request() {
        let provider = Arc::new(MockSearchProvider::new().with_volumes(vec![volume("x", "X")]));
        let normalizer = SearchNormalizer::new(provider.clone());

        for query in ["", "   ", "\t\n "] {
            let err = normalizer.search(query).await.unwrap_err();
            assert!(matches!(err, BookError::Search(SearchError::EmptyQuery)));
        }
        assert_eq!(provider.call_count(), 0);
        assert_eq!(provider.remaining(), 1);
    }

    #[tokio::test]
    async fn test_query_is_trimmed_before_lookup() {
        let provider = Arc::new(MockSearchProvider::new().with_volumes(vec![]));
        let normalizer = SearchNormalizer::new(provider.clone());

        normalizer.search("  dune  ").await.unwrap();
        assert_eq!(provider.last_query().as_deref(), Some("dune"));
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let provider = Arc::new(MockSearchProvider::new().with_status_error(503));
        let normalizer = SearchNormalizer::new(provider);

        let err = normalizer.search("dune").await.unwrap_err();
        assert!(matches!(
            err,
            BookError::Search(SearchError::ProviderFailure {
                status: Some(503),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_duplicates_and_defaults() {
        let provider = Arc::new(
            MockSearchProvider::new()
                .with_volumes(vec![volume("A1", "The Hobbit"), volume("A1", "The Hobbit")]),
        );
        let normalizer = SearchNormalizer::new(provider);

        let records = normalizer.search("Hobbit").await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.id() == "A1"));
        assert!(records.iter().all(|r| r.authors() == [NO_AUTHOR_PLACEHOLDER]));
        assert!(records.iter().all(|r| r.image_url().is_empty()));
    }
}
