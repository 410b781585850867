//! Mock 检索提供方，用于在不发起真实 HTTP 请求的情况下测试 [`SearchNormalizer`](crate::search::SearchNormalizer)
//! 和 [`SaveReconciler`](crate::reconciler::SaveReconciler) 的检索路径。
//!
//! # 示例
//!
//! ```rust
//! use book_finder::testing::{MockSearchProvider, volume};
//! use book_finder::search::SearchProvider;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mock = MockSearchProvider::new()
//!     .with_volumes(vec![volume("A1", "The Hobbit")])
//!     .with_status_error(503);
//!
//! assert_eq!(mock.lookup("hobbit").await.unwrap().len(), 1);
//! assert!(mock.lookup("hobbit").await.is_err());
//! assert_eq!(mock.call_count(), 2);
//! # }
//! ```

use crate::catalog::Volume;
use crate::error::{Result, SearchError};
use crate::search::SearchProvider;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// 预设响应
enum MockSearchResponse {
    Volumes {
        volumes: Vec<Volume>,
        /// 设置后，返回前要等到 `notify_one()`，用于模拟慢响应
        gate: Option<Arc<Notify>>,
    },
    Status(u16),
    Network(String),
}

/// 可脚本化的 Mock 检索提供方。
///
/// 按顺序返回预设响应；队列耗尽后返回空结果。
pub struct MockSearchProvider {
    responses: Arc<Mutex<VecDeque<MockSearchResponse>>>,
    /// 每次调用收到的查询词，按顺序记录
    calls: Arc<Mutex<Vec<String>>>,
}

impl Default for MockSearchProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSearchProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 追加一次成功响应
    pub fn with_volumes(self, volumes: Vec<Volume>) -> Self {
        self.push(MockSearchResponse::Volumes {
            volumes,
            gate: None,
        })
    }

    /// 追加一次成功响应，但在 `gate` 被通知前不返回
    pub fn with_gated_volumes(self, volumes: Vec<Volume>, gate: Arc<Notify>) -> Self {
        self.push(MockSearchResponse::Volumes {
            volumes,
            gate: Some(gate),
        })
    }

    /// 追加一次非 2xx 响应
    pub fn with_status_error(self, status: u16) -> Self {
        self.push(MockSearchResponse::Status(status))
    }

    /// 追加一次网络错误
    pub fn with_network_error(self, msg: impl Into<String>) -> Self {
        self.push(MockSearchResponse::Network(msg.into()))
    }

    fn push(self, response: MockSearchResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_query(&self) -> Option<String> {
        self.calls.lock().unwrap().last().cloned()
    }

    /// 剩余未消费的预设响应数量
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn lookup(&self, query: &str) -> Result<Vec<Volume>> {
        self.calls.lock().unwrap().push(query.to_string());
        let next = self.responses.lock().unwrap().pop_front();

        match next {
            Some(MockSearchResponse::Volumes { volumes, gate }) => {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                Ok(volumes)
            }
            Some(MockSearchResponse::Status(status)) => Err(SearchError::ProviderFailure {
                status: Some(status),
                message: "mock provider failure".to_string(),
            }
            .into()),
            Some(MockSearchResponse::Network(message)) => Err(SearchError::ProviderFailure {
                status: None,
                message,
            }
            .into()),
            None => Ok(Vec::new()),
        }
    }
}
