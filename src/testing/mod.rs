//! 测试基础设施
//!
//! 提供在不依赖真实检索接口 / 写后端的情况下测试各组件的工具集。
//!
//! | 类型 | 用途 |
//! |------|------|
//! | [`MockSearchProvider`] | 替代 Google Books，可预设结果、错误、慢响应 |
//! | [`MockWriteBackend`] | 替代 GraphQL 后端，记录每次提交 |
//! | [`MockAuthGate`] | 直接设定登录态 |
//! | [`OneShotServer`] | 本地一次性 HTTP 服务，测试基于 reqwest 的真实实现 |
//!
//! # 设计原则
//!
//! - **零外部网络请求**：Mock 完全在内存中运行，`OneShotServer` 只监听 127.0.0.1
//! - **可脚本化**：通过 `with_*()` 精确控制返回值
//! - **可观测**：通过 `call_count()` / `last_*()` 检查调用情况
//!
//! # 使用示例
//!
//! ```rust
//! use book_finder::reconciler::SaveReconciler;
//! use book_finder::search::SearchNormalizer;
//! use book_finder::store::{InMemoryKvStore, SavedIdStore};
//! use book_finder::testing::{MockAuthGate, MockSearchProvider, MockWriteBackend, volume};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let provider = Arc::new(MockSearchProvider::new().with_volumes(vec![volume("A1", "The Hobbit")]));
//! let backend = Arc::new(MockWriteBackend::new());
//! let view = SaveReconciler::new(
//!     SearchNormalizer::new(provider),
//!     Arc::new(MockAuthGate::logged_in("token")),
//!     backend.clone(),
//!     SavedIdStore::new(Arc::new(InMemoryKvStore::new())),
//! );
//!
//! view.search("hobbit").await.unwrap();
//! view.save("A1").await.unwrap();
//! assert!(view.is_saved("A1"));
//! assert_eq!(backend.call_count(), 1);
//! view.close().unwrap();
//! # }
//! ```

mod fixtures;
mod mock_auth;
mod mock_backend;
mod mock_search;

pub use fixtures::{OneShotServer, record, temp_path, volume};
pub use mock_auth::MockAuthGate;
pub use mock_backend::MockWriteBackend;
pub use mock_search::MockSearchProvider;
