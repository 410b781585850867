//! 写后端：把一条 [`CatalogRecord`] 存入用户的收藏
//!
//! 只有一个需要鉴权的写操作，bearer token 由调用方从 [`AuthGate`](crate::auth::AuthGate) 取得。

mod graphql;

pub use graphql::{BookInput, GraphqlBackend, SAVE_BOOK};

use crate::catalog::CatalogRecord;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait WriteBackend: Send + Sync {
    /// 提交完整记录；失败统一返回 [`SaveError::WriteFailed`](crate::error::SaveError::WriteFailed)
    async fn save_book(&self, token: &str, record: &CatalogRecord) -> Result<()>;
}
