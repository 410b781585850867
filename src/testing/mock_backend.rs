//! Mock 写后端：记录每次提交的 token 与记录，按预设返回成功或失败。

use crate::backend::WriteBackend;
use crate::catalog::CatalogRecord;
use crate::error::{Result, SaveError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// 可脚本化的 Mock 写后端。
///
/// 按顺序返回预设结果；队列耗尽后每次都成功。
pub struct MockWriteBackend {
    /// `None` 表示成功，`Some(cause)` 表示失败
    outcomes: Arc<Mutex<VecDeque<Option<String>>>>,
    calls: Arc<Mutex<Vec<(String, CatalogRecord)>>>,
    /// 设置后，每次提交都要等到 `notify_one()` 才返回
    gate: Option<Arc<Notify>>,
}

impl Default for MockWriteBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWriteBackend {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// 模拟慢后端
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_success(self) -> Self {
        self.outcomes.lock().unwrap().push_back(None);
        self
    }

    /// 追加一次失败（用于测试保存失败路径）
    pub fn with_failure(self, cause: impl Into<String>) -> Self {
        self.outcomes.lock().unwrap().push_back(Some(cause.into()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// 最后一次提交的 `(token, record)`
    pub fn last_call(&self) -> Option<(String, CatalogRecord)> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl WriteBackend for MockWriteBackend {
    async fn save_book(&self, token: &str, record: &CatalogRecord) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((token.to_string(), record.clone()));

        let outcome = self.outcomes.lock().unwrap().pop_front().flatten();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match outcome {
            Some(cause) => Err(SaveError::WriteFailed(cause).into()),
            None => Ok(()),
        }
    }
}
