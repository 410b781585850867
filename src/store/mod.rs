//! 会话持久化
//!
//! 两层：
//!
//! | 层次 | 类型 | 作用 |
//! |------|------|------|
//! | 存储介质 | [`KeyValueStore`]：[`InMemoryKvStore`] / [`FileKvStore`] | 同步的字符串 KV |
//! | 快照 | [`SavedIdStore`] | 在 `saved_books` 键下读写已收藏 id 集合 |
//!
//! 快照在引擎启动时读一次、销毁时写一次。读取永不失败：
//! 介质不可用或内容损坏都退化为空集合。

mod file;

pub use file::FileKvStore;

use crate::error::{Result, StoreError};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// 快照所在的键
pub const SAVED_BOOKS_KEY: &str = "saved_books";

/// 同步、持久的字符串 KV 介质
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// 键不存在时也返回 `Ok`
    fn remove(&self, key: &str) -> Result<()>;
}

/// 进程内存 KV，不持久化，适合测试
#[derive(Default)]
pub struct InMemoryKvStore {
    data: Mutex<HashMap<String, String>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.data
            .lock()
            .map_err(|e| StoreError::IoError(format!("lock poisoned: {e}")).into())
    }
}

impl KeyValueStore for InMemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// 已收藏 id 集合的持久化快照
#[derive(Clone)]
pub struct SavedIdStore {
    backing: Arc<dyn KeyValueStore>,
}

impl SavedIdStore {
    pub fn new(backing: Arc<dyn KeyValueStore>) -> Self {
        Self { backing }
    }

    /// 以 `path` 处的 [`FileKvStore`] 为介质；介质不可用时退化为进程内存，
    /// 本次会话照常进行，只是快照不会落盘
    pub fn open(path: impl AsRef<Path>) -> Self {
        let backing: Arc<dyn KeyValueStore> = match FileKvStore::new(path.as_ref()) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!(path = %path.as_ref().display(), "快照文件不可用，改用内存存储: {e}");
                Arc::new(InMemoryKvStore::new())
            }
        };
        Self::new(backing)
    }

    /// 读取上次的快照；首次访问、介质不可用或数据损坏时返回空集合
    pub fn load(&self) -> HashSet<String> {
        let raw = match self.backing.get(SAVED_BOOKS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return HashSet::new(),
            Err(e) => {
                warn!("读取收藏快照失败，从空集合开始: {e}");
                return HashSet::new();
            }
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => {
                debug!(count = ids.len(), "📂 已加载收藏快照");
                ids.into_iter().collect()
            }
            Err(e) => {
                warn!("收藏快照已损坏，从空集合开始: {e}");
                HashSet::new()
            }
        }
    }

    /// 整体覆盖快照；空集合会直接移除该键
    pub fn save(&self, ids: &HashSet<String>) -> Result<()> {
        if ids.is_empty() {
            return self.backing.remove(SAVED_BOOKS_KEY);
        }
        let mut sorted: Vec<&String> = ids.iter().collect();
        sorted.sort();
        let json = serde_json::to_string(&sorted)?;
        self.backing.set(SAVED_BOOKS_KEY, &json)?;
        debug!(count = sorted.len(), "💾 收藏快照已写入");
        Ok(())
    }
}
