//! 检索结果与收藏状态的协调
//!
//! [`SaveReconciler`] 对应一个活动视图，独占该视图的 [`SearchSession`] 和已收藏 id 集合：
//!
//! ```text
//! search(query) ──► SearchNormalizer ──► 序号守卫 ──► 整体替换 results
//! save(id) ──► AuthGate ──► 取首个匹配记录 ──► WriteBackend ──► 成功后插入 saved
//! close() ──► SavedIdStore::save(saved)
//! ```
//!
//! 方法都只借用 `&self`，内部状态放在 `Mutex` 里，锁不会跨越 `.await`：
//! 同一视图上的多个 `search` / `save` 可以交错执行。
//!
//! 检索采用单调递增的请求序号：响应到达时若已有更新的检索发出，该响应被丢弃
//! （返回 [`SearchOutcome::Stale`]），当前结果保持不变。

use crate::auth::AuthGate;
use crate::backend::WriteBackend;
use crate::catalog::CatalogRecord;
use crate::error::{BookError, Result, SaveError, SearchError};
use crate::search::SearchNormalizer;
use crate::store::SavedIdStore;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// 最近一次被采纳的检索
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSession {
    /// 最近一次被采纳的查询词（已去除首尾空白）
    pub query: String,
    /// 提供方顺序，可能含重复 id
    pub results: Vec<CatalogRecord>,
}

impl SearchSession {
    /// 按 id 取第一条匹配记录
    pub fn find(&self, record_id: &str) -> Option<&CatalogRecord> {
        self.results.iter().find(|r| r.id() == record_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// 结果已替换为本次检索的 `count` 条记录
    Applied { count: usize },
    /// 响应到达前已有更新的检索发出，本次响应被丢弃
    Stale,
}

struct ViewState {
    session: SearchSession,
    saved: HashSet<String>,
}

pub struct SaveReconciler {
    normalizer: SearchNormalizer,
    auth: Arc<dyn AuthGate>,
    backend: Arc<dyn WriteBackend>,
    store: SavedIdStore,
    state: Mutex<ViewState>,
    /// 已发出的最大检索序号
    issued: AtomicU64,
    closed: bool,
}

impl SaveReconciler {
    /// 创建视图并从 `store` 读入已收藏 id
    pub fn new(
        normalizer: SearchNormalizer,
        auth: Arc<dyn AuthGate>,
        backend: Arc<dyn WriteBackend>,
        store: SavedIdStore,
    ) -> Self {
        let saved = store.load();
        info!(saved = saved.len(), "📚 检索视图已创建");
        Self {
            normalizer,
            auth,
            backend,
            store,
            state: Mutex::new(ViewState {
                session: SearchSession::default(),
                saved,
            }),
            issued: AtomicU64::new(0),
            closed: false,
        }
    }

    // 持锁期间不会 panic，中毒时直接取回内部数据
    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 提交一次检索。
    ///
    /// - 空白查询：返回 [`SearchError::EmptyQuery`]，不发请求
    /// - 失败：返回错误，现有结果不变
    /// - 成功但已过期：返回 [`SearchOutcome::Stale`]，现有结果不变
    pub async fn search(&self, query: &str) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            debug!("忽略空白查询");
            return Err(SearchError::EmptyQuery.into());
        }

        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(query = %query, ticket, "开始检索");

        let records = match self.normalizer.search(query).await {
            Ok(records) => records,
            Err(e) => {
                warn!(query = %query, ticket, "❌ 检索失败，保留现有结果: {e}");
                return Err(e);
            }
        };

        let mut state = self.state();
        if self.issued.load(Ordering::SeqCst) != ticket {
            debug!(query = %query, ticket, "丢弃过期的检索响应");
            return Ok(SearchOutcome::Stale);
        }

        let count = records.len();
        state.session = SearchSession {
            query: query.to_string(),
            results: records,
        };
        info!(query = %query, count, "✅ 检索结果已更新");
        Ok(SearchOutcome::Applied { count })
    }

    /// 把当前结果中 id 为 `record_id` 的第一条记录提交到写后端。
    ///
    /// 未登录时不发请求；已收藏的 id 也允许再次提交，成功后集合不变。
    /// 失败时集合不变，不自动重试。
    pub async fn save(&self, record_id: &str) -> Result<()> {
        let token = if self.auth.is_logged_in() {
            self.auth.get_token()
        } else {
            None
        };
        let Some(token) = token else {
            warn!(record_id = %record_id, "🔒 未登录，拒绝保存");
            return Err(SaveError::Unauthenticated.into());
        };

        // 在发起写请求前取快照，之后的检索不影响本次提交
        let record = self.state().session.find(record_id).cloned();
        let Some(record) = record else {
            warn!(record_id = %record_id, "当前结果中没有该记录");
            return Err(SaveError::UnknownRecord(record_id.to_string()).into());
        };

        if let Err(e) = self.backend.save_book(&token, &record).await {
            let e = match e {
                BookError::Save(SaveError::WriteFailed(cause)) => cause,
                other => other.to_string(),
            };
            warn!(record_id = %record_id, "❌ 保存失败: {e}");
            return Err(SaveError::WriteFailed(e).into());
        }

        let inserted = self.state().saved.insert(record_id.to_string());
        info!(record_id = %record_id, newly_saved = inserted, "💾 已保存");
        Ok(())
    }

    pub fn is_saved(&self, record_id: &str) -> bool {
        self.state().saved.contains(record_id)
    }

    pub fn is_logged_in(&self) -> bool {
        self.auth.is_logged_in()
    }

    pub fn session(&self) -> SearchSession {
        self.state().session.clone()
    }

    pub fn results(&self) -> Vec<CatalogRecord> {
        self.state().session.results.clone()
    }

    pub fn saved_ids(&self) -> HashSet<String> {
        self.state().saved.clone()
    }

    /// 结束视图：把当前已收藏 id 集合写入快照。
    ///
    /// 未显式调用时由 `Drop` 兜底写入。
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.flush()
    }

    fn flush(&self) -> Result<()> {
        let saved = self.saved_ids();
        match self.store.save(&saved) {
            Ok(()) => {
                info!(saved = saved.len(), "📕 检索视图已关闭，快照已写入");
                Ok(())
            }
            Err(e) => {
                warn!("写入收藏快照失败: {e}");
                Err(e)
            }
        }
    }
}

impl Drop for SaveReconciler {
    fn drop(&mut self) {
        if !self.closed {
            // flush 内部已记录失败日志
            let _ = self.flush();
        }
    }
}
