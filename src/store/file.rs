use crate::error::{Result, StoreError};
use crate::store::KeyValueStore;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

/// 基于 JSON 文件的 KV 介质
///
/// 存储格式：
/// ```json
/// { "saved_books": "[\"A1\",\"B2\"]" }
/// ```
///
/// 每次读写都直接访问文件，多个实例指向同一路径时看到的是同一份数据。
/// 写入先落到临时文件再 rename。
pub struct FileKvStore {
    path: PathBuf,
    /// 串行化同一实例内的读改写
    write_lock: Mutex<()>,
}

impl FileKvStore {
    /// 打开 KV 文件，自动建父目录；文件本身在第一次写入时创建
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = expand_tilde(path.as_ref());
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::IoError(format!("创建目录失败: {e}")))?;
        }
        info!(path = %path.display(), exists = path.exists(), "🗄️ FileKvStore 初始化");
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| StoreError::IoError(format!("读取 KV 文件失败: {e}")))?;
        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), "KV 文件解析失败，按空内容处理: {e}");
            HashMap::new()
        }))
    }

    fn write_all(&self, data: &HashMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| StoreError::IoError(format!("写入临时文件失败: {e}")))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| StoreError::IoError(format!("替换 KV 文件失败: {e}")))?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut HashMap<String, String>)) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| StoreError::IoError(format!("lock poisoned: {e}")))?;
        let mut data = self.read_all()?;
        f(&mut data);
        self.write_all(&data)
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|data| {
            data.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|data| {
            data.remove(key);
        })
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if s.starts_with("~/")
        && let Some(home) = std::env::var("HOME")
            .ok()
            .or_else(|| std::env::var("USERPROFILE").ok())
    {
        return PathBuf::from(home).join(&s[2..]);
    }
    path.to_path_buf()
}
