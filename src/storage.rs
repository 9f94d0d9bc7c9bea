//! 会话持久化存储
//!
//! 浏览器端使用 `localStorage`；原生环境提供内存存储和 JSON 文件存储。
//! 所有后端只保存字符串，键由 `huraymila_shared::STORAGE_*_KEY` 定义。

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::warn;

/// 键值存储接口
///
/// 读取失败视为「没有值」；写入与删除的失败以 `Storage` 错误返回。
pub trait SessionStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> ApiResult<()>;
    fn delete(&self, key: &str) -> ApiResult<()>;
}

/// 按运行环境选择默认存储
///
/// - wasm32: 浏览器 `localStorage`
/// - 原生且配置了会话文件: `FileStorage`
/// - 其他: `MemoryStorage`（进程退出即丢失）
pub fn default_storage(config: &ClientConfig) -> Rc<dyn SessionStorage> {
    #[cfg(target_arch = "wasm32")]
    {
        let _ = config;
        Rc::new(LocalStorage)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let storage: Rc<dyn SessionStorage> = match &config.session_file {
            Some(path) => Rc::new(FileStorage::new(path.clone())),
            None => Rc::new(MemoryStorage::new()),
        };
        storage
    }
}

// =========================================================
// 内存存储
// =========================================================

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置内容，常用于测试恢复会话
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let storage = Self::new();
        storage.entries.borrow_mut().extend(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        storage
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> ApiResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> ApiResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

// =========================================================
// 文件存储
// =========================================================

/// 以单个 JSON 对象保存全部键值的文件存储
///
/// 每次读写都直接访问文件，不做缓存。文件内容损坏时按空存储处理，
/// 下一次写入会覆盖它。
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> BTreeMap<String, String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "session file unreadable");
                return BTreeMap::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "session file is not valid JSON");
                BTreeMap::new()
            }
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> ApiResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ApiError::storage(format!("Cannot create {}", parent.display())).with_source(e)
            })?;
        }
        let raw = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, raw).map_err(|e| {
            ApiError::storage(format!("Cannot write {}", self.path.display())).with_source(e)
        })
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> ApiResult<()> {
        let mut entries = self.load();
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn delete(&self, key: &str) -> ApiResult<()> {
        let mut entries = self.load();
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

// =========================================================
// 浏览器 localStorage
// =========================================================

/// 浏览器 `localStorage`
///
/// 直接读写原始字符串，不经过 `gloo_storage` 的 JSON 编码，
/// 以便与其他页面脚本写入的值保持一致。
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl SessionStorage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        gloo_storage::LocalStorage::raw().get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> ApiResult<()> {
        gloo_storage::LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| ApiError::storage(format!("localStorage write failed: {:?}", e)))
    }

    fn delete(&self, key: &str) -> ApiResult<()> {
        gloo_storage::LocalStorage::raw()
            .remove_item(key)
            .map_err(|e| ApiError::storage(format!("localStorage delete failed: {:?}", e)))
    }
}
