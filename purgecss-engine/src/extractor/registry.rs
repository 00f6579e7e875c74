use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::{Extractor, ExtractorEntry};
use crate::core::normalize_extension;
use crate::error::{PurgeError, PurgeResult};

/// 扩展名 → 提取器注册表
/// 同一扩展名多次注册时后注册者优先，用户提取器可覆盖内置提取器
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    entries: Vec<(FxHashSet<String>, Arc<dyn Extractor>)>,
    default: Option<Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn new(default: Option<Arc<dyn Extractor>>) -> Self {
        Self {
            entries: Vec::new(),
            default,
        }
    }

    /// 由选项中的注册列表构建
    pub fn from_entries(default: Option<Arc<dyn Extractor>>, entries: &[ExtractorEntry]) -> Self {
        let mut registry = Self::new(default);
        for entry in entries {
            registry.register(entry.extensions.iter(), entry.extractor.clone());
        }
        registry
    }

    pub fn register<I, S>(&mut self, extensions: I, extractor: Arc<dyn Extractor>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions: FxHashSet<String> = extensions
            .into_iter()
            .map(|ext| normalize_extension(ext.as_ref()))
            .filter(|ext| !ext.is_empty())
            .collect();
        log::trace!(
            "Register extractor `{}` for extensions {:?}",
            extractor.name(),
            extensions
        );
        self.entries.push((extensions, extractor));
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 解析扩展名对应的提取器：倒序查找注册表，未命中回退到默认提取器
    pub fn resolve(&self, extension: &str) -> PurgeResult<Arc<dyn Extractor>> {
        let extension = normalize_extension(extension);
        if let Some((_, extractor)) = self
            .entries
            .iter()
            .rev()
            .find(|(extensions, _)| extensions.contains(&extension))
        {
            return Ok(extractor.clone());
        }

        self.default.clone().ok_or_else(|| {
            PurgeError::configuration(format!(
                "no extractor registered for extension `{}` and no default extractor configured",
                extension
            ))
        })
    }
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<_> = self
            .entries
            .iter()
            .map(|(exts, extractor)| (exts, extractor.name()))
            .collect();
        f.debug_struct("ExtractorRegistry")
            .field("entries", &entries)
            .field("default", &self.default.as_ref().map(|e| e.name()))
            .finish()
    }
}
