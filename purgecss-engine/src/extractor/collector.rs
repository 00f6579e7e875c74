use std::sync::Arc;
use std::time::Instant;

use super::{Extractor, ExtractorRegistry};
use crate::core::{ContentSource, UsedTokenSet};
use crate::error::{PurgeError, PurgeResult};
use crate::utils::log_format::compress_token_set_default;

/// 令牌收集器：对每个内容来源执行对应提取器，并合并为一个 UsedTokenSet
#[derive(Debug, Clone, Copy)]
pub struct TokenCollector<'a> {
    registry: &'a ExtractorRegistry,
}

impl<'a> TokenCollector<'a> {
    pub fn new(registry: &'a ExtractorRegistry) -> Self {
        Self { registry }
    }

    /// 预先解析所有来源的提取器
    /// 任何来源无法解析都视为配置错误，保证提取开始前失败
    pub fn resolve_all(&self, sources: &[ContentSource]) -> PurgeResult<Vec<Arc<dyn Extractor>>> {
        sources
            .iter()
            .map(|source| self.registry.resolve(&source.extension))
            .collect()
    }

    /// 提取单个来源，失败时按 best_effort 决定中止或记为空
    pub fn extract_source(
        &self,
        source: &ContentSource,
        extractor: &dyn Extractor,
    ) -> PurgeResult<UsedTokenSet> {
        let mut used = UsedTokenSet::new();
        match extractor.extract(&source.raw) {
            Ok(result) => {
                log::trace!(
                    "Extractor `{}` returned {} raw tokens for `{}`",
                    extractor.name(),
                    result.token_count(),
                    source.display_name()
                );
                used.merge(result);
            }
            Err(e) if source.best_effort => {
                log::warn!(
                    "Extractor `{}` failed on best-effort source `{}`, treated as empty: {}",
                    extractor.name(),
                    source.display_name(),
                    e
                );
            }
            Err(e) => {
                return Err(PurgeError::ExtractionError {
                    source_name: source.display_name(),
                    cause: e.to_string(),
                })
            }
        }
        Ok(used)
    }

    /// 收集全部来源的令牌
    pub fn collect(&self, sources: &[ContentSource]) -> PurgeResult<UsedTokenSet> {
        let start = Instant::now();
        let extractors = self.resolve_all(sources)?;

        let mut used = UsedTokenSet::new();
        for (source, extractor) in sources.iter().zip(extractors.iter()) {
            let tokens = self.extract_source(source, extractor.as_ref())?;
            log::trace!(
                "Extracted {} tokens from `{}` with `{}`",
                tokens.len(),
                source.display_name(),
                extractor.name()
            );
            used.union(tokens);
        }

        log::debug!(
            "Token collection finished | sources: {} | tokens: {} | time: {:?}",
            sources.len(),
            used.len(),
            start.elapsed()
        );
        log::trace!(
            "Classes {} | Undetermined {}",
            compress_token_set_default(&used.classes),
            compress_token_set_default(&used.undetermined)
        );
        Ok(used)
    }
}
