//! 提取模块：从任意内容中提取令牌
//! 1. Extractor 特质：纯文本 → 扁平/明细令牌
//! 2. 内置默认提取器与正则提取器
//! 3. 扩展名注册表与令牌收集器

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::{normalize_extension, ExtractorResult};
use crate::error::{PurgeError, PurgeResult};

pub mod collector;
pub mod registry;

pub use collector::TokenCollector;
pub use registry::ExtractorRegistry;

/// 提取器错误的统一装箱类型
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 提取器抽象特质
/// 闭包 `Fn(&str) -> Result<ExtractorResult, BoxError>` 自动实现该特质
pub trait Extractor: Send + Sync {
    fn extract(&self, content: &str) -> Result<ExtractorResult, BoxError>;

    /// 提取器名称，用于日志
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> Extractor for F
where
    F: Fn(&str) -> Result<ExtractorResult, BoxError> + Send + Sync,
{
    fn extract(&self, content: &str) -> Result<ExtractorResult, BoxError> {
        self(content)
    }
}

/// 默认提取器的令牌字符集
static DEFAULT_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9_-]+").expect("default extractor regex is valid"));

/// 默认提取器：抽取所有 `[A-Za-z0-9_-]+` 片段，全部归入 undetermined
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExtractor;

impl DefaultExtractor {
    /// 直接返回扁平令牌列表
    pub fn tokens(content: &str) -> Vec<String> {
        DEFAULT_TOKEN_REGEX
            .find_iter(content)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

impl Extractor for DefaultExtractor {
    fn extract(&self, content: &str) -> Result<ExtractorResult, BoxError> {
        Ok(ExtractorResult::FlatTokens(Self::tokens(content)))
    }

    fn name(&self) -> &str {
        "default"
    }
}

/// 正则提取器：正则含捕获组时取第 1 组，否则取整段匹配
#[derive(Debug, Clone)]
pub struct RegexExtractor {
    regex: Regex,
}

impl RegexExtractor {
    pub fn new(pattern: &str) -> PurgeResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            PurgeError::configuration(format!("invalid extractor pattern `{}`: {}", pattern, e))
        })?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Extractor for RegexExtractor {
    fn extract(&self, content: &str) -> Result<ExtractorResult, BoxError> {
        let tokens = if self.regex.captures_len() > 1 {
            self.regex
                .captures_iter(content)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .collect()
        } else {
            self.regex
                .find_iter(content)
                .map(|m| m.as_str().to_string())
                .collect()
        };
        Ok(ExtractorResult::FlatTokens(tokens))
    }

    fn name(&self) -> &str {
        "regex"
    }
}

/// 扩展名集合 + 提取器
#[derive(Clone)]
pub struct ExtractorEntry {
    pub extensions: Vec<String>,
    pub extractor: Arc<dyn Extractor>,
}

impl ExtractorEntry {
    pub fn new<I, S>(extensions: I, extractor: Arc<dyn Extractor>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| normalize_extension(&ext.into()))
                .collect(),
            extractor,
        }
    }
}

impl fmt::Debug for ExtractorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorEntry")
            .field("extensions", &self.extensions)
            .field("extractor", &self.extractor.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DetailedTokens;

    #[test]
    fn test_default_extractor() {
        let result = DefaultExtractor
            .extract(r#"<div class="btn btn-primary" id="main_1"></div>"#)
            .unwrap();
        let ExtractorResult::FlatTokens(tokens) = result else {
            panic!("default extractor must return flat tokens");
        };
        for expected in ["div", "class", "btn", "btn-primary", "id", "main_1"] {
            assert!(tokens.iter().any(|t| t == expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_regex_extractor_capture_group() {
        let extractor = RegexExtractor::new(r#"class="([^"]+)""#).unwrap();
        let result = extractor.extract(r#"<a class="link"></a><b class="bold"></b>"#).unwrap();
        assert_eq!(
            result,
            ExtractorResult::FlatTokens(vec!["link".into(), "bold".into()])
        );
    }

    #[test]
    fn test_invalid_regex_extractor_is_configuration_error() {
        let err = RegexExtractor::new("(unclosed").unwrap_err();
        assert!(matches!(err, PurgeError::ConfigurationError(_)));
    }

    #[test]
    fn test_closure_extractor() {
        let extractor: Arc<dyn Extractor> = Arc::new(|content: &str| -> Result<ExtractorResult, BoxError> {
            Ok(DetailedTokens {
                classes: content.split_whitespace().map(String::from).collect(),
                ..Default::default()
            }
            .into())
        });
        let result = extractor.extract("a b").unwrap();
        assert_eq!(result.token_count(), 2);
        assert_eq!(extractor.name(), "custom");
    }
}
