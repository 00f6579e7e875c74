//! 运行选项：每次运行一份不可变配置，由 PurgeCss::new 编译为运行期结构

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::extractor::{DefaultExtractor, Extractor, ExtractorEntry};
use crate::matcher::{PatternSource, UserSafelist};

/// Source map 细项配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceMapOptions {
    /// 以 base64 data URL 内联到输出 CSS 末尾
    pub inline: bool,
    /// 追加指向外部 `.map` 文件的注释
    pub annotation: bool,
    /// 输出文件名，写入 map 的 `file` 字段
    pub to: Option<String>,
}

/// Source map 开关：布尔值或细项配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceMapSetting {
    Toggle(bool),
    Options(SourceMapOptions),
}

impl Default for SourceMapSetting {
    fn default() -> Self {
        SourceMapSetting::Toggle(false)
    }
}

impl SourceMapSetting {
    /// 解析为最终配置，None 表示不生成
    pub fn resolve(&self) -> Option<SourceMapOptions> {
        match self {
            SourceMapSetting::Toggle(false) => None,
            SourceMapSetting::Toggle(true) => Some(SourceMapOptions::default()),
            SourceMapSetting::Options(options) => Some(options.clone()),
        }
    }
}

/// 用户选项
#[derive(Clone)]
pub struct PurgeOptions {
    /// 无扩展名匹配时的兜底提取器，None 时未匹配扩展名视为配置错误
    pub default_extractor: Option<Arc<dyn Extractor>>,
    /// 扩展名 → 提取器注册表，后注册者优先
    pub extractors: Vec<ExtractorEntry>,
    pub font_face: bool,
    pub keyframes: bool,
    pub variables: bool,
    pub rejected: bool,
    pub rejected_css: bool,
    pub safelist: UserSafelist,
    pub blocklist: Vec<PatternSource>,
    /// 这些属性的取值参与使用判定
    pub dynamic_attributes: Vec<String>,
    pub source_map: SourceMapSetting,
}

impl Default for PurgeOptions {
    fn default() -> Self {
        Self {
            default_extractor: Some(Arc::new(DefaultExtractor)),
            extractors: Vec::new(),
            font_face: false,
            keyframes: true,
            variables: false,
            rejected: false,
            rejected_css: false,
            safelist: UserSafelist::default(),
            blocklist: Vec::new(),
            dynamic_attributes: Vec::new(),
            source_map: SourceMapSetting::default(),
        }
    }
}

impl fmt::Debug for PurgeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PurgeOptions")
            .field(
                "default_extractor",
                &self.default_extractor.as_ref().map(|e| e.name().to_string()),
            )
            .field("extractors", &self.extractors)
            .field("font_face", &self.font_face)
            .field("keyframes", &self.keyframes)
            .field("variables", &self.variables)
            .field("rejected", &self.rejected)
            .field("rejected_css", &self.rejected_css)
            .field("safelist", &self.safelist)
            .field("blocklist", &self.blocklist)
            .field("dynamic_attributes", &self.dynamic_attributes)
            .field("source_map", &self.source_map)
            .finish()
    }
}

impl PurgeOptions {
    pub fn builder() -> PurgeOptionsBuilder {
        PurgeOptionsBuilder::new()
    }
}

/// 选项构建器（链式 API）
#[derive(Debug, Clone, Default)]
pub struct PurgeOptionsBuilder {
    options: PurgeOptions,
}

impl PurgeOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.options.default_extractor = Some(extractor);
        self
    }

    /// 移除兜底提取器（未匹配扩展名将报配置错误）
    pub fn no_default_extractor(mut self) -> Self {
        self.options.default_extractor = None;
        self
    }

    pub fn extractor<I, S>(mut self, extensions: I, extractor: Arc<dyn Extractor>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options
            .extractors
            .push(ExtractorEntry::new(extensions, extractor));
        self
    }

    pub fn font_face(mut self, enabled: bool) -> Self {
        self.options.font_face = enabled;
        self
    }

    pub fn keyframes(mut self, enabled: bool) -> Self {
        self.options.keyframes = enabled;
        self
    }

    pub fn variables(mut self, enabled: bool) -> Self {
        self.options.variables = enabled;
        self
    }

    pub fn rejected(mut self, enabled: bool) -> Self {
        self.options.rejected = enabled;
        self
    }

    pub fn rejected_css(mut self, enabled: bool) -> Self {
        self.options.rejected_css = enabled;
        self
    }

    pub fn safelist(mut self, safelist: impl Into<UserSafelist>) -> Self {
        self.options.safelist = safelist.into();
        self
    }

    pub fn blocklist<I, P>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PatternSource>,
    {
        self.options.blocklist = entries.into_iter().map(Into::into).collect();
        self
    }

    pub fn dynamic_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.dynamic_attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn source_map(mut self, setting: SourceMapSetting) -> Self {
        self.options.source_map = setting;
        self
    }

    pub fn build(self) -> PurgeOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = PurgeOptions::default();
        assert!(options.default_extractor.is_some());
        assert!(options.keyframes);
        assert!(!options.font_face);
        assert!(!options.variables);
        assert_eq!(options.source_map.resolve(), None);
    }

    #[test]
    fn test_source_map_setting_from_json() {
        let toggle: SourceMapSetting = serde_json::from_str("true").unwrap();
        assert_eq!(toggle.resolve(), Some(SourceMapOptions::default()));

        let detailed: SourceMapSetting =
            serde_json::from_str(r#"{"inline": true, "to": "out.css"}"#).unwrap();
        let resolved = detailed.resolve().unwrap();
        assert!(resolved.inline);
        assert!(!resolved.annotation);
        assert_eq!(resolved.to.as_deref(), Some("out.css"));
    }

    #[test]
    fn test_builder_chain() {
        let options = PurgeOptions::builder()
            .font_face(true)
            .keyframes(false)
            .blocklist(["btn"])
            .dynamic_attributes(["data-state"])
            .no_default_extractor()
            .build();
        assert!(options.font_face);
        assert!(!options.keyframes);
        assert_eq!(options.blocklist, vec![PatternSource::Literal("btn".into())]);
        assert_eq!(options.dynamic_attributes, vec!["data-state".to_string()]);
        assert!(options.default_extractor.is_none());
    }
}
