//! 用户配置：JSON 配置文件 + CLI 覆盖，转换为内核运行选项

use std::path::Path;
use std::sync::Arc;

use purgecss_engine::{PatternSource, PurgeOptions, SourceMapSetting, UserSafelist};
use serde::{Deserialize, Serialize};

use crate::error::{CssResult, PurgeCssError};
use crate::extractor::{resolve_named_extractor, HtmlExtractor, HTML_EXTENSIONS};

/// 标准输入内容的默认扩展名
pub const DEFAULT_STDIN_EXTENSION: &str = "html";

/// 内容输入：文件路径（支持 glob）或内存内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentInput {
    Path(String),
    Raw { raw: String, extension: String },
}

/// 样式表输入：文件路径（支持 glob）或内存内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CssInput {
    Path(String),
    Raw {
        raw: String,
        #[serde(default)]
        name: Option<String>,
    },
}

/// 扩展名 → 提取器名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorSpec {
    pub extensions: Vec<String>,
    /// `default` / `html` / `/pattern/flags`
    pub extractor: String,
}

/// 用户配置（字段名与配置文件一致，camelCase）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserDefinedOptions {
    pub content: Vec<ContentInput>,
    pub css: Vec<CssInput>,
    pub default_extractor: Option<String>,
    pub extractors: Vec<ExtractorSpec>,
    pub font_face: bool,
    pub keyframes: bool,
    pub variables: bool,
    pub rejected: bool,
    pub rejected_css: bool,
    pub safelist: UserSafelist,
    pub blocklist: Vec<PatternSource>,
    pub skipped_content_globs: Vec<String>,
    pub dynamic_attributes: Vec<String>,
    pub source_map: SourceMapSetting,
    pub stdin: bool,
    pub stdin_extension: Option<String>,
    pub stdout: bool,
    pub output: Option<String>,
    /// 内容文件读取或提取失败时记录告警并视为空，而不是中止
    pub best_effort: bool,
}

impl Default for UserDefinedOptions {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            css: Vec::new(),
            default_extractor: None,
            extractors: Vec::new(),
            font_face: false,
            keyframes: true,
            variables: false,
            rejected: false,
            rejected_css: false,
            safelist: UserSafelist::default(),
            blocklist: Vec::new(),
            skipped_content_globs: Vec::new(),
            dynamic_attributes: Vec::new(),
            source_map: SourceMapSetting::default(),
            stdin: false,
            stdin_extension: None,
            stdout: false,
            output: None,
            best_effort: false,
        }
    }
}

impl UserDefinedOptions {
    pub fn from_json_str(raw: &str) -> CssResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// 从 JSON 配置文件加载
    pub async fn load(path: impl AsRef<Path>) -> CssResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PurgeCssError::io(path, e))?;
        let options = Self::from_json_str(&raw)?;
        tracing::debug!(
            "Loaded config `{}` | content: {} | css: {}",
            path.display(),
            options.content.len(),
            options.css.len()
        );
        Ok(options)
    }

    pub fn stdin_extension(&self) -> &str {
        self.stdin_extension
            .as_deref()
            .unwrap_or(DEFAULT_STDIN_EXTENSION)
    }

    /// 转换为内核选项
    /// 内置 HTML 提取器先注册，用户注册的提取器可覆盖
    pub fn to_purge_options(&self) -> CssResult<PurgeOptions> {
        let mut builder = PurgeOptions::builder().extractor(HTML_EXTENSIONS, Arc::new(HtmlExtractor::new()));

        if let Some(name) = &self.default_extractor {
            builder = builder.default_extractor(resolve_named_extractor(name)?);
        }
        for spec in &self.extractors {
            if spec.extensions.is_empty() {
                return Err(PurgeCssError::InvalidInput(format!(
                    "extractor `{}` has no extensions",
                    spec.extractor
                )));
            }
            builder = builder.extractor(spec.extensions.clone(), resolve_named_extractor(&spec.extractor)?);
        }

        Ok(builder
            .font_face(self.font_face)
            .keyframes(self.keyframes)
            .variables(self.variables)
            .rejected(self.rejected)
            .rejected_css(self.rejected_css)
            .safelist(self.safelist.clone())
            .blocklist(self.blocklist.clone())
            .dynamic_attributes(self.dynamic_attributes.clone())
            .source_map(self.source_map.clone())
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use purgecss_engine::{ComplexSafelist, SourceMapOptions};

    #[test]
    fn test_parse_full_config() {
        let raw = r#"{
            "content": ["src/**/*.html", {"raw": "<p class=\"x\">", "extension": "html"}],
            "css": ["dist/*.css", {"raw": ".x{}", "name": "inline.css"}],
            "defaultExtractor": "/[A-Za-z0-9_:-]+/",
            "extractors": [{"extensions": ["vue"], "extractor": "html"}],
            "fontFace": true,
            "keyframes": false,
            "variables": true,
            "rejected": true,
            "rejectedCss": true,
            "safelist": {"standard": ["btn"], "deep": ["/^card$/"]},
            "blocklist": ["/^debug-/"],
            "skippedContentGlobs": ["node_modules/**"],
            "dynamicAttributes": ["data-state"],
            "sourceMap": {"inline": false, "annotation": true},
            "stdout": true,
            "output": "out"
        }"#;
        let options = UserDefinedOptions::from_json_str(raw).unwrap();

        assert_eq!(options.content[0], ContentInput::Path("src/**/*.html".into()));
        assert_eq!(
            options.content[1],
            ContentInput::Raw {
                raw: "<p class=\"x\">".into(),
                extension: "html".into()
            }
        );
        assert_eq!(
            options.css[1],
            CssInput::Raw {
                raw: ".x{}".into(),
                name: Some("inline.css".into())
            }
        );
        assert!(options.font_face && !options.keyframes && options.variables);
        assert_eq!(
            options.safelist,
            UserSafelist::Complex(ComplexSafelist {
                standard: vec![PatternSource::literal("btn")],
                deep: vec![PatternSource::regex("^card$")],
                ..Default::default()
            })
        );
        assert_eq!(options.blocklist, vec![PatternSource::regex("^debug-")]);
        assert_eq!(options.skipped_content_globs, vec!["node_modules/**"]);
        assert_eq!(
            options.source_map,
            SourceMapSetting::Options(SourceMapOptions {
                annotation: true,
                ..Default::default()
            })
        );
        assert_eq!(options.output.as_deref(), Some("out"));

        let purge_options = options.to_purge_options().unwrap();
        assert_eq!(purge_options.extractors.len(), 2);
        assert_eq!(purge_options.default_extractor.unwrap().name(), "regex");
    }

    #[test]
    fn test_defaults_when_missing() {
        let options = UserDefinedOptions::from_json_str("{}").unwrap();
        assert_eq!(options, UserDefinedOptions::default());
        assert!(options.keyframes);
        assert_eq!(options.stdin_extension(), "html");

        let purge_options = options.to_purge_options().unwrap();
        assert_eq!(purge_options.default_extractor.unwrap().name(), "default");
    }

    #[test]
    fn test_flat_safelist() {
        let options = UserDefinedOptions::from_json_str(r#"{"safelist": ["a", "/^b/i"]}"#).unwrap();
        assert_eq!(
            options.safelist,
            UserSafelist::Flat(vec![PatternSource::literal("a"), PatternSource::regex("(?i)^b")])
        );
    }

    #[test]
    fn test_invalid_extractor_configs() {
        let unknown = UserDefinedOptions {
            default_extractor: Some("pug".into()),
            ..Default::default()
        };
        assert!(matches!(unknown.to_purge_options(), Err(PurgeCssError::InvalidInput(_))));

        let no_extensions = UserDefinedOptions {
            extractors: vec![ExtractorSpec {
                extensions: vec![],
                extractor: "html".into(),
            }],
            ..Default::default()
        };
        assert!(no_extensions.to_purge_options().is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("purgecss.json");
        tokio::fs::write(&path, r#"{"css": ["a.css"], "rejected": true}"#)
            .await
            .unwrap();
        let options = UserDefinedOptions::load(&path).await.unwrap();
        assert_eq!(options.css, vec![CssInput::Path("a.css".into())]);
        assert!(options.rejected);

        let missing = UserDefinedOptions::load(dir.path().join("missing.json")).await;
        assert!(matches!(missing, Err(PurgeCssError::Io { .. })));
    }
}
