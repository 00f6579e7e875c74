//! 净化编排：选项编译 → 令牌收集 → 逐样式表过滤 → 输出组装

use std::time::Instant;

use serde::Serialize;

use crate::core::{ContentSource, CssSource, PurgeOptions, SourceMapOptions, UsedTokenSet};
use crate::css::{parse_stylesheet, to_data_url, to_json, Printer, SourceMapGenerator, Stylesheet};
use crate::error::PurgeResult;
use crate::extractor::{ExtractorRegistry, TokenCollector};
use crate::filter::{CssFilter, FilterFlags};
use crate::matcher::SelectorMatcher;
use crate::report::RejectedReport;

/// 单个样式表的净化结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgedCss {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub css: String,
    /// 保留树，可继续交给后续处理
    #[serde(skip)]
    pub stylesheet: Stylesheet,
    /// Source map JSON（内联模式下为 None，已写入 css 末尾）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_map: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_css: Option<String>,
    #[serde(skip)]
    pub report: RejectedReport,
}

/// 净化器：构造时完成全部配置校验，之后可对任意多组输入运行
pub struct PurgeCss {
    options: PurgeOptions,
    registry: ExtractorRegistry,
    matcher: SelectorMatcher,
    source_map: Option<SourceMapOptions>,
}

impl PurgeCss {
    /// 编译选项：注册表、安全名单五通道归一化、正则编译
    /// 非法正则在任何提取之前报 ConfigurationError
    pub fn new(options: PurgeOptions) -> PurgeResult<Self> {
        let registry = ExtractorRegistry::from_entries(options.default_extractor.clone(), &options.extractors);
        let matcher = SelectorMatcher::compile(
            &options.safelist,
            &options.blocklist,
            &options.dynamic_attributes,
        )?;
        let source_map = options.source_map.resolve();
        log::debug!(
            "PurgeCss initialized | extractors: {} | default extractor: {} | keyframes: {} | font-face: {} | variables: {}",
            registry.len(),
            registry.has_default(),
            options.keyframes,
            options.font_face,
            options.variables
        );
        Ok(Self {
            options,
            registry,
            matcher,
            source_map,
        })
    }

    pub fn options(&self) -> &PurgeOptions {
        &self.options
    }

    fn flags(&self) -> FilterFlags {
        FilterFlags {
            keyframes: self.options.keyframes,
            font_face: self.options.font_face,
            variables: self.options.variables,
        }
    }

    /// 收集全部内容来源的已用令牌
    pub fn collect_tokens(&self, content: &[ContentSource]) -> PurgeResult<UsedTokenSet> {
        TokenCollector::new(&self.registry).collect(content)
    }

    /// 过滤已解析的样式表
    pub fn purge_tree(&self, stylesheet: Stylesheet, used: &UsedTokenSet) -> (Stylesheet, RejectedReport) {
        CssFilter::new(&self.matcher, used, self.flags()).run(stylesheet)
    }

    /// 解析、过滤并序列化单个样式表；失败时不产生任何部分结果
    pub fn purge_stylesheet(&self, source: &CssSource, used: &UsedTokenSet) -> PurgeResult<PurgedCss> {
        let start = Instant::now();
        let display_name = source.display_name();
        let stylesheet = parse_stylesheet(&source.raw, Some(display_name.as_str()))?;
        let (stylesheet, report) = self.purge_tree(stylesheet, used);

        let (css, source_map) = match &self.source_map {
            Some(map_options) => self.print_with_source_map(&stylesheet, source, map_options)?,
            None => (stylesheet.to_css(), None),
        };

        log::debug!(
            "Purged `{}` | rejected: {} | output bytes: {} | time: {:?}",
            display_name,
            report.len(),
            css.len(),
            start.elapsed()
        );

        Ok(PurgedCss {
            file: source.name.clone(),
            css,
            source_map,
            rejected: self.options.rejected.then(|| report.selectors()),
            rejected_css: self.options.rejected_css.then(|| report.to_css()),
            stylesheet,
            report,
        })
    }

    fn print_with_source_map(
        &self,
        stylesheet: &Stylesheet,
        source: &CssSource,
        map_options: &SourceMapOptions,
    ) -> PurgeResult<(String, Option<String>)> {
        let file = map_options.to.clone().or_else(|| source.name.clone());
        let generator = SourceMapGenerator::new(
            file.as_deref(),
            &source.display_name(),
            Some(source.raw.as_str()),
        );
        let mut printer = Printer::with_source_map(generator);
        printer.print_nodes(&stylesheet.nodes);
        let (mut css, map) = printer.finish();
        let Some(map) = map else {
            return Ok((css, None));
        };

        if map_options.inline {
            css.push_str(&format!("/*# sourceMappingURL={} */\n", to_data_url(&map)?));
            return Ok((css, None));
        }
        if map_options.annotation {
            let target = file.unwrap_or_else(|| "out.css".to_string());
            css.push_str(&format!("/*# sourceMappingURL={}.map */\n", target));
        }
        Ok((css, Some(to_json(&map)?)))
    }

    /// 完整运行：先收集令牌（失败即中止），再逐个样式表独立过滤
    /// 单个样式表失败只体现在其对应条目中，不影响其他样式表
    pub fn purge(&self, content: &[ContentSource], css: &[CssSource]) -> PurgeResult<Vec<PurgeResult<PurgedCss>>> {
        let used = self.collect_tokens(content)?;
        Ok(css
            .iter()
            .map(|source| {
                self.purge_stylesheet(source, &used).inspect_err(|e| {
                    log::warn!("Stylesheet `{}` failed: {}", source.display_name(), e);
                })
            })
            .collect())
    }
}

impl std::fmt::Debug for PurgeCss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PurgeCss")
            .field("options", &self.options)
            .field("registry", &self.registry)
            .finish()
    }
}
