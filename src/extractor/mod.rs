//! 提取模块：内置 HTML 提取器与按名称解析提取器

use std::sync::Arc;

use purgecss_engine::{DefaultExtractor, Extractor, PatternSource, RegexExtractor};

use crate::error::{CssResult, PurgeCssError};

pub mod html_extractor;

pub use self::html_extractor::{HtmlExtractor, HTML_EXTENSIONS};

/// 按配置中的名称解析提取器：`default` / `html` / `/regex/flags`
pub fn resolve_named_extractor(name: &str) -> CssResult<Arc<dyn Extractor>> {
    match name.trim() {
        "default" => Ok(Arc::new(DefaultExtractor)),
        "html" => Ok(Arc::new(HtmlExtractor::new())),
        other => match PatternSource::parse(other) {
            PatternSource::Regex(pattern) => Ok(Arc::new(RegexExtractor::new(&pattern)?)),
            PatternSource::Literal(_) => Err(PurgeCssError::InvalidInput(format!(
                "unknown extractor `{}` (expected `default`, `html` or `/pattern/`)",
                other
            ))),
        },
    }
}
