mod content;
mod options;
mod tokens;

// 导出常用项
pub use content::{normalize_extension, ContentSource, CssSource};
pub use options::{PurgeOptions, PurgeOptionsBuilder, SourceMapOptions, SourceMapSetting};
pub use tokens::{AttributeTokens, DetailedTokens, ExtractorResult, UsedTokenSet};
