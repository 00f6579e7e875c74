// 内容来源、令牌桶、运行选项
pub mod core;
// 样式表模型（解析 / 序列化 / 选择器 / source map）
pub mod css;
// 内核错误定义
pub mod error;
// 提取器、注册表、令牌收集
pub mod extractor;
// 样式表过滤遍历
pub mod filter;
// 安全名单 / 黑名单 / 选择器判定
pub mod matcher;
// 净化编排
pub mod purger;
// 剔除报告
pub mod report;
// 日志格式化工具
pub mod utils;

// 顶层导出常用类型
pub use core::{
    AttributeTokens, ContentSource, CssSource, DetailedTokens, ExtractorResult, PurgeOptions,
    PurgeOptionsBuilder, SourceMapOptions, SourceMapSetting, UsedTokenSet,
};
pub use css::{parse_stylesheet, Stylesheet};
pub use error::{PurgeError, PurgeResult};
pub use extractor::{
    BoxError, DefaultExtractor, Extractor, ExtractorEntry, ExtractorRegistry, RegexExtractor,
    TokenCollector,
};
pub use matcher::{ComplexSafelist, PatternSource, SelectorMatcher, UserSafelist, Verdict};
pub use purger::{PurgeCss, PurgedCss};
pub use report::{RejectedEntry, RejectedKind, RejectedReport, SourceLocation};
