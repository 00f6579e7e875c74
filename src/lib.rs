//! purgecss - 删除样式表中未被内容使用的选择器

// 导出全局错误类型
pub use self::error::{CssResult, PurgeCssError};

// 导出配置模块
pub use self::config::{ContentInput, CssInput, ExtractorSpec, UserDefinedOptions};

// 导出命令行参数
pub use self::cli::Cli;

// 导出提取模块核心接口
pub use self::extractor::{HtmlExtractor, resolve_named_extractor};

// 导出加载与运行接口
pub use self::loader::{expand_pattern, load_content, load_css, read_stdin_content};
pub use self::runner::{OutputTarget, PurgeRunner, RunReport, results_to_json, write_outputs};

// 内核常用类型
pub use purgecss_engine::{
    ContentSource, CssSource, PatternSource, PurgeCss, PurgeOptions, PurgedCss, SourceMapSetting,
    UserSafelist,
};

// 声明所有子模块
pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod loader;
pub mod runner;
