//! purgecss-engine 内核错误定义
//! 封装内核层所有错误，与 I/O 层错误解耦，基于 thiserror 实现类型安全处理
use thiserror::Error;

/// 内核核心错误枚举
#[derive(Error, Debug)]
pub enum PurgeError {
    // ===================== 配置相关错误 =====================
    /// 配置非法或自相矛盾（扩展名无匹配且无默认提取器、正则非法等）
    /// 在任何提取开始之前中止本次运行
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ===================== 提取相关错误 =====================
    /// 提取器执行失败或返回了非法结果
    #[error("Extraction failed for `{source_name}`: {cause}")]
    ExtractionError { source_name: String, cause: String },

    // ===================== CSS 相关错误 =====================
    /// 样式表解析失败，携带来源名称与出错位置
    #[error("CSS parse failed in `{source_name}` at {line}:{column}: {reason}")]
    CssParseError {
        source_name: String,
        line: usize,
        column: usize,
        reason: String,
    },

    /// Source map 序列化失败
    #[error("Source map serialization failed: {0}")]
    SourceMapError(#[from] sourcemap::Error),
}

impl PurgeError {
    /// 构造配置错误
    pub fn configuration(message: impl Into<String>) -> Self {
        PurgeError::ConfigurationError(message.into())
    }

    /// 错误关联的来源名称（提取/解析错误才有）
    pub fn source_name(&self) -> Option<&str> {
        match self {
            PurgeError::ExtractionError { source_name, .. }
            | PurgeError::CssParseError { source_name, .. } => Some(source_name),
            _ => None,
        }
    }
}

/// 内核层全局 Result 类型别名
pub type PurgeResult<T> = Result<T, PurgeError>;
