//! 全局错误类型定义

use std::io::Error as IoError;
use std::path::PathBuf;

use purgecss_engine::PurgeError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PurgeCssError {
    // 内核错误（配置 / 提取 / 解析）
    #[error(transparent)]
    Engine(#[from] PurgeError),

    // 文件相关错误
    #[error("IO operation failed on `{}`: {source}", path.display())]
    Io { path: PathBuf, source: IoError },
    #[error("Standard stream operation failed: {0}")]
    Stream(#[source] IoError),
    #[error("Invalid glob pattern `{pattern}`: {reason}")]
    GlobError { pattern: String, reason: String },

    // 配置相关错误
    #[error("Config parse failed: {0}")]
    JsonError(#[from] SerdeJsonError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // 并发任务错误
    #[error("Background task failed: {0}")]
    TaskError(String),
}

impl PurgeCssError {
    pub fn io(path: impl Into<PathBuf>, source: IoError) -> Self {
        PurgeCssError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn glob(pattern: impl Into<String>, reason: impl ToString) -> Self {
        PurgeCssError::GlobError {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }
}

// 全局Result类型
pub type CssResult<T> = Result<T, PurgeCssError>;
