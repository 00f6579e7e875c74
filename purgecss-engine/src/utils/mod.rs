//! 日志格式化工具
pub mod log_format;
pub mod preview;

pub use preview::preview_compact;
