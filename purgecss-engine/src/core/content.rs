use serde::{Deserialize, Serialize};

/// 内容来源（内存形态）
/// 文件引用由上层解析为内存形态后再交给内核，内核本身不做任何 I/O
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSource {
    /// 归一化后的扩展名（小写、无前导点）
    pub extension: String,
    /// 原始内容
    pub raw: String,
    /// 来源名称（文件路径等），仅用于日志与错误提示
    #[serde(default)]
    pub name: Option<String>,
    /// 尽力模式：提取失败时记录告警并视为空结果，而不是中止运行
    #[serde(default)]
    pub best_effort: bool,
}

impl ContentSource {
    pub fn new(extension: impl AsRef<str>, raw: impl Into<String>) -> Self {
        Self {
            extension: normalize_extension(extension.as_ref()),
            raw: raw.into(),
            name: None,
            best_effort: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn best_effort(mut self, best_effort: bool) -> Self {
        self.best_effort = best_effort;
        self
    }

    /// 错误提示用的展示名称
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("<inline .{}>", self.extension),
        }
    }
}

/// 样式表来源（内存形态）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssSource {
    pub raw: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl CssSource {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| "<inline css>".to_string())
    }
}

/// 扩展名归一化：去空白、去前导点、ASCII 小写
pub fn normalize_extension(extension: &str) -> String {
    extension
        .trim()
        .trim_start_matches('.')
        .to_ascii_lowercase()
}
