use std::fmt::{self, Display, Formatter};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PurgeError, PurgeResult};

/// 未编译的名单条目：字面量或正则
/// 文本形式中 `/body/flags` 视为正则（支持 `i` 标志），其余视为字面量
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternSource {
    Literal(String),
    Regex(String),
}

impl PatternSource {
    pub fn literal(value: impl Into<String>) -> Self {
        PatternSource::Literal(value.into())
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        PatternSource::Regex(pattern.into())
    }

    /// 解析文本形式（JSON / CLI）
    pub fn parse(raw: &str) -> Self {
        if raw.len() >= 2 && raw.starts_with('/') {
            if let Some(end) = raw.rfind('/') {
                let flags = &raw[end + 1..];
                if end > 0 && flags.chars().all(|c| c == 'i' || c == 'g' || c == 'm') {
                    let body = &raw[1..end];
                    let pattern = if flags.contains('i') {
                        format!("(?i){}", body)
                    } else {
                        body.to_string()
                    };
                    return PatternSource::Regex(pattern);
                }
            }
        }
        PatternSource::Literal(raw.to_string())
    }
}

impl From<&str> for PatternSource {
    fn from(value: &str) -> Self {
        PatternSource::Literal(value.to_string())
    }
}

impl From<String> for PatternSource {
    fn from(value: String) -> Self {
        PatternSource::Literal(value)
    }
}

impl From<Regex> for PatternSource {
    fn from(regex: Regex) -> Self {
        PatternSource::Regex(regex.as_str().to_string())
    }
}

impl Display for PatternSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PatternSource::Literal(value) => f.write_str(value),
            PatternSource::Regex(pattern) => match pattern.strip_prefix("(?i)") {
                Some(body) => write!(f, "/{}/i", body),
                None => write!(f, "/{}/", pattern),
            },
        }
    }
}

impl Serialize for PatternSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PatternSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(PatternSource::parse(&raw))
    }
}

/// 字面量条目的匹配方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralMode {
    /// 精确相等（standard / deep / variables / keyframes / blocklist）
    Exact,
    /// 子串包含（greedy）
    Contains,
}

/// 运行期匹配器
#[derive(Debug, Clone)]
pub enum Matcher {
    Exact(String),
    Contains(String),
    Regex(Regex),
}

impl Matcher {
    /// 编译名单条目，非法正则报配置错误
    pub fn compile(source: &PatternSource, mode: LiteralMode) -> PurgeResult<Self> {
        match source {
            PatternSource::Literal(value) => Ok(match mode {
                LiteralMode::Exact => Matcher::Exact(value.clone()),
                LiteralMode::Contains => Matcher::Contains(value.clone()),
            }),
            PatternSource::Regex(pattern) => Regex::new(pattern).map(Matcher::Regex).map_err(|e| {
                PurgeError::configuration(format!("malformed pattern `{}`: {}", source, e))
            }),
        }
    }

    /// 正则为搜索语义（未锚定），需要整串匹配时由用户自行加 ^$
    #[inline]
    pub fn matches(&self, input: &str) -> bool {
        match self {
            Matcher::Exact(value) => input == value,
            Matcher::Contains(value) => input.contains(value.as_str()),
            Matcher::Regex(regex) => regex.is_match(input),
        }
    }

    /// 描述匹配器规则（用于日志）
    pub fn describe(&self) -> String {
        match self {
            Matcher::Exact(value) => format!("exact: {}", value),
            Matcher::Contains(value) => format!("contains: {}", value),
            Matcher::Regex(regex) => format!("regex: {}", regex.as_str()),
        }
    }
}

/// 一组匹配器，任一命中即命中
#[derive(Debug, Clone, Default)]
pub struct MatcherSet {
    matchers: Vec<Matcher>,
}

impl MatcherSet {
    pub fn compile(sources: &[PatternSource], mode: LiteralMode) -> PurgeResult<Self> {
        let matchers = sources
            .iter()
            .map(|source| Matcher::compile(source, mode))
            .collect::<PurgeResult<Vec<_>>>()?;
        Ok(Self { matchers })
    }

    #[inline]
    pub fn is_match(&self, input: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(input))
    }

    /// 返回第一个命中的匹配器
    pub fn find(&self, input: &str) -> Option<&Matcher> {
        self.matchers.iter().find(|m| m.matches(input))
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}
