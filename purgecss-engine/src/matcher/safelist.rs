use serde::{Deserialize, Serialize};

use super::pattern::{LiteralMode, MatcherSet, PatternSource};
use crate::error::PurgeResult;

/// 结构化安全名单：五个相互独立的通道
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexSafelist {
    pub standard: Vec<PatternSource>,
    pub deep: Vec<PatternSource>,
    pub greedy: Vec<PatternSource>,
    pub variables: Vec<PatternSource>,
    pub keyframes: Vec<PatternSource>,
}

/// 用户输入的安全名单：扁平列表（全部视为 standard）或结构化对象
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserSafelist {
    Flat(Vec<PatternSource>),
    Complex(ComplexSafelist),
}

impl Default for UserSafelist {
    fn default() -> Self {
        UserSafelist::Flat(Vec::new())
    }
}

impl From<Vec<PatternSource>> for UserSafelist {
    fn from(entries: Vec<PatternSource>) -> Self {
        UserSafelist::Flat(entries)
    }
}

impl From<ComplexSafelist> for UserSafelist {
    fn from(safelist: ComplexSafelist) -> Self {
        UserSafelist::Complex(safelist)
    }
}

impl UserSafelist {
    /// 归一化为五通道结构，未指定通道默认为空
    pub fn standardize(&self) -> ComplexSafelist {
        match self {
            UserSafelist::Flat(entries) => ComplexSafelist {
                standard: entries.clone(),
                ..Default::default()
            },
            UserSafelist::Complex(complex) => complex.clone(),
        }
    }
}

/// 编译后的五通道安全名单
#[derive(Debug, Clone, Default)]
pub struct Safelist {
    /// 单个简单选择器令牌精确匹配（正则为搜索语义）
    pub standard: MatcherSet,
    /// 命中令牌保护其后代
    pub deep: MatcherSet,
    /// 针对整个选择器分量字符串匹配，字面量为子串包含
    pub greedy: MatcherSet,
    /// 自定义属性名
    pub variables: MatcherSet,
    /// @keyframes 名称
    pub keyframes: MatcherSet,
}

impl Safelist {
    pub fn compile(user: &UserSafelist) -> PurgeResult<Self> {
        let complex = user.standardize();
        Ok(Self {
            standard: MatcherSet::compile(&complex.standard, LiteralMode::Exact)?,
            deep: MatcherSet::compile(&complex.deep, LiteralMode::Exact)?,
            greedy: MatcherSet::compile(&complex.greedy, LiteralMode::Contains)?,
            variables: MatcherSet::compile(&complex.variables, LiteralMode::Exact)?,
            keyframes: MatcherSet::compile(&complex.keyframes, LiteralMode::Exact)?,
        })
    }
}
