use rustc_hash::FxHashSet;

use super::pattern::{LiteralMode, MatcherSet, PatternSource};
use super::safelist::{Safelist, UserSafelist};
use crate::core::UsedTokenSet;
use crate::css::selector::{tokenize_component, AttributeSelector, SimpleToken};
use crate::error::PurgeResult;
use crate::utils::preview_compact;

/// 运行期可能变化取值的属性，始终按动态属性处理
pub const BUILTIN_DYNAMIC_ATTRIBUTES: [&str; 4] = ["value", "checked", "selected", "open"];

/// 选择器分量的判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Drop,
    /// 命中 deep 安全名单，保留自身及其嵌套后代
    KeepDeep,
}

impl Verdict {
    #[inline]
    pub fn is_kept(&self) -> bool {
        !matches!(self, Verdict::Drop)
    }
}

/// 选择器匹配器：安全名单 / 黑名单 / 动态属性的编译结果
/// 与 UsedTokenSet 分离，同一份配置可服务多次运行
#[derive(Debug, Clone, Default)]
pub struct SelectorMatcher {
    safelist: Safelist,
    blocklist: MatcherSet,
    dynamic_attributes: FxHashSet<String>,
}

impl SelectorMatcher {
    pub fn compile(
        safelist: &UserSafelist,
        blocklist: &[PatternSource],
        dynamic_attributes: &[String],
    ) -> PurgeResult<Self> {
        let matcher = Self {
            safelist: Safelist::compile(safelist)?,
            blocklist: MatcherSet::compile(blocklist, LiteralMode::Exact)?,
            dynamic_attributes: dynamic_attributes.iter().cloned().collect(),
        };
        log::debug!(
            "Selector matcher compiled | standard: {} | deep: {} | greedy: {} | blocklist: {} | dynamic attributes: {}",
            matcher.safelist.standard.len(),
            matcher.safelist.deep.len(),
            matcher.safelist.greedy.len(),
            matcher.blocklist.len(),
            matcher.dynamic_attributes.len()
        );
        Ok(matcher)
    }

    pub fn safelist(&self) -> &Safelist {
        &self.safelist
    }

    /// 判定单个选择器分量
    /// 从左到右逐个令牌判定（AND 语义）；deep 命中后其右侧令牌全部受保护
    pub fn evaluate_component(&self, component: &str, used: &UsedTokenSet) -> Verdict {
        if let Some(rule) = self.safelist.greedy.find(component) {
            log::trace!(
                "Keep `{}`: greedy safelist ({})",
                preview_compact(component, 80),
                rule.describe()
            );
            return Verdict::Keep;
        }

        let tokens = tokenize_component(component);
        for token in &tokens {
            if let Some(rule) = self.safelist.deep.find(token.value()) {
                log::trace!(
                    "Keep `{}`: deep safelist on {} `{}` ({})",
                    preview_compact(component, 80),
                    token.kind(),
                    token.value(),
                    rule.describe()
                );
                return Verdict::KeepDeep;
            }
            if !self.evaluate_token(token, used) {
                log::trace!(
                    "Drop `{}`: {} `{}` not kept",
                    preview_compact(component, 80),
                    token.kind(),
                    token.value()
                );
                return Verdict::Drop;
            }
        }
        Verdict::Keep
    }

    /// 单个令牌：安全名单 > 黑名单 > 使用判定
    pub fn evaluate_token(&self, token: &SimpleToken, used: &UsedTokenSet) -> bool {
        let value = token.value();
        if self.safelist.standard.is_match(value) || self.safelist.greedy.is_match(value) {
            return true;
        }
        if let Some(rule) = self.blocklist.find(value) {
            log::trace!("Blocked {} `{}` ({})", token.kind(), value, rule.describe());
            return false;
        }
        self.is_used(token, used)
    }

    pub fn is_used(&self, token: &SimpleToken, used: &UsedTokenSet) -> bool {
        match token {
            SimpleToken::Class(name) => used.has_class(name),
            SimpleToken::Id(name) => used.has_id(name),
            SimpleToken::Tag(name) => used.has_tag(name),
            SimpleToken::Attribute(attr) => self.is_attribute_used(attr, used),
        }
    }

    fn is_attribute_used(&self, attr: &AttributeSelector, used: &UsedTokenSet) -> bool {
        if !used.has_attr_name(&attr.name) {
            return false;
        }
        let (operator, expected) = match (&attr.operator, &attr.value) {
            (Some(operator), Some(value)) => (operator, value),
            _ => return true,
        };

        if BUILTIN_DYNAMIC_ATTRIBUTES.contains(&attr.name.as_str()) {
            return true;
        }
        if !self.dynamic_attributes.contains(&attr.name) {
            // 取值约束只对动态属性生效，其余属性无法确认取值
            return false;
        }
        used.any_attr_value(|candidate| operator.matches(candidate, expected, attr.case_insensitive))
    }

    pub fn is_variable_safelisted(&self, name: &str) -> bool {
        self.safelist.variables.is_match(name)
    }

    pub fn is_keyframes_safelisted(&self, name: &str) -> bool {
        self.safelist.keyframes.is_match(name)
    }
}
