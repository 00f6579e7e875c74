use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// 属性令牌（名称/取值两个桶）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeTokens {
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
}

/// 明细提取结果：五个相互独立的令牌桶
/// 保留顺序、允许重复，去重在合并阶段完成
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedTokens {
    #[serde(default)]
    pub attributes: AttributeTokens,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub undetermined: Vec<String>,
}

/// 提取函数的返回值
/// FlatTokens 全部归入 undetermined 桶；DetailedTokens 按桶分别合并
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractorResult {
    FlatTokens(Vec<String>),
    DetailedTokens(DetailedTokens),
}

impl From<Vec<String>> for ExtractorResult {
    fn from(tokens: Vec<String>) -> Self {
        ExtractorResult::FlatTokens(tokens)
    }
}

impl From<DetailedTokens> for ExtractorResult {
    fn from(tokens: DetailedTokens) -> Self {
        ExtractorResult::DetailedTokens(tokens)
    }
}

impl ExtractorResult {
    /// 令牌总数（含重复）
    pub fn token_count(&self) -> usize {
        match self {
            ExtractorResult::FlatTokens(tokens) => tokens.len(),
            ExtractorResult::DetailedTokens(d) => {
                d.attributes.names.len()
                    + d.attributes.values.len()
                    + d.classes.len()
                    + d.ids.len()
                    + d.tags.len()
                    + d.undetermined.len()
            }
        }
    }
}

/// 单次运行的已用令牌集合，构建完成后只读
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedTokenSet {
    pub attr_names: FxHashSet<String>,
    pub attr_values: FxHashSet<String>,
    pub classes: FxHashSet<String>,
    pub ids: FxHashSet<String>,
    pub tags: FxHashSet<String>,
    /// 无法在提取期归类的令牌，与所有类型的选择器令牌比对
    pub undetermined: FxHashSet<String>,
}

impl UsedTokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 归一化并合并一次提取结果
    pub fn merge(&mut self, result: ExtractorResult) {
        match result {
            ExtractorResult::FlatTokens(tokens) => extend_bucket(&mut self.undetermined, tokens),
            ExtractorResult::DetailedTokens(detailed) => {
                extend_bucket(&mut self.attr_names, detailed.attributes.names);
                extend_bucket(&mut self.attr_values, detailed.attributes.values);
                extend_bucket(&mut self.classes, detailed.classes);
                extend_bucket(&mut self.ids, detailed.ids);
                // 标签名大小写不敏感
                extend_bucket(
                    &mut self.tags,
                    detailed.tags.into_iter().map(|t| t.to_ascii_lowercase()),
                );
                extend_bucket(&mut self.undetermined, detailed.undetermined);
            }
        }
    }

    /// 集合并集，满足交换律与结合律，并行提取时顺序无关
    pub fn union(&mut self, other: UsedTokenSet) {
        self.attr_names.extend(other.attr_names);
        self.attr_values.extend(other.attr_values);
        self.classes.extend(other.classes);
        self.ids.extend(other.ids);
        self.tags.extend(other.tags);
        self.undetermined.extend(other.undetermined);
    }

    pub fn len(&self) -> usize {
        self.attr_names.len()
            + self.attr_values.len()
            + self.classes.len()
            + self.ids.len()
            + self.tags.len()
            + self.undetermined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class) || self.undetermined.contains(class)
    }

    #[inline]
    pub fn has_id(&self, id: &str) -> bool {
        self.ids.contains(id) || self.undetermined.contains(id)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        if self.tags.contains(tag) || self.undetermined.contains(tag) {
            return true;
        }
        let lower = tag.to_ascii_lowercase();
        self.tags.contains(&lower) || self.undetermined.contains(&lower)
    }

    #[inline]
    pub fn has_attr_name(&self, name: &str) -> bool {
        self.attr_names.contains(name) || self.undetermined.contains(name)
    }

    /// 属性值候选（值桶 + 未归类桶），用于前缀/后缀/子串匹配
    pub fn attr_value_candidates(&self) -> impl Iterator<Item = &str> {
        self.attr_values
            .iter()
            .chain(self.undetermined.iter())
            .map(String::as_str)
    }

    /// 是否存在满足谓词的属性值
    pub fn any_attr_value(&self, predicate: impl Fn(&str) -> bool) -> bool {
        self.attr_value_candidates().any(predicate)
    }
}

fn extend_bucket(bucket: &mut FxHashSet<String>, tokens: impl IntoIterator<Item = String>) {
    bucket.extend(tokens.into_iter().filter(|t| !t.is_empty()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flat_tokens_go_to_undetermined() {
        let mut used = UsedTokenSet::new();
        used.merge(strings(&["btn", "", "header"]).into());
        assert_eq!(used.undetermined.len(), 2);
        assert!(used.has_class("btn"));
        assert!(used.has_id("header"));
        assert!(used.has_tag("btn"));
        assert!(used.classes.is_empty());
    }

    #[test]
    fn test_detailed_tokens_fill_buckets() {
        let mut used = UsedTokenSet::new();
        used.merge(
            DetailedTokens {
                attributes: AttributeTokens {
                    names: strings(&["data-state"]),
                    values: strings(&["open"]),
                },
                classes: strings(&["card", "card"]),
                ids: strings(&["main"]),
                tags: strings(&["DIV"]),
                undetermined: vec![],
            }
            .into(),
        );
        assert!(used.has_class("card"));
        assert!(!used.has_id("card"));
        assert!(used.has_tag("div"));
        assert!(used.has_tag("DIV"));
        assert!(used.has_attr_name("data-state"));
        assert!(used.attr_value_candidates().any(|value| value == "open"));
        assert_eq!(used.classes.len(), 1);
    }

    #[test]
    fn test_union_is_order_independent() {
        let mut a = UsedTokenSet::new();
        a.merge(strings(&["x", "y"]).into());
        let mut b = UsedTokenSet::new();
        b.merge(
            DetailedTokens {
                classes: strings(&["z"]),
                ..Default::default()
            }
            .into(),
        );

        let mut ab = a.clone();
        ab.union(b.clone());
        let mut ba = b;
        ba.union(a);
        assert_eq!(ab, ba);
        assert_eq!(ab.len(), 3);
    }
}
