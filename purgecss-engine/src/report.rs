//! 剔除报告：过滤过程的旁路记录，不影响保留树

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::css::{Node, Position, Stylesheet};

/// 剔除项类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectedKind {
    /// 未使用的选择器分量
    Selector,
    /// 过滤后变空而被裁剪的规则的剩余分量
    EmptyRule,
    Keyframes,
    FontFace,
    Variable,
}

impl RejectedKind {
    /// 计入剔除选择器列表的类型
    #[inline]
    pub fn is_selector(&self) -> bool {
        matches!(self, RejectedKind::Selector | RejectedKind::EmptyRule)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedEntry {
    /// 选择器分量或规则描述（`@keyframes spin`、`--brand` 等）
    pub description: String,
    pub kind: RejectedKind,
    pub location: SourceLocation,
}

/// 单个样式表的剔除报告
#[derive(Debug, Clone, Default)]
pub struct RejectedReport {
    source_name: Option<String>,
    entries: Vec<RejectedEntry>,
    css_nodes: Vec<Node>,
}

impl RejectedReport {
    pub fn new(source_name: Option<String>) -> Self {
        Self {
            source_name,
            ..Default::default()
        }
    }

    pub fn record(&mut self, kind: RejectedKind, description: impl Into<String>, position: Position) {
        self.entries.push(RejectedEntry {
            description: description.into(),
            kind,
            location: SourceLocation {
                source: self.source_name.clone(),
                line: position.line,
                column: position.column,
            },
        });
    }

    /// 记录被剔除的 CSS 片段
    pub fn record_css(&mut self, node: Node) {
        self.css_nodes.push(node);
    }

    pub fn entries(&self) -> &[RejectedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 剔除的选择器列表（去重，保持首次出现顺序）
    pub fn selectors(&self) -> Vec<String> {
        let mut seen = FxHashSet::default();
        self.entries
            .iter()
            .filter(|entry| entry.kind.is_selector())
            .filter(|entry| seen.insert(entry.description.as_str()))
            .map(|entry| entry.description.clone())
            .collect()
    }

    /// 指定类型的剔除项描述
    pub fn descriptions(&self, kind: RejectedKind) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.description.as_str())
            .collect()
    }

    /// 剔除内容组成的独立样式表
    pub fn stylesheet(&self) -> Stylesheet {
        Stylesheet::new(self.css_nodes.clone(), self.source_name.clone())
    }

    pub fn to_css(&self) -> String {
        self.stylesheet().to_css()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::Rule;

    #[test]
    fn test_selectors_are_deduplicated_in_order() {
        let mut report = RejectedReport::new(Some("app.css".into()));
        report.record(RejectedKind::Selector, ".b", Position::new(1, 1));
        report.record(RejectedKind::Keyframes, "@keyframes spin", Position::new(2, 1));
        report.record(RejectedKind::EmptyRule, ".a", Position::new(3, 1));
        report.record(RejectedKind::Selector, ".b", Position::new(4, 1));

        assert_eq!(report.selectors(), vec![".b", ".a"]);
        assert_eq!(report.descriptions(RejectedKind::Keyframes), vec!["@keyframes spin"]);
        assert_eq!(report.len(), 4);
        assert_eq!(report.entries()[0].location.source.as_deref(), Some("app.css"));
    }

    #[test]
    fn test_rejected_css_fragment() {
        let mut report = RejectedReport::new(None);
        report.record_css(Node::Rule(Rule {
            selector: ".unused".into(),
            nodes: vec![],
            position: Position::new(1, 1),
        }));
        assert_eq!(report.to_css(), ".unused {}\n");
    }
}
