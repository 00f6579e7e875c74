//! CSS 过滤：深度优先遍历样式表，逐规则、逐选择器分量判定保留或剔除
//! 主遍历之后依次执行自定义属性、@keyframes、@font-face 收尾遍历

use std::mem;
use std::time::Instant;

use crate::core::UsedTokenSet;
use crate::css::ast::collect_selector_components;
use crate::css::{AtRule, Comment, Node, Rule, Stylesheet};
use crate::matcher::{SelectorMatcher, Verdict};
use crate::report::{RejectedKind, RejectedReport};

pub mod passes;
pub mod usage;

pub use usage::UsageTracker;

/// 收尾遍历开关
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterFlags {
    pub keyframes: bool,
    pub font_face: bool,
    pub variables: bool,
}

impl Default for FilterFlags {
    fn default() -> Self {
        Self {
            keyframes: true,
            font_face: false,
            variables: false,
        }
    }
}

/// 注释指令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Annotation {
    StartIgnore,
    EndIgnore,
    IgnoreNext,
    IgnoreCurrent,
}

fn annotation(comment: &Comment) -> Option<Annotation> {
    match comment.text.trim().trim_start_matches('!').trim() {
        "purgecss start ignore" => Some(Annotation::StartIgnore),
        "purgecss end ignore" => Some(Annotation::EndIgnore),
        "purgecss ignore" => Some(Annotation::IgnoreNext),
        "purgecss ignore current" => Some(Annotation::IgnoreCurrent),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct FilterStats {
    kept: usize,
    dropped: usize,
    protected_rules: usize,
}

/// 单个样式表的过滤器，一次运行一个实例
pub struct CssFilter<'a> {
    matcher: &'a SelectorMatcher,
    used: &'a UsedTokenSet,
    flags: FilterFlags,
    report: RejectedReport,
    /// start ignore / end ignore 区间内
    ignoring: bool,
    /// 下一条规则受保护
    ignore_next: bool,
    stats: FilterStats,
}

impl<'a> CssFilter<'a> {
    pub fn new(matcher: &'a SelectorMatcher, used: &'a UsedTokenSet, flags: FilterFlags) -> Self {
        Self {
            matcher,
            used,
            flags,
            report: RejectedReport::default(),
            ignoring: false,
            ignore_next: false,
            stats: FilterStats::default(),
        }
    }

    /// 过滤整张样式表，返回保留树与剔除报告
    pub fn run(mut self, stylesheet: Stylesheet) -> (Stylesheet, RejectedReport) {
        let start = Instant::now();
        let Stylesheet { nodes, source_name } = stylesheet;
        self.report = RejectedReport::new(source_name.clone());

        let mut nodes = self.filter_nodes(nodes, false);

        if self.flags.variables || self.flags.keyframes || self.flags.font_face {
            let usage = UsageTracker::scan(&nodes);
            if self.flags.variables {
                let safelisted = usage
                    .variable_definitions
                    .iter()
                    .filter(|name| self.matcher.is_variable_safelisted(name))
                    .cloned()
                    .collect::<Vec<_>>();
                let used_variables = usage.used_variables(safelisted);
                nodes = passes::remove_unused_variables(nodes, &used_variables, self.matcher, &mut self.report);
            }
            if self.flags.keyframes {
                nodes = passes::remove_unused_keyframes(nodes, &usage, self.matcher, &mut self.report);
            }
            if self.flags.font_face {
                nodes = passes::remove_unused_font_faces(nodes, &usage, &mut self.report);
            }
        }

        log::debug!(
            "Filtered `{}` | kept selectors: {} | dropped selectors: {} | protected rules: {} | rejected entries: {} | time: {:?}",
            source_name.as_deref().unwrap_or("<inline css>"),
            self.stats.kept,
            self.stats.dropped,
            self.stats.protected_rules,
            self.report.len(),
            start.elapsed()
        );
        (Stylesheet::new(nodes, source_name), self.report)
    }

    /// protected 为 true 时整棵子树不做判定（deep 安全名单或忽略注释）
    fn filter_nodes(&mut self, nodes: Vec<Node>, protected: bool) -> Vec<Node> {
        let mut kept = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Node::Comment(comment) => match annotation(&comment) {
                    Some(Annotation::StartIgnore) => self.ignoring = true,
                    Some(Annotation::EndIgnore) => self.ignoring = false,
                    Some(Annotation::IgnoreNext) => self.ignore_next = true,
                    Some(Annotation::IgnoreCurrent) => {}
                    None => kept.push(Node::Comment(comment)),
                },
                Node::Rule(rule) => {
                    if let Some(rule) = self.filter_rule(rule, protected) {
                        kept.push(Node::Rule(rule));
                    }
                }
                Node::AtRule(at_rule) => {
                    if let Some(at_rule) = self.filter_at_rule(at_rule, protected) {
                        kept.push(Node::AtRule(at_rule));
                    }
                }
                Node::Declaration(decl) => kept.push(Node::Declaration(decl)),
            }
        }
        kept
    }

    fn filter_rule(&mut self, mut rule: Rule, protected: bool) -> Option<Rule> {
        let ignore_current = rule
            .nodes
            .iter()
            .any(|node| matches!(node, Node::Comment(c) if annotation(c) == Some(Annotation::IgnoreCurrent)));
        let ignore_next = mem::take(&mut self.ignore_next);

        if protected || self.ignoring || ignore_next || ignore_current {
            self.stats.protected_rules += 1;
            rule.nodes = self.filter_nodes(mem::take(&mut rule.nodes), true);
            return Some(rule);
        }

        let was_empty = rule.is_empty();
        let mut kept = Vec::new();
        let mut rejected = Vec::new();
        let mut deep = false;
        for component in rule.selectors() {
            match self.matcher.evaluate_component(&component, self.used) {
                Verdict::Drop => rejected.push(component),
                Verdict::KeepDeep => {
                    deep = true;
                    kept.push(component);
                }
                Verdict::Keep => kept.push(component),
            }
        }
        self.stats.kept += kept.len();
        self.stats.dropped += rejected.len();

        if kept.is_empty() && !rejected.is_empty() {
            for component in rejected {
                self.report.record(RejectedKind::Selector, component, rule.position);
            }
            // 嵌套规则随父规则一起剔除
            let mut nested = Vec::new();
            collect_selector_components(&rule.nodes, &mut nested);
            self.stats.dropped += nested.len();
            for component in nested {
                self.report.record(RejectedKind::Selector, component, rule.position);
            }
            self.report.record_css(Node::Rule(rule));
            return None;
        }

        if !rejected.is_empty() {
            self.report.record_css(Node::Rule(Rule {
                selector: rejected.join(", "),
                nodes: rule
                    .nodes
                    .iter()
                    .filter(|node| matches!(node, Node::Declaration(_)))
                    .cloned()
                    .collect(),
                position: rule.position,
            }));
            for component in rejected {
                self.report.record(RejectedKind::Selector, component, rule.position);
            }
            rule.selector = kept.join(", ");
        }

        rule.nodes = self.filter_nodes(mem::take(&mut rule.nodes), deep);
        if !was_empty && rule.is_empty() {
            for component in kept {
                self.report.record(RejectedKind::EmptyRule, component, rule.position);
            }
            return None;
        }
        Some(rule)
    }

    fn filter_at_rule(&mut self, mut at_rule: AtRule, protected: bool) -> Option<AtRule> {
        let ignore_next = mem::take(&mut self.ignore_next);
        // 关键帧选择器与 @font-face 描述符不参与选择器判定
        if at_rule.is_keyframes() || at_rule.is_font_face() {
            return Some(at_rule);
        }
        let Some(children) = at_rule.nodes.take() else {
            return Some(at_rule);
        };
        let was_empty = children.iter().all(Node::is_comment);
        let protected = protected || self.ignoring || ignore_next;
        let children = self.filter_nodes(children, protected);
        let now_empty = children.iter().all(Node::is_comment);
        at_rule.nodes = Some(children);
        if !was_empty && now_empty {
            log::trace!("Prune empty @{} {}", at_rule.name, at_rule.params);
            return None;
        }
        Some(at_rule)
    }
}
