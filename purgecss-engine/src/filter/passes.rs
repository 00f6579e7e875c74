//! 主遍历之后的收尾遍历：@keyframes / @font-face / 自定义属性

use rustc_hash::FxHashSet;

use super::usage::{font_family_names, UsageTracker};
use crate::css::{AtRule, Node};
use crate::matcher::SelectorMatcher;
use crate::report::{RejectedKind, RejectedReport};

/// 移除未被 animation / animation-name 引用且未被安全名单保护的 @keyframes
pub fn remove_unused_keyframes(
    nodes: Vec<Node>,
    usage: &UsageTracker,
    matcher: &SelectorMatcher,
    report: &mut RejectedReport,
) -> Vec<Node> {
    retain_at_rules(nodes, report, &mut |at_rule, report| {
        if !at_rule.is_keyframes() {
            return true;
        }
        let name = at_rule.keyframes_name();
        if usage.is_animation_used(&name) || matcher.is_keyframes_safelisted(&name) {
            return true;
        }
        log::trace!("Drop @{} `{}`: no animation references it", at_rule.name, name);
        report.record(
            RejectedKind::Keyframes,
            format!("@{} {}", at_rule.name, name),
            at_rule.position,
        );
        false
    })
}

/// 移除字体族未被任何 font-family / font 声明引用的 @font-face
/// 没有 font-family 描述符的 @font-face 保留
pub fn remove_unused_font_faces(
    nodes: Vec<Node>,
    usage: &UsageTracker,
    report: &mut RejectedReport,
) -> Vec<Node> {
    retain_at_rules(nodes, report, &mut |at_rule, report| {
        if !at_rule.is_font_face() {
            return true;
        }
        let families: Vec<String> = at_rule
            .declarations()
            .filter(|decl| decl.property.eq_ignore_ascii_case("font-family"))
            .flat_map(|decl| font_family_names(&decl.value))
            .collect();
        if families.is_empty() || families.iter().any(|f| usage.is_font_family_used(f)) {
            return true;
        }
        log::trace!("Drop @font-face `{}`: family unused", families.join(", "));
        report.record(
            RejectedKind::FontFace,
            format!("@font-face {}", families.join(", ")),
            at_rule.position,
        );
        false
    })
}

/// 递归筛选 @ 规则；被剔除的节点写入剔除 CSS，因此变空的块级 @ 规则一并裁剪
fn retain_at_rules<F>(nodes: Vec<Node>, report: &mut RejectedReport, keep: &mut F) -> Vec<Node>
where
    F: FnMut(&AtRule, &mut RejectedReport) -> bool,
{
    let mut kept = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::AtRule(mut at_rule) => {
                if !keep(&at_rule, report) {
                    report.record_css(Node::AtRule(at_rule));
                    continue;
                }
                if at_rule.is_keyframes() || at_rule.is_font_face() {
                    kept.push(Node::AtRule(at_rule));
                    continue;
                }
                if let Some(children) = at_rule.nodes.take() {
                    let was_empty = children.iter().all(Node::is_comment);
                    let children = retain_at_rules(children, report, keep);
                    let now_empty = children.iter().all(Node::is_comment);
                    at_rule.nodes = Some(children);
                    if now_empty && !was_empty {
                        continue;
                    }
                }
                kept.push(Node::AtRule(at_rule));
            }
            Node::Rule(mut rule) => {
                rule.nodes = retain_at_rules(std::mem::take(&mut rule.nodes), report, keep);
                kept.push(Node::Rule(rule));
            }
            other => kept.push(other),
        }
    }
    kept
}

/// 移除未使用的自定义属性声明，因此变空的规则一并裁剪并记入剔除选择器
pub fn remove_unused_variables(
    nodes: Vec<Node>,
    used: &FxHashSet<String>,
    matcher: &SelectorMatcher,
    report: &mut RejectedReport,
) -> Vec<Node> {
    let mut kept = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Declaration(decl)
                if decl.is_custom_property()
                    && !used.contains(&decl.property)
                    && !matcher.is_variable_safelisted(&decl.property) =>
            {
                log::trace!("Drop custom property `{}`: never referenced", decl.property);
                report.record(RejectedKind::Variable, decl.property.clone(), decl.position);
            }
            Node::Rule(mut rule) => {
                let was_empty = rule.is_empty();
                rule.nodes = remove_unused_variables(std::mem::take(&mut rule.nodes), used, matcher, report);
                if !was_empty && rule.is_empty() {
                    for component in rule.selectors() {
                        report.record(RejectedKind::EmptyRule, component, rule.position);
                    }
                    continue;
                }
                kept.push(Node::Rule(rule));
            }
            Node::AtRule(mut at_rule) if at_rule.nodes.is_some() && !at_rule.is_keyframes() => {
                let was_empty = at_rule.is_empty_block();
                let children = at_rule.nodes.take().unwrap_or_default();
                at_rule.nodes = Some(remove_unused_variables(children, used, matcher, report));
                if !was_empty && at_rule.is_empty_block() && !at_rule.is_font_face() {
                    continue;
                }
                kept.push(Node::AtRule(at_rule));
            }
            other => kept.push(other),
        }
    }
    kept
}
