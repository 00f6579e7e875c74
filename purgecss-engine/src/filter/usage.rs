use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::css::ast::unquote;
use crate::css::{Declaration, Node};

/// `var(--name` 引用（含回退值中的嵌套引用）
static VAR_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"var\(\s*(--[A-Za-z0-9_-]+)").expect("var reference regex is valid"));

/// 保留树中的使用情况：动画名、字体族、自定义属性
#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    pub animations: FxHashSet<String>,
    /// 小写字体族名
    pub font_families: FxHashSet<String>,
    /// 普通声明中直接引用的自定义属性
    pub variable_roots: FxHashSet<String>,
    /// 自定义属性 → 其取值中引用的自定义属性
    pub variable_dependencies: FxHashMap<String, FxHashSet<String>>,
    /// 样式表中定义过的自定义属性
    pub variable_definitions: FxHashSet<String>,
}

impl UsageTracker {
    pub fn scan(nodes: &[Node]) -> Self {
        let mut tracker = Self::default();
        tracker.visit(nodes, false);
        tracker
    }

    fn visit(&mut self, nodes: &[Node], in_font_face: bool) {
        for node in nodes {
            match node {
                Node::Rule(rule) => self.visit(&rule.nodes, in_font_face),
                Node::AtRule(at_rule) => {
                    if let Some(children) = &at_rule.nodes {
                        self.visit(children, in_font_face || at_rule.is_font_face());
                    }
                }
                Node::Declaration(decl) => self.track_declaration(decl, in_font_face),
                Node::Comment(_) => {}
            }
        }
    }

    fn track_declaration(&mut self, decl: &Declaration, in_font_face: bool) {
        let references = var_references(&decl.value);
        if decl.is_custom_property() {
            self.variable_definitions.insert(decl.property.clone());
            if !references.is_empty() {
                self.variable_dependencies
                    .entry(decl.property.clone())
                    .or_default()
                    .extend(references);
            }
            return;
        }
        self.variable_roots.extend(references);

        match decl.unprefixed_property().as_str() {
            "animation" | "animation-name" => {
                self.animations.extend(split_list(&decl.value).map(str::to_string));
            }
            // @font-face 自身的 font-family 是定义而非使用
            "font-family" if !in_font_face => {
                self.font_families.extend(font_family_names(&decl.value));
            }
            "font" if !in_font_face => {
                // 简写中字体族位于最后，逗号分隔
                if let Some(families) = font_shorthand_families(&decl.value) {
                    self.font_families.extend(font_family_names(families));
                }
            }
            _ => {}
        }
    }

    /// 被使用的自定义属性：直接引用及其传递依赖
    pub fn used_variables(&self, extra_roots: impl IntoIterator<Item = String>) -> FxHashSet<String> {
        let mut used: FxHashSet<String> = FxHashSet::default();
        let mut stack: Vec<String> = self.variable_roots.iter().cloned().chain(extra_roots).collect();
        while let Some(name) = stack.pop() {
            if !used.insert(name.clone()) {
                continue;
            }
            if let Some(deps) = self.variable_dependencies.get(&name) {
                stack.extend(deps.iter().filter(|dep| !used.contains(*dep)).cloned());
            }
        }
        used
    }

    pub fn is_animation_used(&self, name: &str) -> bool {
        self.animations.contains(name)
    }

    pub fn is_font_family_used(&self, family: &str) -> bool {
        self.font_families.contains(&family.to_lowercase())
    }
}

/// 取值中的全部 `var()` 引用
pub fn var_references(value: &str) -> Vec<String> {
    VAR_REFERENCE
        .captures_iter(value)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// 按空白与逗号切分
fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
}

/// 字体族列表（去引号，小写）
pub fn font_family_names(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|family| unquote(family.trim()).trim().to_lowercase())
        .filter(|family| !family.is_empty())
        .collect()
}

/// `font` 简写中的字体族部分：位于字号之后（`12px/1.5 "Open Sans", serif`）
fn font_shorthand_families(value: &str) -> Option<&str> {
    let mut offset = 0;
    for part in value.split_whitespace() {
        let start = offset + value[offset..].find(part)?;
        offset = start + part.len();
        if part.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            let rest = value[offset..].trim();
            return (!rest.is_empty()).then_some(rest);
        }
    }
    None
}
