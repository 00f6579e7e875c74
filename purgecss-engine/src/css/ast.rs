use serde::Serialize;

use super::printer::Printer;
use super::selector::split_selector_list;

/// 源码位置（行列均从 1 开始）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// 样式表节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Rule(Rule),
    AtRule(AtRule),
    Declaration(Declaration),
    Comment(Comment),
}

impl Node {
    pub fn position(&self) -> Position {
        match self {
            Node::Rule(rule) => rule.position,
            Node::AtRule(at_rule) => at_rule.position,
            Node::Declaration(decl) => decl.position,
            Node::Comment(comment) => comment.position,
        }
    }

    #[inline]
    pub fn is_comment(&self) -> bool {
        matches!(self, Node::Comment(_))
    }
}

/// 带选择器的规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub selector: String,
    pub nodes: Vec<Node>,
    pub position: Position,
}

impl Rule {
    /// 选择器列表的各个分量
    pub fn selectors(&self) -> Vec<String> {
        split_selector_list(&self.selector)
    }

    /// 除注释外没有任何子节点
    pub fn is_empty(&self) -> bool {
        has_no_content(&self.nodes)
    }

    /// 直接子声明
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Declaration(decl) => Some(decl),
            _ => None,
        })
    }
}

/// @ 规则；nodes 为 None 表示语句形式（`@import url(a.css);`）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    pub name: String,
    pub params: String,
    pub nodes: Option<Vec<Node>>,
    pub position: Position,
}

impl AtRule {
    /// 去掉厂商前缀的小写名称（`-webkit-keyframes` → `keyframes`）
    pub fn unprefixed_name(&self) -> String {
        unprefixed(&self.name.to_ascii_lowercase()).to_string()
    }

    pub fn is_keyframes(&self) -> bool {
        self.unprefixed_name() == "keyframes"
    }

    pub fn is_font_face(&self) -> bool {
        self.name.eq_ignore_ascii_case("font-face")
    }

    /// 块形式且块内除注释外为空
    pub fn is_empty_block(&self) -> bool {
        self.nodes.as_ref().is_some_and(|nodes| has_no_content(nodes))
    }

    /// 块内直接子声明
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.nodes.iter().flatten().filter_map(|node| match node {
            Node::Declaration(decl) => Some(decl),
            _ => None,
        })
    }

    /// @keyframes 名称（去引号）
    pub fn keyframes_name(&self) -> String {
        unquote(self.params.trim()).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
    pub position: Position,
}

impl Declaration {
    #[inline]
    pub fn is_custom_property(&self) -> bool {
        self.property.starts_with("--")
    }

    /// 去掉厂商前缀的小写属性名
    pub fn unprefixed_property(&self) -> String {
        if self.is_custom_property() {
            return self.property.clone();
        }
        unprefixed(&self.property.to_ascii_lowercase()).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// `/*` 与 `*/` 之间的原文
    pub text: String,
    pub position: Position,
}

/// 解析后的样式表，单次运行独占
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
    pub source_name: Option<String>,
}

impl Stylesheet {
    pub fn new(nodes: Vec<Node>, source_name: Option<String>) -> Self {
        Self { nodes, source_name }
    }

    /// 重新序列化为 CSS 文本
    pub fn to_css(&self) -> String {
        let mut printer = Printer::new();
        printer.print_nodes(&self.nodes);
        printer.finish().0
    }

    /// 全部选择器分量（文档顺序，跳过 @keyframes 内的关键帧选择器）
    pub fn selector_components(&self) -> Vec<String> {
        let mut components = Vec::new();
        collect_selector_components(&self.nodes, &mut components);
        components
    }

    pub fn is_empty(&self) -> bool {
        has_no_content(&self.nodes)
    }
}

/// 收集节点树中的选择器分量
pub fn collect_selector_components(nodes: &[Node], out: &mut Vec<String>) {
    for node in nodes {
        match node {
            Node::Rule(rule) => {
                out.extend(rule.selectors());
                collect_selector_components(&rule.nodes, out);
            }
            Node::AtRule(at_rule) if !at_rule.is_keyframes() => {
                if let Some(children) = &at_rule.nodes {
                    collect_selector_components(children, out);
                }
            }
            _ => {}
        }
    }
}

fn has_no_content(nodes: &[Node]) -> bool {
    nodes.iter().all(Node::is_comment)
}

/// 去掉 `-webkit-` / `-moz-` 等厂商前缀
pub fn unprefixed(name: &str) -> &str {
    if let Some(rest) = name.strip_prefix('-') {
        if let Some(idx) = rest.find('-') {
            if !rest.starts_with('-') {
                return &rest[idx + 1..];
            }
        }
    }
    name
}

/// 去掉首尾成对引号
pub fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
