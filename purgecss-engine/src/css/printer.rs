use sourcemap::SourceMap;

use super::ast::{Node, Position};
use super::source_map::SourceMapGenerator;

const INDENT: &str = "  ";

/// 样式表序列化器
/// 固定格式：两空格缩进，每条声明独占一行，开启映射时为每个节点记录生成位置
#[derive(Debug, Default)]
pub struct Printer {
    out: String,
    /// 生成位置（从 0 开始）
    line: u32,
    column: u32,
    mappings: Option<SourceMapGenerator>,
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 打印的同时把每个节点的生成位置写入映射
    pub fn with_source_map(generator: SourceMapGenerator) -> Self {
        Self {
            mappings: Some(generator),
            ..Default::default()
        }
    }

    pub fn print_nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.print_node(node, 0);
        }
    }

    /// 返回 CSS 文本与映射（未开启映射时为 None）
    pub fn finish(self) -> (String, Option<SourceMap>) {
        (self.out, self.mappings.map(SourceMapGenerator::build))
    }

    fn print_node(&mut self, node: &Node, depth: usize) {
        self.write_indent(depth);
        self.record(node.position());
        match node {
            Node::Rule(rule) => {
                self.write(&rule.selector);
                self.print_block(&rule.nodes, depth);
            }
            Node::AtRule(at_rule) => {
                self.write("@");
                self.write(&at_rule.name);
                if !at_rule.params.is_empty() {
                    self.write(" ");
                    self.write(&at_rule.params);
                }
                match &at_rule.nodes {
                    Some(children) => self.print_block(children, depth),
                    None => self.write(";\n"),
                }
            }
            Node::Declaration(decl) => {
                self.write(&decl.property);
                self.write(": ");
                self.write(&decl.value);
                if decl.important {
                    self.write(" !important");
                }
                self.write(";\n");
            }
            Node::Comment(comment) => {
                self.write("/*");
                self.write(&comment.text);
                self.write("*/\n");
            }
        }
    }

    fn print_block(&mut self, children: &[Node], depth: usize) {
        if children.is_empty() {
            self.write(" {}\n");
            return;
        }
        self.write(" {\n");
        for child in children {
            self.print_node(child, depth + 1);
        }
        self.write_indent(depth);
        self.write("}\n");
    }

    fn write_indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.write(INDENT);
        }
    }

    fn write(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                // source map 列号按 UTF-16 码元计
                self.column += c.len_utf16() as u32;
            }
        }
        self.out.push_str(text);
    }

    fn record(&mut self, original: Position) {
        if let Some(mappings) = self.mappings.as_mut() {
            if original.line == 0 {
                return;
            }
            mappings.add_mapping(
                self.line,
                self.column,
                (original.line - 1) as u32,
                original.column.saturating_sub(1) as u32,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parse_stylesheet;

    #[test]
    fn test_print_format() {
        let sheet = parse_stylesheet(
            "@media screen{.a{color:red;margin:0!important}.empty{}}@import 'x.css';",
            None,
        )
        .unwrap();
        assert_eq!(
            sheet.to_css(),
            "@media screen {\n  .a {\n    color: red;\n    margin: 0 !important;\n  }\n  .empty {}\n}\n@import 'x.css';\n"
        );
    }

    #[test]
    fn test_reparse_printed_output_is_stable() {
        let raw = "/* keep */\n.a , .b>.c{top:0}\n@font-face{font-family:\"X\";src:url(x.woff)}\n.n{&:hover{color:red}}";
        let first = parse_stylesheet(raw, None).unwrap().to_css();
        let second = parse_stylesheet(&first, None).unwrap().to_css();
        assert_eq!(first, second);
    }

    #[test]
    fn test_mappings_follow_nodes() {
        let sheet = parse_stylesheet(".a {\n  color: red;\n}\n\n.b { top: 0 }", None).unwrap();
        let mut printer = Printer::with_source_map(SourceMapGenerator::new(None, "in.css", None));
        printer.print_nodes(&sheet.nodes);
        let (css, map) = printer.finish();
        assert_eq!(css, ".a {\n  color: red;\n}\n.b {\n  top: 0;\n}\n");
        let positions: Vec<(u32, u32, u32, u32)> = map
            .unwrap()
            .tokens()
            .map(|t| (t.get_dst_line(), t.get_dst_col(), t.get_src_line(), t.get_src_col()))
            .collect();
        assert_eq!(positions, vec![(0, 0, 0, 0), (1, 2, 1, 2), (3, 0, 4, 0), (4, 2, 4, 5)]);
    }

    #[test]
    fn test_plain_printer_has_no_map() {
        let sheet = parse_stylesheet(".a{top:0}", None).unwrap();
        let mut printer = Printer::new();
        printer.print_nodes(&sheet.nodes);
        let (css, map) = printer.finish();
        assert_eq!(css, sheet.to_css());
        assert!(map.is_none());
    }
}
