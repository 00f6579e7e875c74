//! 样式表模型：解析 / 序列化 / 选择器切分 / source map

pub mod ast;
pub mod parser;
pub mod printer;
pub mod selector;
pub mod source_map;

pub use ast::{AtRule, Comment, Declaration, Node, Position, Rule, Stylesheet};
pub use parser::parse_stylesheet;
pub use printer::Printer;
pub use selector::{split_selector_list, tokenize_component, AttrOperator, AttributeSelector, SimpleToken};
pub use source_map::{to_data_url, to_json, SourceMapGenerator};
pub use sourcemap::SourceMap;
