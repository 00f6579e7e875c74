//! 选择器切分与简单选择器令牌提取（基于 cssparser 分词，转义由分词器解码）
//! 只负责识别 class / id / tag / attribute，伪类、伪元素、通配符、组合符一律跳过，
//! 函数式伪类的参数（:not() / :is() / :where() / :has() 等）不参与判定

use cssparser::{ParseError, Parser, ParserInput, Token};

/// 属性选择器运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOperator {
    /// `=`
    Equals,
    /// `~=`
    Includes,
    /// `|=`
    DashMatch,
    /// `^=`
    Prefix,
    /// `$=`
    Suffix,
    /// `*=`
    Substring,
}

impl AttrOperator {
    /// 判断候选属性值是否满足运算符
    pub fn matches(&self, candidate: &str, expected: &str, case_insensitive: bool) -> bool {
        let (candidate, expected) = if case_insensitive {
            (candidate.to_lowercase(), expected.to_lowercase())
        } else {
            (candidate.to_string(), expected.to_string())
        };
        match self {
            AttrOperator::Equals => candidate == expected,
            AttrOperator::Includes => candidate.split_whitespace().any(|word| word == expected),
            AttrOperator::DashMatch => {
                candidate == expected || candidate.starts_with(&format!("{}-", expected))
            }
            AttrOperator::Prefix => !expected.is_empty() && candidate.starts_with(&expected),
            AttrOperator::Suffix => !expected.is_empty() && candidate.ends_with(&expected),
            AttrOperator::Substring => !expected.is_empty() && candidate.contains(&expected),
        }
    }

    fn from_token(token: &Token<'_>) -> Option<Self> {
        match token {
            Token::Delim('=') => Some(AttrOperator::Equals),
            Token::IncludeMatch => Some(AttrOperator::Includes),
            Token::DashMatch => Some(AttrOperator::DashMatch),
            Token::PrefixMatch => Some(AttrOperator::Prefix),
            Token::SuffixMatch => Some(AttrOperator::Suffix),
            Token::SubstringMatch => Some(AttrOperator::Substring),
            _ => None,
        }
    }
}

/// 属性选择器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub operator: Option<AttrOperator>,
    pub value: Option<String>,
    /// `[a="b" i]`
    pub case_insensitive: bool,
}

/// 简单选择器令牌
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleToken {
    Class(String),
    Id(String),
    Tag(String),
    Attribute(AttributeSelector),
}

impl SimpleToken {
    /// 与名单比对所用的值（属性选择器取属性名）
    pub fn value(&self) -> &str {
        match self {
            SimpleToken::Class(v) | SimpleToken::Id(v) | SimpleToken::Tag(v) => v,
            SimpleToken::Attribute(attr) => &attr.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SimpleToken::Class(_) => "class",
            SimpleToken::Id(_) => "id",
            SimpleToken::Tag(_) => "tag",
            SimpleToken::Attribute(_) => "attribute",
        }
    }
}

/// 按顶层逗号切分选择器列表
/// 块内与字符串内的逗号由分词器整体跳过；结果去首尾空白并过滤空分量
pub fn split_selector_list(selector: &str) -> Vec<String> {
    let mut input = ParserInput::new(selector);
    let mut parser = Parser::new(&mut input);
    let mut components = Vec::new();
    let mut start = parser.position();

    loop {
        let token_start = parser.position();
        let is_comma = match parser.next_including_whitespace_and_comments() {
            Ok(token) => matches!(token, Token::Comma),
            Err(_) => break,
        };
        if is_comma {
            push_component(&mut components, parser.slice(start..token_start));
            start = parser.position();
        }
    }
    push_component(&mut components, parser.slice_from(start));
    components
}

fn push_component(components: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        components.push(trimmed.to_string());
    }
}

/// 提取单个选择器分量中的简单选择器令牌（按出现顺序）
pub fn tokenize_component(component: &str) -> Vec<SimpleToken> {
    let mut input = ParserInput::new(component);
    let mut parser = Parser::new(&mut input);
    let mut tokens = Vec::new();

    loop {
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::Delim('.') => {
                if let Ok(Token::Ident(name)) = parser.next_including_whitespace() {
                    tokens.push(SimpleToken::Class(name.to_string()));
                }
            }
            Token::IDHash(name) | Token::Hash(name) => tokens.push(SimpleToken::Id(name.to_string())),
            Token::Ident(name) => {
                // 命名空间前缀 `svg|circle`：丢弃前缀
                let state = parser.state();
                if matches!(parser.next_including_whitespace(), Ok(Token::Delim('|'))) {
                    continue;
                }
                parser.reset(&state);
                tokens.push(SimpleToken::Tag(name.to_string()));
            }
            Token::SquareBracketBlock => {
                if let Some(attr) = read_attribute_block(&mut parser) {
                    tokens.push(SimpleToken::Attribute(attr));
                }
            }
            // 伪类名 / 函数式伪类连同参数一起丢弃
            Token::Colon => skip_pseudo(&mut parser),
            // 组合符、通配符、嵌套符 & 等
            _ => {}
        }
    }
    tokens
}

fn skip_pseudo(parser: &mut Parser<'_, '_>) {
    while let Ok(token) = parser.next_including_whitespace() {
        if !matches!(token, Token::Colon) {
            break;
        }
    }
}

fn read_attribute_block<'i>(parser: &mut Parser<'i, '_>) -> Option<AttributeSelector> {
    parser
        .parse_nested_block(|block| Ok::<_, ParseError<'i, ()>>(read_attribute(block)))
        .ok()
        .flatten()
}

/// `[ns|name op value flag]`；命名空间前缀被后面的属性名覆盖
fn read_attribute(block: &mut Parser<'_, '_>) -> Option<AttributeSelector> {
    let mut attr = AttributeSelector {
        name: String::new(),
        operator: None,
        value: None,
        case_insensitive: false,
    };

    loop {
        let start = block.position();
        let token = match block.next() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        if attr.operator.is_none() {
            if let Some(operator) = AttrOperator::from_token(&token) {
                attr.operator = Some(operator);
            } else if let Token::Ident(name) = token {
                attr.name = name.to_string();
            }
            continue;
        }
        match token {
            Token::Ident(value) | Token::QuotedString(value) if attr.value.is_none() => {
                attr.value = Some(value.to_string());
            }
            Token::Ident(flag) => attr.case_insensitive = flag.eq_ignore_ascii_case("i"),
            _ if attr.value.is_none() => attr.value = Some(block.slice_from(start).trim().to_string()),
            _ => {}
        }
    }
    (!attr.name.is_empty()).then_some(attr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str) -> SimpleToken {
        SimpleToken::Class(name.to_string())
    }

    #[test]
    fn test_split_selector_list() {
        assert_eq!(split_selector_list(".a, .b .c"), vec![".a", ".b .c"]);
        assert_eq!(
            split_selector_list(":is(.a, .b) > p,\n[data-x=\"1,2\"]"),
            vec![":is(.a, .b) > p", "[data-x=\"1,2\"]"]
        );
        assert_eq!(split_selector_list(" , .a ,"), vec![".a"]);
        assert_eq!(split_selector_list(".a\\,b, .c"), vec![".a\\,b", ".c"]);
    }

    #[test]
    fn test_tokenize_compound_and_descendant() {
        let tokens = tokenize_component("div#main.card > .title:hover::before");
        assert_eq!(
            tokens,
            vec![
                SimpleToken::Tag("div".into()),
                SimpleToken::Id("main".into()),
                class("card"),
                class("title"),
            ]
        );
    }

    #[test]
    fn test_tokenize_skips_functional_pseudo_arguments() {
        let tokens = tokenize_component(".nav :not(.active, .x[y=\")\"]) li");
        assert_eq!(tokens, vec![class("nav"), SimpleToken::Tag("li".into())]);
        assert!(tokenize_component("*").is_empty());
        assert!(tokenize_component(":root").is_empty());
        assert!(tokenize_component("&:hover").is_empty());
    }

    #[test]
    fn test_tokenize_decodes_escapes() {
        assert_eq!(tokenize_component(".hover\\:bg-red"), vec![class("hover:bg-red")]);
        assert_eq!(tokenize_component(".w-1\\/2"), vec![class("w-1/2")]);
        assert_eq!(tokenize_component(".\\31 0"), vec![class("10")]);
    }

    #[test]
    fn test_tokenize_attributes() {
        let tokens = tokenize_component("input[type=\"text\" i][disabled][data-x^=pre][data-col=1]");
        assert_eq!(tokens.len(), 5);
        assert_eq!(
            tokens[1],
            SimpleToken::Attribute(AttributeSelector {
                name: "type".into(),
                operator: Some(AttrOperator::Equals),
                value: Some("text".into()),
                case_insensitive: true,
            })
        );
        assert_eq!(
            tokens[2],
            SimpleToken::Attribute(AttributeSelector {
                name: "disabled".into(),
                operator: None,
                value: None,
                case_insensitive: false,
            })
        );
        match &tokens[3] {
            SimpleToken::Attribute(attr) => {
                assert_eq!(attr.operator, Some(AttrOperator::Prefix));
                assert_eq!(attr.value.as_deref(), Some("pre"));
            }
            other => panic!("unexpected token {:?}", other),
        }
        match &tokens[4] {
            SimpleToken::Attribute(attr) => assert_eq!(attr.value.as_deref(), Some("1")),
            other => panic!("unexpected token {:?}", other),
        }
    }

    #[test]
    fn test_namespaced_selectors() {
        assert_eq!(
            tokenize_component("svg|circle"),
            vec![SimpleToken::Tag("circle".into())]
        );
        let tokens = tokenize_component("[xlink|href]");
        assert_eq!(tokens[0].value(), "href");
        let dash = tokenize_component("[lang|=en]");
        match &dash[0] {
            SimpleToken::Attribute(attr) => {
                assert_eq!(attr.name, "lang");
                assert_eq!(attr.operator, Some(AttrOperator::DashMatch));
                assert_eq!(attr.value.as_deref(), Some("en"));
            }
            other => panic!("unexpected token {:?}", other),
        }
    }

    #[test]
    fn test_attr_operator_matching() {
        assert!(AttrOperator::Includes.matches("a open b", "open", false));
        assert!(AttrOperator::DashMatch.matches("en-US", "en", false));
        assert!(AttrOperator::Prefix.matches("prefix-x", "prefix", false));
        assert!(AttrOperator::Suffix.matches("file.pdf", ".pdf", false));
        assert!(AttrOperator::Substring.matches("abcdef", "cd", false));
        assert!(AttrOperator::Equals.matches("OPEN", "open", true));
        assert!(!AttrOperator::Equals.matches("OPEN", "open", false));
        assert!(!AttrOperator::Prefix.matches("anything", "", false));
    }
}
