//! 样式表解析：cssparser 负责分词与块匹配，这里只把令牌流组装成净化所需的节点树
//! （规则 / @ 规则 / 声明 / 注释），前导与取值保留原文，不校验属性取值语法

use cssparser::{ParseError, ParseErrorKind, Parser, ParserInput, Token};

use super::ast::{AtRule, Comment, Declaration, Node, Position, Rule, Stylesheet};
use crate::error::{PurgeError, PurgeResult};

/// 解析样式表文本
pub fn parse_stylesheet(raw: &str, source_name: Option<&str>) -> PurgeResult<Stylesheet> {
    let display_name = source_name.unwrap_or("<inline css>");
    // BOM 不参与解析
    let mut input = ParserInput::new(raw.trim_start_matches('\u{feff}'));
    let mut parser = Parser::new(&mut input);
    let nodes = parse_nodes(&mut parser, true).map_err(|e| to_purge_error(e, display_name))?;
    log::trace!(
        "Parsed stylesheet `{}` | top-level nodes: {}",
        display_name,
        nodes.len()
    );
    Ok(Stylesheet::new(nodes, source_name.map(str::to_string)))
}

/// 结构错误，位置为出错构造的起点
#[derive(Debug, Clone, PartialEq, Eq)]
struct SyntaxError {
    reason: String,
    position: Position,
}

type SyntaxResult<'i, T> = Result<T, ParseError<'i, SyntaxError>>;

fn fail<'i, T>(input: &Parser<'i, '_>, position: Position, reason: impl Into<String>) -> SyntaxResult<'i, T> {
    Err(input.new_custom_error(SyntaxError {
        reason: reason.into(),
        position,
    }))
}

fn to_purge_error(error: ParseError<'_, SyntaxError>, source_name: &str) -> PurgeError {
    let (reason, position) = match error.kind {
        ParseErrorKind::Custom(SyntaxError { reason, position }) => (reason, position),
        ParseErrorKind::Basic(kind) => (
            format!("{:?}", kind),
            Position::new(error.location.line as usize + 1, error.location.column as usize),
        ),
    };
    PurgeError::CssParseError {
        source_name: source_name.to_string(),
        line: position.line,
        column: position.column,
        reason,
    }
}

/// 当前令牌起点（cssparser 行号从 0 开始，列号从 1 开始）
fn location(input: &Parser<'_, '_>) -> Position {
    let loc = input.current_source_location();
    Position::new(loc.line as usize + 1, loc.column as usize)
}

/// 前导部分的终止符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    OpenBrace,
    Semicolon,
    Eof,
}

/// 规则选择器 / @ 规则参数 / 声明原文；注释被丢弃
struct Prelude {
    text: String,
    /// 第一个顶层 `:` 在 text 中的偏移
    colon: Option<usize>,
    terminator: Terminator,
}

/// 解析一个块内（或顶层）的节点序列，直到输入或块结束
fn parse_nodes<'i>(input: &mut Parser<'i, '_>, top_level: bool) -> SyntaxResult<'i, Vec<Node>> {
    let mut nodes = Vec::new();
    loop {
        let state = input.state();
        let start = input.position();
        let position = location(input);
        let token = match input.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => return Ok(nodes),
        };
        match token {
            // 空语句与 HTML 注释标记
            Token::WhiteSpace(_) | Token::Semicolon | Token::CDO | Token::CDC => {}
            Token::Comment(text) => {
                ensure_comment_closed(input, start, position)?;
                nodes.push(Node::Comment(Comment {
                    text: text.to_string(),
                    position,
                }));
            }
            Token::CloseCurlyBracket => return fail(input, position, "unexpected `}`"),
            Token::AtKeyword(name) => nodes.push(parse_at_rule(input, name.to_string(), position)?),
            _ => {
                input.reset(&state);
                nodes.push(parse_rule_or_declaration(input, top_level, position)?);
            }
        }
    }
}

fn parse_at_rule<'i>(input: &mut Parser<'i, '_>, name: String, position: Position) -> SyntaxResult<'i, Node> {
    let prelude = read_prelude(input)?;
    let nodes = match prelude.terminator {
        Terminator::OpenBrace => Some(parse_block(input, position)?),
        _ => None,
    };
    Ok(Node::AtRule(AtRule {
        name,
        params: collapse_whitespace(&prelude.text),
        nodes,
        position,
    }))
}

fn parse_rule_or_declaration<'i>(
    input: &mut Parser<'i, '_>,
    top_level: bool,
    position: Position,
) -> SyntaxResult<'i, Node> {
    let prelude = read_prelude(input)?;
    match prelude.terminator {
        Terminator::OpenBrace => {
            let nodes = parse_block(input, position)?;
            Ok(Node::Rule(Rule {
                selector: prelude.text.trim().to_string(),
                nodes,
                position,
            }))
        }
        _ if top_level => fail(input, position, "declaration outside of a rule"),
        _ => build_declaration(input, prelude, position).map(Node::Declaration),
    }
}

/// 紧跟在 `{` 之后调用；块在输入结束前没有闭合视为错误
fn parse_block<'i>(input: &mut Parser<'i, '_>, opened: Position) -> SyntaxResult<'i, Vec<Node>> {
    let mut content_end = 0;
    let nodes = input.parse_nested_block(|block| {
        let nodes = parse_nodes(block, false)?;
        content_end = block.position().byte_index();
        Ok::<_, ParseError<'i, SyntaxError>>(nodes)
    })?;
    // 闭合时 `}` 已被消费，位置越过块内容末尾
    if input.position().byte_index() <= content_end {
        return fail(input, opened, "unclosed block");
    }
    Ok(nodes)
}

/// 读取到顶层 `{` / `;` / 输入结束为止；括号与方括号整体读入
fn read_prelude<'i>(input: &mut Parser<'i, '_>) -> SyntaxResult<'i, Prelude> {
    let mut text = String::new();
    let mut colon = None;

    loop {
        let start = input.position();
        let position = location(input);
        let token = match input.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => {
                return Ok(Prelude {
                    text,
                    colon,
                    terminator: Terminator::Eof,
                })
            }
        };
        let terminator = match token {
            Token::CurlyBracketBlock => Terminator::OpenBrace,
            Token::Semicolon => Terminator::Semicolon,
            Token::CloseCurlyBracket => return fail(input, position, "unexpected `}`"),
            Token::Comment(_) => {
                ensure_comment_closed(input, start, position)?;
                if !text.is_empty() && !text.ends_with(char::is_whitespace) {
                    text.push(' ');
                }
                continue;
            }
            Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock => {
                input.parse_nested_block(|block| {
                    while block.next_including_whitespace_and_comments().is_ok() {}
                    Ok::<_, ParseError<'i, SyntaxError>>(())
                })?;
                text.push_str(input.slice_from(start));
                continue;
            }
            Token::QuotedString(_) => {
                let raw = input.slice_from(start);
                if !is_closed_string(raw) {
                    return fail(input, position, "unclosed string");
                }
                text.push_str(raw);
                continue;
            }
            Token::BadString(_) => return fail(input, position, "unclosed string"),
            Token::Colon if colon.is_none() => {
                colon = Some(text.len());
                text.push(':');
                continue;
            }
            _ => {
                text.push_str(input.slice_from(start));
                continue;
            }
        };
        return Ok(Prelude {
            text,
            colon,
            terminator,
        });
    }
}

fn is_closed_string(raw: &str) -> bool {
    let mut chars = raw.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) => open == close,
        _ => false,
    }
}

fn ensure_comment_closed<'i>(
    input: &Parser<'i, '_>,
    start: cssparser::SourcePosition,
    position: Position,
) -> SyntaxResult<'i, ()> {
    let raw = input.slice_from(start);
    if raw.len() < 4 || !raw.ends_with("*/") {
        return fail(input, position, "unclosed comment");
    }
    Ok(())
}

fn build_declaration<'i>(
    input: &Parser<'i, '_>,
    prelude: Prelude,
    position: Position,
) -> SyntaxResult<'i, Declaration> {
    let Some(colon) = prelude.colon else {
        return fail(
            input,
            position,
            format!("expected `:` in declaration `{}`", prelude.text.trim()),
        );
    };
    let property = prelude.text[..colon].trim().to_string();
    if property.is_empty() {
        return fail(input, position, "missing property name");
    }

    let mut value = prelude.text[colon + 1..].trim().to_string();
    let important = strip_important(&mut value);
    Ok(Declaration {
        property,
        value,
        important,
        position,
    })
}

/// 去掉末尾的 `!important`（允许 `!` 与关键字之间有空白）
fn strip_important(value: &mut String) -> bool {
    let Some(bang) = value.rfind('!') else {
        return false;
    };
    if !value[bang + 1..].trim().eq_ignore_ascii_case("important") {
        return false;
    }
    value.truncate(bang);
    let trimmed_len = value.trim_end().len();
    value.truncate(trimmed_len);
    true
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
