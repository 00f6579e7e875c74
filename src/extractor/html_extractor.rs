//! HTML 明细提取器
//! 基于 html5ever 流式分词，按标签 / id / class / 属性名 / 属性值分桶
//! <script> 内文本按默认提取器切分并归入 undetermined

use std::cell::{Cell, RefCell};

use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use markup5ever::interface::Attribute;
use purgecss_engine::{BoxError, DefaultExtractor, DetailedTokens, Extractor, ExtractorResult};
use tendril::StrTendril;

/// HTML 提取器默认注册的扩展名
pub const HTML_EXTENSIONS: [&str; 3] = ["html", "htm", "xhtml"];

/// 分词回调，单次提取使用
#[derive(Debug, Default)]
struct HtmlTokenSink {
    tokens: RefCell<DetailedTokens>,
    /// 当前位于 <script> 内
    in_script: Cell<bool>,
}

impl TokenSink for HtmlTokenSink {
    type Handle = ();

    fn process_token(&self, token: Token, _line: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(Tag {
                kind: TagKind::StartTag,
                name,
                attrs,
                ..
            }) => {
                self.collect_tag(&name, &attrs);
                match &*name {
                    "script" => {
                        self.in_script.set(true);
                        return TokenSinkResult::RawData(RawKind::ScriptData);
                    }
                    "style" => return TokenSinkResult::RawData(RawKind::Rawtext),
                    _ => {}
                }
            }
            Token::TagToken(Tag {
                kind: TagKind::EndTag,
                name,
                ..
            }) if &*name == "script" => {
                self.in_script.set(false);
            }
            Token::CharacterTokens(text) if self.in_script.get() => {
                self.tokens
                    .borrow_mut()
                    .undetermined
                    .extend(DefaultExtractor::tokens(&text));
            }
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

impl HtmlTokenSink {
    fn collect_tag(&self, name: &str, attrs: &[Attribute]) {
        let mut tokens = self.tokens.borrow_mut();
        tokens.tags.push(name.to_string());

        for attr in attrs {
            let attr_name: &str = &attr.name.local;
            let value: &str = &attr.value;
            tokens.attributes.names.push(attr_name.to_string());
            match attr_name {
                "class" => {
                    tokens
                        .classes
                        .extend(value.split_whitespace().map(str::to_string));
                }
                "id" => {
                    let id = value.trim();
                    if !id.is_empty() {
                        tokens.ids.push(id.to_string());
                    }
                }
                _ => {}
            }
            // 属性值整体 + 按空白切分的单词，供 `=` 与 `~=` 两类匹配使用
            if !value.is_empty() {
                tokens.attributes.values.push(value.to_string());
                let mut words = value.split_whitespace();
                if let (Some(_), Some(_)) = (words.next(), words.next()) {
                    tokens
                        .attributes
                        .values
                        .extend(value.split_whitespace().map(str::to_string));
                }
            }
        }
    }
}

/// HTML 提取器
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 从 HTML 字符串提取明细令牌
    pub fn extract_tokens(&self, html: &str) -> DetailedTokens {
        let tokenizer = Tokenizer::new(HtmlTokenSink::default(), TokenizerOpts::default());
        let queue = BufferQueue::default();
        queue.push_back(StrTendril::from(html));

        let _ = tokenizer.feed(&queue);
        tokenizer.end();

        tokenizer.sink.tokens.into_inner()
    }
}

impl Extractor for HtmlExtractor {
    fn extract(&self, content: &str) -> Result<ExtractorResult, BoxError> {
        Ok(ExtractorResult::DetailedTokens(self.extract_tokens(content)))
    }

    fn name(&self) -> &str {
        "html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_extractor_buckets() {
        let html = r#"
            <!doctype html>
            <main id="app" class="layout  layout--wide">
                <input type="checkbox" checked data-state="open closed">
                <a href="/docs" class="link">Docs</a>
            </main>
        "#;

        let tokens = HtmlExtractor::new().extract_tokens(html);

        assert_eq!(tokens.tags, vec!["main", "input", "a"]);
        assert_eq!(tokens.ids, vec!["app"]);
        assert_eq!(tokens.classes, vec!["layout", "layout--wide", "link"]);
        for name in ["id", "class", "type", "checked", "data-state", "href"] {
            assert!(tokens.attributes.names.iter().any(|n| n == name), "missing {}", name);
        }
        for value in ["checkbox", "open closed", "open", "closed", "/docs"] {
            assert!(tokens.attributes.values.iter().any(|v| v == value), "missing {}", value);
        }
        assert!(tokens.undetermined.is_empty());
    }

    #[test]
    fn test_script_text_goes_to_undetermined() {
        let html = r#"<div></div><script>el.classList.add("is-open") // <b class="x"></script><p>text</p>"#;
        let tokens = HtmlExtractor::new().extract_tokens(html);

        assert!(tokens.undetermined.iter().any(|t| t == "is-open"));
        // 脚本内的标签文本不是真实标签
        assert!(!tokens.tags.iter().any(|t| t == "b"));
        assert!(tokens.tags.iter().any(|t| t == "p"));
        // 正文文本不参与
        assert!(!tokens.undetermined.iter().any(|t| t == "text"));
    }

    #[test]
    fn test_style_content_is_ignored() {
        let tokens = HtmlExtractor::new().extract_tokens("<style>.ghost { color: red }</style><span></span>");
        assert_eq!(tokens.tags, vec!["style", "span"]);
        assert!(tokens.undetermined.is_empty());
        assert!(tokens.classes.is_empty());
    }
}
