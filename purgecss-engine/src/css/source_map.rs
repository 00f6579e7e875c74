//! Source Map v3：映射由 sourcemap crate 构建与序列化，内联形式额外编码为 data URL

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sourcemap::{SourceMap, SourceMapBuilder};

use crate::error::PurgeResult;

/// 单一来源的映射生成器；行列均从 0 开始
pub struct SourceMapGenerator {
    builder: SourceMapBuilder,
    source_id: u32,
}

impl SourceMapGenerator {
    pub fn new(file: Option<&str>, source_name: &str, source_content: Option<&str>) -> Self {
        let mut builder = SourceMapBuilder::new(file);
        let source_id = builder.add_source(source_name);
        builder.set_source_contents(source_id, source_content);
        Self { builder, source_id }
    }

    /// 生成位置 → 原始位置
    pub fn add_mapping(&mut self, gen_line: u32, gen_column: u32, orig_line: u32, orig_column: u32) {
        self.builder.add_raw(
            gen_line,
            gen_column,
            orig_line,
            orig_column,
            Some(self.source_id),
            None,
            false,
        );
    }

    pub fn build(self) -> SourceMap {
        self.builder.into_sourcemap()
    }
}

impl std::fmt::Debug for SourceMapGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceMapGenerator")
            .field("source_id", &self.source_id)
            .finish()
    }
}

/// 序列化为 JSON 文本
pub fn to_json(map: &SourceMap) -> PurgeResult<String> {
    let mut bytes = Vec::new();
    map.to_writer(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// 内联注释用的 data URL
pub fn to_data_url(map: &SourceMap) -> PurgeResult<String> {
    Ok(format!(
        "data:application/json;base64,{}",
        STANDARD.encode(to_json(map)?)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_keeps_source_and_tokens() {
        let mut generator = SourceMapGenerator::new(Some("out.css"), "in.css", Some(".a{top:0}"));
        generator.add_mapping(0, 0, 0, 0);
        generator.add_mapping(1, 2, 0, 3);
        let map = generator.build();

        assert_eq!(map.get_file().map(|f| f.to_string()), Some("out.css".to_string()));
        assert_eq!(map.get_source(0).map(|s| s.to_string()), Some("in.css".to_string()));
        assert_eq!(
            map.get_source_contents(0).map(|s| s.to_string()),
            Some(".a{top:0}".to_string())
        );
        let token = map.lookup_token(1, 2).unwrap();
        assert_eq!((token.get_src_line(), token.get_src_col()), (0, 3));
    }

    #[test]
    fn test_json_and_data_url() {
        let mut generator = SourceMapGenerator::new(None, "in.css", None);
        generator.add_mapping(0, 0, 2, 0);
        let json = to_json(&generator.build()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 3);
        assert_eq!(value["sources"], serde_json::json!(["in.css"]));
        assert!(value["mappings"].is_string());

        let reparsed = SourceMap::from_slice(json.as_bytes()).unwrap();
        assert_eq!(reparsed.get_token_count(), 1);

        let mut generator = SourceMapGenerator::new(None, "in.css", None);
        generator.add_mapping(0, 0, 2, 0);
        let url = to_data_url(&generator.build()).unwrap();
        let decoded = STANDARD
            .decode(url.trim_start_matches("data:application/json;base64,"))
            .unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), json);
    }
}
