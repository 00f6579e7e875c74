use rustc_hash::FxHashSet;
use std::fmt::Write;

use super::preview::preview_compact;

/// 日志中最多展示的令牌数
const MAX_COUNT: usize = 10;
/// 每个令牌最多展示的字符数
const MAX_TOKEN_LEN: usize = 30;

/// 令牌集合日志格式化
/// 格式：[token1, token2, ...] (total: N)，排序后截取，保证日志稳定
pub fn compress_token_set_default(tokens: &FxHashSet<String>) -> String {
    let total_count = tokens.len();
    if total_count == 0 {
        return "[empty]".to_string();
    }

    let mut sorted: Vec<&String> = tokens.iter().collect();
    sorted.sort_unstable();

    let mut result = String::with_capacity(MAX_COUNT * (MAX_TOKEN_LEN + 2) + 20);
    result.push('[');
    for (idx, token) in sorted.iter().take(MAX_COUNT).enumerate() {
        if idx > 0 {
            result.push_str(", ");
        }
        let _ = write!(result, "{}", preview_compact(token, MAX_TOKEN_LEN));
    }
    result.push(']');

    if total_count > MAX_COUNT {
        let _ = write!(result, " (total: {})", total_count);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_token_set() {
        let empty = FxHashSet::default();
        assert_eq!(compress_token_set_default(&empty), "[empty]");

        let tokens: FxHashSet<String> = ["b", "a"].iter().map(|s| s.to_string()).collect();
        assert_eq!(compress_token_set_default(&tokens), "[a, b]");

        let many: FxHashSet<String> = (0..12).map(|i| format!("t{:02}", i)).collect();
        let formatted = compress_token_set_default(&many);
        assert!(formatted.starts_with("[t00, t01"));
        assert!(formatted.ends_with("(total: 12)"));
    }
}
