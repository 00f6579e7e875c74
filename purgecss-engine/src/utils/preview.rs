use std::fmt::{self, Write};

/// 空白折叠 + 截断的日志预览，零堆分配
/// 1. 连续空白折叠为单个空格
/// 2. 超过最大字符数时截断并追加省略号
#[inline]
pub fn preview_compact(s: &str, max_len: usize) -> impl fmt::Display + '_ {
    CompactView {
        source: s,
        max_length: max_len,
    }
}

struct CompactView<'a> {
    source: &'a str,
    max_length: usize,
}

impl fmt::Display for CompactView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut char_count = 0;
        let mut last_was_whitespace = false;

        for ch in self.source.trim().chars() {
            if char_count >= self.max_length {
                f.write_char('…')?;
                break;
            }

            if ch.is_whitespace() {
                if !last_was_whitespace {
                    f.write_char(' ')?;
                    char_count += 1;
                    last_was_whitespace = true;
                }
            } else {
                f.write_char(ch)?;
                char_count += 1;
                last_was_whitespace = false;
            }
        }
        Ok(())
    }
}
