//! 输入加载：路径 glob 展开、跳过规则、并发读取文件与标准输入

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use purgecss_engine::{ContentSource, CssSource};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};

use crate::config::{ContentInput, CssInput, UserDefinedOptions};
use crate::error::{CssResult, PurgeCssError};

/// 标准输入内容的来源名称
pub const STDIN_NAME: &str = "<stdin>";

/// 是否包含 glob 元字符
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

/// 展开路径模式；非 glob 路径原样返回，交由读取阶段报告不存在
pub fn expand_pattern(pattern: &str) -> CssResult<Vec<PathBuf>> {
    if !is_glob_pattern(pattern) {
        return Ok(vec![PathBuf::from(pattern)]);
    }

    let mut paths = Vec::new();
    for entry in glob::glob(pattern).map_err(|e| PurgeCssError::glob(pattern, e))? {
        let path = entry.map_err(|e| PurgeCssError::glob(pattern, e))?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    debug!("Expanded `{}` to {} files", pattern, paths.len());
    Ok(paths)
}

/// 编译跳过规则
pub fn build_skip_set(patterns: &[String]) -> CssResult<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).map_err(|e| PurgeCssError::glob(pattern, e))?);
    }
    let set = builder
        .build()
        .map_err(|e| PurgeCssError::glob(patterns.join(", "), e))?;
    Ok(Some(set))
}

/// 文件扩展名（无扩展名时为空串，交由默认提取器处理）
pub fn infer_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// 并发读取文件，结果与输入顺序一致；读取任务本身中断时整体报错
async fn read_files(paths: Vec<PathBuf>) -> CssResult<Vec<(PathBuf, std::io::Result<String>)>> {
    let handles: Vec<_> = paths
        .into_iter()
        .map(|path| {
            tokio::spawn(async move {
                let result = tokio::fs::read_to_string(&path).await;
                (path, result)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let entry = handle
            .await
            .map_err(|e| PurgeCssError::TaskError(format!("file read task aborted: {}", e)))?;
        results.push(entry);
    }
    Ok(results)
}

/// 加载内容来源：展开 glob、应用 skippedContentGlobs、读取文件
/// best_effort 时不可读文件记录告警并跳过
pub async fn load_content(options: &UserDefinedOptions) -> CssResult<Vec<ContentSource>> {
    let skip_set = build_skip_set(&options.skipped_content_globs)?;
    let mut sources = Vec::new();
    let mut paths = Vec::new();

    for input in &options.content {
        match input {
            ContentInput::Raw { raw, extension } => {
                sources.push(ContentSource::new(extension, raw.clone()).best_effort(options.best_effort));
            }
            ContentInput::Path(pattern) => {
                for path in expand_pattern(pattern)? {
                    if skip_set.as_ref().is_some_and(|set| set.is_match(&path)) {
                        debug!("Skip content `{}`", path.display());
                        continue;
                    }
                    paths.push(path);
                }
            }
        }
    }

    for (path, result) in read_files(paths).await? {
        match result {
            Ok(raw) => sources.push(
                ContentSource::new(infer_extension(&path), raw)
                    .with_name(path.display().to_string())
                    .best_effort(options.best_effort),
            ),
            Err(e) if options.best_effort => {
                warn!("Unreadable content `{}` treated as empty: {}", path.display(), e);
            }
            Err(e) => return Err(PurgeCssError::io(path, e)),
        }
    }

    debug!("Loaded {} content sources", sources.len());
    Ok(sources)
}

/// 加载样式表；不可读的样式表（含非 UTF-8 内容）只体现在自己的条目中，
/// 不影响其他样式表的净化
pub async fn load_css(options: &UserDefinedOptions) -> CssResult<Vec<CssResult<CssSource>>> {
    let mut sources = Vec::new();
    let mut paths = Vec::new();

    for input in &options.css {
        match input {
            CssInput::Raw { raw, name } => {
                let source = CssSource::new(raw.clone());
                sources.push(Ok(match name {
                    Some(name) => source.with_name(name.clone()),
                    None => source,
                }));
            }
            CssInput::Path(pattern) => paths.extend(expand_pattern(pattern)?),
        }
    }

    for (path, result) in read_files(paths).await? {
        sources.push(match result {
            Ok(raw) => Ok(CssSource::new(raw).with_name(path.display().to_string())),
            Err(e) => {
                warn!("Unreadable stylesheet `{}`: {}", path.display(), e);
                Err(PurgeCssError::io(path, e))
            }
        });
    }

    debug!("Loaded {} stylesheets", sources.len());
    Ok(sources)
}

/// 从任意异步读取端读取全部内容作为一个内容来源
pub async fn read_stdin_content<R>(mut reader: R, extension: &str) -> CssResult<ContentSource>
where
    R: AsyncRead + Unpin,
{
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .await
        .map_err(PurgeCssError::Stream)?;
    Ok(ContentSource::new(extension, raw).with_name(STDIN_NAME))
}
