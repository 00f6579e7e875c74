//! 异步运行器：加载输入 → 后台线程收集令牌 → 每个样式表一个阻塞任务 → 写出结果

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use purgecss_engine::{ContentSource, CssSource, PurgeCss, PurgedCss, UsedTokenSet};
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::config::UserDefinedOptions;
use crate::error::{CssResult, PurgeCssError};
use crate::loader::{load_content, load_css, read_stdin_content};

/// 单个样式表的运行结果
pub type StylesheetResult = CssResult<PurgedCss>;

/// 输出目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// JSON 数组写到标准输出
    Stdout,
    /// 目录：每个样式表按文件名写入
    Directory(PathBuf),
    /// 单个 `.css` 文件（仅允许一个样式表）
    File(PathBuf),
}

impl OutputTarget {
    /// 由选项决定输出目标；未指定或 `--stdout` 时输出到标准输出
    pub fn from_options(options: &UserDefinedOptions) -> Self {
        match &options.output {
            Some(path) if !options.stdout => {
                let path = PathBuf::from(path);
                let is_css_file = path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("css"));
                if is_css_file && !path.is_dir() {
                    OutputTarget::File(path)
                } else {
                    OutputTarget::Directory(path)
                }
            }
            _ => OutputTarget::Stdout,
        }
    }
}

/// 运行汇总
#[derive(Debug)]
pub struct RunReport {
    pub results: Vec<StylesheetResult>,
}

impl RunReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &PurgedCss> {
        self.results.iter().filter_map(|r| r.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &PurgeCssError> {
        self.results.iter().filter_map(|r| r.as_ref().err())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }
}

fn task_error(e: JoinError) -> PurgeCssError {
    PurgeCssError::TaskError(e.to_string())
}

/// 多样式表运行器
#[derive(Debug, Clone)]
pub struct PurgeRunner {
    options: UserDefinedOptions,
    purger: Arc<PurgeCss>,
}

impl PurgeRunner {
    /// 编译全部配置；非法正则 / 未知提取器在此处报错
    pub fn new(options: UserDefinedOptions) -> CssResult<Self> {
        let purger = PurgeCss::new(options.to_purge_options()?)?;
        Ok(Self {
            options,
            purger: Arc::new(purger),
        })
    }

    pub fn options(&self) -> &UserDefinedOptions {
        &self.options
    }

    /// 按配置运行；启用 stdin 时从进程标准输入读取内容
    pub async fn run(&self) -> CssResult<RunReport> {
        if self.options.stdin {
            self.run_with_reader(Some(tokio::io::stdin())).await
        } else {
            self.run_with_reader(None::<tokio::io::Stdin>).await
        }
    }

    /// 按配置运行，标准输入内容由调用方提供
    pub async fn run_with_reader<R>(&self, stdin: Option<R>) -> CssResult<RunReport>
    where
        R: AsyncRead + Unpin,
    {
        let start = Instant::now();
        let mut content = load_content(&self.options).await?;
        if let Some(reader) = stdin {
            content.push(
                read_stdin_content(reader, self.options.stdin_extension())
                    .await?
                    .best_effort(self.options.best_effort),
            );
        }
        let css = load_css(&self.options).await?;
        if css.is_empty() {
            return Err(PurgeCssError::InvalidInput("no stylesheet to purge".to_string()));
        }

        let used = self.collect_tokens(content).await?;
        let results = self.purge_all(css, used).await;

        info!(
            "Purge finished | stylesheets: {} | failed: {} | time: {:?}",
            results.len(),
            results.iter().filter(|r| r.is_err()).count(),
            start.elapsed()
        );
        Ok(RunReport { results })
    }

    /// 令牌收集在阻塞线程上执行；任一来源失败即中止整个运行
    async fn collect_tokens(&self, content: Vec<ContentSource>) -> CssResult<Arc<UsedTokenSet>> {
        let purger = Arc::clone(&self.purger);
        let used = tokio::task::spawn_blocking(move || purger.collect_tokens(&content))
            .await
            .map_err(task_error)??;
        debug!("Collected {} used tokens", used.len());
        Ok(Arc::new(used))
    }

    /// 每个样式表一个阻塞任务，失败互不影响，结果保持输入顺序
    /// 加载失败的样式表直接作为其条目的错误
    async fn purge_all(
        &self,
        css: Vec<CssResult<CssSource>>,
        used: Arc<UsedTokenSet>,
    ) -> Vec<StylesheetResult> {
        let handles: Vec<_> = css
            .into_iter()
            .map(|loaded| {
                loaded.map(|source| {
                    let purger = Arc::clone(&self.purger);
                    let used = Arc::clone(&used);
                    tokio::task::spawn_blocking(move || {
                        purger.purge_stylesheet(&source, &used).map_err(|e| {
                            warn!("Stylesheet `{}` failed: {}", source.display_name(), e);
                            PurgeCssError::from(e)
                        })
                    })
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(match handle {
                Ok(handle) => handle.await.map_err(task_error).and_then(|r| r),
                Err(e) => Err(e),
            });
        }
        results
    }
}

/// 输出文件名：沿用源文件名，内存样式表按序号命名
fn output_file_name(purged: &PurgedCss, index: usize) -> String {
    purged
        .file
        .as_deref()
        .and_then(|file| Path::new(file).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("stylesheet-{}.css", index))
}

async fn write_file(path: &Path, contents: &str) -> CssResult<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| PurgeCssError::io(path, e))?;
    debug!("Wrote `{}` ({} bytes)", path.display(), contents.len());
    Ok(())
}

async fn write_purged(path: &Path, purged: &PurgedCss) -> CssResult<()> {
    write_file(path, &purged.css).await?;
    if let Some(map) = &purged.source_map {
        let mut map_path = path.as_os_str().to_owned();
        map_path.push(".map");
        write_file(Path::new(&map_path), map).await?;
    }
    Ok(())
}

/// 序列化成功结果为 JSON 数组
pub fn results_to_json(report: &RunReport) -> CssResult<String> {
    let succeeded: Vec<&PurgedCss> = report.succeeded().collect();
    Ok(serde_json::to_string_pretty(&succeeded)?)
}

/// 写出成功的结果；失败的样式表已记录在报告中，不影响其他输出
pub async fn write_outputs(report: &RunReport, target: &OutputTarget) -> CssResult<()> {
    match target {
        OutputTarget::Stdout => {
            let mut json = results_to_json(report)?;
            json.push('\n');
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(json.as_bytes())
                .await
                .map_err(PurgeCssError::Stream)?;
            stdout.flush().await.map_err(PurgeCssError::Stream)?;
        }
        OutputTarget::Directory(dir) => {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| PurgeCssError::io(dir, e))?;
            for (index, purged) in report.succeeded().enumerate() {
                write_purged(&dir.join(output_file_name(purged, index)), purged).await?;
            }
        }
        OutputTarget::File(path) => {
            if report.results.len() > 1 {
                return Err(PurgeCssError::InvalidInput(format!(
                    "output `{}` is a single file but {} stylesheets were purged",
                    path.display(),
                    report.results.len()
                )));
            }
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| PurgeCssError::io(parent, e))?;
            }
            if let Some(purged) = report.succeeded().next() {
                write_purged(path, purged).await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContentInput, CssInput};
    use purgecss_engine::SourceMapSetting;

    fn raw_css(raw: &str, name: &str) -> CssInput {
        CssInput::Raw {
            raw: raw.into(),
            name: Some(name.into()),
        }
    }

    fn raw_html(raw: &str) -> ContentInput {
        ContentInput::Raw {
            raw: raw.into(),
            extension: "html".into(),
        }
    }

    #[test]
    fn test_output_target_selection() {
        let stdout = UserDefinedOptions::default();
        assert_eq!(OutputTarget::from_options(&stdout), OutputTarget::Stdout);

        let forced = UserDefinedOptions {
            output: Some("dist".into()),
            stdout: true,
            ..Default::default()
        };
        assert_eq!(OutputTarget::from_options(&forced), OutputTarget::Stdout);

        let dir = UserDefinedOptions {
            output: Some("dist".into()),
            ..Default::default()
        };
        assert_eq!(OutputTarget::from_options(&dir), OutputTarget::Directory("dist".into()));

        let file = UserDefinedOptions {
            output: Some("dist/app.CSS".into()),
            ..Default::default()
        };
        assert_eq!(OutputTarget::from_options(&file), OutputTarget::File("dist/app.CSS".into()));
    }

    #[tokio::test]
    async fn test_failed_stylesheet_is_isolated() {
        let options = UserDefinedOptions {
            content: vec![raw_html("<p class=\"a\"></p>")],
            css: vec![
                raw_css(".a { color: red; } .b { color: blue; }", "ok.css"),
                raw_css(".a { color: red;", "broken.css"),
            ],
            ..Default::default()
        };
        let runner = PurgeRunner::new(options).unwrap();
        let report = runner.run_with_reader(None::<&[u8]>).await.unwrap();

        assert_eq!(report.results.len(), 2);
        assert_eq!(report.failure_count(), 1);
        let ok = report.results[0].as_ref().unwrap();
        assert!(ok.css.contains(".a"));
        assert!(!ok.css.contains(".b"));
        assert!(matches!(report.results[1], Err(PurgeCssError::Engine(_))));
    }

    #[tokio::test]
    async fn test_unreadable_stylesheet_does_not_block_others() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("good.css"), ".a { top: 0 } .b { top: 0 }")
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("bad.css"), b".a { top: 0 }\xff")
            .await
            .unwrap();
        let options = UserDefinedOptions {
            content: vec![raw_html("<p class=\"a\"></p>")],
            css: vec![
                CssInput::Path(dir.path().join("bad.css").display().to_string()),
                CssInput::Path(dir.path().join("good.css").display().to_string()),
            ],
            ..Default::default()
        };
        let runner = PurgeRunner::new(options).unwrap();
        let report = runner.run_with_reader(None::<&[u8]>).await.unwrap();

        assert_eq!(report.results.len(), 2);
        assert_eq!(report.failure_count(), 1);
        assert!(matches!(report.results[0], Err(PurgeCssError::Io { .. })));
        let good = report.results[1].as_ref().unwrap();
        assert!(good.css.contains(".a"));
        assert!(!good.css.contains(".b"));
    }

    #[tokio::test]
    async fn test_stdin_content_is_used() {
        let options = UserDefinedOptions {
            css: vec![raw_css(".piped { top: 0 } .other { top: 0 }", "a.css")],
            stdin: true,
            ..Default::default()
        };
        let runner = PurgeRunner::new(options).unwrap();
        let report = runner
            .run_with_reader(Some(&b"<div class=\"piped\"></div>"[..]))
            .await
            .unwrap();
        let purged = report.succeeded().next().unwrap();
        assert!(purged.css.contains(".piped"));
        assert!(!purged.css.contains(".other"));
    }

    #[tokio::test]
    async fn test_no_stylesheet_is_invalid() {
        let runner = PurgeRunner::new(UserDefinedOptions::default()).unwrap();
        let result = runner.run_with_reader(None::<&[u8]>).await;
        assert!(matches!(result, Err(PurgeCssError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_write_directory_with_source_maps() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("dist");
        let options = UserDefinedOptions {
            content: vec![raw_html("<p class=\"a\"></p>")],
            css: vec![
                raw_css(".a { top: 0 }", "styles/app.css"),
                CssInput::Raw {
                    raw: ".a { left: 0 }".into(),
                    name: None,
                },
            ],
            source_map: SourceMapSetting::Toggle(true),
            ..Default::default()
        };
        let runner = PurgeRunner::new(options).unwrap();
        let report = runner.run_with_reader(None::<&[u8]>).await.unwrap();
        write_outputs(&report, &OutputTarget::Directory(out.clone()))
            .await
            .unwrap();

        let app = tokio::fs::read_to_string(out.join("app.css")).await.unwrap();
        assert!(app.contains(".a"));
        let map = tokio::fs::read_to_string(out.join("app.css.map")).await.unwrap();
        assert!(map.contains("\"version\":3"));
        assert!(out.join("stylesheet-1.css").exists());
    }

    #[tokio::test]
    async fn test_single_file_output_rejects_many_stylesheets() {
        let dir = tempfile::tempdir().unwrap();
        let options = UserDefinedOptions {
            css: vec![raw_css(".a{}", "a.css"), raw_css(".b{}", "b.css")],
            ..Default::default()
        };
        let runner = PurgeRunner::new(options).unwrap();
        let report = runner.run_with_reader(None::<&[u8]>).await.unwrap();
        let target = OutputTarget::File(dir.path().join("out.css"));
        assert!(matches!(
            write_outputs(&report, &target).await,
            Err(PurgeCssError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_results_json_shape() {
        let options = UserDefinedOptions {
            content: vec![raw_html("<p class=\"a\"></p>")],
            css: vec![raw_css(".a { top: 0 } .b { top: 0 }", "a.css")],
            rejected: true,
            ..Default::default()
        };
        let runner = PurgeRunner::new(options).unwrap();
        let report = runner.run_with_reader(None::<&[u8]>).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&results_to_json(&report).unwrap()).unwrap();

        assert_eq!(json[0]["file"], "a.css");
        assert_eq!(json[0]["rejected"], serde_json::json!([".b"]));
        assert!(json[0].get("rejectedCss").is_none());
        assert!(json[0].get("sourceMap").is_none());
    }
}
