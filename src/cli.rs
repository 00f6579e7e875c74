//! 命令行参数定义；命令行参数覆盖配置文件

use std::path::PathBuf;

use clap::Parser;
use purgecss_engine::{PatternSource, SourceMapSetting, UserSafelist};

use crate::config::{ContentInput, CssInput, UserDefinedOptions};
use crate::error::CssResult;

/// `purgecss`: remove unused selectors from stylesheets.
///
/// Content files are scanned for the tokens they use; every rule whose
/// selectors reference nothing in use is dropped from the stylesheets.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "purgecss", version, about, long_about = None)]
pub struct Cli {
    /// JSON config file. Flags given on the command line override it.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Stylesheet path or glob. Repeatable.
    #[arg(long, value_name = "PATH")]
    pub css: Vec<String>,

    /// Content path or glob to scan for used tokens. Repeatable.
    #[arg(long, value_name = "PATH")]
    pub content: Vec<String>,

    /// Output directory, or a single `.css` file when purging one stylesheet.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Remove unused @font-face rules.
    #[arg(long)]
    pub font_face: bool,

    /// Remove unused @keyframes (enabled unless set to false).
    #[arg(long, value_name = "BOOL")]
    pub keyframes: Option<bool>,

    /// Remove unused custom properties.
    #[arg(long)]
    pub variables: bool,

    /// Report rejected selectors.
    #[arg(long)]
    pub rejected: bool,

    /// Report the rejected rules as CSS.
    #[arg(long)]
    pub rejected_css: bool,

    /// Selector token to keep. `/pattern/flags` is a regex. Repeatable.
    #[arg(long, value_name = "ENTRY")]
    pub safelist: Vec<String>,

    /// Selector token to remove even when used. `/pattern/flags` is a regex. Repeatable.
    #[arg(long, value_name = "ENTRY")]
    pub blocklist: Vec<String>,

    /// Content glob to skip. Repeatable.
    #[arg(long = "skipped-content-glob", value_name = "GLOB")]
    pub skipped_content_globs: Vec<String>,

    /// Attribute whose selector values are matched against content. Repeatable.
    #[arg(long = "dynamic-attribute", value_name = "NAME")]
    pub dynamic_attributes: Vec<String>,

    /// Generate source maps.
    #[arg(long)]
    pub source_map: bool,

    /// Read content from standard input.
    #[arg(long)]
    pub stdin: bool,

    /// Extension used to pick the extractor for standard input content.
    #[arg(long, value_name = "EXT", requires = "stdin")]
    pub stdin_extension: Option<String>,

    /// Print results as JSON to standard output.
    #[arg(long)]
    pub stdout: bool,

    /// Treat unreadable or unextractable content as empty instead of failing.
    #[arg(long)]
    pub best_effort: bool,
}

impl Cli {
    /// 读取配置文件（若有）并叠加命令行参数
    pub async fn resolve_options(&self) -> CssResult<UserDefinedOptions> {
        let base = match &self.config {
            Some(path) => UserDefinedOptions::load(path).await?,
            None => UserDefinedOptions::default(),
        };
        Ok(self.apply_to(base))
    }

    /// 命令行参数覆盖配置：列表参数追加，开关仅在显式给出时生效
    pub fn apply_to(&self, mut options: UserDefinedOptions) -> UserDefinedOptions {
        options
            .css
            .extend(self.css.iter().cloned().map(CssInput::Path));
        options
            .content
            .extend(self.content.iter().cloned().map(ContentInput::Path));
        if self.output.is_some() {
            options.output = self.output.clone();
        }

        options.font_face |= self.font_face;
        if let Some(keyframes) = self.keyframes {
            options.keyframes = keyframes;
        }
        options.variables |= self.variables;
        options.rejected |= self.rejected;
        options.rejected_css |= self.rejected_css;

        if !self.safelist.is_empty() {
            let mut safelist = options.safelist.standardize();
            safelist
                .standard
                .extend(self.safelist.iter().map(|s| PatternSource::parse(s)));
            options.safelist = UserSafelist::Complex(safelist);
        }
        options
            .blocklist
            .extend(self.blocklist.iter().map(|s| PatternSource::parse(s)));
        options
            .skipped_content_globs
            .extend(self.skipped_content_globs.iter().cloned());
        options
            .dynamic_attributes
            .extend(self.dynamic_attributes.iter().cloned());

        if self.source_map {
            options.source_map = SourceMapSetting::Toggle(true);
        }
        options.stdin |= self.stdin;
        if self.stdin_extension.is_some() {
            options.stdin_extension = self.stdin_extension.clone();
        }
        options.stdout |= self.stdout;
        options.best_effort |= self.best_effort;
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use purgecss_engine::ComplexSafelist;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("purgecss").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_parse() {
        let cli = parse(&[
            "--css",
            "dist/*.css",
            "--content",
            "src/**/*.html",
            "--content",
            "src/**/*.js",
            "--keyframes",
            "false",
            "--safelist",
            "/^modal/",
            "--dynamic-attribute",
            "aria-expanded",
            "--stdin",
            "--stdin-extension",
            "vue",
            "-o",
            "out",
        ]);
        assert_eq!(cli.css, vec!["dist/*.css"]);
        assert_eq!(cli.content.len(), 2);
        assert_eq!(cli.keyframes, Some(false));
        assert_eq!(cli.safelist, vec!["/^modal/"]);
        assert_eq!(cli.stdin_extension.as_deref(), Some("vue"));
        assert_eq!(cli.output.as_deref(), Some("out"));
    }

    #[test]
    fn test_stdin_extension_requires_stdin() {
        let result = Cli::try_parse_from(["purgecss", "--stdin-extension", "vue"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let base = UserDefinedOptions {
            css: vec![CssInput::Path("a.css".into())],
            safelist: UserSafelist::Flat(vec![PatternSource::literal("btn")]),
            output: Some("from-config".into()),
            ..Default::default()
        };
        let cli = parse(&[
            "--css",
            "b.css",
            "--safelist",
            "card",
            "--blocklist",
            "/^debug-/",
            "--keyframes",
            "false",
            "--source-map",
            "-o",
            "from-cli",
        ]);
        let options = cli.apply_to(base);

        assert_eq!(
            options.css,
            vec![CssInput::Path("a.css".into()), CssInput::Path("b.css".into())]
        );
        assert_eq!(
            options.safelist,
            UserSafelist::Complex(ComplexSafelist {
                standard: vec![PatternSource::literal("btn"), PatternSource::literal("card")],
                ..Default::default()
            })
        );
        assert_eq!(options.blocklist, vec![PatternSource::regex("^debug-")]);
        assert!(!options.keyframes);
        assert_eq!(options.source_map, SourceMapSetting::Toggle(true));
        assert_eq!(options.output.as_deref(), Some("from-cli"));
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let base = UserDefinedOptions {
            keyframes: false,
            font_face: true,
            ..Default::default()
        };
        let options = parse(&[]).apply_to(base.clone());
        assert_eq!(options, base);
    }

    #[tokio::test]
    async fn test_resolve_options_reads_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("purgecss.json");
        tokio::fs::write(&path, r#"{"css": ["a.css"], "variables": true}"#)
            .await
            .unwrap();
        let cli = Cli {
            config: Some(path),
            rejected: true,
            ..Default::default()
        };
        let options = cli.resolve_options().await.unwrap();
        assert_eq!(options.css, vec![CssInput::Path("a.css".into())]);
        assert!(options.variables && options.rejected);
    }
}
