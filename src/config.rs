//! 配置加载

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{ReaderError, Result};
use crate::parser::ParseOptions;

/// 默认每页句子数
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// 默认短句长度阈值（字符数），低于此长度的段首句允许“包含”匹配
pub const DEFAULT_SHORT_SENTENCE_CUTOFF: usize = 80;

/// 默认目录结束判定：连续空行数
pub const DEFAULT_TOC_BLANK_LINE_RUN: usize = 3;

/// 默认下载超时（秒）
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

/// 阅读器配置
///
/// 所有字段都有默认值，配置文件只需写要覆盖的项
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// 每页句子数
    pub page_size: usize,
    /// 章节定位时“包含”匹配的短句阈值
    pub short_sentence_cutoff: usize,
    /// 目录块结束所需的连续空行数。
    /// 正文中以 "Contents" 开头的行也会被当作目录标题，之后若没有这么多连续空行，剩余正文都会被当作目录移除
    pub toc_blank_line_run: usize,
    /// 下载超时（秒）
    pub fetch_timeout_secs: u64,
    /// 下载时使用的 User-Agent
    pub user_agent: String,
    /// SQLite 数据库路径
    pub database_path: String,
    /// 最大并发解析任务数
    pub max_concurrent_parses: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            short_sentence_cutoff: DEFAULT_SHORT_SENTENCE_CUTOFF,
            toc_blank_line_run: DEFAULT_TOC_BLANK_LINE_RUN,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            user_agent: format!("book-reader/{}", env!("CARGO_PKG_VERSION")),
            database_path: "library.db".to_string(),
            max_concurrent_parses: 3,
        }
    }
}

impl ReaderConfig {
    /// 从 TOML 字符串解析配置
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ReaderConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载配置
    ///
    /// 文件不存在时返回默认配置
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(ReaderError::InvalidPageSize(self.page_size));
        }
        if self.toc_blank_line_run == 0 {
            return Err(ReaderError::Config(
                "toc_blank_line_run 必须 >= 1".to_string(),
            ));
        }
        if self.max_concurrent_parses == 0 {
            return Err(ReaderError::Config(
                "max_concurrent_parses 必须 >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// 流水线使用的解析选项
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            toc_blank_line_run: self.toc_blank_line_run,
            short_sentence_cutoff: self.short_sentence_cutoff,
        }
    }
}
