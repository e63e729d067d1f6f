use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::ReaderConfig;
use crate::error::{ReaderError, Result};
use crate::parser::decoder::decode_raw_text;

/// 原始文本下载 trait
pub trait TextFetcher: Send + Sync {
    /// 下载完整文本，失败时返回错误
    fn fetch_raw_text(&self, url: &str) -> Result<String>;
}

/// 基于 reqwest 的 HTTP 下载器
///
/// 阻塞调用，整体等待时间受 `fetch_timeout_secs` 限制
pub struct HttpTextFetcher {
    client: Client,
}

impl HttpTextFetcher {
    pub fn new(config: &ReaderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

impl TextFetcher for HttpTextFetcher {
    fn fetch_raw_text(&self, url: &str) -> Result<String> {
        info!(url, "开始下载原始文本");

        let response = self.client.get(url).send().map_err(|e| {
            warn!(url, error = %e, "文件下载失败");
            ReaderError::Fetch(format!("{}: {}", url, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, %status, "文件下载失败");
            return Err(ReaderError::Fetch(format!("{}: HTTP {}", url, status)));
        }

        let bytes = response.bytes()?;
        Ok(decode_raw_text(&bytes))
    }
}
