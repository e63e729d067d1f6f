use thiserror::Error;

/// 错误类型
///
/// 流水线本身不会失败（结构缺失只会得到降级结果），
/// 这里的错误都来自外部协作者（下载、存储）或调用方违反约定。
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("下载失败: {0}")]
    Fetch(String),
    #[error("HTTP 错误: {0}")]
    Http(#[from] reqwest::Error),
    #[error("存储错误: {0}")]
    Storage(String),
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("找不到文档: {0}")]
    DocumentNotFound(String),
    #[error("无效的每页句子数: {0}（必须 >= 1）")]
    InvalidPageSize(usize),
    #[error("配置错误: {0}")]
    Config(String),
    #[error("配置文件解析失败: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("解析队列错误: {0}")]
    Queue(String),
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReaderError>;

impl ReaderError {
    /// 是否为上游 I/O 失败（下载或存储）
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ReaderError::Fetch(_)
                | ReaderError::Http(_)
                | ReaderError::Storage(_)
                | ReaderError::Database(_)
                | ReaderError::DocumentNotFound(_)
        )
    }
}
