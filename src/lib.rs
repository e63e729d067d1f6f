//! Book Reader
//!
//! 把公版书的原始纯文本转换为可导航、可分页的文档：书名、目录项（含页码）、有序句子序列。

pub mod async_parse;
pub mod config;
pub mod db;
pub mod error;
pub mod fetch;
pub mod pager;
pub mod parse_queue;
pub mod parser;
pub mod service;
pub mod store;


// 重新导出主要类型
pub use config::ReaderConfig;
pub use error::{ReaderError, Result};
pub use fetch::{HttpTextFetcher, TextFetcher};
pub use pager::{BookDetailPage, ChapterInfo, Page, Paginator};
pub use parse_queue::{ParseQueue, ParseStatus, ParseTask};
pub use parser::{ChapterPosition, Document, ParseOptions, Sentence, TextParser, TocEntry};
pub use service::{BookRef, BookService};
pub use store::{DocumentStore, SqliteDocumentStore};

/// 使用默认选项解析原始文本
pub fn parse_document(raw: &str, title: &str) -> Document {
    TextParser::default().parse(raw, title)
}
