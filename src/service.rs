use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ReaderConfig;
use crate::error::Result;
use crate::fetch::TextFetcher;
use crate::pager::{BookDetailPage, Paginator};
use crate::parse_queue::ParseStatus;
use crate::parser::TextParser;
use crate::store::{document_key, DocumentStore};

/// 书籍引用
///
/// 目录检索得到的书籍基本信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRef {
    pub id: i64,
    pub title: String,
    pub language: String,
    pub text_url: String,
}

impl BookRef {
    /// 文档存储键
    pub fn document_key(&self) -> String {
        document_key(self.id, &self.language, &self.title)
    }
}

/// 书籍服务
///
/// 串联下载、解析、存储和分页：文档不存在时下载并解析，之后从存储中读取
pub struct BookService<F, S> {
    fetcher: F,
    store: S,
    parser: TextParser,
    paginator: Paginator,
}

impl<F: TextFetcher, S: DocumentStore> BookService<F, S> {
    pub fn new(fetcher: F, store: S, config: &ReaderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fetcher,
            store,
            parser: TextParser::new(config.parse_options()),
            paginator: Paginator::new(config.page_size)?,
        })
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 确保书籍已解析并保存
    ///
    /// # 返回
    /// 文档存储键
    pub fn ensure_parsed(&self, book: &BookRef) -> Result<String> {
        self.ensure_parsed_reporting(book, &|_| {})
    }

    /// 同 `ensure_parsed`，每进入一个阶段回调一次 `report`
    pub fn ensure_parsed_reporting(
        &self,
        book: &BookRef,
        report: &dyn Fn(ParseStatus),
    ) -> Result<String> {
        let key = book.document_key();
        if self.store.exists(&key)? {
            return Ok(key);
        }

        report(ParseStatus::Fetching);
        let raw = self.fetcher.fetch_raw_text(&book.text_url)?;

        report(ParseStatus::Parsing);
        info!(title = %book.title, "开始解析");
        let document = self.parser.parse(&raw, &book.title);

        report(ParseStatus::Storing);
        self.store.store(&key, &document)?;
        info!(title = %book.title, key = %key, "解析结果已保存");
        Ok(key)
    }

    /// 书籍详情页
    ///
    /// # 参数
    /// - `book`: 书籍
    /// - `page`: 页码（从 0 开始，越界会被限制在有效范围内）
    pub fn detail_page(&self, book: &BookRef, page: i64) -> Result<BookDetailPage> {
        let key = self.ensure_parsed(book)?;
        let document = self.store.retrieve(&key)?;
        let positions = self.parser.locate_chapters(&document);

        Ok(self.paginator.detail_page(&document, &positions, page))
    }
}
