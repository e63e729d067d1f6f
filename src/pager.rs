use serde::{Deserialize, Serialize};

use crate::error::{ReaderError, Result};
use crate::parser::{ChapterPosition, Document, Sentence};

/// 章节信息（目录导航用）
///
/// `start_page` 为 0 时也可能表示章节无法定位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterInfo {
    pub title: String,
    pub start_page: usize,
}

/// 一页内容（视图，不持久化）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<'a> {
    pub sentences: &'a [Sentence],
    pub current_page: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

/// 书籍详情页响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetailPage {
    pub title: String,
    pub chapters: Vec<ChapterInfo>,
    pub sentences: Vec<Sentence>,
    pub current_page: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

/// 分页器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
}

impl Paginator {
    /// 创建分页器
    ///
    /// 每页句子数为 0 属于调用方错误
    pub fn new(page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(ReaderError::InvalidPageSize(page_size));
        }
        Ok(Self { page_size })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// 总页数，至少为 1（空文档也有一页空白页）
    pub fn total_pages(&self, sentence_count: usize) -> usize {
        sentence_count.div_ceil(self.page_size).max(1)
    }

    /// 将请求的页码限制在 [0, total_pages - 1]
    pub fn clamp_page(&self, page: i64, sentence_count: usize) -> usize {
        let last = self.total_pages(sentence_count) - 1;
        usize::try_from(page).map_or(0, |page| page.min(last))
    }

    /// 取一页
    pub fn page<'a>(&self, sentences: &'a [Sentence], page: i64) -> Page<'a> {
        let total_pages = self.total_pages(sentences.len());
        let current_page = self.clamp_page(page, sentences.len());

        let start = (current_page * self.page_size).min(sentences.len());
        let end = (start + self.page_size).min(sentences.len());

        Page {
            sentences: &sentences[start..end],
            current_page,
            total_pages,
            has_next: current_page + 1 < total_pages,
            has_previous: current_page > 0,
        }
    }

    /// 章节起始句子下标换算为页码；无法定位的章节页码为 0
    pub fn chapter_infos(&self, positions: &[ChapterPosition]) -> Vec<ChapterInfo> {
        positions
            .iter()
            .map(|position| ChapterInfo {
                title: position.title.clone(),
                start_page: position.sentence_index.map_or(0, |idx| idx / self.page_size),
            })
            .collect()
    }

    /// 组装详情页响应
    pub fn detail_page(
        &self,
        document: &Document,
        positions: &[ChapterPosition],
        page: i64,
    ) -> BookDetailPage {
        let view = self.page(&document.sentences, page);

        BookDetailPage {
            title: document.title.clone(),
            chapters: self.chapter_infos(positions),
            sentences: view.sentences.to_vec(),
            current_page: view.current_page,
            total_pages: view.total_pages,
            has_next: view.has_next,
            has_previous: view.has_previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::MatchStrategy;

    fn sentences(count: usize) -> Vec<Sentence> {
        (1..=count)
            .map(|n| Sentence {
                sentence_number: 1,
                paragraph_number: n,
                content: format!("Sentence {}.", n),
                is_paragraph_start: true,
            })
            .collect()
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(matches!(Paginator::new(0), Err(ReaderError::InvalidPageSize(0))));
    }

    #[test]
    fn test_total_pages() {
        let pager = Paginator::new(50).unwrap();
        assert_eq!(pager.total_pages(0), 1);
        assert_eq!(pager.total_pages(1), 1);
        assert_eq!(pager.total_pages(50), 1);
        assert_eq!(pager.total_pages(51), 2);
        assert_eq!(pager.total_pages(120), 3);
    }

    #[test]
    fn test_pages_of_120_sentences() {
        let all = sentences(120);
        let pager = Paginator::new(50).unwrap();

        let first = pager.page(&all, 0);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.sentences.len(), 50);
        assert_eq!(first.sentences[0].paragraph_number, 1);
        assert_eq!(first.sentences[49].paragraph_number, 50);
        assert!(!first.has_previous);
        assert!(first.has_next);

        let last = pager.page(&all, 2);
        assert_eq!(last.sentences.len(), 20);
        assert_eq!(last.sentences[0].paragraph_number, 101);
        assert_eq!(last.sentences[19].paragraph_number, 120);
        assert!(last.has_previous);
        assert!(!last.has_next);
    }

    #[test]
    fn test_page_clamping() {
        let all = sentences(120);
        let pager = Paginator::new(50).unwrap();

        assert_eq!(pager.page(&all, -1).current_page, 0);
        assert_eq!(pager.page(&all, i64::MIN).current_page, 0);
        assert_eq!(pager.page(&all, 99).current_page, 2);
        assert_eq!(pager.page(&all, i64::MAX).current_page, 2);
    }

    #[test]
    fn test_empty_document_has_one_empty_page() {
        let pager = Paginator::new(50).unwrap();
        let page = pager.page(&[], 3);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 0);
        assert!(page.sentences.is_empty());
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn test_pages_partition_sentences() {
        let all = sentences(37);
        for page_size in 1..=40 {
            let pager = Paginator::new(page_size).unwrap();
            let total = pager.total_pages(all.len());
            let joined: Vec<Sentence> = (0..total)
                .flat_map(|i| pager.page(&all, i as i64).sentences.to_vec())
                .collect();
            assert_eq!(joined, all, "page_size = {}", page_size);
        }
    }

    #[test]
    fn test_chapter_infos() {
        let pager = Paginator::new(50).unwrap();
        let positions = vec![
            ChapterPosition {
                title: "One".to_string(),
                chapter_key: "ONE".to_string(),
                sentence_index: Some(0),
                strategy: Some(MatchStrategy::ParagraphStart),
            },
            ChapterPosition {
                title: "Lost".to_string(),
                chapter_key: "LOST".to_string(),
                sentence_index: None,
                strategy: None,
            },
            ChapterPosition {
                title: "Two".to_string(),
                chapter_key: "TWO".to_string(),
                sentence_index: Some(149),
                strategy: Some(MatchStrategy::AnySentence),
            },
        ];

        let infos = pager.chapter_infos(&positions);
        assert_eq!(infos[0].start_page, 0);
        assert_eq!(infos[1].start_page, 0);
        assert_eq!(infos[2].start_page, 2);
    }

    #[test]
    fn test_detail_page_serialization() {
        let document = Document {
            title: "Book".to_string(),
            table_of_content: vec![],
            sentences: sentences(3),
        };
        let pager = Paginator::new(2).unwrap();
        let detail = pager.detail_page(&document, &[], 1);

        assert_eq!(detail.sentences.len(), 1);
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["currentPage"], 1);
        assert_eq!(value["totalPages"], 2);
        assert_eq!(value["hasNext"], false);
        assert_eq!(value["hasPrevious"], true);
    }
}
