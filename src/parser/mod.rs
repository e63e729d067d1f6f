use serde::{Deserialize, Serialize};
use tracing::info;

// 子模块声明
pub mod boundary;
pub mod chapter_locator;
pub mod decoder;
pub mod segmenter;
pub mod toc;

pub use chapter_locator::{ChapterLocator, ChapterPosition, MatchStrategy};

/// 目录项
///
/// 顺序与原文目录一致，后续章节定位依赖这个顺序
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TocEntry {
    /// 目录标题
    pub title: String,
    /// 去除标点后转大写的检索键
    pub chapter_key: String,
}

/// 句子
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    /// 段内序号，从 1 开始
    pub sentence_number: usize,
    /// 段落序号，从 1 开始，全书单调递增
    pub paragraph_number: usize,
    /// 句子内容
    pub content: String,
    /// 是否为段首句
    #[serde(rename = "paragraphStart")]
    pub is_paragraph_start: bool,
}

/// 解析后的文档
///
/// 一本书只构建一次；重新解析时整体替换，不做原地修改
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub title: String,
    pub table_of_content: Vec<TocEntry>,
    pub sentences: Vec<Sentence>,
}

/// 解析选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// 目录块结束所需的连续空行数（第一项之前的空行不计）。
    /// 以 "Contents" 开头的正文行也会被识别为目录标题，其后缺少这样的空行时剩余正文会整体被移除
    pub toc_blank_line_run: usize,
    /// 章节定位时“包含”匹配的短句阈值
    pub short_sentence_cutoff: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            toc_blank_line_run: crate::config::DEFAULT_TOC_BLANK_LINE_RUN,
            short_sentence_cutoff: crate::config::DEFAULT_SHORT_SENTENCE_CUTOFF,
        }
    }
}

/// 纯文本书籍解析器
///
/// 无状态：每次解析互相独立，可在多个线程中同时使用
#[derive(Debug, Clone, Default)]
pub struct TextParser {
    options: ParseOptions,
}

impl TextParser {
    /// 创建新的解析器实例
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// 解析原始文本
    ///
    /// # 参数
    /// - `raw`: 原始文本（LF 或 CRLF 换行均可）
    /// - `title`: 书名
    ///
    /// # 返回
    /// 文档：目录项列表和有序句子序列。不会失败，结构缺失只会得到降级结果
    pub fn parse(&self, raw: &str, title: &str) -> Document {
        // 1. 去掉首尾的版权声明
        let core = boundary::extract_core_content(raw);

        // 2. 目录
        let toc_block = toc::locate_toc_block(core, self.options.toc_blank_line_run);
        let table_of_content = match &toc_block {
            Some(block) => toc::parse_toc_entries(&block.lines),
            None => {
                info!(title, "找不到目录标题");
                Vec::new()
            }
        };

        // 3. 正文
        let body = toc::remove_toc(core, toc_block.as_ref());
        let sentences = segmenter::segment(&body);

        info!(
            title,
            toc_entries = table_of_content.len(),
            sentences = sentences.len(),
            "解析完成"
        );

        Document {
            title: title.to_string(),
            table_of_content,
            sentences,
        }
    }

    /// 定位文档中各章节的起始句子
    pub fn locate_chapters(&self, document: &Document) -> Vec<ChapterPosition> {
        ChapterLocator::new(self.options.short_sentence_cutoff)
            .locate(&document.table_of_content, &document.sentences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_serialized_field_names() {
        let document = Document {
            title: "X".to_string(),
            table_of_content: vec![TocEntry {
                title: "I. Loomings".to_string(),
                chapter_key: "LOOMINGS".to_string(),
            }],
            sentences: vec![Sentence {
                sentence_number: 1,
                paragraph_number: 1,
                content: "LOOMINGS".to_string(),
                is_paragraph_start: true,
            }],
        };

        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["tableOfContent"][0]["chapterKey"], "LOOMINGS");
        assert_eq!(value["sentences"][0]["sentenceNumber"], 1);
        assert_eq!(value["sentences"][0]["paragraphNumber"], 1);
        assert_eq!(value["sentences"][0]["paragraphStart"], true);

        let restored: Document = serde_json::from_value(value).unwrap();
        assert_eq!(restored, document);
    }

    #[test]
    fn test_parse_empty_input() {
        let document = TextParser::default().parse("", "Empty");
        assert_eq!(document.title, "Empty");
        assert!(document.table_of_content.is_empty());
        assert!(document.sentences.is_empty());
    }

    #[test]
    fn test_parse_keeps_text_before_toc() {
        let raw = "MOBY DICK\n\nBy Herman Melville.\n\nCONTENTS\n\nI.—Loomings\n\n\n\nLOOMINGS\n\nCall me Ishmael.";
        let document = TextParser::default().parse(raw, "Moby Dick");
        let contents: Vec<_> = document.sentences.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(contents, vec!["MOBY DICK", "By Herman Melville.", "LOOMINGS", "Call me Ishmael."]);
    }

    #[test]
    fn test_many_blank_lines_after_contents_heading() {
        let raw = "CONTENTS\n\n\n\n\nI.—Loomings\nII.—The Carpet-Bag\n\n\n\nLOOMINGS\n\nCall me Ishmael.";
        let document = TextParser::default().parse(raw, "Moby Dick");

        let keys: Vec<_> = document.table_of_content.iter().map(|e| e.chapter_key.as_str()).collect();
        assert_eq!(keys, vec!["LOOMINGS", "THE CARPETBAG"]);
        let contents: Vec<_> = document.sentences.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(contents, vec!["LOOMINGS", "Call me Ishmael."]);
    }

    #[test]
    fn test_parser_options() {
        let options = ParseOptions {
            toc_blank_line_run: 2,
            short_sentence_cutoff: 40,
        };
        assert_eq!(TextParser::new(options).options(), options);
        assert_eq!(TextParser::default().options(), ParseOptions::default());
    }
}
