use tracing::{info, warn};

use super::{Sentence, TocEntry};

/// 命中章节的检索阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// 第一阶段：只在段首句中检索
    ParagraphStart,
    /// 第二阶段：在所有句子中检索（回退）
    AnySentence,
}

/// 章节定位结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterPosition {
    /// 目录中的章节标题
    pub title: String,
    /// 章节检索键
    pub chapter_key: String,
    /// 章节起始句子下标；无法定位时为 None
    pub sentence_index: Option<usize>,
    /// 命中的检索阶段
    pub strategy: Option<MatchStrategy>,
}

/// 单条句子匹配规则
///
/// `content` 与 `pattern` 均已转为大写
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SentenceRule {
    /// 完全相等
    Exact,
    /// 以 `pattern + 分隔符` 开头
    Prefix(&'static [char]),
    /// 短句中包含 pattern（字符数 < 阈值）
    ShortContains(usize),
}

const PRIMARY_SEPARATORS: &[char] = &[' ', '.', ',', '_'];
const FALLBACK_SEPARATORS: &[char] = &[' '];

impl SentenceRule {
    fn matches(&self, content: &str, pattern: &str) -> bool {
        match self {
            SentenceRule::Exact => content == pattern,
            SentenceRule::Prefix(separators) => content
                .strip_prefix(pattern)
                .and_then(|rest| rest.chars().next())
                .is_some_and(|next| separators.contains(&next)),
            SentenceRule::ShortContains(cutoff) => {
                content.chars().count() < *cutoff && content.contains(pattern)
            }
        }
    }
}

/// 一个检索阶段
struct SearchPass {
    strategy: MatchStrategy,
    paragraph_starts_only: bool,
    rules: Vec<SentenceRule>,
}

/// 生成章节检索用的模式列表
///
/// 依次为：大写标题、大写检索键、检索键中的每个单词。去重并保持顺序。
pub fn search_patterns(entry: &TocEntry) -> Vec<String> {
    let mut patterns: Vec<String> = Vec::new();
    let mut push = |pattern: String| {
        if !pattern.is_empty() && !patterns.contains(&pattern) {
            patterns.push(pattern);
        }
    };

    push(entry.title.trim().to_uppercase());
    push(entry.chapter_key.trim().to_uppercase());
    for word in entry.chapter_key.split_whitespace() {
        let clean: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
        push(clean.to_uppercase());
    }

    patterns
}

/// 章节定位器
///
/// 按目录顺序为每个章节在句子序列中寻找起始位置。
/// 检索游标只前进不后退，保证章节位置单调不减。
pub struct ChapterLocator {
    passes: Vec<SearchPass>,
}

impl ChapterLocator {
    /// 创建定位器
    ///
    /// # 参数
    /// - `short_sentence_cutoff`: 第一阶段允许“包含”匹配的最大句长（不含）
    pub fn new(short_sentence_cutoff: usize) -> Self {
        let passes = vec![
            SearchPass {
                strategy: MatchStrategy::ParagraphStart,
                paragraph_starts_only: true,
                rules: vec![
                    SentenceRule::Exact,
                    SentenceRule::Prefix(PRIMARY_SEPARATORS),
                    SentenceRule::ShortContains(short_sentence_cutoff),
                ],
            },
            SearchPass {
                strategy: MatchStrategy::AnySentence,
                paragraph_starts_only: false,
                rules: vec![SentenceRule::Exact, SentenceRule::Prefix(FALLBACK_SEPARATORS)],
            },
        ];

        Self { passes }
    }

    /// 从游标处开始查找，返回第一个命中的句子下标和检索阶段
    fn find_from(
        &self,
        patterns: &[String],
        sentences: &[Sentence],
        cursor: usize,
    ) -> Option<(usize, MatchStrategy)> {
        self.passes.iter().find_map(|pass| {
            sentences
                .iter()
                .enumerate()
                .skip(cursor)
                .filter(|(_, sentence)| !pass.paragraph_starts_only || sentence.is_paragraph_start)
                .find(|(_, sentence)| {
                    let content = sentence.content.trim().to_uppercase();
                    patterns.iter().any(|pattern| {
                        pass.rules.iter().any(|rule| rule.matches(&content, pattern))
                    })
                })
                .map(|(idx, _)| (idx, pass.strategy))
        })
    }

    /// 定位所有章节
    ///
    /// 标题和检索键都为空的目录项会被跳过；找不到的章节记录为 None 且游标不动
    pub fn locate(&self, toc: &[TocEntry], sentences: &[Sentence]) -> Vec<ChapterPosition> {
        let mut cursor = 0;
        let mut positions = Vec::with_capacity(toc.len());

        for entry in toc {
            if entry.title.trim().is_empty() && entry.chapter_key.trim().is_empty() {
                continue;
            }

            let patterns = search_patterns(entry);
            let found = self.find_from(&patterns, sentences, cursor);

            match found {
                Some((idx, strategy)) => {
                    info!(
                        title = %entry.title,
                        sentence_index = idx,
                        ?strategy,
                        "找到章节: {}",
                        preview(&sentences[idx].content)
                    );
                    cursor = idx + 1;
                }
                None => {
                    warn!(title = %entry.title, chapter_key = %entry.chapter_key, "正文中找不到章节");
                }
            }

            positions.push(ChapterPosition {
                title: entry.title.clone(),
                chapter_key: entry.chapter_key.clone(),
                sentence_index: found.map(|(idx, _)| idx),
                strategy: found.map(|(_, strategy)| strategy),
            });
        }

        positions
    }
}

impl Default for ChapterLocator {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SHORT_SENTENCE_CUTOFF)
    }
}

fn preview(content: &str) -> String {
    content.chars().take(50).collect()
}
