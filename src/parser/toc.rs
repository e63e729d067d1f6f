use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use tracing::debug;

use super::TocEntry;

/// 目录标题：必须位于行首，吞掉本行剩余字符但不吞换行符，
/// 因此第一条目录项永远不会被并入标题行
static TOC_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*(?:TABLE OF )?CONTENTS\b[^\r\n]*").expect("valid regex")
});

/// 对齐用的点线（如 `. . . . .`）
static LEADER_DOTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[.\s]+$").expect("valid regex"));

// 罗马数字 + 破折号 + 标题（I.—Loomings）
static ROMAN_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([IVXLCDM]+)\.?[—\-–](.+)$").expect("valid regex")
});

// CHAPTER + 罗马/阿拉伯数字（CHAPTER I, Chapter 12. The Storm）
static CHAPTER_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(CHAPTER\s+[IVXLCDM0-9]+)[.\s—\-–]*(.*)$").expect("valid regex")
});

// 数字 + 句点 + 标题（1. The Beginning）
static NUMBERED_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\.\s*(.+)$").expect("valid regex"));

/// 目录块
///
/// 记录目录标题在正文中的位置、目录块的结束位置，以及块内的候选行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocBlock<'a> {
    /// 目录标题所在区间
    pub heading: Range<usize>,
    /// 目录块结束位置（含终止空行）
    pub end: usize,
    /// 块内非空行（已去除首尾空白）
    pub lines: Vec<&'a str>,
}

/// 查找目录标题
///
/// # 返回
/// 标题匹配区间；没有目录时返回 None（这不是错误）
pub fn locate_toc_heading(content: &str) -> Option<Range<usize>> {
    TOC_HEADING.find(content).map(|m| m.range())
}

/// 扫描目录标题之后的文本，确定目录块的结束位置
///
/// 至少出现一个非空行之后，连续 `blank_line_run` 个空行即视为目录结束。
/// 之前的空行（标题与第一项之间）不计入。
/// 找不到这样的空行时一直扫描到文本末尾：如果标题其实是以 "Contents" 开头的正文句子，
/// 之后的全部正文都会被当作目录移除。
///
/// # 返回
/// (候选行, 消耗的字节数)
pub fn scan_toc_lines(after_heading: &str, blank_line_run: usize) -> (Vec<&str>, usize) {
    let mut lines = Vec::new();
    let mut consumed = 0;
    let mut consecutive_empty = 0;
    let mut in_toc = false;

    for raw_line in after_heading.split_inclusive('\n') {
        consumed += raw_line.len();
        let line = raw_line.trim();

        if line.is_empty() {
            consecutive_empty += 1;
        } else {
            consecutive_empty = 0;
            in_toc = true;
            lines.push(line);
        }

        if in_toc && consecutive_empty >= blank_line_run {
            break;
        }
    }

    (lines, consumed)
}

/// 定位完整的目录块
pub fn locate_toc_block(content: &str, blank_line_run: usize) -> Option<TocBlock<'_>> {
    let heading = locate_toc_heading(content)?;
    let (lines, consumed) = scan_toc_lines(&content[heading.end..], blank_line_run);

    Some(TocBlock {
        end: heading.end + consumed,
        heading,
        lines,
    })
}

/// 单行目录匹配器
type TocLineMatcher = fn(&str) -> Option<TocEntry>;

/// 按优先级排列的匹配器，第一个命中的生效
const TOC_LINE_MATCHERS: [(&str, TocLineMatcher); 4] = [
    ("roman", match_roman_heading),
    ("chapter", match_chapter_heading),
    ("numbered", match_numbered_heading),
    ("plain", match_plain_line),
];

/// 生成章节检索键：去掉非字母数字字符，合并空白，转大写
pub fn normalize_chapter_key(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

fn match_roman_heading(line: &str) -> Option<TocEntry> {
    let caps = ROMAN_HEADING.captures(line)?;
    let numeral = &caps[1];
    let text = caps[2].trim();

    Some(TocEntry {
        title: format!("{}. {}", numeral, text),
        chapter_key: normalize_chapter_key(text),
    })
}

fn match_chapter_heading(line: &str) -> Option<TocEntry> {
    let caps = CHAPTER_HEADING.captures(line)?;
    let number = caps[1].trim();
    let text = caps[2].trim();

    let title = if text.is_empty() {
        number.to_string()
    } else {
        format!("{} - {}", number, text)
    };

    Some(TocEntry {
        title,
        chapter_key: normalize_chapter_key(&format!("{} {}", number, text)),
    })
}

fn match_numbered_heading(line: &str) -> Option<TocEntry> {
    let caps = NUMBERED_HEADING.captures(line)?;
    let text = caps[2].trim();

    Some(TocEntry {
        title: format!("{}. {}", &caps[1], text),
        chapter_key: normalize_chapter_key(text),
    })
}

/// 兜底：以第一个句点分隔，前半为标题，后半为检索键来源
fn match_plain_line(line: &str) -> Option<TocEntry> {
    match line.find('.') {
        Some(idx) if idx > 0 => Some(TocEntry {
            title: line[..idx].trim().to_string(),
            chapter_key: normalize_chapter_key(&line[idx + 1..]),
        }),
        _ => Some(TocEntry {
            title: line.to_string(),
            chapter_key: normalize_chapter_key(line),
        }),
    }
}

/// 解析单行目录
///
/// 点线行和检索键为空的行返回 None
pub fn classify_toc_line(line: &str) -> Option<TocEntry> {
    let line = line.trim();
    if line.is_empty() || LEADER_DOTS.is_match(line) {
        return None;
    }

    let (kind, entry) = TOC_LINE_MATCHERS
        .iter()
        .find_map(|(kind, matcher)| matcher(line).map(|entry| (*kind, entry)))?;

    if entry.chapter_key.is_empty() {
        return None;
    }

    debug!(kind, title = %entry.title, chapter_key = %entry.chapter_key, "目录项");
    Some(entry)
}

/// 解析目录块中的所有候选行，保持原有顺序
pub fn parse_toc_entries(lines: &[&str]) -> Vec<TocEntry> {
    lines.iter().filter_map(|line| classify_toc_line(line)).collect()
}

/// 从正文中移除目录块
///
/// 目录标题之前与目录块之后的文本各自去除首尾空白后，以空行拼接
pub fn remove_toc(content: &str, block: Option<&TocBlock<'_>>) -> String {
    match block {
        Some(block) => format!(
            "{}\n\n{}",
            content[..block.heading.start].trim(),
            content[block.end..].trim()
        ),
        None => content.to_string(),
    }
}
