use super::Sentence;

/// 分割文本为段落
///
/// 根据空行（只含空白的行也算）分割段落，段内各行去除首尾空白后以单个空格拼接。
/// 空段落直接丢弃。
pub fn split_into_paragraphs(content: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current_paragraph = String::new();

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            // 空行，结束当前段落
            if !current_paragraph.is_empty() {
                paragraphs.push(std::mem::take(&mut current_paragraph));
            }
        } else {
            if !current_paragraph.is_empty() {
                current_paragraph.push(' ');
            }
            current_paragraph.push_str(trimmed);
        }
    }

    if !current_paragraph.is_empty() {
        paragraphs.push(current_paragraph);
    }

    paragraphs
}

/// 分割段落为句子
///
/// `.`、`!`、`?` 后紧跟空白即为断点；标点留在前一句，空白不归属任何一侧。
/// 去除首尾空白后为空的片段会被丢弃。
pub fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = paragraph.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let followed_by_space = chars.peek().is_some_and(|&(_, next)| next.is_whitespace());
        if followed_by_space {
            let end = idx + c.len_utf8();
            push_fragment(&mut sentences, &paragraph[start..end]);
            start = end;
        }
    }

    push_fragment(&mut sentences, &paragraph[start..]);
    sentences
}

fn push_fragment<'a>(sentences: &mut Vec<&'a str>, fragment: &'a str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        sentences.push(fragment);
    }
}

/// 分段累加器：段落编号随非空段落递增
#[derive(Debug, Default)]
struct SegmentState {
    paragraph_number: usize,
    sentences: Vec<Sentence>,
}

impl SegmentState {
    fn push_paragraph(mut self, paragraph: &str) -> Self {
        let parts = split_sentences(paragraph);
        if parts.is_empty() {
            return self;
        }

        self.paragraph_number += 1;
        let paragraph_number = self.paragraph_number;
        self.sentences.extend(parts.into_iter().enumerate().map(|(i, content)| Sentence {
            sentence_number: i + 1,
            paragraph_number,
            content: content.to_string(),
            is_paragraph_start: i == 0,
        }));
        self
    }
}

/// 将正文切分为有序、带编号的句子序列
///
/// 句子编号在段内从 1 开始；段落编号从 1 开始，全书单调递增
pub fn segment(body: &str) -> Vec<Sentence> {
    split_into_paragraphs(body)
        .iter()
        .fold(SegmentState::default(), |state, paragraph| state.push_paragraph(paragraph))
        .sentences
}
