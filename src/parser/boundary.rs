use regex::Regex;
use std::sync::LazyLock;

static START_BANNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*{3}\s*START OF (?:THE|THIS) PROJECT GUTENBERG E-?BOOK[^\r\n]*?\*{3}")
        .expect("valid regex")
});

static END_BANNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*{3}\s*END OF (?:THE|THIS) PROJECT GUTENBERG E-?BOOK[^\r\n]*?\*{3}")
        .expect("valid regex")
});

/// 提取正文边界
///
/// 去掉开头的版权声明和结尾的许可证文本，只保留起止横幅之间的内容。
/// 只找到一个横幅时保留另一侧的原始边缘；都找不到时相当于整篇。
///
/// # 参数
/// - `raw`: 原始文本
///
/// # 返回
/// 去除首尾空白后的正文切片。起止位置倒置时退回为原文（同样去除首尾空白）
pub fn extract_core_content(raw: &str) -> &str {
    let start = START_BANNER.find(raw).map(|m| m.end()).unwrap_or(0);
    let end = END_BANNER.find(raw).map(|m| m.start()).unwrap_or(raw.len());

    if start < end {
        raw[start..end].trim()
    } else {
        raw.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_banners() {
        let raw = "License text\n*** START OF THE PROJECT GUTENBERG EBOOK MOBY DICK ***\n\nCall me Ishmael.\n\n*** END OF THE PROJECT GUTENBERG EBOOK MOBY DICK ***\nMore license";
        assert_eq!(extract_core_content(raw), "Call me Ishmael.");
    }

    #[test]
    fn test_case_insensitive_banner() {
        let raw = "*** start of the project gutenberg ebook x ***\nBody.\n*** End Of This Project Gutenberg EBook x ***";
        assert_eq!(extract_core_content(raw), "Body.");
    }

    #[test]
    fn test_only_start_banner() {
        let raw = "Header\n*** START OF THE PROJECT GUTENBERG EBOOK X ***\nBody text.\nTail";
        assert_eq!(extract_core_content(raw), "Body text.\nTail");
    }

    #[test]
    fn test_only_end_banner() {
        let raw = "Body text.\n*** END OF THE PROJECT GUTENBERG EBOOK X ***\nLicense";
        assert_eq!(extract_core_content(raw), "Body text.");
    }

    #[test]
    fn test_no_banners() {
        let raw = "\n\n  Plain book.  \n";
        assert_eq!(extract_core_content(raw), "Plain book.");
    }

    #[test]
    fn test_inverted_banners_fall_back_to_original() {
        let raw = "*** END OF THE PROJECT GUTENBERG EBOOK X ***\nBody\n*** START OF THE PROJECT GUTENBERG EBOOK X ***";
        assert_eq!(extract_core_content(raw), raw.trim());
    }

    #[test]
    fn test_crlf_input() {
        let raw = "*** START OF THE PROJECT GUTENBERG EBOOK X ***\r\nBody.\r\n*** END OF THE PROJECT GUTENBERG EBOOK X ***\r\n";
        assert_eq!(extract_core_content(raw), "Body.");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_core_content(""), "");
    }
}
