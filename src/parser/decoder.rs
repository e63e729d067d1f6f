use encoding_rs::*;
use tracing::warn;

/// 检测原始文本编码
///
/// 1. BOM
/// 2. 合法的 UTF-8
/// 3. 其余按 Windows-1252 处理（旧版 us-ascii / latin-1 纯文本）
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _bom_length)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }

    WINDOWS_1252
}

/// 解码原始字节为字符串
///
/// 解码是有损的：非法字节会被替换字符代替并记录警告
pub fn decode_raw_text(bytes: &[u8]) -> String {
    let encoding = detect_encoding(bytes);
    let (content, encoding_used, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(encoding = encoding_used.name(), "文本解码时出现错误，可能存在乱码");
    }
    content.into_owned()
}
