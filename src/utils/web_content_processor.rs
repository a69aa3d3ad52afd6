// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// 抓取时丢弃的整块元素，内容对菜单提取没有意义
const HIDDEN_ELEMENTS: [&str; 6] = ["script", "style", "noscript", "svg", "head", "template"];

/// 网页内容处理器，把菜单页面规整为稳定的纯文本
///
/// 输出只取决于页面的可见文本，因此同一页面的两次抓取会得到相同的内容哈希。
pub struct WebContentProcessor {
    html_cleaner: HtmlCleaner,
}

/// HTML清理器
struct HtmlCleaner {
    hidden_block_regexes: Vec<Regex>,
    comment_regex: Regex,
    line_break_regex: Regex,
    tag_regex: Regex,
    horizontal_whitespace_regex: Regex,
}

/// 全局网页内容处理器实例
static WEB_PROCESSOR: Lazy<WebContentProcessor> = Lazy::new(WebContentProcessor::new);

impl Default for WebContentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl WebContentProcessor {
    /// 创建新的网页内容处理器
    pub fn new() -> Self {
        Self {
            html_cleaner: HtmlCleaner::new(),
        }
    }

    /// 获取全局处理器实例
    pub fn global() -> &'static Self {
        &WEB_PROCESSOR
    }

    /// 规整页面内容
    ///
    /// HTML 页面会去掉脚本、样式和标签，块级元素转为换行；
    /// 纯文本只做实体解码和空白规整。
    pub fn normalize(&self, content: &str) -> String {
        let is_html = self.detect_html_structure(content);
        let text = if is_html {
            self.html_cleaner.extract_text(content)
        } else {
            content.to_string()
        };

        let decoded = html_escape::decode_html_entities(&text);
        let normalized = self.html_cleaner.normalize_lines(&decoded);
        debug!(
            "页面内容规整完成，HTML: {}, 原始 {} 字节, 结果 {} 字节",
            is_html,
            content.len(),
            normalized.len()
        );
        normalized
    }

    /// 检测HTML结构
    fn detect_html_structure(&self, content: &str) -> bool {
        let lowered = content.to_ascii_lowercase();
        ["<html", "<!doctype", "<head", "<body", "<div", "<p>", "<p ", "<table", "<br", "<span"]
            .iter()
            .any(|marker| lowered.contains(marker))
    }
}

impl HtmlCleaner {
    /// 创建新的HTML清理器
    fn new() -> Self {
        let hidden_block_regexes = HIDDEN_ELEMENTS
            .iter()
            .map(|tag| Self::compile(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")))
            .collect();

        Self {
            hidden_block_regexes,
            comment_regex: Self::compile(r"(?s)<!--.*?-->"),
            line_break_regex: Self::compile(
                r"(?i)<br\s*/?>|</?(?:p|div|section|article|header|footer|main|aside|nav|li|ul|ol|table|thead|tbody|tfoot|tr|h[1-6]|dl|dt|dd|blockquote|pre|figure|figcaption|form|hr)\b[^>]*>",
            ),
            tag_regex: Self::compile(r"(?s)<[^>]+>"),
            horizontal_whitespace_regex: Self::compile(r"[^\S\n]+"),
        }
    }

    fn compile(pattern: &str) -> Regex {
        // 模式均为内置常量
        Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
    }

    /// 从HTML中提取文本
    fn extract_text(&self, html: &str) -> String {
        let mut text = self.comment_regex.replace_all(html, "").into_owned();

        for regex in &self.hidden_block_regexes {
            text = regex.replace_all(&text, "").into_owned();
        }

        text = self.line_break_regex.replace_all(&text, "\n").into_owned();
        self.tag_regex.replace_all(&text, " ").into_owned()
    }

    /// 逐行规整空白并丢弃空行
    fn normalize_lines(&self, text: &str) -> String {
        text.lines()
            .map(|line| self.horizontal_whitespace_regex.replace_all(line, " "))
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 便捷函数：规整抓取到的页面文档
pub fn normalize_document(content: &str) -> String {
    WebContentProcessor::global().normalize(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_detection() {
        let processor = WebContentProcessor::new();

        let html_content = r#"
        <!DOCTYPE html>
        <html>
        <head><title>Test</title></head>
        <body><p>Hello World</p></body>
        </html>
        "#;

        assert!(processor.detect_html_structure(html_content));

        let plain_text = "This is plain text without any HTML tags.";
        assert!(!processor.detect_html_structure(plain_text));
    }

    #[test]
    fn test_menu_text_extraction() {
        let html_content = r#"
        <html>
        <head><title>Lounasravintola</title><style>body { color: red; }</style></head>
        <body>
            <h1>Viikon lounas</h1>
            <!-- päivitetty maanantaina -->
            <div class="day"><h2>Maanantai</h2>
              <p>Lohikeittoa &amp; ruisleipää <strong>12,50&nbsp;€</strong></p>
            </div>
            <script>trackVisit('menu');</script>
            <noscript>Ota JavaScript käyttöön</noscript>
        </body>
        </html>
        "#;

        let result = normalize_document(html_content);

        assert_eq!(
            result,
            "Viikon lounas\nMaanantai\nLohikeittoa & ruisleipää 12,50 €"
        );
    }

    #[test]
    fn test_line_breaks_are_preserved() {
        let result = normalize_document("<div>Tiistai<br>Kanakastike<br/>Kasvispihvit</div>");
        assert_eq!(result, "Tiistai\nKanakastike\nKasvispihvit");
    }

    #[test]
    fn test_volatile_markup_does_not_change_output() {
        let first = r#"<html><head><script>var nonce = "a1";</script></head><body><p>Keitto</p></body></html>"#;
        let second = r#"<html><head><script>var nonce = "b2";</script></head><body><p class="x">Keitto</p></body></html>"#;

        assert_eq!(normalize_document(first), normalize_document(second));
    }

    #[test]
    fn test_plain_text_processing() {
        let plain_text = "\n\n  This is plain text.  \n\n   With multiple   lines.\n\n";
        let result = normalize_document(plain_text);

        assert_eq!(result, "This is plain text.\nWith multiple lines.");
    }

    #[test]
    fn test_empty_content() {
        assert_eq!(normalize_document(""), "");
        assert_eq!(normalize_document("<html><body></body></html>"), "");
    }
}
