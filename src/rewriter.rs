// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 表示改写器
//!
//! 根据选定的格式设置 `Content-Type` / `Vary` 响应头，并对已渲染的文档做定点
//! 文本替换。这里不解析 DOM，也不校验良构性：假定文档来自遵循常规写法的模板
//! （顶部至多一个 XML 声明、一个文档类型声明），无法匹配的内容原样保留。

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

use crate::{
    config::Config,
    param::{Format, HTML4_STRICT_DOCTYPE, XML_DECLARATION_OPENER},
};

lazy_static! {
    /// 末尾没有 `/` 的 `<img ...>` 起始标签
    static ref UNCLOSED_IMG: Regex = Regex::new(r"(?i)(<img[^>]*[^/>])>").expect("valid regex");
    /// 文档顶部的 `<?xml ... ?>` 声明及其后的换行
    static ref XML_DECLARATION: Regex = Regex::new(r"<\?xml[^>]+\?>\n?").expect("valid regex");
    static ref DOCTYPE: Regex = Regex::new(r"<!DOCTYPE[^>]+>").expect("valid regex");
    static ref HTML_XMLNS: Regex = Regex::new(r#"<html xmlns="[^"]+""#).expect("valid regex");
}

/// 改写器对外部响应对象的最小要求：读写正文、设置响应头。
pub trait ResponseDocument {
    fn body(&self) -> &str;

    fn set_body(&mut self, body: String);

    /// 设置响应头。已存在同名（大小写不敏感）响应头时原位替换，否则追加。
    fn add_header(&mut self, name: &str, value: &str);
}

/// 按格式分派到对应的改写函数。
pub fn apply<R: ResponseDocument + ?Sized>(format: Format, response: &mut R, config: &Config) {
    match format {
        Format::Html => html(response, config),
        Format::Xhtml => xhtml(response, config),
    }
}

/// 以 `application/xhtml+xml` 发送文档。
///
/// 仅当正文以 `<?xml` 开头时才输出真正的 XHTML，否则整体退化为 [`html`]。
pub fn xhtml<R: ResponseDocument + ?Sized>(response: &mut R, config: &Config) {
    if !response.body().starts_with(XML_DECLARATION_OPENER) {
        warn!("正文缺少XML声明，xhtml退化为html输出");
        html(response, config);
        return;
    }

    response.add_header(
        "Content-Type",
        &format!("{}; charset={}", Format::Xhtml.mime(), config.encoding()),
    );
    response.add_header("Vary", "Accept");

    let content = to_xhtml_body(response.body());
    debug!("xhtml改写完成，正文长度：{}", content.len());
    response.set_body(content);
}

/// 以 `text/html` 发送文档，并把 XHTML 写法还原为 HTML 4.01 Strict。
pub fn html<R: ResponseDocument + ?Sized>(response: &mut R, config: &Config) {
    response.add_header(
        "Content-Type",
        &format!("{}; charset={}", Format::Html.mime(), config.encoding()),
    );
    response.add_header("Vary", "Accept");

    let content = to_html_body(response.body());
    debug!("html改写完成，正文长度：{}", content.len());
    response.set_body(content);
}

/// XHTML 正文替换：`&nbsp;`、`<br>` 与未自闭合的 `<img>`。其他标签一律不动。
pub fn to_xhtml_body(content: &str) -> String {
    let content = content.replace("&nbsp;", "&#160;");
    let content = content.replace("<br>", "<br />");
    UNCLOSED_IMG.replace_all(&content, "${1}/>").into_owned()
}

/// HTML 正文替换。顺序不可调换，后面的模式作用于前面的输出。
pub fn to_html_body(content: &str) -> String {
    let content = XML_DECLARATION.replace_all(content, "");
    let content = content
        .replace("/>", ">")
        .replace("xml:lang", "lang")
        .replace("application/xhtml+xml", "text/html");
    let content = DOCTYPE.replace_all(&content, HTML4_STRICT_DOCTYPE);
    HTML_XMLNS.replace_all(&content, "<html ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Document {
        body: String,
        headers: Vec<(String, String)>,
    }

    impl Document {
        fn with_body(body: &str) -> Self {
            Self {
                body: body.to_string(),
                headers: Vec::new(),
            }
        }

        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    impl ResponseDocument for Document {
        fn body(&self) -> &str {
            &self.body
        }

        fn set_body(&mut self, body: String) {
            self.body = body;
        }

        fn add_header(&mut self, name: &str, value: &str) {
            match self
                .headers
                .iter_mut()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
            {
                Some(entry) => entry.1 = value.to_string(),
                None => self.headers.push((name.to_string(), value.to_string())),
            }
        }
    }

    const XHTML_PAGE: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">\n<html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"en\"><head><meta http-equiv=\"Content-Type\" content=\"application/xhtml+xml\" /></head><body><p>a&nbsp;b<br><img src=\"a.png\"><img src=\"b.png\" /></p></body></html>";

    #[test]
    fn test_xhtml_headers_and_body() {
        let mut doc = Document::with_body(XHTML_PAGE);
        xhtml(&mut doc, &Config::new());

        assert_eq!(
            doc.header("Content-Type"),
            Some("application/xhtml+xml; charset=utf-8")
        );
        assert_eq!(doc.header("Vary"), Some("Accept"));
        assert!(doc.body.contains("a&#160;b"));
        assert!(doc.body.contains("<br />"));
        assert!(doc.body.contains("<img src=\"a.png\"/>"));
        assert!(doc.body.contains("<img src=\"b.png\" />"));
        assert!(doc.body.starts_with("<?xml"));
    }

    #[test]
    fn test_xhtml_without_declaration_degrades_to_html() {
        let mut doc = Document::with_body("<html><body><br /></body></html>");
        xhtml(&mut doc, &Config::new());

        assert_eq!(doc.header("Content-Type"), Some("text/html; charset=utf-8"));
        assert_eq!(doc.body, "<html><body><br ></body></html>");
    }

    #[test]
    fn test_html_rewrite() {
        let mut doc = Document::with_body(XHTML_PAGE);
        html(&mut doc, &Config::new());

        assert_eq!(doc.header("Content-Type"), Some("text/html; charset=utf-8"));
        assert_eq!(doc.header("Vary"), Some("Accept"));
        assert!(doc.body.starts_with(HTML4_STRICT_DOCTYPE));
        assert!(!doc.body.contains("<?xml"));
        assert!(!doc.body.contains("/>"));
        assert!(!doc.body.contains("xmlns"));
        assert!(!doc.body.contains("xml:lang"));
        assert!(!doc.body.contains("application/xhtml+xml"));
        assert!(doc.body.contains(r#"<html  lang="en">"#));
        assert!(doc.body.contains(r#"content="text/html" >"#));
    }

    #[test]
    fn test_html_is_idempotent() {
        let once = to_html_body(XHTML_PAGE);
        let twice = to_html_body(&once);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_img_rule_is_case_insensitive_and_narrow() {
        let body = to_xhtml_body(r#"<IMG SRC="x.gif"><input type="text"><img>"#);

        assert_eq!(body, r#"<IMG SRC="x.gif"/><input type="text"><img>"#);
    }

    #[test]
    fn test_headers_replaced_not_duplicated() {
        let mut doc = Document::with_body("<p>hi</p>");
        html(&mut doc, &Config::new());
        html(&mut doc, &Config::new());

        assert_eq!(doc.headers.len(), 2);
    }

    #[test]
    fn test_encoding_is_read_at_call_time() {
        let mut config = Config::new();
        let mut doc = Document::with_body("<p>hi</p>");
        html(&mut doc, &config);
        assert_eq!(doc.header("Content-Type"), Some("text/html; charset=utf-8"));

        config.set_encoding("iso-8859-1");
        apply(Format::Html, &mut doc, &config);
        assert_eq!(
            doc.header("Content-Type"),
            Some("text/html; charset=iso-8859-1")
        );
    }

    #[test]
    fn test_malformed_markup_passes_through() {
        let garbage = "<<<img <br <?xml <!DOCTYPE";

        assert_eq!(to_html_body(garbage), garbage);
        assert_eq!(to_xhtml_body(garbage), garbage);
    }
}
