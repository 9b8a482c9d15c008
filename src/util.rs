use crate::param::{SERVER_NAME, STATUS_CODES};

/// 服务器内部页面（错误页等）的构建器。
///
/// 输出带 XML 声明的 XHTML 1.0 Strict 文档，与普通模板一样交给内容协商处理。
pub struct HtmlBuilder {
    title: String,
    css: String,
    body: String,
}

impl HtmlBuilder {
    pub fn from_status_code(code: u16, note: Option<&str>) -> Self {
        let title = format!("{}", code);
        let css = r"
            body {
                width: 35em;
                margin: 0 auto;
                font-family: Tahoma, Verdana, Arial, sans-serif;
            }
            "
        .to_string();
        // 说明文字可能来自请求内容，必须转义后再写入页面
        let description = match note {
            Some(n) => escape_html(n),
            None => STATUS_CODES
                .get(&code)
                .copied()
                .unwrap_or("Unknown Status")
                .to_string(),
        };
        let body = format!(
            r"
            <h1>{}</h1>
            <p>{}</p>
            <hr />
            <p>{}</p>
            ",
            code, description, SERVER_NAME
        );
        Self { title, css, body }
    }

    pub fn build(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="en">
    <head>
        <meta http-equiv="Content-Type" content="application/xhtml+xml; charset=UTF-8" />
        <title>{}</title>
        <style type="text/css">{}</style>
    </head>
    <body>{}</body>
</html>"#,
            self.title, self.css, self.body
        )
    }
}

/// 转义文本中的 `&`、`<`、`>`、`"`，使其可以安全地放入元素内容或属性值。
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
