use crate::{
    exception::Exception,
    param::*,
    rewriter::ResponseDocument,
    util::HtmlBuilder,
};

use chrono::prelude::*;
use log::{debug, error};

use std::{fs, path::Path};

/// 待发送的 HTTP 响应。
///
/// 正文是已渲染的文档文本，响应头按设置顺序保存。内容协商通过
/// [`ResponseDocument`] 就地修改它。
#[derive(Debug, Clone)]
pub struct Response {
    version: HttpVersion,
    status_code: u16,
    information: String,
    headers: Vec<(String, String)>,
    content: String,
    date: DateTime<Utc>,
    server_name: String,
    headonly: bool,
    headers_sent: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        Self {
            version: HttpVersion::V1_1,
            status_code: 200,
            information: "OK".to_string(),
            headers: Vec::new(),
            content: String::new(),
            date: Utc::now(),
            server_name: SERVER_NAME.to_string(),
            headonly: false,
            headers_sent: false,
        }
    }

    /// 以已渲染的文档构建 `200 OK` 响应
    pub fn from_html(html: &str) -> Self {
        let mut response = Self::new();
        response.content = html.to_string();
        response
    }

    /// 读取模板文件作为响应正文。
    ///
    /// 文件不存在返回 `FileNotFound`；内容不是 UTF-8 时无法做文本改写，返回 `BodyIsNotUtf8`。
    pub fn from_template(path: &Path, id: u128, headonly: bool) -> Result<Self, Exception> {
        let bytes = fs::read(path).map_err(|e| {
            error!("[ID{}]无法读取模板{}: {}", id, path.display(), e);
            Exception::FileNotFound
        })?;
        let html = String::from_utf8(bytes).map_err(|_| {
            error!("[ID{}]模板{}不是合法的UTF-8", id, path.display());
            Exception::BodyIsNotUtf8
        })?;
        debug!("[ID{}]模板读取完成，长度：{}", id, html.len());
        let mut response = Self::from_html(&html);
        response.headonly = headonly;
        // 协商之前的原始类型；协商被禁用时按此发送
        let is_xhtml = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("xhtml"));
        let raw_format = if is_xhtml { Format::Xhtml } else { Format::Html };
        response.add_header("Content-Type", raw_format.mime());
        Ok(response)
    }

    fn from_status_code(code: u16, note: Option<&str>) -> Self {
        let mut response = Self::from_html(&HtmlBuilder::from_status_code(code, note).build());
        response.set_code(code);
        response.add_header("Content-Type", Format::Xhtml.mime());
        response
    }

    fn set_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.information = match STATUS_CODES.get(&code) {
            Some(&reason) => reason.to_string(),
            None => {
                error!("非法的状态码：{}", code);
                "Unknown Status".to_string()
            }
        };
        self
    }

    pub fn response_404() -> Self {
        Self::from_status_code(404, None)
    }

    pub fn response_500() -> Self {
        Self::from_status_code(500, None)
    }

    pub fn response_400(note: Option<&str>) -> Self {
        Self::from_status_code(400, note)
    }

    /// 序列化为 HTTP/1.1 报文。HEAD 请求只发送响应头，但 `Content-Length` 仍是正文长度。
    pub fn as_bytes(&self) -> Vec<u8> {
        let version: &str = match self.version {
            HttpVersion::V1_1 => "HTTP/1.1",
        };
        let mut header = format!(
            "{} {} {}{}",
            version, self.status_code, self.information, CRLF
        );
        for (name, value) in &self.headers {
            header.push_str(&format!("{}: {}{}", name, value, CRLF));
        }
        header.push_str(&format!("Content-Length: {}{}", self.content.len(), CRLF));
        header.push_str(&format!("Date: {}{}", format_date(&self.date), CRLF));
        header.push_str(&format!("Server: {}{}", self.server_name, CRLF));
        header.push_str(CRLF);

        let mut bytes = header.into_bytes();
        if !self.headonly {
            bytes.extend_from_slice(self.content.as_bytes());
        }
        bytes
    }

    /// 响应头写入连接后调用，此后协商只能选择 html
    pub fn mark_headers_sent(&mut self) {
        self.headers_sent = true;
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    pub fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

impl ResponseDocument for Response {
    fn body(&self) -> &str {
        &self.content
    }

    fn set_body(&mut self, body: String) {
        self.content = body;
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

fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
