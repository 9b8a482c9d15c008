// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 该模块定义了内容协商器使用的协议常量和强类型枚举，包括：
//! - 两种输出表示（HTML4 Strict 与 XHTML）的格式标签及其 MIME 类型。
//! - 协商过程中用到的固定字面量（验证器 UA 前缀、强制格式参数名、HTML4 文档类型声明）。
//! - 模板服务器所需的 HTTP 方法、版本与状态码原因短语。

use std::{fmt, str::FromStr};

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::exception::Exception;

/// 服务器名称标识，用于 HTTP 响应头的 `Server` 字段
pub const SERVER_NAME: &str = "shaneyale-negotiator";

/// HTTP 协议规定的换行符（Carriage Return Line Feed）
pub const CRLF: &str = "\r\n";

/// 未显式配置时使用的字符编码
pub const DEFAULT_ENCODING: &str = "utf-8";

/// 用于强制指定输出格式的查询参数名（测试用途）
pub const FORCE_FORMAT_PARAM: &str = "forceFormat";

/// W3C 验证器的 User-Agent 前缀。验证器不发送 Accept 头，但能处理 XHTML。
pub const W3C_VALIDATOR_PREFIX: &str = "W3C_Validator/";

/// XML 声明的起始片段，XHTML 输出的前置条件
pub const XML_DECLARATION_OPENER: &str = "<?xml";

/// HTML 输出时统一替换成的 HTML 4.01 Strict 文档类型声明
pub const HTML4_STRICT_DOCTYPE: &str =
    r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#;

/// 模板首页文件名，请求 `/` 时使用
pub const HTML_INDEX: &str = "index.html";

/// 文档的两种输出表示。
///
/// 协商结果永远是这两者之一，改写时对该枚举做穷尽匹配。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// HTML 4.01 Strict，`text/html`
    Html,
    /// XHTML，`application/xhtml+xml`
    Xhtml,
}

impl Format {
    /// 扫描 Accept 头时的固定顺序。权重相同时先扫描到的格式胜出，因此 html 优先。
    pub const SCAN_ORDER: [Format; 2] = [Format::Html, Format::Xhtml];

    /// 该格式对应的媒体类型
    pub fn mime(&self) -> &'static str {
        match self {
            Format::Html => "text/html",
            Format::Xhtml => "application/xhtml+xml",
        }
    }

    /// 格式标签名，与 `forceFormat` 参数的取值一致
    pub fn name(&self) -> &'static str {
        match self {
            Format::Html => "html",
            Format::Xhtml => "xhtml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Format {
    type Err = Exception;

    /// 只接受 `html` 与 `xhtml` 两个名称，区分大小写。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(Format::Html),
            "xhtml" => Ok(Format::Xhtml),
            other => Err(Exception::UnknownFormat(other.to_string())),
        }
    }
}

lazy_static! {
    /// 模板服务器用到的状态码与原因短语映射表。
    pub static ref STATUS_CODES: HashMap<u16, &'static str> = {
        let mut map = HashMap::new();
        map.insert(200, "OK");
        map.insert(204, "No Content");
        map.insert(400, "Bad Request");
        map.insert(404, "Not Found");
        map.insert(405, "Method Not Allowed");
        map.insert(500, "Internal Server Error");
        map.insert(505, "HTTP Version Not Supported");
        map
    };
}

lazy_static! {
    /// 可被协商的模板文件后缀。其余后缀不属于渲染后的文档，不由本服务器提供。
    pub static ref TEMPLATE_EXTENSIONS: Vec<&'static str> = vec!["html", "htm", "xhtml"];
}

/// 支持的 HTTP 协议版本
#[derive(Debug, Clone, Copy)]
pub enum HttpVersion {
    /// HTTP/1.1 版本
    V1_1,
}

/// 标准 HTTP 请求方法
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpRequestMethod {
    /// 获取资源
    Get,
    /// 获取资源的元数据（不包含响应体）
    Head,
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpVersion::V1_1 => write!(f, "1.1"),
        }
    }
}

impl fmt::Display for HttpRequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpRequestMethod::Get => write!(f, "GET"),
            HttpRequestMethod::Head => write!(f, "HEAD"),
        }
    }
}
