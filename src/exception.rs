// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 定义协商器与模板服务器在处理过程中可能返回的各类异常。
//!
//! - 协议解析错误：请求报文不是 UTF-8、方法或版本不受支持。
//! - 资源错误：模板不存在或路径非法。
//! - 协商错误：强制格式参数给出了未知的格式名，此时拒绝改写而不是静默回退。

use std::fmt;

/// 处理请求过程中发生的异常类型。
#[derive(Debug, Clone, PartialEq)]
pub enum Exception {
    /// 客户端发送的请求字节流无法解析为合法的 UTF-8 字符串。
    RequestIsNotUtf8,
    /// 客户端使用了服务器不支持的 HTTP 方法。
    UnSupportedRequestMethod,
    /// 客户端使用了服务器不支持的 HTTP 协议版本。
    UnsupportedHttpVersion,
    /// 在 `www_root` 下未找到所请求的模板。对应 `404 Not Found`。
    FileNotFound,
    /// 请求的路径格式非法或包含越权尝试（如 `..`）。对应 `400 Bad Request`。
    InvalidPath,
    /// 模板文件内容不是合法的 UTF-8，无法进行文本改写。
    BodyIsNotUtf8,
    /// 格式名不属于 {html, xhtml}，携带原始取值。
    UnknownFormat(String),
    /// 配置文件无法读取，携带底层错误描述。
    ConfigUnreadable(String),
}

use Exception::*;

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestIsNotUtf8 => write!(f, "Request bytes can't be parsed in UTF-8"),
            UnSupportedRequestMethod => write!(f, "Unsupported request method"),
            UnsupportedHttpVersion => write!(f, "Unsupported HTTP version"),
            FileNotFound => write!(f, "File not found (404)"),
            InvalidPath => write!(f, "Invalid path (400)"),
            BodyIsNotUtf8 => write!(f, "Template body is not valid UTF-8"),
            UnknownFormat(name) => write!(f, "Unknown output format: {}", name),
            ConfigUnreadable(reason) => write!(f, "Couldn't read config file: {}", reason),
        }
    }
}

impl std::error::Error for Exception {}
