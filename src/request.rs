// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求处理模块
//!
//! 将 TCP 流中读取的原始字节解析为强类型的 `Request` 结构体，并提取内容协商
//! 所需的三类入站信号：
//! 1. 查询参数 `forceFormat`（强制格式，测试用途）。
//! 2. `User-Agent` 标头（识别 W3C 验证器）。
//! 3. `Accept` 标头（客户端的媒体类型偏好）。

use crate::{exception::Exception, param::*};
use log::error;

/// 表示一个 HTTP 请求的元数据。请求体不参与协商，因此不会被保存。
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP 请求方法
    method: HttpRequestMethod,
    /// 请求的资源路径（不含查询字符串）
    path: String,
    /// 查询参数，按出现顺序保存
    query: Vec<(String, String)>,
    /// HTTP 协议版本
    version: HttpVersion,
    /// 客户端标识字符串
    user_agent: Option<String>,
    /// 客户端接受的内容类型（原始 Accept 值）
    accept: Option<String>,
}

impl Request {
    /// 从原始字节缓冲区尝试构建 `Request` 实例。
    ///
    /// # 参数
    /// * `buffer` - 从网络 Socket 读取的原始数据。
    /// * `id` - 全局请求 ID，用于在多线程环境下追踪日志。
    ///
    /// # 错误处理
    /// 请求不是 UTF-8、方法不是 GET/HEAD、版本不是 HTTP/1.1 时返回相应的 `Exception`。
    pub fn try_from(buffer: &[u8], id: u128) -> Result<Self, Exception> {
        let request_string = match std::str::from_utf8(buffer) {
            Ok(string) => string.trim_end_matches('\0'),
            Err(_) => {
                error!("[ID{}]无法解析HTTP请求", id);
                return Err(Exception::RequestIsNotUtf8);
            }
        };

        let request_lines: Vec<&str> = request_string.split(CRLF).collect();

        // 解析请求行 (e.g., "GET /index.html?forceFormat=xhtml HTTP/1.1")
        let first_line_parts: Vec<&str> = request_lines[0].split(' ').collect();

        if first_line_parts.len() < 3 {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, request_lines[0]);
            return Err(Exception::UnSupportedRequestMethod);
        }

        let method_str = first_line_parts[0].to_uppercase();
        let method = match method_str.as_str() {
            "GET" => HttpRequestMethod::Get,
            "HEAD" => HttpRequestMethod::Head,
            _ => {
                error!("[ID{}]不支持的HTTP请求方法：{}", id, &method_str);
                return Err(Exception::UnSupportedRequestMethod);
            }
        };

        let version_str = first_line_parts[first_line_parts.len() - 1].to_uppercase();
        let version = match version_str.as_str() {
            "HTTP/1.1" => HttpVersion::V1_1,
            _ => {
                error!("[ID{}]不支持的HTTP协议版本：{}", id, &version_str);
                return Err(Exception::UnsupportedHttpVersion);
            }
        };

        let target = first_line_parts[1..first_line_parts.len() - 1].join(" ");
        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p.to_string(), parse_query(q)),
            None => (target, Vec::new()),
        };

        let mut user_agent = None;
        let mut accept = None;
        // 空行之后是请求体，不再解析
        for line in request_lines.iter().skip(1).take_while(|l| !l.is_empty()) {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim().to_string();
            match name.trim().to_lowercase().as_str() {
                "user-agent" => user_agent = Some(value),
                "accept" => accept = Some(value),
                _ => {}
            }
        }

        Ok(Self {
            method,
            path,
            query,
            version,
            user_agent,
            accept,
        })
    }
}

/// 拆分查询字符串。仅把 `+` 还原为空格，不做百分号解码。
fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (k.replace('+', " "), v.replace('+', " "))
        })
        .collect()
}

impl Request {
    pub fn version(&self) -> &HttpVersion {
        &self.version
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    /// 查询参数中第一个名为 `name` 的取值
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// `forceFormat` 查询参数，原样返回，不做校验
    pub fn force_format(&self) -> Option<&str> {
        self.query_param(FORCE_FORMAT_PARAM)
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }
}
