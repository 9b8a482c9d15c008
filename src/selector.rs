// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 格式选择器
//!
//! 按固定优先级在 html 与 xhtml 之间做出唯一选择，第一条命中的规则即为结果：
//! 1. 协商被禁用：不做任何处理（返回 `None`）。
//! 2. 响应头已发送：只能是 html。
//! 3. 请求携带 `forceFormat`：原样返回，不校验。
//! 4. UA 以 `W3C_Validator/` 开头：xhtml。
//! 5. 按 Accept 头中两种已知媒体类型的权重选择，均未出现时回退到 html。
//!
//! 这里只区分两种媒体类型，`*/*`、`text/*` 等通配符不参与匹配。

use std::cmp::Ordering;

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::{
    config::Config,
    param::{Format, W3C_VALIDATOR_PREFIX},
    request::Request,
};

/// 未写 `q` 参数时使用的权重记号
const DEFAULT_WEIGHT: &str = "1";

lazy_static! {
    /// 每种格式对应的 Accept 匹配模式，顺序与 `Format::SCAN_ORDER` 一致。
    static ref ACCEPT_PATTERNS: Vec<(Format, Regex)> = Format::SCAN_ORDER
        .iter()
        .map(|format| {
            let pattern = format!(r"(?i){}(;q=(\d+(?:\.\d+)?))?", regex::escape(format.mime()));
            (*format, Regex::new(&pattern).expect("accept pattern is a valid regex"))
        })
        .collect();
}

/// 一次协商所需的全部入站信号，生命周期仅限于单个响应。
#[derive(Debug, Clone, Default)]
pub struct NegotiationContext {
    headers_sent: bool,
    force_format: Option<String>,
    user_agent: Option<String>,
    accept: Option<String>,
}

impl NegotiationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已解析的请求中提取信号。`headers_sent` 由响应一方提供。
    pub fn from_request(request: &Request, headers_sent: bool) -> Self {
        Self {
            headers_sent,
            force_format: request.force_format().map(str::to_string),
            user_agent: request.user_agent().map(str::to_string),
            accept: request.accept().map(str::to_string),
        }
    }

    pub fn headers_sent(mut self, sent: bool) -> Self {
        self.headers_sent = sent;
        self
    }

    pub fn force_format(mut self, format: &str) -> Self {
        self.force_format = Some(format.to_string());
        self
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    pub fn accept(mut self, accept: &str) -> Self {
        self.accept = Some(accept.to_string());
        self
    }
}

/// Accept 头中的一条偏好。
///
/// 权重保留为原始记号而不是浮点数：缺省值与显式 `q=1` 都记为 `"1"`，二者会发生碰撞。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPreference {
    pub weight: String,
    pub format: Format,
}

/// 按 `Format::SCAN_ORDER` 的顺序扫描 Accept 头，每种媒体类型只取第一次出现。
///
/// 无法识别的片段直接忽略，不会报错。
pub fn parse_accept(accept: &str) -> Vec<FormatPreference> {
    ACCEPT_PATTERNS
        .iter()
        .filter_map(|(format, pattern)| {
            let captures = pattern.captures(accept)?;
            let weight = captures
                .get(2)
                .map_or(DEFAULT_WEIGHT, |m| m.as_str())
                .to_string();
            Some(FormatPreference {
                weight,
                format: *format,
            })
        })
        .collect()
}

/// 以权重记号为键构建有序映射，键重复时保留先插入的条目。
pub fn preference_map(preferences: &[FormatPreference]) -> Vec<(String, Format)> {
    let mut map: Vec<(String, Format)> = Vec::with_capacity(preferences.len());
    for preference in preferences {
        if !map.iter().any(|(weight, _)| *weight == preference.weight) {
            map.push((preference.weight.clone(), preference.format));
        }
    }
    map
}

/// 权重记号降序比较。数值相等但记号不同（`"1"` 与 `"1.0"`）时按字典序降序。
fn compare_weights(a: &str, b: &str) -> Ordering {
    let x = a.parse::<f64>().unwrap_or(0.0);
    let y = b.parse::<f64>().unwrap_or(0.0);
    y.partial_cmp(&x)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.cmp(a))
}

/// Accept 头中权重最高的已知格式；两种媒体类型都没出现时返回 `None`。
pub fn preferred_format(accept: &str) -> Option<Format> {
    let mut map = preference_map(&parse_accept(accept));
    map.sort_by(|(a, _), (b, _)| compare_weights(a, b));
    map.first().map(|(_, format)| *format)
}

/// 选择本次响应的输出格式。
///
/// 返回 `None` 表示协商被禁用，调用方不应改动响应；否则返回格式名。
/// 强制格式参数会被原样返回，是否合法由分派一方判断。
pub fn select(context: &NegotiationContext, config: &Config) -> Option<String> {
    if config.is_disabled() {
        debug!("内容协商已禁用，跳过");
        return None;
    }

    if context.headers_sent {
        debug!("响应头已发送，只能使用html");
        return Some(Format::Html.name().to_string());
    }

    if let Some(forced) = &context.force_format {
        debug!("请求强制指定格式：{}", forced);
        return Some(forced.clone());
    }

    if context
        .user_agent
        .as_deref()
        .is_some_and(|ua| ua.starts_with(W3C_VALIDATOR_PREFIX))
    {
        debug!("检测到W3C验证器，使用xhtml");
        return Some(Format::Xhtml.name().to_string());
    }

    let format = match context.accept.as_deref().and_then(preferred_format) {
        Some(format) => format,
        None => {
            debug!("Accept头未包含已知媒体类型，回退到html");
            Format::Html
        }
    };
    debug!("根据Accept头选择格式：{}", format);
    Some(format.name().to_string())
}
