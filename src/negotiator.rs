// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 内容协商入口
//!
//! 每个待发送的响应调用一次 [`process`]：先由选择器确定格式，再分派到对应的改写函数。

use log::{debug, error};

use crate::{
    config::Config,
    exception::Exception,
    param::Format,
    rewriter::{self, ResponseDocument},
    selector::{self, NegotiationContext},
};

/// 对响应执行内容协商并就地改写。
///
/// - `Ok(None)`：协商被禁用，响应保持原样。
/// - `Ok(Some(format))`：已按 `format` 改写响应。
/// - `Err(UnknownFormat)`：强制格式参数不是已知格式，响应保持原样。
pub fn process<R: ResponseDocument + ?Sized>(
    context: &NegotiationContext,
    response: &mut R,
    config: &Config,
) -> Result<Option<Format>, Exception> {
    let Some(chosen) = selector::select(context, config) else {
        return Ok(None);
    };

    let format = chosen.parse::<Format>().map_err(|e| {
        error!("无法分派内容协商结果：{}", e);
        e
    })?;

    rewriter::apply(format, response, config);
    debug!("内容协商完成，输出格式：{}", format);
    Ok(Some(format))
}
