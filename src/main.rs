// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 模板预览服务器
//!
//! 基于 Tokio 运行时的多线程服务器，把 `www_root` 下已渲染的模板经过内容协商后发送：
//! - 根据 `forceFormat`、User-Agent 与 Accept 头在 HTML4 与 XHTML 之间选择输出表示
//! - 就地改写正文并设置 `Content-Type` / `Vary`
//! - 错误页同样是 XHTML 文档，遵循同一套协商流程

use negotiator::{
    config::Config,
    exception::Exception,
    negotiator::process,
    param::{HttpRequestMethod, HTML_INDEX, TEMPLATE_EXTENSIONS},
    request::Request,
    response::Response,
    rewriter::{self, ResponseDocument},
    selector::NegotiationContext,
};

use log::{debug, error, info, warn};
use tokio::{
    io::{AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    runtime::Builder,
};

use std::{
    net::{Ipv4Addr, SocketAddrV4},
    path::{Component, Path, PathBuf},
    sync::Arc,
    time::Instant,
};

fn main() {
    // 日志系统：log4rs 通过外部 YAML 配置级别与输出目的地
    if let Err(e) = log4rs::init_file("config/log4rs.yaml", Default::default()) {
        eprintln!("无法初始化日志系统：{}", e);
    }

    let config = match Config::from_toml("config/development.toml") {
        Ok(config) => {
            info!("配置文件已载入");
            config
        }
        Err(e) => {
            warn!("{}，使用默认配置", e);
            Config::new()
        }
    };
    info!("www root: {}", config.www_root());
    info!("输出编码: {}", config.encoding());

    let runtime = match Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("无法创建异步运行时：{}", e);
            return;
        }
    };

    runtime.block_on(serve(config));
}

/// 绑定端口并进入主事件循环，每个连接交给一个独立任务处理。
async fn serve(config: Config) {
    let port: u16 = config.port();
    let address = match config.local() {
        true => Ipv4Addr::new(127, 0, 0, 1),
        false => Ipv4Addr::new(0, 0, 0, 0),
    };
    let socket = SocketAddrV4::new(address, port);

    let listener = match TcpListener::bind(socket).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("无法绑定端口：{}，错误：{}", port, e);
            return;
        }
    };
    info!("服务端在{}上监听Socket连接", socket);

    // 配置在启动后只读，多个任务共享同一份
    let config = Arc::new(config);
    let mut id: u128 = 0;

    loop {
        let (mut stream, addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("接受连接失败：{}", e);
                continue;
            }
        };
        debug!("[ID{}]新的连接：{}", id, addr);

        let config = Arc::clone(&config);
        tokio::spawn(async move {
            handle_connection(&mut stream, id, config).await;
        });
        id += 1;
    }
}

/// # 连接处理器
///
/// 读取并解析请求、定位模板、执行内容协商，最后发送响应。
async fn handle_connection(stream: &mut TcpStream, id: u128, config: Arc<Config>) {
    let mut buffer = vec![0; 4096];

    let n = match stream.read(&mut buffer).await {
        Ok(0) => return,
        Ok(n) => n,
        Err(e) => {
            error!("[ID{}]读取TCPStream时遇到错误: {}", id, e);
            return;
        }
    };
    let start_time = Instant::now();

    let request = match Request::try_from(&buffer[..n], id) {
        Ok(req) => req,
        Err(e) => {
            warn!("[ID{}]解析HTTP请求失败: {}", id, e);
            let mut response = Response::response_400(Some(&e.to_string()));
            negotiate(&mut response, &NegotiationContext::new(), &config, id);
            send(stream, &mut response, id).await;
            return;
        }
    };
    debug!("[ID{}]成功解析HTTP请求", id);

    let headonly = request.method() == HttpRequestMethod::Head;
    let mut response = match route(request.path(), config.www_root())
        .and_then(|path| Response::from_template(&path, id, headonly))
    {
        Ok(response) => response,
        Err(Exception::FileNotFound) => {
            warn!("[ID{}]请求的路径：{} 不存在，返回404", id, request.path());
            Response::response_404()
        }
        Err(Exception::InvalidPath) => {
            warn!("[ID{}]请求的路径：{} 非法，返回400", id, request.path());
            Response::response_400(None)
        }
        Err(e) => {
            error!("[ID{}]处理请求时发生异常: {}", id, e);
            Response::response_500()
        }
    };

    let context = NegotiationContext::from_request(&request, response.headers_sent());
    negotiate(&mut response, &context, &config, id);

    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );
    info!(
        "[ID{}] {}, {}, {}, {}, {}, {}",
        id,
        request.version(),
        request.path(),
        request.method(),
        response.status_code(),
        response.header("Content-Type").unwrap_or("-"),
        request.user_agent().unwrap_or("-"),
    );

    send(stream, &mut response, id).await;
}

/// 对响应执行协商。强制格式非法时改为 400 错误页，并直接按 html 输出。
fn negotiate(response: &mut Response, context: &NegotiationContext, config: &Config, id: u128) {
    match process(context, response, config) {
        Ok(Some(format)) => debug!("[ID{}]输出格式：{}", id, format),
        Ok(None) => debug!("[ID{}]内容协商已禁用，按原样发送", id),
        Err(e) => {
            warn!("[ID{}]{}，返回400", id, e);
            *response = Response::response_400(Some(&e.to_string()));
            rewriter::html(response, config);
        }
    }
}

/// 写出响应。写入成功后响应头即视为已发送，之后的协商只能选择 html。
async fn send<W: AsyncWrite + Unpin>(stream: &mut W, response: &mut Response, id: u128) {
    let response_bytes = response.as_bytes();
    debug!("[ID{}]发送响应，长度: {}", id, response_bytes.len());
    if let Err(e) = stream.write_all(&response_bytes).await {
        error!("[ID{}]发送响应失败: {}", id, e);
        return;
    }
    response.mark_headers_sent();
    let _ = stream.flush().await;
}

/// # 路由
///
/// 把请求路径映射为 `www_root` 下的模板文件：`/` 对应首页，只允许模板后缀，
/// 含 `..` 等越界分量的路径被拒绝。
fn route(path: &str, root: &str) -> Result<PathBuf, Exception> {
    let relative = path.trim_start_matches('/');
    let relative = if relative.is_empty() { HTML_INDEX } else { relative };

    let relative_path = Path::new(relative);
    if relative_path
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(Exception::InvalidPath);
    }

    let is_template = relative_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| TEMPLATE_EXTENSIONS.iter().any(|t| t.eq_ignore_ascii_case(e)));
    if !is_template {
        return Err(Exception::FileNotFound);
    }

    let full_path = Path::new(root).join(relative_path);
    match full_path.is_file() {
        true => Ok(full_path),
        false => Err(Exception::FileNotFound),
    }
}
