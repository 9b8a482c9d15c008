// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

#[cfg(test)]
mod server_tests {
    //! # 模板服务器黑盒测试
    //!
    //! 通过真实 TCP 连接验证服务器对协商信号的处理。需要先以默认配置启动服务器
    //! （`www/index.html` 为 XHTML 模板），因此默认忽略。

    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn send_request(request: &str) -> Result<String, String> {
        let mut stream = TcpStream::connect("127.0.0.1:7878")
            .await
            .map_err(|e| e.to_string())?;

        stream
            .write_all(request.as_bytes())
            .await
            .map_err(|e| e.to_string())?;

        let mut buffer = Vec::new();
        // 服务器发送完响应即关闭连接；超时仅防止测试因服务器挂起而阻塞
        let _ = tokio::time::timeout(Duration::from_secs(2), stream.read_to_end(&mut buffer)).await;

        Ok(String::from_utf8_lossy(&buffer).to_string())
    }

    fn header<'a>(response: &'a str, name: &str) -> Option<&'a str> {
        response
            .split("\r\n\r\n")
            .next()?
            .lines()
            .filter_map(|line| line.split_once(": "))
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    fn extract_status_code(response: &str) -> u16 {
        response
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|code| code.parse().ok())
            .unwrap_or(0)
    }

    #[tokio::test]
    #[ignore]
    async fn test_xhtml_accept() {
        let response = send_request(
            "GET / HTTP/1.1\r\nHost: localhost\r\nAccept: application/xhtml+xml\r\n\r\n",
        )
        .await
        .unwrap();

        assert_eq!(extract_status_code(&response), 200);
        assert_eq!(
            header(&response, "Content-Type"),
            Some("application/xhtml+xml; charset=utf-8")
        );
        assert_eq!(header(&response, "Vary"), Some("Accept"));
        assert!(response.contains("<br />"));
    }

    #[tokio::test]
    #[ignore]
    async fn test_default_is_html4() {
        let response = send_request("GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        assert_eq!(header(&response, "Content-Type"), Some("text/html; charset=utf-8"));
        assert!(response.contains("-//W3C//DTD HTML 4.01//EN"));
        assert!(!response.contains("<?xml"));
    }

    #[tokio::test]
    #[ignore]
    async fn test_force_format_parameter() {
        let response = send_request(
            "GET /?forceFormat=xhtml HTTP/1.1\r\nHost: localhost\r\nAccept: text/html\r\n\r\n",
        )
        .await
        .unwrap();

        assert_eq!(
            header(&response, "Content-Type"),
            Some("application/xhtml+xml; charset=utf-8")
        );
    }

    #[tokio::test]
    #[ignore]
    async fn test_unknown_force_format_is_rejected() {
        let response = send_request("GET /?forceFormat=wml HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        assert_eq!(extract_status_code(&response), 400);
        assert!(response.contains("Unknown output format: wml"));
    }

    #[tokio::test]
    #[ignore]
    async fn test_path_traversal_rejected() {
        let response = send_request("GET /../Cargo.toml HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        assert_eq!(extract_status_code(&response), 400);
    }
}
