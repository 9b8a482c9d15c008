use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::{error, info, warn};
use std::fs::File;
use std::io::prelude::*;

use crate::{exception::Exception, param::DEFAULT_ENCODING};

/// 进程级配置。
///
/// 启动时构建一次，之后以引用的形式传入选择器与改写器。通过 setter 做出的修改
/// 对随后的每一次协商立即可见，不存在按请求复制的副本。
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    www_root: String,
    port: u16,
    worker_threads: usize,
    local: bool,
    #[serde(default = "default_encoding")]
    encoding: String,
    #[serde(default)]
    negotiation_disabled: bool,
}

fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            www_root: ".".to_string(),
            port: 7878,
            worker_threads: num_cpus::get(),
            local: true,
            encoding: default_encoding(),
            negotiation_disabled: false,
        }
    }

    /// 从 TOML 文件加载配置。
    ///
    /// 文件无法读取时返回 `ConfigUnreadable`；内容无法解析时记录错误并使用默认配置。
    pub fn from_toml(filename: &str) -> Result<Self, Exception> {
        let mut file = File::open(filename)
            .map_err(|e| Exception::ConfigUnreadable(format!("{}: {}", filename, e)))?;
        let mut str_val = String::new();
        file.read_to_string(&mut str_val)
            .map_err(|e| Exception::ConfigUnreadable(format!("{}: {}", filename, e)))?;

        let mut raw_config: Config = match toml::from_str(&str_val) {
            Ok(t) => t,
            Err(e) => {
                error!("无法成功从配置文件构建配置对象，使用默认配置：{}", e);
                Config::new()
            }
        };
        if raw_config.worker_threads == 0 {
            raw_config.worker_threads = num_cpus::get();
        }
        if raw_config.encoding.trim().is_empty() {
            warn!("encoding被设置为空字符串，将改为{}", DEFAULT_ENCODING);
            raw_config.encoding = default_encoding();
        }
        if raw_config.negotiation_disabled {
            info!("配置文件禁用了内容协商，响应将按原样发送");
        }
        Ok(raw_config)
    }
}

impl Config {
    pub fn www_root(&self) -> &str {
        &self.www_root
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn local(&self) -> bool {
        self.local
    }

    /// 写入 `Content-Type` 的 charset 参数
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn set_encoding(&mut self, encoding: &str) {
        self.encoding = encoding.to_string();
    }

    /// 关闭内容协商。幂等且不可逆：本模块不提供重新开启的入口。
    pub fn disable(&mut self) {
        self.negotiation_disabled = true;
    }

    pub fn is_disabled(&self) -> bool {
        self.negotiation_disabled
    }
}
