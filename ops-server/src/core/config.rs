/// 服务器配置 - 运营后端的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | WEBHOOK_URL | (unset) | 配送平台 Webhook 地址 |
/// | WEBHOOK_TIMEOUT_SECS | 5 | Webhook 请求超时(秒) |
/// | SINK_TIMEOUT_MS | 2000 | 通知分发单通道超时(毫秒) |
/// | DEFAULT_PREP_MINUTES | 20 | 默认备餐时长估计(分钟) |
/// | REALTIME_CAPACITY | 1024 | 实时广播通道容量 |
/// | LOG_DIR | (unset) | 日志文件目录 |
///
/// # 示例
///
/// ```ignore
/// HTTP_PORT=8080 WEBHOOK_URL=https://partner.example/hooks cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 配送平台 Webhook 地址 (未配置时跳过投递)
    pub webhook_url: Option<String>,
    /// Webhook 请求超时 (秒)
    pub webhook_timeout_secs: u64,
    /// 通知分发单通道超时 (毫秒)
    pub sink_timeout_ms: u64,
    /// 进入 PREPARING 时的默认备餐估计 (分钟)
    pub default_prep_minutes: u32,
    /// 实时广播通道容量
    pub realtime_capacity: usize,
    /// 日志文件目录 (可选)
    pub log_dir: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            webhook_url: std::env::var("WEBHOOK_URL").ok().filter(|u| !u.is_empty()),
            webhook_timeout_secs: std::env::var("WEBHOOK_TIMEOUT_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5),
            sink_timeout_ms: std::env::var("SINK_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(2000),
            default_prep_minutes: std::env::var("DEFAULT_PREP_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(20),
            realtime_capacity: std::env::var("REALTIME_CAPACITY")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1024),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(http_port: u16, webhook_url: Option<String>) -> Self {
        let mut config = Self::from_env();
        config.http_port = http_port;
        config.webhook_url = webhook_url;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let config = Config::with_overrides(8088, Some("https://partner.test/hook".into()));
        assert_eq!(config.http_port, 8088);
        assert_eq!(
            config.webhook_url.as_deref(),
            Some("https://partner.test/hook")
        );
    }
}
