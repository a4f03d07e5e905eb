//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:3000"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// JWT 签名密钥（使用 Secret 包装，防止日志泄露）
    pub jwt_secret: Secret<String>,
    /// JWT 签发者标识（iss）
    pub jwt_issuer: String,
    /// 令牌有效期（秒）
    pub token_ttl_secs: u64,
    /// 免认证路径，支持以 `*` 结尾的前缀匹配
    pub public_paths: Vec<String>,
    /// 首次登录自动建档时分配的默认角色
    pub default_role: String,
    /// Argon2 内存开销（KiB）
    pub hash_memory_kib: u32,
    /// Argon2 迭代次数
    pub hash_iterations: u32,
    /// Argon2 并行度
    pub hash_parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    /// 启动时创建的管理员用户名
    pub admin_username: String,
    /// 管理员密码，未配置时不创建管理员
    #[serde(default)]
    pub admin_password: Option<Secret<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub bootstrap: BootstrapConfig,
}

/// 默认免认证路径：登录、注册、API 文档与健康检查
pub fn default_public_paths() -> Vec<String> {
    [
        "/auth/login",
        "/api/users/register",
        "/v3/api-docs*",
        "/swagger-ui*",
        "/health",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("server.addr", "0.0.0.0:3000")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("security.jwt_secret", "change-this-secret-in-production-min-32-chars!")?
            .set_default("security.jwt_issuer", "blog-service")?
            .set_default("security.token_ttl_secs", 1800)?
            .set_default("security.public_paths", default_public_paths())?
            .set_default("security.default_role", "USER")?
            .set_default("security.hash_memory_kib", 65536)?
            .set_default("security.hash_iterations", 3)?
            .set_default("security.hash_parallelism", 4)?
            .set_default("bootstrap.admin_username", "admin")?;

        // 从环境变量加载配置（前缀为 BLOG_）
        settings = settings.add_source(
            Environment::with_prefix("BLOG")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("security.public_paths")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        // 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 验证端口范围
        if let Some(port_str) = self.server.addr.split(':').next_back() {
            if let Ok(port) = port_str.parse::<u16>() {
                if port != 0 && port < 1024 {
                    return Err(ConfigError::Message("Server port should be >= 1024".to_string()));
                }
            }
        }

        // 验证日志级别
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        // 验证日志格式
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        // 验证 JWT 密钥长度（至少 32 字符）
        if self.security.jwt_secret.expose_secret().len() < 32 {
            return Err(ConfigError::Message(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        if self.security.jwt_issuer.trim().is_empty() {
            return Err(ConfigError::Message("JWT issuer must not be empty".to_string()));
        }

        // 验证令牌过期时间
        if self.security.token_ttl_secs < 60 || self.security.token_ttl_secs > 86400 {
            return Err(ConfigError::Message(
                "token_ttl_secs must be between 60 and 86400 (1 minute to 24 hours)".to_string(),
            ));
        }

        if !crate::auth::jwt::is_encodable_authority(&self.security.default_role) {
            return Err(ConfigError::Message(
                "default_role must be non-empty, without ',' or surrounding whitespace"
                    .to_string(),
            ));
        }

        // 验证哈希参数（Argon2 要求内存至少为 8 * 并行度 KiB）
        if self.security.hash_iterations < 1
            || self.security.hash_parallelism < 1
            || self.security.hash_memory_kib < 8 * self.security.hash_parallelism
        {
            return Err(ConfigError::Message(
                "Invalid Argon2 parameters (memory must be >= 8 * parallelism KiB)".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "BLOG_SERVER__ADDR",
            "BLOG_LOGGING__LEVEL",
            "BLOG_LOGGING__FORMAT",
            "BLOG_SECURITY__JWT_SECRET",
            "BLOG_SECURITY__JWT_ISSUER",
            "BLOG_SECURITY__PUBLIC_PATHS",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.server.addr, "0.0.0.0:3000");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.security.jwt_issuer, "blog-service");
        assert_eq!(config.security.token_ttl_secs, 1800);
        assert_eq!(config.security.default_role, "USER");
        assert!(config
            .security
            .public_paths
            .contains(&"/auth/login".to_string()));
        assert!(config.bootstrap.admin_password.is_none());
    }

    #[test]
    #[serial]
    fn test_public_paths_from_env_list() {
        clear_env();
        std::env::set_var("BLOG_SECURITY__PUBLIC_PATHS", "/auth/login,/docs*");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(
            config.security.public_paths,
            vec!["/auth/login".to_string(), "/docs*".to_string()]
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_validation_invalid_port() {
        clear_env();
        std::env::set_var("BLOG_SERVER__ADDR", "0.0.0.0:80");

        let result = AppConfig::from_env();
        assert!(result.is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_validation_short_secret() {
        clear_env();
        std::env::set_var("BLOG_SECURITY__JWT_SECRET", "short");

        let result = AppConfig::from_env();
        assert!(result.is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_validation_invalid_log_level() {
        clear_env();
        std::env::set_var("BLOG_LOGGING__LEVEL", "invalid");

        let result = AppConfig::from_env();
        assert!(result.is_err());

        clear_env();
    }
}
