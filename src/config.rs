use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::Level;

const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_SWAGGER_UI: &str = "/swagger";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" => Ok(LogFormat::Text),
            _ => Err(()),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Json => f.write_str("json"),
            LogFormat::Text => f.write_str("text"),
        }
    }
}

// -- 应用运行模式相关配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub mode: String,
    pub debug: bool,
    /// OpenAPI 文档路由前缀，为空时不注册
    pub swagger_ui: String,
}

// -- HTTP 服务配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// 请求体两次读取之间的最长等待
    pub read_timeout: Duration,
    /// 单个请求的处理时限
    pub write_timeout: Duration,
}

// -- 日志配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    /// 日志文件路径，`None` 表示输出到标准输出
    pub output: Option<PathBuf>,
}

// -- OpenAPI 配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenApiConfig {
    /// 为空时使用可执行文件所在目录下的 `openapi.yaml`
    pub spec_path: String,
    pub api_prefix: String,
}

// -- 数据库配置
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub ssl_mode: String,
    pub max_connections: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("name", &self.name)
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

// -- 应用配置结构体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub app: AppConfig,
    pub http: HttpConfig,
    pub log: LogConfig,
    pub openapi: OpenApiConfig,
    pub database: DatabaseConfig,
}

impl Config {
    // -- 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 通过任意键值来源构建配置，随后按 `APP_MODE` 覆盖部分字段
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        // -- 空字符串视为未设置
        let parsed = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let app = AppConfig {
            mode: string("APP_MODE", "prod"),
            debug: parse_bool("APP_DEBUG", parsed("APP_DEBUG", "false"))?,
            swagger_ui: string("APP_SWAGGER_UI", DEFAULT_SWAGGER_UI),
        };

        let http = HttpConfig {
            host: string("HTTP_HOST", "0.0.0.0"),
            port: parse("HTTP_PORT", parsed("HTTP_PORT", "8080"))?,
            read_timeout: seconds("HTTP_READ_TIMEOUT", parsed("HTTP_READ_TIMEOUT", "5"))?,
            write_timeout: seconds("HTTP_WRITE_TIMEOUT", parsed("HTTP_WRITE_TIMEOUT", "10"))?,
        };

        let log = LogConfig {
            level: parse("LOG_LEVEL", parsed("LOG_LEVEL", "info"))?,
            format: parse("LOG_FORMAT", parsed("LOG_FORMAT", "json"))?,
            output: lookup("LOG_OUTPUT")
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
        };

        let openapi = OpenApiConfig {
            spec_path: string("OPENAPI_SPEC_PATH", "openapi/openapi.yaml"),
            api_prefix: string("OPENAPI_API_PREFIX", "/api/v1"),
        };

        let database = DatabaseConfig {
            host: string("DB_HOST", "localhost"),
            port: parse("DB_PORT", parsed("DB_PORT", "5432"))?,
            user: string("DB_USER", "postgres"),
            password: string("DB_PASSWORD", "postgres"),
            name: string("DB_NAME", "users"),
            ssl_mode: string("DB_SSL_MODE", "disable"),
            max_connections: parse("DB_MAX_CONNECTIONS", parsed("DB_MAX_CONNECTIONS", "10"))?,
        };

        let mut config = Self {
            app,
            http,
            log,
            openapi,
            database,
        };
        config.apply_mode();

        Ok(config)
    }

    // -- 根据运行模式覆盖配置
    fn apply_mode(&mut self) {
        match self.app.mode.as_str() {
            "dev" => {
                self.app.debug = true;
                self.log.level = Level::DEBUG;
                self.log.format = LogFormat::Json;
                self.app.swagger_ui = DEFAULT_SWAGGER_UI.to_string();
                self.database.ssl_mode = "disable".to_string();
                self.http.port = DEFAULT_HTTP_PORT;
            }
            "test" => {
                self.app.debug = true;
                self.log.level = Level::DEBUG;
                self.log.format = LogFormat::Text;
                self.app.swagger_ui = String::new();
                self.database.ssl_mode = "disable".to_string();
                self.http.port = DEFAULT_HTTP_PORT;
            }
            "prod" => {
                self.app.debug = false;
                self.log.level = Level::INFO;
                self.log.format = LogFormat::Json;
                self.app.swagger_ui = String::new();
                self.database.ssl_mode = "require".to_string();
                self.http.port = DEFAULT_HTTP_PORT;
            }
            _ => {}
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HTTP: {}:{}, Log: {} ({}), OpenAPI: {}, DB: {}:{}",
            self.http.host,
            self.http.port,
            self.log.level,
            self.log.format,
            self.openapi.spec_path,
            self.database.host,
            self.database.port,
        )
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value }),
    }
}

fn seconds(key: &'static str, value: String) -> Result<Duration, ConfigError> {
    parse::<u64>(key, value).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_use_prod_mode() {
        let config = load(&[]).unwrap();

        assert_eq!(config.app.mode, "prod");
        assert!(!config.app.debug);
        assert_eq!(config.app.swagger_ui, "");
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.read_timeout, Duration::from_secs(5));
        assert_eq!(config.http.write_timeout, Duration::from_secs(10));
        assert_eq!(config.log.level, Level::INFO);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.output, None);
        assert_eq!(config.openapi.spec_path, "openapi/openapi.yaml");
        assert_eq!(config.openapi.api_prefix, "/api/v1");
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.name, "users");
        assert_eq!(config.database.ssl_mode, "require");
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn dev_mode_enables_debug_and_swagger() {
        let config = load(&[("APP_MODE", "dev"), ("HTTP_PORT", "9000")]).unwrap();

        assert!(config.app.debug);
        assert_eq!(config.log.level, Level::DEBUG);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.app.swagger_ui, "/swagger");
        assert_eq!(config.database.ssl_mode, "disable");
        assert_eq!(config.http.port, 8080);
    }

    #[test]
    fn test_mode_uses_text_logs() {
        let config = load(&[("APP_MODE", "test"), ("LOG_FORMAT", "json")]).unwrap();

        assert_eq!(config.log.format, LogFormat::Text);
        assert_eq!(config.app.swagger_ui, "");
        assert_eq!(config.database.ssl_mode, "disable");
    }

    #[test]
    fn unknown_mode_keeps_explicit_values() {
        let config = load(&[
            ("APP_MODE", "staging"),
            ("HTTP_PORT", "9000"),
            ("LOG_LEVEL", "warn"),
            ("LOG_FORMAT", "text"),
            ("LOG_OUTPUT", "/tmp/users.log"),
            ("APP_SWAGGER_UI", "/docs"),
            ("DB_SSL_MODE", "prefer"),
            ("DB_MAX_CONNECTIONS", "25"),
        ])
        .unwrap();

        assert_eq!(config.http.port, 9000);
        assert_eq!(config.log.level, Level::WARN);
        assert_eq!(config.log.format, LogFormat::Text);
        assert_eq!(config.log.output, Some(PathBuf::from("/tmp/users.log")));
        assert_eq!(config.app.swagger_ui, "/docs");
        assert_eq!(config.database.ssl_mode, "prefer");
        assert_eq!(config.database.max_connections, 25);
    }

    #[test]
    fn empty_numeric_value_falls_back_to_default() {
        let config = load(&[("APP_MODE", "staging"), ("HTTP_PORT", "")]).unwrap();
        assert_eq!(config.http.port, 8080);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = load(&[("HTTP_PORT", "eighty")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "HTTP_PORT", .. }
        ));
    }

    #[test]
    fn invalid_log_format_is_rejected() {
        let err = load(&[("LOG_FORMAT", "xml")]).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for LOG_FORMAT: \"xml\"");
    }

    #[test]
    fn display_omits_credentials() {
        let config = load(&[("DB_PASSWORD", "hunter2")]).unwrap();
        let summary = config.to_string();

        assert_eq!(
            summary,
            "HTTP: 0.0.0.0:8080, Log: INFO (json), OpenAPI: openapi/openapi.yaml, DB: localhost:5432"
        );
        assert!(!format!("{:?}", config.database).contains("hunter2"));
    }
}
