use std::{io, path::PathBuf};

use thiserror::Error;
use time::macros::format_description;
use tracing::{level_filters::LevelFilter, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, time::UtcTime, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

use crate::config::{LogConfig, LogFormat};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log output path: {}", .0.display())]
    InvalidOutput(PathBuf),

    #[error("failed to prepare log output: {0}")]
    Io(#[from] io::Error),

    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// 初始化日志系统
///
/// `RUST_LOG` 存在时优先于 `LOG_LEVEL`。写入文件时返回的 guard
/// 必须一直持有到进程退出，否则缓冲中的日志会丢失
///
/// # 参数
/// - `debug`: 为 `true` 时每条日志附带源文件与行号
pub fn init_logging(config: &LogConfig, debug: bool) -> Result<Option<WorkerGuard>, LoggingError> {
    // -- 选择输出目标：文件（非阻塞写入）或标准输出
    let (writer, guard) = match &config.output {
        Some(path) => {
            let file_name = path
                .file_name()
                .ok_or_else(|| LoggingError::InvalidOutput(path.clone()))?;
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            std::fs::create_dir_all(dir)?;

            let file_appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(io::stdout), None),
    };

    build_subscriber(config, debug, writer).try_init()?;

    Ok(guard)
}

// -- 按配置组装过滤器与输出格式
fn build_subscriber(
    config: &LogConfig,
    debug: bool,
    writer: BoxMakeWriter,
) -> Box<dyn Subscriber + Send + Sync> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.level).into())
        .from_env_lossy();

    let timer = UtcTime::new(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    ));

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => Box::new(
            registry.with(
                fmt::layer()
                    .json()
                    .with_timer(timer)
                    .with_file(debug)
                    .with_line_number(debug)
                    .with_writer(writer),
            ),
        ),
        LogFormat::Text => Box::new(
            registry.with(
                fmt::layer()
                    .with_timer(timer)
                    .with_file(debug)
                    .with_line_number(debug)
                    .with_ansi(config.output.is_none())
                    .with_writer(writer),
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::Write,
        sync::{Arc, Mutex},
    };

    use serde_json::Value;
    use tracing::Level;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn first_json_line(debug: bool) -> Value {
        let config = LogConfig {
            level: Level::INFO,
            format: LogFormat::Json,
            output: None,
        };
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = build_subscriber(&config, debug, BoxMakeWriter::new(move || writer.clone()));

        tracing::subscriber::with_default(subscriber, || tracing::info!("service started"));

        let raw = captured.0.lock().unwrap().clone();
        let line = String::from_utf8(raw).unwrap();
        serde_json::from_str(line.lines().next().unwrap()).unwrap()
    }

    #[test]
    fn debug_adds_source_location() {
        let line = first_json_line(true);

        assert_eq!(line["fields"]["message"], "service started");
        assert!(line["filename"].as_str().unwrap().ends_with("logging.rs"));
        assert!(line["line_number"].is_u64());
    }

    #[test]
    fn non_debug_omits_source_location() {
        let line = first_json_line(false);

        assert_eq!(line["level"], "INFO");
        assert!(line.get("filename").is_none());
        assert!(line.get("line_number").is_none());
    }
}
