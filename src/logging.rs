//! 日志初始化
//!
//! 库本身从不初始化日志，由调用者（例如服务二进制）按配置调用

use crate::config::{LogLevel, LoggingConfig};
use crate::error::DynViewResult;
use rat_logger::{LevelFilter, LoggerBuilder, handler::term::TermConfig};

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// 按配置初始化终端日志
///
/// `console` 关闭时什么也不做
pub fn init_logging(config: &LoggingConfig) -> DynViewResult<()> {
    if !config.console {
        return Ok(());
    }

    LoggerBuilder::new()
        .with_level(LevelFilter::from(config.level))
        .add_terminal_with_config(TermConfig::default())
        .init()
        .map_err(|e| crate::dynview_error!(config, format!("日志初始化失败: {}", e)))?;

    Ok(())
}
