//! # 重载配置构建器模块

use crate::config::core::ReloadConfig;
use crate::error::DynViewError;
use rat_logger::info;
use std::path::PathBuf;

/// 重载配置构建器
#[derive(Debug)]
pub struct ReloadConfigBuilder {
    definition_path: Option<PathBuf>,
    poll_interval_ms: Option<u64>,
    debounce_ms: Option<u64>,
}
impl ReloadConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            definition_path: None,
            poll_interval_ms: None,
            debounce_ms: None,
        }
    }

    /// 设置字段定义文件路径
    pub fn definition_path<P: Into<PathBuf>>(mut self, definition_path: P) -> Self {
        self.definition_path = Some(definition_path.into());
        self
    }

    /// 设置轮询间隔（毫秒）
    pub fn poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = Some(poll_interval_ms);
        self
    }

    /// 设置去抖延迟（毫秒）
    pub fn debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = Some(debounce_ms);
        self
    }

    /// 构建重载配置
    ///
    /// # 错误
    ///
    /// 如果任何必需的配置项未设置，将返回错误
    pub fn build(self) -> Result<ReloadConfig, DynViewError> {
        let definition_path = self
            .definition_path
            .ok_or_else(|| crate::dynview_error!(config, "字段定义文件路径必须设置"))?;

        let poll_interval_ms = self
            .poll_interval_ms
            .ok_or_else(|| crate::dynview_error!(config, "轮询间隔必须设置"))?;

        let debounce_ms = self
            .debounce_ms
            .ok_or_else(|| crate::dynview_error!(config, "去抖延迟必须设置"))?;

        if poll_interval_ms == 0 {
            return Err(crate::dynview_error!(config, "轮询间隔不能为零"));
        }

        info!(
            "创建重载配置: 文件={:?}, 轮询={}ms, 去抖={}ms",
            definition_path, poll_interval_ms, debounce_ms
        );

        Ok(ReloadConfig {
            definition_path,
            poll_interval_ms,
            debounce_ms,
        })
    }
}
impl Default for ReloadConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
