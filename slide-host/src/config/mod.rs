//! # Config 模块
//!
//! 宿主配置管理，集中管理所有配置项。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use slide_runtime::{Bounds, MIN_DECISION_INTERVAL, ScheduleTiming};
use thiserror::Error;
use tracing::{info, warn};

/// 宿主配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 播放列表路径
    #[serde(default = "default_playlist_path")]
    pub playlist_path: PathBuf,

    /// 调度计时
    #[serde(default)]
    pub timing: TimingConfig,

    /// 显示区域
    #[serde(default)]
    pub display: DisplayConfig,

    /// 模拟运行
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// 调试配置
    #[serde(default)]
    pub debug: DebugConfig,
}

/// 调度计时配置（秒）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// 未就绪/出错/等待完成时的重试间隔
    #[serde(default = "default_retry_interval")]
    pub retry_interval_secs: f64,

    /// 空播放列表的宽限期
    #[serde(default = "default_empty_grace")]
    pub empty_grace_secs: f64,

    /// 整个播放列表都未就绪时的超时
    #[serde(default = "default_readiness_timeout")]
    pub readiness_timeout_secs: f64,
}

/// 显示区域配置（作为每个播放项的父容器尺寸）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_display_width")]
    pub width: u32,

    #[serde(default = "default_display_height")]
    pub height: u32,
}

/// 模拟运行配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 帧间隔（毫秒）
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,

    /// 运行总时长（秒）
    #[serde(default = "default_run_secs")]
    pub run_secs: u64,

    /// 是否按真实时间休眠
    #[serde(default)]
    pub realtime: bool,
}

/// 调试配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// 日志级别（trace/debug/info/warn/error）
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// 默认值函数
fn default_playlist_path() -> PathBuf {
    PathBuf::from("playlist.json")
}

fn default_retry_interval() -> f64 {
    1.0
}

fn default_empty_grace() -> f64 {
    1.0
}

fn default_readiness_timeout() -> f64 {
    30.0
}

fn default_display_width() -> u32 {
    1920
}

fn default_display_height() -> u32 {
    1080
}

fn default_frame_interval() -> u64 {
    100
}

fn default_run_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            playlist_path: default_playlist_path(),
            timing: TimingConfig::default(),
            display: DisplayConfig::default(),
            simulation: SimulationConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            retry_interval_secs: default_retry_interval(),
            empty_grace_secs: default_empty_grace(),
            readiness_timeout_secs: default_readiness_timeout(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_display_width(),
            height: default_display_height(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval(),
            run_secs: default_run_secs(),
            realtime: false,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl AppConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并打印警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = ?path, "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = ?path, "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timings = [
            ("retry_interval_secs", self.timing.retry_interval_secs),
            ("empty_grace_secs", self.timing.empty_grace_secs),
            ("readiness_timeout_secs", self.timing.readiness_timeout_secs),
        ];
        for (field, value) in timings {
            match Duration::try_from_secs_f64(value) {
                Ok(duration) if duration >= MIN_DECISION_INTERVAL => {}
                _ => return Err(ConfigError::InvalidTiming { field, value }),
            }
        }

        if self.display.width == 0 || self.display.height == 0 {
            return Err(ConfigError::InvalidDisplay {
                width: self.display.width,
                height: self.display.height,
            });
        }

        if self.simulation.frame_interval_ms == 0 {
            return Err(ConfigError::InvalidFrameInterval);
        }

        if !LOG_LEVELS.contains(&self.debug.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::UnknownLogLevel(self.debug.log_level.clone()));
        }

        Ok(())
    }

    /// 转换为调度计时参数
    ///
    /// 无法表示的值回退为默认值；越界检查由 [`AppConfig::validate`] 负责。
    pub fn schedule_timing(&self) -> ScheduleTiming {
        let fallback = ScheduleTiming::default();
        ScheduleTiming {
            retry_interval: timing_duration(
                self.timing.retry_interval_secs,
                fallback.retry_interval,
            ),
            empty_grace: timing_duration(self.timing.empty_grace_secs, fallback.empty_grace),
            readiness_timeout: timing_duration(
                self.timing.readiness_timeout_secs,
                fallback.readiness_timeout,
            ),
        }
    }

    /// 播放项的父容器尺寸
    pub fn display_bounds(&self) -> Bounds {
        Bounds::new(self.display.width as f32, self.display.height as f32)
    }

    /// 帧间隔
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.simulation.frame_interval_ms)
    }

    /// 日志级别
    pub fn log_level(&self) -> tracing::Level {
        match self.debug.log_level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }
}

fn timing_duration(secs: f64, fallback: Duration) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(fallback)
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 计时参数必须可表示且不小于 1 毫秒
    #[error("配置验证失败: {field} 必须在 0.001 秒以上且可表示（当前为 {value}）")]
    InvalidTiming { field: &'static str, value: f64 },

    /// 显示区域不能为零
    #[error("配置验证失败: 显示区域 {width}x{height} 无效")]
    InvalidDisplay { width: u32, height: u32 },

    /// 帧间隔不能为零
    #[error("配置验证失败: frame_interval_ms 必须大于 0")]
    InvalidFrameInterval,

    /// 未知日志级别
    #[error("配置验证失败: 未知日志级别 '{0}'")]
    UnknownLogLevel(String),
}
