//! # Slide Host
//!
//! 幻灯片轮播的宿主层实现。
//!
//! ## 架构说明
//!
//! Host 层负责：
//! - 配置加载与校验
//! - 播放列表清单解析
//! - 内容模拟（就绪、失败、播放完成）
//! - 以固定帧间隔驱动 `slide-runtime` 的调度器
//!
//! Host 层不包含调度逻辑，只负责把清单转换成播放项并转发时间与事件。

pub mod config;
pub mod content;
pub mod manifest;
pub mod player;

pub use config::{AppConfig, ConfigError, DebugConfig, DisplayConfig, SimulationConfig, TimingConfig};
pub use content::SimulatedContent;
pub use manifest::{ElementSpec, Manifest, ManifestError, ManifestItem, ResolvedItem};
pub use player::{Player, PlayerEvent, PresentationEvent};
