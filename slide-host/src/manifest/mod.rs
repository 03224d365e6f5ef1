//! # Manifest 模块
//!
//! 播放列表清单：描述要轮播的内容及其播放参数。
//!
//! ## 格式
//!
//! ```text
//! {
//!   "play-until-done": true,
//!   "items": [
//!     {
//!       "duration": 5,
//!       "play-until-done": false,
//!       "transition-type": "slideFromLeft",
//!       "element": { "tagName": "image-slide", "attributes": { "ready-after": "2" } }
//!     }
//!   ]
//! }
//! ```
//!
//! 清单是宽容的：缺少 `element.tagName` 的项被丢弃，非法时长降级为 10 秒，
//! 未知过渡名降级为 `normal`，都只打印警告。

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use slide_runtime::TransitionType;
use thiserror::Error;
use tracing::warn;

/// 缺省或非法时长时使用的播放时长（秒）
pub const DEFAULT_DURATION_SECS: f64 = 10.0;

/// 播放列表清单
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// 一圈结束时是否向外报告完成
    #[serde(rename = "play-until-done", default)]
    pub play_until_done: bool,

    #[serde(default)]
    pub items: Vec<ManifestItem>,
}

/// 清单中的一项（原始形式）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestItem {
    /// 播放时长，允许数字或数字字符串
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Value>,

    #[serde(rename = "play-until-done", default)]
    pub play_until_done: bool,

    #[serde(
        rename = "transition-type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub transition_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementSpec>,
}

/// 内容元素描述
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    #[serde(rename = "tagName", default)]
    pub tag_name: String,

    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

/// 解析后的播放项
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedItem {
    pub tag: String,
    /// 属性值统一转换为字符串
    pub attributes: BTreeMap<String, String>,
    pub duration_secs: f64,
    pub play_until_done: bool,
    pub transition_type: TransitionType,
}

impl Manifest {
    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// 从 JSON 文本解析
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(content)?)
    }

    /// 过滤并解析有效项
    pub fn valid_items(&self) -> Vec<ResolvedItem> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let resolved = item.resolve();
                if resolved.is_none() {
                    warn!(index, "播放项缺少 element.tagName，已丢弃");
                }
                resolved
            })
            .collect()
    }
}

impl ManifestItem {
    /// 解析为播放项；没有有效元素时返回 `None`
    pub fn resolve(&self) -> Option<ResolvedItem> {
        let element = self.element.as_ref()?;
        if element.tag_name.trim().is_empty() {
            return None;
        }

        let attributes = element
            .attributes
            .iter()
            .map(|(key, value)| (key.clone(), attribute_string(value)))
            .collect();

        let transition_type = self
            .transition_type
            .as_deref()
            .map(TransitionType::resolve)
            .unwrap_or_default();

        Some(ResolvedItem {
            tag: element.tag_name.clone(),
            attributes,
            duration_secs: self.duration_secs(),
            play_until_done: self.play_until_done,
            transition_type,
        })
    }

    /// 播放时长；缺省、非数字或无法表示为非零 `Duration` 时为 [`DEFAULT_DURATION_SECS`]
    pub fn duration_secs(&self) -> f64 {
        let parsed = match &self.duration {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        match parsed {
            Some(secs) if representable(secs) => secs,
            Some(secs) => {
                warn!(duration = secs, "无效的播放时长，使用默认值");
                DEFAULT_DURATION_SECS
            }
            None => {
                if let Some(raw) = &self.duration {
                    warn!(duration = %raw, "无效的播放时长，使用默认值");
                }
                DEFAULT_DURATION_SECS
            }
        }
    }
}

/// 能转换为非零 `Duration`（不会舍入为 0，也不会溢出）
fn representable(secs: f64) -> bool {
    Duration::try_from_secs_f64(secs).is_ok_and(|duration| !duration.is_zero())
}

fn attribute_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 清单错误
#[derive(Debug, Error)]
pub enum ManifestError {
    /// 读取文件失败
    #[error("无法读取播放列表 {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON 格式错误
    #[error("播放列表解析失败: {0}")]
    Json(#[from] serde_json::Error),
}
