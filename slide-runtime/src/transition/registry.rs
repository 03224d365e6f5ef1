//! # Transition Registry
//!
//! 过渡类型定义与默认参数。
//! 这是所有过渡名称、默认值的**唯一来源**。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// 过渡类型
///
/// 由切入元素声明，`TransitionHandler` 据此选择效果。
///
/// | 名称 | 类型 | 说明 |
/// |------|------|------|
/// | `normal` | `Normal` | 立即切换可见性 |
/// | `fade` | `Fade` | 不透明度交叉淡化 |
/// | `zoom` | `Zoom` | 新内容从 0 放大到 1 |
/// | `slideFromLeft` / `slideFromRight` | 水平滑入 | 新内容推开旧内容 |
/// | `slideFromTop` / `slideFromBottom` | 垂直滑入 | 同上 |
/// | `stripesHorizontal` / `stripesVertical` | 条纹揭示 | 离散步进的遮罩 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransitionType {
    #[default]
    Normal,
    Fade,
    Zoom,
    SlideFromLeft,
    SlideFromRight,
    SlideFromTop,
    SlideFromBottom,
    StripesHorizontal,
    StripesVertical,
}

impl TransitionType {
    /// 所有内置过渡类型
    pub const ALL: [TransitionType; 9] = [
        TransitionType::Normal,
        TransitionType::Fade,
        TransitionType::Zoom,
        TransitionType::SlideFromLeft,
        TransitionType::SlideFromRight,
        TransitionType::SlideFromTop,
        TransitionType::SlideFromBottom,
        TransitionType::StripesHorizontal,
        TransitionType::StripesVertical,
    ];

    /// 规范名称
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionType::Normal => "normal",
            TransitionType::Fade => "fade",
            TransitionType::Zoom => "zoom",
            TransitionType::SlideFromLeft => "slideFromLeft",
            TransitionType::SlideFromRight => "slideFromRight",
            TransitionType::SlideFromTop => "slideFromTop",
            TransitionType::SlideFromBottom => "slideFromBottom",
            TransitionType::StripesHorizontal => "stripesHorizontal",
            TransitionType::StripesVertical => "stripesVertical",
        }
    }

    /// 宽松解析
    ///
    /// 大小写、`-`、`_` 不敏感；未知名称降级为 `Normal`。
    pub fn resolve(name: &str) -> Self {
        match name.parse() {
            Ok(kind) => kind,
            Err(_) => {
                tracing::warn!(name = %name, "未知过渡效果名，降级为 normal");
                TransitionType::Normal
            }
        }
    }
}

impl FromStr for TransitionType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        TransitionType::ALL
            .into_iter()
            .find(|kind| kind.as_str().to_lowercase() == key)
            .ok_or_else(|| ParseError::UnknownTransition {
                name: s.to_string(),
            })
    }
}

impl fmt::Display for TransitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 各效果的默认参数
pub mod defaults {
    use std::time::Duration;

    /// 非 normal 效果的默认时长
    pub const EFFECT_DURATION: Duration = Duration::from_secs(1);
    /// 条纹揭示的离散步数
    pub const STRIPE_STEPS: u32 = 60;
    /// 条纹数量
    pub const STRIPE_COUNT: u32 = 10;
}
