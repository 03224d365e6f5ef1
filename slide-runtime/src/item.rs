//! # Item 模块
//!
//! 轮播项与可播放能力的定义。
//!
//! ## 核心概念
//!
//! - [`Playable`]：每个被轮播的内容必须实现的能力接口，调度器只**轮询**这些状态
//! - [`Element`]：在 `Playable` 之上再暴露可变的视觉状态，供过渡效果驱动
//! - [`RotationItem`]：调度器持有的轮播描述（元素 + 时长 + 播放模式）
//!
//! ## 身份语义
//!
//! 轮播项以 [`ItemRef`]（`Rc<RotationItem>`）共享，比较使用 `Rc::ptr_eq`。
//! "首项哨兵"和"当前播放项"的判断依赖引用相等，而不是值相等。

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ItemError;
use crate::transition::TransitionType;

/// 可播放能力
///
/// 由外部内容实现，调度器在每个决策点轮询。
pub trait Playable {
    /// 开始/恢复内容执行
    fn play(&mut self);

    /// 停止内容执行
    ///
    /// 一次过渡中可能被调用两次：切换开始时由过渡处理器调用，
    /// 过渡收尾时再次调用。实现必须幂等，已停止时不做任何事。
    fn stop(&mut self);

    /// 内容是否已报告完成（仅 `play_until_done` 模式有意义）
    fn is_done(&self) -> bool;

    /// 清除完成标志，使内容可以在下一圈重新播放
    fn reset_done(&mut self);

    /// 内容尚未完成初始化
    fn is_not_ready(&self) -> bool;

    /// 内容初始化或播放失败
    fn is_error(&self) -> bool;
}

/// 2D 向量（像素）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 父容器尺寸
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// 条纹遮罩方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StripeOrientation {
    Horizontal,
    Vertical,
}

/// 条纹揭示遮罩（覆盖在新内容之上）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StripeMask {
    /// 条纹方向
    pub orientation: StripeOrientation,
    /// 条纹数量
    pub stripes: u32,
    /// 每条条纹已揭示的比例 (0.0 - 1.0)，按离散步进变化
    pub coverage: f32,
}

/// 元素的视觉状态
///
/// 过渡效果只通过这个结构修改元素外观，不假设具体渲染方式。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualState {
    /// 是否可见
    pub visible: bool,
    /// 不透明度 (0.0 - 1.0)
    pub opacity: f32,
    /// 相对原位置的偏移
    pub offset: Vec2,
    /// 缩放
    pub scale: f32,
    /// 叠放顺序，过渡期间新内容在上
    pub z_index: i32,
    /// 条纹遮罩（仅条纹过渡期间存在）
    pub mask: Option<StripeMask>,
}

impl VisualState {
    /// 中性状态：隐藏、无变换、无遮罩
    pub fn neutral() -> Self {
        Self {
            visible: false,
            opacity: 1.0,
            offset: Vec2::ZERO,
            scale: 1.0,
            z_index: 0,
            mask: None,
        }
    }

    /// 是否处于中性状态
    pub fn is_neutral(&self) -> bool {
        *self == Self::neutral()
    }
}

impl Default for VisualState {
    fn default() -> Self {
        Self::neutral()
    }
}

/// 可被轮播的元素
///
/// 在 [`Playable`] 能力之上暴露视觉状态表面和声明的过渡类型。
pub trait Element: Playable {
    /// 当前视觉状态
    fn visual(&self) -> &VisualState;

    /// 可变视觉状态
    fn visual_mut(&mut self) -> &mut VisualState;

    /// 父容器尺寸（滑动效果据此计算位移）
    fn parent_bounds(&self) -> Bounds;

    /// 元素声明的过渡类型（切入该元素时使用）
    fn transition_type(&self) -> TransitionType;
}

/// 共享的元素句柄
pub type ElementRef = Rc<RefCell<dyn Element>>;

/// 轮播项
///
/// 由播放列表的拥有者创建并追加到 `Schedule` 的列表中。
pub struct RotationItem {
    element: ElementRef,
    duration: Duration,
    play_until_done: bool,
}

/// 共享的轮播项句柄（按引用比较身份）
pub type ItemRef = Rc<RotationItem>;

impl RotationItem {
    /// 以秒为单位创建轮播项
    ///
    /// 时长必须为有限正数。
    pub fn new(
        element: ElementRef,
        duration_secs: f64,
        play_until_done: bool,
    ) -> Result<Self, ItemError> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(ItemError::InvalidDuration {
                seconds: duration_secs,
            });
        }
        let duration = Duration::try_from_secs_f64(duration_secs).map_err(|_| {
            ItemError::InvalidDuration {
                seconds: duration_secs,
            }
        })?;
        Self::with_duration(element, duration, play_until_done)
    }

    /// 以 `Duration` 创建轮播项
    pub fn with_duration(
        element: ElementRef,
        duration: Duration,
        play_until_done: bool,
    ) -> Result<Self, ItemError> {
        if duration.is_zero() {
            return Err(ItemError::InvalidDuration { seconds: 0.0 });
        }
        Ok(Self {
            element,
            duration,
            play_until_done,
        })
    }

    /// 包装为共享句柄
    pub fn into_ref(self) -> ItemRef {
        Rc::new(self)
    }

    pub fn element(&self) -> &ElementRef {
        &self.element
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn play_until_done(&self) -> bool {
        self.play_until_done
    }

    /// 元素声明的过渡类型
    pub fn transition_type(&self) -> TransitionType {
        self.element.borrow().transition_type()
    }
}

impl fmt::Debug for RotationItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotationItem")
            .field("duration", &self.duration)
            .field("play_until_done", &self.play_until_done)
            .field("transition_type", &self.transition_type())
            .finish()
    }
}
