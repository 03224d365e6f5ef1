//! # Effects 模块
//!
//! 各过渡效果的具体实现。
//!
//! 每个效果分三步：
//!
//! ```text
//! begin(from, to)            -> 过渡开始：标记新内容播放中，设置动画起点
//! frame(from, to, progress)  -> 每帧：按进度修改视觉状态
//! finish(from, to)           -> 时长结束：复位旧内容、停止旧内容播放
//! ```
//!
//! `from` 为 `None` 表示本次会话的第一项，效果不能假设旧内容存在。
//! `finish` 可能在 `Schedule::stop()` 之后才触发，必须对已复位的元素幂等。
//! `frame` 从不修改 `visible`，因此被强制复位的元素不会被重新显示。

use std::time::Duration;

use crate::item::{Element, StripeMask, StripeOrientation, Vec2, VisualState};

use super::easing::EasingFunction;
use super::registry::defaults;

/// 过渡效果接口
pub trait TransitionEffect {
    /// 效果总时长；为零时 `begin` 之后立即 `finish`
    fn duration(&self) -> Duration;

    /// 过渡开始
    fn begin(&self, from: Option<&mut dyn Element>, to: &mut dyn Element);

    /// 按进度 (0.0 - 1.0) 更新视觉状态
    fn frame(&self, _from: Option<&mut dyn Element>, _to: &mut dyn Element, _progress: f32) {}

    /// 过渡结束清理
    fn finish(&self, from: Option<&mut dyn Element>, to: &mut dyn Element);
}

/// 把元素复位为隐藏的中性视觉状态
pub fn reset_to_neutral(element: &mut dyn Element) {
    *element.visual_mut() = VisualState::neutral();
}

/// 标记新内容正在播放：可见并置于上层
fn mark_playing(to: &mut dyn Element) {
    let visual = to.visual_mut();
    visual.visible = true;
    visual.z_index = 1;
}

/// 让旧内容在过渡期间保持可见
fn keep_visible(from: Option<&mut dyn Element>) {
    if let Some(from) = from {
        from.visual_mut().visible = true;
    }
}

/// 公共收尾：新内容回到普通层级，旧内容复位并停止
fn settle(from: Option<&mut dyn Element>, to: &mut dyn Element) {
    to.visual_mut().z_index = 0;
    if let Some(from) = from {
        reset_to_neutral(from);
        from.stop();
    }
}

/// 立即切换（normal）
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantSwap;

impl TransitionEffect for InstantSwap {
    fn duration(&self) -> Duration {
        Duration::ZERO
    }

    fn begin(&self, from: Option<&mut dyn Element>, to: &mut dyn Element) {
        mark_playing(to);
        if let Some(from) = from {
            from.visual_mut().visible = false;
        }
    }

    fn finish(&self, from: Option<&mut dyn Element>, to: &mut dyn Element) {
        settle(from, to);
    }
}

/// 交叉淡化
#[derive(Debug, Clone, Copy)]
pub struct Fade {
    duration: Duration,
}

impl Fade {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl TransitionEffect for Fade {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn begin(&self, from: Option<&mut dyn Element>, to: &mut dyn Element) {
        mark_playing(to);
        to.visual_mut().opacity = 0.0;
        keep_visible(from);
    }

    fn frame(&self, from: Option<&mut dyn Element>, to: &mut dyn Element, progress: f32) {
        let eased = EasingFunction::EaseInOut.apply(progress);
        to.visual_mut().opacity = eased;
        if let Some(from) = from {
            from.visual_mut().opacity = 1.0 - eased;
        }
    }

    fn finish(&self, from: Option<&mut dyn Element>, to: &mut dyn Element) {
        to.visual_mut().opacity = 1.0;
        settle(from, to);
    }
}

/// 放大进入
#[derive(Debug, Clone, Copy)]
pub struct Zoom {
    duration: Duration,
}

impl Zoom {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl TransitionEffect for Zoom {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn begin(&self, from: Option<&mut dyn Element>, to: &mut dyn Element) {
        mark_playing(to);
        to.visual_mut().scale = 0.0;
        keep_visible(from);
    }

    fn frame(&self, _from: Option<&mut dyn Element>, to: &mut dyn Element, progress: f32) {
        to.visual_mut().scale = EasingFunction::EaseOut.apply(progress);
    }

    fn finish(&self, from: Option<&mut dyn Element>, to: &mut dyn Element) {
        to.visual_mut().scale = 1.0;
        settle(from, to);
    }
}

/// 滑动轴
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn extent(&self, element: &dyn Element) -> f32 {
        let bounds = element.parent_bounds();
        match self {
            Axis::Horizontal => bounds.width,
            Axis::Vertical => bounds.height,
        }
    }

    fn offset(&self, distance: f32) -> Vec2 {
        match self {
            Axis::Horizontal => Vec2::new(distance, 0.0),
            Axis::Vertical => Vec2::new(0.0, distance),
        }
    }
}

/// 方向滑动
///
/// 新内容从 `sign * 父容器尺寸` 处滑到原位，旧内容向反方向滑出。
/// 左/右、上/下两对只在轴和符号上不同。
#[derive(Debug, Clone, Copy)]
pub struct DirectionalSlide {
    axis: Axis,
    sign: f32,
    duration: Duration,
}

impl DirectionalSlide {
    pub fn new(axis: Axis, sign: f32, duration: Duration) -> Self {
        Self {
            axis,
            sign: sign.signum(),
            duration,
        }
    }

    /// 从左侧滑入
    pub fn from_left(duration: Duration) -> Self {
        Self::new(Axis::Horizontal, -1.0, duration)
    }

    /// 从右侧滑入
    pub fn from_right(duration: Duration) -> Self {
        Self::new(Axis::Horizontal, 1.0, duration)
    }

    /// 从顶部滑入
    pub fn from_top(duration: Duration) -> Self {
        Self::new(Axis::Vertical, -1.0, duration)
    }

    /// 从底部滑入
    pub fn from_bottom(duration: Duration) -> Self {
        Self::new(Axis::Vertical, 1.0, duration)
    }
}

impl TransitionEffect for DirectionalSlide {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn begin(&self, from: Option<&mut dyn Element>, to: &mut dyn Element) {
        mark_playing(to);
        let extent = self.axis.extent(to);
        to.visual_mut().offset = self.axis.offset(self.sign * extent);
        if let Some(from) = from {
            let visual = from.visual_mut();
            visual.visible = true;
            visual.offset = Vec2::ZERO;
        }
    }

    fn frame(&self, from: Option<&mut dyn Element>, to: &mut dyn Element, progress: f32) {
        let eased = EasingFunction::EaseInOutQuad.apply(progress);

        let extent = self.axis.extent(to);
        to.visual_mut().offset = self.axis.offset(self.sign * extent * (1.0 - eased));

        if let Some(from) = from {
            let extent = self.axis.extent(from);
            from.visual_mut().offset = self.axis.offset(-self.sign * extent * eased);
        }
    }

    fn finish(&self, from: Option<&mut dyn Element>, to: &mut dyn Element) {
        to.visual_mut().offset = Vec2::ZERO;
        settle(from, to);
    }
}

/// 条纹揭示
///
/// 在新内容上覆盖条纹遮罩，按离散步数逐步揭开，结束时移除遮罩。
#[derive(Debug, Clone, Copy)]
pub struct StripeReveal {
    orientation: StripeOrientation,
    stripes: u32,
    steps: u32,
    /// 条纹匀速揭开
    easing: EasingFunction,
    duration: Duration,
}

impl StripeReveal {
    pub fn new(orientation: StripeOrientation, duration: Duration) -> Self {
        Self {
            orientation,
            stripes: defaults::STRIPE_COUNT,
            steps: defaults::STRIPE_STEPS,
            easing: EasingFunction::Linear,
            duration,
        }
    }

    /// 进度量化为离散步进
    pub fn quantize(&self, progress: f32) -> f32 {
        let steps = self.steps.max(1);
        let step = ((progress.clamp(0.0, 1.0) * steps as f32).floor() as u32).min(steps);
        step as f32 / steps as f32
    }
}

impl TransitionEffect for StripeReveal {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn begin(&self, from: Option<&mut dyn Element>, to: &mut dyn Element) {
        mark_playing(to);
        to.visual_mut().mask = Some(StripeMask {
            orientation: self.orientation,
            stripes: self.stripes,
            coverage: 0.0,
        });
        keep_visible(from);
    }

    fn frame(&self, _from: Option<&mut dyn Element>, to: &mut dyn Element, progress: f32) {
        let coverage = self.quantize(self.easing.apply(progress));
        if let Some(mask) = to.visual_mut().mask.as_mut() {
            mask.coverage = coverage;
        }
    }

    fn finish(&self, from: Option<&mut dyn Element>, to: &mut dyn Element) {
        to.visual_mut().mask = None;
        settle(from, to);
    }
}
