//! # Transition 模块
//!
//! 过渡处理器：按**切入元素**声明的过渡类型选择效果并驱动其时间轴。
//!
//! ## 核心组件
//!
//! - [`TransitionType`]：过渡类型枚举（名称与默认值的唯一来源见 [`registry`]）
//! - [`TransitionEffect`]：效果接口，每种视觉风格一个实现
//! - [`TransitionHandler`]：效果注册表 + 进行中的过渡列表
//!
//! ## 执行流程
//!
//! ```text
//! transition(from, to)
//!   → 快进所有进行中的过渡（保证打断安全）
//!   → from.stop() / 复位 from / to.play()
//!   → effect.begin()
//!   → update(dt) 每帧 effect.frame(progress)
//!   → 时长结束 effect.finish()
//! ```
//!
//! 过渡动画与调度器的轮播计时是两条独立的时间线，
//! 效果通过自身的时长管理开始/结束副作用，不依赖调度器的 tick。

mod easing;
mod effects;
pub mod registry;

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use crate::item::{Element, ElementRef, StripeOrientation};

pub use easing::EasingFunction;
pub use effects::{
    Axis, DirectionalSlide, Fade, InstantSwap, StripeReveal, TransitionEffect, Zoom,
    reset_to_neutral,
};
pub use registry::{TransitionType, defaults};

/// 注册表缺失某类型时使用的效果
static FALLBACK: InstantSwap = InstantSwap;

/// 进行中的过渡
struct ActiveTransition {
    kind: TransitionType,
    from: Option<ElementRef>,
    to: ElementRef,
    elapsed: Duration,
    duration: Duration,
}

impl ActiveTransition {
    fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            1.0
        } else {
            (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        }
    }
}

/// 过渡处理器
pub struct TransitionHandler {
    effects: HashMap<TransitionType, Box<dyn TransitionEffect>>,
    active: Vec<ActiveTransition>,
}

impl TransitionHandler {
    /// 创建带全部内置效果的处理器
    pub fn new() -> Self {
        Self::with_effect_duration(defaults::EFFECT_DURATION)
    }

    /// 创建内置效果，非 normal 效果统一使用给定时长
    pub fn with_effect_duration(duration: Duration) -> Self {
        let mut handler = Self {
            effects: HashMap::new(),
            active: Vec::new(),
        };

        handler.register(TransitionType::Normal, Box::new(InstantSwap));
        handler.register(TransitionType::Fade, Box::new(Fade::new(duration)));
        handler.register(TransitionType::Zoom, Box::new(Zoom::new(duration)));
        handler.register(
            TransitionType::SlideFromLeft,
            Box::new(DirectionalSlide::from_left(duration)),
        );
        handler.register(
            TransitionType::SlideFromRight,
            Box::new(DirectionalSlide::from_right(duration)),
        );
        handler.register(
            TransitionType::SlideFromTop,
            Box::new(DirectionalSlide::from_top(duration)),
        );
        handler.register(
            TransitionType::SlideFromBottom,
            Box::new(DirectionalSlide::from_bottom(duration)),
        );
        handler.register(
            TransitionType::StripesHorizontal,
            Box::new(StripeReveal::new(StripeOrientation::Horizontal, duration)),
        );
        handler.register(
            TransitionType::StripesVertical,
            Box::new(StripeReveal::new(StripeOrientation::Vertical, duration)),
        );

        handler
    }

    /// 注册（或替换）某过渡类型的效果
    pub fn register(&mut self, kind: TransitionType, effect: Box<dyn TransitionEffect>) {
        self.effects.insert(kind, effect);
    }

    /// 从 `from` 切换到 `to`
    ///
    /// `from` 为 `None`（会话第一项）或与 `to` 是同一元素时，不触碰旧内容。
    pub fn transition(&mut self, from: Option<&ElementRef>, to: &ElementRef) {
        self.skip();

        let from = from.filter(|from| !Rc::ptr_eq(*from, to));
        if let Some(from) = from {
            let mut from = from.borrow_mut();
            from.stop();
            reset_to_neutral(&mut *from);
        }
        to.borrow_mut().play();

        let kind = to.borrow().transition_type();
        let effect = lookup(&self.effects, kind);
        let duration = effect.duration();
        debug!(transition = %kind, ?duration, first = from.is_none(), "开始过渡");

        with_pair(from, to, |from, to| effect.begin(from, to));
        if duration.is_zero() {
            with_pair(from, to, |from, to| effect.finish(from, to));
            return;
        }

        self.active.push(ActiveTransition {
            kind,
            from: from.cloned(),
            to: to.clone(),
            elapsed: Duration::ZERO,
            duration,
        });
    }

    /// 强制把元素恢复为中性视觉状态，不管是否有动画在进行
    pub fn reset(&self, element: &ElementRef) {
        reset_to_neutral(&mut *element.borrow_mut());
    }

    /// 推进所有进行中的过渡
    pub fn update(&mut self, dt: Duration) {
        let effects = &self.effects;
        self.active.retain_mut(|active| {
            active.elapsed = (active.elapsed + dt).min(active.duration);
            let effect = lookup(effects, active.kind);
            let progress = active.progress();

            with_pair(active.from.as_ref(), &active.to, |from, to| {
                effect.frame(from, to, progress)
            });

            if active.elapsed >= active.duration {
                with_pair(active.from.as_ref(), &active.to, |from, to| {
                    effect.finish(from, to)
                });
                debug!(transition = %active.kind, "过渡完成");
                false
            } else {
                true
            }
        });
    }

    /// 把所有进行中的过渡快进到结束状态
    pub fn skip(&mut self) {
        for active in self.active.drain(..) {
            let effect = lookup(&self.effects, active.kind);
            with_pair(active.from.as_ref(), &active.to, |from, to| {
                effect.frame(from, to, 1.0);
            });
            with_pair(active.from.as_ref(), &active.to, |from, to| {
                effect.finish(from, to)
            });
            debug!(transition = %active.kind, "过渡被快进");
        }
    }

    /// 是否有过渡正在进行
    pub fn is_active(&self) -> bool {
        !self.active.is_empty()
    }
}

impl Default for TransitionHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TransitionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionHandler")
            .field("registered", &self.effects.len())
            .field("active", &self.active.len())
            .finish()
    }
}

fn lookup(
    effects: &HashMap<TransitionType, Box<dyn TransitionEffect>>,
    kind: TransitionType,
) -> &dyn TransitionEffect {
    effects
        .get(&kind)
        .map(|effect| effect.as_ref())
        .unwrap_or(&FALLBACK)
}

/// 同时可变借用新旧元素
fn with_pair<R>(
    from: Option<&ElementRef>,
    to: &ElementRef,
    f: impl FnOnce(Option<&mut dyn Element>, &mut dyn Element) -> R,
) -> R {
    let mut to_guard = to.borrow_mut();
    match from {
        Some(from) if !Rc::ptr_eq(from, to) => {
            let mut from_guard = from.borrow_mut();
            let from_ref: &mut dyn Element = &mut *from_guard;
            f(Some(from_ref), &mut *to_guard)
        }
        _ => f(None, &mut *to_guard),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Bounds, Playable, VisualState, Vec2};
    use std::cell::RefCell;

    struct Dummy {
        visual: VisualState,
        transition_type: TransitionType,
        playing: bool,
        plays: u32,
        stops: u32,
    }

    impl Dummy {
        fn new(transition_type: TransitionType) -> Rc<RefCell<Dummy>> {
            Rc::new(RefCell::new(Dummy {
                visual: VisualState::neutral(),
                transition_type,
                playing: false,
                plays: 0,
                stops: 0,
            }))
        }
    }

    impl Playable for Dummy {
        fn play(&mut self) {
            self.playing = true;
            self.plays += 1;
        }
        fn stop(&mut self) {
            self.playing = false;
            self.stops += 1;
        }
        fn is_done(&self) -> bool {
            false
        }
        fn reset_done(&mut self) {}
        fn is_not_ready(&self) -> bool {
            false
        }
        fn is_error(&self) -> bool {
            false
        }
    }

    impl Element for Dummy {
        fn visual(&self) -> &VisualState {
            &self.visual
        }
        fn visual_mut(&mut self) -> &mut VisualState {
            &mut self.visual
        }
        fn parent_bounds(&self) -> Bounds {
            Bounds::new(1920.0, 1080.0)
        }
        fn transition_type(&self) -> TransitionType {
            self.transition_type
        }
    }

    fn as_element(dummy: &Rc<RefCell<Dummy>>) -> ElementRef {
        dummy.clone()
    }

    const HALF: Duration = Duration::from_millis(500);

    #[test]
    fn test_first_transition_without_from() {
        let mut handler = TransitionHandler::new();
        let a = Dummy::new(TransitionType::Fade);

        handler.transition(None, &as_element(&a));
        assert!(handler.is_active());
        assert!(a.borrow().playing);
        assert!(a.borrow().visual.visible);
        assert_eq!(a.borrow().visual.opacity, 0.0);

        handler.update(HALF);
        handler.update(HALF);
        assert!(!handler.is_active());
        assert_eq!(a.borrow().visual.opacity, 1.0);
        assert_eq!(a.borrow().stops, 0);
    }

    #[test]
    fn test_normal_transition_completes_immediately() {
        let mut handler = TransitionHandler::new();
        let a = Dummy::new(TransitionType::Normal);
        let b = Dummy::new(TransitionType::Normal);

        handler.transition(None, &as_element(&a));
        handler.transition(Some(&as_element(&a)), &as_element(&b));

        assert!(!handler.is_active());
        assert!(b.borrow().visual.visible);
        assert!(!a.borrow().playing);
        assert!(a.borrow().visual.is_neutral());
    }

    #[test]
    fn test_effect_selected_by_incoming_style() {
        let mut handler = TransitionHandler::new();
        let a = Dummy::new(TransitionType::Zoom);
        let b = Dummy::new(TransitionType::SlideFromLeft);

        handler.transition(None, &as_element(&a));
        handler.skip();
        handler.transition(Some(&as_element(&a)), &as_element(&b));

        // 使用 b 声明的滑动效果，而不是 a 的缩放效果
        assert_eq!(b.borrow().visual.offset, Vec2::new(-1920.0, 0.0));
        assert_eq!(b.borrow().visual.scale, 1.0);
    }

    #[test]
    fn test_outgoing_cleared_after_duration() {
        let mut handler = TransitionHandler::new();
        let a = Dummy::new(TransitionType::Normal);
        let b = Dummy::new(TransitionType::Fade);

        handler.transition(None, &as_element(&a));
        handler.transition(Some(&as_element(&a)), &as_element(&b));

        // 过渡期间旧内容仍可见
        handler.update(HALF);
        assert!(a.borrow().visual.visible);
        assert!(a.borrow().visual.opacity < 1.0);

        handler.update(HALF);
        assert!(a.borrow().visual.is_neutral());
        assert!(!a.borrow().playing);
    }

    #[test]
    fn test_new_transition_fast_forwards_previous() {
        let mut handler = TransitionHandler::new();
        let a = Dummy::new(TransitionType::Normal);
        let b = Dummy::new(TransitionType::Fade);
        let c = Dummy::new(TransitionType::Fade);

        handler.transition(None, &as_element(&a));
        handler.transition(Some(&as_element(&a)), &as_element(&b));
        handler.update(Duration::from_millis(100));

        // b 的淡入尚未结束就切到 c：a 必须立刻收尾，b 的不透明度恢复
        handler.transition(Some(&as_element(&b)), &as_element(&c));
        assert!(a.borrow().visual.is_neutral());
        assert_eq!(b.borrow().visual.opacity, 1.0);
        assert!(!b.borrow().playing);
        assert!(c.borrow().playing);

        handler.update(Duration::from_secs(1));
        assert!(!handler.is_active());
        assert!(b.borrow().visual.is_neutral());
    }

    #[test]
    fn test_reset_during_animation() {
        let mut handler = TransitionHandler::new();
        let a = Dummy::new(TransitionType::Normal);
        let b = Dummy::new(TransitionType::StripesHorizontal);

        handler.transition(None, &as_element(&a));
        handler.transition(Some(&as_element(&a)), &as_element(&b));
        handler.update(HALF);

        handler.reset(&as_element(&a));
        handler.reset(&as_element(&b));
        assert!(b.borrow().visual.is_neutral());

        // 残留的收尾仍会执行，但不会重新显示元素
        handler.update(Duration::from_secs(2));
        assert!(a.borrow().visual.is_neutral());
        assert!(b.borrow().visual.is_neutral());
    }

    #[test]
    fn test_same_element_is_not_treated_as_outgoing() {
        let mut handler = TransitionHandler::new();
        let a = Dummy::new(TransitionType::Fade);

        handler.transition(Some(&as_element(&a)), &as_element(&a));
        handler.skip();

        assert_eq!(a.borrow().stops, 0);
        assert!(a.borrow().visual.visible);
    }

    #[test]
    fn test_custom_effect_registration() {
        struct Marker;

        impl TransitionEffect for Marker {
            fn duration(&self) -> Duration {
                Duration::ZERO
            }
            fn begin(&self, _from: Option<&mut dyn Element>, to: &mut dyn Element) {
                to.visual_mut().z_index = 42;
                to.visual_mut().visible = true;
            }
            fn finish(&self, _from: Option<&mut dyn Element>, _to: &mut dyn Element) {}
        }

        let mut handler = TransitionHandler::new();
        handler.register(TransitionType::Zoom, Box::new(Marker));
        let a = Dummy::new(TransitionType::Zoom);

        handler.transition(None, &as_element(&a));
        assert_eq!(a.borrow().visual.z_index, 42);
    }

    #[test]
    fn test_outgoing_stop_is_repeated_by_cleanup() {
        let mut handler = TransitionHandler::new();
        let a = Dummy::new(TransitionType::Normal);
        let b = Dummy::new(TransitionType::Fade);

        handler.transition(None, &as_element(&a));
        handler.transition(Some(&as_element(&a)), &as_element(&b));
        assert_eq!(a.borrow().stops, 1);

        // 收尾时再次停止旧内容，Playable::stop 需可重复调用
        handler.update(Duration::from_secs(1));
        assert_eq!(a.borrow().stops, 2);
        assert!(!a.borrow().playing);
    }

    #[test]
    fn test_playlist_item_receives_single_stop() {
        use crate::playlist_item::{Content, ContentEvent, ContentStatus, PlaylistItem};

        struct Recorder(Rc<RefCell<Vec<ContentEvent>>>);

        impl Content for Recorder {
            fn handle_event(&mut self, event: ContentEvent) {
                self.0.borrow_mut().push(event);
            }
            fn status(&self) -> ContentStatus {
                ContentStatus::Ready
            }
        }

        let events = Rc::new(RefCell::new(Vec::new()));
        let bounds = Bounds::new(1920.0, 1080.0);
        let a: ElementRef = Rc::new(RefCell::new(PlaylistItem::new(
            "a",
            Box::new(Recorder(events.clone())),
            bounds,
        )));
        let b: ElementRef = Rc::new(RefCell::new(
            PlaylistItem::new("b", Box::new(Recorder(Rc::default())), bounds)
                .with_transition(TransitionType::StripesVertical),
        ));

        let mut handler = TransitionHandler::new();
        handler.transition(None, &a);
        handler.transition(Some(&a), &b);
        handler.update(Duration::from_secs(2));

        assert!(!handler.is_active());
        assert_eq!(*events.borrow(), vec![ContentEvent::Play, ContentEvent::Stop]);
    }
}
