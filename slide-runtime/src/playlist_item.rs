//! # PlaylistItem 模块
//!
//! [`Element`] 的标准实现：包装一个具体内容（[`Content`]），
//! 负责把播放/停止转发给内容，并维护"播放直到完成"的完成标志。
//!
//! ## 完成标志
//!
//! 只有配置了 `play_until_done` 且当前正在播放时，内容的完成报告才会生效；
//! 停止状态下收到的完成报告直接丢弃。

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::item::{Bounds, Element, Playable, VisualState};
use crate::transition::TransitionType;

/// 转发给内容的生命周期事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentEvent {
    Play,
    Stop,
}

/// 内容状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContentStatus {
    /// 仍在初始化
    Loading,
    /// 可以播放
    #[default]
    Ready,
    /// 初始化或播放失败
    Failed,
}

/// 内容向所属播放项发出的信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSignal {
    /// 内容已播放完成
    ReportDone,
}

/// 具体内容接口（图片、视频、网页……）
pub trait Content {
    /// 接收生命周期事件
    fn handle_event(&mut self, event: ContentEvent);

    /// 当前状态
    fn status(&self) -> ContentStatus;

    /// 推进内容内部时间，可返回一个信号
    fn update(&mut self, _dt: Duration) -> Option<ContentSignal> {
        None
    }
}

/// 播放列表项
pub struct PlaylistItem {
    /// 内容标签（用于日志）
    tag: String,
    content: Box<dyn Content>,
    visual: VisualState,
    bounds: Bounds,
    transition_type: TransitionType,
    play_until_done: bool,
    is_playing: bool,
    done: bool,
}

impl PlaylistItem {
    /// 创建播放列表项，初始为隐藏的中性状态
    pub fn new(tag: impl Into<String>, content: Box<dyn Content>, bounds: Bounds) -> Self {
        Self {
            tag: tag.into(),
            content,
            visual: VisualState::neutral(),
            bounds,
            transition_type: TransitionType::Normal,
            play_until_done: false,
            is_playing: false,
            done: false,
        }
    }

    /// 设置切入时使用的过渡类型
    pub fn with_transition(mut self, transition_type: TransitionType) -> Self {
        self.transition_type = transition_type;
        self
    }

    /// 设置是否等待内容报告完成
    pub fn with_play_until_done(mut self, play_until_done: bool) -> Self {
        self.play_until_done = play_until_done;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn play_until_done(&self) -> bool {
        self.play_until_done
    }

    /// 内容报告完成
    pub fn report_done(&mut self) {
        if self.play_until_done && self.is_playing {
            debug!(tag = %self.tag, "内容报告完成");
            self.done = true;
        }
    }

    /// 推进内容时间，并处理内容发出的信号
    pub fn update(&mut self, dt: Duration) {
        if let Some(ContentSignal::ReportDone) = self.content.update(dt) {
            self.report_done();
        }
    }
}

impl Playable for PlaylistItem {
    fn play(&mut self) {
        if self.is_playing {
            return;
        }
        self.content.handle_event(ContentEvent::Play);
        self.is_playing = true;
    }

    fn stop(&mut self) {
        if !self.is_playing {
            return;
        }
        self.content.handle_event(ContentEvent::Stop);
        self.is_playing = false;
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn reset_done(&mut self) {
        self.done = false;
    }

    fn is_not_ready(&self) -> bool {
        self.content.status() == ContentStatus::Loading
    }

    fn is_error(&self) -> bool {
        self.content.status() == ContentStatus::Failed
    }
}

impl Element for PlaylistItem {
    fn visual(&self) -> &VisualState {
        &self.visual
    }

    fn visual_mut(&mut self) -> &mut VisualState {
        &mut self.visual
    }

    fn parent_bounds(&self) -> Bounds {
        self.bounds
    }

    fn transition_type(&self) -> TransitionType {
        self.transition_type
    }
}

impl std::fmt::Debug for PlaylistItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaylistItem")
            .field("tag", &self.tag)
            .field("transition_type", &self.transition_type)
            .field("play_until_done", &self.play_until_done)
            .field("is_playing", &self.is_playing)
            .field("done", &self.done)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        events: Rc<RefCell<Vec<ContentEvent>>>,
        status: ContentStatus,
        done_after_update: bool,
    }

    impl Content for Recorder {
        fn handle_event(&mut self, event: ContentEvent) {
            self.events.borrow_mut().push(event);
        }

        fn status(&self) -> ContentStatus {
            self.status
        }

        fn update(&mut self, _dt: Duration) -> Option<ContentSignal> {
            self.done_after_update.then_some(ContentSignal::ReportDone)
        }
    }

    fn item_with(recorder: Recorder) -> PlaylistItem {
        PlaylistItem::new("test", Box::new(recorder), Bounds::new(1920.0, 1080.0))
    }

    #[test]
    fn test_play_stop_forwarded_once() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut item = item_with(Recorder {
            events: events.clone(),
            ..Default::default()
        });

        item.play();
        item.play();
        assert!(item.is_playing());
        item.stop();
        item.stop();
        assert!(!item.is_playing());

        assert_eq!(*events.borrow(), vec![ContentEvent::Play, ContentEvent::Stop]);
    }

    #[test]
    fn test_stop_without_play_is_silent() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut item = item_with(Recorder {
            events: events.clone(),
            ..Default::default()
        });

        item.stop();
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_done_only_while_playing() {
        let mut item = item_with(Recorder::default()).with_play_until_done(true);

        // 未播放时的完成报告被丢弃
        item.report_done();
        assert!(!item.is_done());

        item.play();
        item.report_done();
        assert!(item.is_done());

        item.reset_done();
        assert!(!item.is_done());
    }

    #[test]
    fn test_done_ignored_without_play_until_done() {
        let mut item = item_with(Recorder::default());
        item.play();
        item.report_done();
        assert!(!item.is_done());
    }

    #[test]
    fn test_content_signal_routed() {
        let mut item = item_with(Recorder {
            done_after_update: true,
            ..Default::default()
        })
        .with_play_until_done(true);

        item.play();
        item.update(Duration::from_millis(16));
        assert!(item.is_done());
    }

    #[test]
    fn test_status_mapping() {
        let loading = item_with(Recorder {
            status: ContentStatus::Loading,
            ..Default::default()
        });
        assert!(loading.is_not_ready());
        assert!(!loading.is_error());

        let failed = item_with(Recorder {
            status: ContentStatus::Failed,
            ..Default::default()
        });
        assert!(failed.is_error());
        assert!(!failed.is_not_ready());
    }

    #[test]
    fn test_builder_and_initial_visual() {
        let item = item_with(Recorder::default()).with_transition(TransitionType::Zoom);
        assert_eq!(item.transition_type(), TransitionType::Zoom);
        assert_eq!(item.tag(), "test");
        assert!(item.visual().is_neutral());
        assert_eq!(item.parent_bounds(), Bounds::new(1920.0, 1080.0));
    }
}
