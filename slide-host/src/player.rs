//! # Player 模块
//!
//! 播放列表播放器：把清单转换为播放项，交给 [`Schedule`] 轮播，
//! 并把调度结果翻译成宿主事件。
//!
//! ```text
//! Manifest ──load()──► PlaylistItem × N ──► Schedule
//!                                             │ update(dt)
//! PresentationEvent ──handle()──► start/stop  ▼
//!                                      Vec<PlayerEvent>
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use slide_runtime::{
    Bounds, ElementRef, ItemRef, PlaylistItem, RotationItem, Schedule, SlideResult,
};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::content::SimulatedContent;
use crate::manifest::Manifest;

/// 来自外部的演示控制事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationEvent {
    Play,
    Stop,
}

/// 播放器发出的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// 当前播放项变化
    SlideChanged { tag: String },
    /// 播放列表完成一轮（仅在清单配置了 `play-until-done` 时发出）
    Done,
}

struct Entry {
    element: Rc<RefCell<PlaylistItem>>,
    item: ItemRef,
}

/// 播放列表播放器
pub struct Player {
    schedule: Schedule,
    entries: Vec<Entry>,
    bounds: Bounds,
    play_until_done: bool,
    /// 自上次 `update` 以来收到的完成通知次数
    pending_done: Rc<Cell<usize>>,
    last_playing: Option<ItemRef>,
}

impl Player {
    pub fn new(config: &AppConfig) -> Self {
        let mut schedule = Schedule::new().with_timing(config.schedule_timing());
        let pending_done = Rc::new(Cell::new(0));
        let counter = pending_done.clone();
        schedule.set_done_listener(move || counter.set(counter.get() + 1));

        Self {
            schedule,
            entries: Vec::new(),
            bounds: config.display_bounds(),
            play_until_done: false,
            pending_done,
            last_playing: None,
        }
    }

    /// 加载清单并重新开始轮播
    ///
    /// 所有播放项构建成功后才停止当前轮播；出错时原播放列表继续运行。
    pub fn load(&mut self, manifest: &Manifest) -> SlideResult<()> {
        let mut entries = Vec::new();
        for resolved in manifest.valid_items() {
            let content = SimulatedContent::from_attributes(&resolved.tag, &resolved.attributes);
            let element = Rc::new(RefCell::new(
                PlaylistItem::new(&resolved.tag, Box::new(content), self.bounds)
                    .with_transition(resolved.transition_type)
                    .with_play_until_done(resolved.play_until_done),
            ));
            let element_ref: ElementRef = element.clone();
            let item = RotationItem::new(
                element_ref,
                resolved.duration_secs,
                resolved.play_until_done,
            )?
            .into_ref();
            entries.push(Entry { element, item });
        }

        info!(
            items = entries.len(),
            play_until_done = manifest.play_until_done,
            "播放列表已加载"
        );

        self.schedule.stop();
        self.schedule
            .set_items(entries.iter().map(|entry| entry.item.clone()).collect());
        self.entries = entries;
        self.play_until_done = manifest.play_until_done;
        self.last_playing = None;
        self.pending_done.set(0);

        self.schedule.start();
        Ok(())
    }

    /// 处理演示控制事件
    pub fn handle(&mut self, event: PresentationEvent) {
        debug!(?event, "演示事件");
        self.last_playing = None;
        match event {
            PresentationEvent::Play => self.schedule.start(),
            PresentationEvent::Stop => self.schedule.stop(),
        }
    }

    /// 推进内容与调度
    pub fn update(&mut self, dt: Duration) -> Vec<PlayerEvent> {
        for entry in &self.entries {
            entry.element.borrow_mut().update(dt);
        }
        self.schedule.update(dt);

        let mut events = Vec::new();

        let playing = self.schedule.playing_item().cloned();
        let changed = match (&playing, &self.last_playing) {
            (Some(now), Some(before)) => !Rc::ptr_eq(now, before),
            (Some(_), None) => true,
            _ => false,
        };
        if changed {
            if let Some(tag) = playing.as_ref().and_then(|item| self.tag_of(item)) {
                events.push(PlayerEvent::SlideChanged { tag });
            }
        }
        self.last_playing = playing;

        if self.pending_done.replace(0) > 0 {
            if self.play_until_done {
                events.push(PlayerEvent::Done);
            } else {
                info!("播放列表完成一轮（未配置 play-until-done，不向外报告）");
            }
        }

        events
    }

    /// 当前播放项的标签
    pub fn playing_tag(&self) -> Option<String> {
        self.schedule
            .playing_item()
            .and_then(|item| self.tag_of(item))
    }

    /// 所有播放项的标签（轮播顺序）
    pub fn tags(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.element.borrow().tag().to_string())
            .collect()
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    fn tag_of(&self, item: &ItemRef) -> Option<String> {
        self.entries
            .iter()
            .find(|entry| Rc::ptr_eq(&entry.item, item))
            .map(|entry| entry.element.borrow().tag().to_string())
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("items", &self.entries.len())
            .field("play_until_done", &self.play_until_done)
            .field("schedule", &self.schedule)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slide_runtime::Element;

    fn manifest(json: &str) -> Manifest {
        Manifest::parse(json).unwrap()
    }

    #[test]
    fn test_load_starts_rotation() {
        let mut player = Player::new(&AppConfig::default());
        player
            .load(&manifest(
                r#"{ "items": [
                    { "duration": 2, "element": { "tagName": "a" } },
                    { "duration": 2, "element": { "tagName": "b" } }
                ] }"#,
            ))
            .unwrap();

        assert_eq!(player.tags(), vec!["a", "b"]);
        assert_eq!(player.playing_tag().as_deref(), Some("a"));

        let events = player.update(Duration::ZERO);
        assert_eq!(
            events,
            vec![PlayerEvent::SlideChanged {
                tag: "a".to_string()
            }]
        );
    }

    #[test]
    fn test_done_only_reported_with_play_until_done() {
        let json = |flag: bool| {
            format!(
                r#"{{ "play-until-done": {flag}, "items": [
                    {{ "duration": 1, "element": {{ "tagName": "a" }} }}
                ] }}"#
            )
        };

        for flag in [true, false] {
            let mut player = Player::new(&AppConfig::default());
            player.load(&manifest(&json(flag))).unwrap();

            let mut saw_done = false;
            for _ in 0..3 {
                saw_done |= player
                    .update(Duration::from_secs(1))
                    .contains(&PlayerEvent::Done);
            }
            assert_eq!(saw_done, flag);
        }
    }

    #[test]
    fn test_stop_hides_everything() {
        let mut player = Player::new(&AppConfig::default());
        player
            .load(&manifest(
                r#"{ "items": [ { "duration": 2, "element": { "tagName": "a" } } ] }"#,
            ))
            .unwrap();

        player.handle(PresentationEvent::Stop);
        assert!(player.playing_tag().is_none());
        assert!(player.entries.iter().all(|entry| {
            let element = entry.element.borrow();
            !element.is_playing() && !element.visual().visible
        }));

        player.handle(PresentationEvent::Play);
        assert_eq!(player.playing_tag().as_deref(), Some("a"));
    }
}
