//! # Content 模块
//!
//! 模拟内容：根据元素属性模拟加载、失败和"播放完成"，
//! 让宿主在没有渲染器的情况下驱动完整的轮播流程。
//!
//! | 属性 | 含义 |
//! |------|------|
//! | `ready-after` | 创建后多少秒才就绪 |
//! | `fail` | `"true"` 表示永久失败 |
//! | `done-after` | 每次开始播放后多少秒报告完成 |

use std::collections::BTreeMap;
use std::time::Duration;

use slide_runtime::{Content, ContentEvent, ContentSignal, ContentStatus};
use tracing::{debug, warn};

/// 模拟内容
#[derive(Debug, Clone, Default)]
pub struct SimulatedContent {
    tag: String,
    ready_after: Duration,
    failed: bool,
    done_after: Option<Duration>,
    /// 自创建以来的时间
    age: Duration,
    playing: bool,
    /// 本次播放已进行的时间
    played: Duration,
    reported: bool,
}

impl SimulatedContent {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// 从元素属性创建
    pub fn from_attributes(tag: impl Into<String>, attributes: &BTreeMap<String, String>) -> Self {
        let mut content = Self::new(tag);

        if let Some(secs) = seconds_attribute(&content.tag, attributes, "ready-after") {
            content.ready_after = secs;
        }
        content.done_after = seconds_attribute(&content.tag, attributes, "done-after");
        content.failed = attributes
            .get("fail")
            .is_some_and(|value| value.eq_ignore_ascii_case("true"));

        content
    }

    /// 设置就绪延迟
    pub fn with_ready_after(mut self, delay: Duration) -> Self {
        self.ready_after = delay;
        self
    }

    /// 设置播放多久后报告完成
    pub fn with_done_after(mut self, delay: Duration) -> Self {
        self.done_after = Some(delay);
        self
    }

    /// 标记为失败
    pub fn failing(mut self) -> Self {
        self.failed = true;
        self
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl Content for SimulatedContent {
    fn handle_event(&mut self, event: ContentEvent) {
        debug!(tag = %self.tag, ?event, "内容收到事件");
        match event {
            ContentEvent::Play => {
                self.playing = true;
                self.played = Duration::ZERO;
                self.reported = false;
            }
            ContentEvent::Stop => {
                self.playing = false;
            }
        }
    }

    fn status(&self) -> ContentStatus {
        if self.failed {
            ContentStatus::Failed
        } else if self.age < self.ready_after {
            ContentStatus::Loading
        } else {
            ContentStatus::Ready
        }
    }

    fn update(&mut self, dt: Duration) -> Option<ContentSignal> {
        self.age += dt;
        if !self.playing {
            return None;
        }

        self.played += dt;
        match self.done_after {
            Some(limit) if !self.reported && self.played >= limit => {
                self.reported = true;
                debug!(tag = %self.tag, "内容播放完成");
                Some(ContentSignal::ReportDone)
            }
            _ => None,
        }
    }
}

fn seconds_attribute(
    tag: &str,
    attributes: &BTreeMap<String, String>,
    name: &str,
) -> Option<Duration> {
    let raw = attributes.get(name)?;
    let parsed = raw.trim().parse::<f64>().ok();
    match parsed.map(Duration::try_from_secs_f64) {
        Some(Ok(duration)) => Some(duration),
        _ => {
            warn!(tag = %tag, attribute = name, value = %raw, "无效的秒数属性，已忽略");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_ready_after() {
        let mut content = SimulatedContent::from_attributes("img", &attrs(&[("ready-after", "2")]));
        assert_eq!(content.status(), ContentStatus::Loading);

        content.update(Duration::from_secs(1));
        assert_eq!(content.status(), ContentStatus::Loading);

        content.update(Duration::from_secs(1));
        assert_eq!(content.status(), ContentStatus::Ready);
    }

    #[test]
    fn test_fail_attribute() {
        let content = SimulatedContent::from_attributes("img", &attrs(&[("fail", "TRUE")]));
        assert_eq!(content.status(), ContentStatus::Failed);

        let content = SimulatedContent::from_attributes("img", &attrs(&[("fail", "no")]));
        assert_eq!(content.status(), ContentStatus::Ready);
    }

    #[test]
    fn test_done_after_restarts_on_play() {
        let mut content =
            SimulatedContent::from_attributes("video", &attrs(&[("done-after", "2")]));

        assert_eq!(content.update(Duration::from_secs(5)), None);

        content.handle_event(ContentEvent::Play);
        assert_eq!(content.update(Duration::from_secs(1)), None);
        assert_eq!(
            content.update(Duration::from_secs(1)),
            Some(ContentSignal::ReportDone)
        );
        assert_eq!(content.update(Duration::from_secs(1)), None);

        content.handle_event(ContentEvent::Stop);
        content.handle_event(ContentEvent::Play);
        assert_eq!(content.update(Duration::from_secs(1)), None);
        assert_eq!(
            content.update(Duration::from_secs(1)),
            Some(ContentSignal::ReportDone)
        );
    }

    #[test]
    fn test_invalid_attribute_ignored() {
        let content =
            SimulatedContent::from_attributes("img", &attrs(&[("ready-after", "soon")]));
        assert_eq!(content.status(), ContentStatus::Ready);
    }

    #[test]
    fn test_unrepresentable_seconds_ignored() {
        let content = SimulatedContent::from_attributes(
            "img",
            &attrs(&[("ready-after", "1e30"), ("done-after", "-1")]),
        );
        assert_eq!(content.status(), ContentStatus::Ready);
        assert_eq!(content.done_after, None);

        let content =
            SimulatedContent::from_attributes("img", &attrs(&[("ready-after", "inf")]));
        assert_eq!(content.status(), ContentStatus::Ready);
    }
}
