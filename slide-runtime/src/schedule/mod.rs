//! # Schedule 模块
//!
//! 轮播调度状态机。
//!
//! ## 执行模型
//!
//! ```text
//! start() -> reset() -> play()
//!                         │
//!       ┌─────────────────┘
//!       ▼
//!   play() 决策 ──► 调度下一个决策点（唯一的挂起定时器）
//!       ▲                    │
//!       └── update(dt) 到期 ◄┘
//! ```
//!
//! 宿主通过 [`Schedule::update`] 推进虚拟时钟，Schedule 不需要知道真实时间。
//! 单线程、协作式：所有状态变化只发生在 `start()`/`stop()` 内部，
//! 或由唯一的挂起定时器触发的 `play()` 中。
//!
//! ## 决策顺序（每次 `play()`）
//!
//! 1. 轮播缓冲为空 → 宽限期后发出完成通知
//! 2. 所有项都出错 → 1 秒后发出完成通知
//! 3. 所有项都未就绪且超过就绪超时 → 立即发出完成通知
//! 4. 当前项为"播放直到完成"且未完成 → 1 秒后重试，不前进
//! 5. 弹出队首并放回队尾；若回到首项且本轮已有播放项 → 发出完成通知（继续轮播）
//! 6. 新选项未就绪或出错 → 1 秒后重试，不切换
//! 7. 否则设为当前项，必要时执行过渡，按时长调度下一次决策

use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::item::{ElementRef, ItemRef};
use crate::timer::{Timer, TimerAction};
use crate::transition::TransitionHandler;


/// 决策点之间的最小间隔
///
/// 任何调度延迟都不会短于此值，保证 `update(dt)` 在有限步内返回。
pub const MIN_DECISION_INTERVAL: Duration = Duration::from_millis(1);

/// 调度计时参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTiming {
    /// 未就绪/出错/等待完成时的重试间隔
    pub retry_interval: Duration,
    /// 空播放列表发出完成通知前的宽限期
    pub empty_grace: Duration,
    /// 整个播放列表都未就绪时的超时
    pub readiness_timeout: Duration,
}

impl Default for ScheduleTiming {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_secs(1),
            empty_grace: Duration::from_secs(1),
            readiness_timeout: Duration::from_secs(30),
        }
    }
}

/// 完成通知回调
pub type DoneListener = Box<dyn FnMut()>;

/// 轮播调度器
pub struct Schedule {
    /// 过渡处理器
    transition_handler: TransitionHandler,
    /// 计时参数
    timing: ScheduleTiming,
    /// 外部维护的主列表（插入顺序即轮播顺序）
    items: Vec<ItemRef>,
    /// 轮播缓冲：`reset()` 时从 `items` 复制，弹出队首后放回队尾
    playing_items: VecDeque<ItemRef>,
    /// 当前可见的项
    playing_item: Option<ItemRef>,
    /// 本轮开始时位于队首的项（用于检测一圈结束）
    first_item: Option<ItemRef>,
    /// 完成通知锁存，每次 `reset()` 清除
    done_is_called: bool,
    /// 本次 `start()` 的时刻
    start_time: Duration,
    /// 虚拟时钟
    now: Duration,
    /// 唯一的挂起定时器
    item_duration_timer: Timer,
    done_listener: Option<DoneListener>,
}

impl Schedule {
    /// 使用默认过渡处理器和计时参数创建调度器
    pub fn new() -> Self {
        Self::with_handler(TransitionHandler::new())
    }

    /// 使用指定的过渡处理器创建调度器
    pub fn with_handler(transition_handler: TransitionHandler) -> Self {
        Self {
            transition_handler,
            timing: ScheduleTiming::default(),
            items: Vec::new(),
            playing_items: VecDeque::new(),
            playing_item: None,
            first_item: None,
            done_is_called: false,
            start_time: Duration::ZERO,
            now: Duration::ZERO,
            item_duration_timer: Timer::new(),
            done_listener: None,
        }
    }

    /// 替换计时参数
    pub fn with_timing(mut self, timing: ScheduleTiming) -> Self {
        self.timing = timing;
        self
    }

    /// 设置完成通知回调
    pub fn set_done_listener(&mut self, listener: impl FnMut() + 'static) {
        self.done_listener = Some(Box::new(listener));
    }

    /// 主列表
    pub fn items(&self) -> &[ItemRef] {
        &self.items
    }

    /// 可变主列表
    ///
    /// 修改只在下一次 `reset()`（即 `start()`/`stop()`）时生效。
    pub fn items_mut(&mut self) -> &mut Vec<ItemRef> {
        &mut self.items
    }

    /// 替换主列表
    pub fn set_items(&mut self, items: Vec<ItemRef>) {
        self.items = items;
    }

    /// 开始（或重新开始）一次播放会话
    pub fn start(&mut self) {
        info!(items = self.items.len(), "开始轮播");
        self.start_time = self.now;
        self.reset();
        self.play();
    }

    /// 停止播放，把所有项恢复为隐藏的中性状态
    pub fn stop(&mut self) {
        info!("停止轮播");
        let previous = std::mem::take(&mut self.playing_items);
        self.reset();

        for item in previous {
            self.transition_handler.reset(item.element());
            item.element().borrow_mut().stop();
        }
    }

    /// 推进虚拟时钟
    ///
    /// 期间到期的决策点按时间顺序依次执行；过渡动画随时钟同步推进。
    pub fn update(&mut self, dt: Duration) {
        let target = self.now + dt;

        while let Some(due) = self.item_duration_timer.deadline() {
            if due > target {
                break;
            }
            self.advance_clock_to(due);
            match self.item_duration_timer.take_due(due) {
                Some((_, TimerAction::Play)) => self.play(),
                Some((_, TimerAction::Done)) => self.notify_done(),
                None => break,
            }
        }

        self.advance_clock_to(target);
    }

    /// 距下一个决策点的时间
    pub fn next_decision_in(&self) -> Option<Duration> {
        self.item_duration_timer
            .deadline()
            .map(|due| due.saturating_sub(self.now))
    }

    /// 当前播放项
    pub fn playing_item(&self) -> Option<&ItemRef> {
        self.playing_item.as_ref()
    }

    /// 当前轮播缓冲（队首为下一个候选项）
    pub fn playing_items(&self) -> impl Iterator<Item = &ItemRef> {
        self.playing_items.iter()
    }

    /// 本轮完成通知是否已发出
    pub fn is_done_called(&self) -> bool {
        self.done_is_called
    }

    /// 当前虚拟时刻
    pub fn now(&self) -> Duration {
        self.now
    }

    /// 过渡处理器
    pub fn transition_handler(&self) -> &TransitionHandler {
        &self.transition_handler
    }

    fn reset(&mut self) {
        self.item_duration_timer.cancel();
        self.playing_item = None;
        self.first_item = self.items.first().cloned();
        self.playing_items = self.items.iter().cloned().collect();
        self.done_is_called = false;
    }

    fn play(&mut self) {
        self.item_duration_timer.cancel();

        if self.playing_items.is_empty() {
            debug!("播放列表为空，宽限期后结束");
            self.schedule(self.timing.empty_grace, TimerAction::Done);
            return;
        }

        if self.all_items(|item| item.element().borrow().is_error()) {
            debug!("所有内容都出错，1 秒后结束");
            self.schedule(self.timing.retry_interval, TimerAction::Done);
            return;
        }

        if self.all_items(|item| item.element().borrow().is_not_ready())
            && self.now.saturating_sub(self.start_time) > self.timing.readiness_timeout
        {
            info!(timeout = ?self.timing.readiness_timeout, "播放列表就绪超时");
            self.notify_done();
            return;
        }

        if let Some(current) = &self.playing_item {
            if current.play_until_done() {
                let mut element = current.element().borrow_mut();
                if !element.is_done() {
                    drop(element);
                    self.schedule(self.timing.retry_interval, TimerAction::Play);
                    return;
                }
                element.reset_done();
            }
        }

        let Some(next_item) = self.playing_items.pop_front() else {
            return;
        };
        self.playing_items.push_back(next_item.clone());

        let previous_item = self.playing_item.clone();
        if previous_item.is_some() && self.is_first_item(&next_item) {
            self.notify_done();
        }

        {
            let element = next_item.element().borrow();
            if element.is_not_ready() || element.is_error() {
                debug!(
                    not_ready = element.is_not_ready(),
                    error = element.is_error(),
                    "跳过未就绪的内容"
                );
                drop(element);
                self.schedule(self.timing.retry_interval, TimerAction::Play);
                return;
            }
        }

        self.playing_item = Some(next_item.clone());

        let changed = previous_item
            .as_ref()
            .is_none_or(|previous| !Rc::ptr_eq(previous, &next_item));
        if changed {
            let previous_element: Option<&ElementRef> =
                previous_item.as_ref().map(|previous| previous.element());
            self.transition_handler
                .transition(previous_element, next_item.element());
        }

        let delay = if next_item.play_until_done() {
            self.timing.retry_interval
        } else {
            next_item.duration()
        };
        self.schedule(delay, TimerAction::Play);
    }

    fn schedule(&mut self, delay: Duration, action: TimerAction) {
        let delay = delay.max(MIN_DECISION_INTERVAL);
        self.item_duration_timer.cancel();
        self.item_duration_timer.schedule(self.now, delay, action);
    }

    fn notify_done(&mut self) {
        if self.done_is_called {
            return;
        }
        self.done_is_called = true;
        info!("播放列表完成一轮");
        if let Some(listener) = self.done_listener.as_mut() {
            listener();
        }
    }

    fn advance_clock_to(&mut self, target: Duration) {
        if target > self.now {
            self.transition_handler.update(target - self.now);
            self.now = target;
        }
    }

    fn is_first_item(&self, item: &ItemRef) -> bool {
        self.first_item
            .as_ref()
            .is_some_and(|first| Rc::ptr_eq(first, item))
    }

    fn all_items(&self, predicate: impl Fn(&ItemRef) -> bool) -> bool {
        self.playing_items.iter().all(predicate)
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schedule")
            .field("items", &self.items.len())
            .field("playing_item", &self.playing_item)
            .field("done_is_called", &self.done_is_called)
            .field("now", &self.now)
            .field("next_decision_in", &self.next_decision_in())
            .finish()
    }
}
