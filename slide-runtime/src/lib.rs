//! # Slide Runtime
//!
//! 幻灯片轮播引擎的核心运行时库。
//!
//! ## 架构概述
//!
//! `slide-runtime` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! 宿主层（Host）持有内容，并通过推进虚拟时钟驱动调度：
//!
//! ```text
//! Host                               Runtime
//!   │                                   │
//!   │──── items_mut() / start() ──────►│
//!   │                                   │ play() 决策
//!   │──── update(dt) ─────────────────►│
//!   │                                   │ 到期 → play() → TransitionHandler
//!   │◄─── VisualState / done_listener ──│
//!   │                                   │
//! ```
//!
//! ## 核心类型
//!
//! - [`Schedule`]：轮播调度状态机
//! - [`TransitionHandler`]：按切入元素声明的类型选择并运行过渡效果
//! - [`Playable`] / [`Element`]：被轮播内容的能力接口
//! - [`RotationItem`]：元素 + 时长 + 播放模式
//! - [`PlaylistItem`]：包装 [`Content`] 的标准 `Element` 实现
//!
//! ## 使用示例
//!
//! ```ignore
//! use slide_runtime::{RotationItem, Schedule};
//!
//! let mut schedule = Schedule::new();
//! schedule.set_done_listener(|| println!("一圈结束"));
//! schedule.items_mut().push(RotationItem::new(element, 5.0, false)?.into_ref());
//! schedule.start();
//!
//! loop {
//!     schedule.update(frame_time);
//!     render(schedule.items());
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`item`]：Playable / Element / RotationItem
//! - [`playlist_item`]：PlaylistItem 与 Content 接口
//! - [`timer`]：单槽定时器
//! - [`schedule`]：调度状态机
//! - [`transition`]：过渡处理器、效果与注册表
//! - [`error`]：错误类型定义

pub mod error;
pub mod item;
pub mod playlist_item;
pub mod schedule;
pub mod timer;
pub mod transition;

// 重导出核心类型
pub use error::{ItemError, ParseError, SlideError, SlideResult};
pub use item::{
    Bounds, Element, ElementRef, ItemRef, Playable, RotationItem, StripeMask, StripeOrientation,
    Vec2, VisualState,
};
pub use playlist_item::{Content, ContentEvent, ContentSignal, ContentStatus, PlaylistItem};
pub use schedule::{DoneListener, MIN_DECISION_INTERVAL, Schedule, ScheduleTiming};
pub use timer::{Timer, TimerAction};
pub use transition::{TransitionEffect, TransitionHandler, TransitionType, reset_to_neutral};
