//! # Error 模块
//!
//! 定义 slide-runtime 中使用的错误类型。
//!
//! 调度本身不会失败：内容未就绪、内容出错、就绪超时、空播放列表都降级为
//! 重试或完成通知。这里的错误只出现在构造阶段（非法时长、严格解析过渡名）。

use thiserror::Error;

/// 轮播项构造错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ItemError {
    /// 时长必须为正数
    #[error("无效的播放时长 {seconds} 秒：必须大于 0")]
    InvalidDuration { seconds: f64 },
}

/// 解析错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// 未知的过渡效果名
    #[error("未知的过渡效果 '{name}'")]
    UnknownTransition { name: String },
}

/// slide-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlideError {
    /// 轮播项错误
    #[error("轮播项错误: {0}")]
    Item(#[from] ItemError),

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),
}

/// Result 类型别名
pub type SlideResult<T> = Result<T, SlideError>;
