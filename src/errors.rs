//! ChatNet 错误类型

use thiserror::Error;

/// 引擎统一错误类型
///
/// 网络分析引擎不做 I/O，正常运行中没有致命错误路径（退化输入一律返回
/// 零值默认，见各模块的守卫分支），因此这里的变体只覆盖配置校验与
/// 边界解析两类问题。
#[derive(Debug, Error)]
pub enum ChatNetError {
    /// 配置参数非法（阈值、上限等）
    #[error("Configuration error: {0}")]
    Config(String),

    /// 输入数据解析错误
    #[error("Parse error: {0}")]
    Parse(String),

    /// 分析过程错误
    #[error("Analysis error: {0}")]
    Analysis(String),
}

pub type Result<T> = std::result::Result<T, ChatNetError>;
