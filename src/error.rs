//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.

use thiserror::Error;

/// The primary error type for the tunnel lifecycle library.
///
/// Every expected failure is a typed variant; the library never panics
/// past its own boundary for expected conditions.
///
/// 隧道生命周期库的主要错误类型。
/// 所有可预期的失败都是类型化的变体；对于可预期的情况，库绝不会让 panic 越过自身边界。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A connect was requested while an attempt is already in flight.
    /// 在一次连接尝试仍在进行时又请求了连接。
    #[error("already connecting")]
    AlreadyConnecting,

    /// A connect was requested while a connection is already established.
    /// 在连接已建立时又请求了连接。
    #[error("already connected, disconnect first")]
    AlreadyConnected,

    /// A connect was requested while a graceful teardown is in progress.
    /// 在优雅断开进行中时请求了连接。
    #[error("disconnect in progress")]
    DisconnectInProgress,

    /// A disconnect was requested while a teardown is already in progress.
    /// 在断开已经进行中时又请求了断开。
    #[error("already disconnecting")]
    AlreadyDisconnecting,

    /// A disconnect was requested while no connection exists.
    /// 在没有连接时请求了断开。
    #[error("not connected")]
    NotConnected,

    /// The session persistence collaborator reported a failure.
    /// 会话持久化协作方报告了失败。
    #[error("session persistence failed: {0}")]
    Persistence(String),
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;
