//! 定义了连接生命周期的可配置参数。
//! Defines configurable parameters for the connection lifecycle.

use std::time::Duration;

/// A structure containing all configurable parameters for a connection manager.
///
/// 包含连接管理器所有可配置参数的结构体。
#[derive(Debug, Clone)]
pub struct Config {
    /// The cadence at which the current state is republished to observers,
    /// so that the derived duration of an established connection visibly
    /// advances even when no discrete transition occurs.
    ///
    /// 当前状态重新发布给观察者的节奏，使已建立连接的派生时长即使在
    /// 没有离散转换的情况下也能持续推进。
    pub state_refresh_interval: Duration,

    /// The settle delay between entering `Disconnecting` and the forced
    /// transition to `Disconnected`.
    ///
    /// 从进入 `Disconnecting` 到强制转换为 `Disconnected` 之间的沉降延迟。
    pub disconnect_settle_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_refresh_interval: Duration::from_secs(1),
            disconnect_settle_delay: Duration::from_secs(1),
        }
    }
}
