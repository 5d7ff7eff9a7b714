//! The single mutable cell of the lifecycle core.
//!
//! 生命周期核心中唯一的可变单元。

use super::machine::{self, ConnectionRequest};
use crate::{error::Result, state::ConnectionState};
use tracing::trace;

/// Exclusive owner of the current connection state. Created once in
/// `Disconnected` when the manager starts and mutated for as long as the
/// manager lives; every write into the core goes through this cell.
///
/// 当前连接状态的独占拥有者。管理器启动时以 `Disconnected` 创建一次，
/// 并在管理器存活期间持续被修改；核心的每一次写入都经由这个单元。
#[derive(Debug)]
pub struct ConnectionContext {
    current: ConnectionState,
}

impl ConnectionContext {
    /// Creates the context in the `Disconnected` state.
    /// 以 `Disconnected` 状态创建上下文。
    pub fn new() -> Self {
        Self { current: ConnectionState::Disconnected }
    }

    /// The current state.
    /// 当前状态。
    pub fn current_state(&self) -> &ConnectionState {
        &self.current
    }

    /// Applies a request through the transition table and commits the
    /// successor state on success. On failure the state is left unchanged.
    /// Returns the committed state for publishing.
    ///
    /// 通过转换表应用请求，并在成功时提交后继状态。失败时状态保持不变。
    /// 返回已提交的状态以便发布。
    pub fn request(&mut self, request: ConnectionRequest) -> Result<ConnectionState> {
        let next = machine::apply(&self.current, request)?;
        trace!(from = ?self.current, to = ?next, "lifecycle transition");
        self.current = next.clone();
        Ok(next)
    }

    /// Unconditionally replaces the current state. Used by the manager's
    /// timeline for phase progress, establishment, failure forcing, and
    /// settle completion, which bypass the request table.
    ///
    /// 无条件地替换当前状态。由管理器的时间线用于阶段进度、连接建立、
    /// 失败强制与断开完成，这些写入绕过请求表。
    pub fn force(&mut self, state: ConnectionState) {
        trace!(from = ?self.current, to = ?state, "lifecycle state forced");
        self.current = state;
    }
}

impl Default for ConnectionContext {
    fn default() -> Self {
        Self::new()
    }
}
