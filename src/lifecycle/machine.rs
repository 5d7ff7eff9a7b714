//! The pure transition function of the connection state machine.
//!
//! 连接状态机的纯转换函数。

use crate::{
    error::{Error, Result},
    state::ConnectionState,
};

/// A request made against the current lifecycle state.
///
/// 针对当前生命周期状态发出的请求。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionRequest {
    /// Begin an attempt to the given node.
    /// 开始对指定节点的连接尝试。
    Connect {
        /// The target node.
        /// 目标节点。
        node_id: String,
    },
    /// Tear down the current attempt or connection.
    /// 拆除当前的尝试或连接。
    Disconnect,
}

/// Applies a request to a state and returns the successor state, or a typed
/// failure when the transition is illegal. The input state is never
/// mutated; on `Err` the caller keeps the current state unchanged.
///
/// The table enforces at most one in-flight operation:
///
/// | Current       | Connect                  | Disconnect               |
/// |---------------|--------------------------|--------------------------|
/// | Disconnected  | Connecting               | Err(NotConnected)        |
/// | Connecting    | Err(AlreadyConnecting)   | Disconnected (cancel)    |
/// | Connected     | Err(AlreadyConnected)    | Disconnecting            |
/// | Disconnecting | Err(DisconnectInProgress)| Err(AlreadyDisconnecting)|
/// | Error         | Connecting (retry)       | Disconnected (clear)     |
///
/// 将请求应用于某个状态并返回后继状态；当转换非法时返回类型化的失败。
/// 输入状态从不被修改；返回 `Err` 时调用者保持当前状态不变。
pub fn apply(state: &ConnectionState, request: ConnectionRequest) -> Result<ConnectionState> {
    match (state, request) {
        (ConnectionState::Disconnected, ConnectionRequest::Connect { node_id }) => {
            Ok(ConnectionState::Connecting { node_id, progress: 0.0 })
        }
        (ConnectionState::Disconnected, ConnectionRequest::Disconnect) => {
            Err(Error::NotConnected)
        }

        (ConnectionState::Connecting { .. }, ConnectionRequest::Connect { .. }) => {
            Err(Error::AlreadyConnecting)
        }
        // Cancelling an in-flight attempt is a hard cancel straight back to
        // Disconnected; the timed simulation has no partial teardown.
        (ConnectionState::Connecting { .. }, ConnectionRequest::Disconnect) => {
            Ok(ConnectionState::Disconnected)
        }

        (ConnectionState::Connected { .. }, ConnectionRequest::Connect { .. }) => {
            Err(Error::AlreadyConnected)
        }
        (ConnectionState::Connected { node_id, .. }, ConnectionRequest::Disconnect) => {
            Ok(ConnectionState::Disconnecting { node_id: node_id.clone() })
        }

        (ConnectionState::Disconnecting { .. }, ConnectionRequest::Connect { .. }) => {
            Err(Error::DisconnectInProgress)
        }
        (ConnectionState::Disconnecting { .. }, ConnectionRequest::Disconnect) => {
            Err(Error::AlreadyDisconnecting)
        }

        // A stuck error state must not block reconnection: retry without an
        // explicit clear step.
        (ConnectionState::Error { .. }, ConnectionRequest::Connect { node_id }) => {
            Ok(ConnectionState::Connecting { node_id, progress: 0.0 })
        }
        (ConnectionState::Error { .. }, ConnectionRequest::Disconnect) => {
            Ok(ConnectionState::Disconnected)
        }
    }
}
