//! Edge detection for notification collaborators.
//!
//! A watcher of the state channel raises a user-visible notification
//! exactly on three edges; the detection is pure and lives outside the
//! manager.
//!
//! 供通知协作方使用的边沿检测。
//!
//! 状态通道的观察者恰好在三种边沿上发出用户可见的通知；
//! 检测逻辑是纯函数式的，位于管理器之外。

use crate::state::ConnectionState;

/// A significant transition a notification should be raised for.
///
/// 应当发出通知的显著转换。
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEdge {
    /// The tunnel became established: `(not Connected) -> Connected`.
    /// 隧道已建立：`(非 Connected) -> Connected`。
    Established {
        /// The connected node.
        /// 已连接的节点。
        node_id: String,
    },
    /// An established tunnel went away: `Connected -> Disconnected`.
    /// 已建立的隧道消失：`Connected -> Disconnected`。
    Dropped {
        /// The node the tunnel was connected to.
        /// 隧道之前连接的节点。
        node_id: String,
    },
    /// A failure surfaced: `(not Error) -> Error`.
    /// 出现失败：`(非 Error) -> Error`。
    Failed {
        /// The node involved, when known.
        /// 涉及的节点（如果已知）。
        node_id: Option<String>,
        /// The failure description.
        /// 失败描述。
        message: String,
    },
}

/// Detects notification edges over a sequence of observed states.
///
/// Feed it every state an observer sees, in order; it reports an edge only
/// when the previous observed state makes the new one significant, so
/// republished duplicates never re-fire a notification.
///
/// 在一系列被观察到的状态上检测通知边沿。
///
/// 按顺序喂入观察者看到的每个状态；仅当前一个被观察的状态使新状态变得
/// 显著时才报告边沿，因此重发布的重复状态绝不会重复触发通知。
#[derive(Debug)]
pub struct EdgeDetector {
    last: ConnectionState,
}

impl EdgeDetector {
    /// Creates a detector whose previous state is `Disconnected`.
    /// 创建一个前置状态为 `Disconnected` 的检测器。
    pub fn new() -> Self {
        Self { last: ConnectionState::Disconnected }
    }

    /// Observes the next state and returns the edge it completes, if any.
    /// 观察下一个状态，并返回它构成的边沿（如果有）。
    pub fn observe(&mut self, next: &ConnectionState) -> Option<ConnectionEdge> {
        let edge = match (&self.last, next) {
            (ConnectionState::Connected { .. }, ConnectionState::Connected { .. }) => None,
            (_, ConnectionState::Connected { node_id, .. }) => {
                Some(ConnectionEdge::Established { node_id: node_id.clone() })
            }
            (ConnectionState::Connected { node_id, .. }, ConnectionState::Disconnected) => {
                Some(ConnectionEdge::Dropped { node_id: node_id.clone() })
            }
            (ConnectionState::Error { .. }, ConnectionState::Error { .. }) => None,
            (_, ConnectionState::Error { node_id, message }) => Some(ConnectionEdge::Failed {
                node_id: node_id.clone(),
                message: message.clone(),
            }),
            _ => None,
        };
        self.last = next.clone();
        edge
    }
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}
