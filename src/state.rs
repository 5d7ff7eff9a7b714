//! Defines the observable state of a tunnel connection.
//!
//! 定义隧道连接的可观察状态。

use std::time::Duration;
use tokio::time::Instant;

/// The state of a tunnel connection.
///
/// Exactly one variant is current at any instant. The duration of an
/// established connection is always derived from `connected_at`, never
/// stored, so it cannot drift out of sync.
///
/// 隧道连接的状态。
///
/// 任一时刻恰好有一个变体是当前状态。已建立连接的时长总是由
/// `connected_at` 派生，从不单独存储，因此不会出现不同步。
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    /// No active tunnel connection.
    /// 没有活跃的隧道连接。
    Disconnected,

    /// An attempt to reach a node is in flight.
    /// 正在尝试连接某个节点。
    Connecting {
        /// The node being connected to.
        /// 正在连接的节点。
        node_id: String,
        /// Attempt progress in `[0.0, 1.0]`.
        /// 连接进度，范围 `[0.0, 1.0]`。
        progress: f32,
    },

    /// The tunnel to a node is established.
    /// 到某个节点的隧道已建立。
    Connected {
        /// The connected node.
        /// 已连接的节点。
        node_id: String,
        /// When the tunnel was established.
        /// 隧道建立的时刻。
        connected_at: Instant,
    },

    /// A graceful teardown is in progress.
    /// 正在优雅地断开连接。
    Disconnecting {
        /// The node being disconnected from.
        /// 正在断开的节点。
        node_id: String,
    },

    /// The last attempt or connection failed.
    /// 上一次尝试或连接已失败。
    Error {
        /// The node involved in the failure, when known.
        /// 失败涉及的节点（如果已知）。
        node_id: Option<String>,
        /// A human-readable description of the failure.
        /// 对失败的人类可读描述。
        message: String,
    },
}

impl ConnectionState {
    /// Returns the node this state refers to, if any.
    /// 返回该状态所涉及的节点（如果有）。
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::Disconnected => None,
            Self::Connecting { node_id, .. }
            | Self::Connected { node_id, .. }
            | Self::Disconnecting { node_id } => Some(node_id),
            Self::Error { node_id, .. } => node_id.as_deref(),
        }
    }

    /// How long the connection has been established, derived from the
    /// clock. `None` unless the state is `Connected`.
    ///
    /// 连接已建立的时长，由时钟派生。仅在 `Connected` 状态下为 `Some`。
    pub fn connected_duration(&self) -> Option<Duration> {
        match self {
            Self::Connected { connected_at, .. } => {
                Some(Instant::now().saturating_duration_since(*connected_at))
            }
            _ => None,
        }
    }

    /// Whether the tunnel is established to the given node.
    /// 是否已建立到指定节点的隧道。
    pub fn is_connected_to(&self, node_id: &str) -> bool {
        matches!(self, Self::Connected { node_id: id, .. } if id == node_id)
    }

    /// Whether an attempt to the given node is in flight.
    /// 是否正在尝试连接指定节点。
    pub fn is_connecting_to(&self, node_id: &str) -> bool {
        matches!(self, Self::Connecting { node_id: id, .. } if id == node_id)
    }
}
