//! The outbound session-persistence contract.
//!
//! The lifecycle core never persists anything itself: on a successful
//! connect, the caller records a session through a [`SessionSink`] of its
//! choosing. This module defines that boundary only.
//!
//! 对外的会话持久化契约。
//!
//! 生命周期核心自身从不做持久化：连接成功后，由调用方通过其选择的
//! [`SessionSink`] 记录会话。本模块仅定义该边界。

use crate::error::Result;
use async_trait::async_trait;
use std::{
    sync::{Mutex, PoisonError},
    time::SystemTime,
};

/// An active or historical connection session, keyed by node and connect
/// timestamp.
///
/// 一次活跃或历史的连接会话，以节点和连接时间戳为键。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Unique session identifier.
    /// 会话的唯一标识。
    pub id: u64,
    /// The user owning the session.
    /// 会话所属的用户。
    pub user_id: u64,
    /// The node the session connected to.
    /// 会话连接的节点。
    pub node_id: String,
    /// When the connection was established.
    /// 连接建立的时刻。
    pub connected_at: SystemTime,
    /// When the connection was terminated; `None` while still active.
    /// 连接终止的时刻；仍活跃时为 `None`。
    pub disconnected_at: Option<SystemTime>,
    /// Whether the session is currently active.
    /// 会话当前是否活跃。
    pub active: bool,
}

/// The persistence collaborator the caller hands session records to.
///
/// 调用方将会话记录交给的持久化协作方。
#[async_trait]
pub trait SessionSink: Send + Sync {
    /// Records a session, replacing any previously recorded one.
    /// 记录一个会话，替换之前记录的会话。
    async fn record(&self, session: SessionRecord) -> Result<()>;

    /// The most recently recorded session, if any.
    /// 最近记录的会话（如果有）。
    async fn last(&self) -> Result<Option<SessionRecord>>;

    /// Clears the recorded session.
    /// 清除已记录的会话。
    async fn clear(&self) -> Result<()>;
}

/// An in-memory sink holding the single most recent session.
///
/// 持有最近一个会话的内存式记录器。
#[derive(Debug, Default)]
pub struct MemorySessionSink {
    current: Mutex<Option<SessionRecord>>,
}

#[async_trait]
impl SessionSink for MemorySessionSink {
    async fn record(&self, session: SessionRecord) -> Result<()> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    async fn last(&self) -> Result<Option<SessionRecord>> {
        Ok(self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
