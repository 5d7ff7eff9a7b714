//! Background tasks driving the connection timeline: the phase-advance loop,
//! the disconnect settle delay, and the periodic republish tick.
//!
//! 驱动连接时间线的后台任务：阶段推进循环、断开沉降延迟，以及周期性的
//! 重发布任务。

use super::Shared;
use crate::{state::ConnectionState, strategy::ConnectionStrategy};
use std::sync::Arc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// Drives one connection attempt through its strategy's phases.
///
/// Publishes `Connecting` with strictly increasing progress, waiting the
/// strategy's delay between phases, then publishes `Connected`. Every
/// publish checks the attempt token; the first stale check ends the task so
/// a cancelled attempt never overwrites a newer one.
///
/// 将一次连接尝试沿其策略的各阶段推进。
///
/// 以严格递增的进度发布 `Connecting`，阶段之间等待策略的延迟，最后发布
/// `Connected`。每次发布都检查尝试令牌；首次检查到过期即结束任务，
/// 被取消的尝试绝不会覆盖更新的尝试。
pub(super) async fn run_phases(
    shared: Arc<Shared>,
    token: u64,
    node_id: String,
    strategy: ConnectionStrategy,
) {
    let total = strategy.phases().len();
    for (index, phase) in strategy.phases().iter().enumerate() {
        let progress = (index + 1) as f32 / total as f32;
        let published = shared.publish_if_current(
            token,
            ConnectionState::Connecting {
                node_id: node_id.clone(),
                progress,
            },
        );
        if !published {
            return;
        }
        debug!(node_id = %node_id, phase = *phase, progress, "attempt phase advanced");
        sleep(strategy.phase_delay()).await;
    }

    let established = shared.publish_if_current(
        token,
        ConnectionState::Connected {
            node_id: node_id.clone(),
            connected_at: Instant::now(),
        },
    );
    if established {
        info!(node_id = %node_id, strategy = strategy.name(), "connection established");
    }
}

/// Completes a graceful teardown: waits the settle delay, then forces
/// `Disconnected`. This path never produces `Error`; losing a connection
/// must not leave the session stuck mid-teardown.
///
/// 完成优雅的断开：等待沉降延迟后强制进入 `Disconnected`。该路径绝不会
/// 产生 `Error`；断开连接不能让会话卡在拆除中途。
pub(super) async fn settle_disconnect(shared: Arc<Shared>, token: u64) {
    sleep(shared.config.disconnect_settle_delay).await;
    if shared.publish_if_current(token, ConnectionState::Disconnected) {
        info!("disconnected");
    }
}

/// Republishes the current state at the configured cadence so that the
/// derived connected duration advances for observers even when no discrete
/// transition occurs. Runs for the manager's lifetime.
///
/// 以配置的节奏重新发布当前状态，使派生的连接时长在没有离散转换时也能
/// 对观察者持续推进。在管理器的整个生命周期内运行。
pub(super) async fn refresh_tick(shared: Arc<Shared>) {
    let interval = shared.config.state_refresh_interval;
    loop {
        sleep(interval).await;
        shared.republish_current();
    }
}
