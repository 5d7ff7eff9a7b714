//! The connection manager: the public connect/disconnect/query API and the
//! background timeline that drives a connection attempt through its phases.
//!
//! 连接管理器：公开的 connect/disconnect/查询 API，以及在后台驱动连接尝试
//! 逐阶段推进的时间线。

use crate::{
    config::Config,
    error::Result,
    lifecycle::{context::ConnectionContext, machine::ConnectionRequest},
    state::ConnectionState,
    strategy::StrategyCatalog,
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

mod timeline;

#[cfg(test)]
mod tests;

/// State shared between the manager handle and its timeline tasks.
///
/// All writes to the context are serialized through one lock, and the watch
/// publish happens under that same lock, so observers see states in the
/// exact order the context produced them.
///
/// 管理器句柄与其时间线任务之间共享的状态。
///
/// 对上下文的所有写入都通过同一把锁串行化，watch 发布也在该锁内进行，
/// 因此观察者看到的状态顺序与上下文产生它们的顺序完全一致。
struct Shared {
    config: Config,
    context: Mutex<ConnectionContext>,
    state_tx: watch::Sender<ConnectionState>,
    /// Monotonically increasing attempt generation. Bumped on every
    /// successful connect/disconnect and every reported failure; a timeline
    /// task compares its captured token against this before each publish so
    /// a stale task can never resurrect a state after cancellation.
    ///
    /// 单调递增的尝试代号。每次成功的 connect/disconnect 以及每次上报的
    /// 失败都会使其递增；时间线任务在每次发布前将其捕获的令牌与之比较，
    /// 使过期任务在取消后绝不会复活旧状态。
    attempt: AtomicU64,
}

impl Shared {
    /// Bumps the attempt generation and returns the new token. Transition
    /// paths call this under the context lock so the bump is ordered with
    /// the state write; shutdown bumps without it, which only ever
    /// invalidates more.
    fn next_attempt(&self) -> u64 {
        self.attempt.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn lock_context(&self) -> std::sync::MutexGuard<'_, ConnectionContext> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes a forced state on behalf of the attempt identified by
    /// `token`. Returns `false` without writing when the attempt is stale.
    fn publish_if_current(&self, token: u64, state: ConnectionState) -> bool {
        let mut ctx = self.lock_context();
        if self.attempt.load(Ordering::SeqCst) != token {
            debug!(attempt = token, "stale attempt, publish suppressed");
            return false;
        }
        ctx.force(state);
        self.state_tx.send_replace(ctx.current_state().clone());
        true
    }

    /// Republishes the current state unchanged, keeping derived values
    /// (the connected duration) fresh for observers.
    fn republish_current(&self) {
        let ctx = self.lock_context();
        self.state_tx.send_replace(ctx.current_state().clone());
    }
}

/// Orchestrates the connection lifecycle: resolves strategies, drives the
/// context through an attempt's phases on a background timeline, and mirrors
/// every state mutation into a continuously observable channel.
///
/// One manager is explicitly constructed at application start with
/// [`ConnectionManager::start`] and torn down with
/// [`ConnectionManager::shutdown`]; whoever needs it receives the instance.
///
/// 编排连接生命周期：解析策略，在后台时间线上驱动上下文走完一次尝试的
/// 各个阶段，并把每次状态变更镜像到可持续观察的通道中。
///
/// 管理器在应用启动时通过 [`ConnectionManager::start`] 显式构造，
/// 通过 [`ConnectionManager::shutdown`] 显式拆除；需要它的地方接收该实例。
pub struct ConnectionManager {
    shared: Arc<Shared>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionManager {
    /// Creates the manager in the `Disconnected` state and spawns the
    /// periodic republish tick. Must be called within a tokio runtime.
    ///
    /// 以 `Disconnected` 状态创建管理器并启动周期性的重发布任务。
    /// 必须在 tokio 运行时内调用。
    pub fn start(config: Config) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let shared = Arc::new(Shared {
            config,
            context: Mutex::new(ConnectionContext::new()),
            state_tx,
            attempt: AtomicU64::new(0),
        });

        let refresh_task = tokio::spawn(timeline::refresh_tick(shared.clone()));
        info!("connection manager started");

        Self {
            shared,
            refresh_task: Mutex::new(Some(refresh_task)),
        }
    }

    /// Begins a connection attempt to `node_id` using the named strategy.
    ///
    /// The strategy name is resolved through the catalog (unknown names fall
    /// back to `fast`). Returns immediately after the initial transition to
    /// `Connecting`; the phases advance on the background timeline. A typed
    /// failure leaves the current state unchanged.
    ///
    /// 使用命名策略开始对 `node_id` 的连接尝试。
    ///
    /// 策略名称通过目录解析（未知名称回退到 `fast`）。在初始转换到
    /// `Connecting` 后立即返回；各阶段在后台时间线上推进。类型化的失败
    /// 不会改变当前状态。
    pub fn connect(&self, node_id: &str, strategy_name: &str) -> Result<()> {
        let strategy = StrategyCatalog::resolve(strategy_name);

        let token = {
            let mut ctx = self.shared.lock_context();
            let committed = ctx.request(ConnectionRequest::Connect {
                node_id: node_id.to_string(),
            })?;
            let token = self.shared.next_attempt();
            self.shared.state_tx.send_replace(committed);
            token
        };

        info!(
            node_id = %node_id,
            strategy = strategy.name(),
            attempt = token,
            "connection attempt started"
        );
        tokio::spawn(timeline::run_phases(
            self.shared.clone(),
            token,
            node_id.to_string(),
            strategy,
        ));
        Ok(())
    }

    /// Tears down the current attempt or connection.
    ///
    /// Cancelling an in-flight attempt or clearing an error settles to
    /// `Disconnected` immediately; tearing down an established connection
    /// enters `Disconnecting` and settles on the background timeline after
    /// the configured delay. Returns immediately in both cases. The
    /// teardown path always ends in `Disconnected`, never in `Error`.
    ///
    /// 拆除当前的尝试或连接。
    ///
    /// 取消进行中的尝试或清除错误会立即回到 `Disconnected`；拆除已建立
    /// 的连接会进入 `Disconnecting`，并在配置的延迟后于后台时间线上完成。
    /// 两种情况下都立即返回。拆除路径总是以 `Disconnected` 结束，绝不会
    /// 进入 `Error`。
    pub fn disconnect(&self) -> Result<()> {
        let (committed, token) = {
            let mut ctx = self.shared.lock_context();
            let committed = ctx.request(ConnectionRequest::Disconnect)?;
            let token = self.shared.next_attempt();
            self.shared.state_tx.send_replace(committed.clone());
            (committed, token)
        };

        if let ConnectionState::Disconnecting { node_id } = committed {
            info!(node_id = %node_id, "disconnecting");
            tokio::spawn(timeline::settle_disconnect(self.shared.clone(), token));
        } else {
            info!("disconnected");
        }
        Ok(())
    }

    /// A synchronous snapshot of the current state.
    /// 当前状态的同步快照。
    pub fn current_state(&self) -> ConnectionState {
        self.shared.lock_context().current_state().clone()
    }

    /// A continuously observable channel of connection states. Emits on
    /// every transition and is re-sampled at the configured refresh cadence
    /// so the connected duration visibly advances; duplicate consecutive
    /// values are permitted.
    ///
    /// 连接状态的可持续观察通道。每次转换都会发出，并按配置的刷新节奏
    /// 重新采样，使连接时长可见地推进；允许出现连续重复的值。
    pub fn observe_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    /// Whether the tunnel is currently established to `node_id`.
    /// 当前是否已建立到 `node_id` 的隧道。
    pub fn is_connected_to(&self, node_id: &str) -> bool {
        self.current_state().is_connected_to(node_id)
    }

    /// Whether an attempt to `node_id` is currently in flight.
    /// 当前是否正在尝试连接 `node_id`。
    pub fn is_connecting_to(&self, node_id: &str) -> bool {
        self.current_state().is_connecting_to(node_id)
    }

    /// Records an externally observed connection failure, forcing the state
    /// to `Error` and invalidating any in-flight attempt. The error is
    /// recoverable: the next `connect` retries, the next `disconnect`
    /// clears back to `Disconnected`.
    ///
    /// 记录外部观察到的连接失败，将状态强制为 `Error` 并使任何进行中的
    /// 尝试失效。该错误可恢复：下一次 `connect` 重试，下一次 `disconnect`
    /// 清除回 `Disconnected`。
    pub fn report_error(&self, node_id: Option<String>, message: impl Into<String>) {
        let message = message.into();
        {
            let mut ctx = self.shared.lock_context();
            self.shared.next_attempt();
            ctx.force(ConnectionState::Error {
                node_id: node_id.clone(),
                message: message.clone(),
            });
            self.shared.state_tx.send_replace(ctx.current_state().clone());
        }
        warn!(node_id = ?node_id, message = %message, "connection failure reported");
    }

    /// Tears the manager down: stops the republish tick and invalidates any
    /// in-flight timeline task. The last published state remains observable.
    ///
    /// 拆除管理器：停止重发布任务并使任何进行中的时间线任务失效。
    /// 最后发布的状态仍然可被观察。
    pub fn shutdown(&self) {
        self.shared.next_attempt();
        if let Some(task) = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
        info!("connection manager stopped");
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(task) = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}
