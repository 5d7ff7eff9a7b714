//! Connection strategies: named plans describing the phases and pacing of a
//! simulated connection attempt.
//!
//! 连接策略：描述模拟连接尝试的阶段与节奏的命名方案。

use std::time::Duration;
use tracing::debug;

/// An immutable descriptor of a connection plan: a non-empty ordered list of
/// phase labels and a fixed delay between phases.
///
/// 连接方案的不可变描述符：非空的有序阶段标签列表，以及阶段之间的固定延迟。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStrategy {
    name: &'static str,
    phases: &'static [&'static str],
    phase_delay: Duration,
}

impl ConnectionStrategy {
    /// The fast plan: minimal checks, optimized for speed.
    /// 快速方案：最少的检查，以速度优先。
    pub const fn fast() -> Self {
        Self {
            name: "fast",
            phases: &["Establishing connection", "Authenticating", "Connected"],
            phase_delay: Duration::from_millis(500),
        }
    }

    /// The secure plan: comprehensive checks, security over speed.
    /// 安全方案：全面的检查，以安全优先。
    pub const fn secure() -> Self {
        Self {
            name: "secure",
            phases: &[
                "Initializing secure handshake",
                "Verifying server certificate",
                "Establishing encrypted tunnel",
                "Performing security validation",
                "Connection secured",
            ],
            phase_delay: Duration::from_millis(1000),
        }
    }

    /// The strategy name.
    /// 策略名称。
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The ordered phase labels of an attempt. Never empty.
    /// 一次尝试的有序阶段标签。永不为空。
    pub fn phases(&self) -> &'static [&'static str] {
        self.phases
    }

    /// The delay between consecutive phases.
    /// 相邻阶段之间的延迟。
    pub fn phase_delay(&self) -> Duration {
        self.phase_delay
    }

    /// The derived total duration of an attempt: phase count times delay.
    /// 派生的尝试总时长：阶段数乘以延迟。
    pub fn total_duration(&self) -> Duration {
        self.phase_delay * self.phases.len() as u32
    }
}

/// Resolves a strategy name to a strategy instance.
///
/// 将策略名称解析为策略实例。
pub struct StrategyCatalog;

impl StrategyCatalog {
    /// Resolves a name, case-insensitively. Unknown or empty names fall
    /// back to the fast plan; this is an explicit default, not an error.
    /// Callers needing strict validation check [`Self::available_names`]
    /// before calling.
    ///
    /// 以不区分大小写的方式解析名称。未知或空名称回退到快速方案；
    /// 这是显式的默认值而不是错误。需要严格校验的调用者应先检查
    /// [`Self::available_names`]。
    pub fn resolve(name: &str) -> ConnectionStrategy {
        match name.to_ascii_lowercase().as_str() {
            "fast" => ConnectionStrategy::fast(),
            "secure" => ConnectionStrategy::secure(),
            other => {
                if !other.is_empty() {
                    debug!(name = other, "unknown strategy name, falling back to fast");
                }
                ConnectionStrategy::fast()
            }
        }
    }

    /// The enumerated set of built-in strategy names.
    /// 内置策略名称的枚举集合。
    pub fn available_names() -> &'static [&'static str] {
        &["fast", "secure"]
    }
}
