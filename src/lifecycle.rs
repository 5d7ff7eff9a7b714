//! The connection lifecycle state machine.
//!
//! The legal transitions live in [`machine`] as a pure function over a
//! tagged state enum; [`context`] holds the single mutable cell that the
//! rest of the library mutates through.
//!
//! 连接生命周期状态机。
//!
//! 合法转换位于 [`machine`] 中，是基于带标签状态枚举的纯函数；
//! [`context`] 持有库中其余部分用来进行变更的唯一可变单元。

pub mod context;
pub mod machine;
