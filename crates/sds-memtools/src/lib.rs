#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

//! `sds-memtools` 提供可按位寻址、可安全擦除的进程内内存缓冲。
//!
//! # 模块定位（Why）
//! - 敏感数据（临时密钥、口令片段）需要一块“用完即清零”的存储，
//!   同时支持 XOR、按位左移、拼接、按位切片等原始位运算，供上层组合出密钥流等流程。
//! - 宿主绑定层只负责把字节序列与整数搬进搬出，真正的内存生命周期与位运算集中在本 crate。
//!
//! # 设计概要（How）
//! - `storage` 模块实现 `SecureStorage`：可失败分配、`Drop` 时先清零再释放；
//! - `buffer` 模块实现 `MemBuffer` 状态机（未初始化 → 已分配 → 已释放）及全部派生运算；
//! - `bound_view` 模块实现 `BoundView`：借助 `Arc` 持有属主，只读引用其中一段区域；
//! - `bits` 模块集中 MSB 优先的位编号算法，`lshift` 与 `slice` 共享同一套约定。
//!
//! # 契约说明（What）
//! - 所有运算同步、有界；校验先于任何修改，失败时接收者状态保持不变；
//! - 所有释放路径（显式 `release`、`Drop`、`assign` 重新分配、错误路径）都会先清零再归还内存；
//! - 类型不提供内部锁，可变操作依赖 `&mut` 借用规则串行化。

extern crate alloc;

pub mod bits;
mod bound_view;
mod buffer;
pub mod error;
mod options;
mod payload;
mod storage;

pub use bound_view::BoundView;
pub use buffer::{BufferState, MemBuffer};
pub use error::{MemoryError, Result};
pub use options::BufferOptions;
pub use payload::{Payload, PayloadKind};
pub use storage::SecretBytes;
