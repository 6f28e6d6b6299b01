//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 为缓冲与视图对外暴露的失败语义提供集中定义，绑定层据此映射到宿主的异常体系；
//! - 错误集合是封闭的：调用方可以穷举处理，不存在“致命”类别，所有情况均可恢复。
//!
//! ## 设计要求（What）
//! - 变体派生 [`thiserror::Error`]，关闭默认特性后依旧可在 `no_std + alloc` 下编译；
//! - 每个变体携带触发它的操作名及相关尺寸，便于排障但绝不携带缓冲内容；
//! - [`MemoryError::code`] 返回 `<领域>.<语义>` 形式的稳定错误码，供日志与绑定层分类。

use thiserror::Error;

/// 稳定错误码集合。
///
/// 错误码遵循 `<领域>.<语义>` 命名约定，一旦发布不得修改字面值。
pub mod codes {
    /// 操作数的负载类型不是文本，或根本未设置。
    pub const TYPE_MISMATCH: &str = "memory.type_mismatch";
    /// XOR 操作数长度不一致。
    pub const SIZE_MISMATCH: &str = "memory.size_mismatch";
    /// 位移量、起点或长度为非法值。
    pub const INVALID_ARGUMENT: &str = "memory.invalid_argument";
    /// 请求的窗口超出缓冲总长度。
    pub const OUT_OF_RANGE: &str = "memory.out_of_range";
    /// 分配或重新分配失败。
    pub const OUT_OF_MEMORY: &str = "memory.out_of_memory";
    /// 缓冲长度超过可表示的输出长度。
    pub const SIZE_OVERFLOW: &str = "memory.size_overflow";
    /// 视图从未绑定到任何区域。
    pub const NULL_REFERENCE: &str = "memory.null_reference";
    /// 内容无法按 UTF-8 解码为文本。
    pub const INVALID_TEXT: &str = "memory.invalid_text";
    /// 缓冲已释放后仍被使用。
    pub const RELEASED: &str = "memory.released";
}

/// 内存缓冲核心错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：把类型校验、尺寸校验、参数校验与分配失败归并为一个可穷举的枚举，
///   让绑定层无需解析字符串即可选择宿主异常类型；
/// - **契约 (What)**：所有变体均为 `Send + Sync + 'static`，可 `Clone` 与比较，便于测试断言；
///   `operation` 字段总是触发错误的公开操作名（如 `"xor"`、`"slice"`）；
/// - **风险 (Trade-offs)**：位长度使用 `u128` 承载，避免 `size * 8` 在极端尺寸下溢出，代价是字段稍宽。
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum MemoryError {
    /// 操作要求文本负载，但接收者或操作数不是文本。
    ///
    /// `found` 为实际看到的负载标签：`"integer"`、`"unset"` 等。
    #[error("`{operation}` requires a text payload, found {found}")]
    TypeMismatch {
        operation: &'static str,
        found: &'static str,
    },

    /// XOR 两侧长度不一致，不做隐式截断或填充。
    #[error("`{operation}` operands differ in size: {left} vs {right} bytes")]
    SizeMismatch {
        operation: &'static str,
        left: usize,
        right: usize,
    },

    /// 整数参数不满足正数/非负约束。
    #[error("`{operation}` rejected argument `{argument}` = {value}")]
    InvalidArgument {
        operation: &'static str,
        argument: &'static str,
        value: i64,
    },

    /// 窗口终点越过上限。
    ///
    /// 对 `slice` 而言单位是位；对视图绑定而言单位是字节。
    #[error("`{operation}` window ends at {end}, beyond the limit of {limit}")]
    OutOfRange {
        operation: &'static str,
        end: u128,
        limit: u128,
    },

    /// 分配器无法提供请求的字节数。
    #[error("`{operation}` failed to allocate {requested} bytes")]
    OutOfMemory {
        operation: &'static str,
        requested: usize,
    },

    /// 缓冲长度超过当前配置允许输出的最大长度。
    #[error("`{operation}` cannot produce {size} bytes, limit is {limit}")]
    SizeOverflow {
        operation: &'static str,
        size: usize,
        limit: usize,
    },

    /// 视图尚未绑定区域。
    #[error("`{operation}` on a view that was never bound")]
    NullReference { operation: &'static str },

    /// 内容不是合法 UTF-8。
    #[error("`{operation}` found invalid UTF-8 after {valid_up_to} bytes")]
    InvalidText {
        operation: &'static str,
        valid_up_to: usize,
    },

    /// 缓冲已进入终态 `Released`。
    #[error("`{operation}` on a released buffer")]
    Released { operation: &'static str },
}

impl MemoryError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            MemoryError::TypeMismatch { .. } => codes::TYPE_MISMATCH,
            MemoryError::SizeMismatch { .. } => codes::SIZE_MISMATCH,
            MemoryError::InvalidArgument { .. } => codes::INVALID_ARGUMENT,
            MemoryError::OutOfRange { .. } => codes::OUT_OF_RANGE,
            MemoryError::OutOfMemory { .. } => codes::OUT_OF_MEMORY,
            MemoryError::SizeOverflow { .. } => codes::SIZE_OVERFLOW,
            MemoryError::NullReference { .. } => codes::NULL_REFERENCE,
            MemoryError::InvalidText { .. } => codes::INVALID_TEXT,
            MemoryError::Released { .. } => codes::RELEASED,
        }
    }

    /// 返回触发错误的操作名。
    pub fn operation(&self) -> &'static str {
        match self {
            MemoryError::TypeMismatch { operation, .. }
            | MemoryError::SizeMismatch { operation, .. }
            | MemoryError::InvalidArgument { operation, .. }
            | MemoryError::OutOfRange { operation, .. }
            | MemoryError::OutOfMemory { operation, .. }
            | MemoryError::SizeOverflow { operation, .. }
            | MemoryError::NullReference { operation }
            | MemoryError::InvalidText { operation, .. }
            | MemoryError::Released { operation } => operation,
        }
    }
}

/// `Result` 为本 crate 统一的返回值别名，默认错误类型为 [`MemoryError`]。
pub type Result<T, E = MemoryError> = core::result::Result<T, E>;
