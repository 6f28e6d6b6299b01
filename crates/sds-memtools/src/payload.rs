use alloc::{borrow::Cow, string::String, vec::Vec};
use core::fmt;

use zeroize::Zeroize;

use crate::{MemoryError, Result};

/// 缓冲负载种类。
///
/// # 教案式说明
/// - **意图 (Why)**：以封闭的和类型取代散落的整型标签，新增种类时既有的 `is_text` 校验点无需改动；
/// - **契约 (What)**：当前唯一可产生的种类是 [`PayloadKind::Text`]；
///   标注 `#[non_exhaustive]`，下游匹配必须带兜底分支。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PayloadKind {
    /// 文本负载，`value()` 返回的字节可按文本解读。
    Text,
}

impl PayloadKind {
    /// 是否为文本负载。
    pub fn is_text(self) -> bool {
        matches!(self, PayloadKind::Text)
    }

    /// 用于错误信息的稳定标签。
    pub fn label(self) -> &'static str {
        match self {
            PayloadKind::Text => "text",
        }
    }
}

/// 绑定层交给核心的输入值。
///
/// # 设计动机（Why）
/// - 宿主侧的调用方既可能传入文本，也可能误传整数（例如直接把常量交给构造函数）；
///   核心需要在不触碰任何状态的前提下拒绝后者。
///
/// # 契约说明（What）
/// - `Text`：任意字节序列，可借用也可拥有；
/// - `Integer`：非文本值，任何接受负载的操作都会以 [`MemoryError::TypeMismatch`] 拒绝；
/// - 拥有所有权的文本副本在 `Drop` 时清零，借用的切片由调用方负责。
pub enum Payload<'a> {
    Text(Cow<'a, [u8]>),
    Integer(i64),
}

impl Payload<'_> {
    /// 输入对应的负载种类；非文本输入返回 `None`。
    pub fn kind(&self) -> Option<PayloadKind> {
        match self {
            Payload::Text(_) => Some(PayloadKind::Text),
            Payload::Integer(_) => None,
        }
    }

    /// 取出文本字节，非文本输入返回类型不匹配错误。
    pub(crate) fn require_text(&self, operation: &'static str) -> Result<&[u8]> {
        match self {
            Payload::Text(bytes) => Ok(bytes.as_ref()),
            Payload::Integer(_) => Err(MemoryError::TypeMismatch {
                operation,
                found: "integer",
            }),
        }
    }
}

impl Drop for Payload<'_> {
    fn drop(&mut self) {
        if let Payload::Text(Cow::Owned(bytes)) = self {
            bytes.zeroize();
        }
    }
}

impl fmt::Debug for Payload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Text(bytes) => f
                .debug_struct("Text")
                .field("len", &bytes.len())
                .finish_non_exhaustive(),
            Payload::Integer(_) => f.debug_struct("Integer").finish_non_exhaustive(),
        }
    }
}

impl<'a> From<&'a str> for Payload<'a> {
    fn from(value: &'a str) -> Self {
        Payload::Text(Cow::Borrowed(value.as_bytes()))
    }
}

impl<'a> From<&'a [u8]> for Payload<'a> {
    fn from(value: &'a [u8]) -> Self {
        Payload::Text(Cow::Borrowed(value))
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Payload<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        Payload::Text(Cow::Borrowed(value.as_slice()))
    }
}

impl From<Vec<u8>> for Payload<'_> {
    fn from(value: Vec<u8>) -> Self {
        Payload::Text(Cow::Owned(value))
    }
}

impl From<String> for Payload<'_> {
    fn from(value: String) -> Self {
        Payload::Text(Cow::Owned(value.into_bytes()))
    }
}

impl From<i64> for Payload<'_> {
    fn from(value: i64) -> Self {
        Payload::Integer(value)
    }
}
