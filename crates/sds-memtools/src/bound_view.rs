use alloc::sync::Arc;
use core::fmt;

use tracing::trace;

use crate::{BufferState, MemBuffer, MemoryError, Result, SecretBytes, storage::try_secret_copy};

/// `BoundView` 是对另一块 [`MemBuffer`] 存储的只读、非拥有引用。
///
/// # 设计动机（Why）
/// - 上层有时只需要把缓冲中的一段区域交给他人读取，复制整块数据既浪费又多出一份需要擦除的副本；
/// - 视图必须保证在自身存活期间，被引用的区域不会被释放或改写。
///
/// # 结构设计（How）
/// - `binding` 记录属主句柄 `Arc<MemBuffer>` 与区域 `[offset, offset + len)`；
/// - 属主被 `Arc` 共享期间无法取得 `&mut MemBuffer`，因此既不能 `assign`、`clear`，也不能 `release`：
///   区域有效性由所有权结构保证，而不是每次读取时再检查；
/// - 视图销毁时只归还一次 `Arc` 计数，从不直接释放属主的存储，
///   最后一个句柄消失时由属主自身的 `Drop` 完成清零。
///
/// # 契约说明（What）
/// - 绑定时校验一次区域不越界，越界返回 [`MemoryError::OutOfRange`]；
/// - 通过 [`Default`] 得到的视图从未绑定，`value()` 返回 [`MemoryError::NullReference`]。
#[derive(Default)]
pub struct BoundView {
    binding: Option<Binding>,
}

struct Binding {
    owner: Arc<MemBuffer>,
    offset: usize,
    len: usize,
}

impl BoundView {
    /// 绑定属主中 `[offset, offset + len)` 字节的区域。
    ///
    /// # 契约说明
    /// - 属主已释放时返回 [`MemoryError::Released`]；
    /// - 区域终点超出属主当前长度时返回 [`MemoryError::OutOfRange`]，此时属主句柄随错误路径归还。
    pub fn bind(owner: Arc<MemBuffer>, offset: usize, len: usize) -> Result<Self> {
        const OP: &str = "bind";
        if owner.state() == BufferState::Released {
            return Err(MemoryError::Released { operation: OP });
        }
        let limit = owner.stored_bytes().len();
        let end = offset.checked_add(len).filter(|end| *end <= limit);
        if end.is_none() {
            return Err(MemoryError::OutOfRange {
                operation: OP,
                end: offset as u128 + len as u128,
                limit: limit as u128,
            });
        }
        trace!(offset, len, "view bound");
        Ok(Self {
            binding: Some(Binding { owner, offset, len }),
        })
    }

    /// 返回区域内容的独立副本，副本离开作用域时自动清零。
    ///
    /// # 契约说明
    /// - 未绑定时返回 [`MemoryError::NullReference`]；
    /// - 区域长度超过属主配置的输出上限时返回 [`MemoryError::SizeOverflow`]；
    /// - 副本分配失败时返回 [`MemoryError::OutOfMemory`]。
    pub fn value(&self) -> Result<SecretBytes> {
        const OP: &str = "value";
        let binding = self
            .binding
            .as_ref()
            .ok_or(MemoryError::NullReference { operation: OP })?;
        binding.owner.check_output_len(binding.len, OP)?;
        let region = binding
            .owner
            .stored_bytes()
            .get(binding.offset..binding.offset + binding.len)
            .ok_or(MemoryError::OutOfRange {
                operation: OP,
                end: binding.offset as u128 + binding.len as u128,
                limit: binding.owner.stored_bytes().len() as u128,
            })?;
        try_secret_copy(region, OP)
    }

    /// 是否已绑定区域。
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// 区域字节数；未绑定时为 0。
    pub fn len(&self) -> usize {
        self.binding.as_ref().map_or(0, |binding| binding.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 属主句柄。
    pub fn owner(&self) -> Option<&Arc<MemBuffer>> {
        self.binding.as_ref().map(|binding| &binding.owner)
    }
}

impl Drop for BoundView {
    fn drop(&mut self) {
        if let Some(binding) = self.binding.take() {
            let remaining = Arc::strong_count(&binding.owner) - 1;
            drop(binding);
            trace!(remaining_owners = remaining, "view dropped");
        }
    }
}

impl fmt::Debug for BoundView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.binding {
            Some(binding) => f
                .debug_struct("BoundView")
                .field("offset", &binding.offset)
                .field("len", &binding.len)
                .finish_non_exhaustive(),
            None => f.write_str("BoundView(unbound)"),
        }
    }
}
