use alloc::{string::String, sync::Arc};
use core::{fmt, mem};

use tracing::{debug, trace};
use zeroize::{Zeroize, Zeroizing};

use crate::{
    BoundView, BufferOptions, MemoryError, Payload, PayloadKind, Result, SecretBytes, bits,
    storage::{SecureStorage, try_secret_copy},
};

/// 缓冲生命周期状态。
///
/// - `Uninitialized`：尚未持有存储，等同于宿主“已创建未初始化”的对象；
/// - `Allocated`：持有存储与负载标签，可执行全部运算；
/// - `Released`：终态，存储已清零并归还，除再次 `release` 外的任何操作都会失败。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferState {
    Uninitialized,
    Allocated,
    Released,
}

/// 内部槽位：状态与其附带数据绑定在一起，不存在“已释放却仍有存储”的组合。
enum Slot {
    Uninitialized,
    Allocated {
        storage: SecureStorage,
        kind: PayloadKind,
    },
    Released,
}

/// `MemBuffer` 是可按位寻址、可安全擦除的内存缓冲。
///
/// # 设计动机（Why）
/// - 敏感数据需要一块独占的存储：写入、派生、清除都在这块存储上完成，
///   离开作用域或显式释放时必须先清零再归还，不留下可被复用的残留。
/// - 上层以此实现密钥流等流程，因此 XOR、按位左移、拼接、按位切片要严格遵循
///   MSB 优先的位编号，并在边界处给出确定的补零/丢弃语义。
///
/// # 架构关系（How）
/// - `slot` 承载三态状态机；存储由 [`SecureStorage`] 独占，其 `Drop` 负责清零；
/// - 派生运算总是分配全新缓冲，失败时部分构造的存储随 `?` 提前返回被 `Drop` 清零；
/// - `options` 控制输出上限，派生缓冲继承接收者的配置；
/// - 需要共享只读访问时，将缓冲放入 `Arc` 并通过 [`MemBuffer::bind_view`] 产出 [`BoundView`]。
///
/// # 契约说明（What）
/// - 校验先于修改：`assign` 与所有派生运算失败时接收者保持原状；
/// - 任何操作数的负载标签不是文本（包括未设置）时返回 [`MemoryError::TypeMismatch`]；
/// - 类型本身不加锁，可变操作需要 `&mut self`，跨线程共享需由调用方串行化。
pub struct MemBuffer {
    slot: Slot,
    options: BufferOptions,
}

impl MemBuffer {
    /// 创建未初始化的缓冲，之后通过 [`assign`](Self::assign) 写入内容。
    pub fn new() -> Self {
        Self::with_state(Slot::Uninitialized, BufferOptions::default())
    }

    /// 以文本负载构造缓冲，存储恰好为 `value` 的长度。
    ///
    /// # 契约说明
    /// - 非文本输入返回 [`MemoryError::TypeMismatch`]，不产生任何缓冲；
    /// - 分配失败返回 [`MemoryError::OutOfMemory`]。
    pub fn construct<'a>(value: impl Into<Payload<'a>>) -> Result<Self> {
        Self::with_options(value, BufferOptions::default())
    }

    /// 与 [`construct`](Self::construct) 相同，但使用自定义配置。
    pub fn with_options<'a>(value: impl Into<Payload<'a>>, options: BufferOptions) -> Result<Self> {
        const OP: &str = "construct";
        let payload = value.into();
        let bytes = payload.require_text(OP).inspect_err(log_rejection)?;
        let storage = SecureStorage::try_from_parts(&[bytes], OP)?;
        debug!(size = storage.len(), "buffer allocated");
        Ok(Self::from_text_storage(storage, options))
    }

    /// 替换缓冲内容。
    ///
    /// # 执行逻辑（How）
    /// 1. 先校验输入为文本，失败时不触碰现有状态；
    /// 2. 长度不变时原地覆盖；
    /// 3. 长度变化时分配新存储并拷贝，成功后才替换槽位，旧存储在替换时清零释放。
    ///
    /// # 契约说明（What）
    /// - 未初始化的缓冲在成功后进入 `Allocated`；
    /// - 已释放的缓冲返回 [`MemoryError::Released`]；
    /// - 分配失败返回 [`MemoryError::OutOfMemory`]，原内容保持不变。
    pub fn assign<'a>(&mut self, value: impl Into<Payload<'a>>) -> Result<()> {
        const OP: &str = "assign";
        if matches!(self.slot, Slot::Released) {
            return Err(MemoryError::Released { operation: OP });
        }
        let payload = value.into();
        let bytes = payload.require_text(OP).inspect_err(log_rejection)?;

        if let Slot::Allocated { storage, kind } = &mut self.slot {
            if storage.len() == bytes.len() {
                storage.overwrite(bytes);
                *kind = PayloadKind::Text;
                trace!(size = bytes.len(), "buffer overwritten in place");
                return Ok(());
            }
        }

        let storage = SecureStorage::try_from_parts(&[bytes], OP)?;
        debug!(size = storage.len(), "buffer reallocated");
        self.slot = Slot::Allocated {
            storage,
            kind: PayloadKind::Text,
        };
        Ok(())
    }

    /// 原地清零，长度与标签不变；无存储时为空操作。
    pub fn clear(&mut self) {
        if let Slot::Allocated { storage, .. } = &mut self.slot {
            storage.wipe();
            trace!(size = storage.len(), "buffer cleared");
        }
    }

    /// 返回内容的独立副本，副本离开作用域时自动清零。
    ///
    /// # 契约说明
    /// - 要求文本负载；
    /// - 长度超过 [`BufferOptions::max_value_len`] 时返回 [`MemoryError::SizeOverflow`]；
    /// - 副本分配失败时返回 [`MemoryError::OutOfMemory`]。
    pub fn value(&self) -> Result<SecretBytes> {
        const OP: &str = "value";
        let storage = self.require_text(OP)?;
        self.check_output_len(storage.len(), OP)?;
        try_secret_copy(storage.as_slice(), OP)
    }

    /// 将内容按 UTF-8 解码为文本副本。
    ///
    /// 非法 UTF-8 返回 [`MemoryError::InvalidText`]，被拒绝的中间副本同样会清零。
    pub fn text(&self) -> Result<Zeroizing<String>> {
        const OP: &str = "text";
        let mut bytes = self.value()?;
        let raw = mem::take(&mut *bytes);
        String::from_utf8(raw).map(Zeroizing::new).map_err(|err| {
            let valid_up_to = err.utf8_error().valid_up_to();
            let mut rejected = err.into_bytes();
            rejected.zeroize();
            let err = MemoryError::InvalidText {
                operation: OP,
                valid_up_to,
            };
            log_rejection(&err);
            err
        })
    }

    /// 逐字节异或，产生等长的新缓冲。
    ///
    /// 两侧长度必须一致，不做截断或填充；否则返回 [`MemoryError::SizeMismatch`]。
    pub fn xor(&self, other: &MemBuffer) -> Result<MemBuffer> {
        const OP: &str = "xor";
        let left = self.require_text(OP)?;
        let right = other.require_text(OP)?;
        if left.len() != right.len() {
            let err = MemoryError::SizeMismatch {
                operation: OP,
                left: left.len(),
                right: right.len(),
            };
            log_rejection(&err);
            return Err(err);
        }

        let mut storage = SecureStorage::try_zeroed(left.len(), OP)?;
        for ((out, a), b) in storage
            .as_mut_slice()
            .iter_mut()
            .zip(left.as_slice())
            .zip(right.as_slice())
        {
            *out = a ^ b;
        }
        trace!(size = storage.len(), "xor derived");
        Ok(self.derive(storage))
    }

    /// 将整个缓冲视作连续位串左移 `shift_bits` 位，产生等长的新缓冲。
    ///
    /// # 契约说明（What）
    /// - `shift_bits` 必须为正，否则返回 [`MemoryError::InvalidArgument`]；
    /// - 位移量不小于总位数时结果全零；
    /// - 右侧空出的位补零，越过左边界的位丢弃。
    pub fn lshift(&self, shift_bits: i64) -> Result<MemBuffer> {
        const OP: &str = "lshift";
        let source = self.require_text(OP)?;
        if shift_bits <= 0 {
            let err = MemoryError::InvalidArgument {
                operation: OP,
                argument: "shift",
                value: shift_bits,
            };
            log_rejection(&err);
            return Err(err);
        }

        let mut storage = SecureStorage::try_zeroed(source.len(), OP)?;
        bits::shift_left_into(
            source.as_slice(),
            shift_bits.unsigned_abs(),
            storage.as_mut_slice(),
        );
        trace!(size = storage.len(), shift_bits, "lshift derived");
        Ok(self.derive(storage))
    }

    /// 拼接：结果前半为 `self` 的内容，后半为 `other` 的内容。
    pub fn concat(&self, other: &MemBuffer) -> Result<MemBuffer> {
        const OP: &str = "concat";
        let head = self.require_text(OP)?;
        let tail = other.require_text(OP)?;
        let storage = SecureStorage::try_from_parts(&[head.as_slice(), tail.as_slice()], OP)?;
        trace!(size = storage.len(), "concat derived");
        Ok(self.derive(storage))
    }

    /// 从位 `origin_bit` 起取 `length_bits` 位，紧凑写入 `ceil(length_bits / 8)` 字节的新缓冲。
    ///
    /// # 契约说明（What）
    /// - `origin_bit >= 0` 且 `length_bits > 0`，否则返回 [`MemoryError::InvalidArgument`]；
    /// - `origin_bit + length_bits` 超过总位数时返回 [`MemoryError::OutOfRange`]；
    /// - 结果缓冲以零初始化，最后一个字节中未被覆盖的低位为零。
    pub fn slice(&self, origin_bit: i64, length_bits: i64) -> Result<MemBuffer> {
        const OP: &str = "slice";
        let source = self.require_text(OP)?;
        let invalid = if origin_bit < 0 {
            Some(("origin", origin_bit))
        } else if length_bits <= 0 {
            Some(("length", length_bits))
        } else {
            None
        };
        if let Some((argument, value)) = invalid {
            let err = MemoryError::InvalidArgument {
                operation: OP,
                argument,
                value,
            };
            log_rejection(&err);
            return Err(err);
        }

        let origin = origin_bit.unsigned_abs();
        let length = length_bits.unsigned_abs();
        let end = u128::from(origin) + u128::from(length);
        let total_bits = source.len() as u128 * 8;
        if end > total_bits {
            let err = MemoryError::OutOfRange {
                operation: OP,
                end,
                limit: total_bits,
            };
            log_rejection(&err);
            return Err(err);
        }

        // `length <= total_bits`，而总位数来自一个 `usize` 长度，因此字节数必然落在 `usize` 内。
        let out_len = usize::try_from(length.div_ceil(8)).map_err(|_| MemoryError::OutOfMemory {
            operation: OP,
            requested: usize::MAX,
        })?;
        let mut storage = SecureStorage::try_zeroed(out_len, OP)?;
        bits::extract_bits(source.as_slice(), origin, length, storage.as_mut_slice());
        trace!(size = out_len, origin_bit, length_bits, "slice derived");
        Ok(self.derive(storage))
    }

    /// 返回字节数；要求文本负载。
    pub fn byte_size(&self) -> Result<usize> {
        self.require_text("byte_size").map(SecureStorage::len)
    }

    /// 清零并归还存储，进入终态 `Released`。
    ///
    /// 重复调用是安全的：第二次调用没有存储可归还，不会重复释放。
    pub fn release(&mut self) {
        let previous = mem::replace(&mut self.slot, Slot::Released);
        if let Slot::Allocated { storage, .. } = previous {
            let size = storage.len();
            drop(storage);
            debug!(size, "buffer released");
        }
    }

    /// 基于共享句柄产出只读视图，区域为 `[offset, offset + len)` 字节。
    pub fn bind_view(self: &Arc<Self>, offset: usize, len: usize) -> Result<BoundView> {
        BoundView::bind(Arc::clone(self), offset, len)
    }

    /// 当前生命周期状态。
    pub fn state(&self) -> BufferState {
        match self.slot {
            Slot::Uninitialized => BufferState::Uninitialized,
            Slot::Allocated { .. } => BufferState::Allocated,
            Slot::Released => BufferState::Released,
        }
    }

    /// 当前负载标签；未初始化或已释放时为 `None`。
    pub fn kind(&self) -> Option<PayloadKind> {
        match &self.slot {
            Slot::Allocated { kind, .. } => Some(*kind),
            Slot::Uninitialized | Slot::Released => None,
        }
    }

    /// 是否不持有任何字节。
    pub fn is_empty(&self) -> bool {
        self.stored_bytes().is_empty()
    }

    pub fn options(&self) -> BufferOptions {
        self.options
    }

    /// 存储的原始字节，不做负载校验；供视图读取。
    pub(crate) fn stored_bytes(&self) -> &[u8] {
        match &self.slot {
            Slot::Allocated { storage, .. } => storage.as_slice(),
            Slot::Uninitialized | Slot::Released => &[],
        }
    }

    pub(crate) fn check_output_len(&self, size: usize, operation: &'static str) -> Result<()> {
        let limit = self.options.max_value_len;
        if size > limit {
            let err = MemoryError::SizeOverflow {
                operation,
                size,
                limit,
            };
            log_rejection(&err);
            return Err(err);
        }
        Ok(())
    }

    fn require_text(&self, operation: &'static str) -> Result<&SecureStorage> {
        let result = match &self.slot {
            Slot::Allocated { storage, kind } if kind.is_text() => Ok(storage),
            Slot::Allocated { kind, .. } => Err(MemoryError::TypeMismatch {
                operation,
                found: kind.label(),
            }),
            Slot::Uninitialized => Err(MemoryError::TypeMismatch {
                operation,
                found: "unset",
            }),
            Slot::Released => Err(MemoryError::Released { operation }),
        };
        result.inspect_err(log_rejection)
    }

    fn derive(&self, storage: SecureStorage) -> MemBuffer {
        Self::from_text_storage(storage, self.options)
    }

    fn from_text_storage(storage: SecureStorage, options: BufferOptions) -> Self {
        Self::with_state(
            Slot::Allocated {
                storage,
                kind: PayloadKind::Text,
            },
            options,
        )
    }

    fn with_state(slot: Slot, options: BufferOptions) -> Self {
        Self { slot, options }
    }
}

impl Default for MemBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemBuffer")
            .field("state", &self.state())
            .field("kind", &self.kind())
            .field("size", &self.stored_bytes().len())
            .finish_non_exhaustive()
    }
}

fn log_rejection(err: &MemoryError) {
    debug!(code = err.code(), operation = err.operation(), "operation rejected");
}
