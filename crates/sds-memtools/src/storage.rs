use alloc::vec::Vec;

use zeroize::{Zeroize, Zeroizing};

use crate::{MemoryError, Result};

/// 对外返回的字节副本，离开作用域时自动清零。
pub type SecretBytes = Zeroizing<Vec<u8>>;

/// `SecureStorage` 是缓冲唯一拥有的原始字节存储。
///
/// # 设计动机（Why）
/// - 敏感数据的每条释放路径（显式释放、整体 `Drop`、重新分配、错误路径清理）都必须“先清零、再归还”，
///   把这条约束收敛到一个类型的 `Drop` 中，调用方就不可能遗漏。
/// - 分配必须可失败：内存不足时返回 [`MemoryError::OutOfMemory`]，而不是让进程中止。
///
/// # 结构设计（How）
/// - 内部为精确容量的 `Vec<u8>`，所有构造都经由 `try_reserve_exact`；
/// - 从不原地扩容：长度变化一律分配新存储，旧存储随 `Drop` 清零，
///   因此不会有残留副本被 `realloc` 悄悄搬走。
///
/// # 契约说明（What）
/// - `len() == 0` 当且仅当未持有任何堆内存；
/// - `Drop` 会把整块容量（含未使用的部分）写零后再释放。
pub(crate) struct SecureStorage {
    bytes: Vec<u8>,
}

impl SecureStorage {
    /// 分配 `len` 个零字节。
    pub(crate) fn try_zeroed(len: usize, operation: &'static str) -> Result<Self> {
        let mut bytes = reserve_exact(len, operation)?;
        bytes.resize(len, 0);
        Ok(Self { bytes })
    }

    /// 依次拷贝各片段，构造恰好容纳全部内容的新存储。
    ///
    /// 总长度溢出 `usize` 时视为分配失败。
    pub(crate) fn try_from_parts(parts: &[&[u8]], operation: &'static str) -> Result<Self> {
        let total = parts
            .iter()
            .try_fold(0usize, |acc, part| acc.checked_add(part.len()))
            .ok_or(MemoryError::OutOfMemory {
                operation,
                requested: usize::MAX,
            })?;
        let mut bytes = reserve_exact(total, operation)?;
        for part in parts {
            bytes.extend_from_slice(part);
        }
        Ok(Self { bytes })
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// 等长覆盖写入，不触发分配。
    pub(crate) fn overwrite(&mut self, src: &[u8]) {
        debug_assert_eq!(self.bytes.len(), src.len());
        self.bytes.copy_from_slice(src);
    }

    /// 原地清零，长度不变。
    pub(crate) fn wipe(&mut self) {
        self.bytes.as_mut_slice().zeroize();
    }
}

impl Drop for SecureStorage {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// 以可失败分配复制出一份自动清零的字节副本。
pub(crate) fn try_secret_copy(src: &[u8], operation: &'static str) -> Result<SecretBytes> {
    let mut bytes = reserve_exact(src.len(), operation)?;
    bytes.extend_from_slice(src);
    Ok(Zeroizing::new(bytes))
}

fn reserve_exact(len: usize, operation: &'static str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(len)
        .map_err(|_| MemoryError::OutOfMemory {
            operation,
            requested: len,
        })?;
    Ok(bytes)
}
