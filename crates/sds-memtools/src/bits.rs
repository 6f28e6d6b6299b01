//! MSB 优先的位编号算法。
//!
//! # 教案式说明
//! - **约定 (What)**：把字节序列视为一条连续的位串，位索引 0 是第 0 字节的最高位，
//!   索引 `8k + j` 是第 `k` 字节从高位数起的第 `j` 位；`lshift` 与 `slice` 共享这一约定。
//! - **实现 (How)**：按字节而非逐位搬运：目标字节由相邻两个源字节拼出，
//!   `hi << r | lo >> (8 - r)`，越界的源字节视为 0。
//! - **前置条件**：调用方负责参数校验（正数位移、窗口不越界）与目标缓冲的分配。

/// 读取位索引 `index` 处的位；越过末尾的索引读作 `false`。
pub fn bit_at(bytes: &[u8], index: u64) -> bool {
    let Ok(byte_index) = usize::try_from(index / 8) else {
        return false;
    };
    let offset = (index % 8) as u32;
    bytes
        .get(byte_index)
        .is_some_and(|byte| (byte >> (7 - offset)) & 1 == 1)
}

/// 把 `src` 整体左移 `shift_bits` 位写入等长的 `dst`。
///
/// 目标位 `i` 取源位 `i + shift_bits`；右侧空出的位补零，越过左边界的位丢弃。
/// 位移量不小于总位数时 `dst` 全零。
pub fn shift_left_into(src: &[u8], shift_bits: u64, dst: &mut [u8]) {
    debug_assert_eq!(src.len(), dst.len());
    let byte_shift = match usize::try_from(shift_bits / 8) {
        Ok(n) if n < src.len() => n,
        _ => {
            dst.fill(0);
            return;
        }
    };
    let bit_shift = (shift_bits % 8) as u32;
    let kept = src.len() - byte_shift;
    for (i, out) in dst.iter_mut().enumerate() {
        *out = if i < kept {
            splice(src, i + byte_shift, bit_shift)
        } else {
            0
        };
    }
}

/// 从 `src` 的位 `origin_bit` 起取 `length_bits` 位，按 MSB 优先紧凑写入 `dst`。
///
/// `dst` 长度应为 `ceil(length_bits / 8)`；最后一个字节中未被覆盖的低位保持为零。
pub fn extract_bits(src: &[u8], origin_bit: u64, length_bits: u64, dst: &mut [u8]) {
    let Ok(first) = usize::try_from(origin_bit / 8) else {
        dst.fill(0);
        return;
    };
    let bit_offset = (origin_bit % 8) as u32;
    for (j, out) in dst.iter_mut().enumerate() {
        *out = splice(src, first.saturating_add(j), bit_offset);
    }
    let tail = (length_bits % 8) as u32;
    if tail != 0 {
        if let Some(last) = dst.last_mut() {
            *last &= 0xFF_u8 << (8 - tail);
        }
    }
}

/// 以字节 `index` 为高位、`index + 1` 为低位，取偏移 `offset` 处开始的 8 位。
fn splice(src: &[u8], index: usize, offset: u32) -> u8 {
    let hi = src.get(index).copied().unwrap_or(0);
    if offset == 0 {
        return hi;
    }
    let lo = src
        .get(index.saturating_add(1))
        .copied()
        .unwrap_or(0);
    (hi << offset) | (lo >> (8 - offset))
}
