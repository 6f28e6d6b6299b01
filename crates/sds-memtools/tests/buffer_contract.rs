//! `buffer_contract` 集成测试：以外部 crate 视角验证 `MemBuffer` 的生命周期与运算契约。
//!
//! # 测试目标（Why）
//! - 覆盖构造、赋值、清零、释放的状态迁移，确保失败路径不会改动接收者；
//! - 固化 XOR、左移、拼接、切片在边界处的补零/丢弃语义与错误码；
//! - 以具体字节场景锁定 MSB 优先的位编号，防止重构时悄悄改变约定。

use sds_memtools::{BufferOptions, BufferState, MemBuffer, MemoryError, PayloadKind};

/// 帮助函数：构造文本缓冲。
fn buf(bytes: &[u8]) -> MemBuffer {
    MemBuffer::construct(bytes).expect("文本构造不应失败")
}

/// 帮助函数：取出内容副本。
fn bytes_of(buffer: &MemBuffer) -> Vec<u8> {
    buffer.value().expect("读取内容不应失败").to_vec()
}

#[test]
fn construct_round_trips_text() {
    let buffer = MemBuffer::construct("AB").expect("构造不应失败");
    assert_eq!(bytes_of(&buffer), b"AB");
    assert_eq!(buffer.byte_size(), Ok(2));
    assert_eq!(buffer.state(), BufferState::Allocated);
    assert_eq!(buffer.kind(), Some(PayloadKind::Text));
}

#[test]
fn construct_accepts_empty_payload() {
    let buffer = buf(b"");
    assert!(buffer.is_empty());
    assert_eq!(buffer.byte_size(), Ok(0));
    assert!(bytes_of(&buffer).is_empty());
}

/// 整数不是文本：构造失败且不产生缓冲。
#[test]
fn construct_rejects_integer_payload() {
    let err = MemBuffer::construct(1631_i64).expect_err("整数负载应被拒绝");
    assert_eq!(
        err,
        MemoryError::TypeMismatch {
            operation: "construct",
            found: "integer"
        }
    );
    assert_eq!(err.code(), "memory.type_mismatch");
}

#[test]
fn uninitialized_buffer_has_no_tag() {
    let buffer = MemBuffer::new();
    assert_eq!(buffer.state(), BufferState::Uninitialized);
    assert!(matches!(
        buffer.value(),
        Err(MemoryError::TypeMismatch { found: "unset", .. })
    ));
    assert!(matches!(
        buffer.byte_size(),
        Err(MemoryError::TypeMismatch { .. })
    ));
}

#[test]
fn assign_initializes_and_replaces_content() {
    let mut buffer = MemBuffer::new();
    buffer.assign("key").expect("首次赋值应成功");
    assert_eq!(buffer.state(), BufferState::Allocated);
    assert_eq!(bytes_of(&buffer), b"key");

    buffer.assign("abc").expect("等长赋值应原地覆盖");
    assert_eq!(bytes_of(&buffer), b"abc");

    buffer.assign("longer value").expect("变长赋值应重新分配");
    assert_eq!(bytes_of(&buffer), b"longer value");

    buffer.assign(String::from("x")).expect("拥有所有权的文本同样可赋值");
    assert_eq!(buffer.byte_size(), Ok(1));
}

/// 赋值校验失败时，原内容与长度保持不变。
#[test]
fn failed_assign_leaves_state_untouched() {
    let mut buffer = buf(b"stay");
    let err = buffer.assign(42_i64).expect_err("整数赋值应失败");
    assert_eq!(err.code(), "memory.type_mismatch");
    assert_eq!(bytes_of(&buffer), b"stay");
    assert_eq!(buffer.byte_size(), Ok(4));
}

#[test]
fn clear_zeroes_content_and_keeps_length() {
    let mut buffer = buf(b"AB");
    buffer.clear();
    assert_eq!(bytes_of(&buffer), [0x00, 0x00]);
    assert_eq!(buffer.byte_size(), Ok(2));
    assert_eq!(buffer.kind(), Some(PayloadKind::Text));
}

#[test]
fn clear_on_empty_buffers_is_noop() {
    let mut empty = buf(b"");
    empty.clear();
    assert_eq!(empty.byte_size(), Ok(0));

    let mut uninitialized = MemBuffer::new();
    uninitialized.clear();
    assert_eq!(uninitialized.state(), BufferState::Uninitialized);
}

#[test]
fn xor_combines_equal_length_buffers() {
    let a = buf(b"\x0f\x00");
    let b = buf(b"\x00\x0f");
    let out = a.xor(&b).expect("等长异或应成功");
    assert_eq!(bytes_of(&out), [0x0f, 0x0f]);
    assert_eq!(bytes_of(&a), [0x0f, 0x00], "派生运算不得修改操作数");
}

#[test]
fn xor_rejects_size_mismatch() {
    let err = buf(b"ab").xor(&buf(b"abc")).expect_err("长度不一致应失败");
    assert_eq!(
        err,
        MemoryError::SizeMismatch {
            operation: "xor",
            left: 2,
            right: 3
        }
    );
}

#[test]
fn xor_rejects_untagged_operand() {
    let err = buf(b"ab").xor(&MemBuffer::new()).expect_err("未初始化操作数应被拒绝");
    assert!(matches!(err, MemoryError::TypeMismatch { operation: "xor", .. }));
}

#[test]
fn lshift_moves_bits_towards_msb() {
    let out = buf(b"\xff").lshift(4).expect("左移应成功");
    assert_eq!(bytes_of(&out), [0xf0]);

    let out = buf(b"\x01\x80").lshift(1).expect("跨字节左移应成功");
    assert_eq!(bytes_of(&out), [0x03, 0x00]);
}

#[test]
fn lshift_beyond_total_bits_yields_zeroes() {
    let source = buf(b"\xff\xff\xff");
    for shift in [24, 25, 1 << 40, i64::MAX] {
        let out = source.lshift(shift).expect("大位移应成功");
        assert_eq!(bytes_of(&out), [0, 0, 0], "位移 {shift} 应得到全零");
    }
}

#[test]
fn lshift_rejects_non_positive_shift() {
    let source = buf(b"\xff");
    for shift in [0, -1, i64::MIN] {
        let err = source.lshift(shift).expect_err("非正位移应失败");
        assert_eq!(
            err,
            MemoryError::InvalidArgument {
                operation: "lshift",
                argument: "shift",
                value: shift
            }
        );
    }
}

/// 拼接顺序为 self 在前、other 在后。
#[test]
fn concat_places_self_before_other() {
    let out = buf(b"head").concat(&buf(b"-tail")).expect("拼接应成功");
    assert_eq!(bytes_of(&out), b"head-tail");
    assert_eq!(out.byte_size(), Ok(9));

    let out = buf(b"").concat(&buf(b"x")).expect("空缓冲拼接应成功");
    assert_eq!(bytes_of(&out), b"x");
}

#[test]
fn concat_rejects_untagged_operand() {
    let err = buf(b"a").concat(&MemBuffer::new()).expect_err("未初始化操作数应被拒绝");
    assert_eq!(err.code(), "memory.type_mismatch");
}

#[test]
fn slice_extracts_unaligned_window() {
    let out = buf(b"\xff\x00").slice(4, 8).expect("切片应成功");
    assert_eq!(bytes_of(&out), [0xf0]);
}

#[test]
fn slice_zero_fills_trailing_bits() {
    let out = buf(b"\xff\xff").slice(3, 10).expect("切片应成功");
    assert_eq!(out.byte_size(), Ok(2));
    assert_eq!(bytes_of(&out), [0xff, 0xc0]);
}

#[test]
fn slice_of_whole_buffer_is_identity() {
    let source = buf(b"\xde\xad\xbe\xef");
    let out = source.slice(0, 32).expect("整体切片应成功");
    assert_eq!(bytes_of(&out), bytes_of(&source));
}

#[test]
fn slice_validates_arguments_before_range() {
    let source = buf(b"\xff");
    assert!(matches!(
        source.slice(-1, 4),
        Err(MemoryError::InvalidArgument { argument: "origin", value: -1, .. })
    ));
    assert!(matches!(
        source.slice(0, 0),
        Err(MemoryError::InvalidArgument { argument: "length", value: 0, .. })
    ));
    assert_eq!(
        source.slice(4, 5).expect_err("越界窗口应失败"),
        MemoryError::OutOfRange {
            operation: "slice",
            end: 9,
            limit: 8
        }
    );
    assert!(source.slice(i64::MAX, i64::MAX).is_err(), "极大参数不得溢出");
    assert!(source.slice(4, 4).is_ok(), "恰好到达末尾的窗口合法");
}

#[test]
fn value_respects_configured_output_limit() {
    let options = BufferOptions::new().with_max_value_len(4);
    let small = MemBuffer::with_options("four", options).expect("构造不应失败");
    assert_eq!(bytes_of(&small), b"four");

    let large = MemBuffer::with_options("seven!!", options).expect("构造本身不受输出上限约束");
    assert_eq!(
        large.value().expect_err("超出上限应失败"),
        MemoryError::SizeOverflow {
            operation: "value",
            size: 7,
            limit: 4
        }
    );

    let derived = small.concat(&small).expect("拼接不应失败");
    assert_eq!(derived.options(), options, "派生缓冲继承配置");
    assert!(matches!(
        derived.value(),
        Err(MemoryError::SizeOverflow { size: 8, .. })
    ));
}

#[test]
fn text_decodes_utf8_content() {
    let buffer = MemBuffer::construct("密钥").expect("构造不应失败");
    assert_eq!(buffer.text().expect("合法 UTF-8 应解码成功").as_str(), "密钥");

    let broken = buf(b"ok\xff");
    assert_eq!(
        broken.text().expect_err("非法 UTF-8 应失败"),
        MemoryError::InvalidText {
            operation: "text",
            valid_up_to: 2
        }
    );
}

/// 释放后进入终态：再次释放安全，其他操作报错。
#[test]
fn release_is_terminal() {
    let mut buffer = buf(b"secret");
    buffer.release();
    assert_eq!(buffer.state(), BufferState::Released);
    assert!(buffer.is_empty());

    buffer.release();
    assert_eq!(buffer.state(), BufferState::Released, "重复释放不得出错");

    let released = |err: MemoryError| err.code() == "memory.released";
    assert!(released(buffer.value().expect_err("释放后读取应失败")));
    assert!(released(buffer.byte_size().expect_err("释放后查询长度应失败")));
    assert!(released(buffer.lshift(1).expect_err("释放后派生应失败")));
    assert!(released(buffer.assign("again").expect_err("释放后赋值应失败")));
    assert!(released(buf(b"x").concat(&buffer).expect_err("已释放操作数应被拒绝")));

    buffer.clear();
    assert_eq!(buffer.state(), BufferState::Released);
}
