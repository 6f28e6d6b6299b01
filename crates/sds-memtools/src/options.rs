use serde::{Deserialize, Serialize};

/// 单个缓冲的运行期配置。
///
/// # 设计初衷（Why）
/// - `value()` 需要把存储复制成宿主可表示的序列，宿主的序列长度上限因平台与绑定层而异；
///   把上限做成配置项，绑定层可以按宿主的真实限制收紧，而不是在复制途中失败。
///
/// # 契约定义（What）
/// - `max_value_len`：`value()`/`BoundView::value()` 允许产出的最大字节数，
///   超出时返回 [`MemoryError::SizeOverflow`](crate::MemoryError::SizeOverflow)；
///   默认值为 `isize::MAX`，即平台可表示的最大序列长度；
/// - 派生运算（`xor`、`lshift`、`concat`、`slice`）产生的新缓冲继承接收者的配置。
///
/// # 使用方式（How）
/// - 代码内通过 [`BufferOptions::new`] 与 `with_*` 构造；
/// - 也可从配置文件反序列化，缺省字段取默认值。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferOptions {
    pub max_value_len: usize,
}

impl BufferOptions {
    /// 平台默认配置。
    pub fn new() -> Self {
        Self::default()
    }

    /// 调整 `value()` 的输出上限。
    pub fn with_max_value_len(mut self, max_value_len: usize) -> Self {
        self.max_value_len = max_value_len;
        self
    }
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            max_value_len: isize::MAX as usize,
        }
    }
}
