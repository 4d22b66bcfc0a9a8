//! # 格式常量模块
//!
//! 嵌入格式中固定不变的数值。修改其中任何一个都会产生旧版本无法读取的数据流，
//! 因此它们不作为可配置项暴露。

/// 每个字节的位数。
pub const BITS_PER_BYTE: usize = 8;

/// 每个像素在扁平缓冲区中占用的字节数 (R, G, B, A)。
pub const BYTES_PER_PIXEL: usize = 4;

/// 每个 RGBA 像素的位数，Alpha 字节位于每组的最后 8 位。
pub const PIXEL_BITS: usize = BYTES_PER_PIXEL * BITS_PER_BYTE;

/// 每个被使用的载体字节在最低两位中存储的负载位数。
pub const PAYLOAD_BITS_PER_CARRIER_BYTE: usize = 2;

/// 选取载体字节中负载位的掩码。
pub const LOW_BITS_MASK: u8 = 0b11;

/// 一条长度记录是一个小端序的 `i32`。
/// 每个载体字节存储 2 bits，因此需要 32 / 2 = 16 个载体字节。
pub const SIZE_RECORD_BITS: usize = 32;

/// 文本模式下为长度记录保留的头部 (24 字节)。
pub const TEXT_HEADER_BITS: usize = 24 * BITS_PER_BYTE;

/// 图像模式下为宽度和高度记录保留的头部 (48 字节)。
pub const IMAGE_HEADER_BITS: usize = 48 * BITS_PER_BYTE;

/// 单条长度记录占用的槽位，图像模式的高度记录从这里开始。
pub const SIZE_SLOT_BITS: usize = 24 * BITS_PER_BYTE;
