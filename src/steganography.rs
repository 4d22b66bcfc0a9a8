//! # 隐写核心算法模块
//!
//! 在 RGBA 载体字节的最低两位中写入或读取负载位。
//!
//! 位寻址约定：载体的第 `i` 位是第 `i / 8` 个字节的第 `i % 8` 位 (0 为最低有效位)；
//! 负载的第 `j` 位是第 `j / 8` 个字节的第 `j % 8` 位。长度记录先按小端序转换为字节，
//! 再按同一约定寻址。
//!
//! 所有读写路径都只通过 [`Slots`] 遍历载体，因此编码与解码的索引始终保持同步。

use crate::constants::{
    BITS_PER_BYTE, LOW_BITS_MASK, PAYLOAD_BITS_PER_CARRIER_BYTE, PIXEL_BITS, SIZE_RECORD_BITS,
};
use crate::error::{Result, StegoError};

/// 判断从第 `bit_index` 位开始的字节是否为某个像素的 Alpha 字节。
pub fn is_alpha_byte(bit_index: usize) -> bool {
    (bit_index + BITS_PER_BYTE) % PIXEL_BITS == 0
}

/// 单步前进所消耗的载体位和负载位。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub carrier_bits: usize,
    pub payload_bits: usize,
}

/// 通道跳过策略。
///
/// 跳过的 Alpha 字节只推进载体游标，不消耗任何负载位。
pub fn step(carrier_bit: usize, skip_alpha: bool) -> Step {
    let payload_bits = if skip_alpha && is_alpha_byte(carrier_bit) {
        0
    } else {
        PAYLOAD_BITS_PER_CARRIER_BYTE
    };

    Step {
        carrier_bits: BITS_PER_BYTE,
        payload_bits,
    }
}

/// 一个可用的载体字节及其对应的负载位位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub carrier_byte: usize,
    pub payload_bit: usize,
}

/// 双游标状态机：依次产出可写入 2 个负载位的载体字节。
///
/// 当负载位耗尽或载体到达末尾时停止。
#[derive(Debug, Clone)]
pub struct Slots {
    carrier_bit: usize,
    carrier_end: usize,
    payload_bit: usize,
    payload_end: usize,
    skip_alpha: bool,
}

impl Slots {
    pub fn new(carrier_len: usize, start_bit: usize, payload_bits: usize, skip_alpha: bool) -> Self {
        Self {
            carrier_bit: start_bit,
            carrier_end: carrier_len * BITS_PER_BYTE,
            payload_bit: 0,
            payload_end: payload_bits,
            skip_alpha,
        }
    }

    /// 载体游标的当前位置 (位)。
    pub fn carrier_bit(&self) -> usize {
        self.carrier_bit
    }

    /// 已经分配出去的负载位数。
    pub fn payload_bit(&self) -> usize {
        self.payload_bit
    }
}

impl Iterator for Slots {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        while self.payload_bit < self.payload_end
            && self.carrier_bit + BITS_PER_BYTE <= self.carrier_end
        {
            let here = self.carrier_bit;
            let Step {
                carrier_bits,
                payload_bits,
            } = step(here, self.skip_alpha);
            self.carrier_bit += carrier_bits;

            if payload_bits == 0 {
                continue;
            }

            let slot = Slot {
                carrier_byte: here / BITS_PER_BYTE,
                payload_bit: self.payload_bit,
            };
            self.payload_bit += payload_bits;
            return Some(slot);
        }

        None
    }
}

/// 计算头部之后可用于存储负载的位数。
///
/// 启用 `skip_alpha` 时，Alpha 字节不计入容量。
pub fn usable_bits(carrier_bits: usize, header_bits: usize, skip_alpha: bool) -> usize {
    let first = header_bits / BITS_PER_BYTE;
    let end = carrier_bits / BITS_PER_BYTE;
    if end <= first {
        return 0;
    }

    let alpha_bytes = if skip_alpha {
        let bytes_per_pixel = PIXEL_BITS / BITS_PER_BYTE;
        end / bytes_per_pixel - first / bytes_per_pixel
    } else {
        0
    };

    (end - first - alpha_bytes) * PAYLOAD_BITS_PER_CARRIER_BYTE
}

/// 在修改载体之前检查负载能否完整放入。
///
/// # Errors
///
/// * 载体不大于头部时返回 [`StegoError::CarrierTooSmall`]。
/// * 负载超出可用容量，或无法用一条 `i32` 长度记录表示时返回 [`StegoError::PayloadTooLarge`]。
pub fn check_capacity(
    carrier_bits: usize,
    payload_bits: usize,
    header_bits: usize,
    skip_alpha: bool,
) -> Result<()> {
    if carrier_bits <= header_bits {
        return Err(StegoError::CarrierTooSmall {
            carrier_bits,
            header_bits,
        });
    }

    let capacity_bits = usable_bits(carrier_bits, header_bits, skip_alpha);
    if payload_bits > capacity_bits || i32::try_from(payload_bits).is_err() {
        return Err(StegoError::PayloadTooLarge {
            payload_bits,
            capacity_bits,
        });
    }

    Ok(())
}

fn write_bits(
    carrier: &mut [u8],
    payload: &[u8],
    payload_bits: usize,
    start_bit: usize,
    skip_alpha: bool,
) -> usize {
    let mut slots = Slots::new(carrier.len(), start_bit, payload_bits, skip_alpha);

    for Slot {
        carrier_byte,
        payload_bit,
    } in slots.by_ref()
    {
        let bits = (payload[payload_bit / BITS_PER_BYTE] >> (payload_bit % BITS_PER_BYTE))
            & LOW_BITS_MASK;
        let byte = &mut carrier[carrier_byte];
        if *byte & LOW_BITS_MASK != bits {
            *byte = bits | (*byte & !LOW_BITS_MASK);
        }
    }

    debug_assert_eq!(
        slots.payload_bit().min(payload_bits),
        payload_bits,
        "carrier exhausted before the payload was written"
    );

    slots.carrier_bit()
}

fn read_bits(carrier: &[u8], payload_bits: usize, start_bit: usize, skip_alpha: bool) -> Vec<u8> {
    let mut payload = vec![0u8; payload_bits.div_ceil(BITS_PER_BYTE)];

    for Slot {
        carrier_byte,
        payload_bit,
    } in Slots::new(carrier.len(), start_bit, payload_bits, skip_alpha)
    {
        payload[payload_bit / BITS_PER_BYTE] |=
            (carrier[carrier_byte] & LOW_BITS_MASK) << (payload_bit % BITS_PER_BYTE);
    }

    // 不足一个字节的尾部被丢弃
    payload.truncate(payload_bits / BITS_PER_BYTE);
    payload
}

/// 从第 `start_bit` 位开始写入一条长度记录。
///
/// 返回写入结束后载体游标的位置 (位)。
pub fn write_size(carrier: &mut [u8], value: i32, start_bit: usize, skip_alpha: bool) -> usize {
    write_bits(
        carrier,
        &value.to_le_bytes(),
        SIZE_RECORD_BITS,
        start_bit,
        skip_alpha,
    )
}

/// 从第 `start_bit` 位开始读取一条长度记录。
pub fn read_size(carrier: &[u8], start_bit: usize, skip_alpha: bool) -> i32 {
    let mut record = [0u8; SIZE_RECORD_BITS / BITS_PER_BYTE];
    record.copy_from_slice(&read_bits(carrier, SIZE_RECORD_BITS, start_bit, skip_alpha));
    i32::from_le_bytes(record)
}

/// 将负载写入头部之后的载体字节。
///
/// 负载写完后立即停止，其余载体字节保持不变。调用方必须先通过 [`check_capacity`]。
/// 返回最后一个被使用字节之后的载体位置 (位)。
pub fn write_message(
    carrier: &mut [u8],
    payload: &[u8],
    header_bits: usize,
    skip_alpha: bool,
) -> usize {
    write_bits(
        carrier,
        payload,
        payload.len() * BITS_PER_BYTE,
        header_bits,
        skip_alpha,
    )
}

/// 从头部之后读取 `payload_bits` 位负载，按字节打包返回。
pub fn read_message(
    carrier: &[u8],
    header_bits: usize,
    payload_bits: usize,
    skip_alpha: bool,
) -> Vec<u8> {
    read_bits(carrier, payload_bits, header_bits, skip_alpha)
}
