//! # 负载与模式分派模块
//!
//! 根据负载类型 (文本或图像) 选择头部布局，并组合核心算法完成嵌入与提取。
//! 图像尺寸通过 [`RgbaBuffer`] 显式传递，不依赖任何全局状态。

use crate::constants::{
    BITS_PER_BYTE, BYTES_PER_PIXEL, IMAGE_HEADER_BITS, PIXEL_BITS, SIZE_SLOT_BITS,
    TEXT_HEADER_BITS,
};
use crate::error::{Result, StegoError};
use crate::steganography::{
    check_capacity, read_message, read_size, usable_bits, write_message, write_size,
};
use log::debug;
use std::fmt;
use std::str::FromStr;

/// 负载模式，决定头部布局与负载的组织方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Text,
    Image,
}

impl Mode {
    /// 该模式在载体开头保留的头部位数。
    pub fn header_bits(self) -> usize {
        match self {
            Mode::Text => TEXT_HEADER_BITS,
            Mode::Image => IMAGE_HEADER_BITS,
        }
    }
}

impl FromStr for Mode {
    type Err = StegoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Mode::Text),
            "image" => Ok(Mode::Image),
            _ => Err(StegoError::UnsupportedMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Text => f.write_str("text"),
            Mode::Image => f.write_str("image"),
        }
    }
}

/// 扁平的 RGBA 像素缓冲区及其尺寸，按行优先排列，每像素 4 字节。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RgbaBuffer {
    /// # Errors
    ///
    /// 当 `pixels.len()` 不等于 `width * height * 4` 时返回 [`StegoError::DimensionMismatch`]。
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(StegoError::DimensionMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// 缓冲区的总位数。
    pub fn bit_len(&self) -> usize {
        self.pixels.len() * BITS_PER_BYTE
    }
}

/// 要隐藏或已恢复的数据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(Vec<u8>),
    Image(RgbaBuffer),
}

impl Payload {
    pub fn mode(&self) -> Mode {
        match self {
            Payload::Text(_) => Mode::Text,
            Payload::Image(_) => Mode::Image,
        }
    }

    /// 负载本身的字节 (不含头部)。
    pub fn bytes(&self) -> &[u8] {
        match self {
            Payload::Text(bytes) => bytes,
            Payload::Image(image) => image.pixels(),
        }
    }
}

/// 将负载嵌入载体，返回与载体尺寸相同的新缓冲区。
///
/// 所有校验都在修改之前完成；失败时不会产生任何输出。
///
/// # Errors
///
/// * [`StegoError::CarrierTooSmall`] - 载体无法容纳头部。
/// * [`StegoError::PayloadTooLarge`] - 负载超出容量，或尺寸无法写入 `i32` 长度记录。
pub fn embed(carrier: &RgbaBuffer, payload: &Payload, skip_alpha: bool) -> Result<RgbaBuffer> {
    let mode = payload.mode();
    let header_bits = mode.header_bits();
    let message = payload.bytes();
    let payload_bits = message.len() * BITS_PER_BYTE;

    check_capacity(carrier.bit_len(), payload_bits, header_bits, skip_alpha)?;

    let too_large = || StegoError::PayloadTooLarge {
        payload_bits,
        capacity_bits: usable_bits(carrier.bit_len(), header_bits, skip_alpha),
    };
    let records: Vec<(i32, usize)> = match payload {
        Payload::Text(_) => vec![(i32::try_from(payload_bits).map_err(|_| too_large())?, 0)],
        Payload::Image(image) => vec![
            (i32::try_from(image.width()).map_err(|_| too_large())?, 0),
            (
                i32::try_from(image.height()).map_err(|_| too_large())?,
                SIZE_SLOT_BITS,
            ),
        ],
    };

    debug!(
        "Embedding {} payload: {} bits after a {}-bit header (skip alpha: {})",
        mode, payload_bits, header_bits, skip_alpha
    );

    let mut pixels = carrier.pixels().to_vec();
    for (value, start_bit) in records {
        write_size(&mut pixels, value, start_bit, skip_alpha);
    }
    let end_bit = write_message(&mut pixels, message, header_bits, skip_alpha);

    debug!(
        "Payload occupies carrier bits {}..{} of {}",
        header_bits,
        end_bit,
        carrier.bit_len()
    );

    RgbaBuffer::new(carrier.width(), carrier.height(), pixels)
}

/// 从载体中提取指定模式的负载。
///
/// `skip_alpha` 必须与嵌入时一致，格式本身不记录这一选项。
///
/// # Errors
///
/// * [`StegoError::CarrierTooSmall`] - 载体无法容纳头部。
/// * [`StegoError::CorruptHeader`] - 头部声明的长度为负或超出载体容量。
pub fn extract(carrier: &RgbaBuffer, mode: Mode, skip_alpha: bool) -> Result<Payload> {
    let carrier_bits = carrier.bit_len();
    let header_bits = mode.header_bits();
    if carrier_bits <= header_bits {
        return Err(StegoError::CarrierTooSmall {
            carrier_bits,
            header_bits,
        });
    }

    let capacity_bits = usable_bits(carrier_bits, header_bits, skip_alpha);
    let pixels = carrier.pixels();

    match mode {
        Mode::Text => {
            let declared = read_size(pixels, 0, skip_alpha);
            let payload_bits = declared_bits(i64::from(declared), capacity_bits)?;
            debug!("Text header declares {} payload bits", payload_bits);

            Ok(Payload::Text(read_message(
                pixels,
                header_bits,
                payload_bits,
                skip_alpha,
            )))
        }
        Mode::Image => {
            let width = read_size(pixels, 0, skip_alpha);
            let height = read_size(pixels, SIZE_SLOT_BITS, skip_alpha);
            debug!("Image header declares {}x{} hidden pixels", width, height);

            let declared = if width < 0 || height < 0 {
                i64::from(width.min(height))
            } else {
                i64::from(width)
                    .checked_mul(i64::from(height))
                    .and_then(|pixels| pixels.checked_mul(PIXEL_BITS as i64))
                    .unwrap_or(i64::MAX)
            };
            let payload_bits = declared_bits(declared, capacity_bits)?;

            let hidden = read_message(pixels, header_bits, payload_bits, skip_alpha);
            Ok(Payload::Image(RgbaBuffer::new(
                width as u32,
                height as u32,
                hidden,
            )?))
        }
    }
}

/// 载体在指定模式下可隐藏的最大负载字节数。
pub fn capacity(carrier: &RgbaBuffer, mode: Mode, skip_alpha: bool) -> usize {
    usable_bits(carrier.bit_len(), mode.header_bits(), skip_alpha) / BITS_PER_BYTE
}

fn declared_bits(declared: i64, capacity_bits: usize) -> Result<usize> {
    usize::try_from(declared)
        .ok()
        .filter(|&bits| bits <= capacity_bits)
        .ok_or(StegoError::CorruptHeader {
            declared_bits: declared,
            capacity_bits,
        })
}
