//! # 文件读写模块
//!
//! 在文件与内存缓冲区之间转换：图像解码为 RGBA 字节，文本按原始字节读取。

use crate::error::{Result, StegoError};
use crate::payload::RgbaBuffer;
use clap::ValueEnum;
use image::{ColorType, ImageError, ImageFormat, ImageReader};
use log::debug;
use std::fs;
use std::path::Path;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// 写出恢复文本时使用的字符编码。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf16Le,
    Latin1,
}

impl TextEncoding {
    /// 按该编码解码字节，非法序列以替换字符代替。
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::Utf16Le => {
                let pairs = bytes.chunks_exact(2);
                let dangling = !pairs.remainder().is_empty();
                let units: Vec<u16> = pairs
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                let mut text = String::from_utf16_lossy(&units);
                if dangling {
                    text.push(char::REPLACEMENT_CHARACTER);
                }
                text
            }
            TextEncoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(StegoError::FileNotFound(path.to_path_buf()))
    }
}

fn image_error(path: &Path, err: ImageError) -> StegoError {
    match err {
        ImageError::IoError(err) => StegoError::Io(err),
        other => StegoError::UnsupportedImageFormat {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

/// 读取图像文件并转换为行优先的 RGBA 缓冲区。
///
/// 格式根据文件内容识别，扩展名只在内容无法识别时作为参考。
///
/// # Errors
///
/// * 文件不存在时返回 [`StegoError::FileNotFound`]。
/// * 无法识别或解码的图像返回 [`StegoError::UnsupportedImageFormat`]。
pub fn load_image(path: &Path) -> Result<RgbaBuffer> {
    ensure_exists(path)?;

    let rgba = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|err| image_error(path, err))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    debug!("Loaded {}x{} image from {}", width, height, path.display());

    RgbaBuffer::new(width, height, rgba.into_raw())
}

/// 将 RGBA 缓冲区保存为无损 PNG。
pub fn save_image(path: &Path, image: &RgbaBuffer) -> Result<()> {
    image::save_buffer_with_format(
        path,
        image.pixels(),
        image.width(),
        image.height(),
        ColorType::Rgba8,
        ImageFormat::Png,
    )
    .map_err(|err| image_error(path, err))?;
    debug!(
        "Saved {}x{} PNG to {}",
        image.width(),
        image.height(),
        path.display()
    );

    Ok(())
}

/// 以原始字节读取文本文件，去掉开头的 UTF-8 BOM。
pub fn read_text(path: &Path) -> Result<Vec<u8>> {
    ensure_exists(path)?;

    let bytes = fs::read(path)?;
    Ok(match bytes.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_vec(),
        None => bytes,
    })
}

/// 按 `encoding` 解码字节后写入文本文件。
pub fn write_text(path: &Path, bytes: &[u8], encoding: TextEncoding) -> Result<()> {
    fs::write(path, encoding.decode(bytes))?;
    Ok(())
}
