//! # 错误类型模块
//!
//! 隐写库对外暴露的全部错误。命令处理层会再用 `anyhow` 为它们补充上下文。

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 嵌入、提取以及在文件与缓冲区之间转换时可能产生的错误。
#[derive(Error, Debug)]
pub enum StegoError {
    #[error("Carrier is too small to hold the size header: {carrier_bits} bits available, header needs more than {header_bits}")]
    CarrierTooSmall {
        carrier_bits: usize,
        header_bits: usize,
    },

    #[error("Payload is too large for the carrier: {payload_bits} bits required, capacity is {capacity_bits} bits")]
    PayloadTooLarge {
        payload_bits: usize,
        capacity_bits: usize,
    },

    #[error("Unsupported mode '{0}', expected 'text' or 'image'")]
    UnsupportedMode(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Unsupported image format for {}: {reason}", .path.display())]
    UnsupportedImageFormat { path: PathBuf, reason: String },

    #[error("Size header declares {declared_bits} payload bits but the carrier holds at most {capacity_bits}")]
    CorruptHeader {
        declared_bits: i64,
        capacity_bits: usize,
    },

    #[error("Pixel buffer holds {actual} bytes, dimensions require {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, StegoError>;
