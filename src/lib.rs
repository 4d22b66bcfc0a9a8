//! # lsb_embed 库
//!
//! 本库包含 LSB 隐写工具的核心逻辑：在 RGBA 载体图像每个字节的最低两位中
//! 隐藏文本或另一张图像，并无损地恢复。

// 声明库包含的所有模块。

pub mod cli;
pub mod constants;
pub mod error;
pub mod handler;
pub mod io;
pub mod payload;
pub mod steganography;

pub use error::{Result, StegoError};
pub use payload::{Mode, Payload, RgbaBuffer, capacity, embed, extract};
