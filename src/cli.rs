//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::io::TextEncoding;
use crate::payload::Mode;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在无损图像中隐藏或恢复文本和图像。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在无损图像 (如 PNG, BMP) 中隐藏或恢复文本和图像。\n每个载体字节的最低两位存储负载，可选择保持 Alpha 通道不变。"
)]
pub struct Cli {
    /// 日志详细程度 (-v: info, -vv: debug, -vvv: trace)。
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏)、recover (恢复) 和 capacity (容量)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 在无损图像中隐藏一个文本文件或另一张图像。
    Hide(HideArgs),

    /// 从经过隐写的图像中恢复隐藏的文本或图像。
    Recover(RecoverArgs),

    /// 显示图像在指定模式下可隐藏的最大字节数。
    Capacity(CapacityArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 用于隐写的载体图像文件路径 (如 PNG, BMP)。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的文本文件路径。
    #[arg(
        short,
        long,
        conflicts_with = "secret_image",
        required_unless_present = "secret_image"
    )]
    pub text: Option<PathBuf>,

    /// 要隐藏的图像文件路径。
    #[arg(short, long)]
    pub secret_image: Option<PathBuf>,

    /// 结果图像的输出路径，默认为载体旁的 `doctored_<name>.png`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 保持每个像素的 Alpha 通道不变。恢复时必须使用相同的选项。
    #[arg(long)]
    pub skip_alpha: bool,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 隐藏数据的类型：text 或 image。
    #[arg(short, long, default_value = "text")]
    pub mode: Mode,

    /// 恢复结果的输出路径，默认为 `recovered_<name>.txt` 或 `recovered_<name>.png`。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 写出恢复文本时使用的编码。
    #[arg(short, long, value_enum, default_value_t = TextEncoding::Utf8)]
    pub encoding: TextEncoding,

    /// 隐藏时是否使用了 --skip-alpha。
    #[arg(long)]
    pub skip_alpha: bool,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}

/// 'capacity' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CapacityArgs {
    /// 载体图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 负载类型：text 或 image。
    #[arg(short, long, default_value = "text")]
    pub mode: Mode,

    /// 不计入 Alpha 通道。
    #[arg(long)]
    pub skip_alpha: bool,
}
