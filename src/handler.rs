//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `capacity` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用核心隐写算法以及向用户报告结果。

use crate::cli::{CapacityArgs, HideArgs, RecoverArgs};
use crate::io::{load_image, read_text, save_image, write_text};
use crate::payload::{Mode, Payload, capacity, embed, extract};
use anyhow::{Context, Result};
use colored::Colorize;
use log::info;
use std::path::{Path, PathBuf};

/// 在 `source` 所在目录生成 `<prefix><name>.<extension>` 形式的默认输出路径。
fn default_output(source: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    source.with_file_name(format!("{prefix}{stem}.{extension}"))
}

/// 未指定 `--force` 时拒绝覆盖已存在的文件。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取载体图像和待隐藏的文本或图像、检查隐写空间是否足够、
/// 调用隐写核心函数写入头部和负载，最后将结果保存为 PNG。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径和选项的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 输出文件已存在且未指定 `--force`。
/// * 无法读取或解码输入文件。
/// * 载体图像没有足够的空间来隐藏负载。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_output(&args.image, "doctored_", "png"));
    ensure_writable(&dest, args.force)?;

    let carrier = load_image(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let payload = match (&args.text, &args.secret_image) {
        (Some(text), _) => Payload::Text(read_text(text).with_context(|| {
            format!(
                "Unable to read text file: {}",
                text.to_string_lossy().red().bold()
            )
        })?),
        (None, Some(secret)) => Payload::Image(load_image(secret).with_context(|| {
            format!(
                "Unable to read secret image file: {}",
                secret.to_string_lossy().red().bold()
            )
        })?),
        (None, None) => anyhow::bail!("Nothing to hide. \nPass either --text or --secret-image."),
    };

    let doctored = embed(&carrier, &payload, args.skip_alpha).with_context(|| {
        format!(
            "Not enough space in the image to hide the {}. \nRequired: {} bytes, Available: {} bytes",
            payload.mode(),
            payload.bytes().len().to_string().red().bold(),
            capacity(&carrier, payload.mode(), args.skip_alpha)
                .to_string()
                .green()
                .bold()
        )
    })?;

    save_image(&dest, &doctored).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    info!(
        "Hid {} bytes of {} in {}x{} carrier",
        payload.bytes().len(),
        payload.mode(),
        carrier.width(),
        carrier.height()
    );
    println!(
        "The {} has been successfully hidden and saved: {}",
        payload.mode(),
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、按指定模式提取负载，
/// 最后将恢复的文本或图像写入目标文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径和选项的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 输出文件已存在且未指定 `--force`。
/// * 无法读取输入的图像文件。
/// * 图像头部无效 (没有隐藏数据，或模式、Alpha 选项与隐藏时不一致)。
/// * 无法写入到目标文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let extension = match args.mode {
        Mode::Text => "txt",
        Mode::Image => "png",
    };
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.image, "recovered_", extension));
    ensure_writable(&output, args.force)?;

    let picture = load_image(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let payload = extract(&picture, args.mode, args.skip_alpha).with_context(|| {
        format!(
            "Failed to recover the hidden {} from '{}'. \nThe image may not contain a hidden message, or --mode/--skip-alpha differ from hiding.",
            args.mode,
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let written = match &payload {
        Payload::Text(bytes) => write_text(&output, bytes, args.encoding),
        Payload::Image(image) => save_image(&output, image),
    };
    written.with_context(|| {
        format!(
            "Unable to write to target file: {}",
            output.to_string_lossy().red().bold()
        )
    })?;

    info!(
        "Recovered {} bytes of {} from {}",
        payload.bytes().len(),
        payload.mode(),
        args.image.display()
    );
    println!(
        "The {} has been successfully recovered and saved: {}",
        payload.mode(),
        output.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Capacity' 命令：报告载体在指定模式下可隐藏的最大字节数。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let carrier = load_image(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let bytes = capacity(&carrier, args.mode, args.skip_alpha);
    println!(
        "{} ({}x{}) can hide up to {} bytes in {} mode",
        args.image.to_string_lossy().bold(),
        carrier.width(),
        carrier.height(),
        bytes.to_string().green().bold(),
        args.mode
    );

    Ok(())
}
