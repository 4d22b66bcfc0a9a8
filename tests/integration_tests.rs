use image::{ImageBuffer, Rgba};
use lsb_embed::{
    Mode, Payload, RgbaBuffer, StegoError,
    cli::{HideArgs, RecoverArgs},
    embed, extract,
    handler::{handle_hide, handle_recover},
    io::{TextEncoding, load_image},
};
use rand::{Rng, RngCore};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个带有随机像素的测试图像
fn create_test_image(path: &Path, width: u32, height: u32, opaque: bool) {
    let mut img_buf = ImageBuffer::new(width, height);
    let mut raw_pixels = vec![0u8; (width * height * 4) as usize];
    rand::rng().fill_bytes(&mut raw_pixels);

    img_buf
        .pixels_mut()
        .zip(raw_pixels.chunks_exact(4))
        .for_each(|(pixel, chunk)| {
            let alpha = if opaque { 255 } else { chunk[3] };
            *pixel = Rgba([chunk[0], chunk[1], chunk[2], alpha]);
        });

    img_buf.save(path).expect("Failed to create test image.");
}

fn random_buffer(width: u32, height: u32) -> RgbaBuffer {
    let mut pixels = vec![0u8; (width * height * 4) as usize];
    rand::rng().fill_bytes(&mut pixels);
    RgbaBuffer::new(width, height, pixels).expect("valid dimensions")
}

fn hide_text_args(image: &Path, text: &Path, dest: Option<&Path>) -> HideArgs {
    HideArgs {
        image: image.to_path_buf(),
        text: Some(text.to_path_buf()),
        secret_image: None,
        dest: dest.map(Path::to_path_buf),
        skip_alpha: false,
        force: false,
    }
}

fn recover_args(image: &Path, mode: Mode, output: Option<&Path>, skip_alpha: bool) -> RecoverArgs {
    RecoverArgs {
        image: image.to_path_buf(),
        mode,
        output: output.map(Path::to_path_buf),
        encoding: TextEncoding::Utf8,
        skip_alpha,
        force: false,
    }
}

/// 验证从隐藏到恢复的完整流程
#[test]
fn test_handle_hide_and_recover_integration() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.png");
    let hidden_image_path = dir.path().join("hidden.png");
    let source_text_path = dir.path().join("source.txt");
    let recovered_text_path = dir.path().join("recovered.txt");

    create_test_image(&original_image_path, 100, 100, true);
    let original_text = "This is a test message for the handler! 这是一个给处理器的测试信息！";
    fs::write(&source_text_path, original_text)?;

    // 2. 测试 handle_hide
    handle_hide(hide_text_args(
        &original_image_path,
        &source_text_path,
        Some(&hidden_image_path),
    ))?;
    assert!(
        hidden_image_path.exists(),
        "Hidden image should be created."
    );

    // 3. 测试 handle_recover
    handle_recover(recover_args(
        &hidden_image_path,
        Mode::Text,
        Some(&recovered_text_path),
        false,
    ))?;
    assert!(
        recovered_text_path.exists(),
        "Recovered text file should be created."
    );

    // 4. 验证结果
    let recovered_text = fs::read_to_string(&recovered_text_path)?;
    assert_eq!(
        original_text, recovered_text,
        "Recovered text must match the original."
    );

    Ok(())
}

/// 验证当用户不提供输出路径时，是否能正确生成默认路径并完成操作
#[test]
fn test_handle_hide_and_recover_with_defaults() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.png");
    let source_text_path = dir.path().join("source.txt");

    create_test_image(&original_image_path, 100, 100, true);
    let original_text = "Testing default path generation. 测试默认路径生成。";
    fs::write(&source_text_path, original_text)?;

    // 不提供 dest 路径
    handle_hide(hide_text_args(&original_image_path, &source_text_path, None))?;

    let expected_hidden_path = dir.path().join("doctored_original.png");
    assert!(
        expected_hidden_path.exists(),
        "Default hidden image should be created at: {:?}",
        expected_hidden_path
    );

    // 不提供输出路径
    handle_recover(recover_args(&expected_hidden_path, Mode::Text, None, false))?;

    let expected_recovered_path = dir.path().join("recovered_doctored_original.txt");
    assert!(
        expected_recovered_path.exists(),
        "Default recovered text file should be created at: {:?}",
        expected_recovered_path
    );

    let recovered_text = fs::read_to_string(&expected_recovered_path)?;
    assert_eq!(
        original_text, recovered_text,
        "Recovered text from default file must match the original."
    );

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    let text_path = dir.path().join("text.txt");
    let dest_path = dir.path().join("dest.png");

    create_test_image(&image_path, 50, 50, true);
    fs::write(&text_path, "some text")?;

    // 场景一：目标文件已存在，不使用 --force
    fs::write(&dest_path, "this is a dummy file to be overwritten")?;

    let result = handle_hide(hide_text_args(&image_path, &text_path, Some(&dest_path)));
    assert!(
        result.is_err(),
        "Execution should fail without --force when file exists."
    );
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }
    assert_eq!(
        fs::read(&dest_path)?,
        b"this is a dummy file to be overwritten"
    );

    // 场景二：使用 --force 强制覆盖
    let hide_args_with_force = HideArgs {
        force: true,
        ..hide_text_args(&image_path, &text_path, Some(&dest_path))
    };
    let result = handle_hide(hide_args_with_force);
    assert!(
        result.is_ok(),
        "Execution should succeed with --force when file exists."
    );

    let dummy_content = fs::read(&dest_path)?;
    assert_ne!(dummy_content, b"this is a dummy file to be overwritten");

    Ok(())
}

/// 验证空间不足时的错误处理，并且不会写出任何文件
#[test]
fn test_handle_hide_not_enough_space() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("small.png");
    let text_path = dir.path().join("large.txt");
    let dest_path = dir.path().join("dest.png");

    create_test_image(&image_path, 10, 10, true);
    fs::write(&text_path, "a".repeat(5000))?;

    let result = handle_hide(hide_text_args(&image_path, &text_path, Some(&dest_path)));

    let err = result.expect_err("payload must not fit");
    assert!(err.to_string().contains("Not enough space"));
    assert!(matches!(
        err.downcast_ref::<StegoError>(),
        Some(StegoError::PayloadTooLarge { .. })
    ));
    assert!(!dest_path.exists(), "No output may be written on failure.");

    Ok(())
}

/// 验证 2x2 的载体无法容纳文本头部
#[test]
fn test_tiny_carrier_is_rejected() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("tiny.png");
    let text_path = dir.path().join("text.txt");
    let dest_path = dir.path().join("dest.png");

    create_test_image(&image_path, 2, 2, true);
    fs::write(&text_path, "x")?;

    let err = handle_hide(hide_text_args(&image_path, &text_path, Some(&dest_path)))
        .expect_err("header must not fit");
    assert!(matches!(
        err.downcast_ref::<StegoError>(),
        Some(StegoError::CarrierTooSmall {
            carrier_bits: 128,
            header_bits: 192
        })
    ));
    assert!(!dest_path.exists());

    Ok(())
}

/// 验证缺失的输入文件会被报告为 FileNotFound
#[test]
fn test_missing_text_file() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    let dest_path = dir.path().join("dest.png");
    create_test_image(&image_path, 20, 20, true);

    let err = handle_hide(hide_text_args(
        &image_path,
        &dir.path().join("missing.txt"),
        Some(&dest_path),
    ))
    .expect_err("text file is missing");
    assert!(matches!(
        err.downcast_ref::<StegoError>(),
        Some(StegoError::FileNotFound(_))
    ));
    assert!(!dest_path.exists());

    Ok(())
}

/// 验证图像隐藏图像并保持 Alpha 通道不变
#[test]
fn test_hide_and_recover_image_with_skip_alpha() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let carrier_path = dir.path().join("carrier.png");
    let secret_path = dir.path().join("secret.png");
    let hidden_path = dir.path().join("hidden.png");

    create_test_image(&carrier_path, 64, 48, false);
    create_test_image(&secret_path, 9, 7, false);

    handle_hide(HideArgs {
        image: carrier_path.clone(),
        text: None,
        secret_image: Some(secret_path.clone()),
        dest: Some(hidden_path.clone()),
        skip_alpha: true,
        force: false,
    })?;

    let carrier = load_image(&carrier_path)?;
    let hidden = load_image(&hidden_path)?;
    assert_eq!((hidden.width(), hidden.height()), (64, 48));
    carrier
        .pixels()
        .chunks_exact(4)
        .zip(hidden.pixels().chunks_exact(4))
        .for_each(|(before, after)| assert_eq!(before[3], after[3], "alpha must be preserved"));

    handle_recover(recover_args(&hidden_path, Mode::Image, None, true))?;

    let recovered = load_image(&dir.path().join("recovered_hidden.png"))?;
    assert_eq!(recovered, load_image(&secret_path)?);

    Ok(())
}

/// 验证以 .bmp 为目标路径隐藏后仍能恢复 (输出始终为 PNG 数据)
#[test]
fn test_hide_to_bmp_destination_and_recover() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("cover.png");
    let text_path = dir.path().join("text.txt");
    let dest_path = dir.path().join("secret.bmp");
    let recovered_path = dir.path().join("recovered.txt");

    create_test_image(&image_path, 30, 30, true);
    fs::write(&text_path, "hidden behind a bmp name")?;

    handle_hide(hide_text_args(&image_path, &text_path, Some(&dest_path)))?;
    handle_recover(recover_args(
        &dest_path,
        Mode::Text,
        Some(&recovered_path),
        false,
    ))?;

    assert_eq!(
        fs::read_to_string(&recovered_path)?,
        "hidden behind a bmp name"
    );

    Ok(())
}

/// 验证随机文本在两种 Alpha 选项下都能完整往返
#[test]
fn test_random_text_round_trips() -> anyhow::Result<()> {
    let mut rng = rand::rng();

    for skip_alpha in [false, true] {
        for _ in 0..20 {
            let carrier = random_buffer(rng.random_range(4..40), rng.random_range(4..40));
            let capacity = lsb_embed::capacity(&carrier, Mode::Text, skip_alpha);
            let text: String = (0..rng.random_range(0..=capacity / 4))
                .map(|_| rng.random::<char>())
                .collect();

            let doctored = embed(&carrier, &Payload::Text(text.clone().into_bytes()), skip_alpha)?;
            let Payload::Text(bytes) = extract(&doctored, Mode::Text, skip_alpha)? else {
                panic!("text mode must return text");
            };
            assert_eq!(String::from_utf8(bytes)?, text);
        }
    }

    Ok(())
}

/// 验证头部和负载区域之外的载体字节保持不变
#[test]
fn test_bytes_beyond_payload_are_untouched() -> anyhow::Result<()> {
    let carrier = random_buffer(20, 20);
    let message = b"only the low bits of a few bytes change".to_vec();

    let doctored = embed(&carrier, &Payload::Text(message.clone()), false)?;

    // 头部 24 字节，其中前 16 字节存储长度；负载每字节占用 4 个载体字节
    let payload_end = 24 + message.len() * 4;
    assert_eq!(carrier.pixels()[16..24], doctored.pixels()[16..24]);
    assert_eq!(
        carrier.pixels()[payload_end..],
        doctored.pixels()[payload_end..]
    );
    carrier
        .pixels()
        .iter()
        .zip(doctored.pixels())
        .for_each(|(before, after)| assert_eq!(before & 0xFC, after & 0xFC));

    Ok(())
}
