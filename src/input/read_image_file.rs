// 该文件是 Vestcheck 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::{Path, PathBuf};

use image::{ImageReader, RgbImage, imageops::FilterType};
use thiserror::Error;
use tracing::debug;

use crate::frame::RgbNhwcTensor;

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("图像文件不存在: {0}")]
  NotFound(PathBuf),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像解码错误: {0}")]
  ImageDecodeError(#[from] image::ImageError),
}

/// 已解码的 RGB 图像文件
#[derive(Debug)]
pub struct ImageFileInput {
  path: PathBuf,
  image: RgbImage,
}

impl ImageFileInput {
  /// 打开并解码图像文件，统一转换为 RGB
  pub fn open(path: impl AsRef<Path>) -> Result<Self, ImageFileInputError> {
    let path = path.as_ref();
    if !path.is_file() {
      return Err(ImageFileInputError::NotFound(path.to_path_buf()));
    }

    let image = ImageReader::open(path)?
      .with_guessed_format()?
      .decode()?
      .to_rgb8();
    debug!(
      "已解码 {}: {}x{}",
      path.display(),
      image.width(),
      image.height()
    );

    Ok(Self {
      path: path.to_path_buf(),
      image,
    })
  }

  pub fn from_image(path: impl Into<PathBuf>, image: RgbImage) -> Self {
    Self {
      path: path.into(),
      image,
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// 原始尺寸 `(宽, 高)`
  pub fn dimensions(&self) -> (u32, u32) {
    self.image.dimensions()
  }

  /// 缩放到 `W x H` 并归一化为模型输入张量
  pub fn to_tensor<const W: u32, const H: u32>(&self) -> RgbNhwcTensor<W, H> {
    RgbNhwcTensor::from(&self.image)
  }
}

impl<const W: u32, const H: u32> From<&RgbImage> for RgbNhwcTensor<W, H> {
  fn from(image: &RgbImage) -> Self {
    let original_size = image.dimensions();
    let pixels = if original_size == (W, H) {
      image.as_raw().clone()
    } else {
      image::imageops::resize(image, W, H, FilterType::Triangle).into_raw()
    };

    match RgbNhwcTensor::from_rgb_bytes(&pixels, original_size) {
      Some(tensor) => tensor,
      // RgbImage 的缓冲区长度恒为 W * H * 3
      None => unreachable!("缩放后的像素数与张量尺寸不符"),
    }
  }
}
