// 该文件是 Vestcheck 项目的一部分。
// src/frame.rs - NHWC 浮点张量定义
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

const RGB_CHANNELS: usize = 3;
const BATCH_SIZE: usize = 1;

/// 模型输入边长
pub const MODEL_INPUT_SIZE: u32 = 224;

/// 归一化常量，需与训练时保持一致
const PIXEL_CENTER: f32 = 127.5;

/// 把 `0..=255` 的像素值映射到 `[-1, 1]`
#[inline]
pub fn normalize_pixel(value: u8) -> f32 {
  (f32::from(value) - PIXEL_CENTER) / PIXEL_CENTER
}

/// 带批次维度的 RGB 浮点张量，布局为 `[1, H, W, 3]`
#[derive(Debug, Clone, PartialEq)]
pub struct RgbNhwcTensor<const W: u32, const H: u32> {
  data: Box<[f32]>,
  original_size: (u32, u32),
}

/// 分类模型的输入张量
pub type ImageTensor = RgbNhwcTensor<MODEL_INPUT_SIZE, MODEL_INPUT_SIZE>;

impl<const W: u32, const H: u32> Default for RgbNhwcTensor<W, H> {
  fn default() -> Self {
    let size = BATCH_SIZE * RGB_CHANNELS * (W as usize) * (H as usize);
    Self {
      data: vec![0f32; size].into_boxed_slice(),
      original_size: (W, H),
    }
  }
}

impl<const W: u32, const H: u32> RgbNhwcTensor<W, H> {
  /// 由已缩放到 `W x H` 的 RGB 字节构造，逐通道归一化
  ///
  /// `pixels` 长度必须为 `W * H * 3`，否则返回 `None`。
  pub fn from_rgb_bytes(pixels: &[u8], original_size: (u32, u32)) -> Option<Self> {
    if pixels.len() != Self::element_count() {
      return None;
    }

    Some(Self {
      data: pixels.iter().copied().map(normalize_pixel).collect(),
      original_size,
    })
  }

  pub const fn element_count() -> usize {
    BATCH_SIZE * (H as usize) * (W as usize) * RGB_CHANNELS
  }

  pub fn shape(&self) -> [usize; 4] {
    [BATCH_SIZE, H as usize, W as usize, RGB_CHANNELS]
  }

  /// 源图像缩放前的尺寸 `(宽, 高)`
  pub fn original_size(&self) -> (u32, u32) {
    self.original_size
  }

  pub fn as_slice(&self) -> &[f32] {
    &self.data
  }

  /// 张量中的最小值与最大值
  pub fn value_range(&self) -> (f32, f32) {
    self
      .data
      .iter()
      .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
      })
  }

  /// 第 `(y, x)` 个像素的三个通道值
  pub fn pixel(&self, y: usize, x: usize) -> &[f32] {
    let start = (y * W as usize + x) * RGB_CHANNELS;
    &self.data[start..start + RGB_CHANNELS]
  }
}
