// 该文件是 Vestcheck 项目的一部分。
// src/model.rs - 模型
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

use thiserror::Error;

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpretError {
  #[error("模型输出为空，形状: {0:?}")]
  EmptyOutput(Vec<usize>),
  #[error("标签数量 {labels} 与模型输出宽度 {outputs} 不一致")]
  ShapeMismatch { labels: usize, outputs: usize },
  #[error("模型输出第 {0} 个分数不是有限值")]
  NonFiniteScore(usize),
}

/// 模型原始输出的解读方式，推理后确定一次
#[derive(Debug, Clone, PartialEq)]
pub enum OutputInterpretation {
  /// 单个 sigmoid 分数，表示 P(vest)
  Scalar(f32),
  /// 每个类别一个分数
  Vector(Vec<f32>),
}

impl OutputInterpretation {
  /// 从原始输出张量构造
  ///
  /// 批次维度为 1，展平后按元素个数判断：一个元素为 `Scalar`，多个为 `Vector`。
  /// `shape` 仅用于错误信息。
  pub fn from_raw(shape: &[usize], data: Vec<f32>) -> Result<Self, InterpretError> {
    match data.as_slice() {
      [] => Err(InterpretError::EmptyOutput(shape.to_vec())),
      [value] => Ok(Self::Scalar(*value)),
      _ => Ok(Self::Vector(data)),
    }
  }

  /// 全部原始分数
  pub fn scores(&self) -> &[f32] {
    match self {
      Self::Scalar(value) => std::slice::from_ref(value),
      Self::Vector(scores) => scores,
    }
  }

  pub fn width(&self) -> usize {
    match self {
      Self::Scalar(_) => 1,
      Self::Vector(scores) => scores.len(),
    }
  }
}

#[cfg(feature = "model_tflite")]
mod tflite;
#[cfg(feature = "model_tflite")]
pub use self::tflite::{ModelInfo, TfliteClassifier, TfliteClassifierBuilder, TfliteError};

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn single_element_is_scalar_whatever_the_rank() {
    let shapes: [&[usize]; 3] = [&[], &[1], &[1, 1]];
    for shape in shapes {
      assert_eq!(
        OutputInterpretation::from_raw(shape, vec![0.75]).unwrap(),
        OutputInterpretation::Scalar(0.75)
      );
    }
  }

  #[test]
  fn batched_row_is_vector() {
    let out = OutputInterpretation::from_raw(&[1, 3], vec![0.2, 0.7, 0.1]).unwrap();
    assert_eq!(out, OutputInterpretation::Vector(vec![0.2, 0.7, 0.1]));
    assert_eq!(out.width(), 3);
    assert_eq!(out.scores(), &[0.2f32, 0.7, 0.1][..]);
  }

  #[test]
  fn empty_output_is_rejected() {
    assert_eq!(
      OutputInterpretation::from_raw(&[1, 0], vec![]),
      Err(InterpretError::EmptyOutput(vec![1, 0]))
    );
  }
}
