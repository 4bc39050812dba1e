// 该文件是 Vestcheck 项目的一部分。
// src/classify.rs - 分类结果解读
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

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::{
  frame::ImageTensor,
  label::{LabelSet, NO_VEST_LABEL, VEST_LABEL},
  model::{InterpretError, Model, OutputInterpretation},
};

#[cfg(feature = "read_image_file")]
use crate::input::{ImageFileInput, ImageFileInputError};
#[cfg(feature = "read_image_file")]
use std::path::Path;

/// 二分类输出的判定阈值（含）
pub const VEST_THRESHOLD: f32 = 0.5;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum ClassifyError {
  #[cfg(feature = "read_image_file")]
  #[error("{0}")]
  Input(#[from] ImageFileInputError),
  #[error("{0}")]
  Inference(BoxedError),
  #[error("{0}")]
  Interpret(#[from] InterpretError),
}

/// 标签到置信度的映射，按置信度降序排列
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMap {
  entries: Vec<(String, f32)>,
}

impl ScoreMap {
  /// 稳定排序：分数相同时保持原有标签顺序
  fn ranked(mut entries: Vec<(String, f32)>) -> Self {
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    Self { entries }
  }

  pub fn get(&self, label: &str) -> Option<f32> {
    self
      .entries
      .iter()
      .find(|(name, _)| name == label)
      .map(|(_, score)| *score)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
    self
      .entries
      .iter()
      .map(|(name, score)| (name.as_str(), *score))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretationMode {
  Binary,
  MultiClass,
}

impl InterpretationMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      InterpretationMode::Binary => "binary",
      InterpretationMode::MultiClass => "multi_class",
    }
  }
}

/// 单张图片的分类结果
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
  label: String,
  confidence: f32,
  scores: ScoreMap,
  mode: InterpretationMode,
}

impl Prediction {
  pub fn label(&self) -> &str {
    &self.label
  }

  pub fn confidence(&self) -> f32 {
    self.confidence
  }

  pub fn is_vest(&self) -> bool {
    self.label == VEST_LABEL
  }

  pub fn scores(&self) -> &ScoreMap {
    &self.scores
  }

  pub fn mode(&self) -> InterpretationMode {
    self.mode
  }
}

/// 根据输出形式解读模型分数
///
/// 二分类时标签固定为 `["no_vest", "vest"]`，忽略标签文件；多分类时标签数量必须与输出宽度一致。
pub fn interpret(
  output: &OutputInterpretation,
  labels: &LabelSet,
) -> Result<Prediction, InterpretError> {
  if let Some(index) = output.scores().iter().position(|v| !v.is_finite()) {
    return Err(InterpretError::NonFiniteScore(index));
  }

  match output {
    OutputInterpretation::Scalar(vest_score) => {
      if !labels.is_default() {
        debug!("二分类输出，忽略自定义标签 {}", labels);
      }
      let vest_score = *vest_score;
      let no_vest_score = 1.0 - vest_score;
      let (label, confidence) = if vest_score >= VEST_THRESHOLD {
        (VEST_LABEL, vest_score)
      } else {
        (NO_VEST_LABEL, no_vest_score)
      };

      Ok(Prediction {
        label: label.to_string(),
        confidence,
        scores: ScoreMap::ranked(vec![
          (NO_VEST_LABEL.to_string(), no_vest_score),
          (VEST_LABEL.to_string(), vest_score),
        ]),
        mode: InterpretationMode::Binary,
      })
    }
    OutputInterpretation::Vector(scores) => {
      if labels.len() != scores.len() {
        return Err(InterpretError::ShapeMismatch {
          labels: labels.len(),
          outputs: scores.len(),
        });
      }

      let scores = ScoreMap::ranked(
        labels
          .iter()
          .map(str::to_string)
          .zip(scores.iter().copied())
          .collect(),
      );
      let (label, confidence) = scores
        .iter()
        .next()
        .map(|(label, score)| (label.to_string(), score))
        .ok_or_else(|| InterpretError::EmptyOutput(vec![0]))?;

      Ok(Prediction {
        label,
        confidence,
        scores,
        mode: InterpretationMode::MultiClass,
      })
    }
  }
}

/// 一张图片从读取到解读的完整结果
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyReport {
  pub path: PathBuf,
  pub original_size: (u32, u32),
  pub tensor_shape: [usize; 4],
  pub value_range: (f32, f32),
  pub prediction: Prediction,
}

/// 分类流水线：预处理、推理、解读
pub struct Classifier<M> {
  model: M,
  labels: LabelSet,
}

impl<M> Classifier<M>
where
  M: Model<Input = ImageTensor, Output = OutputInterpretation>,
  M::Error: Into<BoxedError>,
{
  pub fn new(model: M, labels: LabelSet) -> Self {
    Self { model, labels }
  }

  pub fn classify(&self, tensor: &ImageTensor) -> Result<Prediction, ClassifyError> {
    let output = self
      .model
      .infer(tensor)
      .map_err(|e| ClassifyError::Inference(e.into()))?;
    Ok(interpret(&output, &self.labels)?)
  }

  #[cfg(feature = "read_image_file")]
  pub fn classify_file(&self, path: &Path) -> Result<ClassifyReport, ClassifyError> {
    let input = ImageFileInput::open(path)?;
    let tensor: ImageTensor = input.to_tensor();

    let now = std::time::Instant::now();
    let prediction = self.classify(&tensor)?;
    debug!("{} 推理完成，耗时: {:.2?}", path.display(), now.elapsed());

    Ok(ClassifyReport {
      path: path.to_path_buf(),
      original_size: input.dimensions(),
      tensor_shape: tensor.shape(),
      value_range: tensor.value_range(),
      prediction,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn labels(names: &[&str]) -> LabelSet {
    names.iter().copied().collect()
  }

  fn ranked_labels(prediction: &Prediction) -> Vec<&str> {
    prediction.scores().iter().map(|(label, _)| label).collect()
  }

  #[test]
  fn scalar_threshold_is_inclusive() {
    let at = interpret(&OutputInterpretation::Scalar(0.5), &LabelSet::default()).unwrap();
    assert_eq!(at.label(), "vest");
    assert!(at.is_vest());
    assert_eq!(at.confidence(), 0.5);

    let below = interpret(&OutputInterpretation::Scalar(0.4999), &LabelSet::default()).unwrap();
    assert_eq!(below.label(), "no_vest");
    assert!(!below.is_vest());
  }

  #[test]
  fn scalar_scores_are_complementary() {
    for v in [0.0f32, 0.1, 0.25, 0.3, 0.4999, 0.5, 0.7, 0.9, 0.999, 1.0] {
      let prediction = interpret(&OutputInterpretation::Scalar(v), &LabelSet::default()).unwrap();
      let scores = prediction.scores();
      assert_eq!(scores.get("vest"), Some(v));
      assert_eq!(
        scores.get("no_vest").unwrap() + scores.get("vest").unwrap(),
        1.0,
        "v = {v}"
      );
    }
  }

  #[test]
  fn scalar_confidence_is_top_label_score() {
    let prediction = interpret(&OutputInterpretation::Scalar(0.2), &LabelSet::default()).unwrap();
    assert_eq!(prediction.label(), "no_vest");
    assert_eq!(prediction.confidence(), 1.0 - 0.2f32);
    assert_eq!(ranked_labels(&prediction), ["no_vest", "vest"]);
    assert_eq!(prediction.mode(), InterpretationMode::Binary);
  }

  #[test]
  fn scalar_ignores_custom_labels() {
    let custom = labels(&["person", "helmet", "vest"]);
    let prediction = interpret(&OutputInterpretation::Scalar(0.9), &custom).unwrap();
    assert_eq!(ranked_labels(&prediction), ["vest", "no_vest"]);
    assert_eq!(prediction.scores().get("helmet"), None);
  }

  #[test]
  fn vector_ranks_descending() {
    let prediction = interpret(
      &OutputInterpretation::Vector(vec![0.2, 0.7, 0.1]),
      &labels(&["a", "b", "c"]),
    )
    .unwrap();
    assert_eq!(ranked_labels(&prediction), ["b", "a", "c"]);
    assert_eq!(prediction.label(), "b");
    assert_eq!(prediction.confidence(), 0.7);
    assert!(!prediction.is_vest());
    assert_eq!(prediction.mode(), InterpretationMode::MultiClass);
  }

  #[test]
  fn vector_ties_keep_label_order() {
    let prediction = interpret(
      &OutputInterpretation::Vector(vec![0.1, 0.45, 0.45]),
      &labels(&["no_vest", "vest", "other"]),
    )
    .unwrap();
    assert_eq!(ranked_labels(&prediction), ["vest", "other", "no_vest"]);
    assert!(prediction.is_vest());
  }

  #[test]
  fn vector_label_count_must_match() {
    let err = interpret(
      &OutputInterpretation::Vector(vec![0.3, 0.3, 0.4]),
      &LabelSet::default(),
    )
    .unwrap_err();
    assert_eq!(
      err,
      InterpretError::ShapeMismatch {
        labels: 2,
        outputs: 3
      }
    );
  }

  #[test]
  fn non_finite_scores_are_rejected() {
    let err = interpret(
      &OutputInterpretation::Vector(vec![f32::NAN, 0.2, 0.7]),
      &labels(&["a", "b", "c"]),
    )
    .unwrap_err();
    assert_eq!(err, InterpretError::NonFiniteScore(0));

    let err = interpret(
      &OutputInterpretation::Scalar(f32::INFINITY),
      &LabelSet::default(),
    )
    .unwrap_err();
    assert_eq!(err, InterpretError::NonFiniteScore(0));
  }

  #[test]
  fn mode_names_are_stable() {
    assert_eq!(InterpretationMode::Binary.as_str(), "binary");
    assert_eq!(InterpretationMode::MultiClass.as_str(), "multi_class");
  }

  struct FixedModel(OutputInterpretation);

  impl Model for FixedModel {
    type Input = ImageTensor;
    type Output = OutputInterpretation;
    type Error = std::io::Error;

    fn infer(&self, _input: &ImageTensor) -> Result<OutputInterpretation, std::io::Error> {
      Ok(self.0.clone())
    }
  }

  struct BrokenModel;

  impl Model for BrokenModel {
    type Input = ImageTensor;
    type Output = OutputInterpretation;
    type Error = std::io::Error;

    fn infer(&self, _input: &ImageTensor) -> Result<OutputInterpretation, std::io::Error> {
      Err(std::io::Error::other("invoke failed"))
    }
  }

  #[test]
  fn classifier_runs_model_then_interprets() {
    let classifier = Classifier::new(
      FixedModel(OutputInterpretation::Vector(vec![0.8, 0.2])),
      LabelSet::default(),
    );
    let prediction = classifier.classify(&ImageTensor::default()).unwrap();
    assert_eq!(prediction.label(), "no_vest");
    assert_eq!(prediction.confidence(), 0.8);
  }

  #[test]
  fn classifier_surfaces_inference_failure() {
    let classifier = Classifier::new(BrokenModel, LabelSet::default());
    let err = classifier.classify(&ImageTensor::default()).unwrap_err();
    assert!(matches!(err, ClassifyError::Inference(_)));
    assert_eq!(err.to_string(), "invoke failed");
  }

  #[cfg(feature = "read_image_file")]
  #[test]
  fn classify_file_reports_preprocessing_facts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.png");
    image::RgbImage::from_pixel(300, 200, image::Rgb([10, 200, 30]))
      .save(&path)
      .unwrap();

    let model = FixedModel(OutputInterpretation::Scalar(0.93));
    let classifier = Classifier::new(model, LabelSet::default());
    let report = classifier.classify_file(&path).unwrap();
    assert_eq!(report.original_size, (300, 200));
    assert_eq!(report.tensor_shape, [1, 224, 224, 3]);
    assert!(report.value_range.0 >= -1.0 && report.value_range.1 <= 1.0);
    assert_eq!(report.prediction.label(), "vest");
  }

  #[cfg(feature = "read_image_file")]
  #[test]
  fn classify_file_fails_on_corrupt_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.jpg");
    std::fs::write(&path, [0u8; 64]).unwrap();

    let model = FixedModel(OutputInterpretation::Scalar(0.1));
    let classifier = Classifier::new(model, LabelSet::default());
    let err = classifier.classify_file(&path).unwrap_err();
    assert!(matches!(
      err,
      ClassifyError::Input(ImageFileInputError::ImageDecodeError(_))
    ));
  }
}
