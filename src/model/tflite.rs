// 该文件是 Vestcheck 项目的一部分。
// src/model/tflite.rs - TFLite 分类模型
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

use thiserror::Error;
use tracing::{debug, error, info};
use tract_tflite::prelude::*;

use crate::{
  config::ClassifierConfig,
  frame::ImageTensor,
  model::{InterpretError, Model, OutputInterpretation},
};

type TflitePlan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

#[derive(Error, Debug)]
pub enum TfliteError {
  #[error("模型文件不存在: {0}")]
  ModelNotFound(PathBuf),
  #[error("模型加载错误: {path}: {reason:#}")]
  ModelLoadError { path: PathBuf, reason: TractError },
  #[error("输入张量形状 {actual:?} 与模型输入 {expected:?} 不一致")]
  InputShapeMismatch {
    expected: Vec<usize>,
    actual: Vec<usize>,
  },
  #[error("模型推理错误: {0:#}")]
  InferenceError(TractError),
  #[error("模型输出错误: {0}")]
  OutputError(#[from] InterpretError),
}

impl TfliteError {
  fn load(path: &Path, reason: TractError) -> Self {
    TfliteError::ModelLoadError {
      path: path.to_path_buf(),
      reason,
    }
  }
}

/// 模型输入输出的描述信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
  pub input_shape: String,
  pub input_type: String,
  pub output_shape: String,
  pub output_type: String,
}

impl std::fmt::Display for ModelInfo {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "输入形状: [{}]", self.input_shape)?;
    writeln!(f, "输入类型: {}", self.input_type)?;
    write!(f, "输出形状: [{}] ({})", self.output_shape, self.output_type)
  }
}

fn describe_shape(fact: &TypedFact) -> String {
  fact
    .shape
    .iter()
    .map(|dim| dim.to_string())
    .collect::<Vec<_>>()
    .join(", ")
}

pub struct TfliteClassifier {
  plan: TflitePlan,
  info: ModelInfo,
  input_shape: Option<Vec<usize>>,
}

pub struct TfliteClassifierBuilder {
  model_path: PathBuf,
  warmup: bool,
}

impl From<&ClassifierConfig> for TfliteClassifierBuilder {
  fn from(config: &ClassifierConfig) -> Self {
    TfliteClassifierBuilder {
      model_path: config.model().to_path_buf(),
      warmup: config.should_warmup(),
    }
  }
}

impl TfliteClassifierBuilder {
  pub fn new(model_path: impl Into<PathBuf>) -> Self {
    TfliteClassifierBuilder {
      model_path: model_path.into(),
      warmup: false,
    }
  }

  pub fn warmup(mut self, warmup: bool) -> Self {
    self.warmup = warmup;
    self
  }

  pub fn build(self) -> Result<TfliteClassifier, TfliteError> {
    let path = self.model_path.as_path();
    if !path.is_file() {
      error!("模型文件不存在: {}", path.display());
      return Err(TfliteError::ModelNotFound(path.to_path_buf()));
    }

    info!("加载模型文件: {}", path.display());
    let model = tract_tflite::tflite()
      .model_for_path(path)
      .map_err(|e| TfliteError::load(path, e))?;
    let classifier =
      TfliteClassifier::from_model(model).map_err(|e| TfliteError::load(path, e))?;
    info!("模型加载完成");

    if self.warmup {
      let now = std::time::Instant::now();
      classifier.infer(&ImageTensor::default())?;
      info!("模型预热完成，耗时: {:.2?}", now.elapsed());
    }

    Ok(classifier)
  }
}

impl TfliteClassifier {
  /// 记录输入输出信息，优化并生成可执行计划
  fn from_model(model: TypedModel) -> TractResult<Self> {
    let input_fact = model.input_fact(0)?.clone();
    let output_fact = model.output_fact(0)?.clone();

    let info = ModelInfo {
      input_shape: describe_shape(&input_fact),
      input_type: format!("{:?}", input_fact.datum_type),
      output_shape: describe_shape(&output_fact),
      output_type: format!("{:?}", output_fact.datum_type),
    };
    debug!("模型输入: [{}] {}", info.input_shape, info.input_type);
    debug!("模型输出: [{}] {}", info.output_shape, info.output_type);

    let plan = model.into_optimized()?.into_runnable()?;
    Ok(TfliteClassifier {
      plan,
      info,
      input_shape: input_fact.shape.as_concrete().map(|dims| dims.to_vec()),
    })
  }

  pub fn info(&self) -> &ModelInfo {
    &self.info
  }

  fn postprocess(outputs: TVec<TValue>) -> Result<OutputInterpretation, TfliteError> {
    let Some(output) = outputs.first() else {
      return Err(InterpretError::EmptyOutput(vec![]).into());
    };

    let output = output
      .cast_to::<f32>()
      .map_err(TfliteError::InferenceError)?;
    let shape = output.shape().to_vec();
    let data = output
      .as_slice::<f32>()
      .map_err(TfliteError::InferenceError)?
      .to_vec();
    debug!("模型原始输出: {:?} {:?}", shape, data);

    Ok(OutputInterpretation::from_raw(&shape, data)?)
  }
}

impl Model for TfliteClassifier {
  type Input = ImageTensor;
  type Output = OutputInterpretation;
  type Error = TfliteError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    let actual = input.shape().to_vec();
    if let Some(expected) = &self.input_shape
      && *expected != actual
    {
      return Err(TfliteError::InputShapeMismatch {
        expected: expected.clone(),
        actual,
      });
    }

    debug!("设置模型输入");
    let tensor =
      Tensor::from_shape(&actual, input.as_slice()).map_err(TfliteError::InferenceError)?;

    debug!("执行模型推理");
    let outputs = self
      .plan
      .run(tvec!(tensor.into()))
      .map_err(TfliteError::InferenceError)?;

    Self::postprocess(outputs)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_model_is_reported_before_loading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vest_model.tflite");
    let err = TfliteClassifierBuilder::new(&path).build().err().unwrap();
    assert!(matches!(err, TfliteError::ModelNotFound(p) if p == path));
  }

  #[test]
  fn builder_follows_config() {
    let config = ClassifierConfig::default()
      .model_path("/models/a.tflite")
      .warmup(false);
    let builder = TfliteClassifierBuilder::from(&config);
    assert_eq!(builder.model_path, PathBuf::from("/models/a.tflite"));
    assert!(!builder.warmup);
  }

  /// 只有一个输入节点、直接输出该输入的模型
  fn passthrough(shape: &[usize]) -> TfliteClassifier {
    let mut model = TypedModel::default();
    let dims: TVec<usize> = shape.iter().copied().collect();
    let fact = TypedFact::dt_shape(f32::datum_type(), dims);
    let source = model.add_source("input", fact).unwrap();
    model.set_output_outlets(&[source]).unwrap();
    TfliteClassifier::from_model(model).unwrap()
  }

  fn postprocess_one(tensor: Tensor) -> Result<OutputInterpretation, TfliteError> {
    TfliteClassifier::postprocess(tvec!(tensor.into()))
  }

  #[test]
  fn single_value_outputs_become_scalar() {
    let outputs = [
      tensor0(0.75f32),
      tensor1(&[0.75f32]),
      tensor2(&[[0.75f32]]),
    ];
    for tensor in outputs {
      let shape = tensor.shape().to_vec();
      assert_eq!(
        postprocess_one(tensor).unwrap(),
        OutputInterpretation::Scalar(0.75),
        "shape {shape:?}"
      );
    }
  }

  #[test]
  fn class_row_becomes_vector() {
    let out = postprocess_one(tensor2(&[[0.2f32, 0.7, 0.1]])).unwrap();
    assert_eq!(out, OutputInterpretation::Vector(vec![0.2, 0.7, 0.1]));
  }

  #[test]
  fn empty_output_tensor_is_rejected() {
    let tensor = Tensor::zero::<f32>(&[1, 0]).unwrap();
    let err = postprocess_one(tensor).unwrap_err();
    assert!(matches!(
      err,
      TfliteError::OutputError(InterpretError::EmptyOutput(ref shape)) if *shape == [1, 0]
    ));
  }

  #[test]
  fn non_f32_output_is_cast() {
    let out = postprocess_one(tensor2(&[[0.25f64, 0.75]])).unwrap();
    assert_eq!(out, OutputInterpretation::Vector(vec![0.25, 0.75]));
  }

  #[test]
  fn input_shape_is_checked_before_running() {
    let classifier = passthrough(&[1, 2, 2, 3]);
    assert_eq!(classifier.info().input_shape, "1, 2, 2, 3");

    let err = classifier.infer(&ImageTensor::default()).unwrap_err();
    match err {
      TfliteError::InputShapeMismatch { expected, actual } => {
        assert_eq!(expected, [1, 2, 2, 3]);
        assert_eq!(actual, [1, 224, 224, 3]);
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn matching_input_runs_through_the_plan() {
    let classifier = passthrough(&[1, 224, 224, 3]);
    let out = classifier.infer(&ImageTensor::default()).unwrap();
    assert_eq!(out.width(), 224 * 224 * 3);
    assert!(out.scores().iter().all(|v| *v == 0.0));
  }
}
