// 该文件是 Vestcheck 项目的一部分。
// src/config.rs - 分类器配置
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

/// 默认模型路径（相对于 test/ 目录）
pub const DEFAULT_MODEL_PATH: &str = "../src/models/vest_model.tflite";

/// 标签文件名，与模型文件位于同一目录
pub const DEFAULT_LABELS_FILE_NAME: &str = "labels.txt";

/// 分类流水线配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
  model_path: PathBuf,
  labels_file_name: String,
  warmup: bool,
}

impl Default for ClassifierConfig {
  fn default() -> Self {
    Self {
      model_path: PathBuf::from(DEFAULT_MODEL_PATH),
      labels_file_name: DEFAULT_LABELS_FILE_NAME.to_string(),
      warmup: true,
    }
  }
}

impl ClassifierConfig {
  pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
    self.model_path = path.into();
    self
  }

  pub fn labels_file_name(mut self, name: impl Into<String>) -> Self {
    self.labels_file_name = name.into();
    self
  }

  /// 加载模型后是否先用全零张量推理一次
  pub fn warmup(mut self, warmup: bool) -> Self {
    self.warmup = warmup;
    self
  }

  pub fn model(&self) -> &Path {
    &self.model_path
  }

  pub fn should_warmup(&self) -> bool {
    self.warmup
  }

  /// 标签文件路径：模型所在目录下的 `labels.txt`
  pub fn labels_path(&self) -> PathBuf {
    match self.model_path.parent() {
      Some(dir) => dir.join(&self.labels_file_name),
      None => PathBuf::from(&self.labels_file_name),
    }
  }
}
