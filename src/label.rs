// 该文件是 Vestcheck 项目的一部分。
// src/label.rs - 类别标签
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
use tracing::{debug, warn};

pub const NO_VEST_LABEL: &str = "no_vest";
pub const VEST_LABEL: &str = "vest";

#[derive(Error, Debug)]
pub enum LabelError {
  #[error("无法读取标签文件 {path}: {source}")]
  IoError {
    path: PathBuf,
    source: std::io::Error,
  },
}

/// 有序的类别标签列表，下标即模型输出的类别索引
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
  labels: Box<[String]>,
}

impl Default for LabelSet {
  fn default() -> Self {
    Self::from_iter([NO_VEST_LABEL, VEST_LABEL])
  }
}

impl<S: Into<String>> FromIterator<S> for LabelSet {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    Self {
      labels: iter.into_iter().map(Into::into).collect(),
    }
  }
}

impl LabelSet {
  /// 解析标签文本：逐行去除首尾空白，忽略空行
  pub fn parse(text: &str) -> Self {
    text
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .collect()
  }

  /// 读取标签文件；文件不存在或没有任何标签时退回默认的二分类标签
  pub fn load(path: &Path) -> Result<Self, LabelError> {
    let text = match std::fs::read_to_string(path) {
      Ok(text) => text,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        warn!("未找到标签文件 {}，使用默认标签", path.display());
        return Ok(Self::default());
      }
      Err(source) => {
        return Err(LabelError::IoError {
          path: path.to_path_buf(),
          source,
        });
      }
    };

    let labels = Self::parse(&text);
    if labels.is_empty() {
      warn!("标签文件 {} 为空，使用默认标签", path.display());
      return Ok(Self::default());
    }

    debug!("从 {} 加载了 {} 个标签", path.display(), labels.len());
    Ok(labels)
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&str> {
    self.labels.get(index).map(String::as_str)
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.labels.iter().map(String::as_str)
  }

  pub fn is_default(&self) -> bool {
    *self == Self::default()
  }
}

impl std::fmt::Display for LabelSet {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_list().entries(self.iter()).finish()
  }
}
