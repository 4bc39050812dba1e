// 该文件是 Vestcheck 项目的一部分。
// src/output/json_report.rs - JSON 报告
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

use std::io::Write;
use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

use crate::{
  classify::ClassifyReport,
  output::{BatchSummary, Render},
};

#[derive(Error, Debug)]
pub enum JsonReportError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  SerializeError(#[from] serde_json::Error),
}

/// f32 以最短十进制表示写入，避免 0.7 变成 0.699999988
fn score_value(score: f32) -> Value {
  score
    .to_string()
    .parse::<f64>()
    .map(Value::from)
    .unwrap_or_else(|_| Value::from(f64::from(score)))
}

/// 结果在 `finish` 时一次写出：单张为对象，批量为数组
pub struct JsonReport<W: Write> {
  writer: W,
  entries: Vec<Value>,
  batch: bool,
}

impl<W: Write> JsonReport<W> {
  pub fn new(writer: W) -> Self {
    Self {
      writer,
      entries: Vec::new(),
      batch: false,
    }
  }

  pub fn into_inner(self) -> W {
    self.writer
  }
}

impl<W: Write> Render for JsonReport<W> {
  type Error = JsonReportError;

  fn render_result(&mut self, report: &ClassifyReport) -> Result<(), Self::Error> {
    let prediction = &report.prediction;
    let all_scores: Vec<Value> = prediction
      .scores()
      .iter()
      .map(|(label, score)| json!({ "label": label, "score": score_value(score) }))
      .collect();

    self.entries.push(json!({
      "path": report.path.display().to_string(),
      "original_size": [report.original_size.0, report.original_size.1],
      "label": prediction.label(),
      "confidence": score_value(prediction.confidence()),
      "vest": prediction.is_vest(),
      "mode": prediction.mode().as_str(),
      "all_scores": all_scores,
    }));
    Ok(())
  }

  fn render_failure(
    &mut self,
    path: &Path,
    error: &(dyn std::error::Error + 'static),
  ) -> Result<(), Self::Error> {
    self.entries.push(json!({
      "path": path.display().to_string(),
      "error": error.to_string(),
    }));
    Ok(())
  }

  fn render_batch_start(&mut self, _dir: &Path, _total: usize) -> Result<(), Self::Error> {
    self.batch = true;
    Ok(())
  }

  fn render_batch_item(
    &mut self,
    _index: usize,
    _total: usize,
    _path: &Path,
  ) -> Result<(), Self::Error> {
    Ok(())
  }

  fn render_batch_summary(&mut self, _summary: &BatchSummary) -> Result<(), Self::Error> {
    Ok(())
  }

  fn finish(&mut self) -> Result<(), Self::Error> {
    let entries = std::mem::take(&mut self.entries);
    let document = match (self.batch, entries.len()) {
      (false, 1) => entries.into_iter().next().unwrap_or(Value::Null),
      (false, 0) => return Ok(()),
      _ => Value::Array(entries),
    };

    serde_json::to_writer_pretty(&mut self.writer, &document)?;
    writeln!(self.writer)?;
    self.writer.flush()?;
    Ok(())
  }
}
