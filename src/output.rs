// 该文件是 Vestcheck 项目的一部分。
// src/output.rs - 输出定义
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

use thiserror::Error;

use crate::classify::ClassifyReport;

/// 批量任务统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
  pub total: usize,
  pub succeeded: usize,
  pub failed: usize,
}

/// 结果输出
///
/// 单张模式只调用 `render_result`/`render_failure` 与 `finish`；
/// 批量模式先调用 `render_batch_start`，每张图片前调用 `render_batch_item`，最后调用 `render_batch_summary`。
pub trait Render {
  type Error;

  fn render_result(&mut self, report: &ClassifyReport) -> Result<(), Self::Error>;

  fn render_failure(
    &mut self,
    path: &Path,
    error: &(dyn std::error::Error + 'static),
  ) -> Result<(), Self::Error>;

  fn render_batch_start(&mut self, dir: &Path, total: usize) -> Result<(), Self::Error>;

  fn render_batch_item(&mut self, index: usize, total: usize, path: &Path)
  -> Result<(), Self::Error>;

  fn render_batch_summary(&mut self, summary: &BatchSummary) -> Result<(), Self::Error>;

  fn finish(&mut self) -> Result<(), Self::Error> {
    Ok(())
  }
}

mod text_report;
pub use self::text_report::{BAR_WIDTH, TextReport, score_bar, score_line};

#[cfg(feature = "json_output")]
mod json_report;
#[cfg(feature = "json_output")]
pub use self::json_report::{JsonReport, JsonReportError};

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("文本输出错误: {0}")]
  TextReportError(#[from] std::io::Error),
  #[cfg(feature = "json_output")]
  #[error("JSON 输出错误: {0}")]
  JsonReportError(#[from] JsonReportError),
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
  Text,
  #[cfg(feature = "json_output")]
  Json,
}

pub enum OutputWrapper<W: Write> {
  TextReport(TextReport<W>),
  #[cfg(feature = "json_output")]
  JsonReport(JsonReport<W>),
}

impl<W: Write> OutputWrapper<W> {
  pub fn new(format: ReportFormat, writer: W) -> Self {
    match format {
      ReportFormat::Text => OutputWrapper::TextReport(TextReport::new(writer)),
      #[cfg(feature = "json_output")]
      ReportFormat::Json => OutputWrapper::JsonReport(JsonReport::new(writer)),
    }
  }
}

macro_rules! dispatch {
  ($self:ident, $output:ident => $call:expr) => {
    match $self {
      OutputWrapper::TextReport($output) => $call.map_err(OutputError::from),
      #[cfg(feature = "json_output")]
      OutputWrapper::JsonReport($output) => $call.map_err(OutputError::from),
    }
  };
}

impl<W: Write> Render for OutputWrapper<W> {
  type Error = OutputError;

  fn render_result(&mut self, report: &ClassifyReport) -> Result<(), Self::Error> {
    dispatch!(self, output => output.render_result(report))
  }

  fn render_failure(
    &mut self,
    path: &Path,
    error: &(dyn std::error::Error + 'static),
  ) -> Result<(), Self::Error> {
    dispatch!(self, output => output.render_failure(path, error))
  }

  fn render_batch_start(&mut self, dir: &Path, total: usize) -> Result<(), Self::Error> {
    dispatch!(self, output => output.render_batch_start(dir, total))
  }

  fn render_batch_item(
    &mut self,
    index: usize,
    total: usize,
    path: &Path,
  ) -> Result<(), Self::Error> {
    dispatch!(self, output => output.render_batch_item(index, total, path))
  }

  fn render_batch_summary(&mut self, summary: &BatchSummary) -> Result<(), Self::Error> {
    dispatch!(self, output => output.render_batch_summary(summary))
  }

  fn finish(&mut self) -> Result<(), Self::Error> {
    dispatch!(self, output => output.finish())
  }
}
