// 该文件是 Vestcheck 项目的一部分。
// src/task.rs - 任务定义
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

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use crate::{
  classify::{BoxedError, Classifier},
  frame::ImageTensor,
  input::list_image_files,
  model::{Model, OutputInterpretation},
  output::{BatchSummary, Render},
};

pub trait Task<I, M, O>: Sized {
  type Summary;
  type Error;
  fn run_task(
    self,
    input: I,
    classifier: &Classifier<M>,
    output: &mut O,
  ) -> Result<Self::Summary, Self::Error>;
}

/// 单张图片任务：任何错误都直接返回
pub struct OneShotTask;

impl<'a, M, O> Task<&'a Path, M, O> for OneShotTask
where
  M: Model<Input = ImageTensor, Output = OutputInterpretation>,
  M::Error: Into<BoxedError>,
  O: Render,
  O::Error: std::error::Error + Send + Sync + 'static,
{
  type Summary = ();
  type Error = anyhow::Error;

  fn run_task(
    self,
    input: &'a Path,
    classifier: &Classifier<M>,
    output: &mut O,
  ) -> Result<Self::Summary, Self::Error> {
    info!("开始任务...");
    let now = std::time::Instant::now();
    let report = classifier
      .classify_file(input)
      .with_context(|| format!("无法处理图片 {}", input.display()))?;
    info!("推理完成，耗时: {:.2?}", now.elapsed());

    output.render_result(&report)?;
    output.finish()?;
    Ok(())
  }
}

/// 目录批量任务：逐张顺序处理，单张失败只记录不中断
pub struct BatchTask;

impl<'a, M, O> Task<&'a Path, M, O> for BatchTask
where
  M: Model<Input = ImageTensor, Output = OutputInterpretation>,
  M::Error: Into<BoxedError>,
  O: Render,
  O::Error: std::error::Error + Send + Sync + 'static,
{
  type Summary = BatchSummary;
  type Error = anyhow::Error;

  fn run_task(
    self,
    input: &'a Path,
    classifier: &Classifier<M>,
    output: &mut O,
  ) -> Result<Self::Summary, Self::Error> {
    info!("开始批量任务: {}", input.display());
    let files = list_image_files(input)
      .with_context(|| format!("无法列出目录 {}", input.display()))?;

    let mut summary = BatchSummary {
      total: files.len(),
      ..Default::default()
    };
    output.render_batch_start(input, summary.total)?;

    let now = std::time::Instant::now();
    for (index, path) in files.iter().enumerate() {
      output.render_batch_item(index + 1, summary.total, path)?;
      match classifier.classify_file(path) {
        Ok(report) => {
          output.render_result(&report)?;
          summary.succeeded += 1;
        }
        Err(e) => {
          warn!("处理 {} 失败: {}", path.display(), e);
          output.render_failure(path, &e)?;
          summary.failed += 1;
        }
      }
    }

    info!(
      "批量任务完成: 成功 {}，失败 {}，耗时: {:.2?}",
      summary.succeeded,
      summary.failed,
      now.elapsed()
    );
    output.render_batch_summary(&summary)?;
    output.finish()?;
    Ok(summary)
  }
}
