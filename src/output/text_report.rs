// 该文件是 Vestcheck 项目的一部分。
// src/output/text_report.rs - 文本报告
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

use crate::{
  classify::{ClassifyReport, InterpretationMode},
  output::{BatchSummary, Render},
};

/// 分数条满格长度
pub const BAR_WIDTH: usize = 30;

const RESULT_RULE_WIDTH: usize = 50;
const BATCH_RULE_WIDTH: usize = 60;

/// 长度为 `round(score * 30)` 的 `#` 条
pub fn score_bar(score: f32) -> String {
  let filled = (score * BAR_WIDTH as f32).round().clamp(0.0, BAR_WIDTH as f32) as usize;
  "#".repeat(filled)
}

pub fn score_line(label: &str, score: f32) -> String {
  format!(
    "{:<12}: {:6.4} ({:5.2}%) {}",
    label,
    score,
    score * 100.0,
    score_bar(score)
  )
}

fn file_name(path: &Path) -> String {
  path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.display().to_string())
}

/// 人类可读的文本报告
pub struct TextReport<W: Write> {
  writer: W,
}

impl<W: Write> TextReport<W> {
  pub fn new(writer: W) -> Self {
    Self { writer }
  }

  pub fn into_inner(self) -> W {
    self.writer
  }
}

impl<W: Write> Render for TextReport<W> {
  type Error = std::io::Error;

  fn render_result(&mut self, report: &ClassifyReport) -> Result<(), Self::Error> {
    let w = &mut self.writer;
    let (width, height) = report.original_size;
    let (lo, hi) = report.value_range;
    let prediction = &report.prediction;

    writeln!(w, "处理图片: {}", report.path.display())?;
    writeln!(w, "原始尺寸: {}x{}", width, height)?;
    writeln!(w, "预处理张量形状: {:?}", report.tensor_shape)?;
    writeln!(w, "预处理张量范围: [{:.2}, {:.2}]", lo, hi)?;
    match prediction.mode() {
      InterpretationMode::Binary => writeln!(w, "输出解读: 二分类 sigmoid")?,
      InterpretationMode::MultiClass => {
        writeln!(w, "输出解读: 多分类 ({} 类)", prediction.scores().len())?
      }
    }
    writeln!(w)?;

    let rule = "=".repeat(RESULT_RULE_WIDTH);
    writeln!(w, "{}", rule)?;
    writeln!(w, "识别结果")?;
    writeln!(w, "{}", rule)?;
    for (label, score) in prediction.scores().iter() {
      writeln!(w, "{}", score_line(label, score))?;
    }
    writeln!(w)?;
    writeln!(w, ">> 最高预测: {}", prediction.label())?;
    writeln!(
      w,
      ">> 置信度: {:.4} ({:.2}%)",
      prediction.confidence(),
      prediction.confidence() * 100.0
    )?;
    writeln!(w, ">> 检测到背心: {}", prediction.is_vest())?;
    writeln!(w, "{}", rule)?;
    Ok(())
  }

  fn render_failure(
    &mut self,
    path: &Path,
    error: &(dyn std::error::Error + 'static),
  ) -> Result<(), Self::Error> {
    writeln!(self.writer, "处理 {} 出错: {}", file_name(path), error)
  }

  fn render_batch_start(&mut self, dir: &Path, total: usize) -> Result<(), Self::Error> {
    if total == 0 {
      writeln!(self.writer, "目录 {} 中没有图片", dir.display())
    } else {
      writeln!(self.writer, "找到 {} 张待测图片", total)
    }
  }

  fn render_batch_item(
    &mut self,
    index: usize,
    total: usize,
    path: &Path,
  ) -> Result<(), Self::Error> {
    let rule = "=".repeat(BATCH_RULE_WIDTH);
    writeln!(self.writer)?;
    writeln!(self.writer, "{}", rule)?;
    writeln!(self.writer, "图片 {}/{}: {}", index, total, file_name(path))?;
    writeln!(self.writer, "{}", rule)
  }

  fn render_batch_summary(&mut self, summary: &BatchSummary) -> Result<(), Self::Error> {
    if summary.total == 0 {
      return Ok(());
    }
    writeln!(self.writer)?;
    writeln!(
      self.writer,
      "批量完成: 成功 {}，失败 {}，共 {}",
      summary.succeeded, summary.failed, summary.total
    )
  }

  fn finish(&mut self) -> Result<(), Self::Error> {
    self.writer.flush()
  }
}
