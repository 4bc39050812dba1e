// 该文件是 Vestcheck 项目的一部分。
// src/main.rs - 项目主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod args;

use std::process;

use anyhow::{Context, Result};
use clap::{Parser, error::ErrorKind};
use tracing::info;

use vestcheck::{
  classify::Classifier,
  config::ClassifierConfig,
  label::LabelSet,
  model::TfliteClassifierBuilder,
  output::{OutputWrapper, ReportFormat},
  task::{BatchTask, OneShotTask, Task},
};

#[cfg(feature = "json_output")]
fn report_format(json: bool) -> ReportFormat {
  if json {
    ReportFormat::Json
  } else {
    ReportFormat::Text
  }
}

#[cfg(not(feature = "json_output"))]
fn report_format(json: bool) -> ReportFormat {
  if json {
    tracing::warn!("未启用 json_output 特性，使用文本输出");
  }
  ReportFormat::Text
}

/// 配置错误：打印到标准输出并以退出码 1 结束
fn fail(lines: &[String]) -> ! {
  for line in lines {
    println!("{}", line);
  }
  process::exit(1);
}

fn run(config: &ClassifierConfig, args: &args::Args) -> Result<()> {
  let model_path = config.model();
  if !model_path.is_file() {
    fail(&[
      format!("错误: 未找到模型文件 {}", model_path.display()),
      "请确认在 test/ 目录下运行本程序".to_string(),
    ]);
  }

  let input = args.input.as_path();
  if !input.exists() {
    fail(&[format!("错误: 输入路径不存在 {}", input.display())]);
  }

  let batch = args.batch || input.is_dir();
  if batch && !input.is_dir() {
    fail(&[format!("错误: {} 不是目录", input.display())]);
  }

  let format = report_format(args.json);
  let text = format == ReportFormat::Text;

  if text {
    println!("加载模型: {}", model_path.display());
  }
  let model = TfliteClassifierBuilder::from(config)
    .build()
    .with_context(|| format!("无法加载模型 {}", model_path.display()))?;
  if text {
    println!("{}", model.info());
    println!();
  }
  info!("模型信息: {:?}", model.info());

  let labels = LabelSet::load(&config.labels_path())?;
  if text {
    println!("已加载标签: {}", labels);
    println!();
  }

  let classifier = Classifier::new(model, labels);
  let mut output = OutputWrapper::new(format, std::io::stdout().lock());

  if batch {
    let summary = BatchTask.run_task(input, &classifier, &mut output)?;
    info!(
      "共 {} 张图片，成功 {}，失败 {}",
      summary.total, summary.succeeded, summary.failed
    );
  } else {
    OneShotTask.run_task(input, &classifier, &mut output)?;
  }

  Ok(())
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .init();

  let args = match args::Args::try_parse() {
    Ok(args) => args,
    Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
    Err(e) => {
      let _ = e.print();
      process::exit(1);
    }
  };

  run(&ClassifierConfig::default(), &args)
}
