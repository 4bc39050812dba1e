// 该文件是 Vestcheck 项目的一部分。
// src/args.rs - 项目参数配置
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::PathBuf;

use clap::Parser;

/// 反光背心分类模型本地测试工具
///
/// 模型固定从 ../src/models/vest_model.tflite 加载，请在 test/ 目录下运行。
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 图片文件或图片目录
  /// 支持格式: *.jpg, *.jpeg, *.png, *.bmp, *.webp
  #[arg(value_name = "PATH")]
  pub input: PathBuf,

  /// 批量处理目录中的所有图片（输入为目录时自动启用）
  #[arg(long)]
  pub batch: bool,

  /// 以 JSON 格式输出结果
  #[arg(long)]
  pub json: bool,
}
