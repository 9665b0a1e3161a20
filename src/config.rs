use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::*;

#[derive(Parser, Debug, Clone)]
#[command(name = "pqcode", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 训练码本并把向量编码为量化结果
    Encode(EncodeCommand),
    /// 查看向量文件的基本信息
    Show(ShowCommand),
}

/// 编码结果的输出格式
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    /// 逐行打印编码矩阵
    Table,
    /// JSON 输出，包含码本预览和编码矩阵
    Json,
}
