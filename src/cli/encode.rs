use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use log::info;
use ndarray::Array2;
use ndarray_npy::write_npy;
use serde::Serialize;

use crate::cli::SubCommandExtend;
use crate::config::{Opts, OutputFormat};
use crate::corpus::Corpus;
use crate::kmeans::LloydKMeans;
use crate::pq::ProductQuantizer;

/// 码本预览打印的中心数量
const PREVIEW_CENTROIDS: usize = 2;
/// 码本预览打印的坐标数量
const PREVIEW_DIMS: usize = 3;

#[derive(Parser, Debug, Clone)]
pub struct EncodeCommand {
    /// 向量文件路径，每行一个向量，坐标用逗号分隔
    pub path: PathBuf,
    /// 子向量分段数量，必须整除向量维度
    #[arg(short, long, default_value_t = 4)]
    pub m: usize,
    /// 每个分段的聚类中心数量
    #[arg(short, long, default_value_t = 256)]
    pub k: usize,
    /// 聚类最大迭代次数
    #[arg(long, default_value_t = 20)]
    pub max_iter: usize,
    /// 打印聚类每轮迭代的详细日志
    #[arg(long)]
    pub verbose: bool,
    /// 编码结果的输出格式
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
    /// 将编码矩阵额外保存为 npy 文件
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl SubCommandExtend for EncodeCommand {
    fn run(&self, _opts: &Opts) -> Result<()> {
        let corpus = Corpus::load(&self.path)?;
        info!("加载了 {} 个 {} 维向量", corpus.len(), corpus.dim());

        let clusterer = LloydKMeans { max_iter: self.max_iter, verbose: self.verbose };
        let pq = ProductQuantizer::train(&corpus, self.m, self.k, &clusterer)?;
        let codes = pq.encode_corpus(&corpus);

        match self.format {
            OutputFormat::Table => {
                print_codebooks(&pq);
                for code in &codes {
                    let row =
                        code.iter().map(u32::to_string).collect::<Vec<_>>().join(" ");
                    println!("{row}");
                }
            }
            OutputFormat::Json => {
                let report = EncodeReport { codebooks: codebook_previews(&pq), codes: &codes };
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }

        if let Some(path) = &self.output {
            save_codes(path, &codes, self.m)?;
            info!("编码矩阵已保存到 {}", path.display());
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct EncodeReport<'a> {
    /// 每个码本的截断预览
    codebooks: Vec<Vec<Vec<f32>>>,
    /// 完整的编码矩阵，顺序与输入一致
    codes: &'a [Vec<u32>],
}

fn codebook_previews(pq: &ProductQuantizer) -> Vec<Vec<Vec<f32>>> {
    pq.codebooks()
        .iter()
        .map(|codebook| {
            codebook
                .iter()
                .take(PREVIEW_CENTROIDS)
                .map(|centroid| centroid.iter().take(PREVIEW_DIMS).copied().collect())
                .collect()
        })
        .collect()
}

fn print_codebooks(pq: &ProductQuantizer) {
    for (p, codebook) in pq.codebooks().iter().enumerate() {
        println!("Codebook {p}:");
        for (i, centroid) in codebook.iter().take(PREVIEW_CENTROIDS).enumerate() {
            let coords = centroid
                .iter()
                .take(PREVIEW_DIMS)
                .map(|x| format!("{x:.4}"))
                .collect::<Vec<_>>()
                .join(", ");
            println!("  Centroid {i}: [{coords}]");
        }
        println!();
    }
}

fn save_codes(path: &Path, codes: &[Vec<u32>], m: usize) -> Result<()> {
    let flat = codes.iter().flatten().copied().collect::<Vec<_>>();
    let array = Array2::from_shape_vec((codes.len(), m), flat)?;
    write_npy(path, &array)?;
    Ok(())
}
