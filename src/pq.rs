use std::cmp::Ordering;
use std::collections::HashSet;
use std::slice::ChunksExact;

use indicatif::{ParallelProgressIterator, ProgressBar};
use log::info;
use rayon::prelude::*;

use crate::corpus::Corpus;
use crate::error::{PqError, Result};
use crate::kmeans::Clusterer;
use crate::utils::pb_style;

/// 把向量拆分为等长子向量，分段 p 覆盖坐标区间 [p * sub_len, (p + 1) * sub_len)
pub fn sub_vectors(v: &[f32], sub_len: usize) -> ChunksExact<'_, f32> {
    debug_assert_eq!(v.len() % sub_len, 0);
    v.chunks_exact(sub_len)
}

/// 单个分段的码本：k 个中心按坐标字典序升序排列，扁平存储
///
/// 字典序排序消除了聚类内部标号的不确定性，同样的输入多次
/// 运行会得到同样的中心编号。
#[derive(Debug, Clone, PartialEq)]
pub struct Codebook {
    sub_len: usize,
    centroids: Vec<f32>,
}

impl Codebook {
    /// 对聚类返回的无序中心做规范化排序
    fn from_unordered(raw: Vec<f32>, sub_len: usize) -> Self {
        let mut chunks: Vec<&[f32]> = raw.chunks_exact(sub_len).collect();
        chunks.sort_by(|a, b| lex_cmp(a, b));

        let mut centroids = Vec::with_capacity(raw.len());
        for chunk in chunks {
            centroids.extend_from_slice(chunk);
        }
        Self { sub_len, centroids }
    }

    /// 中心数量
    pub fn len(&self) -> usize {
        self.centroids.len() / self.sub_len
    }

    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    /// 第 i 个中心
    pub fn centroid(&self, i: usize) -> &[f32] {
        &self.centroids[i * self.sub_len..(i + 1) * self.sub_len]
    }

    /// 按编号顺序迭代所有中心
    pub fn iter(&self) -> ChunksExact<'_, f32> {
        self.centroids.chunks_exact(self.sub_len)
    }

    /// 返回距离子向量最近的中心编号
    ///
    /// 距离相同时取编号较小的中心，保证结果确定
    pub fn nearest(&self, sub: &[f32]) -> usize {
        debug_assert_eq!(sub.len(), self.sub_len);
        let mut best = 0;
        let mut best_dist = f32::INFINITY;
        for (i, centroid) in self.iter().enumerate() {
            let dist = squared_l2(sub, centroid);
            if dist < best_dist {
                best = i;
                best_dist = dist;
            }
        }
        best
    }
}

/// 产品量化器：把 dim 维向量编码为 m 个码本中心编号
#[derive(Debug)]
pub struct ProductQuantizer {
    dim: usize,
    m: usize,
    k: usize,
    sub_len: usize,
    codebooks: Vec<Codebook>,
}

impl ProductQuantizer {
    /// 在向量集合上训练 m 个码本，每个码本 k 个中心
    ///
    /// 各分段的训练互相独立，在分段之间并行进行；全部码本
    /// 就绪后才能开始编码。
    pub fn train<C>(corpus: &Corpus, m: usize, k: usize, clusterer: &C) -> Result<Self>
    where
        C: Clusterer + Sync,
    {
        let dim = corpus.dim();
        if corpus.is_empty() {
            return Err(PqError::EmptyCorpus);
        }
        if m == 0 || k == 0 {
            return Err(PqError::Configuration {
                reason: format!("分段数量 ({m}) 和中心数量 ({k}) 必须大于 0"),
            });
        }
        if dim % m != 0 {
            return Err(PqError::Configuration {
                reason: format!("维度 {dim} 无法被分段数量 {m} 整除"),
            });
        }
        let sub_len = dim / m;

        info!("在 {} 个 {dim} 维向量上训练 {m} 个码本，每个 {k} 个中心", corpus.len());
        let pb = ProgressBar::new(m as u64).with_style(pb_style());
        let codebooks = (0..m)
            .into_par_iter()
            .progress_with(pb)
            .map(|p| train_partition(corpus, p, sub_len, k, clusterer))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { dim, m, k, sub_len, codebooks })
    }

    /// 编码单个向量，返回每个分段最近中心的编号
    ///
    /// 每个分段做 k 次 O(sub_len) 的距离计算，编码整个集合的总
    /// 开销为 O(n * dim * k)，是流水线的主要热点。
    pub fn encode(&self, v: &[f32]) -> Vec<u32> {
        debug_assert_eq!(v.len(), self.dim);
        sub_vectors(v, self.sub_len)
            .zip(&self.codebooks)
            .map(|(sub, codebook)| codebook.nearest(sub) as u32)
            .collect()
    }

    /// 编码整个向量集合，结果顺序与输入顺序一一对应
    ///
    /// 码本训练完成后只读，编码在向量之间并行进行。
    pub fn encode_corpus(&self, corpus: &Corpus) -> Vec<Vec<u32>> {
        (0..corpus.len())
            .into_par_iter()
            .map(|i| self.encode(corpus.vector(i)))
            .collect()
    }

    /// 把编码还原为近似向量：各分段对应中心的拼接
    pub fn decode(&self, code: &[u32]) -> Vec<f32> {
        debug_assert_eq!(code.len(), self.m);
        let mut v = Vec::with_capacity(self.dim);
        for (codebook, &i) in self.codebooks.iter().zip(code) {
            v.extend_from_slice(codebook.centroid(i as usize));
        }
        v
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// 分段数量
    pub fn m(&self) -> usize {
        self.m
    }

    /// 每个码本的中心数量
    pub fn k(&self) -> usize {
        self.k
    }

    /// 子向量长度
    pub fn sub_len(&self) -> usize {
        self.sub_len
    }

    pub fn codebooks(&self) -> &[Codebook] {
        &self.codebooks
    }
}

/// 训练单个分段的码本
fn train_partition<C: Clusterer>(
    corpus: &Corpus,
    p: usize,
    sub_len: usize,
    k: usize,
    clusterer: &C,
) -> Result<Codebook> {
    let offset = p * sub_len;
    let mut points = Vec::with_capacity(corpus.len() * sub_len);
    for v in corpus.iter() {
        points.extend_from_slice(&v[offset..offset + sub_len]);
    }

    // 聚类需要至少 k 个不同的子向量，否则凑不齐 k 个中心
    let distinct = points
        .chunks_exact(sub_len)
        .map(|c| c.iter().map(|x| x.to_bits()).collect::<Vec<_>>())
        .collect::<HashSet<_>>()
        .len();
    if distinct < k {
        return Err(PqError::InsufficientData { partition: p, have: distinct, need: k });
    }

    let raw = clusterer
        .train(&points, corpus.len(), sub_len, k)
        .map_err(|e| PqError::Training { partition: p, reason: e.to_string() })?;
    if raw.len() != k * sub_len {
        return Err(PqError::Training {
            partition: p,
            reason: format!("期望 {k} 个中心，实际返回 {}", raw.len() / sub_len),
        });
    }

    Ok(Codebook::from_unordered(raw, sub_len))
}

/// 坐标字典序比较，用 total_cmp 保证全序
fn lex_cmp(a: &[f32], b: &[f32]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.total_cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// 欧氏距离的平方，argmin 与真实欧氏距离一致，省去开方
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
