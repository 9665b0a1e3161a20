use anyhow::{Result, bail};
use kmeans::{EuclideanDistance, KMeans, KMeansConfig, KMeansState};
use log::info;

/// 聚类能力抽象
///
/// 给定 n 个 d 维向量和中心数量 k，返回近似最小化簇内方差的
/// k 个中心，扁平存储为 k * d 的数组。
///
/// 返回中心的顺序不做任何保证，调用方需要自行规范化排序。
pub trait Clusterer {
    fn train(&self, points: &[f32], n: usize, d: usize, k: usize) -> Result<Vec<f32>>;
}

/// 基于 Lloyd 迭代的 kmeans 聚类
#[derive(Debug, Clone)]
pub struct LloydKMeans {
    /// 最大迭代次数
    pub max_iter: usize,
    /// 是否打印每轮迭代的详细信息
    pub verbose: bool,
}

impl Default for LloydKMeans {
    fn default() -> Self {
        Self { max_iter: 20, verbose: false }
    }
}

impl Clusterer for LloydKMeans {
    fn train(&self, points: &[f32], n: usize, d: usize, k: usize) -> Result<Vec<f32>> {
        assert_eq!(points.len(), n * d);

        // n == k 时每个点自成一簇，这就是精确最优解，不需要迭代
        if n == k {
            return Ok(points.to_vec());
        }

        let km: KMeans<_, 16, _> = KMeans::new(points, n, d, EuclideanDistance);
        let conf = if self.verbose {
            KMeansConfig::build()
                .init_done(&|_s: &KMeansState<f32>| info!("kmeans 初始化完成"))
                .iteration_done(&|s: &KMeansState<f32>, nr: usize, new_distsum: f32| {
                    info!(
                        "第 {} 轮 - 不平衡度：{:.2} | 距离和变化：{:+.2}",
                        nr,
                        imbalance_factor(&s.centroid_frequency),
                        new_distsum - s.distsum
                    );
                })
                .build()
        } else {
            KMeansConfig::default()
        };
        // NOTE: init_kmeanplusplus 在部分输入上会 panic，这里用随机划分初始化
        let result = km.kmeans_lloyd(k, self.max_iter, KMeans::init_random_partition, &conf);

        // 中心数组内部可能带对齐填充，按实际步长截取每个中心的前 d 个分量
        let raw = result.centroids.to_vec();
        let stride = raw.len() / k;
        if stride < d {
            bail!("kmeans 返回了不完整的聚类中心: 期望 {} 个分量，实际 {}", k * d, raw.len());
        }
        let mut centroids = Vec::with_capacity(k * d);
        for chunk in raw.chunks_exact(stride) {
            centroids.extend_from_slice(&chunk[..d]);
        }

        // 空簇会产生非有限的中心坐标
        if centroids.iter().any(|x| !x.is_finite()) {
            bail!("kmeans 返回了非有限的聚类中心");
        }
        Ok(centroids)
    }
}

/// 聚类结果的不平衡度，1.0 表示每个簇的大小完全一致
pub fn imbalance_factor(hist: &[usize]) -> f32 {
    let (mut tot, mut uf) = (0.0, 0.0);
    for h in hist {
        let h = *h as f32;
        tot += h;
        uf += h.powf(2.0);
    }
    uf * hist.len() as f32 / tot.powf(2.0)
}
