use thiserror::Error;

/// 量化流水线中所有致命错误
///
/// 所有错误都会中止整个运行，不产生部分结果
#[derive(Error, Debug)]
pub enum PqError {
    /// 输入行无法解析，或与首行的维度不一致
    #[error("第 {line} 行格式错误: {reason}")]
    Format { line: usize, reason: String },

    /// 输入中没有任何可用向量
    #[error("向量文件为空，没有可用向量")]
    EmptyCorpus,

    /// 分段或聚类参数非法，在任何训练开始前检查
    #[error("配置错误: {reason}")]
    Configuration { reason: String },

    /// 分段中不同的子向量数量少于聚类中心数量
    #[error("分段 {partition} 数据不足: 需要至少 {need} 个不同的子向量，实际只有 {have} 个")]
    InsufficientData { partition: usize, have: usize, need: usize },

    /// 底层聚类失败或返回了非法结果
    #[error("分段 {partition} 聚类失败: {reason}")]
    Training { partition: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PqError>;
