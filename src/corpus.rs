use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::slice::ChunksExact;

use crate::error::{PqError, Result};

/// 等长浮点向量的集合，按行优先顺序扁平存储
///
/// 加载完成后不可变，向量顺序与输入顺序一致
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    dim: usize,
    data: Vec<f32>,
}

impl Corpus {
    /// 从内存数据构建向量集合，校验与文件加载相同
    pub fn new(dim: usize, data: Vec<f32>) -> Result<Self> {
        if dim == 0 || data.is_empty() {
            return Err(PqError::EmptyCorpus);
        }
        if data.len() % dim != 0 {
            return Err(PqError::Configuration {
                reason: format!("数据长度 {} 无法被维度 {dim} 整除", data.len()),
            });
        }
        if let Some(x) = data.iter().find(|x| !x.is_finite()) {
            return Err(PqError::Configuration { reason: format!("包含非有限数值: {x}") });
        }
        Ok(Self { dim, data })
    }

    /// 从文本文件加载向量集合
    ///
    /// 每个非空行是一个向量，坐标用逗号分隔，无表头。
    /// 所有行的维度必须一致，任何一行解析失败都会中止加载。
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::parse(BufReader::new(file))
    }

    /// 从任意 BufRead 解析向量集合，行号从 1 开始计数
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let mut dim = 0;
        let mut data = vec![];

        for (no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let start = data.len();
            for field in line.split(',') {
                let field = field.trim();
                let value = field.parse::<f32>().map_err(|_| PqError::Format {
                    line: no + 1,
                    reason: format!("无法解析为数字: {field:?}"),
                })?;
                // NaN / inf 在这里拒绝，保证后续距离计算永远不会见到
                if !value.is_finite() {
                    return Err(PqError::Format {
                        line: no + 1,
                        reason: format!("非有限数值: {field:?}"),
                    });
                }
                data.push(value);
            }

            let width = data.len() - start;
            if dim == 0 {
                dim = width;
            } else if width != dim {
                return Err(PqError::Format {
                    line: no + 1,
                    reason: format!("维度不一致: 期望 {dim} 维，实际 {width} 维"),
                });
            }
        }

        if data.is_empty() {
            return Err(PqError::EmptyCorpus);
        }
        Ok(Self { dim, data })
    }

    /// 向量维度
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// 向量数量
    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 第 i 个向量
    pub fn vector(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// 按加载顺序迭代所有向量
    pub fn iter(&self) -> ChunksExact<'_, f32> {
        self.data.chunks_exact(self.dim)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_basic() {
        let corpus = Corpus::parse(Cursor::new("1.0,2.0\n3.5,-4.0\n")).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.dim(), 2);
        assert_eq!(corpus.vector(0), &[1.0, 2.0]);
        assert_eq!(corpus.vector(1), &[3.5, -4.0]);
    }

    #[test]
    fn test_parse_trims_whitespace_and_skips_blank_lines() {
        let corpus = Corpus::parse(Cursor::new("  1.0 , 2.0  \n\n  \n3,4\n")).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.vector(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_parse_rejects_malformed_number() {
        let err = Corpus::parse(Cursor::new("1.0,abc\n")).unwrap_err();
        match err {
            PqError::Format { line, reason } => {
                assert_eq!(line, 1);
                assert!(reason.contains("abc"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_inconsistent_dim() {
        let err = Corpus::parse(Cursor::new("1,2,3\n4,5\n")).unwrap_err();
        match err {
            PqError::Format { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains('3') && reason.contains('2'));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_non_finite() {
        assert!(matches!(
            Corpus::parse(Cursor::new("1.0,NaN\n")),
            Err(PqError::Format { line: 1, .. })
        ));
        assert!(matches!(
            Corpus::parse(Cursor::new("inf,2.0\n")),
            Err(PqError::Format { line: 1, .. })
        ));
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(matches!(Corpus::parse(Cursor::new("")), Err(PqError::EmptyCorpus)));
        assert!(matches!(Corpus::parse(Cursor::new("\n  \n")), Err(PqError::EmptyCorpus)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0.1,0.2,0.3").unwrap();
        writeln!(file, "1.1,1.2,1.3").unwrap();

        let corpus = Corpus::load(file.path()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.dim(), 3);
    }

    #[test]
    fn test_new_validates() {
        assert!(Corpus::new(2, vec![1.0, 2.0, 3.0, 4.0]).is_ok());
        assert!(matches!(Corpus::new(2, vec![]), Err(PqError::EmptyCorpus)));
        assert!(matches!(
            Corpus::new(2, vec![1.0, 2.0, 3.0]),
            Err(PqError::Configuration { .. })
        ));
        assert!(matches!(
            Corpus::new(1, vec![f32::NAN]),
            Err(PqError::Configuration { .. })
        ));
    }

    #[test]
    fn test_iter_matches_vector() {
        let corpus = Corpus::parse(Cursor::new("1,2\n3,4\n5,6\n")).unwrap();
        let rows: Vec<&[f32]> = corpus.iter().collect();
        assert_eq!(rows.len(), 3);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(*row, corpus.vector(i));
        }
    }
}
