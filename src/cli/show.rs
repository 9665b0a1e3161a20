use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::cli::SubCommandExtend;
use crate::config::Opts;
use crate::corpus::Corpus;

#[derive(Parser, Debug, Clone)]
pub struct ShowCommand {
    /// 向量文件路径
    pub path: PathBuf,
    /// 预览打印的向量数量
    #[arg(short, long, default_value_t = 5)]
    pub count: usize,
}

impl SubCommandExtend for ShowCommand {
    fn run(&self, _opts: &Opts) -> Result<()> {
        let corpus = Corpus::load(&self.path)?;
        println!("向量数量: {}", corpus.len());
        println!("向量维度: {}", corpus.dim());

        for (i, v) in corpus.iter().take(self.count).enumerate() {
            let coords =
                v.iter().map(|x| format!("{x:.4}")).collect::<Vec<_>>().join(", ");
            println!("#{i}: [{coords}]");
        }
        Ok(())
    }
}
