pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod kmeans;
pub mod pq;
pub mod utils;

pub use config::Opts;
pub use corpus::Corpus;
pub use error::{PqError, Result};
pub use pq::{Codebook, ProductQuantizer};
