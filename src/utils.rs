use indicatif::ProgressStyle;

/// 全局统一的进度条样式
pub fn pb_style() -> ProgressStyle {
    ProgressStyle::with_template("[{elapsed_precise}] {wide_bar} {pos}/{len} {msg}")
        .expect("failed to build progress style")
}
