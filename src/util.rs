use std::path::PathBuf;

/// a path under the crate root, from its segments
pub fn manifest_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR")]
        .into_iter()
        .chain(segments)
        .collect()
}
