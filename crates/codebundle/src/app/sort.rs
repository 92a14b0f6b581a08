//! Ordering policies for discovered files.

use crate::domain::model::{SortMode, SourceFile};

/// Order `files` according to `mode`. Every mode is deterministic for a given input order.
pub fn sort_files(mut files: Vec<SourceFile>, mode: SortMode) -> Vec<SourceFile> {
    match mode {
        SortMode::Alphabetical => files.sort_by(|a, b| {
            a.file_name()
                .cmp(&b.file_name())
                .then_with(|| a.path.cmp(&b.path))
        }),
        // `sort_by` is stable, so equal extensions keep their discovery order.
        SortMode::ByLanguage => files.sort_by(|a, b| a.extension.cmp(&b.extension)),
        SortMode::None => {}
    }
    files
}
