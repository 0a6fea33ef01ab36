use std::collections::HashSet;

/// Basename for a layer: the part after the last `/` or `\`, without its last `.` suffix.
pub fn layer_basename(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = last.rsplit_once('.').map_or(last, |(stem, _)| stem);
    stem.trim().to_string()
}

/// Hands out unique file names within one export run.
///
/// Names are compared case-insensitively, so two results never map to the same file on a
/// case-folding filesystem either.
#[derive(Debug, Default)]
pub struct FileNamer {
    used: HashSet<String>,
}

impl FileNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// File name for leaf `index` named `layer_name`, with `extension` appended.
    pub fn file_name(&mut self, layer_name: &str, index: usize, extension: &str) -> String {
        let mut base = layer_basename(layer_name);
        if base.is_empty() {
            base = format!("layer_{index}");
        }
        let mut candidate = with_extension(&base, extension);
        let mut n = 1usize;
        while !self.used.insert(candidate.to_lowercase()) {
            n += 1;
            candidate = with_extension(&format!("{base}_{n}"), extension);
        }
        candidate
    }
}

fn with_extension(stem: &str, extension: &str) -> String {
    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{extension}")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/naming.rs"]
mod tests;
