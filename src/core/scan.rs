//! Directory sources: turn the image files under a directory into grid
//! items.
//!
//! The walker respects `.gitignore` rules via the [`ignore`] crate, skips
//! hidden entries unless asked, and caps the depth.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use ignore::WalkBuilder;

use super::item::ItemPayload;

/// Configuration knobs for the scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum depth to descend (1 = immediate children only).
    pub max_depth: usize,
    pub respect_gitignore: bool,
    pub show_hidden: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_depth: 1,
            respect_gitignore: true,
            show_hidden: false,
        }
    }
}

/// Collect the images under `root`, sorted by path.  Unreadable entries are
/// skipped.
pub fn scan_images(root: &Path, config: &ScanConfig) -> Vec<ItemPayload> {
    let walker = WalkBuilder::new(root)
        .max_depth(Some(config.max_depth.max(1)))
        .hidden(!config.show_hidden)
        .git_ignore(config.respect_gitignore)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut found = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        let Some(mime) = image_mime(path) else {
            continue;
        };
        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };
        let meta = entry.metadata().ok();
        found.push((rel.to_path_buf(), payload_for(rel, &mime, meta.as_ref())));
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));
    tracing::info!(root = %root.display(), count = found.len(), "scanned image directory");
    found.into_iter().map(|(_, p)| p).collect()
}

/// MIME type of `path` when it is an image.  Content sniffing decides;
/// the extension is consulted only when sniffing is inconclusive.
fn image_mime(path: &Path) -> Option<String> {
    let sniffed = tree_magic_mini::from_filepath(path);
    match sniffed {
        Some(m) if m.starts_with("image/") => Some(m.to_string()),
        None | Some("application/octet-stream") => image::ImageFormat::from_path(path)
            .ok()
            .map(|f| f.to_mime_type().to_string()),
        Some(_) => None,
    }
}

fn payload_for(rel: &Path, mime: &str, meta: Option<&std::fs::Metadata>) -> ItemPayload {
    let href = relative_href(rel);
    let title = rel
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| rel.display().to_string());

    let mut description = mime.to_string();
    if let Some(meta) = meta {
        description.push_str(&format!(" · {}", human_size(meta.len())));
        if let Some(ts) = meta.modified().ok().and_then(to_unix_secs) {
            description.push_str(&format!(" · modified {}", format_ts(ts)));
        }
    }

    ItemPayload {
        thumb: href.clone(),
        largesrc: href,
        title,
        description,
        url: None,
    }
}

/// Relative reference for `rel`, with the characters that would end a URL
/// path escaped.  The leading `./` keeps a colon in the first segment from
/// reading as a URL scheme.
fn relative_href(rel: &Path) -> String {
    let mut out = String::from(".");
    for part in rel.components() {
        out.push('/');
        for c in part.as_os_str().to_string_lossy().chars() {
            match c {
                '%' => out.push_str("%25"),
                '#' => out.push_str("%23"),
                '?' => out.push_str("%3F"),
                '\\' => out.push_str("%5C"),
                c => out.push(c),
            }
        }
    }
    out
}

/// Human-readable size string.
pub fn human_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    for &unit in UNITS {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} PiB")
}

fn to_unix_secs(t: SystemTime) -> Option<u64> {
    t.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}

fn format_ts(unix_secs: u64) -> String {
    use chrono::{Local, TimeZone};
    let s = i64::try_from(unix_secs).unwrap_or(i64::MAX);
    match Local.timestamp_opt(s, 0).single() {
        Some(dt) => dt.format("%Y/%m/%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}
