//! Background image decoding to keep the UI thread responsive.
//!
//! Large preview images are decoded one thread per request.  Thumbnails of a
//! page are decoded by a small worker pool; the page counts as loaded once
//! every thumbnail has settled, decoded or not.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use image::RgbaImage;
use thiserror::Error;
use tokio::sync::mpsc;
use url::Url;

use crate::core::preview::PreviewId;

/// Long side of a decoded large image, in pixels.
pub const LARGE_MAX_PX: u32 = 1600;
/// Long side of a decoded thumbnail, in pixels.
pub const THUMB_MAX_PX: u32 = 256;

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("cannot load `{0}`: only file:// images are supported")]
    UnsupportedScheme(Url),

    #[error("`{0}` does not name a local file")]
    NotAPath(Url),

    #[error("cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type Thumbs = Vec<Option<Arc<RgbaImage>>>;

pub enum ImageUpdate {
    Large {
        preview: PreviewId,
        src: Url,
        result: Result<Arc<RgbaImage>, ImageLoadError>,
    },
    /// Every thumbnail of page `page` has settled.
    PageSettled { page: usize, thumbs: Thumbs },
}

/// Decode `src`, shrinking it to fit `max_px` on its long side.
pub fn decode(src: &Url, max_px: u32) -> Result<RgbaImage, ImageLoadError> {
    if src.scheme() != "file" {
        return Err(ImageLoadError::UnsupportedScheme(src.clone()));
    }
    let path = src
        .to_file_path()
        .map_err(|_| ImageLoadError::NotAPath(src.clone()))?;
    let img = image::open(&path).map_err(|source| ImageLoadError::Decode { path, source })?;
    let img = if img.width() > max_px || img.height() > max_px {
        img.thumbnail(max_px, max_px)
    } else {
        img
    };
    Ok(img.to_rgba8())
}

pub fn spawn_image_load(tx: mpsc::UnboundedSender<ImageUpdate>, preview: PreviewId, src: Url) {
    std::thread::spawn(move || {
        let result = decode(&src, LARGE_MAX_PX).map(Arc::new);
        let _ = tx.send(ImageUpdate::Large {
            preview,
            src,
            result,
        });
    });
}

/// Preload the thumbnails of page `page` and report once all have settled.
pub fn spawn_page_preload(tx: mpsc::UnboundedSender<ImageUpdate>, page: usize, sources: Vec<Option<Url>>) {
    images_loaded(sources, move |thumbs| {
        let _ = tx.send(ImageUpdate::PageSettled { page, thumbs });
    });
}

/// Decode every source on a worker pool and call `done` exactly once when
/// all have settled.  A failed or missing source settles as `None`.  With no
/// sources `done` runs immediately on the calling thread.
pub fn images_loaded<F>(sources: Vec<Option<Url>>, done: F)
where
    F: FnOnce(Thumbs) + Send + 'static,
{
    let total = sources.len();
    if total == 0 {
        done(Vec::new());
        return;
    }

    let queue: VecDeque<(usize, Option<Url>)> = sources.into_iter().enumerate().collect();
    let queue = Arc::new(Mutex::new(queue));
    let results: Arc<Mutex<Thumbs>> = Arc::new(Mutex::new(vec![None; total]));
    let remaining = Arc::new(AtomicUsize::new(total));
    let done = Arc::new(Mutex::new(Some(done)));

    let max_threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .clamp(1, 4);

    for _ in 0..max_threads.min(total) {
        let queue = Arc::clone(&queue);
        let results = Arc::clone(&results);
        let remaining = Arc::clone(&remaining);
        let done = Arc::clone(&done);
        std::thread::spawn(move || loop {
            let job = match queue.lock() {
                Ok(mut q) => q.pop_front(),
                Err(_) => None,
            };
            let Some((slot, src)) = job else {
                break;
            };

            let thumb = src.and_then(|src| match decode(&src, THUMB_MAX_PX) {
                Ok(img) => Some(Arc::new(img)),
                Err(e) => {
                    tracing::warn!("thumbnail failed: {e}");
                    None
                }
            });
            if let Ok(mut r) = results.lock() {
                r[slot] = thumb;
            }

            // The worker settling the last image reports for everyone.
            if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                let thumbs = results.lock().map(|mut r| std::mem::take(&mut *r)).unwrap_or_default();
                if let Some(done) = done.lock().ok().and_then(|mut d| d.take()) {
                    done(thumbs);
                }
            }
        });
    }
}
