use tracing::{debug, info};

use super::{model::LikedEntry, source::LikedSource};
use crate::error::FetchError;

pub const PAGE_SIZE: u32 = 50;

/// Requests pages of [`PAGE_SIZE`] until one comes back empty and returns
/// every entry in request order. The first failing request aborts the fetch.
#[allow(dead_code)]
pub async fn fetch_all_liked(source: &dyn LikedSource) -> Result<Vec<LikedEntry>, FetchError> {
    fetch_all_liked_with_progress(source, |_| {}).await
}

/// Same as [`fetch_all_liked`], reporting the running total after each page.
pub async fn fetch_all_liked_with_progress<F>(
    source: &dyn LikedSource,
    mut on_page: F,
) -> Result<Vec<LikedEntry>, FetchError>
where
    F: FnMut(usize) + Send,
{
    let mut entries = Vec::new();
    let mut offset: u32 = 0;

    loop {
        let page = source
            .liked_page(offset, PAGE_SIZE)
            .await
            .map_err(|source| FetchError { offset, source })?;
        if page.is_empty() {
            break;
        }

        debug!(offset, count = page.len(), "fetched liked songs page");
        offset += page.len() as u32;
        entries.extend(page);
        on_page(entries.len());
    }

    info!(total = entries.len(), "fetched all liked songs");
    Ok(entries)
}
