use url::Url;

use crate::document::DocumentId;

/// Where the browser fetches a document's bytes: `{base}/documents/{id}`.
///
/// The id is percent-encoded as a single path segment. Nothing is requested
/// here; the store streams the blob when the link is followed.
pub fn download_url(base: &Url, id: &DocumentId) -> Url {
    endpoint(base, &["documents", id.as_str()])
}

pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    // Only cannot-be-a-base URLs refuse segments, and base URLs are checked
    // for that when the store client is built.
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
