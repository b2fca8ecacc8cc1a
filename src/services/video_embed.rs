const EMBED_PREFIX: &str = "https://www.youtube.com/embed/";
const VIDEO_ID_LEN: usize = 11;

/// URL fragments that precede a YouTube video id, in lookup order.
const VIDEO_ID_MARKERS: [&str; 3] = ["youtube.com/watch?v=", "youtu.be/", "youtube.com/embed/"];

/// Rewrites YouTube watch, short and embed links to a clean embed URL.
/// Anything unrecognised is returned unchanged.
pub(crate) fn youtube_embed_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    VIDEO_ID_MARKERS
        .iter()
        .find_map(|marker| video_id_after(url, marker))
        .map(|video_id| format!("{EMBED_PREFIX}{video_id}"))
        .unwrap_or_else(|| url.to_string())
}

fn video_id_after<'a>(url: &'a str, marker: &str) -> Option<&'a str> {
    url.match_indices(marker).find_map(|(index, _)| {
        let rest = &url[index + marker.len()..];
        let candidate = rest.get(..VIDEO_ID_LEN)?;
        candidate
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-')
            .then_some(candidate)
    })
}
