/// Normalizes a URL string into the key used for deduplication
///
/// # Normalization Steps
///
/// 1. Drop the fragment (everything from the first `#`)
/// 2. Collapse every slash that follows a slash run down to one, so any run
///    of two or more `/` becomes exactly `//`
///
/// Nothing else changes: case, trailing slashes and query strings are kept as
/// written, so `?a=1&b=2` and `?b=2&a=1` are distinct keys. The second step
/// leaves `scheme://host` intact while repairing accidental `///` runs.
///
/// # Examples
///
/// ```
/// use sumi_sieve::url::normalize_url;
///
/// assert_eq!(normalize_url("https://example.com/a#top"), "https://example.com/a");
/// assert_eq!(normalize_url("https:///example.com///a"), "https://example.com//a");
/// ```
pub fn normalize_url(url: &str) -> String {
    let without_fragment = match url.find('#') {
        Some(index) => &url[..index],
        None => url,
    };

    collapse_slash_runs(without_fragment)
}

/// Keeps at most two consecutive `/` characters
fn collapse_slash_runs(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut run = 0usize;

    for ch in input.chars() {
        if ch == '/' {
            run += 1;
            if run <= 2 {
                output.push(ch);
            }
        } else {
            run = 0;
            output.push(ch);
        }
    }

    output
}
