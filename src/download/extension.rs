/// Picks a file extension from a Content-Type header value
///
/// Substring match, case-insensitive, checked in order png, gif, webp;
/// anything else (including a missing header) is saved as `.jpg`.
pub fn extension_for(content_type: &str) -> &'static str {
    let lowered = content_type.to_ascii_lowercase();
    if lowered.contains("png") {
        ".png"
    } else if lowered.contains("gif") {
        ".gif"
    } else if lowered.contains("webp") {
        ".webp"
    } else {
        ".jpg"
    }
}

/// File name for the image with dispatch index `index`
pub fn image_file_name(index: usize, content_type: &str) -> String {
    format!("img_{}{}", index, extension_for(content_type))
}
