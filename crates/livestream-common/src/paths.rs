//! Name utilities for detecting queue images by extension.

/// Image extensions accepted in the queue, lowercase.
const QUEUE_IMAGE_EXTENSIONS: &[&str] = &["jpg", "png"];

fn extension(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(_, ext)| ext)
}

/// Check if a file name has one of the queue image extensions.
///
/// The naming grammar is case-sensitive, so `IMG.JPG` is not a queue image.
///
/// # Examples
///
/// ```
/// use livestream_common::paths::is_queue_image;
///
/// assert!(is_queue_image("2025-03-01.18-00-00.jpg"));
/// assert!(is_queue_image("poster.png"));
/// assert!(!is_queue_image("defaults.json"));
/// assert!(!is_queue_image("IMG.JPG"));
/// ```
pub fn is_queue_image(name: &str) -> bool {
    extension(name)
        .map(|ext| QUEUE_IMAGE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// MIME type for an image name, used when uploading thumbnails.
///
/// # Examples
///
/// ```
/// use livestream_common::paths::image_mime_type;
///
/// assert_eq!(image_mime_type("a.png"), Some("image/png"));
/// assert_eq!(image_mime_type("a.jpeg"), Some("image/jpeg"));
/// assert_eq!(image_mime_type("a.txt"), None);
/// ```
pub fn image_mime_type(name: &str) -> Option<&'static str> {
    match extension(name)?.to_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}
