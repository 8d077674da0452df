//! MIME type guessing for attachments.

/// Guess a MIME type from a file name's extension.
///
/// Unknown or missing extensions map to `application/octet-stream`.
pub fn guess_content_type(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_owned()
}
