use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Course descriptions, review comments and profile bios arrive from the
/// browser as free text and are rendered back to other users, so they are
/// sanitized with a whitelist strategy: safe tags (like <b>, <p>) are kept,
/// dangerous tags (like <script>, <iframe>) and attributes (like onclick)
/// are stripped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_tags() {
        let cleaned = clean_html("Learn <b>Rust</b><script>alert(1)</script>");
        assert_eq!(cleaned, "Learn <b>Rust</b>");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(clean_html("Great course, would recommend"), "Great course, would recommend");
    }
}
