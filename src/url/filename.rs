use std::collections::HashMap;
use url::Url;

/// Rules for turning an image URL into an on-disk filename
///
/// The last path segment is used as-is when it looks like a real filename.
/// Otherwise a name is synthesized from a per-page counter that only ever
/// grows, so two synthesized names never collide inside one page directory.
/// Because the counter depends only on the page's own images, the same page
/// yields the same names no matter which page a run started from.
#[derive(Debug, Clone)]
pub struct FilenamePolicy {
    fallback_extension: String,
    min_length: usize,
    next_synthetic: HashMap<u32, u64>,
}

impl FilenamePolicy {
    pub fn new(fallback_extension: impl Into<String>, min_length: usize) -> Self {
        Self {
            fallback_extension: fallback_extension.into(),
            min_length,
            next_synthetic: HashMap::new(),
        }
    }

    /// Returns the filename an image should be stored under
    ///
    /// Takes `&mut self` because a synthesized name consumes a value of
    /// `page`'s counter.
    pub fn filename_for(&mut self, url: &Url, page: u32) -> String {
        match url_filename(url) {
            Some(name) if self.is_plausible(&name) => name,
            _ => self.synthesize(page),
        }
    }

    /// A name is kept when it has an extension marker and is long enough
    fn is_plausible(&self, name: &str) -> bool {
        name.contains('.') && name.chars().count() >= self.min_length
    }

    fn synthesize(&mut self, page: u32) -> String {
        let next = self.next_synthetic.entry(page).or_insert(1);
        let name = format!("image_{}.{}", next, self.fallback_extension);
        *next += 1;
        name
    }
}

impl Default for FilenamePolicy {
    fn default() -> Self {
        Self::new("jpg", 5)
    }
}

/// Extracts the last non-empty path segment of a URL
///
/// Segments that could escape the page directory (`.`/`..`) are rejected.
fn url_filename(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.last()?;
    if segment.is_empty() || segment == "." || segment == ".." {
        return None;
    }
    if segment.contains(['\\', '\0']) {
        return None;
    }
    Some(segment.to_string())
}
