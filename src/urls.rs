use url::Url;

const DRIVE_VIEWER_BASE: &str = "https://drive.google.com/file/d/";

/// Builds links that open a stored file in the storage service's web
/// interface.
#[derive(Clone, Debug)]
pub struct ViewerLinks {
    /// Prefix every file ID is appended to, including trailing slash.
    base: Url,
}

impl ViewerLinks {
    pub fn new(base: Url) -> Self {
        ViewerLinks { base }
    }

    /// The link for `id`, or an empty string when there is no ID.
    ///
    /// ```
    /// use uploader::urls::ViewerLinks;
    /// let links = ViewerLinks::default();
    /// assert_eq!(links.link(Some("abc123")), "https://drive.google.com/file/d/abc123/view");
    /// assert_eq!(links.link(None), "");
    /// ```
    pub fn link(&self, id: Option<&str>) -> String {
        match id.filter(|id| !id.is_empty()) {
            Some(id) => self
                .base
                .join(&format!("{}/view", id))
                .map(String::from)
                .unwrap_or_default(),
            None => String::new(),
        }
    }
}

impl Default for ViewerLinks {
    fn default() -> Self {
        ViewerLinks {
            base: Url::parse(DRIVE_VIEWER_BASE).expect("parse viewer base URL"),
        }
    }
}
