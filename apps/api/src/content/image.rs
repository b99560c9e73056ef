use tracing::warn;

use crate::content::models::{ContentIdentifier, ImageReference};
use crate::content::store::ContentStore;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png"];

/// Computes the page image URL. Never fails: an absent image, or a store
/// error while probing for one, resolves to the placeholder.
pub struct ImageResolver<'a> {
    store: &'a dyn ContentStore,
    url_prefix: &'a str,
    placeholder_url: &'a str,
}

impl<'a> ImageResolver<'a> {
    pub fn new(store: &'a dyn ContentStore, url_prefix: &'a str, placeholder_url: &'a str) -> Self {
        Self {
            store,
            url_prefix,
            placeholder_url,
        }
    }

    pub async fn resolve(&self, identifier: &ContentIdentifier) -> ImageReference {
        let directory = identifier.chapter_dir();
        for ext in IMAGE_EXTENSIONS {
            let file_name = format!("page{}.{ext}", identifier.page);
            let key = directory.join(&file_name);
            match self.store.exists(&key).await {
                Ok(true) => {
                    return ImageReference {
                        url: format!(
                            "{}/{}/{}/{}/{}",
                            self.url_prefix,
                            identifier.book,
                            identifier.class_id,
                            identifier.chapter,
                            file_name
                        ),
                        is_placeholder: false,
                    };
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("Image probe failed for {}: {e}", key.display());
                    break;
                }
            }
        }
        self.placeholder()
    }

    pub fn placeholder(&self) -> ImageReference {
        ImageReference {
            url: self.placeholder_url.to_string(),
            is_placeholder: true,
        }
    }
}
