//! Response Assembler — drives one request through
//! `Validating → Locating → Normalizing → Assembling` and decides between
//! success, degraded success, and failure.
//!
//! Whether absent content is a 404 or an empty page is a deployment choice
//! ([`Strictness`]); the assembler never picks one silently.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Config;
use crate::content::image::ImageResolver;
use crate::content::locator::{describe, ContentLocator};
use crate::content::models::{
    ContentIdentifier, ImageReference, NormalizedPage, PageQuery, Strictness,
};
use crate::content::normalizer::{normalize, PageScope};
use crate::content::paginator::paginate;
use crate::content::sanitizer::sanitize;
use crate::content::store::ContentStore;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Locating,
    Normalizing,
    Assembling,
}

#[derive(Debug, Clone)]
pub struct ResolutionSettings {
    pub strictness: Strictness,
    pub page_size: usize,
    pub static_url_prefix: String,
    pub placeholder_image_url: String,
}

impl From<&Config> for ResolutionSettings {
    fn from(config: &Config) -> Self {
        Self {
            strictness: config.strictness,
            page_size: config.page_size,
            static_url_prefix: config.static_url_prefix.clone(),
            placeholder_image_url: config.placeholder_image_url.clone(),
        }
    }
}

/// A successful resolution. `Degraded` is only produced in lenient mode, in
/// place of what strict mode reports as NotFound.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Resolved(NormalizedPage),
    Degraded(NormalizedPage),
}

impl PageOutcome {
    pub fn into_page(self) -> NormalizedPage {
        match self {
            PageOutcome::Resolved(page) | PageOutcome::Degraded(page) => page,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, PageOutcome::Degraded(_))
    }
}

/// Stateless entry point shared by all handlers.
#[derive(Clone)]
pub struct ContentEngine {
    store: Arc<dyn ContentStore>,
    settings: ResolutionSettings,
}

impl ContentEngine {
    pub fn new(store: Arc<dyn ContentStore>, settings: ResolutionSettings) -> Self {
        Self { store, settings }
    }

    pub async fn resolve_page(&self, query: &PageQuery) -> Result<PageOutcome, AppError> {
        debug!("[{:?}] {query:?}", Stage::Validating);
        let id = ContentIdentifier::from_query(query)?;

        let store = self.store.as_ref();
        let locator = ContentLocator::new(store);
        let images = ImageResolver::new(
            store,
            &self.settings.static_url_prefix,
            &self.settings.placeholder_image_url,
        );

        // Image and question resolution are independent; neither blocks the other.
        debug!("[{:?}] {}", Stage::Locating, id.chapter_dir().display());
        let (located, image) = tokio::join!(locator.locate(&id), images.resolve(&id));
        if image.is_placeholder {
            debug!("No image for page {}, using placeholder", id.page);
        }

        let Some(location) = located? else {
            let message = format!(
                "No questions found for {}/{}/{} page {} (type {})",
                id.book, id.class_id, id.chapter, id.page, id.question_type
            );
            return self.absent(message, &id, images.placeholder());
        };

        debug_assert!(location.exists);
        debug!("[{:?}] {}", Stage::Normalizing, describe(&location));
        let path = location.file_path.display().to_string();
        let document = locator.load(&location).await?;
        let normalized = normalize(document, &id, location.convention)
            .ok_or_else(|| AppError::corrupt(path.clone(), "unrecognized top-level shape"))?;
        let records = sanitize(normalized.questions, id.question_type);

        debug!(
            "[{:?}] {} records, shape {:?}",
            Stage::Assembling,
            records.len(),
            normalized.shape
        );
        let (questions, total_pages, in_range) = match normalized.scope {
            PageScope::Page { found, total_pages } => (records, total_pages, found),
            PageScope::Chapter => {
                let slice = paginate(records, id.page as usize, self.settings.page_size);
                // Page 1 of an empty chapter is an empty page, not a missing one.
                let in_range = (id.page as usize) <= slice.total_pages.max(1);
                (slice.items, Some(slice.total_pages), in_range)
            }
        };

        if !in_range {
            let message = format!("Page {} is out of range for {path}", id.page);
            let placeholder = images.placeholder();
            return self.absent(message, &id, placeholder).map(|outcome| match outcome {
                PageOutcome::Degraded(mut page) => {
                    page.total_pages = total_pages;
                    PageOutcome::Degraded(page)
                }
                resolved => resolved,
            });
        }

        Ok(PageOutcome::Resolved(NormalizedPage {
            questions,
            page: id.page,
            total_pages,
            image,
        }))
    }

    /// Strict: NotFound. Lenient: an empty page showing the placeholder image.
    fn absent(
        &self,
        message: String,
        id: &ContentIdentifier,
        image: ImageReference,
    ) -> Result<PageOutcome, AppError> {
        match self.settings.strictness {
            Strictness::Strict => Err(AppError::NotFound(message)),
            Strictness::Lenient => {
                info!("Serving empty page: {message}");
                Ok(PageOutcome::Degraded(NormalizedPage {
                    questions: Vec::new(),
                    page: id.page,
                    total_pages: None,
                    image,
                }))
            }
        }
    }
}
