//! Product detail modal with an image carousel.
//!
//! # States
//!
//! ```text
//! Closed --open(product)--> Open { index: 0 }
//! Open   --next/previous--> Open { index wraps modulo image count }
//! Open   --select(i)------> Open { index: i }     (ignored when out of range)
//! Open   --close----------> Closed                (scroll lock released)
//! ```
//!
//! Opening locks background scrolling; every path back to `Closed` releases
//! it. The state is transient and never persisted.

use nona_store_core::{Product, ProductId};
use serde::Serialize;

/// Gallery state machine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GalleryState {
    #[default]
    Closed,
    Open {
        /// Copied when the modal opened.
        product: Product,
        current_index: usize,
    },
}

/// Where a click inside the modal landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickTarget {
    /// The dimmed backdrop around the modal.
    Overlay,
    /// Anything inside the modal content region.
    Content,
}

/// The modal gallery plus the scroll lock it owns.
#[derive(Debug, Clone, Default)]
pub struct ModalGallery {
    state: GalleryState,
    scroll_locked: bool,
}

/// The image slot of the modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum GalleryImage {
    /// The product has no images.
    Placeholder,
    Url(String),
}

/// A thumbnail strip entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thumbnail {
    pub index: usize,
    pub url: String,
    pub active: bool,
}

/// Render model for the modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryView {
    pub open: bool,
    pub product_id: Option<ProductId>,
    pub image: Option<GalleryImage>,
    pub current_index: usize,
    pub image_count: usize,
    /// Previous/next controls are shown only for multi-image products.
    pub navigation_enabled: bool,
    pub thumbnails: Vec<Thumbnail>,
    pub scroll_locked: bool,
}

impl ModalGallery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the modal on a product, replacing any product already shown.
    pub fn open(&mut self, product: &Product) {
        self.state = GalleryState::Open {
            product: product.clone(),
            current_index: 0,
        };
        self.scroll_locked = true;
    }

    /// Show the next image, wrapping to the first.
    pub fn next(&mut self) {
        self.step(true);
    }

    /// Show the previous image, wrapping to the last.
    pub fn previous(&mut self) {
        self.step(false);
    }

    fn step(&mut self, forward: bool) {
        if let GalleryState::Open {
            product,
            current_index,
        } = &mut self.state
        {
            let count = product.images.len();
            if count == 0 {
                return;
            }
            *current_index = if forward {
                (*current_index + 1) % count
            } else {
                (*current_index + count - 1) % count
            };
        }
    }

    /// Jump to an image. Returns `false` (and changes nothing) when the modal
    /// is closed or `index` is out of range.
    pub fn select(&mut self, index: usize) -> bool {
        match &mut self.state {
            GalleryState::Open {
                product,
                current_index,
            } if index < product.images.len() => {
                *current_index = index;
                true
            }
            _ => false,
        }
    }

    /// Close the modal and release the scroll lock. Returns whether it was
    /// open.
    pub fn close(&mut self) -> bool {
        let was_open = self.is_open();
        self.state = GalleryState::Closed;
        self.scroll_locked = false;
        was_open
    }

    /// Handle a click: only a click on the overlay closes the modal.
    pub fn click(&mut self, target: ClickTarget) -> bool {
        match target {
            ClickTarget::Overlay => self.close(),
            ClickTarget::Content => false,
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, GalleryState::Open { .. })
    }

    #[must_use]
    pub const fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    #[must_use]
    pub const fn state(&self) -> &GalleryState {
        &self.state
    }

    /// Index of the displayed image, if open.
    #[must_use]
    pub const fn current_index(&self) -> Option<usize> {
        match &self.state {
            GalleryState::Open { current_index, .. } => Some(*current_index),
            GalleryState::Closed => None,
        }
    }

    /// Build the render model.
    #[must_use]
    pub fn view(&self) -> GalleryView {
        match &self.state {
            GalleryState::Closed => GalleryView {
                open: false,
                product_id: None,
                image: None,
                current_index: 0,
                image_count: 0,
                navigation_enabled: false,
                thumbnails: Vec::new(),
                scroll_locked: self.scroll_locked,
            },
            GalleryState::Open {
                product,
                current_index,
            } => {
                let images = &product.images;
                let navigation_enabled = product.has_gallery();
                let image = images
                    .get(*current_index)
                    .map_or(GalleryImage::Placeholder, |url| GalleryImage::Url(url.clone()));
                let thumbnails = if navigation_enabled {
                    images
                        .iter()
                        .enumerate()
                        .map(|(index, url)| Thumbnail {
                            index,
                            url: url.clone(),
                            active: index == *current_index,
                        })
                        .collect()
                } else {
                    Vec::new()
                };

                GalleryView {
                    open: true,
                    product_id: Some(product.id.clone()),
                    image: Some(image),
                    current_index: *current_index,
                    image_count: images.len(),
                    navigation_enabled,
                    thumbnails,
                    scroll_locked: self.scroll_locked,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use nona_store_core::{Category, Price};

    use super::*;

    fn product(image_count: usize) -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "Shoe A".to_string(),
            description: None,
            price: Price::from(100),
            category: Category::Shoes,
            images: (0..image_count).map(|i| format!("img{i}.jpg")).collect(),
        }
    }

    #[test]
    fn test_starts_closed() {
        let gallery = ModalGallery::new();
        assert!(!gallery.is_open());
        assert!(!gallery.scroll_locked());
        assert_eq!(gallery.current_index(), None);
        assert!(!gallery.view().open);
    }

    #[test]
    fn test_open_starts_at_first_image_and_locks_scroll() {
        let mut gallery = ModalGallery::new();
        gallery.open(&product(3));

        assert_eq!(gallery.current_index(), Some(0));
        assert!(gallery.scroll_locked());
        let view = gallery.view();
        assert_eq!(view.image, Some(GalleryImage::Url("img0.jpg".to_string())));
        assert!(view.navigation_enabled);
        assert_eq!(view.thumbnails.len(), 3);
        assert!(view.thumbnails[0].active);
    }

    #[test]
    fn test_next_wraps_cyclically() {
        let mut gallery = ModalGallery::new();
        gallery.open(&product(3));
        gallery.next();
        gallery.next();
        assert_eq!(gallery.current_index(), Some(2));
        gallery.next();
        assert_eq!(gallery.current_index(), Some(0));
    }

    #[test]
    fn test_previous_wraps_to_last() {
        let mut gallery = ModalGallery::new();
        gallery.open(&product(3));
        gallery.previous();
        assert_eq!(gallery.current_index(), Some(2));
        gallery.previous();
        assert_eq!(gallery.current_index(), Some(1));
    }

    #[test]
    fn test_zero_images_render_placeholder_without_navigation() {
        let mut gallery = ModalGallery::new();
        gallery.open(&product(0));
        gallery.next();
        gallery.previous();

        let view = gallery.view();
        assert_eq!(view.image, Some(GalleryImage::Placeholder));
        assert!(!view.navigation_enabled);
        assert!(view.thumbnails.is_empty());
        assert_eq!(view.current_index, 0);
    }

    #[test]
    fn test_single_image_has_no_navigation() {
        let mut gallery = ModalGallery::new();
        gallery.open(&product(1));
        gallery.next();

        let view = gallery.view();
        assert_eq!(view.current_index, 0);
        assert!(!view.navigation_enabled);
    }

    #[test]
    fn test_select_in_and_out_of_range() {
        let mut gallery = ModalGallery::new();
        gallery.open(&product(3));

        assert!(gallery.select(2));
        assert_eq!(gallery.current_index(), Some(2));
        assert!(!gallery.select(3));
        assert_eq!(gallery.current_index(), Some(2));
    }

    #[test]
    fn test_select_while_closed_is_ignored() {
        let mut gallery = ModalGallery::new();
        assert!(!gallery.select(0));
        gallery.next();
        assert!(!gallery.is_open());
    }

    #[test]
    fn test_close_releases_scroll_lock() {
        let mut gallery = ModalGallery::new();
        gallery.open(&product(2));
        assert!(gallery.close());
        assert!(!gallery.scroll_locked());
        assert_eq!(gallery.state(), &GalleryState::Closed);
        assert!(!gallery.close());
    }

    #[test]
    fn test_only_overlay_click_closes() {
        let mut gallery = ModalGallery::new();
        gallery.open(&product(2));

        assert!(!gallery.click(ClickTarget::Content));
        assert!(gallery.is_open());
        assert!(gallery.click(ClickTarget::Overlay));
        assert!(!gallery.is_open());
        assert!(!gallery.scroll_locked());
    }

    #[test]
    fn test_images_are_copied_at_open_time() {
        let mut source = product(2);
        let mut gallery = ModalGallery::new();
        gallery.open(&source);
        source.images.clear();

        assert_eq!(gallery.view().image_count, 2);
    }
}
