//! Checkout hand-off to an external messaging service.
//!
//! Checkout is a link to a chat with the shop, pre-filled with the product
//! and blank buyer fields. Nothing is awaited after the link is handed out.

use nona_store_core::Product;
use url::Url;

use crate::config::CheckoutConfig;
use crate::locale::Locale;

const MESSAGING_BASE: &str = "https://wa.me/";

/// Build the checkout link for a product.
///
/// # Errors
///
/// Returns `url::ParseError` if the configured phone number does not form a
/// valid URL path.
pub fn checkout_link(
    config: &CheckoutConfig,
    locale: Locale,
    product: &Product,
) -> Result<Url, url::ParseError> {
    let message = locale.checkout_message(&product.name, product.price, &config.currency_label);
    let link = format!(
        "{MESSAGING_BASE}{}?text={}",
        config.phone,
        urlencoding::encode(&message)
    );
    Url::parse(&link)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nona_store_core::{Category, Price, ProductId};

    use super::*;

    fn config() -> CheckoutConfig {
        CheckoutConfig {
            phone: "201208048922".to_string(),
            currency_label: "EGP".to_string(),
        }
    }

    fn product() -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "Shoe A & Co".to_string(),
            description: None,
            price: Price::from(100),
            category: Category::Shoes,
            images: Vec::new(),
        }
    }

    #[test]
    fn test_link_targets_configured_number() {
        let url = checkout_link(&config(), Locale::English, &product()).unwrap();
        assert_eq!(url.host_str(), Some("wa.me"));
        assert_eq!(url.path(), "/201208048922");
    }

    #[test]
    fn test_message_round_trips_through_query() {
        let url = checkout_link(&config(), Locale::English, &product()).unwrap();
        let (key, text) = url.query_pairs().next().unwrap();

        assert_eq!(key, "text");
        assert!(text.contains("Product: Shoe A & Co"));
        assert!(text.contains("Price: 100 EGP"));
        assert!(text.contains("Address: _________"));
        assert_eq!(url.query_pairs().count(), 1);
    }

    #[test]
    fn test_arabic_message() {
        let url = checkout_link(&config(), Locale::Arabic, &product()).unwrap();
        let (_, text) = url.query_pairs().next().unwrap();
        assert!(text.contains("السعر: 100 EGP"));
    }
}
