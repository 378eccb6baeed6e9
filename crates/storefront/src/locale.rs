//! Shopper-facing copy.
//!
//! Every string the storefront shows (category names, the search result
//! label, notifications, the checkout message) comes from here so the whole
//! surface switches language together.

use nona_store_core::{Category, Price};

/// Display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    English,
    Arabic,
}

impl Locale {
    /// Parse a language code (`en` or `ar`).
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Self::English),
            "ar" | "arabic" => Some(Self::Arabic),
            _ => None,
        }
    }

    /// Display name of a category.
    #[must_use]
    pub const fn category_name(self, category: Category) -> &'static str {
        match (self, category) {
            (Self::English, Category::All) => "All products",
            (Self::English, Category::Shoes) => "Shoes",
            (Self::English, Category::Clothes) => "Clothes",
            (Self::English, Category::Accessories) => "Accessories",
            (Self::English, Category::SmallItems) => "Small items",
            (Self::English, Category::Offers) => "Offers",
            (Self::Arabic, Category::All) => "جميع المنتجات",
            (Self::Arabic, Category::Shoes) => "الاحذيه",
            (Self::Arabic, Category::Clothes) => "الملابس",
            (Self::Arabic, Category::Accessories) => "الإكسسوارات",
            (Self::Arabic, Category::SmallItems) => "الرفايع",
            (Self::Arabic, Category::Offers) => "العروض",
        }
    }

    /// Noun for a result count, singular only when `count == 1`.
    #[must_use]
    pub const fn item_noun(self, count: usize) -> &'static str {
        match (self, count == 1) {
            (Self::English, true) => "item",
            (Self::English, false) => "items",
            (Self::Arabic, true) => "منتج",
            (Self::Arabic, false) => "منتجات",
        }
    }

    /// Label shown above search results.
    #[must_use]
    pub fn search_label(self, term: &str, count: usize) -> String {
        let noun = self.item_noun(count);
        match self {
            Self::English => format!("results for '{term}' ({count} {noun})"),
            Self::Arabic => format!("نتائج البحث عن \"{term}\" ({count} {noun})"),
        }
    }

    #[must_use]
    pub fn added_to_cart(self, product_name: &str) -> String {
        match self {
            Self::English => format!("Added \"{product_name}\" to the cart"),
            Self::Arabic => format!("تم إضافة \"{product_name}\" إلى السلة"),
        }
    }

    #[must_use]
    pub const fn cart_unavailable(self) -> &'static str {
        match self {
            Self::English => "Could not save the cart on this device",
            Self::Arabic => "تعذر حفظ السلة على هذا الجهاز",
        }
    }

    #[must_use]
    pub const fn feed_failed(self) -> &'static str {
        match self {
            Self::English => "Something went wrong while loading products",
            Self::Arabic => "حدث خطأ في تحميل المنتجات",
        }
    }

    #[must_use]
    pub const fn product_unavailable(self) -> &'static str {
        match self {
            Self::English => "This product is no longer available",
            Self::Arabic => "المنتج غير متوفر",
        }
    }

    /// Pre-filled checkout message with blank buyer fields.
    #[must_use]
    pub fn checkout_message(self, product_name: &str, price: Price, currency: &str) -> String {
        match self {
            Self::English => format!(
                "Hello, I would like to buy:\n\n\
                 📦 Product: {product_name}\n\
                 💰 Price: {price} {currency}\n\n\
                 Name: _________\n\
                 Address: _________\n\
                 Phone: _________"
            ),
            Self::Arabic => format!(
                "مرحباً، أريد شراء المنتج:\n\n\
                 📦 المنتج: {product_name}\n\
                 💰 السعر: {price} {currency}\n\n\
                 الاسم: _________\n\
                 العنوان: _________\n\
                 رقم الهاتف: _________"
            ),
        }
    }
}
