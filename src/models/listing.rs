use serde::{Deserialize, Serialize};

/// Sentinel used for listing fields a marketplace page did not provide
pub const NOT_AVAILABLE: &str = "not available";

/// One product record extracted from a marketplace search-results page
///
/// Prices are kept in the site's own formatting. Duplicates across
/// marketplaces are preserved as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Listing {
    pub name: String,
    #[serde(rename = "image")]
    pub image_url: String,
    pub price: String,
    /// Absolute product URL
    pub link: String,
    /// Rating text, or [`NOT_AVAILABLE`] when the page had none
    pub rating: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_serializes_image_field() {
        let listing = Listing {
            name: "Kettle".to_string(),
            image_url: "https://img.example/k.jpg".to_string(),
            price: "$19.99".to_string(),
            link: "https://www.ebay.com/itm/1".to_string(),
            rating: NOT_AVAILABLE.to_string(),
        };

        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["image"], "https://img.example/k.jpg");
        assert_eq!(json["rating"], "not available");
    }
}
