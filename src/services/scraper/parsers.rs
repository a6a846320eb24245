use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::Source;
use crate::{
    error::{AppError, AppResult},
    models::{Listing, NOT_AVAILABLE},
};

/// CSS selectors describing one marketplace's search-results markup
///
/// Field selectors are evaluated relative to each listing container.
#[derive(Debug, Clone, Copy)]
pub struct SelectorTable {
    pub container: &'static str,
    pub name: &'static str,
    pub image: &'static str,
    /// Attribute on the image element holding its URL
    pub image_attr: &'static str,
    pub price: &'static str,
    /// When false a missing price becomes the "not available" sentinel
    pub price_required: bool,
    pub link: &'static str,
    pub rating: &'static str,
}

/// Known page structure for each supported marketplace
pub fn selector_table(source: Source) -> SelectorTable {
    match source {
        Source::Amazon => SelectorTable {
            container: ".s-main-slot .s-result-item",
            name: "h2 .a-text-normal",
            image: "img.s-image",
            image_attr: "src",
            price: ".a-price-whole",
            price_required: false,
            link: "a.a-link-normal",
            rating: ".a-icon-alt",
        },
        Source::Ebay => SelectorTable {
            container: ".s-item",
            name: ".s-item__title",
            image: ".s-item__image-img",
            image_attr: "src",
            price: ".s-item__price",
            price_required: true,
            link: ".s-item__link",
            rating: ".b-starrating",
        },
        Source::AliExpress => SelectorTable {
            container: ".item",
            name: ".item-title",
            image: ".item-img",
            image_attr: "src",
            price: ".price",
            price_required: true,
            link: "a",
            rating: ".rating",
        },
        Source::Jumia => SelectorTable {
            container: ".prd",
            name: ".name",
            image: "img",
            image_attr: "data-src",
            price: ".price",
            price_required: true,
            link: "a",
            rating: ".rating",
        },
        Source::Konga => SelectorTable {
            container: ".product-item",
            name: ".product-title",
            image: "img",
            image_attr: "src",
            price: ".product-price",
            price_required: true,
            link: "a",
            rating: ".rating",
        },
    }
}

/// Why a single listing could not be extracted
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("missing element for {field}")]
    MissingElement { field: &'static str },

    #[error("missing attribute '{attr}' on {field} element")]
    MissingAttribute {
        field: &'static str,
        attr: &'static str,
    },

    #[error("invalid link '{href}': {reason}")]
    InvalidLink { href: String, reason: String },
}

/// Listings recovered from one page
///
/// `failure` is set when extraction stopped early; `listings` still holds
/// everything extracted before that point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub listings: Vec<Listing>,
    pub failure: Option<String>,
}

struct CompiledSelectors {
    container: Selector,
    name: Selector,
    image: Selector,
    image_attr: &'static str,
    price: Selector,
    price_required: bool,
    link: Selector,
    rating: Selector,
}

impl CompiledSelectors {
    fn compile(table: &SelectorTable) -> AppResult<Self> {
        Ok(Self {
            container: compile(table.container)?,
            name: compile(table.name)?,
            image: compile(table.image)?,
            image_attr: table.image_attr,
            price: compile(table.price)?,
            price_required: table.price_required,
            link: compile(table.link)?,
            rating: compile(table.rating)?,
        })
    }
}

fn compile(selector: &str) -> AppResult<Selector> {
    Selector::parse(selector)
        .map_err(|e| AppError::Parse(format!("invalid selector '{}': {}", selector, e)))
}

/// Parser for one marketplace's search-results page
pub struct SourceParser {
    source: Source,
    base_url: Url,
    selectors: CompiledSelectors,
}

impl SourceParser {
    pub fn for_source(source: Source) -> AppResult<Self> {
        Self::with_table(source, &selector_table(source))
    }

    pub fn with_table(source: Source, table: &SelectorTable) -> AppResult<Self> {
        let base_url = Url::parse(source.base_url())
            .map_err(|e| AppError::Parse(format!("invalid base url for {}: {}", source, e)))?;

        Ok(Self {
            source,
            base_url,
            selectors: CompiledSelectors::compile(table)?,
        })
    }

    pub fn source(&self) -> Source {
        self.source
    }

    /// Extracts listings from raw page markup
    ///
    /// Never fails: the first listing that cannot be extracted ends the page
    /// and is reported in [`ParseOutcome::failure`].
    pub fn parse(&self, html: &str) -> ParseOutcome {
        let document = Html::parse_document(html);
        let mut outcome = ParseOutcome::default();

        for (index, element) in document.select(&self.selectors.container).enumerate() {
            match self.extract_listing(&element) {
                Ok(listing) => outcome.listings.push(listing),
                Err(e) => {
                    tracing::warn!(
                        source = %self.source,
                        index,
                        kept = outcome.listings.len(),
                        error = %e,
                        "Listing extraction failed, keeping earlier listings"
                    );
                    outcome.failure = Some(format!("listing {}: {}", index, e));
                    break;
                }
            }
        }

        outcome
    }

    fn extract_listing(&self, element: &ElementRef) -> Result<Listing, ExtractError> {
        let s = &self.selectors;

        let name = text_of(element, &s.name)
            .ok_or(ExtractError::MissingElement { field: "name" })?;

        let image_url = attr_of(element, &s.image, s.image_attr, "image")?;

        let price = match text_of(element, &s.price) {
            Some(price) => price,
            None if !s.price_required => NOT_AVAILABLE.to_string(),
            None => return Err(ExtractError::MissingElement { field: "price" }),
        };

        let href = attr_of(element, &s.link, "href", "link")?;
        let link = self
            .base_url
            .join(&href)
            .map_err(|e| ExtractError::InvalidLink {
                href: href.clone(),
                reason: e.to_string(),
            })?
            .to_string();

        let rating = text_of(element, &s.rating).unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Ok(Listing {
            name,
            image_url,
            price,
            link,
            rating,
        })
    }
}

/// Whitespace-normalized text of the first match, if any
fn text_of(element: &ElementRef, selector: &Selector) -> Option<String> {
    element.select(selector).next().map(|found| {
        found
            .text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ")
    })
}

fn attr_of(
    element: &ElementRef,
    selector: &Selector,
    attr: &'static str,
    field: &'static str,
) -> Result<String, ExtractError> {
    let found = element
        .select(selector)
        .next()
        .ok_or(ExtractError::MissingElement { field })?;

    found
        .value()
        .attr(attr)
        .map(str::to_string)
        .ok_or(ExtractError::MissingAttribute { field, attr })
}
