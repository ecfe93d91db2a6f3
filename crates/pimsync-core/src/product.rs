use serde::{Deserialize, Serialize};

use crate::text::{
    collapse_whitespace, decode_html_entities, dedupe_words, demote_h2, html_to_plain_text,
    legacy_part_code, remove_case_insensitive, strip_prefix_case_insensitive, truncate_chars,
    truncate_at_word_boundary,
};

/// Title budget for products pushed to the storefront.
pub const STOREFRONT_TITLE_MAX: usize = 147;

/// Title budget for the storefront staging export.
pub const STAGING_TITLE_MAX: usize = 255;

const ELLIPSIS: &str = "...";

/// A product read from the PIM, past the mapping boundary.
///
/// Optional text fields are empty strings rather than `None` and missing
/// numbers are `0.0`, so the transforms below never have to branch on
/// absence. Only the linked image stays optional because "no image" changes
/// what the remote writer does.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    /// Always non-empty.
    pub sku: String,
    pub upc: String,
    pub web_price: f64,
    /// Minimum advertised price.
    pub map_price: f64,
    pub retail_price: f64,
    pub cost: f64,
    pub brand_name: String,
    pub model: String,
    /// Always non-empty. Doubles as the MPN.
    pub vendor_part_number: String,
    pub description_short: String,
    pub description_medium: String,
    pub specifications_html: String,
    /// "What's in the box" markup.
    pub contents_html: String,
    pub product_type: String,
    pub part_prefix: String,
    pub product_url: String,
    /// Shipping weight in pounds.
    pub weight: f64,
    pub image_asset_id: Option<String>,
}

impl ProductRecord {
    /// Storefront handle: lowercased SKU with spaces turned into hyphens.
    #[must_use]
    pub fn handle(&self) -> String {
        self.sku.trim().to_lowercase().replace(' ', "-")
    }

    /// Web price when it is positive, otherwise the retail price, otherwise zero.
    #[must_use]
    pub fn effective_web_price(&self) -> f64 {
        if self.web_price > 0.0 {
            self.web_price
        } else if self.retail_price > 0.0 {
            self.retail_price
        } else {
            0.0
        }
    }

    /// Lowest positive price among the effective web price, MAP and retail,
    /// formatted for the storefront. `"0.00"` when none is positive.
    #[must_use]
    pub fn selected_price(&self) -> String {
        [self.effective_web_price(), self.map_price, self.retail_price]
            .into_iter()
            .filter(|p| *p > 0.0)
            .reduce(f64::min)
            .map_or_else(|| "0.00".to_string(), format_price)
    }

    /// `"{brand} {model}"`, falling back to the vendor part number when the
    /// model is blank.
    #[must_use]
    pub fn base_title(&self) -> String {
        let model = if self.model.trim().is_empty() {
            self.vendor_part_number.trim()
        } else {
            self.model.trim()
        };
        collapse_whitespace(&format!("{} {model}", self.brand_name.trim()))
    }

    /// Builds a title of at most `max_chars` characters.
    ///
    /// The base title is followed by as much of the plain-text description as
    /// fits. When the description has to be cut, the cut lands on a word
    /// boundary and `...` is appended. A base title that already fills the
    /// budget is hard-truncated and gets nothing appended.
    #[must_use]
    pub fn title(&self, max_chars: usize) -> String {
        let base = self.base_title();
        let base_len = base.chars().count();
        if base_len >= max_chars {
            return truncate_chars(&base, max_chars).to_string();
        }

        let snippet = self.title_snippet(&base);
        if snippet.is_empty() {
            return base;
        }

        let full = format!("{base} {snippet}");
        if full.chars().count() <= max_chars {
            return full;
        }

        let budget = max_chars.saturating_sub(base_len + 1 + ELLIPSIS.len());
        let cut = truncate_at_word_boundary(&snippet, budget)
            .trim_end_matches([',', ';', ':', '-', '.'])
            .trim_end();
        if cut.is_empty() {
            if base_len + ELLIPSIS.len() <= max_chars {
                return format!("{base}{ELLIPSIS}");
            }
            return base;
        }
        format!("{base} {cut}{ELLIPSIS}")
    }

    /// Plain-text description used after the base title. Descriptions that
    /// open by repeating the base title have that repetition dropped.
    fn title_snippet(&self, base: &str) -> String {
        let text = self.plain_text_description();
        let rest = strip_prefix_case_insensitive(&text, base)
            .filter(|rest| rest.is_empty() || !rest.starts_with(char::is_alphanumeric))
            .unwrap_or(text.as_str());
        rest.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '-' | ':' | ','))
            .to_string()
    }

    /// Storefront body HTML: a `Description` section and a `Tech Specs`
    /// section, each present only when its source is non-empty. Entities in
    /// the source are decoded and its `h2` headings demoted to `h3`.
    #[must_use]
    pub fn sanitized_html(&self) -> String {
        let mut html = String::new();
        for (label, source) in [
            ("Description", &self.description_medium),
            ("Tech Specs", &self.specifications_html),
        ] {
            if source.trim().is_empty() {
                continue;
            }
            let decoded = decode_html_entities(source);
            html.push_str("<h2>");
            html.push_str(label);
            html.push_str("</h2>");
            html.push_str(&demote_h2(&decoded));
        }
        html
    }

    /// The medium description (short as fallback) as a single line of text.
    #[must_use]
    pub fn plain_text_description(&self) -> String {
        let source = if self.description_medium.trim().is_empty() {
            &self.description_short
        } else {
            &self.description_medium
        };
        html_to_plain_text(source)
    }

    /// Description for the legacy invoice export.
    ///
    /// Starts from the short description (medium as fallback), drops the
    /// brand name everywhere and the SKU when it leads, tightens `" / "` and
    /// `" - "`, keeps only ASCII alphanumerics, `/`, `-` and spaces, and
    /// removes repeated words.
    #[must_use]
    pub fn export_description(&self) -> String {
        let source = if self.description_short.trim().is_empty() {
            &self.description_medium
        } else {
            &self.description_short
        };
        let text = html_to_plain_text(source);
        let text = remove_case_insensitive(&text, self.brand_name.trim());
        let text = text.trim_start();
        let text = strip_prefix_case_insensitive(text, self.sku.trim()).unwrap_or(text);
        let text = text.replace(" / ", "/").replace(" - ", "-");
        let allowed: String = text
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | ' '))
            .collect();
        dedupe_words(&collapse_whitespace(&allowed))
    }

    /// SKU formatted for the legacy invoicing system.
    #[must_use]
    pub fn legacy_part_code(&self) -> String {
        legacy_part_code(&self.sku)
    }

    /// Manufacturer part number, if the record carries one.
    #[must_use]
    pub fn mpn(&self) -> Option<&str> {
        Some(self.vendor_part_number.trim()).filter(|s| !s.is_empty())
    }

    /// Barcode for the storefront variant; `None` when the UPC is blank.
    #[must_use]
    pub fn barcode(&self) -> Option<&str> {
        Some(self.upc.trim()).filter(|s| !s.is_empty())
    }
}

/// Formats a price the way the storefront import expects: whole amounts keep
/// one decimal (`25.0`), everything else uses the shortest exact form.
#[must_use]
pub fn format_price(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
#[path = "product_test.rs"]
mod tests;
