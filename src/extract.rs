use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

/// Ordered extraction rules for a known marketplace. The first selector
/// yielding usable text wins; title candidates are independent of price
/// candidates.
struct SiteRule {
    token: &'static str,
    price_selectors: &'static [&'static str],
    title_selectors: &'static [&'static str],
}

/// Domain rules tried by substring match against the page host, in order.
const SITE_RULES: &[SiteRule] = &[
    SiteRule {
        token: "amazon",
        price_selectors: &[
            "span.a-price span.a-offscreen",
            "#priceblock_ourprice",
            "#priceblock_dealprice",
            "#price_inside_buybox",
        ],
        title_selectors: &["#productTitle", "span#title"],
    },
    SiteRule {
        token: "ebay",
        price_selectors: &[
            ".x-price-primary span.ux-textspans",
            "#prcIsum",
            "#mm-saleDscPrc",
        ],
        title_selectors: &[".x-item-title__mainTitle span.ux-textspans", "#itemTitle"],
    },
    SiteRule {
        token: "aliexpress",
        price_selectors: &[
            ".product-price-value",
            ".uniform-banner-box-price",
            ".pdp-price",
        ],
        title_selectors: &[".product-title-text", "h1[data-pl='product-title']"],
    },
    SiteRule {
        token: "etsy",
        price_selectors: &[
            "[data-selector='price-only'] .currency-value",
            "p.wt-text-title-larger",
        ],
        title_selectors: &["h1[data-buy-box-listing-title]", "h1"],
    },
];

/// Structured metadata tags that carry a price in their `content` attribute.
const META_PRICE_SELECTORS: &[&str] = &[
    "meta[itemprop='price']",
    "meta[property='product:price:amount']",
    "meta[property='og:price:amount']",
];

/// Generic price-looking selectors, tried after metadata and JSON-LD.
const GENERIC_PRICE_SELECTORS: &[&str] = &[
    ".price",
    "#price",
    ".product-price",
    "[itemprop='price']",
    ".price-current",
    ".current-price",
    "span.price",
];

/// Best-effort price and title extraction from raw product-page markup.
///
/// Price parsing takes the first number-looking substring in the matched
/// text. That is deliberate: on the supported marketplaces the first match
/// coincides with the displayed price, and callers already treat the result
/// as a signal rather than ground truth.
pub struct Extractor {
    decimal_re: Regex,
    integer_re: Regex,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    pub fn new() -> Self {
        Extractor {
            // Decimal-bearing amounts: "29,99", "1,234.56", "4.99".
            decimal_re: Regex::new(
                r"[\$£€¥₺]?\s*(\d+,\d{1,2}\b|\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+\.\d+)",
            )
            .unwrap(),
            integer_re: Regex::new(r"\d+").unwrap(),
        }
    }

    /// Parse a price out of free text.
    ///
    /// Prefers the first decimal-bearing match (comma or dot separator,
    /// commas normalized) and falls back to the first integer-like match.
    /// Returns `None` when no numeric pattern parses.
    pub fn parse_price_text(&self, text: &str) -> Option<f64> {
        for caps in self.decimal_re.captures_iter(text) {
            let raw = caps.get(1).map(|m| m.as_str())?;
            // "1,234.56" carries thousands separators; "29,99" carries a
            // decimal comma.
            let normalized = if raw.contains('.') {
                raw.replace(',', "")
            } else {
                raw.replace(',', ".")
            };
            if let Ok(price) = normalized.parse::<f64>() {
                return Some(price);
            }
        }

        self.integer_re
            .find(text)
            .and_then(|m| m.as_str().parse::<f64>().ok())
    }

    /// Extract `(price, title)` from a page, dispatching on the host name.
    ///
    /// Known marketplaces get their own ordered selector lists; everything
    /// else falls through to metadata tags, embedded JSON-LD, then a generic
    /// selector list. Either side of the pair can come back `None`.
    pub fn extract(&self, html: &str, domain: &str) -> (Option<f64>, Option<String>) {
        let document = Html::parse_document(html);

        match SITE_RULES.iter().find(|rule| domain.contains(rule.token)) {
            Some(rule) => (
                self.price_from_selectors(&document, rule.price_selectors),
                first_selector_text(&document, rule.title_selectors)
                    .or_else(|| page_title(&document)),
            ),
            None => (self.generic_price(&document), generic_title(&document)),
        }
    }

    fn price_from_selectors(&self, document: &Html, selectors: &[&str]) -> Option<f64> {
        for raw in selectors {
            let Ok(selector) = Selector::parse(raw) else {
                continue;
            };
            for element in document.select(&selector) {
                let text = element_text(&element);
                if text.is_empty() {
                    continue;
                }
                if let Some(price) = self.parse_price_text(&text) {
                    return Some(price);
                }
            }
        }
        None
    }

    fn generic_price(&self, document: &Html) -> Option<f64> {
        // (a) structured metadata tags
        for raw in META_PRICE_SELECTORS {
            let Ok(selector) = Selector::parse(raw) else {
                continue;
            };
            if let Some(content) = document
                .select(&selector)
                .find_map(|el| el.value().attr("content"))
            {
                if let Some(price) = self.parse_price_text(content) {
                    return Some(price);
                }
            }
        }

        // (b) embedded JSON-LD product data
        if let Some(price) = self.json_ld_price(document) {
            return Some(price);
        }

        // (c) generic price-like selectors
        self.price_from_selectors(document, GENERIC_PRICE_SELECTORS)
    }

    fn json_ld_price(&self, document: &Html) -> Option<f64> {
        let selector = Selector::parse("script[type='application/ld+json']").ok()?;
        for script in document.select(&selector) {
            let body = script.text().collect::<String>();
            let Ok(value) = serde_json::from_str::<Value>(&body) else {
                continue;
            };
            if let Some(price) = self.price_from_json(&value) {
                return Some(price);
            }
        }
        None
    }

    fn price_from_json(&self, value: &Value) -> Option<f64> {
        match value {
            Value::Object(map) => {
                if let Some(offers) = map.get("offers") {
                    if let Some(price) = self.price_from_json(offers) {
                        return Some(price);
                    }
                }
                match map.get("price") {
                    Some(Value::Number(n)) => n.as_f64(),
                    Some(Value::String(s)) => self.parse_price_text(s),
                    _ => None,
                }
            }
            Value::Array(items) => items.iter().find_map(|v| self.price_from_json(v)),
            _ => None,
        }
    }
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_selector_text(document: &Html, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for element in document.select(&selector) {
            let text = element_text(&element);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn page_title(document: &Html) -> Option<String> {
    first_selector_text(document, &["title"])
}

fn generic_title(document: &Html) -> Option<String> {
    first_selector_text(document, &["h1"])
        .or_else(|| page_title(document))
        .or_else(|| {
            let selector = Selector::parse("meta[property='og:title']").ok()?;
            document
                .select(&selector)
                .find_map(|el| el.value().attr("content"))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}
