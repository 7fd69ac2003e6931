//! Built-in schemas for the marketplace's two page types

use super::{FieldRule, Locator, RecordSchema};
use crate::error::ExtractError;
use crate::record::ExtractContext;

/// Container of one product card on a category/search page
pub const LISTING_CONTAINER: &str = "div.product-info-cnt";

/// Specification rows read by label on a product detail page
pub const DETAIL_LABELS: [&str; 6] = [
    "MOQ",
    "Shape",
    "Light Color",
    "Material",
    "Power Factor",
    "Application",
];

/// Product cards on a rendered category page, one record per card
pub fn listing_cards() -> Result<RecordSchema, ExtractError> {
    let rules = vec![
        FieldRule::required("Product Name", Locator::text("h2.h2-title")?),
        FieldRule::required("Product Link", Locator::attr("h2.h2-title a", "href")?),
        FieldRule::required("Product Image", Locator::attr("div.product-image img", "src")?),
        FieldRule::optional(
            "Product Description",
            Locator::text("span.spec-value.description")?,
        ),
        FieldRule::required("Company Name", Locator::text("a.company-url")?),
        FieldRule::required("Company Link", Locator::attr("a.company-url", "href")?),
        FieldRule::required("Location", Locator::text("h3.erNFE")?),
        FieldRule::optional(
            "Established Year",
            Locator::label_between("Established In:", "span", "span"),
        ),
        FieldRule::optional("Business Type", Locator::text("span.fSXCQo")?),
        FieldRule::optional(
            "Trust Status",
            Locator::marker(r#"img[alt="Trusted Seller"]"#, "Trusted Seller", "Not Trusted")?,
        ),
        FieldRule::optional(
            "Super Seller",
            Locator::marker(r#"img[alt="Super Seller"]"#, "Super Seller", "Not Super Seller")?,
        ),
        FieldRule::optional("Scraped URL", Locator::context(ExtractContext::URL)),
    ];

    RecordSchema::new("listing_cards", rules).with_container(LISTING_CONTAINER)
}

/// A single product detail page reached through discovery
pub fn product_detail() -> Result<RecordSchema, ExtractError> {
    let mut rules = vec![
        FieldRule::optional("Industry", Locator::context(ExtractContext::KEYWORD)),
        // The title heading carries no class; styled section headings do
        FieldRule::optional("Product Name", Locator::text("h2:not([class])")?),
        FieldRule::optional("Price (INR)", Locator::text("span.price-text")?),
    ];
    rules.extend(
        DETAIL_LABELS
            .iter()
            .map(|label| FieldRule::optional(label, Locator::label(label))),
    );
    rules.extend([
        FieldRule::optional("Supplier", Locator::text("a.company-url")?),
        FieldRule::optional("Location", Locator::text("h3.erNFE")?),
        FieldRule::optional("Product Link", Locator::context(ExtractContext::URL)),
    ]);

    Ok(RecordSchema::new("product_detail", rules))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NOT_AVAILABLE;

    const LISTING_PAGE: &str = r#"
    <html><body>
    <div class="product-info-cnt">
        <h2 class="h2-title"><a href="https://www.tradeindia.com/products/led-bulb-1.html">LED Bulb</a></h2>
        <div class="product-image"><img src="https://img.tradeindia.com/led.jpg"></div>
        <span class="spec-value description">9W cool white bulb</span>
        <a class="company-url" href="https://www.tradeindia.com/bright-lights/">Bright Lights Pvt Ltd</a>
        <h3 class="erNFE">Mumbai, India</h3>
        <span>Established In:</span><span>2005</span>
        <span class="fSXCQo">Manufacturer</span>
        <img alt="Trusted Seller" src="trust.png">
        <img alt="Super Seller" src="super.png">
    </div>
    <div class="product-info-cnt">
        <h2 class="h2-title"><a href="https://www.tradeindia.com/products/tube-light-2.html">Tube Light</a></h2>
        <div class="product-image"><img src="https://img.tradeindia.com/tube.jpg"></div>
        <a class="company-url" href="https://www.tradeindia.com/glow/">Glow Traders</a>
        <h3 class="erNFE">Pune, India</h3>
    </div>
    <div class="product-info-cnt">
        <div class="product-image"><img src="https://img.tradeindia.com/none.jpg"></div>
        <a class="company-url" href="https://www.tradeindia.com/untitled/">Untitled Co</a>
        <h3 class="erNFE">Delhi, India</h3>
    </div>
    </body></html>
    "#;

    #[test]
    fn test_listing_cards_full_card() {
        let schema = listing_cards().unwrap();
        let ctx = ExtractContext::new().with(ExtractContext::URL, "https://www.tradeindia.com/lighting/");

        let records = schema.extract_records(LISTING_PAGE, &ctx);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.get("Product Name"), Some("LED Bulb"));
        assert_eq!(
            first.get("Product Link"),
            Some("https://www.tradeindia.com/products/led-bulb-1.html")
        );
        assert_eq!(first.get("Product Image"), Some("https://img.tradeindia.com/led.jpg"));
        assert_eq!(first.get("Product Description"), Some("9W cool white bulb"));
        assert_eq!(first.get("Company Name"), Some("Bright Lights Pvt Ltd"));
        assert_eq!(first.get("Location"), Some("Mumbai, India"));
        assert_eq!(first.get("Established Year"), Some("2005"));
        assert_eq!(first.get("Business Type"), Some("Manufacturer"));
        assert_eq!(first.get("Trust Status"), Some("Trusted Seller"));
        assert_eq!(first.get("Super Seller"), Some("Super Seller"));
        assert_eq!(first.get("Scraped URL"), Some("https://www.tradeindia.com/lighting/"));
    }

    #[test]
    fn test_listing_cards_missing_optional_markers() {
        let schema = listing_cards().unwrap();
        let records = schema.extract_records(LISTING_PAGE, &ExtractContext::new());

        let second = &records[1];
        assert_eq!(second.get("Product Name"), Some("Tube Light"));
        assert_eq!(second.get("Trust Status"), Some("Not Trusted"));
        assert_eq!(second.get("Super Seller"), Some("Not Super Seller"));
        assert_eq!(second.get("Established Year"), Some(NOT_AVAILABLE));
        assert_eq!(second.get("Product Description"), Some(NOT_AVAILABLE));
        assert_eq!(second.get("Business Type"), Some(NOT_AVAILABLE));
        assert_eq!(second.len(), schema.columns().len());
    }

    #[test]
    fn test_listing_without_title_is_skipped() {
        let schema = listing_cards().unwrap();
        let records = schema.extract_records(LISTING_PAGE, &ExtractContext::new());

        assert!(records
            .iter()
            .all(|r| r.get("Company Name") != Some("Untitled Co")));
    }

    #[test]
    fn test_product_detail_page() {
        let html = r#"
        <html><body>
            <h2 class="section-title">Similar Products</h2>
            <h2>Round LED Panel Light</h2>
            <span class="price-text">₹ 450 / Piece</span>
            <table>
                <tr><td>MOQ</td><td>100 Pieces</td></tr>
                <tr><td>Shape</td><td>Round</td></tr>
                <tr><td>Light Color</td><td>Cool White</td></tr>
                <tr><td>Material</td><td>Aluminium</td></tr>
            </table>
            <a class="company-url" href="/bright-lights/">Bright Lights Pvt Ltd</a>
            <h3 class="erNFE">Mumbai, India</h3>
        </body></html>
        "#;
        let ctx = ExtractContext::new()
            .with(ExtractContext::URL, "https://www.tradeindia.com/products/panel-9.html")
            .with(ExtractContext::KEYWORD, "lighting");

        let schema = product_detail().unwrap();
        let records = schema.extract_records(html, &ctx);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(
            record.columns().collect::<Vec<_>>(),
            vec![
                "Industry",
                "Product Name",
                "Price (INR)",
                "MOQ",
                "Shape",
                "Light Color",
                "Material",
                "Power Factor",
                "Application",
                "Supplier",
                "Location",
                "Product Link",
            ]
        );
        assert_eq!(record.get("Industry"), Some("lighting"));
        assert_eq!(record.get("Product Name"), Some("Round LED Panel Light"));
        assert_eq!(record.get("Price (INR)"), Some("₹ 450 / Piece"));
        assert_eq!(record.get("MOQ"), Some("100 Pieces"));
        assert_eq!(record.get("Material"), Some("Aluminium"));
        assert_eq!(record.get("Power Factor"), Some(NOT_AVAILABLE));
        assert_eq!(record.get("Application"), Some(NOT_AVAILABLE));
        assert_eq!(record.get("Supplier"), Some("Bright Lights Pvt Ltd"));
        assert_eq!(
            record.get("Product Link"),
            Some("https://www.tradeindia.com/products/panel-9.html")
        );
    }

    #[test]
    fn test_product_detail_empty_page() {
        let schema = product_detail().unwrap();
        let records = schema.extract_records("<html></html>", &ExtractContext::new());

        assert_eq!(records.len(), 1);
        assert!(records[0].values().all(|v| v == NOT_AVAILABLE));
    }
}
