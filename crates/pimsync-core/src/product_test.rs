use super::*;

fn record() -> ProductRecord {
    ProductRecord {
        id: "101".to_owned(),
        sku: "ACM X100".to_owned(),
        brand_name: "Acme".to_owned(),
        vendor_part_number: "X100".to_owned(),
        ..ProductRecord::default()
    }
}

// ---------------------------------------------------------------------------
// prices
// ---------------------------------------------------------------------------

#[test]
fn effective_web_price_prefers_web_price() {
    let p = ProductRecord {
        web_price: 19.99,
        retail_price: 29.99,
        ..record()
    };
    assert!((p.effective_web_price() - 19.99).abs() < f64::EPSILON);
}

#[test]
fn effective_web_price_falls_back_to_retail() {
    let p = ProductRecord {
        web_price: 0.0,
        retail_price: 29.99,
        ..record()
    };
    assert!((p.effective_web_price() - 29.99).abs() < f64::EPSILON);
}

#[test]
fn effective_web_price_is_zero_without_prices() {
    assert!(record().effective_web_price().abs() < f64::EPSILON);
}

#[test]
fn selected_price_uses_map_when_lowest() {
    let p = ProductRecord {
        web_price: 0.0,
        map_price: 25.00,
        retail_price: 30.00,
        ..record()
    };
    assert_eq!(p.selected_price(), "25.0");
}

#[test]
fn selected_price_picks_minimum_positive() {
    let p = ProductRecord {
        web_price: 21.5,
        map_price: 0.0,
        retail_price: 24.99,
        ..record()
    };
    assert_eq!(p.selected_price(), "21.5");
}

#[test]
fn selected_price_defaults_when_nothing_positive() {
    let p = ProductRecord {
        web_price: 0.0,
        map_price: -1.0,
        retail_price: 0.0,
        ..record()
    };
    assert_eq!(p.selected_price(), "0.00");
}

#[test]
fn format_price_keeps_cents() {
    assert_eq!(format_price(19.99), "19.99");
    assert_eq!(format_price(30.0), "30.0");
}

// ---------------------------------------------------------------------------
// title
// ---------------------------------------------------------------------------

#[test]
fn title_keeps_short_description_verbatim() {
    let p = ProductRecord {
        description_medium: "Acme X100 great widget for homes".to_owned(),
        ..record()
    };
    assert_eq!(p.title(STOREFRONT_TITLE_MAX), "Acme X100 great widget for homes");
}

#[test]
fn title_truncates_on_word_boundary_with_ellipsis() {
    let p = ProductRecord {
        description_medium: "Acme X100 great widget for homes".to_owned(),
        ..record()
    };
    assert_eq!(p.title(25), "Acme X100 great widget...");
}

#[test]
fn title_prefers_model_over_part_number() {
    let p = ProductRecord {
        model: "Widget Pro".to_owned(),
        ..record()
    };
    assert_eq!(p.title(STOREFRONT_TITLE_MAX), "Acme Widget Pro");
}

#[test]
fn title_hard_truncates_oversized_base() {
    let p = ProductRecord {
        model: "M".repeat(200),
        description_medium: "ignored".to_owned(),
        ..record()
    };
    let title = p.title(STOREFRONT_TITLE_MAX);
    assert_eq!(title.chars().count(), STOREFRONT_TITLE_MAX);
    assert!(!title.ends_with("..."));
}

#[test]
fn title_never_exceeds_budget() {
    let p = ProductRecord {
        description_medium: "<p>Rugged &amp; reliable widget built for every kind of \
                             household chore, workshop task and outdoor adventure.</p>"
            .to_owned(),
        ..record()
    };
    for max in 10..140 {
        let title = p.title(max);
        assert!(
            title.chars().count() <= max,
            "title {title:?} exceeds {max} characters"
        );
    }
}

#[test]
fn title_uses_plain_text_of_description() {
    let p = ProductRecord {
        description_medium: "<p>Rugged &amp; <b>reliable</b></p>".to_owned(),
        ..record()
    };
    assert_eq!(p.title(STOREFRONT_TITLE_MAX), "Acme X100 Rugged & reliable");
}

// ---------------------------------------------------------------------------
// html
// ---------------------------------------------------------------------------

#[test]
fn sanitized_html_demotes_source_headings() {
    let p = ProductRecord {
        description_medium: "&lt;h2&gt;Intro&lt;/h2&gt;<p>Body</p>".to_owned(),
        specifications_html: "<H2>Size</H2><ul><li>10in</li></ul>".to_owned(),
        ..record()
    };
    let html = p.sanitized_html();
    assert_eq!(
        html,
        "<h2>Description</h2><h3>Intro</h3><p>Body</p>\
         <h2>Tech Specs</h2><h3>Size</h3><ul><li>10in</li></ul>"
    );
}

#[test]
fn sanitized_html_omits_empty_specs() {
    let p = ProductRecord {
        description_medium: "<p>Body</p>".to_owned(),
        ..record()
    };
    let html = p.sanitized_html();
    assert!(!html.contains("Tech Specs"));
    assert_eq!(html, "<h2>Description</h2><p>Body</p>");
}

#[test]
fn sanitized_html_omits_empty_description() {
    let p = ProductRecord {
        specifications_html: "<p>Specs</p>".to_owned(),
        ..record()
    };
    assert_eq!(p.sanitized_html(), "<h2>Tech Specs</h2><p>Specs</p>");
    assert_eq!(record().sanitized_html(), "");
}

#[test]
fn plain_text_falls_back_to_short_description() {
    let p = ProductRecord {
        description_short: "<b>Short</b>  text".to_owned(),
        ..record()
    };
    assert_eq!(p.plain_text_description(), "Short text");
}

// ---------------------------------------------------------------------------
// export / identifiers
// ---------------------------------------------------------------------------

#[test]
fn export_description_strips_brand_and_leading_sku() {
    let p = ProductRecord {
        description_short: "ACM X100 ACME Heavy Duty Widget - 10 / 20 Pack, heavy duty!".to_owned(),
        ..record()
    };
    assert_eq!(p.export_description(), "Heavy Duty Widget-10/20 Pack");
}

#[test]
fn export_description_falls_back_to_medium() {
    let p = ProductRecord {
        description_medium: "<p>Blue &amp; Red blue</p>".to_owned(),
        ..record()
    };
    assert_eq!(p.export_description(), "Blue Red");
}

#[test]
fn handle_is_lowercase_and_hyphenated() {
    assert_eq!(record().handle(), "acm-x100");
}

#[test]
fn legacy_part_code_formats_sku() {
    assert_eq!(record().legacy_part_code(), "ACM-X100");
}

#[test]
fn blank_optional_codes_are_none() {
    let p = ProductRecord {
        upc: "  ".to_owned(),
        ..record()
    };
    assert!(p.barcode().is_none());
    assert_eq!(p.mpn(), Some("X100"));
}
