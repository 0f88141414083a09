use serde_json::json;

use super::*;

const BASE: &str = "https://x.test";

#[test]
fn absolutize_handles_relative_and_protocol_relative_links() {
    assert_eq!(
        absolutize("//cdn.x.test/a/p", BASE).as_deref(),
        Some("https://cdn.x.test/a/p")
    );
    assert_eq!(
        absolutize("/leche/p", BASE).as_deref(),
        Some("https://x.test/leche/p")
    );
    assert_eq!(
        absolutize("leche/p", "https://x.test/").as_deref(),
        Some("https://x.test/leche/p")
    );
    assert_eq!(
        absolutize("https://other.test/a", BASE).as_deref(),
        Some("https://other.test/a")
    );
}

#[test]
fn absolutize_keeps_base_path_for_relative_links() {
    assert_eq!(
        absolutize("123-jabon.html", "https://atomo.test/shop").as_deref(),
        Some("https://atomo.test/shop/123-jabon.html")
    );
}

#[test]
fn absolutize_skips_empty_fragment_and_non_http_links() {
    assert_eq!(absolutize("", BASE), None);
    assert_eq!(absolutize("  ", BASE), None);
    assert_eq!(absolutize("#reviews", BASE), None);
    assert_eq!(absolutize("mailto:ventas@x.test", BASE), None);
    assert_eq!(absolutize("javascript:void(0)", BASE), None);
}

#[test]
fn api_candidate_composes_relative_link_with_base() {
    let payload = json!([{ "link": "abc/p" }]);
    let candidate = extract_api_candidate(&payload, BASE, Platform::Vtex).unwrap();
    assert_eq!(candidate.url, "https://x.test/abc/p");
    assert_eq!(candidate.source, CandidateSource::CatalogApi);
}

#[test]
fn api_candidate_appends_vtex_suffix_to_link_text() {
    let payload = json!([{ "linkText": "leche-entera-1l" }]);
    let candidate = extract_api_candidate(&payload, "https://x.test/", Platform::Vtex).unwrap();
    assert_eq!(candidate.url, "https://x.test/leche-entera-1l/p");
}

#[test]
fn api_candidate_keeps_absolute_links() {
    let payload = json!([
        { "link": "https://www.x.test/leche/p", "linkText": "ignored" },
        { "link": "https://www.x.test/second/p" }
    ]);
    let candidate = extract_api_candidate(&payload, BASE, Platform::Vtex).unwrap();
    assert_eq!(candidate.url, "https://www.x.test/leche/p");
}

#[test]
fn api_candidate_falls_back_to_link_text_when_link_blank() {
    let payload = json!([{ "link": "  ", "linkText": "yerba" }]);
    let candidate = extract_api_candidate(&payload, BASE, Platform::Vtex).unwrap();
    assert_eq!(candidate.url, "https://x.test/yerba/p");
}

#[test]
fn api_candidate_is_none_for_empty_or_unexpected_payloads() {
    assert_eq!(extract_api_candidate(&json!([]), BASE, Platform::Vtex), None);
    assert_eq!(extract_api_candidate(&json!({}), BASE, Platform::Vtex), None);
    assert_eq!(
        extract_api_candidate(&json!([{ "productId": "1" }]), BASE, Platform::Vtex),
        None
    );
}

#[test]
fn html_candidate_prefers_canonical_link() {
    let html = r#"<html><head>
        <link rel="canonical" href="https://x.test/leche-entera/p">
        </head><body><a href="/otra-cosa/p">otra</a></body></html>"#;
    let candidate = extract_html_candidate(html, BASE, Platform::Vtex).unwrap();
    assert_eq!(candidate.url, "https://x.test/leche-entera/p");
    assert_eq!(candidate.source, CandidateSource::Canonical);
}

#[test]
fn html_candidate_ignores_canonical_search_page() {
    let html = r#"<html><head>
        <link rel="canonical" href="https://x.test/779?_q=779&map=ft">
        </head><body><a href="/leche/p">leche</a></body></html>"#;
    let candidate = extract_html_candidate(html, BASE, Platform::Vtex).unwrap();
    assert_eq!(candidate.url, "https://x.test/leche/p");
    assert_eq!(candidate.source, CandidateSource::Anchor);
}

#[test]
fn html_candidate_reads_jsonld_item_list_inside_graph() {
    let html = r#"<html><head><script type="application/ld+json">
        {"@context":"https://schema.org","@graph":[
          {"@type":"WebSite","url":"https://x.test"},
          {"@type":"ItemList","itemListElement":[
            {"@type":"ListItem","position":1,"item":{"@id":"https://x.test/yerba-mate/p"}}
          ]}
        ]}
        </script></head><body><a href="/cart">carrito</a></body></html>"#;
    let candidate = extract_html_candidate(html, BASE, Platform::Vtex).unwrap();
    assert_eq!(candidate.url, "https://x.test/yerba-mate/p");
    assert_eq!(candidate.source, CandidateSource::StructuredData);
}

#[test]
fn html_candidate_skips_invalid_anchors_in_document_order() {
    let html = r##"<html><body>
        <a href="#top">arriba</a>
        <a href="/login">ingresar</a>
        <a href="https://other.test/leche/p">externo</a>
        <a href="/account/orders">pedidos</a>
        <a href="/leche/p">leche</a>
        <a href="/yerba/p">yerba</a>
        </body></html>"##;
    let candidate = extract_html_candidate(html, BASE, Platform::Vtex).unwrap();
    assert_eq!(candidate.url, "https://x.test/leche/p");
}

#[test]
fn html_candidate_is_none_without_valid_links() {
    let html = r#"<html><body><a href="/login">ingresar</a><p>Sin resultados</p></body></html>"#;
    assert_eq!(extract_html_candidate(html, BASE, Platform::Vtex), None);
    assert_eq!(extract_html_candidate("", BASE, Platform::Unknown), None);
}

#[test]
fn find_canonical_returns_raw_href() {
    let html = r#"<head><link rel="alternate" href="/en"><link rel="Canonical" href=" /jabon-123.html "></head>"#;
    assert_eq!(find_canonical(html).as_deref(), Some("/jabon-123.html"));
    assert_eq!(find_canonical("<p>no head</p>"), None);
}
