use scraper::{ElementRef, Html, Selector};

// below this a container is probably navigation chrome, not the page body
const MIN_CONTAINER_CHARS: usize = 200;

pub fn scrape_generic(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    // course-management pages first, then common article containers
    let candidates = [
        "#content",
        ".user_content",
        "#wiki_page_show",
        "main",
        "[role=main]",
        "article",
    ];
    for sel in candidates.iter() {
        if let Some(text) = scrape_with_selector(&doc, sel) {
            if text.chars().count() >= MIN_CONTAINER_CHARS { return Some(text); }
        }
    }

    // fallback: collect paragraphs, headings and list items in document order
    let block_sel = Selector::parse("h1, h2, h3, p, li").ok()?;
    let mut out: Vec<String> = Vec::new();
    for el in doc.select(&block_sel) {
        let s = normalize(&visible_text(el));
        if !s.is_empty() { out.push(s); }
    }
    let joined = out.join("\n");
    if joined.trim().is_empty() { None } else { Some(joined) }
}

fn scrape_with_selector(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let node = doc.select(&sel).next()?;
    let s = normalize(&visible_text(node));
    if s.is_empty() { None } else { Some(s) }
}

pub(super) fn visible_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in el.descendants() {
        let Some(text) = node.value().as_text() else { continue };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .map(|e| matches!(e.name(), "script" | "style" | "noscript"))
                .unwrap_or(false)
        });
        if !hidden { out.push_str(text); }
    }
    out
}

pub(super) fn normalize(s: &str) -> String {
    // trim lines, drop blank ones
    let mut out = String::new();
    for line in s.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() { continue; }
        if !out.is_empty() { out.push('\n'); }
        out.push_str(trimmed);
    }
    out
}
