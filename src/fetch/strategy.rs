//! Extraction strategies
//!
//! Each [`ExtractionHint`] maps to exactly one strategy. Strategies are pure
//! functions of the parsed document and never fail; a page they cannot make
//! sense of yields an extraction with no items.

use crate::fetch::types::{ExtractedItem, ExtractionHint, PageExtraction, SearchResultLink};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Capability shared by all extraction strategies
pub trait ExtractionStrategy: Send + Sync {
    fn extract(&self, document: &Html, page_url: &Url) -> PageExtraction;
}

/// Result links of a search engine page
#[derive(Debug, Default)]
pub struct SearchResultStrategy;

/// Posts on a community board
#[derive(Debug, Default)]
pub struct CommunitySiteStrategy;

/// Social media pages (X, YouTube): only page metadata is usable without a browser
#[derive(Debug, Default)]
pub struct SocialMediaStrategy;

/// Fallback for everything else: every link on the page
#[derive(Debug, Default)]
pub struct GenericStrategy;

static SEARCH_RESULT: SearchResultStrategy = SearchResultStrategy;
static COMMUNITY_SITE: CommunitySiteStrategy = CommunitySiteStrategy;
static SOCIAL_MEDIA: SocialMediaStrategy = SocialMediaStrategy;
static GENERIC: GenericStrategy = GenericStrategy;

impl ExtractionHint {
    /// The strategy pages carrying this hint are extracted with
    pub fn strategy(&self) -> &'static dyn ExtractionStrategy {
        match self {
            Self::SearchResultPage => &SEARCH_RESULT,
            Self::CommunitySite => &COMMUNITY_SITE,
            Self::SnsX | Self::SnsYoutube => &SOCIAL_MEDIA,
            Self::Generic => &GENERIC,
        }
    }
}

impl SearchResultStrategy {
    /// Extracts organic result links
    ///
    /// A result is an anchor wrapping an `<h3>` title. Redirect wrappers
    /// (`/url?q=...`) are unwrapped; links back into the search engine are dropped.
    pub fn extract_links(&self, document: &Html, page_url: &Url) -> Vec<SearchResultLink> {
        self.result_anchors(document, page_url)
            .into_iter()
            .map(|(url, _)| SearchResultLink::new(url))
            .collect()
    }

    fn result_anchors(&self, document: &Html, page_url: &Url) -> Vec<(String, String)> {
        let (Ok(anchor_selector), Ok(h3_selector)) =
            (Selector::parse("a[href]"), Selector::parse("h3"))
        else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut results = Vec::new();

        for anchor in document.select(&anchor_selector) {
            let Some(heading) = anchor.select(&h3_selector).next() else {
                continue;
            };
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(resolved) = resolve_link(href, page_url) else {
                continue;
            };
            let Some(target) = unwrap_redirect(&resolved, page_url) else {
                continue;
            };

            if seen.insert(target.clone()) {
                results.push((target, element_text(&heading)));
            }
        }

        results
    }
}

impl ExtractionStrategy for SearchResultStrategy {
    fn extract(&self, document: &Html, page_url: &Url) -> PageExtraction {
        let items = self
            .result_anchors(document, page_url)
            .into_iter()
            .map(|(url, title)| ExtractedItem {
                url: Some(url),
                description: String::new(),
                title: Some(title).filter(|t| !t.is_empty()),
                link_type: None,
            })
            .collect();

        PageExtraction {
            url: page_url.to_string(),
            items,
        }
    }
}

impl ExtractionStrategy for CommunitySiteStrategy {
    fn extract(&self, document: &Html, page_url: &Url) -> PageExtraction {
        const CONTENT: &str =
            "article, main, #content, .content, .post, .view_content, .write_div, .post-content";

        let mut items = Vec::new();
        if let Some(description) = page_title(document) {
            items.push(ExtractedItem {
                description,
                ..ExtractedItem::default()
            });
        }

        let content_roots: Vec<ElementRef> = match Selector::parse(CONTENT) {
            Ok(selector) => document.select(&selector).collect(),
            Err(_) => Vec::new(),
        };

        if content_roots.is_empty() {
            items.extend(anchor_items(document.root_element(), page_url));
        } else {
            let mut seen = HashSet::new();
            for root in content_roots {
                for item in anchor_items(root, page_url) {
                    if item.url.as_ref().is_some_and(|u| seen.insert(u.clone())) {
                        items.push(item);
                    }
                }
            }
        }

        PageExtraction {
            url: page_url.to_string(),
            items,
        }
    }
}

impl ExtractionStrategy for SocialMediaStrategy {
    fn extract(&self, document: &Html, page_url: &Url) -> PageExtraction {
        let title = meta_content(document, "og:title").or_else(|| page_title(document));
        let description = meta_content(document, "og:description")
            .or_else(|| meta_content(document, "description"))
            .unwrap_or_default();

        let items = if title.is_none() && description.is_empty() {
            Vec::new()
        } else {
            vec![ExtractedItem {
                url: None,
                description: format!("{} {}", title.as_deref().unwrap_or_default(), description)
                    .trim()
                    .to_string(),
                title,
                link_type: None,
            }]
        };

        PageExtraction {
            url: page_url.to_string(),
            items,
        }
    }
}

impl ExtractionStrategy for GenericStrategy {
    fn extract(&self, document: &Html, page_url: &Url) -> PageExtraction {
        let mut items = Vec::new();
        if let Some(description) = page_title(document) {
            items.push(ExtractedItem {
                description,
                ..ExtractedItem::default()
            });
        }
        items.extend(anchor_items(document.root_element(), page_url));

        PageExtraction {
            url: page_url.to_string(),
            items,
        }
    }
}

/// One item per followable anchor under `root`
fn anchor_items(root: ElementRef, page_url: &Url) -> Vec<ExtractedItem> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    root.select(&selector)
        .filter_map(|anchor| {
            let url = resolve_link(anchor.value().attr("href")?, page_url)?;
            let text = element_text(&anchor);
            let title = anchor
                .value()
                .attr("title")
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .or_else(|| Some(text.clone()).filter(|t| !t.is_empty()));

            Some(ExtractedItem {
                url: Some(url),
                description: text,
                title,
                link_type: None,
            })
        })
        .collect()
}

fn page_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element_text(&element))
        .filter(|s| !s.is_empty())
}

fn meta_content(document: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!(
        "meta[property=\"{name}\"], meta[name=\"{name}\"]"
    ))
    .ok()?;
    document
        .select(&selector)
        .filter_map(|m| m.value().attr("content"))
        .map(|c| c.trim().to_string())
        .find(|c| !c.is_empty())
}

fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves an href against the page URL, keeping only http(s) targets
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    matches!(absolute.scheme(), "http" | "https").then(|| absolute.to_string())
}

/// Unwraps `/url?q=<target>` redirects and drops links into the search engine itself
fn unwrap_redirect(resolved: &str, page_url: &Url) -> Option<String> {
    let mut url = Url::parse(resolved).ok()?;
    let mut same_host = url.host_str() == page_url.host_str();

    if same_host && url.path() == "/url" {
        let target = url
            .query_pairs()
            .find(|(key, _)| key == "q" || key == "url")
            .map(|(_, value)| value.into_owned())?;
        url = Url::parse(&resolve_link(&target, page_url)?).ok()?;
        same_host = url.host_str() == page_url.host_str();
    }

    let host = url.host_str().unwrap_or_default();
    if host.contains("google.") || (same_host && url.path().starts_with("/search")) {
        return None;
    }

    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    const SEARCH_PAGE: &str = r##"
        <html><body>
          <a href="/search?q=next"><h3>Next page</h3></a>
          <a href="https://gall.dcinside.com/board/view/?id=game&no=1"><h3>리니지 프리섭 홍보</h3></a>
          <a href="/url?q=https://www.fmkorea.com/123&sa=U"><h3>첫충 이벤트</h3></a>
          <a href="https://maps.google.com/"><h3>Maps</h3></a>
          <a href="https://gall.dcinside.com/board/view/?id=game&no=1"><h3>duplicate</h3></a>
          <a href="https://no-heading.example/">no heading</a>
          <a href="#top"><h3>top</h3></a>
        </body></html>
    "##;

    #[test]
    fn test_search_results_links() {
        let document = Html::parse_document(SEARCH_PAGE);
        let links = SearchResultStrategy.extract_links(&document, &base("https://www.google.com/search?q=x"));

        let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://gall.dcinside.com/board/view/?id=game&no=1",
                "https://www.fmkorea.com/123",
            ]
        );
        assert_eq!(links[0].hint, ExtractionHint::CommunitySite);
        assert_eq!(links[1].hint, ExtractionHint::Generic);
    }

    #[test]
    fn test_search_results_keep_non_engine_same_host_links() {
        let html = r#"<a href="/board/1"><h3>post</h3></a><a href="/search?q=2"><h3>more</h3></a>"#;
        let document = Html::parse_document(html);
        let links = SearchResultStrategy.extract_links(&document, &base("http://127.0.0.1:9000/search?q=x"));

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "http://127.0.0.1:9000/board/1");
    }

    #[test]
    fn test_search_strategy_extract_uses_titles() {
        let document = Html::parse_document(SEARCH_PAGE);
        let page = SearchResultStrategy.extract(&document, &base("https://www.google.com/search?q=x"));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].title.as_deref(), Some("리니지 프리섭 홍보"));
    }

    #[test]
    fn test_community_strategy_prefers_content_area() {
        let html = r#"
            <html><head><title>프리섭 홍보 게시판</title></head><body>
              <nav><a href="/login">login</a></nav>
              <div class="write_div">
                <a href="https://lucky-casino.net/" title="Lucky 카지노">click</a>
                <a href="https://open.kakao.com/o/abc">오픈채팅</a>
                <a href="https://lucky-casino.net/">again</a>
              </div>
            </body></html>
        "#;
        let document = Html::parse_document(html);
        let page = CommunitySiteStrategy.extract(&document, &base("https://gall.dcinside.com/board/view/1"));

        assert_eq!(page.items.len(), 3);
        assert_eq!(page.items[0].url, None);
        assert_eq!(page.items[0].description, "프리섭 홍보 게시판");
        assert_eq!(page.items[1].url.as_deref(), Some("https://lucky-casino.net/"));
        assert_eq!(page.items[1].title.as_deref(), Some("Lucky 카지노"));
        assert_eq!(page.items[1].description, "click");
        assert_eq!(page.items[2].url.as_deref(), Some("https://open.kakao.com/o/abc"));
    }

    #[test]
    fn test_community_strategy_falls_back_to_whole_page() {
        let html = r#"<html><body><a href="/bbs/2">next</a></body></html>"#;
        let document = Html::parse_document(html);
        let page = CommunitySiteStrategy.extract(&document, &base("https://forum.test/bbs/1"));

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].url.as_deref(), Some("https://forum.test/bbs/2"));
    }

    #[test]
    fn test_social_media_strategy_reads_metadata() {
        let html = r#"
            <html><head>
              <meta property="og:title" content="리니지 프리섭 오픈">
              <meta property="og:description" content="첫충 100% 이벤트">
            </head><body><a href="https://x.com/other">x</a></body></html>
        "#;
        let document = Html::parse_document(html);
        let page = SocialMediaStrategy.extract(&document, &base("https://www.youtube.com/watch?v=1"));

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title.as_deref(), Some("리니지 프리섭 오픈"));
        assert_eq!(page.items[0].description, "리니지 프리섭 오픈 첫충 100% 이벤트");
        assert_eq!(page.items[0].url, None);
    }

    #[test]
    fn test_social_media_strategy_empty_page() {
        let document = Html::parse_document("<html><body></body></html>");
        let page = SocialMediaStrategy.extract(&document, &base("https://x.com/a"));
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_generic_strategy_skips_special_schemes() {
        let html = r##"
            <a href="javascript:void(0)">js</a>
            <a href="mailto:a@b.c">mail</a>
            <a href="#frag">frag</a>
            <a href="ftp://files.test/x">ftp</a>
            <a href="/relative">ok</a>
        "##;
        let document = Html::parse_document(html);
        let page = GenericStrategy.extract(&document, &base("https://site.test/dir/"));

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].url.as_deref(), Some("https://site.test/relative"));
    }

    #[test]
    fn test_hint_strategy_mapping_covers_every_hint() {
        let document = Html::parse_document(r#"<a href="/x"><h3>t</h3></a>"#);
        let url = base("https://site.test/");
        for hint in [
            ExtractionHint::SearchResultPage,
            ExtractionHint::CommunitySite,
            ExtractionHint::SnsX,
            ExtractionHint::SnsYoutube,
            ExtractionHint::Generic,
        ] {
            let page = hint.strategy().extract(&document, &url);
            assert_eq!(page.url, "https://site.test/");
        }
    }
}
