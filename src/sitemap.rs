use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use regex::Regex;
use tracing::info;

use crate::batch::{progress_bar, BatchStats};
use crate::error::ScrapeError;
use crate::fetch::Fetcher;

pub const SITEMAP_NS: &[u8] = b"http://www.sitemaps.org/schemas/sitemap/0.9";

/// `<urlset><url><loc>` entries, in document order.
pub fn parse_leaf_urls(xml: &[u8]) -> Result<Vec<String>, ScrapeError> {
    parse_locs(xml, b"url")
}

/// `<sitemapindex><sitemap><loc>` entries, in document order.
pub fn parse_index_urls(xml: &[u8]) -> Result<Vec<String>, ScrapeError> {
    parse_locs(xml, b"sitemap")
}

/// Collect the text of every `loc` that is a child of an `entry` element which is itself a
/// direct child of the root. Both elements must be in the sitemap namespace; anything else
/// is ignored, so a namespace mismatch yields an empty list rather than an error.
fn parse_locs(xml: &[u8], entry: &[u8]) -> Result<Vec<String>, ScrapeError> {
    let mut reader = NsReader::from_reader(xml);
    let mut urls = Vec::new();
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut in_entry = false;
    let mut loc: Option<String> = None;

    loop {
        let (ns, event) = reader.read_resolved_event_into(&mut buf)?;
        let in_sitemap_ns = matches!(ns, ResolveResult::Bound(Namespace(n)) if n == SITEMAP_NS);
        match event {
            Event::Start(e) => {
                if depth == 0 {
                    if seen_root {
                        return Err(ScrapeError::IllFormed("multiple root elements"));
                    }
                    seen_root = true;
                }
                depth += 1;
                let name = e.local_name();
                match depth {
                    2 if in_sitemap_ns && name.as_ref() == entry => in_entry = true,
                    3 if in_entry && in_sitemap_ns && name.as_ref() == b"loc" => {
                        loc = Some(String::new())
                    }
                    _ => {}
                }
            }
            Event::Empty(_) if depth == 0 => {
                if seen_root {
                    return Err(ScrapeError::IllFormed("multiple root elements"));
                }
                seen_root = true;
            }
            Event::Text(e) if depth == 0 => {
                if !e.iter().all(u8::is_ascii_whitespace) {
                    return Err(ScrapeError::IllFormed("text outside root element"));
                }
            }
            Event::CData(_) if depth == 0 => {
                return Err(ScrapeError::IllFormed("text outside root element"));
            }
            Event::Text(e) => {
                if let Some(text) = loc.as_mut() {
                    text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(text) = loc.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                match depth {
                    3 => {
                        if let Some(text) = loc.take() {
                            let text = text.trim();
                            if !text.is_empty() {
                                urls.push(text.to_string());
                            }
                        }
                    }
                    2 => in_entry = false,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(ScrapeError::IllFormed("no root element"));
    }
    if depth != 0 {
        return Err(ScrapeError::IllFormed("document ends inside an element"));
    }
    Ok(urls)
}

/// URLs gathered by one crawl, plus the per-sitemap tally.
#[derive(Debug)]
pub struct CrawlResult {
    pub urls: Vec<String>,
    pub stats: BatchStats,
}

/// Fetch and parse every sitemap in order, appending its leaf URLs. A failing sitemap is
/// logged and skipped; the output is the concatenation of the successful ones.
pub async fn crawl(fetcher: &Fetcher, sitemaps: &[String]) -> CrawlResult {
    let pb = progress_bar(sitemaps.len());
    let mut stats = BatchStats::default();
    let mut all_urls = Vec::new();

    for sitemap in sitemaps {
        pb.set_message(sitemap.clone());
        let outcome = fetcher
            .fetch(sitemap)
            .await
            .and_then(|bytes| parse_leaf_urls(&bytes));
        if let Some(urls) = stats.settle(sitemap, outcome) {
            info!("Successfully processed: {} ({} urls)", sitemap, urls.len());
            all_urls.extend(urls);
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    stats.log("sitemaps");
    info!("Total URLs extracted: {}", all_urls.len());
    CrawlResult {
        urls: all_urls,
        stats,
    }
}

/// One-off lookup of the second-level sitemaps listed by a top-level sitemap index.
pub async fn discover(fetcher: &Fetcher, index_url: &str) -> Result<Vec<String>> {
    info!("Fetching sitemap index: {}", index_url);
    let xml = fetcher
        .fetch(index_url)
        .await
        .with_context(|| format!("Failed to fetch sitemap index {}", index_url))?;
    let sitemaps = parse_index_urls(&xml)
        .with_context(|| format!("Failed to parse sitemap index {}", index_url))?;
    info!("Sitemaps listed in index: {}", sitemaps.len());
    Ok(sitemaps)
}

/// Keep URLs matching `pattern`, preserving order.
pub fn filter_urls(urls: Vec<String>, pattern: &Regex) -> Vec<String> {
    let before = urls.len();
    let kept: Vec<String> = urls.into_iter().filter(|u| pattern.is_match(u)).collect();
    info!("URLs after filtering: {} of {}", kept.len(), before);
    kept
}
