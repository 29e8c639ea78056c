pub mod schemas;

use anyhow::{anyhow, Result};
use scraper::{Html, Selector};
use tracing::info;

use crate::batch::{progress_bar, BatchStats};
use crate::error::ScrapeError;
use crate::fetch::Fetcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Match,
    Team,
    Player,
}

/// Where a field's text comes from.
#[derive(Debug, Clone, Copy)]
pub enum FieldSource {
    /// Text of the first node matching the selector.
    Text(&'static str),
    /// Text of the n-th node matching the selector.
    Nth(&'static str, usize),
    /// Trailing path segment of the page URL.
    PathSegment,
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub source: FieldSource,
}

impl Field {
    pub const fn new(name: &'static str, source: FieldSource) -> Self {
        Self { name, source }
    }
}

/// Ordered field list for one page type. Column order in every sink follows `fields`.
#[derive(Debug)]
pub struct Schema {
    pub kind: PageKind,
    pub file_stem: &'static str,
    pub fields: &'static [Field],
}

impl Schema {
    pub fn columns(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Parse every selector up front. A bad selector is a programming/config error.
    pub fn compile(&'static self) -> Result<CompiledSchema> {
        let selectors = self
            .fields
            .iter()
            .map(|field| match field.source {
                FieldSource::Text(sel) | FieldSource::Nth(sel, _) => Selector::parse(sel)
                    .map(Some)
                    .map_err(|e| anyhow!("Invalid selector {:?} for '{}': {}", sel, field.name, e)),
                FieldSource::PathSegment => Ok(None),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(CompiledSchema {
            schema: self,
            selectors,
        })
    }
}

pub struct CompiledSchema {
    pub schema: &'static Schema,
    selectors: Vec<Option<Selector>>,
}

/// A complete row: one value per schema field, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub url: String,
    pub values: Vec<(&'static str, String)>,
}

impl PageRecord {
    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn row(&self) -> Vec<&str> {
        self.values.iter().map(|(_, v)| v.as_str()).collect()
    }
}

#[derive(Debug)]
pub struct RecordCollection {
    pub schema: &'static Schema,
    pub records: Vec<PageRecord>,
    pub stats: BatchStats,
}

/// Build a record from a fetched page. Any field without a node makes the whole page a
/// `SelectorMiss`; no partial record is produced.
pub fn extract(body: &str, url: &str, compiled: &CompiledSchema) -> Result<PageRecord, ScrapeError> {
    let document = Html::parse_document(body);
    let mut values = Vec::with_capacity(compiled.schema.fields.len());

    for (field, selector) in compiled.schema.fields.iter().zip(&compiled.selectors) {
        let value = match (field.source, selector) {
            (FieldSource::PathSegment, _) => last_path_segment(url),
            (FieldSource::Text(_), Some(sel)) => document.select(sel).next().map(node_text),
            (FieldSource::Nth(_, n), Some(sel)) => document.select(sel).nth(n).map(node_text),
            (_, None) => None,
        };
        let value = value.ok_or_else(|| ScrapeError::SelectorMiss {
            url: url.to_string(),
            field: field.name,
        })?;
        values.push((field.name, value));
    }

    Ok(PageRecord {
        url: url.to_string(),
        values,
    })
}

/// Fetch and extract each page in order, keeping only complete records.
pub async fn collect_records(
    fetcher: &Fetcher,
    urls: &[String],
    compiled: &CompiledSchema,
) -> RecordCollection {
    let pb = progress_bar(urls.len());
    let mut stats = BatchStats::default();
    let mut records = Vec::new();

    for url in urls {
        pb.set_message(url.clone());
        let outcome = fetcher
            .fetch_text(url)
            .await
            .and_then(|body| extract(&body, url, compiled));
        if let Some(record) = stats.settle(url, outcome) {
            info!("Extracted {} fields from {}", record.values.len(), record.url);
            records.push(record);
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    stats.log(compiled.schema.file_stem);

    RecordCollection {
        schema: compiled.schema,
        records,
        stats,
    }
}

fn node_text(element: scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn last_path_segment(url: &str) -> Option<String> {
    let segment = url.trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() {
        None
    } else {
        Some(segment.to_string())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::schemas::{ALL, MATCH, PLAYER, TEAM};
    use super::*;
    use crate::error::ErrorKind;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    #[test]
    fn all_schemas_compile() {
        for schema in ALL {
            assert!(schema.compile().is_ok(), "{} failed to compile", schema.file_stem);
        }
    }

    #[test]
    fn column_counts() {
        assert_eq!(MATCH.columns().len(), 9);
        assert_eq!(TEAM.columns().len(), 5);
        assert_eq!(PLAYER.columns().len(), 6);
        assert_eq!(MATCH.columns()[..3], ["Match ID", "Team1", "Team2"]);
    }

    #[test]
    fn match_page_complete() {
        let compiled = MATCH.compile().unwrap();
        let url = "https://www.espncricinfo.com/series/ashes/eng-vs-aus-1st-test-1336039";
        let record = extract(&fixture("match"), url, &compiled).unwrap();
        assert_eq!(record.get("Match ID"), Some("eng-vs-aus-1st-test-1336039"));
        assert_eq!(record.get("Team1"), Some("England"));
        assert_eq!(record.get("Team2"), Some("Australia"));
        assert_eq!(record.get("Toss Winner"), Some("England"));
        assert_eq!(record.get("Weather"), Some("Overcast"));
        assert_eq!(record.get("Outcome"), Some("Australia won by 2 wickets"));
        assert_eq!(record.row().len(), 9);
    }

    #[test]
    fn match_page_missing_field_is_absent() {
        let compiled = MATCH.compile().unwrap();
        let html = fixture("match").replace("class=\"weather\"", "class=\"climate\"");
        let err = extract(&html, "https://a.com/m/1", &compiled).unwrap_err();
        match err {
            ScrapeError::SelectorMiss { field, .. } => assert_eq!(field, "Weather"),
            other => panic!("Expected selector miss, got {:?}", other),
        }
    }

    #[test]
    fn match_page_with_one_team_is_absent() {
        let compiled = MATCH.compile().unwrap();
        let html = fixture("match").replace(
            "<span class=\"team-name\">Australia</span>",
            "<span>Australia</span>",
        );
        let err = extract(&html, "https://a.com/m/1", &compiled).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SelectorMiss);
    }

    #[test]
    fn match_id_uses_trailing_segment() {
        assert_eq!(last_path_segment("https://a.com/m/123/").as_deref(), Some("123"));
        assert_eq!(last_path_segment("https://a.com/m/123").as_deref(), Some("123"));
        assert_eq!(last_path_segment(""), None);
    }

    #[test]
    fn team_page_complete() {
        let compiled = TEAM.compile().unwrap();
        let record = extract(&fixture("team"), "https://a.com/team/india-6", &compiled).unwrap();
        assert_eq!(record.get("Team Name"), Some("India"));
        assert_eq!(record.get("Win Rate"), Some("61%"));
        assert_eq!(record.row().len(), 5);
    }

    #[test]
    fn player_page_complete() {
        let compiled = PLAYER.compile().unwrap();
        let record = extract(&fixture("player"), "https://a.com/p/1", &compiled).unwrap();
        assert_eq!(record.get("Player Name"), Some("Virat Kohli"));
        assert_eq!(record.get("Age"), Some("35y 200d"));
        assert_eq!(record.get("Specialization"), Some("Top order Batter"));
    }

    #[test]
    fn empty_node_still_counts_as_present() {
        let compiled = TEAM.compile().unwrap();
        let html = fixture("team").replace("Strong opening stands", "");
        let record = extract(&html, "https://a.com/t", &compiled).unwrap();
        assert_eq!(record.get("Partnerships"), Some(""));
    }

    #[tokio::test]
    async fn collect_keeps_only_complete_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/player/good"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("player")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/player/incomplete"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("team")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/player/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(None).unwrap();
        let compiled = PLAYER.compile().unwrap();
        let urls = vec![
            format!("{}/player/gone", server.uri()),
            format!("{}/player/incomplete", server.uri()),
            format!("{}/player/good", server.uri()),
        ];
        let collection = collect_records(&fetcher, &urls, &compiled).await;
        assert_eq!(collection.records.len(), 1);
        assert_eq!(collection.records[0].url, urls[2]);
        assert_eq!(collection.stats, BatchStats { total: 3, ok: 1, errors: 2 });
    }
}
