use dashboard_core::MovieRecord;
use dashboard_logging::dash_warn;
use scraper::{ElementRef, Html, Selector};

/// CSS selectors locating one movie item and its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSelectors {
    pub item: String,
    pub title: String,
    pub year: String,
    pub genre: String,
    pub rating: String,
}

impl Default for RecordSelectors {
    fn default() -> Self {
        Self {
            item: ".lister-item".to_string(),
            title: ".lister-item-header a".to_string(),
            year: ".lister-item-year".to_string(),
            genre: ".genre".to_string(),
            rating: ".ipl-rating-star__rating".to_string(),
        }
    }
}

pub trait RecordExtractor: Send + Sync {
    fn extract(&self, html: &str) -> Vec<MovieRecord>;
}

/// Extracts one record per item element. Within an item the first match of
/// each field selector wins; missing fields get placeholders.
#[derive(Debug)]
pub struct ListerItemExtractor {
    item: Option<Selector>,
    title: Option<Selector>,
    year: Option<Selector>,
    genre: Option<Selector>,
    rating: Option<Selector>,
}

impl ListerItemExtractor {
    pub fn new(selectors: &RecordSelectors) -> Self {
        Self {
            item: compile(&selectors.item),
            title: compile(&selectors.title),
            year: compile(&selectors.year),
            genre: compile(&selectors.genre),
            rating: compile(&selectors.rating),
        }
    }
}

impl Default for ListerItemExtractor {
    fn default() -> Self {
        Self::new(&RecordSelectors::default())
    }
}

impl RecordExtractor for ListerItemExtractor {
    fn extract(&self, html: &str) -> Vec<MovieRecord> {
        let Some(item_sel) = self.item.as_ref() else {
            return Vec::new();
        };
        let doc = Html::parse_document(html);

        doc.select(item_sel)
            .map(|item| {
                let title = first_text(item, self.title.as_ref());
                let year = first_text(item, self.year.as_ref());
                let genre = first_text(item, self.genre.as_ref());
                let rating = first_text(item, self.rating.as_ref());
                MovieRecord::from_optional(
                    title.as_deref(),
                    year.as_deref(),
                    genre.as_deref(),
                    rating.as_deref(),
                )
            })
            .collect()
    }
}

fn first_text(item: ElementRef<'_>, selector: Option<&Selector>) -> Option<String> {
    let node = item.select(selector?).next()?;
    Some(node.text().collect::<String>())
}

fn compile(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(err) => {
            dash_warn!("Ignoring invalid selector {:?}: {}", css, err);
            None
        }
    }
}
