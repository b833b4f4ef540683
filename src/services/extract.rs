// src/services/extract.rs

//! Party record extraction.
//!
//! Turns the registry page into one [`PartyRecord`] per application block.
//! The page is hand-edited, so fields are found by their bold labels rather
//! than by position.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{EmblemImage, PartyRecord, SourceConfig};
use crate::utils::{clean_name, normalize_apostrophes, normalize_whitespace, resolve_url};

/// Field a labelled paragraph fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelField {
    ProposedName,
    Region,
}

/// Maps bold paragraph labels to the field they set.
struct LabelRule {
    /// Lower-cased label text, colon included
    labels: &'static [&'static str],
    field: LabelField,
    /// Ignore later matches once the field holds a value
    first_wins: bool,
}

const LABEL_RULES: &[LabelRule] = &[
    LabelRule {
        labels: &["proposed name:", "proposed name (in english):"],
        field: LabelField::ProposedName,
        first_wins: true,
    },
    LabelRule {
        labels: &["part of the uk that this application applies to:"],
        field: LabelField::Region,
        first_wins: false,
    },
];

fn find_rule(label: &str) -> Option<&'static LabelRule> {
    LABEL_RULES
        .iter()
        .find(|rule| rule.labels.iter().any(|known| *known == label))
}

/// Labelled values collected from one block.
#[derive(Debug, Default)]
struct LabelledFields {
    proposed_name: Option<String>,
    region: Option<String>,
}

impl LabelledFields {
    fn slot(&mut self, field: LabelField) -> &mut Option<String> {
        match field {
            LabelField::ProposedName => &mut self.proposed_name,
            LabelField::Region => &mut self.region,
        }
    }
}

/// Extracts party records from registry page markup.
pub struct RecordExtractor {
    block_sel: Selector,
    heading_sel: Selector,
    paragraph_sel: Selector,
    item_sel: Selector,
    image_sel: Selector,
    origin: Url,
}

impl RecordExtractor {
    /// Compile selectors for the configured page layout.
    pub fn new(source: &SourceConfig) -> Result<Self> {
        Ok(Self {
            block_sel: Self::parse_selector(&source.block_selector)?,
            heading_sel: Self::parse_selector("h3")?,
            paragraph_sel: Self::parse_selector("p")?,
            item_sel: Self::parse_selector("li")?,
            image_sel: Self::parse_selector("img")?,
            origin: Url::parse(&source.origin)?,
        })
    }

    /// Extract every application block, in page order.
    ///
    /// Fails when the page has no blocks or a block has no heading; either
    /// means the page layout changed and nothing on it can be trusted.
    pub fn extract(&self, html: &str) -> Result<Vec<PartyRecord>> {
        let document = Html::parse_document(html);

        let records = document
            .select(&self.block_sel)
            .enumerate()
            .map(|(index, block)| self.parse_block(index, block))
            .collect::<Result<Vec<_>>>()?;

        if records.is_empty() {
            return Err(AppError::parse(
                "no application blocks found; the page layout may have changed",
            ));
        }

        log::debug!("Extracted {} party records", records.len());
        Ok(records)
    }

    fn parse_block(&self, index: usize, block: ElementRef<'_>) -> Result<PartyRecord> {
        let heading = block
            .select(&self.heading_sel)
            .next()
            .map(|h| clean_name(&h.text().collect::<String>()))
            .ok_or_else(|| AppError::parse(format!("block {index} has no heading")))?;
        if heading.is_empty() {
            return Err(AppError::parse(format!("block {index} has an empty heading")));
        }

        let fields = self.parse_labels(&heading, block);

        let mut record = PartyRecord::named(heading.clone());
        record.region = fields.region;
        if let Some(proposed) = fields.proposed_name {
            if proposed == heading {
                record.is_new_registration = true;
            } else {
                record.previous_name = Some(heading);
                record.current_name = proposed;
            }
        }

        record.aliases = self.parse_aliases(block, &record.current_name);
        record.emblem_images = self.parse_emblems(block);

        Ok(record)
    }

    /// Scan `div > p` paragraphs for bold labels.
    fn parse_labels(&self, heading: &str, block: ElementRef<'_>) -> LabelledFields {
        let mut fields = LabelledFields::default();

        for paragraph in block.select(&self.paragraph_sel) {
            let in_div = paragraph
                .parent()
                .and_then(ElementRef::wrap)
                .is_some_and(|parent| parent.value().name() == "div");
            if !in_div {
                continue;
            }

            let Some(strong) = paragraph
                .children()
                .filter_map(ElementRef::wrap)
                .find(|child| child.value().name() == "strong")
            else {
                continue;
            };

            let label = normalize_whitespace(&strong.text().collect::<String>()).to_lowercase();
            let Some(rule) = find_rule(&label) else {
                continue;
            };

            let slot = fields.slot(rule.field);
            if rule.first_wins && slot.is_some() {
                continue;
            }

            let value = Self::trailing_text(strong);
            if value.is_empty() {
                log::debug!("'{heading}': label '{label}' has no inline value, ignoring");
                continue;
            }

            *slot = Some(match rule.field {
                LabelField::ProposedName => clean_name(&value),
                LabelField::Region => value,
            });
        }

        fields
    }

    /// Text node directly after `element`, whitespace-normalized.
    fn trailing_text(element: ElementRef<'_>) -> String {
        element
            .next_sibling()
            .and_then(|node| node.value().as_text().map(|text| normalize_whitespace(text)))
            .unwrap_or_default()
    }

    fn parse_aliases(&self, block: ElementRef<'_>, name: &str) -> Vec<String> {
        let name = name.to_lowercase();
        block
            .select(&self.item_sel)
            .map(|li| normalize_whitespace(&li.text().collect::<String>()))
            .filter(|alias| !alias.is_empty())
            .filter(|alias| normalize_apostrophes(alias).to_lowercase() != name)
            .collect()
    }

    fn parse_emblems(&self, block: ElementRef<'_>) -> Vec<EmblemImage> {
        let mut seen = HashSet::new();
        let mut emblems = Vec::new();

        for img in block.select(&self.image_sel) {
            let attrs = img.value();
            let Some(src) = ["srcset", "data-srcset", "src"]
                .iter()
                .filter_map(|name| attrs.attr(name))
                .find_map(|value| {
                    // srcset candidates without a descriptor end in a bare comma
                    value
                        .split_whitespace()
                        .next()
                        .map(|token| token.trim_end_matches(','))
                        .filter(|token| !token.is_empty())
                })
            else {
                log::debug!("Skipping image without a source");
                continue;
            };

            let url = resolve_url(&self.origin, src);
            if seen.insert(url.clone()) {
                emblems.push(EmblemImage {
                    url,
                    description: normalize_whitespace(attrs.attr("alt").unwrap_or("")),
                });
            }
        }

        emblems
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}
