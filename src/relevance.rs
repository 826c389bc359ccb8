use log::{debug, warn};

use crate::{extractor::ListingRecord, store::KEYWORD_DELIMITER};

/// Decides which releases are in scope: ministry allow-list plus keyword match
/// against the title.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    ministries: Vec<String>,
    keywords: Vec<String>,
    // Lowercased copies of `keywords`, same order.
    needles: Vec<String>,
}

impl RelevanceFilter {
    pub fn new(ministries: Vec<String>, keywords: Vec<String>) -> Self {
        let mut kept = Vec::with_capacity(keywords.len());
        let mut needles: Vec<String> = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let keyword = keyword.trim().to_string();
            let needle = keyword.to_lowercase();
            if needle.is_empty() || needles.contains(&needle) {
                continue;
            }
            if keyword.contains(KEYWORD_DELIMITER) {
                warn!("Ignoring keyword {keyword:?}: it cannot be stored intact");
                continue;
            }
            kept.push(keyword);
            needles.push(needle);
        }
        Self {
            ministries,
            keywords: kept,
            needles,
        }
    }

    pub fn ministries(&self) -> &[String] {
        &self.ministries
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Returns whether the ministry is allowed and which keywords occur in the
    /// title. Keywords are computed even for disallowed ministries.
    pub fn is_relevant(&self, record: &ListingRecord) -> (bool, Vec<String>) {
        let allowed = self.ministries.iter().any(|m| *m == record.ministry);
        let title = record.title.to_lowercase();
        let matched = self
            .keywords
            .iter()
            .zip(&self.needles)
            .filter(|(_, needle)| title.contains(needle.as_str()))
            .map(|(keyword, _)| keyword.clone())
            .collect();
        (allowed, matched)
    }

    /// Keeps the record, with its matched keywords filled in, iff its ministry
    /// is allowed and at least one keyword matched.
    pub fn apply(&self, mut record: ListingRecord) -> Option<ListingRecord> {
        let (allowed, matched) = self.is_relevant(&record);
        if !allowed || matched.is_empty() {
            debug!("Dropping {:?} ({})", record.title, record.ministry);
            return None;
        }
        record.matched_keywords = matched;
        Some(record)
    }
}
