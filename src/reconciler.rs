use std::collections::HashMap;

use crate::extractor::ListingRecord;

/// Historical releases keyed by link, kept in first-seen order so the
/// persisted file only ever grows at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: Vec<ListingRecord>,
    index: HashMap<String, usize>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, link: &str) -> bool {
        self.index.contains_key(link)
    }

    pub fn get(&self, link: &str) -> Option<&ListingRecord> {
        self.index.get(link).map(|&i| &self.records[i])
    }

    /// Inserts the record, replacing any record with the same link in place.
    /// Returns the replaced record.
    pub fn upsert(&mut self, record: ListingRecord) -> Option<ListingRecord> {
        match self.index.get(&record.link) {
            Some(&i) => Some(std::mem::replace(&mut self.records[i], record)),
            None => {
                self.index.insert(record.link.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ListingRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[ListingRecord] {
        &self.records
    }
}

impl FromIterator<ListingRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = ListingRecord>>(iter: I) -> Self {
        let mut set = RecordSet::new();
        for record in iter {
            set.upsert(record);
        }
        set
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a ListingRecord;
    type IntoIter = std::slice::Iter<'a, ListingRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug)]
pub struct Reconciliation {
    pub combined: RecordSet,
    pub new_ones: Vec<ListingRecord>,
}

/// Merges a freshly collected batch into history.
///
/// Batch records win over history for the same link. A record is new only if
/// its link was absent from history; known links whose other fields changed
/// are updated in `combined` but not reported. A link repeated inside the
/// batch is reported once, as its first occurrence, while its last values win
/// in `combined`.
pub fn reconcile(history: RecordSet, batch: Vec<ListingRecord>) -> Reconciliation {
    let mut combined = history;
    let mut new_ones = Vec::new();

    for record in batch {
        if !combined.contains(&record.link) {
            new_ones.push(record.clone());
        }
        combined.upsert(record);
    }

    Reconciliation { combined, new_ones }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn rec(link: &str, title: &str) -> ListingRecord {
        ListingRecord {
            date: "17 OCT 2026".to_string(),
            title: title.to_string(),
            link: link.to_string(),
            ministry: "Ministry of Power".to_string(),
            matched_keywords: vec!["solar".to_string()],
        }
    }

    fn links(records: &[ListingRecord]) -> Vec<&str> {
        records.iter().map(|r| r.link.as_str()).collect()
    }

    #[test]
    fn empty_history_reports_whole_batch() {
        let a = rec("a", "solar energy boost");
        let out = reconcile(RecordSet::new(), vec![a.clone()]);
        assert_eq!(out.combined.len(), 1);
        assert_eq!(out.combined.get("a"), Some(&a));
        assert_eq!(out.new_ones, vec![a]);
    }

    #[test]
    fn batch_wins_and_known_links_are_not_new() {
        let history: RecordSet = [rec("a", "old solar title")].into_iter().collect();
        let a_updated = rec("a", "updated solar title");
        let b_new = rec("b", "solar tender");

        let out = reconcile(history, vec![a_updated.clone(), b_new.clone()]);

        assert_eq!(out.combined.len(), 2);
        assert_eq!(out.combined.get("a"), Some(&a_updated));
        assert_eq!(out.combined.get("b"), Some(&b_new));
        assert_eq!(out.new_ones, vec![b_new]);
        // History order is kept; new links go to the end.
        assert_eq!(links(out.combined.as_slice()), ["a", "b"]);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let history: RecordSet = [rec("h1", "x"), rec("h2", "y")].into_iter().collect();
        let batch = vec![rec("n1", "p"), rec("h2", "y2"), rec("n2", "q")];

        let first = reconcile(history, batch.clone());
        let second = reconcile(first.combined.clone(), batch);

        assert_eq!(second.combined, first.combined);
        assert!(second.new_ones.is_empty());
    }

    #[test]
    fn new_ones_preserve_batch_order() {
        let history: RecordSet = [rec("k", "known")].into_iter().collect();
        let batch = vec![rec("z", "1"), rec("k", "2"), rec("m", "3"), rec("a", "4")];

        let out = reconcile(history, batch);

        assert_eq!(links(&out.new_ones), ["z", "m", "a"]);
        assert_eq!(links(out.combined.as_slice()), ["k", "z", "m", "a"]);
    }

    #[test]
    fn duplicate_links_within_batch_collapse() {
        let batch = vec![rec("a", "first"), rec("b", "other"), rec("a", "second")];

        let out = reconcile(RecordSet::new(), batch);

        assert_eq!(out.combined.len(), 2);
        assert_eq!(out.combined.get("a").unwrap().title, "second");
        assert_eq!(links(&out.new_ones), ["a", "b"]);
        assert_eq!(out.new_ones[0].title, "first");
    }

    #[test]
    fn combined_never_holds_duplicate_links() {
        let history: RecordSet = ["a", "b", "c"].iter().map(|l| rec(l, "h")).collect();
        let batch: Vec<_> = ["c", "d", "a", "d", "e"].iter().map(|l| rec(l, "b")).collect();

        let out = reconcile(history, batch);

        let unique: HashSet<_> = out.combined.iter().map(|r| r.link.as_str()).collect();
        assert_eq!(unique.len(), out.combined.len());
        assert_eq!(out.combined.len(), 5);
    }
}
