//! Feed diffing: which entries of a fresh snapshot are new?
//!
//! Given the previously stored document and a freshly fetched one, this
//! module computes the entries present in the new document but absent
//! from the old one. Matching is identity-based where the feed supplies
//! stable ids, with a publication-date + title fallback for feeds that
//! do not.

use super::{Entry, FeedDocument};

/// Return the entries of `new` that are not present in `old`, in the
/// new document's order.
///
/// An entry is considered already present when:
/// - it carries a non-empty identity shared by some old entry
///   (authoritative, checked first), or
/// - it carries a publication timestamp or a title, and some old entry
///   has an equal publication timestamp *and* an equal title (a weak
///   heuristic for feeds without stable ids).
///
/// Neither document is mutated. The comparison is O(|new| x |old|),
/// which is fine for the tens of entries real feeds carry. First-poll
/// truncation is the caller's policy, not this function's.
pub fn new_entries(old: &FeedDocument, new: &FeedDocument) -> Vec<Entry> {
    new.entries
        .iter()
        .filter(|candidate| !old.entries.iter().any(|known| matches(candidate, known)))
        .cloned()
        .collect()
}

/// Whether `candidate` refers to the same entry as `known`.
fn matches(candidate: &Entry, known: &Entry) -> bool {
    if let Some(id) = candidate.identity.as_deref().filter(|id| !id.is_empty()) {
        if known.identity.as_deref() == Some(id) {
            return true;
        }
    }

    // The fallback needs at least one comparable token: two entries that
    // carry neither a timestamp nor a title are never the same entry.
    (candidate.published.is_some() || candidate.title.is_some())
        && candidate.published == known.published
        && candidate.title == known.title
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn doc(entries: Vec<Entry>) -> FeedDocument {
        FeedDocument {
            title: "Test Feed".to_string(),
            entries,
        }
    }

    #[test]
    fn test_identical_documents_yield_nothing() {
        let entries = vec![
            Entry::with_identity("a").title("First"),
            Entry::with_identity("b").title("Second"),
        ];
        let old = doc(entries.clone());
        let new = doc(entries);

        assert!(new_entries(&old, &new).is_empty());
    }

    #[test]
    fn test_everything_is_new_against_empty_document() {
        let old = FeedDocument::default();
        let new = doc(vec![
            Entry::with_identity("a").title("First"),
            Entry::with_identity("b").title("Second"),
        ]);

        let result = new_entries(&old, &new);
        assert_eq!(result.len(), 2);
        // Document order is preserved, so truncating to one yields the
        // first (newest) entry.
        assert_eq!(result[0].identity.as_deref(), Some("a"));
    }

    #[test]
    fn test_new_entry_prepended() {
        let old = doc(vec![Entry::with_identity("a"), Entry::with_identity("b")]);
        let new = doc(vec![
            Entry::with_identity("c"),
            Entry::with_identity("a"),
            Entry::with_identity("b"),
        ]);

        let result = new_entries(&old, &new);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].identity.as_deref(), Some("c"));
    }

    #[test]
    fn test_identity_match_is_authoritative() {
        let when = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let old = doc(vec![Entry::with_identity("G1")
            .title("Old Title")
            .published(when)]);
        // Same identity, different title and timestamp: still not new.
        let new = doc(vec![Entry::with_identity("G1")
            .title("Revised Title")
            .published(Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap())]);

        assert!(new_entries(&old, &new).is_empty());
    }

    #[test]
    fn test_fallback_requires_both_published_and_title() {
        let when = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let old = doc(vec![Entry::default().title("Stable").published(when)]);

        // Same timestamp, same title: existing.
        let same = doc(vec![Entry::default().title("Stable").published(when)]);
        assert!(new_entries(&old, &same).is_empty());

        // Same timestamp, changed title: new.
        let retitled = doc(vec![Entry::default().title("Changed").published(when)]);
        assert_eq!(new_entries(&old, &retitled).len(), 1);

        // Same title, changed timestamp: new.
        let republished = doc(vec![Entry::default()
            .title("Stable")
            .published(Utc.with_ymd_and_hms(2025, 6, 3, 0, 0, 0).unwrap())]);
        assert_eq!(new_entries(&old, &republished).len(), 1);
    }

    #[test]
    fn test_empty_identity_is_not_a_match() {
        // An empty-string identity must not match another empty identity;
        // only the fallback applies.
        let old = doc(vec![Entry {
            identity: Some(String::new()),
            ..Entry::default()
        }
        .title("A")]);
        let new = doc(vec![Entry {
            identity: Some(String::new()),
            ..Entry::default()
        }
        .title("B")]);

        assert_eq!(new_entries(&old, &new).len(), 1);
    }

    #[test]
    fn test_entries_distinguished_only_by_identity_do_not_fallback_match() {
        // Entries carrying nothing but an identity must be told apart by
        // it; the absent-timestamp, absent-title fallback never applies.
        let old = doc(vec![Entry::with_identity("a"), Entry::with_identity("b")]);
        let new = doc(vec![
            Entry::with_identity("c"),
            Entry::with_identity("a"),
            Entry::with_identity("b"),
        ]);

        let result = new_entries(&old, &new);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].identity.as_deref(), Some("c"));

        // And two such entries with different ids are mutually new.
        let old = doc(vec![Entry::with_identity("x")]);
        let new = doc(vec![Entry::with_identity("y")]);
        assert_eq!(new_entries(&old, &new).len(), 1);
    }

    #[test]
    fn test_unkeyed_entries_without_dates_match_on_title() {
        let old = doc(vec![Entry::default().title("Only Title")]);
        let new = doc(vec![Entry::default().title("Only Title")]);

        assert!(new_entries(&old, &new).is_empty());
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let old = doc(vec![Entry::with_identity("a")]);
        let new = doc(vec![Entry::with_identity("a"), Entry::with_identity("b")]);
        let old_before = old.clone();
        let new_before = new.clone();

        let _ = new_entries(&old, &new);

        assert_eq!(old, old_before);
        assert_eq!(new, new_before);
    }

    #[test]
    fn test_result_preserves_document_order() {
        let old = doc(vec![Entry::with_identity("x")]);
        let new = doc(vec![
            Entry::with_identity("n1"),
            Entry::with_identity("x"),
            Entry::with_identity("n2"),
        ]);

        let result = new_entries(&old, &new);
        let ids: Vec<_> = result
            .iter()
            .map(|e| e.identity.as_deref().unwrap())
            .collect();
        assert_eq!(ids, vec!["n1", "n2"]);
    }
}
