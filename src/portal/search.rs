use super::entity::PortalEntity;

/// Keep records where any search field contains `query`, ignoring case.
/// A blank query keeps everything. Input order is preserved.
pub fn filter_records<'a, E: PortalEntity>(records: &'a [E], query: &str) -> Vec<&'a E> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records.iter().filter(|record| matches_query(*record, &needle)).collect()
}

/// `needle` must already be lowercased.
pub fn matches_query<E: PortalEntity>(record: &E, needle: &str) -> bool {
    record
        .search_fields()
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
}
