//! Incident-to-service correlation.
//!
//! The monitoring backend answers incident queries broadly; this crate
//! narrows the raw list down to the records that actually concern one target
//! service, tags each accepted record with a [`Relevance`], and partitions
//! the result into severity buckets for presentation.

use tracing::debug;

use vigil_core::{IncidentRecord, IncidentStatus, Relevance};

/// Matched incidents partitioned by urgency. Each record lands in exactly
/// one bucket.
#[derive(Debug, Clone, Default)]
pub struct ProblemBuckets {
    /// Root-cause matches and high-severity incidents.
    pub critical: Vec<IncidentRecord>,
    /// Incidents directly impacting the service.
    pub important: Vec<IncidentRecord>,
    /// Incidents touching the service only indirectly.
    pub related: Vec<IncidentRecord>,
    /// Already-resolved incidents, regardless of relevance.
    pub resolved: Vec<IncidentRecord>,
}

impl ProblemBuckets {
    pub fn total(&self) -> usize {
        self.critical.len() + self.important.len() + self.related.len() + self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Filter raw incident records down to those concerning the target service.
///
/// With a known `target_entity_id` the match is precise: a record is
/// accepted when the target appears among its impacted, affected, or
/// root-cause entities, tagged by role; entity-name containment is a
/// secondary fallback within the same pass (tag [`Relevance::NameMatch`]),
/// and an id match always outranks it for the same record. Without an entity
/// id the match degrades to name containment against titles
/// ([`Relevance::TitleMatch`]) and entity names ([`Relevance::EntityMatch`]).
///
/// Entity refs missing the field under inspection are skipped, not errors.
pub fn correlate(
    records: Vec<IncidentRecord>,
    target_entity_id: Option<&str>,
    target_name: &str,
) -> Vec<IncidentRecord> {
    let total = records.len();
    let name_lower = target_name.to_lowercase();

    let matched: Vec<IncidentRecord> = records
        .into_iter()
        .filter_map(|record| match target_entity_id {
            Some(entity_id) => match_by_entity(record, entity_id, &name_lower),
            None => match_by_name(record, &name_lower),
        })
        .collect();

    debug!(
        target = target_name,
        matched = matched.len(),
        total,
        "Correlated incidents"
    );
    matched
}

/// Every entity a record references: impacted, affected, and root cause.
fn entity_union(record: &IncidentRecord) -> impl Iterator<Item = &vigil_core::EntityRef> {
    record
        .impacted_entities
        .iter()
        .chain(record.affected_entities.iter())
        .chain(record.root_cause_entity.iter())
}

fn match_by_entity(
    mut record: IncidentRecord,
    entity_id: &str,
    name_lower: &str,
) -> Option<IncidentRecord> {
    let id_hit = entity_union(&record).any(|e| e.entity_id.as_deref() == Some(entity_id));
    if id_hit {
        record.relevance = Some(relevance_for(&record, entity_id));
        return Some(record);
    }

    let name_hit = !name_lower.is_empty()
        && entity_union(&record).any(|e| {
            e.name.as_deref().is_some_and(|n| {
                let n = n.to_lowercase();
                !n.is_empty() && (n.contains(name_lower) || name_lower.contains(&n))
            })
        });
    if name_hit {
        record.relevance = Some(Relevance::NameMatch);
        return Some(record);
    }

    None
}

/// Role of the target within an already id-matched record.
fn relevance_for(record: &IncidentRecord, entity_id: &str) -> Relevance {
    if record
        .root_cause_entity
        .as_ref()
        .is_some_and(|e| e.entity_id.as_deref() == Some(entity_id))
    {
        return Relevance::RootCause;
    }
    if record
        .impacted_entities
        .iter()
        .any(|e| e.entity_id.as_deref() == Some(entity_id))
    {
        return Relevance::DirectlyImpacted;
    }
    Relevance::IndirectlyAffected
}

fn match_by_name(mut record: IncidentRecord, name_lower: &str) -> Option<IncidentRecord> {
    if name_lower.is_empty() {
        return None;
    }

    let title_hits = record.title.to_lowercase().contains(name_lower)
        || record
            .display_name
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(name_lower));
    if title_hits {
        record.relevance = Some(Relevance::TitleMatch);
        return Some(record);
    }

    let entity_hits = record
        .impacted_entities
        .iter()
        .chain(record.affected_entities.iter())
        .any(|e| {
            e.name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(name_lower))
        });
    if entity_hits {
        record.relevance = Some(Relevance::EntityMatch);
        return Some(record);
    }

    None
}

/// Partition matched incidents into presentation buckets.
///
/// Priority per record: resolved status wins over any relevance; then
/// root-cause relevance or high severity is critical; then direct impact is
/// important; everything else is related.
pub fn categorize(records: Vec<IncidentRecord>) -> ProblemBuckets {
    let mut buckets = ProblemBuckets::default();

    for record in records {
        if record.status == IncidentStatus::Resolved {
            buckets.resolved.push(record);
        } else if record.relevance == Some(Relevance::RootCause)
            || record.severity.eq_ignore_ascii_case("ERROR")
            || record.severity.eq_ignore_ascii_case("CUSTOM_ALERT")
        {
            buckets.critical.push(record);
        } else if record.relevance == Some(Relevance::DirectlyImpacted) {
            buckets.important.push(record);
        } else {
            buckets.related.push(record);
        }
    }

    buckets
}
