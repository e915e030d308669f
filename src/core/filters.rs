use crate::models::{CandidateQuery, Property, SizeRange};

/// Candidates smaller than half the target's heated area are never requested
pub const SIZE_PREFILTER_MIN_RATIO: f64 = 0.5;

/// Candidates larger than one and a half times the target are never requested
pub const SIZE_PREFILTER_MAX_RATIO: f64 = 1.5;

/// Coarse heated-area window pushed down to the candidate source
///
/// Only applies when the target's heated area is known. This is a cheap
/// query filter; it is not part of the score.
pub fn size_prefilter(target: &Property) -> Option<SizeRange> {
    target
        .heated_area
        .filter(|area| area.is_finite() && *area > 0.0)
        .map(|area| SizeRange {
            min: area * SIZE_PREFILTER_MIN_RATIO,
            max: area * SIZE_PREFILTER_MAX_RATIO,
        })
}

/// Check if a candidate is within the candidate query constraints
///
/// Sources without a query planner of their own apply this to honour the
/// bounding-box, exclusion and size filters of a [`CandidateQuery`].
#[inline]
pub fn matches_query_constraints(
    candidate: &Property,
    query: &CandidateQuery,
) -> bool {
    // Bounding box (geospatial pre-filter); no coordinates, no match
    let Some(position) = candidate.coordinates else {
        return false;
    };
    if !super::distance::is_within_bounding_box(
        position.latitude,
        position.longitude,
        &query.bounding_box,
    ) {
        return false;
    }

    // Excluded accounts (the target itself)
    if query.exclude_ids.contains(&candidate.account_number) {
        return false;
    }

    // Heated-area window
    if let Some(range) = query.size_range {
        match candidate.heated_area {
            Some(area) if range.contains(area) => {}
            _ => return false,
        }
    }

    true
}
