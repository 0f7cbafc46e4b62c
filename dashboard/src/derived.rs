//! Chart data derived from the member roster.

use std::collections::BTreeMap;

use shared::{ClubId, Member};

/// Counts items per key. Items without a key are left out.
pub fn distribution<T, K, F>(items: &[T], key: F) -> BTreeMap<K, usize>
where
    K: Ord,
    F: Fn(&T) -> Option<K>,
{
    let mut counts = BTreeMap::new();
    for item in items {
        if let Some(k) = key(item) {
            *counts.entry(k).or_insert(0) += 1;
        }
    }
    counts
}

pub fn major_of(member: &Member) -> Option<String> {
    member
        .major
        .as_deref()
        .map(str::trim)
        .filter(|major| !major.is_empty())
        .map(str::to_string)
}

pub fn graduation_year_of(member: &Member) -> Option<i32> {
    member.graduation_year.filter(|year| *year != 0)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberCharts {
    pub majors: BTreeMap<String, usize>,
    pub graduation_years: BTreeMap<i32, usize>,
}

impl MemberCharts {
    pub fn from_members(members: &[Member]) -> Self {
        Self {
            majors: distribution(members, major_of),
            graduation_years: distribution(members, graduation_year_of),
        }
    }
}

/// Memoised [`MemberCharts`], recomputed only when the club or the member
/// data version moves.
#[derive(Debug, Default)]
pub struct DerivedCharts {
    key: Option<(ClubId, u64)>,
    charts: MemberCharts,
    computations: u64,
}

impl DerivedCharts {
    pub fn get(&mut self, club: ClubId, version: u64, members: &[Member]) -> &MemberCharts {
        if self.key != Some((club, version)) {
            self.charts = MemberCharts::from_members(members);
            self.key = Some((club, version));
            self.computations += 1;
            tracing::debug!(club, version, "member charts recomputed");
        }
        &self.charts
    }

    pub fn computations(&self) -> u64 {
        self.computations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(major: Option<&str>, year: Option<i32>) -> Member {
        Member {
            student_id: format!("{major:?}{year:?}"),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            email: "a@b.edu".to_string(),
            phone_number: None,
            major: major.map(str::to_string),
            graduation_year: year,
        }
    }

    #[test]
    fn majors_without_value_are_excluded() {
        let members = [
            member(Some("CS"), None),
            member(Some("CS"), None),
            member(None, None),
            member(Some("EE"), None),
        ];
        let majors = distribution(&members, major_of);

        assert_eq!(majors, BTreeMap::from([("CS".to_string(), 2), ("EE".to_string(), 1)]));
    }

    #[test]
    fn blank_major_and_zero_year_count_as_missing() {
        let members = [member(Some("  "), Some(0)), member(Some("Math"), Some(2026))];
        let charts = MemberCharts::from_members(&members);

        assert_eq!(charts.majors.len(), 1);
        assert_eq!(charts.graduation_years, BTreeMap::from([(2026, 1)]));
    }

    #[test]
    fn recomputes_only_when_key_moves() {
        let members = [member(Some("CS"), Some(2025))];
        let mut derived = DerivedCharts::default();

        derived.get(1, 0, &members);
        derived.get(1, 0, &members);
        assert_eq!(derived.computations(), 1);

        derived.get(1, 1, &members);
        derived.get(2, 1, &members);
        assert_eq!(derived.computations(), 3);
    }
}
