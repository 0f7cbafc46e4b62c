//! Upcoming/past event lists and the lazily loaded attendance of the one
//! expanded event row.

use chrono::NaiveDate;
use shared::{Attendance, Event, EventId};

use crate::error::HttpError;
use crate::store::EntityStore;

/// Events dated today or later are upcoming.
pub fn is_upcoming(event: &Event, today: NaiveDate) -> bool {
    event.event_date >= today
}

pub fn partition(events: Vec<Event>, today: NaiveDate) -> (Vec<Event>, Vec<Event>) {
    events.into_iter().partition(|event| is_upcoming(event, today))
}

#[derive(Debug, Default)]
pub struct EventBoard {
    pub upcoming: EntityStore<Event>,
    pub past: EntityStore<Event>,
}

impl EventBoard {
    pub(crate) fn reset(&mut self) {
        self.upcoming.reset();
        self.past.reset();
    }

    /// Both halves come from one compound fetch; either both apply or neither.
    pub(crate) fn replace(&mut self, upcoming: Vec<Event>, past: Vec<Event>) {
        self.upcoming.replace_all(upcoming);
        self.past.replace_all(past);
    }

    /// Files a single event on the side its date puts it.
    pub(crate) fn place(&mut self, event: Event, today: NaiveDate) {
        let key = event.event_id;
        if is_upcoming(&event, today) {
            self.past.remove(&key);
            self.upcoming.upsert(event);
        } else {
            self.upcoming.remove(&key);
            self.past.upsert(event);
        }
    }

    pub(crate) fn remove(&mut self, event: EventId) -> Option<Event> {
        self.upcoming
            .remove(&event)
            .or_else(|| self.past.remove(&event))
    }

    pub fn get(&self, event: EventId) -> Option<&Event> {
        self.upcoming.get(&event).or_else(|| self.past.get(&event))
    }
}

/// At most one expanded row. Collapsing drops the attendance list; expanding
/// always refetches.
#[derive(Debug, Default)]
pub struct Expansion {
    expanded: Option<EventId>,
    attendance: EntityStore<Attendance>,
    ticket: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Fetch attendance for the event and present the ticket when applying it.
    Expanded { event: EventId, ticket: u64 },
    Collapsed,
}

impl Expansion {
    pub fn expanded(&self) -> Option<EventId> {
        self.expanded
    }

    pub fn attendance(&self) -> &EntityStore<Attendance> {
        &self.attendance
    }

    pub(crate) fn toggle(&mut self, event: EventId) -> Toggle {
        if self.expanded == Some(event) {
            self.collapse();
            Toggle::Collapsed
        } else {
            Toggle::Expanded {
                event,
                ticket: self.expand(event),
            }
        }
    }

    pub(crate) fn expand(&mut self, event: EventId) -> u64 {
        self.ticket += 1;
        self.expanded = Some(event);
        self.attendance.reset();
        self.ticket
    }

    pub(crate) fn collapse(&mut self) {
        self.ticket += 1;
        self.expanded = None;
        self.attendance.reset();
    }

    /// A ticket for refetching the row that is open now.
    pub(crate) fn refresh_ticket(&mut self) -> Option<(EventId, u64)> {
        let event = self.expanded?;
        self.ticket += 1;
        Some((event, self.ticket))
    }

    pub(crate) fn is_current(&self, event: EventId, ticket: u64) -> bool {
        self.expanded == Some(event) && self.ticket == ticket
    }

    pub(crate) fn is_open(&self, event: EventId) -> bool {
        self.expanded == Some(event)
    }

    pub(crate) fn resolve(
        &mut self,
        event: EventId,
        ticket: u64,
        result: Result<Vec<Attendance>, HttpError>,
    ) -> bool {
        if !self.is_current(event, ticket) {
            return false;
        }
        match result {
            Ok(records) => self.attendance.replace_all(records),
            Err(err) => self.attendance.fail(err.kind()),
        }
        true
    }

    pub(crate) fn attendance_mut(&mut self) -> &mut EntityStore<Attendance> {
        &mut self.attendance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::AttendanceStatus;

    fn event(id: EventId, date: &str) -> Event {
        Event {
            event_id: id,
            event_name: format!("Event {id}"),
            event_description: None,
            event_date: date.parse().unwrap(),
            event_time: None,
            location: None,
        }
    }

    fn present(id: i64) -> Attendance {
        Attendance {
            attendance_id: id,
            student_id: format!("S{id}"),
            attendance_status: AttendanceStatus::Present,
            check_in_time: None,
            member_name: None,
        }
    }

    #[test]
    fn today_counts_as_upcoming() {
        let today: NaiveDate = "2024-05-01".parse().unwrap();
        let (upcoming, past) = partition(
            vec![event(1, "2024-04-30"), event(2, "2024-05-01"), event(3, "2025-01-01")],
            today,
        );
        assert_eq!(upcoming.iter().map(|e| e.event_id).collect::<Vec<_>>(), [2, 3]);
        assert_eq!(past.iter().map(|e| e.event_id).collect::<Vec<_>>(), [1]);
    }

    #[test]
    fn place_moves_between_sides() {
        let today: NaiveDate = "2024-05-01".parse().unwrap();
        let mut board = EventBoard::default();
        board.replace(vec![event(1, "2024-06-01")], vec![]);

        board.place(event(1, "2024-01-01"), today);
        assert!(board.upcoming.is_empty());
        assert_eq!(board.past.len(), 1);
    }

    #[test]
    fn expanding_another_row_collapses_the_first() {
        let mut expansion = Expansion::default();
        let Toggle::Expanded { ticket: a, .. } = expansion.toggle(1) else {
            panic!("expected expansion");
        };
        assert!(expansion.resolve(1, a, Ok(vec![present(10)])));
        assert_eq!(expansion.attendance().len(), 1);

        let Toggle::Expanded { ticket: b, .. } = expansion.toggle(2) else {
            panic!("expected expansion");
        };
        assert!(expansion.attendance().is_empty());
        assert!(!expansion.resolve(1, a, Ok(vec![present(11)])));
        assert!(expansion.resolve(2, b, Ok(vec![present(20), present(21)])));
        assert_eq!(expansion.expanded(), Some(2));
        assert_eq!(expansion.attendance().len(), 2);
    }

    #[test]
    fn toggling_the_open_row_clears_attendance() {
        let mut expansion = Expansion::default();
        let Toggle::Expanded { ticket, .. } = expansion.toggle(5) else {
            panic!("expected expansion");
        };
        expansion.resolve(5, ticket, Ok(vec![present(1)]));

        assert_eq!(expansion.toggle(5), Toggle::Collapsed);
        assert_eq!(expansion.expanded(), None);
        assert!(expansion.attendance().is_empty());
    }
}
