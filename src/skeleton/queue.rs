use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;

use super::{Event, EventType};

/// Total order of pending events: earliest time first, edge events before
/// split events at equal time, then by the ids involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(super) struct EventKey {
    time: OrderedFloat<f64>,
    rank: u8,
    node: usize,
    other: usize,
}
impl From<&Event> for EventKey {
    fn from(event: &Event) -> Self {
        let (rank, other) = match event.event_type {
            EventType::Edge{next_ndx} => (0, next_ndx),
            EventType::Split{edge,..} => (1, edge),
        };
        EventKey{ time: event.time, rank, node: event.node, other }
    }
}

/// Min-queue of events. Stale entries are not removed eagerly, the builder
/// discards them when they surface.
#[derive(Debug)]
pub(super) struct EventQueue {
    events: PriorityQueue<Event, Reverse<EventKey>>,
}
impl Default for EventQueue {
    fn default() -> Self {
        EventQueue{ events: PriorityQueue::new() }
    }
}
impl EventQueue {
    pub fn push(&mut self, event: Event) {
        let key = EventKey::from(&event);
        self.events.push(event, Reverse(key));
    }
    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop().map(|(event, _)| event)
    }
    pub fn len(&self) -> usize {
        self.events.len()
    }
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
    /// Removes and returns the earliest edge event no later than `limit`
    /// for which `is_current` holds.
    pub fn take_edge_event(&mut self, limit: f64, is_current: impl Fn(&Event) -> bool) -> Option<Event> {
        let event = self.events.iter()
            .filter(|(event, _)| matches!(event.event_type, EventType::Edge{..}))
            .filter(|(event, _)| event.time.0 <= limit && is_current(event))
            .min_by_key(|(_, Reverse(key))| *key)
            .map(|(event, _)| *event)?;
        self.events.remove(&event);
        Some(event)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn edge(time: f64, node: usize) -> Event {
        Event{ time: OrderedFloat(time), node, event_type: EventType::Edge{ next_ndx: node + 1 } }
    }
    fn split(time: f64, node: usize, edge: usize) -> Event {
        Event{
            time: OrderedFloat(time),
            node,
            event_type: EventType::Split{ edge, split_point: [OrderedFloat(0.0), OrderedFloat(0.0)] },
        }
    }

    #[test]
    fn events_pop_in_time_order(){
        let mut queue = EventQueue::default();
        queue.push(edge(3.0, 0));
        queue.push(split(1.0, 4, 2));
        queue.push(edge(2.0, 1));
        let times: Vec<f64> = std::iter::from_fn(|| queue.pop()).map(|e| e.time.0).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
        assert!(queue.is_empty());
    }
    #[test]
    fn edge_events_win_ties(){
        let mut queue = EventQueue::default();
        queue.push(split(1.0, 0, 3));
        queue.push(edge(1.0, 7));
        queue.push(edge(1.0, 2));
        assert_eq!(queue.pop(), Some(edge(1.0, 2)));
        assert_eq!(queue.pop(), Some(edge(1.0, 7)));
        assert_eq!(queue.pop(), Some(split(1.0, 0, 3)));
    }
    #[test]
    fn duplicate_events_are_stored_once(){
        let mut queue = EventQueue::default();
        queue.push(edge(1.0, 0));
        queue.push(edge(1.0, 0));
        assert_eq!(queue.len(), 1);
    }
    #[test]
    fn take_edge_event_respects_limit_and_filter(){
        let mut queue = EventQueue::default();
        queue.push(edge(1.0 + 1e-12, 5));
        queue.push(edge(1.0 + 2e-12, 3));
        queue.push(edge(2.0, 1));
        assert_eq!(queue.take_edge_event(1.0 + 1e-9, |e| e.node != 5), Some(edge(1.0 + 2e-12, 3)));
        assert_eq!(queue.take_edge_event(1.0 + 1e-9, |e| e.node != 5), None);
        assert_eq!(queue.len(), 2);
    }
}
