use std::collections::VecDeque;

use crate::shared::{FloorRequest, OriginHandle};

/// FIFO backlog of floor requests waiting for an idle lift.
#[derive(Debug, Default, Clone)]
pub struct RequestQueue {
    requests: VecDeque<FloorRequest>,
}

impl RequestQueue {
    pub fn new() -> RequestQueue {
        RequestQueue {
            requests: VecDeque::new(),
        }
    }

    pub fn push(&mut self, request: FloorRequest) {
        self.requests.push_back(request);
    }

    pub fn push_front(&mut self, request: FloorRequest) {
        self.requests.push_front(request);
    }

    pub fn pop_front(&mut self) -> Option<FloorRequest> {
        self.requests.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }

    pub fn contains_origin(&self, origin: OriginHandle) -> bool {
        self.requests.iter().any(|r| r.origin == origin)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FloorRequest> {
        self.requests.iter()
    }
}
