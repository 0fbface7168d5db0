#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub id: u64,
    pub arrival_time: f64,
    pub processing_time: f64,
    pub network_latency: Option<f64>,
}

impl Request {
    pub fn new(id: u64, arrival_time: f64, processing_time: f64) -> Self {
        Self {
            id,
            arrival_time,
            processing_time,
            network_latency: None,
        }
    }
}

/// Which side of a processing/timeout race an event belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RaceSide {
    Completion,
    Timeout,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Arrival,
    RaceFinished {
        server_id: usize,
        request_id: u64,
        attempt: u64,
        side: RaceSide,
    },
    SampleMetrics,
}
