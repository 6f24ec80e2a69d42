use chrono::{DateTime, Utc};

use super::filter::FilterStrategy;
use super::types::{AntennaPosition, Position, PositionTime, TimeWindow};

/// A satellite sample that passed the filter, with the antenna direction it
/// was judged against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InViewSample {
    pub position: PositionTime,
    pub antenna_direction: Position,
}

/// One maximal in-view stretch.
///
/// `window` runs from the first in-view sample to the first sample that left
/// view, or to the cutoff if none did. `samples` holds the in-view samples.
#[derive(Debug, Clone, PartialEq)]
pub struct InViewRun {
    pub window: TimeWindow,
    pub samples: Vec<InViewSample>,
}

impl InViewRun {
    pub fn positions(&self) -> Vec<PositionTime> {
        self.samples.iter().map(|s| s.position).collect()
    }
}

struct OpenRun {
    entered: DateTime<Utc>,
    samples: Vec<InViewSample>,
}

impl OpenRun {
    fn close(self, exited: DateTime<Utc>) -> Option<InViewRun> {
        // Duplicate timestamps can make enter and exit coincide
        if exited <= self.entered {
            return None;
        }
        Some(InViewRun {
            window: TimeWindow::new(self.entered, exited).ok()?,
            samples: self.samples,
        })
    }
}

/// Turns one satellite's antenna pairings into in-view runs.
pub struct WindowBuilder<'a> {
    filter: &'a dyn FilterStrategy,
    cutoff: DateTime<Utc>,
}

impl<'a> WindowBuilder<'a> {
    pub fn new(filter: &'a dyn FilterStrategy, cutoff: DateTime<Utc>) -> Self {
        Self { filter, cutoff }
    }

    pub fn build(&self, mut pairings: Vec<AntennaPosition>) -> Vec<InViewRun> {
        pairings.sort_by_key(|p| p.antenna_direction.time);

        let mut runs = Vec::new();
        // Carried across pairings so a pass spanning a re-point stays one window
        let mut open: Option<OpenRun> = None;

        'pairings: for mut pairing in pairings {
            pairing.satellite_positions.sort_by_key(|p| p.time);
            let antenna = pairing.antenna_direction.position;

            for sample in pairing.satellite_positions {
                if sample.time >= self.cutoff {
                    break 'pairings;
                }
                let in_view = self.filter.is_in_view(&sample.position, &antenna);

                open = match (open.take(), in_view) {
                    (None, true) => Some(OpenRun {
                        entered: sample.time,
                        samples: Vec::new(),
                    }),
                    (Some(run), true) => Some(run),
                    (Some(run), false) => {
                        runs.extend(run.close(sample.time));
                        None
                    }
                    (None, false) => None,
                };

                if let Some(run) = open.as_mut() {
                    run.samples.push(InViewSample {
                        position: sample,
                        antenna_direction: antenna,
                    });
                }
            }
        }

        if let Some(run) = open {
            runs.extend(run.close(self.cutoff));
        }
        runs
    }

    pub fn time_windows(&self, pairings: Vec<AntennaPosition>) -> Vec<TimeWindow> {
        self.build(pairings).into_iter().map(|r| r.window).collect()
    }
}
