//! Scroll tracking over folio dividers.
//!
//! The transcription page marks each folio boundary with a divider. A divider
//! counts as "in view" while it overlaps the reading band: the viewport with
//! 20% trimmed from the top and 60% from the bottom. The observer reports
//! transitions only, so a divider that stays in the band is reported once.

/// Fraction of the viewport excluded above the reading band.
pub const TOP_MARGIN: f64 = 0.20;
/// Fraction of the viewport excluded below the reading band.
pub const BOTTOM_MARGIN: f64 = 0.60;

/// A folio boundary marker, positioned in document coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct FolioDivider {
    pub folio: String,
    pub top: f64,
    pub height: f64,
}

impl FolioDivider {
    pub fn new(folio: impl Into<String>, top: f64, height: f64) -> Self {
        Self {
            folio: folio.into(),
            top,
            height,
        }
    }
}

/// Intersection change of one divider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolioEvent {
    Entered(String),
    Left(String),
}

#[derive(Debug, Clone)]
struct Observed {
    divider: FolioDivider,
    intersecting: bool,
}

/// Tracks which folio dividers overlap the reading band.
#[derive(Debug, Clone, Default)]
pub struct ScrollObserver {
    observed: Vec<Observed>,
    disconnected: bool,
}

impl ScrollObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a divider. Ignored after [`disconnect`](Self::disconnect).
    pub fn observe(&mut self, divider: FolioDivider) {
        if self.disconnected {
            return;
        }
        self.observed.push(Observed {
            divider,
            intersecting: false,
        });
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    pub fn is_connected(&self) -> bool {
        !self.disconnected
    }

    /// Stop tracking everything; later updates report nothing.
    pub fn disconnect(&mut self) {
        self.observed.clear();
        self.disconnected = true;
    }

    /// Folios currently in the reading band, in observation order.
    pub fn visible(&self) -> impl Iterator<Item = &str> {
        self.observed
            .iter()
            .filter(|o| o.intersecting)
            .map(|o| o.divider.folio.as_str())
    }

    /// Recompute intersections for a scroll position and return the changes.
    pub fn update(&mut self, scroll_top: f64, viewport_height: f64) -> Vec<FolioEvent> {
        let (band_top, band_bottom) = reading_band(scroll_top, viewport_height);
        let mut events = Vec::new();

        for observed in &mut self.observed {
            let d = &observed.divider;
            let now = d.top <= band_bottom && d.top + d.height >= band_top;

            if now != observed.intersecting {
                observed.intersecting = now;
                events.push(if now {
                    FolioEvent::Entered(d.folio.clone())
                } else {
                    FolioEvent::Left(d.folio.clone())
                });
            }
        }

        events
    }
}

/// Document-space bounds of the reading band.
pub fn reading_band(scroll_top: f64, viewport_height: f64) -> (f64, f64) {
    (
        scroll_top + viewport_height * TOP_MARGIN,
        scroll_top + viewport_height * (1.0 - BOTTOM_MARGIN),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observer() -> ScrollObserver {
        let mut obs = ScrollObserver::new();
        obs.observe(FolioDivider::new("1r", 0.0, 10.0));
        obs.observe(FolioDivider::new("1v", 1000.0, 10.0));
        obs.observe(FolioDivider::new("2r", 2000.0, 10.0));
        obs
    }

    #[test]
    fn band_is_twenty_to_forty_percent() {
        let (top, bottom) = reading_band(100.0, 1000.0);
        assert!((top - 300.0).abs() < 1e-9);
        assert!((bottom - 500.0).abs() < 1e-9);
    }

    #[test]
    fn reports_enter_and_leave_once() {
        let mut obs = observer();

        // Band 800..1200 covers 1v.
        assert_eq!(obs.update(600.0, 1000.0), [FolioEvent::Entered("1v".into())]);
        // Still covered: no repeat.
        assert!(obs.update(650.0, 1000.0).is_empty());
        // Band 1800..2200 covers 2r only.
        assert_eq!(
            obs.update(1600.0, 1000.0),
            [FolioEvent::Left("1v".into()), FolioEvent::Entered("2r".into())]
        );
        assert_eq!(obs.visible().collect::<Vec<_>>(), ["2r"]);
    }

    #[test]
    fn divider_outside_band_is_not_reported() {
        let mut obs = observer();
        // Band 200..400 sits between dividers.
        assert!(obs.update(0.0, 1000.0).is_empty());
    }

    #[test]
    fn disconnect_stops_reporting() {
        let mut obs = observer();
        obs.disconnect();
        assert!(!obs.is_connected());
        assert!(obs.update(600.0, 1000.0).is_empty());

        obs.observe(FolioDivider::new("3r", 800.0, 10.0));
        assert_eq!(obs.observed_count(), 0);
    }
}
