//! Cross-frame consistency tracking.

use storyboard_core::{FrameResult, LocationChange};
use tracing::{debug, info};

/// Canonical characters and location for a run, plus what has happened so far.
///
/// The baseline is captured once, from the first frame that establishes it, and
/// is never overwritten. Every later frame has its `characters` replaced with the
/// baseline so descriptions cannot drift.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsistencyMemory {
    base_characters: Option<String>,
    base_location: Option<String>,
    current_location: Option<String>,
    previous_actions: Vec<String>,
    location_changes: Vec<LocationChange>,
}

impl ConsistencyMemory {
    /// Empty memory for a new scenario.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile `result` for `frame` with the memory, mutating both.
    ///
    /// - Frame 1 (with no baseline yet) establishes the baseline characters and location.
    /// - Any frame with a baseline present gets the baseline characters.
    /// - A location different from the current one is recorded as a change.
    /// - The frame's action joins the previous actions (duplicates collapse).
    ///
    /// # Examples
    ///
    /// ```
    /// use storyboard_core::FrameResult;
    /// use storyboard_narrative::ConsistencyMemory;
    ///
    /// let mut memory = ConsistencyMemory::new();
    /// let mut first = FrameResult::builder()
    ///     .characters("Mira, red coat")
    ///     .location("harbor")
    ///     .build()
    ///     .unwrap();
    /// memory.record_frame(1, &mut first);
    ///
    /// let mut second = FrameResult::builder()
    ///     .characters("Mira, blue coat")
    ///     .location("lighthouse")
    ///     .build()
    ///     .unwrap();
    /// memory.record_frame(2, &mut second);
    ///
    /// assert_eq!(second.characters, "Mira, red coat");
    /// assert_eq!(memory.location_changes().len(), 1);
    /// ```
    pub fn record_frame(&mut self, frame: u32, result: &mut FrameResult) {
        match &self.base_characters {
            Some(base) => {
                if result.characters != *base {
                    debug!(frame, "Restoring baseline characters");
                }
                result.characters = base.clone();
            }
            None if frame == 1 => {
                info!(frame, location = %result.location, "Captured consistency baseline");
                self.base_characters = Some(result.characters.clone());
                self.base_location = Some(result.location.clone());
                self.current_location = Some(result.location.clone());
            }
            None => {}
        }

        match &self.current_location {
            Some(current) if *current != result.location => {
                info!(frame, from = %current, to = %result.location, "Location changed");
                self.location_changes.push(LocationChange {
                    frame,
                    from: current.clone(),
                    to: result.location.clone(),
                });
                self.current_location = Some(result.location.clone());
            }
            Some(_) => {}
            None => self.current_location = Some(result.location.clone()),
        }

        if !self.previous_actions.contains(&result.action) {
            self.previous_actions.push(result.action.clone());
        }
    }

    /// Baseline characters, once frame 1 has been recorded.
    pub fn base_characters(&self) -> Option<&str> {
        self.base_characters.as_deref()
    }

    /// Baseline location, once frame 1 has been recorded.
    pub fn base_location(&self) -> Option<&str> {
        self.base_location.as_deref()
    }

    /// Most recent location.
    pub fn current_location(&self) -> Option<&str> {
        self.current_location.as_deref()
    }

    /// Distinct actions so far, in first-seen order.
    pub fn previous_actions(&self) -> &[String] {
        &self.previous_actions
    }

    /// Location transitions so far.
    pub fn location_changes(&self) -> &[LocationChange] {
        &self.location_changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(characters: &str, location: &str, action: &str) -> FrameResult {
        FrameResult::builder()
            .characters(characters)
            .location(location)
            .action(action)
            .build()
            .unwrap()
    }

    #[test]
    fn baseline_is_immutable() {
        let mut memory = ConsistencyMemory::new();
        let mut first = frame("Ada, engineer", "workshop", "builds");
        memory.record_frame(1, &mut first);

        for n in 2..=5 {
            let mut next = frame(&format!("someone else {n}"), "workshop", "works");
            memory.record_frame(n, &mut next);
            assert_eq!(next.characters, "Ada, engineer");
        }
        assert_eq!(memory.base_characters(), Some("Ada, engineer"));
        assert_eq!(memory.base_location(), Some("workshop"));
    }

    #[test]
    fn location_changes_are_recorded_once_per_transition() {
        let mut memory = ConsistencyMemory::new();
        memory.record_frame(1, &mut frame("c", "harbor", "a"));
        memory.record_frame(2, &mut frame("c", "harbor", "b"));
        memory.record_frame(3, &mut frame("c", "tower", "c"));
        memory.record_frame(4, &mut frame("c", "tower", "d"));
        memory.record_frame(5, &mut frame("c", "harbor", "e"));

        assert_eq!(
            memory.location_changes(),
            &[
                LocationChange {
                    frame: 3,
                    from: "harbor".into(),
                    to: "tower".into()
                },
                LocationChange {
                    frame: 5,
                    from: "tower".into(),
                    to: "harbor".into()
                },
            ]
        );
        assert_eq!(memory.current_location(), Some("harbor"));
        assert_eq!(memory.base_location(), Some("harbor"));
    }

    #[test]
    fn previous_actions_collapse_duplicates() {
        let mut memory = ConsistencyMemory::new();
        memory.record_frame(1, &mut frame("c", "l", "runs"));
        memory.record_frame(2, &mut frame("c", "l", "hides"));
        memory.record_frame(3, &mut frame("c", "l", "runs"));
        assert_eq!(memory.previous_actions(), &["runs".to_string(), "hides".to_string()]);
    }

    #[test]
    fn regenerated_first_frame_keeps_existing_baseline() {
        let mut memory = ConsistencyMemory::new();
        memory.record_frame(1, &mut frame("original cast", "l", "a"));
        let mut again = frame("new cast", "l", "b");
        memory.record_frame(1, &mut again);
        assert_eq!(again.characters, "original cast");
        assert_eq!(memory.base_characters(), Some("original cast"));
    }
}
