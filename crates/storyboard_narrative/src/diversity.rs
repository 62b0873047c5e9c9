//! Camera angle and scene archetype allocation.
//!
//! Both allocators are plain state objects owned by one run. Nothing here is
//! global; a new scenario gets new allocators.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use storyboard_core::{
    CAMERA_ANGLES, CameraPhase, DEFAULT_CAMERA_ANGLE, PRIORITY_ANGLES, Phase, SceneArchetype,
    SceneSeed, ToneSettings,
};
use strum::IntoEnumIterator;
use tracing::debug;

/// Tracks which camera angles a run has used.
///
/// Selection order: unused priority angles valid for the phase, then unused
/// phase angles, then any unused catalogue angle. When nothing is left the
/// used set is reset and the default angle is returned.
///
/// # Examples
///
/// ```
/// use storyboard_core::CameraPhase;
/// use storyboard_narrative::CameraAllocation;
///
/// let mut camera = CameraAllocation::default();
/// assert_eq!(camera.next_angle(CameraPhase::Introduction), "wide shot");
/// assert_eq!(camera.next_angle(CameraPhase::Introduction), "establishing shot");
/// assert_eq!(camera.last_used(), Some("establishing shot"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CameraAllocation {
    used: HashSet<String>,
    last_used: Option<String>,
}

impl CameraAllocation {
    /// Pick the next angle for `phase` and mark it used.
    pub fn next_angle(&mut self, phase: CameraPhase) -> String {
        let phase_angles = phase.angles();
        let candidate = PRIORITY_ANGLES
            .iter()
            .find(|angle| phase_angles.contains(*angle) && !self.used.contains(**angle))
            .or_else(|| phase_angles.iter().find(|angle| !self.used.contains(**angle)))
            .or_else(|| CAMERA_ANGLES.iter().find(|angle| !self.used.contains(**angle)))
            .copied();

        let angle = match candidate {
            Some(angle) => angle,
            None => {
                debug!(used = self.used.len(), "Camera catalogue exhausted, resetting");
                self.used.clear();
                DEFAULT_CAMERA_ANGLE
            }
        };

        self.used.insert(angle.to_string());
        self.last_used = Some(angle.to_string());
        debug!(%phase, angle, "Allocated camera angle");
        angle.to_string()
    }

    /// Whether `angle` has been handed out since the last reset.
    pub fn is_used(&self, angle: &str) -> bool {
        self.used.contains(angle)
    }

    /// Number of angles used since the last reset.
    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    /// Most recently allocated angle.
    pub fn last_used(&self) -> Option<&str> {
        self.last_used.as_deref()
    }
}

/// Scene-type and element bookkeeping for a run.
#[derive(Debug, Clone)]
pub struct SceneDiversity {
    used_types: HashSet<SceneArchetype>,
    used_elements: HashSet<String>,
    required_elements: Vec<String>,
    theme_keywords: Vec<String>,
    tone: ToneSettings,
    seeds: Vec<SceneSeed>,
    rng: StdRng,
}

impl SceneDiversity {
    /// Initialise from comma-separated theme keywords, required elements and tone.
    pub fn new(theme: &str, required_elements: Vec<String>, tone: ToneSettings) -> Self {
        Self::with_rng(theme, required_elements, tone, StdRng::from_entropy())
    }

    /// Like [`SceneDiversity::new`] with a fixed seed, for reproducible runs.
    pub fn seeded(
        theme: &str,
        required_elements: Vec<String>,
        tone: ToneSettings,
        seed: u64,
    ) -> Self {
        Self::with_rng(theme, required_elements, tone, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        theme: &str,
        required_elements: Vec<String>,
        tone: ToneSettings,
        rng: StdRng,
    ) -> Self {
        Self {
            used_types: HashSet::new(),
            used_elements: HashSet::new(),
            required_elements: required_elements
                .into_iter()
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect(),
            theme_keywords: split_keywords(theme),
            tone,
            seeds: Vec::new(),
            rng,
        }
    }

    /// Generate the scene seed for `frame`.
    ///
    /// Archetypes are drawn uniformly from those not yet used; once all have been
    /// used the set is cleared. Up to two unused required elements are attached
    /// and marked used.
    pub fn next_seed(&mut self, frame: u32, progress: f64, phase: Phase) -> SceneSeed {
        let mut available: Vec<SceneArchetype> = SceneArchetype::iter()
            .filter(|t| !self.used_types.contains(t))
            .collect();
        if available.is_empty() {
            debug!("All scene archetypes used, resetting");
            self.used_types.clear();
            available = SceneArchetype::iter().collect();
        }
        let archetype = available
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(SceneArchetype::Action);
        self.used_types.insert(archetype);
        let beat = archetype
            .beats()
            .choose(&mut self.rng)
            .copied()
            .unwrap_or("scene");

        let elements: Vec<String> = self
            .required_elements
            .iter()
            .filter(|e| !self.used_elements.contains(*e))
            .take(2)
            .cloned()
            .collect();
        self.used_elements.extend(elements.iter().cloned());

        let seed = SceneSeed::new(
            frame,
            phase,
            archetype,
            elements,
            intensity(progress),
            self.tone.mood.clone(),
            self.theme_keywords.first().cloned(),
        )
        .with_beat(beat);
        debug!(frame, %archetype, beat, intensity = seed.intensity(), "Generated scene seed");
        self.seeds.push(seed.clone());
        seed
    }

    /// Archetypes used since the last reset, in a stable order.
    pub fn used_types(&self) -> Vec<SceneArchetype> {
        let mut used: Vec<_> = self.used_types.iter().copied().collect();
        used.sort();
        used
    }

    /// Seeds generated so far.
    pub fn seeds(&self) -> &[SceneSeed] {
        &self.seeds
    }

    /// Tone settings for the story.
    pub fn tone(&self) -> &ToneSettings {
        &self.tone
    }

    /// Parsed theme keywords.
    pub fn theme_keywords(&self) -> &[String] {
        &self.theme_keywords
    }
}

/// Scene intensity over progress: `sin(progress * PI)`.
pub fn intensity(progress: f64) -> f64 {
    (progress * std::f64::consts::PI).sin().clamp(0.0, 1.0)
}

fn split_keywords(theme: &str) -> Vec<String> {
    theme
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angles_are_unique_until_catalogue_exhausted() {
        let mut camera = CameraAllocation::default();
        let phases = [
            CameraPhase::Introduction,
            CameraPhase::Action,
            CameraPhase::Drama,
            CameraPhase::Conclusion,
        ];
        let mut seen = HashSet::new();
        for i in 0..CAMERA_ANGLES.len() {
            let angle = camera.next_angle(phases[i % phases.len()]);
            assert!(seen.insert(angle.clone()), "{angle} returned twice");
        }
    }

    #[test]
    fn exhausted_catalogue_falls_back_to_default_and_resets() {
        let mut camera = CameraAllocation::default();
        for _ in 0..16 {
            camera.next_angle(CameraPhase::Introduction);
        }
        // catalogue plus "establishing shot" are all used now
        assert_eq!(camera.used_count(), 16);
        assert_eq!(camera.next_angle(CameraPhase::Drama), DEFAULT_CAMERA_ANGLE);
        assert_eq!(camera.used_count(), 1);
    }

    #[test]
    fn priority_angles_respect_phase() {
        let mut camera = CameraAllocation::default();
        assert_eq!(camera.next_angle(CameraPhase::Action), "tracking shot");
        assert_eq!(camera.next_angle(CameraPhase::Action), "dutch angle");
        assert_eq!(camera.next_angle(CameraPhase::Action), "POV shot");
        assert_eq!(camera.next_angle(CameraPhase::Drama), "close-up shot");
        assert_eq!(camera.next_angle(CameraPhase::Conclusion), "bird's eye view");
    }

    #[test]
    fn scene_types_do_not_repeat_within_a_cycle() {
        let mut diversity = SceneDiversity::seeded("", vec![], ToneSettings::default(), 7);
        let mut seen = HashSet::new();
        for frame in 1..=4 {
            let seed = diversity.next_seed(frame, frame as f64 / 8.0, Phase::Setup);
            assert!(seen.insert(*seed.archetype()));
            let beat = seed.beat().as_deref().unwrap();
            assert!(seed.archetype().beats().contains(&beat));
        }
        assert_eq!(diversity.used_types().len(), 4);
        diversity.next_seed(5, 0.625, Phase::Confrontation);
        assert_eq!(diversity.used_types().len(), 1);
    }

    #[test]
    fn required_elements_are_handed_out_two_at_a_time() {
        let elements = vec!["a key".into(), "a storm".into(), "a lantern".into()];
        let mut diversity = SceneDiversity::seeded("loss, hope", elements, ToneSettings::default(), 1);
        let first = diversity.next_seed(1, 0.25, Phase::Setup);
        assert_eq!(first.elements(), &vec!["a key".to_string(), "a storm".to_string()]);
        assert_eq!(first.theme().as_deref(), Some("loss"));
        let second = diversity.next_seed(2, 0.5, Phase::Confrontation);
        assert_eq!(second.elements(), &vec!["a lantern".to_string()]);
        let third = diversity.next_seed(3, 0.75, Phase::Confrontation);
        assert!(third.elements().is_empty());
    }

    #[test]
    fn intensity_peaks_mid_story() {
        assert!(intensity(0.0) < 1e-9);
        assert!((intensity(0.5) - 1.0).abs() < 1e-9);
        assert!(intensity(1.0) < 1e-9);
        assert!(intensity(0.25) < intensity(0.5));
    }
}
