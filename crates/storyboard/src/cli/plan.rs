//! Dry-run planning of a storyboard.

use super::OutputFormat;
use storyboard::{FramePlan, StoryRunState, StoryboardConfig, StoryboardResult, plan_frame};

/// Plan every frame of a run without calling any collaborator.
pub fn plan_frames(
    config: &StoryboardConfig,
    scenario: &str,
    frames: u32,
) -> StoryboardResult<Vec<FramePlan>> {
    let mut state = StoryRunState::new(scenario, frames, &config.story)?;
    let plans = (1..=frames)
        .map(|frame| plan_frame(&mut state, frame))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(plans)
}

/// Print the phase, tension, camera angle and scene of every frame.
pub fn plan_storyboard(
    config: &StoryboardConfig,
    scenario: &str,
    frames: u32,
    format: OutputFormat,
) -> StoryboardResult<()> {
    let plans = plan_frames(config, scenario, frames)?;
    tracing::info!(frames, "Storyboard planned");

    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = plans.iter().map(plan_json).collect();
            println!("{}", serde_json::to_string_pretty(&rows).unwrap_or_default());
        }
        OutputFormat::Human => {
            println!("Storyboard plan ({} frames)", frames);
            println!("Scenario: {}", scenario);
            println!();
            for plan in &plans {
                let context = plan.context();
                println!(
                    "Frame {:>2}  {:<13} tension {:.2}  {:<22} {}{}",
                    plan.frame(),
                    context.phase().to_string(),
                    context.tension(),
                    plan.camera_angle(),
                    plan.seed().archetype(),
                    plan.seed()
                        .beat()
                        .as_deref()
                        .map(|beat| format!(" ({})", beat))
                        .unwrap_or_default(),
                );
            }
        }
    }
    Ok(())
}

fn plan_json(plan: &FramePlan) -> serde_json::Value {
    serde_json::json!({
        "frame": plan.frame(),
        "phase": plan.context().phase(),
        "progress": plan.context().progress(),
        "tension": plan.context().tension(),
        "camera": plan.camera_angle(),
        "scene": plan.seed().archetype().to_string(),
        "beat": plan.seed().beat(),
        "elements": plan.seed().elements(),
        "intensity": plan.seed().intensity(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plans_every_frame_without_services() {
        let config = StoryboardConfig::bundled().unwrap();
        let plans = plan_frames(&config, "A kite festival on a windy cliff", 5).unwrap();
        let frames: Vec<u32> = plans.iter().map(FramePlan::frame).collect();
        assert_eq!(frames, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            plans.last().unwrap().context().phase().to_string(),
            "resolution"
        );
    }

    #[test]
    fn zero_frames_is_rejected() {
        let config = StoryboardConfig::bundled().unwrap();
        assert!(plan_frames(&config, "A kite festival", 0).is_err());
    }
}
