//! View model for the dashboard progress tracker

use super::progress::{MilestoneId, ProgressSnapshot};
use serde::Serialize;

/// Circumference of the r=42 progress ring, rounded
const RING_CIRCUMFERENCE: f64 = 264.0;

const READY_HEADLINE: &str = "You're ready to invest.";
const COMPLETION_BANNER: &str = "All steps complete. You're ready to explore opportunities.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeState {
    Done,
    Active,
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneBadge {
    pub id: MilestoneId,
    pub label: String,
    pub icon: String,
    pub state: BadgeState,
    /// Dashboard section a click on the badge scrolls to
    pub section: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub headline: String,
    pub percent: u8,
    /// SVG `stroke-dasharray` for the progress ring
    pub ring_dash: String,
    pub badges: Vec<MilestoneBadge>,
    pub next_action: Option<String>,
    pub completion_banner: Option<String>,
}

/// Dashboard anchor for a milestone
pub fn section_for(id: MilestoneId) -> &'static str {
    match id {
        MilestoneId::Application => "overview",
        MilestoneId::Documentation | MilestoneId::Review => "documents",
        MilestoneId::Agreement | MilestoneId::Ready => "agreement",
    }
}

impl From<&ProgressSnapshot> for ProgressView {
    fn from(snapshot: &ProgressSnapshot) -> Self {
        let complete = snapshot.is_complete();
        let dash = snapshot.percent as f64 * RING_CIRCUMFERENCE / 100.0;

        let badges = snapshot
            .milestones
            .iter()
            .map(|m| MilestoneBadge {
                id: m.id,
                label: m.label.clone(),
                icon: m.icon.clone(),
                state: if m.done {
                    BadgeState::Done
                } else if m.in_progress {
                    BadgeState::Active
                } else {
                    BadgeState::Idle
                },
                section: section_for(m.id),
            })
            .collect();

        Self {
            headline: if complete {
                READY_HEADLINE.to_string()
            } else {
                snapshot.current_step.clone()
            },
            percent: snapshot.percent,
            ring_dash: format!("{} {}", format_dash(dash), RING_CIRCUMFERENCE),
            badges,
            next_action: (!complete).then(|| snapshot.next_action.clone()),
            completion_banner: complete.then(|| COMPLETION_BANNER.to_string()),
        }
    }
}

fn format_dash(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as u32)
    } else {
        format!("{}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::progress::{compute, ProgressInputs};

    #[test]
    fn test_in_progress_view() {
        let snapshot = compute(ProgressInputs {
            docs_done: 4,
            docs_submitted: true,
            agreement_complete: false,
        });
        let view = ProgressView::from(&snapshot);

        assert_eq!(view.headline, "Sign agreement");
        assert_eq!(view.ring_dash, "158.4 264");
        assert_eq!(
            view.next_action.as_deref(),
            Some("Complete investor agreement & bank details")
        );
        assert!(view.completion_banner.is_none());

        let states: Vec<BadgeState> = view.badges.iter().map(|b| b.state).collect();
        assert_eq!(
            states,
            vec![
                BadgeState::Done,
                BadgeState::Done,
                BadgeState::Done,
                BadgeState::Active,
                BadgeState::Idle,
            ]
        );
    }

    #[test]
    fn test_complete_view() {
        let snapshot = compute(ProgressInputs {
            docs_done: 4,
            docs_submitted: true,
            agreement_complete: true,
        });
        let view = ProgressView::from(&snapshot);

        assert_eq!(view.headline, READY_HEADLINE);
        assert_eq!(view.ring_dash, "264 264");
        assert!(view.next_action.is_none());
        assert_eq!(view.completion_banner.as_deref(), Some(COMPLETION_BANNER));
    }

    #[test]
    fn test_sections() {
        assert_eq!(section_for(MilestoneId::Application), "overview");
        assert_eq!(section_for(MilestoneId::Review), "documents");
        assert_eq!(section_for(MilestoneId::Ready), "agreement");
    }
}
