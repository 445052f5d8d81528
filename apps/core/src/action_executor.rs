use serde::{Deserialize, Serialize};

use crate::command::{LocalAction, Target, TargetKind};
use crate::model::IndexItem;

/// Something the host page must do after a confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OpenAction {
    OpenUrl { url: String },
    StartTimer { minutes: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LaunchError {
    #[error("nothing to open")]
    NoTargets,
    #[error("empty url for '{0}'")]
    EmptyUrl(String),
}

/// Turns resolved targets into open actions. Without `open_all` only the
/// first target is used.
pub fn plan_targets(targets: &[Target], open_all: bool) -> Result<Vec<OpenAction>, LaunchError> {
    if targets.is_empty() {
        return Err(LaunchError::NoTargets);
    }

    let chosen = if open_all { targets } else { &targets[..1] };
    chosen.iter().map(plan_target).collect()
}

/// Open actions for a launcher row. Command rows run their targets; every
/// other row opens its URL.
pub fn plan_item(item: &IndexItem, open_all: bool) -> Result<Vec<OpenAction>, LaunchError> {
    if let Some(resolution) = &item.command {
        return plan_targets(&resolution.targets, open_all);
    }
    Ok(vec![open_url(&item.label, &item.url)?])
}

fn plan_target(target: &Target) -> Result<OpenAction, LaunchError> {
    match &target.kind {
        TargetKind::Url { url } => open_url(&target.label, url),
        TargetKind::Action(LocalAction::Timer { minutes }) => Ok(OpenAction::StartTimer {
            minutes: (*minutes).max(1),
        }),
    }
}

fn open_url(label: &str, url: &str) -> Result<OpenAction, LaunchError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(LaunchError::EmptyUrl(label.to_string()));
    }
    Ok(OpenAction::OpenUrl {
        url: trimmed.to_string(),
    })
}
