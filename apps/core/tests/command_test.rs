use newtab_core::command::{resolve_command, TargetKind};
use newtab_core::dashboard::DashboardConfig;

fn dashboard_with_defaults() -> DashboardConfig {
    let mut cfg = DashboardConfig::builtin().unwrap();
    cfg.command_dsl.defaults.default_repo = "acme/widgets".to_string();
    cfg.command_dsl.defaults.tracker_url = "https://tracker.example.com/browse/{id}".to_string();
    cfg.command_dsl.defaults.default_tracker_prefix = "OPS".to_string();
    cfg
}

fn urls(text: &str, cfg: &DashboardConfig) -> Vec<String> {
    resolve_command(text, cfg)
        .targets
        .into_iter()
        .filter_map(|target| match target.kind {
            TargetKind::Url { url } => Some(url),
            TargetKind::Action(_) => None,
        })
        .collect()
}

#[test]
fn pr_shorthand_matches_full_template() {
    let cfg = dashboard_with_defaults();
    assert_eq!(urls("pr 9", &cfg), urls("gh acme/widgets pr 9", &cfg));
    assert_eq!(urls("pr 9", &cfg), vec!["https://github.com/acme/widgets/pull/9"]);
}

#[test]
fn macro_fans_out_to_each_expansion() {
    let cfg = dashboard_with_defaults();
    let resolution = resolve_command("pkg left-pad", &cfg);
    assert_eq!(resolution.targets.len(), 3);
    assert_eq!(
        urls("pkg left-pad", &cfg),
        vec![
            "https://www.npmjs.com/package/left-pad",
            "https://unpkg.com/browse/left-pad/",
            "https://bundlephobia.com/package/left-pad",
        ]
    );
}

#[test]
fn pipes_concatenate_segments_in_order() {
    let cfg = dashboard_with_defaults();
    let got = urls("so \"borrow checker\" | mdn array methods", &cfg);
    assert_eq!(
        got,
        vec![
            "https://stackoverflow.com/search?q=borrow%20checker",
            "https://developer.mozilla.org/en-US/search?q=array%20methods",
        ]
    );
}

#[test]
fn tracker_ids_are_detected_and_upper_cased() {
    let cfg = dashboard_with_defaults();
    let resolution = resolve_command("look at ops-1234", &cfg);
    assert_eq!(resolution.targets.len(), 1);
    assert_eq!(resolution.targets[0].label, "OPS-1234");
    assert_eq!(
        resolution.targets[0].href(),
        Some("https://tracker.example.com/browse/OPS-1234")
    );
}

#[test]
fn go_segments_use_alias_resolution() {
    let cfg = dashboard_with_defaults();
    assert_eq!(urls("go pam", &cfg), vec!["https://go/pam"]);
    assert_eq!(urls("go missing", &cfg), vec!["https://go/"]);
    assert!(resolve_command("go", &cfg).is_empty());
}

#[test]
fn resolution_is_deterministic() {
    let cfg = dashboard_with_defaults();
    for text in ["pkg serde", "gh octo/cat i 3", "time 25", "wiki rust lang", "nothing here"] {
        assert_eq!(resolve_command(text, &cfg), resolve_command(text, &cfg));
    }
}

#[test]
fn unknown_text_yields_no_targets() {
    let cfg = DashboardConfig::default();
    let resolution = resolve_command("  hello there ", &cfg);
    assert!(resolution.is_empty());
    assert_eq!(resolution.label, "hello there");
}
