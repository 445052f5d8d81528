use newtab_core::dashboard::DashboardConfig;

#[test]
fn loads_format_from_extension() {
    let dir = tempfile::tempdir().unwrap();

    let json = dir.path().join("dash.json");
    std::fs::write(
        &json,
        r#"{"go":{"keyToUrl":{"docs":"https://go/docs"}},"analytics":{"enableLocal":true}}"#,
    )
    .unwrap();
    let cfg = DashboardConfig::load_file(&json).unwrap();
    assert!(cfg.analytics_enabled());
    assert_eq!(cfg.go.key_to_url.get("docs").map(String::as_str), Some("https://go/docs"));
    assert_eq!(cfg.go.homepage_url, "https://go/");

    let toml = dir.path().join("dash.toml");
    std::fs::write(
        &toml,
        "[commandDsl.templates]\n\"b {q}\" = \"https://b/{q}\"\n\"a {q}\" = \"https://a/{q}\"\n",
    )
    .unwrap();
    let cfg = DashboardConfig::load_file(&toml).unwrap();
    let patterns: Vec<&str> = cfg.command_dsl.templates.iter().map(|(k, _)| k).collect();
    assert_eq!(patterns, vec!["b {q}", "a {q}"]);
}

#[test]
fn missing_file_falls_back_to_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = DashboardConfig::load_or_builtin(&dir.path().join("none.json5")).unwrap();
    assert_eq!(cfg, DashboardConfig::builtin().unwrap());
}

#[test]
fn unreadable_dashboard_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{").unwrap();
    assert!(DashboardConfig::load_file(&path).is_err());
}
