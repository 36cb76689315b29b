use super::*;

#[test]
fn test_default_editor_config() {
    let config = EditorConfig::default();
    assert_eq!(config.tab_width, 4);
    assert_eq!(config.line_numbers, LineNumberMode::Abs);
    assert_eq!(config.git_branch_symbol, "git:");
    assert_eq!(config.idle_boundary_ms, 1000);
    assert!(config.auto_indent);
}

#[test]
fn test_editor_config_deserializes_kebab_case() {
    let config: EditorConfig =
        toml::from_str("tab-width = 8\nline-numbers = \"rel\"\n").unwrap();
    assert_eq!(config.tab_width, 8);
    assert_eq!(config.line_numbers, LineNumberMode::Rel);
    assert_eq!(config.git_branch_symbol, "git:");
}

#[test]
fn test_line_number_mode_parse() {
    assert_eq!(LineNumberMode::parse("abs"), Some(LineNumberMode::Abs));
    assert_eq!(LineNumberMode::parse(" REL "), Some(LineNumberMode::Rel));
    assert_eq!(LineNumberMode::parse("off"), Some(LineNumberMode::Off));
    assert_eq!(LineNumberMode::parse("sideways"), None);
}

#[test]
fn test_rgb_parse() {
    assert_eq!(Rgb::parse("#ff8000"), Some(Rgb(255, 128, 0)));
    assert_eq!(Rgb::parse("#FF8000").map(|c| c.to_string()), Some("#ff8000".into()));
    assert_eq!(Rgb::parse("ff8000"), None);
    assert_eq!(Rgb::parse("#ff80"), None);
    assert_eq!(Rgb::parse("#gg8000"), None);
}

#[test]
fn test_theme_overrides_skip_invalid_entries() {
    let mut raw = BTreeMap::new();
    raw.insert("foreground".to_string(), "#010203".to_string());
    raw.insert("syntax-keyword".to_string(), "purple".to_string());

    let (theme, invalid) = ThemeConfig::default().with_overrides(&raw);
    assert_eq!(theme.get("foreground"), Some(Rgb(1, 2, 3)));
    assert_eq!(theme.get("syntax-keyword"), Rgb::parse("#c586c0"));
    assert_eq!(invalid, vec!["syntax-keyword".to_string()]);
}
