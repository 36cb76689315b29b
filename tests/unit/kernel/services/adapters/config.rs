use super::*;
use crate::kernel::services::ports::{LineNumberMode, Rgb};
use tempfile::tempdir;

fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    }
}

#[test]
fn test_config_dir_prefers_app_override() {
    let dirs = ConfigDirs::resolve(
        env_of(&[("MEDIT_CONFIG_HOME", "/cfg"), ("XDG_CONFIG_HOME", "/xdg")]),
        Some(PathBuf::from("/home/u")),
    );
    assert_eq!(dirs.config, PathBuf::from("/cfg"));
    assert_eq!(dirs.state, PathBuf::from("/home/u/.local/state/medit"));
}

#[test]
fn test_config_dir_falls_back_to_xdg_then_home() {
    let dirs = ConfigDirs::resolve(
        env_of(&[("XDG_CONFIG_HOME", "/xdg"), ("XDG_STATE_HOME", "/state")]),
        Some(PathBuf::from("/home/u")),
    );
    assert_eq!(dirs.config, PathBuf::from("/xdg/medit"));
    assert_eq!(dirs.state, PathBuf::from("/state/medit"));
    assert_eq!(dirs.log_dir(), PathBuf::from("/state/medit/logs"));

    let dirs = ConfigDirs::resolve(env_of(&[("XDG_CONFIG_HOME", "  ")]), Some("/home/u".into()));
    assert_eq!(dirs.config, PathBuf::from("/home/u/.config/medit"));
}

#[test]
fn test_parse_config_reads_all_sections() {
    let text = r##"
[editor]
tab-width = 2
line-numbers = "off"
git-branch-symbol = "@"

[theme]
foreground = "#112233"
background = "dark"

[keymap.normal]
"ctrl+s" = "save"
"##;
    let (config, warnings) = parse_config(text).unwrap();
    assert_eq!(config.editor.tab_width, 2);
    assert_eq!(config.editor.line_numbers, LineNumberMode::Off);
    assert_eq!(config.editor.git_branch_symbol, "@");
    assert_eq!(config.theme.get("foreground"), Some(Rgb(0x11, 0x22, 0x33)));
    assert_eq!(config.keymap.normal.get("ctrl+s").map(String::as_str), Some("save"));
    assert_eq!(warnings, vec!["theme.background: expected #RRGGBB".to_string()]);
}

#[test]
fn test_parse_config_rejects_bad_toml() {
    assert!(parse_config("[editor\ntab-width = 2").is_err());
}

#[test]
fn test_missing_files_yield_defaults() {
    let dir = tempdir().unwrap();
    let (config, warnings) = load_config(dir.path()).unwrap();
    assert_eq!(config.editor, EditorConfig::default());
    assert!(warnings.is_empty());
    assert!(load_languages(dir.path()).unwrap().by_name("go").is_some());
}

#[test]
fn test_load_all_collects_errors_and_falls_back() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE), "editor = 3").unwrap();
    std::fs::write(
        dir.path().join(LANGUAGES_FILE),
        "[[language]]\nname = \"go\"\nfile-types = [\"go\"]\nlanguage-servers = [\"stub\"]\n\n[language-server.stub]\ncommand = \"stub-ls\"\n",
    )
    .unwrap();

    let loaded = load_all(dir.path());
    assert_eq!(loaded.errors.len(), 1);
    assert!(loaded.errors[0].contains(CONFIG_FILE));
    assert_eq!(loaded.app.editor, EditorConfig::default());

    let go = loaded.languages.by_name("go").unwrap();
    assert_eq!(go.language_servers, vec!["stub".to_string()]);
    assert_eq!(loaded.languages.server("stub").unwrap().command, "stub-ls");
    assert!(loaded.languages.by_name("rust").is_some());
}

#[test]
fn test_load_all_layers_keymaps() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE),
        "[keymap.normal]\n\"ctrl+g\" = \"format\"\n\"ctrl+y\" = \"no_such_action\"\n",
    )
    .unwrap();

    let loaded = load_all(dir.path());
    assert!(loaded.errors.is_empty());
    assert_eq!(loaded.normal_keymap.get("ctrl+g"), Some("format"));
    assert_eq!(loaded.normal_keymap.get("ctrl+y"), None);
    assert_eq!(loaded.normal_keymap.get("h"), Some("move_left"));
}
