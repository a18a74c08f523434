use parlor_agent::config::Config;
use parlor_agent::load_config;
use std::io::Write;

#[test]
fn defaults_without_file() {
    let config = load_config(None).expect("defaults");
    assert_eq!(config.room.name, "parlor-session");
    assert_eq!(config.prompts.instructions_dir, "docs/instructions");
    assert_eq!(config.prompts.knowledge_dir, "docs/knowledge");
    assert_eq!(config.logging.level, "info");
    assert!(!config.logging.json);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let config = load_config(Some("/nonexistent/parlor.toml")).expect("defaults");
    assert_eq!(config.room.name, "parlor-session");
}

#[test]
fn full_config_parses() {
    let toml_str = r#"
        [room]
        name = "demo-room"
        greeting = "Say hello in Hebrew."

        [providers.stt]
        provider = "deepgram"
        model = "nova-3"
        language = "multi"

        [providers.llm]
        provider = "groq"
        model = "llama-3.1-8b-instant"

        [providers.tts]
        provider = "open_ai"
        model = "gpt-4o-mini-tts"

        [prompts]
        instructions_dir = "prompts/instructions"
        knowledge_dir = "prompts/knowledge"

        [logging]
        level = "debug"
        json = true
    "#;

    let config: Config = toml::from_str(toml_str).expect("parse TOML");
    assert_eq!(config.room.name, "demo-room");
    assert_eq!(config.room.greeting, "Say hello in Hebrew.");
    assert_eq!(
        config.providers.labels().to_string(),
        "nova-3_llama-3.1-8b-instant_gpt-4o-mini-tts"
    );
    assert_eq!(config.prompts.instructions_dir, "prompts/instructions");
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
}

#[test]
fn partial_config_keeps_section_defaults() {
    let toml_str = r#"
        [room]
        name = "only-the-room"
    "#;

    let config: Config = toml::from_str(toml_str).expect("parse TOML");
    assert_eq!(config.room.name, "only-the-room");
    // Untouched sections keep their defaults.
    assert!(!config.room.greeting.is_empty());
    assert_eq!(
        config.providers.labels().to_string(),
        "whisper-1_gpt-4o-mini_gpt-4o-mini-tts"
    );
    assert_eq!(config.logging.level, "info");
}

#[test]
fn config_file_loads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[room]\nname = \"from-disk\"").expect("write");

    let config = load_config(file.path().to_str()).expect("load");
    assert_eq!(config.room.name, "from-disk");
}

#[test]
fn malformed_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "room = {{ not toml").expect("write");

    assert!(load_config(file.path().to_str()).is_err());
}
