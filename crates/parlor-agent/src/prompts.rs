//! Prompt material loading for the voice pipeline.
//!
//! Instructions and knowledge are plain `.txt` files dropped into
//! directories. Files are read in name order so the assembled prompt is
//! deterministic; unreadable files are logged and skipped rather than
//! failing the session.

use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Fallback instruction used when the instructions directory is empty.
pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful voice AI assistant.";

/// Separator between knowledge documents.
const KNOWLEDGE_SEPARATOR: &str = "\n\n---\n\n";

/// Prompt material resolved for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    /// System instructions for the pipeline.
    pub instructions: String,
    /// Optional reference material, `None` when no knowledge files exist.
    pub knowledge: Option<String>,
}

/// Loads the session prompt set from the configured directories.
pub fn load_prompts(instructions_dir: &Path, knowledge_dir: &Path) -> PromptSet {
    let instruction_files = load_text_files(instructions_dir);
    let instructions = if instruction_files.is_empty() {
        info!(
            dir = %instructions_dir.display(),
            "no instruction files found, using default"
        );
        DEFAULT_INSTRUCTIONS.to_string()
    } else {
        info!(
            dir = %instructions_dir.display(),
            count = instruction_files.len(),
            "loaded instruction files"
        );
        instruction_files.join("\n\n")
    };

    let knowledge_files = load_text_files(knowledge_dir);
    let knowledge = if knowledge_files.is_empty() {
        None
    } else {
        info!(
            dir = %knowledge_dir.display(),
            count = knowledge_files.len(),
            "loaded knowledge files"
        );
        Some(knowledge_files.join(KNOWLEDGE_SEPARATOR))
    };

    PromptSet {
        instructions,
        knowledge,
    }
}

/// Reads every `*.txt` file in `dir`, sorted by path for determinism. The
/// directory is created when missing so operators can drop files in later.
fn load_text_files(dir: &Path) -> Vec<String> {
    if let Err(e) = fs::create_dir_all(dir) {
        error!(dir = %dir.display(), error = %e, "failed to create prompt directory");
        return Vec::new();
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            error!(dir = %dir.display(), error = %e, "failed to read prompt directory");
            return Vec::new();
        }
    };

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    paths.sort();

    let mut contents = Vec::new();
    for path in paths {
        match fs::read_to_string(&path) {
            Ok(text) => contents.push(text),
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to read prompt file");
            }
        }
    }
    contents
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut file = File::create(dir.join(name)).expect("create file");
        file.write_all(contents.as_bytes()).expect("write file");
    }

    #[test]
    fn empty_directories_fall_back_to_default() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let set = load_prompts(&tmp.path().join("instructions"), &tmp.path().join("knowledge"));
        assert_eq!(set.instructions, DEFAULT_INSTRUCTIONS);
        assert_eq!(set.knowledge, None);
    }

    #[test]
    fn missing_directories_are_created() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let instructions_dir = tmp.path().join("a/b/instructions");
        load_prompts(&instructions_dir, &tmp.path().join("knowledge"));
        assert!(instructions_dir.is_dir());
    }

    #[test]
    fn instruction_files_are_joined_in_name_order() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_file(tmp.path(), "02-style.txt", "Answer briefly.");
        write_file(tmp.path(), "01-persona.txt", "You are Parlor.");
        write_file(tmp.path(), "notes.md", "ignored");

        let set = load_prompts(tmp.path(), &tmp.path().join("knowledge"));
        assert_eq!(set.instructions, "You are Parlor.\n\nAnswer briefly.");
    }

    #[test]
    fn knowledge_files_use_document_separator() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let knowledge_dir = tmp.path().join("knowledge");
        fs::create_dir_all(&knowledge_dir).expect("mkdir");
        write_file(&knowledge_dir, "a.txt", "First document.");
        write_file(&knowledge_dir, "b.txt", "Second document.");

        let set = load_prompts(&tmp.path().join("instructions"), &knowledge_dir);
        assert_eq!(
            set.knowledge.as_deref(),
            Some("First document.\n\n---\n\nSecond document.")
        );
    }
}
