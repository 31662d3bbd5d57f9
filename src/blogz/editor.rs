use crate::error::{BlogError, Result};
use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;
use uuid::Uuid;

/// A post as edited in the user's editor.
/// Format: title\n\ncontent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorContent {
    pub title: String,
    pub content: String,
}

impl EditorContent {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Formats the content for the editor buffer.
    pub fn to_buffer(&self) -> String {
        if self.content.is_empty() {
            format!("{}\n\n", self.title)
        } else {
            format!("{}\n\n{}", self.title, self.content)
        }
    }

    /// Parses an editor buffer back into title and content.
    /// The first non-blank line is the title; the rest, trimmed, is the content.
    pub fn from_buffer(buffer: &str) -> Self {
        let mut lines = buffer.lines().skip_while(|l| l.trim().is_empty());
        let title = lines.next().map(|l| l.trim().to_string()).unwrap_or_default();
        let rest: Vec<&str> = lines.collect();
        Self {
            title,
            content: rest.join("\n").trim().to_string(),
        }
    }
}

/// Gets the editor command from environment.
/// Checks $EDITOR, then $VISUAL, then falls back to common editors.
pub fn get_editor() -> Result<String> {
    for var in ["EDITOR", "VISUAL"] {
        if let Ok(editor) = env::var(var) {
            if !editor.trim().is_empty() {
                return Ok(editor);
            }
        }
    }

    for fallback in ["vim", "vi", "nano"] {
        if Command::new("which")
            .arg(fallback)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
        {
            return Ok(fallback.to_string());
        }
    }

    Err(BlogError::Api(
        "No editor found. Set $EDITOR environment variable.".to_string(),
    ))
}

/// Opens a file in the user's editor and waits for it to close.
/// Returns the contents of the file after editing.
pub fn open_in_editor<P: AsRef<Path>>(file_path: P) -> Result<String> {
    let editor = get_editor()?;
    let path = file_path.as_ref();

    // $EDITOR may carry arguments ("code --wait")
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or("vi");
    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .map_err(|e| BlogError::Api(format!("Failed to launch editor '{}': {}", editor, e)))?;

    if !status.success() {
        return Err(BlogError::Api(format!(
            "Editor '{}' exited with non-zero status",
            editor
        )));
    }

    fs::read_to_string(path).map_err(BlogError::Io)
}

/// Opens an editor on a temporary Markdown file seeded with `initial` and
/// returns what the user saved.
pub fn edit_content(initial: &EditorContent) -> Result<EditorContent> {
    let temp_file = env::temp_dir().join(format!("blogz-edit-{}.md", Uuid::new_v4()));
    fs::write(&temp_file, initial.to_buffer()).map_err(BlogError::Io)?;

    let result = open_in_editor(&temp_file);
    let _ = fs::remove_file(&temp_file);

    Ok(EditorContent::from_buffer(&result?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_buffer_with_content() {
        let ec = EditorContent::new("My Title", "Some content here.");
        assert_eq!(ec.to_buffer(), "My Title\n\nSome content here.");
    }

    #[test]
    fn test_to_buffer_empty_content() {
        let ec = EditorContent::new("My Title", "");
        assert_eq!(ec.to_buffer(), "My Title\n\n");
    }

    #[test]
    fn test_from_buffer_normal() {
        let ec = EditorContent::from_buffer("My Title\n\nThis is content.\nMore content.\n");
        assert_eq!(ec.title, "My Title");
        assert_eq!(ec.content, "This is content.\nMore content.");
    }

    #[test]
    fn test_from_buffer_leading_blank_lines() {
        let ec = EditorContent::from_buffer("\n\n  Title  \nBody");
        assert_eq!(ec.title, "Title");
        assert_eq!(ec.content, "Body");
    }

    #[test]
    fn test_from_buffer_empty() {
        let ec = EditorContent::from_buffer("");
        assert_eq!(ec, EditorContent::new("", ""));
    }

    #[test]
    fn test_roundtrip() {
        let original = EditorContent::new("Test Title", "Test content\n\nwith paragraphs");
        assert_eq!(EditorContent::from_buffer(&original.to_buffer()), original);
    }
}
