//! Literal `{{ key }}` placeholder substitution.

use std::fs;
use std::path::Path;

use log::debug;
use walkdir::WalkDir;

use crate::context::TemplateContext;
use crate::error::Result;

/// Returns the placeholder token for `key`.
pub fn token(key: &str) -> String {
    format!("{{{{ {key} }}}}")
}

/// Replaces every context token in `content`.
///
/// Pairs are applied one after another over the same buffer in context order,
/// so text inserted for an earlier key is visible to later keys.
pub fn substitute_str(content: &str, context: &TemplateContext) -> String {
    context
        .iter()
        .fold(content.to_string(), |acc, (key, value)| acc.replace(&token(key), value))
}

/// Substitutes context tokens in every regular file below `root`.
///
/// Files that are not valid UTF-8 are skipped and left untouched. Files without
/// any token are not rewritten.
pub fn substitute(root: &Path, context: &TemplateContext) -> Result<()> {
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        let bytes = fs::read(path)?;
        let Ok(content) = String::from_utf8(bytes) else {
            debug!("Skipping non-text file: {}", path.display());
            continue;
        };

        let substituted = substitute_str(&content, context);
        if substituted != content {
            debug!("Writing file: {}", path.display());
            fs::write(path, substituted)?;
        }
    }
    Ok(())
}

/// Returns true when `content` still contains a `{{ identifier }}` token.
pub fn has_placeholders(content: &str) -> bool {
    let mut rest = content;
    while let Some(start) = rest.find("{{ ") {
        let after = &rest[start + 3..];
        if let Some(end) = after.find(" }}") {
            let inner = &after[..end];
            if !inner.is_empty()
                && inner.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                return true;
            }
        }
        rest = after;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token() {
        assert_eq!(token("project_name"), "{{ project_name }}");
    }

    #[test]
    fn test_substitute_str_exact_token_only() {
        let mut context = TemplateContext::new();
        context.insert("name", "demo");
        let result = substitute_str("{{ name }} {{name}} {{  name  }}", &context);
        assert_eq!(result, "demo {{name}} {{  name  }}");
    }

    #[test]
    fn test_substitute_str_is_sequential() {
        let mut context = TemplateContext::new();
        context.insert("first", "{{ second }}");
        context.insert("second", "two");
        assert_eq!(substitute_str("{{ first }}", &context), "two");
    }

    #[test]
    fn test_unknown_tokens_left_verbatim() {
        let context = TemplateContext::new();
        assert_eq!(substitute_str("{{ other }}", &context), "{{ other }}");
    }

    #[test]
    fn test_has_placeholders() {
        assert!(has_placeholders("a {{ project_name }} b"));
        assert!(!has_placeholders("a {{ }} b {% if %}"));
        assert!(!has_placeholders("nothing here"));
    }
}
