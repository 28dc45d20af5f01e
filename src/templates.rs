use std::path::Path;

use crate::render::RenderError;

/// Resolve a named template to its bytes. Names are confined to the
/// templates root; anything that does not land on an existing file under
/// it (including `..` escapes and symlinks out) reads as not-found.
pub fn resolve_template(templates_dir: &Path, name: &str) -> Result<Vec<u8>, RenderError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RenderError::Input("templateRef is empty".into()));
    }

    let root = std::fs::canonicalize(templates_dir).unwrap_or_else(|_| templates_dir.to_path_buf());
    let resolved = std::fs::canonicalize(root.join(name))
        .map_err(|_| RenderError::NotFound(format!("template not found: {name}")))?;
    if !resolved.starts_with(&root) {
        return Err(RenderError::NotFound(format!("template not found: {name}")));
    }

    std::fs::read(&resolved).map_err(|_| RenderError::NotFound(format!("template not found: {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_existing_template() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("party.png"), b"png-bytes").unwrap();

        let bytes = resolve_template(dir.path(), "party.png").unwrap();
        assert_eq!(bytes, b"png-bytes");
    }

    #[test]
    fn missing_template_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_template(dir.path(), "nope.png").unwrap_err();
        assert!(matches!(err, RenderError::NotFound(_)));
    }

    #[test]
    fn parent_escape_is_not_found() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("templates");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(outer.path().join("secret.png"), b"secret").unwrap();

        let err = resolve_template(&root, "../secret.png").unwrap_err();
        assert!(matches!(err, RenderError::NotFound(_)));
    }

    #[test]
    fn empty_name_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_template(dir.path(), "  ").unwrap_err();
        assert!(matches!(err, RenderError::Input(_)));
    }
}
