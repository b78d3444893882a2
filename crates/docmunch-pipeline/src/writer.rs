use crate::error::PipelineError;
use crate::frontmatter::{Frontmatter, normalize_volatile};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Whether `rendered` differs from the file at `target`, ignoring the
/// volatile timestamp. A missing or unreadable target always needs a write.
pub fn needs_write(target: &Path, rendered: &str, force: bool) -> bool {
    if force {
        return true;
    }
    match fs::read_to_string(target) {
        Ok(existing) => normalize_volatile(&existing) != normalize_volatile(rendered),
        Err(_) => true,
    }
}

/// Writes `rendered` to `target` unless the existing file is equivalent.
/// Returns whether the file was written.
pub fn write_if_changed(target: &Path, rendered: &str, force: bool) -> Result<bool, PipelineError> {
    if !needs_write(target, rendered, force) {
        tracing::debug!("Unchanged: {}", target.display());
        return Ok(false);
    }

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(PipelineError::io(parent))?;
    }
    fs::write(target, rendered).map_err(PipelineError::io(target))?;
    tracing::info!("Wrote {}", target.display());
    Ok(true)
}

/// Renders `markdown` with frontmatter and writes it to `target`, or to
/// stdout when there is no target. Returns whether anything was written.
pub fn write_document(
    markdown: &str,
    target: Option<&Path>,
    meta: &Frontmatter,
    force: bool,
) -> Result<bool, PipelineError> {
    let rendered = meta.render(markdown)?;
    match target {
        Some(path) => write_if_changed(path, &rendered, force),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(rendered.as_bytes())
                .and_then(|_| handle.flush())
                .map_err(PipelineError::io("<stdout>"))?;
            Ok(true)
        }
    }
}
