//! Copies the project's static resources and the theme's stylesheets into
//! the output directory.

use crate::minify;
use crate::theme::Stylesheet;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Copies every file under `source` to the same relative location under
/// `destination` and returns the number of files copied. A missing `source`
/// directory copies nothing.
pub fn copy_resources(source: &Path, destination: &Path) -> Result<usize> {
    if !source.is_dir() {
        info!("no resources folder at `{}`; skipping", source.display());
        return Ok(0);
    }

    let mut copied = 0;
    for result in WalkDir::new(source).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
        let entry = result?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| Error::OutsideSource(entry.path().to_owned()))?;
        copy_file(entry.path(), &destination.join(relative))?;
        copied += 1;
    }
    Ok(copied)
}

/// Copies `from` to `to`, creating the parent directories of `to`.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(dir) = to.parent() {
        fs::create_dir_all(dir).map_err(|err| Error::Io {
            path: dir.to_owned(),
            err,
        })?;
    }
    fs::copy(from, to).map_err(|err| Error::Io {
        path: from.to_owned(),
        err,
    })?;
    debug!("copied `{}` to `{}`", from.display(), to.display());
    Ok(())
}

/// Concatenates `stylesheets` in order into one stylesheet, minified if
/// requested.
pub fn combine_stylesheets(stylesheets: &[Stylesheet], minify: bool) -> String {
    let combined = stylesheets
        .iter()
        .map(|sheet| format!("/* {} */\n{}", sheet.name, sheet.contents.trim_end()))
        .collect::<Vec<String>>()
        .join("\n\n");
    if minify {
        minify::css(&combined)
    } else {
        combined + "\n"
    }
}

/// The result of a fallible resource operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error copying resources.
#[derive(Debug, Error)]
pub enum Error {
    #[error("copying `{}`: {err}", path.display())]
    Io { path: PathBuf, err: std::io::Error },

    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Returned when a walked file isn't inside the resources folder, e.g.
    /// through a symlink.
    #[error("`{}` is outside the resources folder", .0.display())]
    OutsideSource(PathBuf),
}
