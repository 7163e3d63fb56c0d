//! Writes generated documents into the output directory. Every route is
//! written as a directory containing an `index.html` file, so `/articles/`
//! lands at `{output_directory}/articles/index.html`.

use crate::minify;
use log::debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Responsible for placing generated files under the output directory.
pub struct Writer<'a> {
    /// The root of the generated site.
    pub output_directory: &'a Path,

    /// Whether HTML is minified before it's written.
    pub minify: bool,
}

impl Writer<'_> {
    /// Writes `html` as the document for `route` (e.g. `/articles/hello/`)
    /// and returns the path of the written file.
    pub fn write_page(&self, route: &str, html: &str) -> Result<PathBuf> {
        let relative = Path::new(route.trim_matches('/')).join("index.html");
        if self.minify {
            self.write_file(&relative, minify::html(html).as_bytes())
        } else {
            self.write_file(&relative, html.as_bytes())
        }
    }

    /// Writes `contents` to `relative` under the output directory, creating
    /// parent directories as needed.
    pub fn write_file(&self, relative: &Path, contents: &[u8]) -> Result<PathBuf> {
        if relative.is_absolute() {
            return Err(Error::AbsolutePath(relative.to_owned()));
        }
        let path = self.output_directory.join(relative);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|err| Error::Io {
                path: dir.to_owned(),
                err,
            })?;
        }
        fs::write(&path, contents).map_err(|err| Error::Io {
            path: path.clone(),
            err,
        })?;
        debug!("wrote `{}`", path.display());
        Ok(path)
    }
}

/// Removes `dir` and everything in it, then recreates it empty. A missing
/// directory is simply created.
pub fn clean(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(Error::Io {
                path: dir.to_owned(),
                err,
            })
        }
    }
    fs::create_dir_all(dir).map_err(|err| Error::Io {
        path: dir.to_owned(),
        err,
    })
}

/// The result of a fallible write operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error writing output files.
#[derive(Debug, Error)]
pub enum Error {
    /// An error writing or creating `path`.
    #[error("writing `{}`: {err}", path.display())]
    Io { path: PathBuf, err: io::Error },

    /// Returned when asked to write outside the output directory.
    #[error("refusing to write absolute path `{}`", .0.display())]
    AbsolutePath(PathBuf),
}
