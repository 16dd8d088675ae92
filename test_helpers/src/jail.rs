//! Helpers for running configuration tests inside a [`figment::Jail`].
//!
//! A jail gives each test a scratch working directory and restores the
//! environment afterwards. These wrappers return `anyhow::Result`, so tests
//! can use `?` on both figment and nestspec errors.

use anyhow::{Result, anyhow};
use camino::Utf8PathBuf;

/// Executes `f` inside a [`figment::Jail`], returning the closure's output.
///
/// # Errors
///
/// Returns an error if the jail cannot be set up or the closure fails.
pub fn with_jail<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> figment::error::Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|jail| {
        output = Some(f(jail)?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure did not return a value"))
}

/// Writes `contents` to `name` inside the jail and returns its UTF-8 path.
///
/// # Errors
///
/// Returns an error if the file cannot be written or its path is not UTF-8.
pub fn write_config(
    jail: &mut figment::Jail,
    name: &str,
    contents: &str,
) -> figment::error::Result<Utf8PathBuf> {
    jail.create_file(name, contents)?;
    let path = jail.directory().join(name);
    Utf8PathBuf::from_path_buf(path)
        .map_err(|path| figment::Error::from(format!("non UTF-8 jail path: {}", path.display())))
}
