use crate::shared::Result;

/// OutputPresenter port for presenting command output
///
/// Abstracts where the `list` command's rendered text ends up.
pub trait OutputPresenter {
    /// # Errors
    /// Returns an error if writing to the destination fails
    fn present(&self, content: &str) -> Result<()>;
}
