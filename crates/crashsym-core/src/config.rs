//! Resolver configuration.

/// Options for [`BasicSourceLineResolver`](crate::resolver::BasicSourceLineResolver).
///
/// The defaults accept any map file that could be read, however many of its
/// lines were malformed.
///
/// ```rust
/// use crashsym_core::config::ResolverOptions;
///
/// let options = ResolverOptions::default().with_max_malformed_ratio(0.5);
/// assert_eq!(options.max_malformed_ratio(), Some(0.5));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResolverOptions
{
    max_malformed_ratio: Option<f64>,
}

impl ResolverOptions
{
    /// Reject a map file when more than `ratio` (0.0 to 1.0) of its non-blank
    /// lines are malformed.
    ///
    /// Values outside that range are clamped.
    #[must_use]
    pub fn with_max_malformed_ratio(mut self, ratio: f64) -> Self
    {
        self.max_malformed_ratio = Some(ratio.clamp(0.0, 1.0));
        self
    }

    /// Configured malformed-line threshold, if any.
    pub fn max_malformed_ratio(&self) -> Option<f64>
    {
        self.max_malformed_ratio
    }
}
