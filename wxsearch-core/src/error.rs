use thiserror::Error;

/// Search text the resolver refuses to turn into a provider query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Please enter a city or state name.")]
    Empty,

    #[error("'{input}' does not look like a place name. Please enter a city or state name.")]
    NumericOnly { input: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignError {
    #[error("The provider returned no forecast days to display")]
    EmptyForecast,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("State '{state}' has no candidate cities")]
    EmptyStateList { state: String },
}
