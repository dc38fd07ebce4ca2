//! Client-side half of the category browser: the reactive navigation binding,
//! the paginated list view that re-fetches on navigation, the newsletter form
//! model, and HTTP implementations of the data sources they consume.

pub mod error;
pub mod list_view;
pub mod navigation;
pub mod newsletter;
pub mod source;

pub use error::SourceError;
pub use list_view::{ListRendering, ListViewOptions, PaginatedListView, ViewSnapshot, ViewStatus};
pub use navigation::{NavigationParams, NavigationSource, NavigationSubscription};
pub use newsletter::{NewsletterForm, Notice, SubmitOutcome};
pub use source::{HttpDirectoryClient, ItemPageSource, SubscriptionSink};
