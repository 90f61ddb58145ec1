//! Presentation shell for the scraper dashboard.
//!
//! Each view fetches its own snapshot, runs it through the analytics
//! functions, and hands a serializable model to a [`RenderSurface`].

pub mod analytics;
pub mod card;
pub mod costs;
pub mod overview;
pub mod posts;
pub mod shell;
pub mod surface;
pub mod view;

pub use analytics::AnalyticsModel;
pub use card::{PostCard, Score};
pub use costs::CostsModel;
pub use overview::OverviewModel;
pub use posts::{PostsModel, PostsSession};
pub use shell::DashboardShell;
pub use surface::{JsonSurface, RenderSurface, Screen};
pub use view::{FetchSpec, View, ViewState};
