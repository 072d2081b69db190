/// Console adapters for the CLI
mod application_listing;
mod stdout_presenter;

pub use application_listing::ApplicationListing;
pub use stdout_presenter::StdoutPresenter;
