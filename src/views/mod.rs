pub mod compare;
pub mod detail;
pub mod list;
pub mod route;
pub mod state;
pub mod upload;

pub use route::Route;
pub use state::ViewState;
