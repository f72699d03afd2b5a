pub mod app;
pub mod gallery_view;
pub mod project_detail;
