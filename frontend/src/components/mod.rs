pub mod about;
pub mod handlers;
pub mod home;
pub mod identify;
pub mod preview_area;
pub mod results;
pub mod sidebar;
pub mod upload_section;
pub mod utils;
