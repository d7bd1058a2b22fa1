pub mod agri_bot;
pub mod crop_doctor;
pub mod dashboard;
pub mod header;
pub mod theme_toggle;
pub mod utils;
