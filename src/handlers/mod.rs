pub mod companies;
pub mod jobs;
