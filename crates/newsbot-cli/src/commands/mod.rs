pub mod fetch;
pub mod post_now;
pub mod posted;
pub mod run;
pub mod sources;
