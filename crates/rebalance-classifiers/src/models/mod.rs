pub mod classifier_trait;
pub mod factory;
pub mod feed_forward;
pub mod handler;
pub mod neural;
