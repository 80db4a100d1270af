pub mod compose;
pub mod configuration;
pub mod driver;
pub mod emission;
pub mod errors;
pub mod explore;
pub mod models;
pub mod normalize;
pub mod playground;
pub mod prompt_template;
pub mod providers;
pub mod reassembler;
pub mod transcript;
