//! Persona system: the closed set of personas, how a turn is assigned to one,
//! and the strategy each persona uses to answer.

pub mod classifier;
pub mod handlers;
pub mod jokes;
pub mod registry;
pub mod types;

pub use classifier::PersonaClassifier;
pub use handlers::PersonaHandlers;
pub use jokes::JokeBook;
pub use registry::PersonaRegistry;
pub use types::PersonaLabel;
