pub mod domain;
pub mod repository;
pub mod memory;
pub mod seed;
pub mod service;

pub use domain::CharacterInput;
pub use memory::InMemoryCharacterRepository;
pub use repository::{CharacterRepository, SeaOrmCharacterRepository};
pub use service::CharacterService;
