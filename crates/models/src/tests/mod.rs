/// CRUD tests for the characters table against in-memory SQLite
pub mod character_db_tests;
