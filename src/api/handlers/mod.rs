pub mod health;
pub mod mangas;
