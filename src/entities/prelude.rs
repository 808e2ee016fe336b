pub use super::schools::Entity as Schools;
