pub mod fcm;
pub mod firestore;
pub mod health;
pub mod notification;
pub mod response;
pub mod user;
pub mod validation;
