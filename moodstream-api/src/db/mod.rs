//! Service-local database queries

pub mod feedback;
pub mod history;
pub mod playlists;
pub mod track_cache;
pub mod users;
