// OPTCG Collector - API Core
//
// Backend for a One Piece TCG collection tracker: marketplace search with a
// fallback policy, optional search by image, the user's collection, image
// uploads and a currency-rate passthrough.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
