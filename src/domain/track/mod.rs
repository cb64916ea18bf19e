//! Track Context - 曲目限界上下文
//!
//! 职责:
//! - 曲目实体与请求者
//! - 曲目指纹
//! - 近似重复判断

mod entities;
mod similarity;
mod value_objects;

pub use entities::{Requester, Track};
pub use similarity::{is_near_duplicate, NearDuplicateFilter};
pub use value_objects::{split_artists, Fingerprint};
