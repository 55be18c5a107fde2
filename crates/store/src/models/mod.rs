mod author;
mod group;
mod work;

pub use self::author::AuthorRow;
pub use self::group::GroupRow;
pub use self::work::WorkRow;
