//! Repositories wrapping the database entities.

mod article;
mod category;
mod comment;
mod rating;
mod tag;
mod user;
mod view_count;

pub use article::{ArticleDetail, ArticleFilter, ArticleListItem, ArticleRepository, CommentView};
pub use category::CategoryRepository;
pub use comment::CommentRepository;
pub use rating::RatingRepository;
pub use tag::{TagAssignment, TagRepository};
pub use user::UserRepository;
pub use view_count::ViewCountRepository;
