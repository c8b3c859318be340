//! Database entities.

#![allow(missing_docs)]

pub mod article;
pub mod article_tag;
pub mod category;
pub mod comment;
pub mod rating;
pub mod status;
pub mod tag;
pub mod user;
pub mod user_profile;
pub mod view_count;

pub use article::Entity as Article;
pub use article_tag::Entity as ArticleTag;
pub use category::Entity as Category;
pub use comment::Entity as Comment;
pub use rating::Entity as Rating;
pub use status::PublicationStatus;
pub use tag::Entity as Tag;
pub use user::Entity as User;
pub use user_profile::Entity as UserProfile;
pub use view_count::Entity as ViewCount;
