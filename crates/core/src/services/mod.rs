//! Business logic services.

pub mod article;
pub mod category;
pub mod client_ip;
pub mod comment;
pub mod rating;
pub mod slug;
pub mod user;
pub mod view_count;

pub use article::{ArticleService, CreateArticleInput, UpdateArticleInput};
pub use category::{CategoryService, CreateCategoryInput, UpdateCategoryInput};
pub use client_ip::normalize_ip;
pub use comment::{CommentService, CreateCommentInput};
pub use rating::{RatingService, VoteOutcome};
pub use user::{CreateUserInput, UserService};
pub use view_count::ViewCountService;
