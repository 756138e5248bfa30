//! Application services - the operations behind each page.

mod accounts;
mod feed;
mod follows;
mod groups;
mod page_cache;
mod posts;

pub use accounts::AccountService;
pub use feed::FeedService;
pub use follows::{FollowOutcome, FollowService};
pub use groups::GroupService;
pub use page_cache::{DEFAULT_PAGE_TTL, PageCache};
pub use posts::{EditAccess, PostDetail, PostService};
