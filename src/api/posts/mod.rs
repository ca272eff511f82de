pub mod functions;
pub mod handlers;
pub mod structures;

pub use handlers::{
    __path_create_post, __path_list_user_posts, create_post, init_routes, list_user_posts,
};

pub use structures::{CreatePostRequest, PageQuery, PostListResponse, PostResponse, PostView};
