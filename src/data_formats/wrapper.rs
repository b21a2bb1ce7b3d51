use serde::{Deserialize, Serialize};

use super::response::{CommentResponse, GroupResponse, PostResponse, ProfileResponse};

#[derive(Debug, Deserialize, Serialize)]
pub struct UserWrapper<T> {
    pub user: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ProfileWrapper {
    pub profile: ProfileResponse,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostWrapper<T> {
    pub post: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CommentWrapper<T> {
    pub comment: T,
}

/// One page of a post listing plus the paginator bookkeeping clients need to
/// render page controls.
#[derive(Debug, Deserialize, Serialize)]
pub struct PostPageWrapper {
    pub posts: Vec<PostResponse>,
    pub count: i64,
    #[serde(rename = "numPages")]
    pub num_pages: u32,
    pub page: u32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GroupPostsWrapper {
    pub group: GroupResponse,
    #[serde(flatten)]
    pub posts: PostPageWrapper,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostDetailWrapper {
    pub post: PostResponse,
    /// First thirty characters of the text, the preview the detail page shows.
    pub preview: String,
    pub comments: Vec<CommentResponse>,
    #[serde(rename = "authorPostCount")]
    pub author_post_count: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MultipleCommentsWrapper {
    pub comments: Vec<CommentResponse>,
}

impl<T> UserWrapper<T> {
    pub fn wrap_with_user_data(request: T) -> UserWrapper<T> {
        UserWrapper { user: request }
    }
}

impl PostPageWrapper {
    pub fn new(posts: Vec<PostResponse>, count: i64, num_pages: u32, page: u32) -> Self {
        PostPageWrapper {
            posts,
            count,
            num_pages,
            page,
        }
    }
}
