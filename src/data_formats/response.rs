use serde::{Deserialize, Serialize};

use crate::models::{Comment, Group, Post, User};

#[derive(Deserialize, Serialize, Debug)]
pub struct UserResponse {
    pub email: String,
    pub token: String,
    pub username: String,
    pub bio: String,
    pub image: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct ProfileResponse {
    pub username: String,
    pub bio: String,
    pub image: Option<String>,
    #[serde(rename = "postCount")]
    pub post_count: i64,
    pub following: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GroupResponse {
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GroupRef {
    pub slug: String,
    pub title: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PostResponse {
    pub id: i64,
    pub text: String,
    pub image: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    pub author: String,
    pub group: Option<GroupRef>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CommentResponse {
    pub id: i64,
    pub text: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    pub author: String,
}

impl UserResponse {
    pub fn new(
        User {
            username,
            email,
            bio,
            image,
            ..
        }: User,
        token: String,
    ) -> Self {
        UserResponse {
            username,
            email,
            bio: bio.unwrap_or_default(),
            image,
            token,
        }
    }
}

impl ProfileResponse {
    pub fn new(
        User {
            username,
            bio,
            image,
            ..
        }: User,
        post_count: i64,
        following: bool,
    ) -> Self {
        ProfileResponse {
            username,
            bio: bio.unwrap_or_default(),
            image,
            post_count,
            following,
        }
    }
}

impl GroupResponse {
    pub fn new(
        Group {
            title,
            slug,
            description,
            ..
        }: Group,
    ) -> Self {
        GroupResponse {
            title,
            slug,
            description,
        }
    }
}

impl PostResponse {
    pub fn new(
        Post {
            id,
            text,
            image,
            created_at,
            author_username,
            group_slug,
            group_title,
            ..
        }: Post,
    ) -> Self {
        let group = match (group_slug, group_title) {
            (Some(slug), Some(title)) => Some(GroupRef { slug, title }),
            _ => None,
        };
        PostResponse {
            id,
            text,
            image,
            created_at: created_at.to_string(),
            author: author_username,
            group,
        }
    }
}

impl CommentResponse {
    pub fn new(
        Comment {
            id,
            text,
            created_at,
            author_username,
            ..
        }: Comment,
    ) -> Self {
        CommentResponse {
            id,
            text,
            created_at: created_at.to_string(),
            author: author_username,
        }
    }
}
