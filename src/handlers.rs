use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::{
    authentication::{
        get_jwt_token, hash_password_argon2, verify_password_argon2, AuthUser, MaybeUser,
    },
    data_formats::{
        CommentRequest, CreatePostRequest, LoginRequest, PageQueryParams, RegisterRequest,
        UpdatePostRequest,
    },
    db_helpers::{
        add_comment_to_post_in_db, count_posts_by_author_in_db, create_post_in_db,
        follow_author_in_db, get_comments_for_post_in_db, get_group_by_slug_in_db,
        get_post_by_id_in_db, get_profile_in_db, get_user_by_id, insert_user, list_posts_in_db,
        unfollow_author_in_db, update_post_in_db, Pagination, PostFilter,
    },
    errors::{RequestError, RequestErrorJsonWrapper},
    models::Post,
    page_cache::PageCache,
    CommentResponse, CommentWrapper, GroupPostsWrapper, GroupResponse, MultipleCommentsWrapper,
    PostDetailWrapper, PostPageWrapper, PostResponse, PostWrapper, ProfileResponse, ProfileWrapper,
    UserResponse, UserWrapper,
};

type UserJson = UserWrapper<UserResponse>;
type ProfileJson = ProfileWrapper;

type JsonResult<T> = Result<Json<T>, (StatusCode, Json<RequestErrorJsonWrapper>)>;

const POST_PREVIEW_CHARS: usize = 30;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}

pub async fn about_author() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "title": "About the author",
        "body": "Yatube is written and maintained by its author as a study in small, well-worn web services.",
    }))
}

pub async fn about_tech() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "title": "Technologies",
        "body": "Built with axum, sqlx over SQLite, and tokio.",
    }))
}

// ----------------- User Handlers -----------------
pub async fn login_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(UserWrapper { user: request }): Json<UserWrapper<LoginRequest>>,
) -> JsonResult<UserJson> {
    let user = crate::db_helpers::get_user_by_email(&pool, &request.email)
        .await
        .map_err(|_| {
            RequestError::RunTimeError("Could not login user\nPlease Try again").to_json_response()
        })?;
    let user = match user {
        Some(user) => user,
        None => {
            return Err(RequestError::RunTimeError("Email not found").to_json_response());
        }
    };
    let is_password_correct = verify_password_argon2(request.password, &user.password)
        .await
        .map_err(|_| {
            RequestError::RunTimeError("Could not login user\nPlease Try again").to_json_response()
        })?;

    if !is_password_correct {
        return Err(RequestError::RunTimeError("Incorrect password").to_json_response());
    }
    let token = get_jwt_token(user.id).map_err(|_| {
        RequestError::RunTimeError("Could not generate JWT successfully\nTry again later")
            .to_json_response()
    })?;
    let result = UserResponse::new(user, token);
    Ok(Json(UserWrapper::wrap_with_user_data(result)))
}

pub async fn register_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(UserWrapper { mut user }): Json<UserWrapper<RegisterRequest>>,
) -> JsonResult<UserJson> {
    user.password = hash_password_argon2(user.password).await.map_err(|_| {
        RequestError::RunTimeError("Could not register user\nPlease Try again").to_json_response()
    })?;

    let user = insert_user(&pool, &user).await.map_err(|e| {
        if let RequestError::DatabaseError(sqlx::Error::Database(e)) = e {
            if e.message().contains("UNIQUE constraint failed") {
                return RequestError::RunTimeError("Username or email already exists")
                    .to_json_response();
            }
        }
        RequestError::RunTimeError("Could not register user").to_json_response()
    })?;

    let token = get_jwt_token(user.id).map_err(|_| {
        RequestError::RunTimeError("Could not generate JWT successfully\nTry again later")
            .to_json_response()
    })?;
    let result = UserResponse::new(user, token);
    Ok(Json(UserWrapper::wrap_with_user_data(result)))
}

pub async fn get_current_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    AuthUser { id, token }: AuthUser,
) -> JsonResult<UserJson> {
    let user = get_user_by_id(&pool, id)
        .await
        .map_err(|_| RequestError::ServerError.to_json_response())?;
    let user = match user {
        Some(user) => user,
        None => {
            return Err(RequestError::RunTimeError("User not found").to_json_response());
        }
    };
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        user, token,
    ))))
}

// ----------------- Post Handlers -----------------

fn post_page(posts: Vec<Post>, pagination: Pagination) -> PostPageWrapper {
    PostPageWrapper::new(
        posts.into_iter().map(PostResponse::new).collect(),
        pagination.count,
        pagination.num_pages,
        pagination.page,
    )
}

/// The index listing is cached whole, keyed by path and query string.
pub async fn index(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(cache): Extension<Arc<PageCache>>,
    uri: Uri,
    Query(params): Query<PageQueryParams>,
) -> Result<Response, (StatusCode, Json<RequestErrorJsonWrapper>)> {
    let key = uri
        .path_and_query()
        .map(|pq| pq.to_string())
        .unwrap_or_else(|| uri.path().to_string());
    if let Some(body) = cache.get(&key).await {
        return Ok(cached_json_response(body));
    }

    let (posts, pagination) = list_posts_in_db(&pool, PostFilter::default(), params.page())
        .await
        .map_err(|e| e.to_json_response())?;
    let body = serde_json::to_string(&post_page(posts, pagination))
        .map_err(|_| RequestError::ServerError.to_json_response())?;
    cache.put(key, body.clone()).await;
    Ok(cached_json_response(body))
}

fn cached_json_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

pub async fn group_posts(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(slug): Path<String>,
    Query(params): Query<PageQueryParams>,
) -> JsonResult<GroupPostsWrapper> {
    let group = get_group_by_slug_in_db(&pool, &slug)
        .await
        .map_err(|e| e.to_json_response())?;
    let filter = PostFilter {
        group: Some(group.slug.clone()),
        ..Default::default()
    };
    let (posts, pagination) = list_posts_in_db(&pool, filter, params.page())
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(GroupPostsWrapper {
        group: GroupResponse::new(group),
        posts: post_page(posts, pagination),
    }))
}

pub async fn post_detail(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(post_id): Path<i64>,
) -> JsonResult<PostDetailWrapper> {
    let post = get_post_by_id_in_db(&pool, post_id)
        .await
        .map_err(|e| e.to_json_response())?;
    let author_post_count = count_posts_by_author_in_db(&pool, post.author_id)
        .await
        .map_err(|e| e.to_json_response())?;
    let comments = get_comments_for_post_in_db(&pool, post.id)
        .await
        .map_err(|e| e.to_json_response())?;

    let preview = post.text.chars().take(POST_PREVIEW_CHARS).collect();
    Ok(Json(PostDetailWrapper {
        post: PostResponse::new(post),
        preview,
        comments: comments.into_iter().map(CommentResponse::new).collect(),
        author_post_count,
    }))
}

pub async fn post_create(
    AuthUser { id, .. }: AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(PostWrapper { post: request }): Json<PostWrapper<CreatePostRequest>>,
) -> JsonResult<PostWrapper<PostResponse>> {
    if request.text.trim().is_empty() {
        return Err(RequestError::RunTimeError("Text cannot be empty").to_json_response());
    }
    let post = create_post_in_db(&pool, id, request)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(PostWrapper {
        post: PostResponse::new(post),
    }))
}

pub async fn post_edit(
    AuthUser { id, .. }: AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(post_id): Path<i64>,
    Json(PostWrapper { post: request }): Json<PostWrapper<UpdatePostRequest>>,
) -> JsonResult<PostWrapper<PostResponse>> {
    if matches!(&request.text, Some(text) if text.trim().is_empty()) {
        return Err(RequestError::RunTimeError("Text cannot be empty").to_json_response());
    }
    let post = update_post_in_db(&pool, id, post_id, request)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(PostWrapper {
        post: PostResponse::new(post),
    }))
}

// ----------------- Comment Handlers -----------------

pub async fn add_comment(
    AuthUser { id, .. }: AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(post_id): Path<i64>,
    Json(CommentWrapper { comment: request }): Json<CommentWrapper<CommentRequest>>,
) -> JsonResult<CommentWrapper<CommentResponse>> {
    if request.text.trim().is_empty() {
        return Err(RequestError::RunTimeError("Text cannot be empty").to_json_response());
    }
    let comment = add_comment_to_post_in_db(&pool, id, post_id, request)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(CommentWrapper {
        comment: CommentResponse::new(comment),
    }))
}

pub async fn post_comments(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(post_id): Path<i64>,
) -> JsonResult<MultipleCommentsWrapper> {
    let comments = get_comments_for_post_in_db(&pool, post_id)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(MultipleCommentsWrapper {
        comments: comments.into_iter().map(CommentResponse::new).collect(),
    }))
}

// ----------------- Profile Handlers -----------------

pub async fn profile(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(username): Path<String>,
) -> JsonResult<ProfileJson> {
    let (author, post_count, following) = get_profile_in_db(&pool, maybe_user.get_id(), &username)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(ProfileWrapper {
        profile: ProfileResponse::new(author, post_count, following),
    }))
}

pub async fn profile_posts(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(username): Path<String>,
    Query(params): Query<PageQueryParams>,
) -> JsonResult<PostPageWrapper> {
    // 404 for unknown authors, same as the profile page itself.
    get_profile_in_db(&pool, None, &username)
        .await
        .map_err(|e| e.to_json_response())?;
    let filter = PostFilter {
        author: Some(username),
        ..Default::default()
    };
    let (posts, pagination) = list_posts_in_db(&pool, filter, params.page())
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(post_page(posts, pagination)))
}

pub async fn profile_follow(
    AuthUser { id, .. }: AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(username): Path<String>,
) -> JsonResult<ProfileJson> {
    let (author, post_count) = follow_author_in_db(&pool, id, &username)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(ProfileWrapper {
        profile: ProfileResponse::new(author, post_count, true),
    }))
}

pub async fn profile_unfollow(
    AuthUser { id, .. }: AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(username): Path<String>,
) -> JsonResult<ProfileJson> {
    let (author, post_count) = unfollow_author_in_db(&pool, id, &username)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(ProfileWrapper {
        profile: ProfileResponse::new(author, post_count, false),
    }))
}

// ----------------- Feed Handlers -----------------

pub async fn follow_index(
    AuthUser { id, .. }: AuthUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<PageQueryParams>,
) -> JsonResult<PostPageWrapper> {
    let filter = PostFilter {
        followed_by: Some(id),
        ..Default::default()
    };
    let (posts, pagination) = list_posts_in_db(&pool, filter, params.page())
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(post_page(posts, pagination)))
}
