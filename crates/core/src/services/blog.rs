//! Blog listing and post detail.

use std::collections::HashMap;

use codestar_common::{AppError, AppResult};
use codestar_db::entities::{comment, post, user};
use codestar_db::repositories::{CommentRepository, PostRepository, UserRepository};
use serde::Serialize;

/// Published posts shown per listing page.
pub const POSTS_PER_PAGE: u64 = 6;

const DATE_FORMAT: &str = "%B %-d, %Y";

/// A requested listing page, parsed from the `page` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// A 1-based page number.
    Number(u64),
    /// The final page, whatever its number.
    Last,
}

impl PageRequest {
    /// Parse the raw `page` parameter. A missing value means page 1.
    pub fn parse(raw: Option<&str>) -> AppResult<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::Number(1)),
            Some("last") => Ok(Self::Last),
            Some(value) => value
                .parse::<u64>()
                .map(Self::Number)
                .map_err(|_| AppError::NotFound(format!("Page: {value}"))),
        }
    }
}

/// Pagination state exposed to the listing template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub is_paginated: bool,
    pub page: u64,
    pub num_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page: Option<u64>,
    pub next_page: Option<u64>,
}

impl PageInfo {
    /// Resolve a page request against the number of published posts.
    ///
    /// Page 1 always exists, even when there is nothing to list; any other
    /// page outside `1..=num_pages` is not found.
    pub fn resolve(request: PageRequest, total: u64) -> AppResult<Self> {
        let num_pages = total.div_ceil(POSTS_PER_PAGE).max(1);
        let page = match request {
            PageRequest::Last => num_pages,
            PageRequest::Number(n) if (1..=num_pages).contains(&n) => n,
            PageRequest::Number(n) => return Err(AppError::NotFound(format!("Page: {n}"))),
        };

        Ok(Self {
            is_paginated: num_pages > 1,
            page,
            num_pages,
            has_previous: page > 1,
            has_next: page < num_pages,
            previous_page: (page > 1).then(|| page - 1),
            next_page: (page < num_pages).then(|| page + 1),
        })
    }

    const fn offset(&self) -> u64 {
        (self.page - 1) * POSTS_PER_PAGE
    }
}

/// A post as it appears in the listing.
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub slug: String,
    pub author: String,
    pub featured_image: String,
    pub excerpt: String,
    pub created_on: String,
}

/// One page of the listing.
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub posts: Vec<PostSummary>,
    pub page: PageInfo,
}

/// A comment with its author resolved.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: String,
    pub author_id: String,
    pub author: String,
    pub body: String,
    pub approved: bool,
    pub created_on: String,
}

/// A post with everything its detail page shows.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub title: String,
    pub slug: String,
    pub author: String,
    pub featured_image: String,
    pub content: String,
    pub excerpt: String,
    pub created_on: String,
    pub updated_on: String,
    /// All comments, oldest first, including those awaiting approval.
    pub comments: Vec<CommentView>,
    /// Approved comments only.
    pub comment_count: u64,
}

/// Read-side service for published posts.
#[derive(Clone)]
pub struct BlogService {
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    user_repo: UserRepository,
}

impl BlogService {
    /// Create a new blog service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        comment_repo: CommentRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            post_repo,
            comment_repo,
            user_repo,
        }
    }

    /// List one page of published posts, newest first.
    pub async fn list(&self, request: PageRequest) -> AppResult<PostPage> {
        let total = self.post_repo.count_published().await?;
        let page = PageInfo::resolve(request, total)?;

        let posts = self
            .post_repo
            .find_published(POSTS_PER_PAGE, page.offset())
            .await?;

        let author_ids: Vec<String> = posts.iter().map(|p| p.author_id.clone()).collect();
        let authors = self.usernames(&author_ids).await?;

        let posts = posts
            .into_iter()
            .map(|p| PostSummary {
                author: author_name(&authors, &p.author_id),
                created_on: p.created_on.format(DATE_FORMAT).to_string(),
                title: p.title,
                slug: p.slug,
                featured_image: p.featured_image,
                excerpt: p.excerpt,
            })
            .collect();

        Ok(PostPage { posts, page })
    }

    /// Find a published post by slug. Drafts are not found.
    pub async fn get_published(&self, slug: &str) -> AppResult<post::Model> {
        self.post_repo
            .find_published_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post: {slug}")))
    }

    /// Load a post's comments and approved count for its detail page.
    pub async fn detail(&self, post: post::Model) -> AppResult<PostDetail> {
        let comments = self.comment_repo.find_by_post(&post.id).await?;

        let mut user_ids: Vec<String> = comments.iter().map(|c| c.author_id.clone()).collect();
        user_ids.push(post.author_id.clone());
        let authors = self.usernames(&user_ids).await?;

        let comment_count = self.comment_repo.count_approved_by_post(&post.id).await?;

        let comments = comments
            .into_iter()
            .map(|c| comment_view(&authors, c))
            .collect();

        Ok(PostDetail {
            author: author_name(&authors, &post.author_id),
            created_on: post.created_on.format(DATE_FORMAT).to_string(),
            updated_on: post.updated_on.format(DATE_FORMAT).to_string(),
            title: post.title,
            slug: post.slug,
            featured_image: post.featured_image,
            content: post.content,
            excerpt: post.excerpt,
            comments,
            comment_count,
        })
    }

    async fn usernames(&self, ids: &[String]) -> AppResult<HashMap<String, String>> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        Ok(self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u: user::Model| (u.id, u.username))
            .collect())
    }
}

fn author_name(authors: &HashMap<String, String>, id: &str) -> String {
    authors.get(id).cloned().unwrap_or_default()
}

fn comment_view(authors: &HashMap<String, String>, c: comment::Model) -> CommentView {
    CommentView {
        author: author_name(authors, &c.author_id),
        created_on: c.created_on.format(DATE_FORMAT).to_string(),
        id: c.id,
        author_id: c.author_id,
        body: c.body,
        approved: c.approved,
    }
}
