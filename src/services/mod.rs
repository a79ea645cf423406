pub mod article_service;
pub use article_service::{ArticleError, ArticleErrorKind, ArticleService};

pub mod article_service_impl;
pub use article_service_impl::DefaultArticleService;
