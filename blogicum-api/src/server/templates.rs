//! Server-rendered pages of the public blog.

use blogicum_common::model::{category::Category, location::Location, post::Post};
use maud::{DOCTYPE, Markup, html};
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

const SITE_NAME: &str = "Blogicum";

const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day padding:none] [month repr:long] [year], [hour]:[minute]");

/// `18 October 2026, 14:05`
pub fn format_date(date: OffsetDateTime) -> String {
    date.format(DATE_FORMAT).unwrap_or_default()
}

/// Text split into paragraphs at blank lines.
pub fn paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs
}

fn layout(title: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | " (SITE_NAME) }
            }
            body {
                header {
                    nav {
                        a href="/" { (SITE_NAME) }
                    }
                }
                main { (content) }
            }
        }
    }
}

fn public_location(location: Option<&Location>) -> Option<&Location> {
    location.filter(|location| location.publication.is_published)
}

fn post_meta(post: &Post) -> Markup {
    html! {
        p.meta {
            time { (format_date(post.pub_date)) }
            " by " span.author { (post.author.username.get()) }
            @if let Some(location) = public_location(post.location.as_ref()) {
                " in " span.location { (location.name.get()) }
            }
            @if let Some(category) = &post.category {
                " · " a.category href=(category_url(category)) { (category.title.get()) }
            }
        }
    }
}

fn post_url(post: &Post) -> String {
    format!("/posts/{}", post.id)
}

fn category_url(category: &Category) -> String {
    format!("/category/{}", category.slug)
}

fn post_card(post: &Post) -> Markup {
    html! {
        article.post {
            h2 { a href=(post_url(post)) { (post.title.get()) } }
            (post_meta(post))
            p.excerpt { (post.text_short().as_ref()) }
        }
    }
}

fn feed(posts: &[Post]) -> Markup {
    html! {
        @if posts.is_empty() {
            p.empty { "No posts yet." }
        } @else {
            @for post in posts {
                (post_card(post))
            }
        }
    }
}

pub fn index(posts: &[Post]) -> Markup {
    let content = html! {
        h1 { "Latest posts" }
        (feed(posts))
    };
    layout("Home", &content)
}

pub fn post_detail(post: &Post) -> Markup {
    let content = html! {
        article.post {
            h1 { (post.title.get()) }
            (post_meta(post))
            @for paragraph in paragraphs(&post.text) {
                p { (paragraph) }
            }
        }
    };
    layout(post.title.get(), &content)
}

pub fn category_posts(category: &Category, posts: &[Post]) -> Markup {
    let content = html! {
        h1 { (category.title.get()) }
        @for paragraph in paragraphs(&category.description) {
            p.description { (paragraph) }
        }
        (feed(posts))
    };
    layout(category.title.get(), &content)
}

pub fn not_found() -> Markup {
    let content = html! {
        h1 { "Page not found" }
        p { "The page you requested does not exist." }
        p { a href="/" { "Back to the home page" } }
    };
    layout("Not found", &content)
}

pub fn server_error() -> Markup {
    let content = html! {
        h1 { "Something went wrong" }
        p { "The server could not handle your request. Please try again later." }
    };
    layout("Server error", &content)
}

#[cfg(test)]
mod tests {
    use crate::server::templates::{format_date, paragraphs};
    use time::macros::datetime;

    #[test]
    fn dates_are_formatted_for_readers() {
        assert_eq!(
            format_date(datetime!(2026-10-18 14:05 UTC)),
            "18 October 2026, 14:05"
        );
        assert_eq!(format_date(datetime!(2025-03-05 09:00 UTC)), "5 March 2025, 09:00");
    }

    #[test]
    fn text_is_split_at_blank_lines() {
        assert_eq!(
            paragraphs("first line\nsame paragraph\n\n  \nsecond\r\n\r\nthird\n"),
            ["first line\nsame paragraph", "second", "third"]
        );
        assert!(paragraphs("\n\n").is_empty());
    }
}
