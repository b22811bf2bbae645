//! Link search tests
//!
//! Every enabled filter narrows the result; text matching is
//! case-insensitive and always includes the URL.

mod common;

use chrono::Utc;

use common::{collection, create_user, link, setup, titled_link};
use linkace::services::{AppServices, LinkInput};
use linkace::storage::{LinkOrder, LinkSearch, LinkStatus, OwnerScope, PageRequest, TagRef};

async fn search_urls(services: &AppServices, user_id: i32, search: &LinkSearch) -> Vec<String> {
    let page = services
        .links
        .search(
            OwnerScope::User(user_id),
            search,
            LinkOrder::parse(Some("url"), Some("asc")),
            PageRequest::new(1, 100),
        )
        .await
        .expect("search failed");
    page.data.into_iter().map(|l| l.url).collect()
}

#[tokio::test]
async fn test_query_matches_url_substring() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    for url in [
        "https://example.com",
        "https://another-example.org",
        "https://test.com",
    ] {
        env.services.links.create(user.id, link(url)).await.unwrap();
    }

    let urls = search_urls(&env.services, user.id, &LinkSearch::new("example")).await;
    assert_eq!(
        urls,
        vec!["https://another-example.org", "https://example.com"]
    );

    // 大小写不敏感
    let urls = search_urls(&env.services, user.id, &LinkSearch::new("EXAMPLE")).await;
    assert_eq!(urls.len(), 2);
}

#[tokio::test]
async fn test_search_title_flag() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    env.services
        .links
        .create(user.id, titled_link("https://one.com", "Test Title"))
        .await
        .unwrap();
    env.services
        .links
        .create(user.id, titled_link("https://two.com", "Nobody cares"))
        .await
        .unwrap();

    let without_title = search_urls(&env.services, user.id, &LinkSearch::new("Test")).await;
    assert!(without_title.is_empty());

    let search = LinkSearch {
        search_title: true,
        ..LinkSearch::new("Test")
    };
    let urls = search_urls(&env.services, user.id, &search).await;
    assert_eq!(urls, vec!["https://one.com"]);
}

#[tokio::test]
async fn test_search_title_with_non_ascii_letters() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    env.services
        .links
        .create(user.id, titled_link("https://obst.de", "Äpfel und Birnen"))
        .await
        .unwrap();

    for query in ["Äpfel", "ÄPFEL UND", "birnen"] {
        let search = LinkSearch {
            search_title: true,
            ..LinkSearch::new(query)
        };
        let urls = search_urls(&env.services, user.id, &search).await;
        assert_eq!(urls, vec!["https://obst.de"], "query {:?}", query);
    }
}

#[tokio::test]
async fn test_search_description_flag() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    env.services
        .links
        .create(
            user.id,
            LinkInput {
                description: Some("All about ferris the crab".into()),
                ..link("https://rust.org")
            },
        )
        .await
        .unwrap();

    let search = LinkSearch {
        search_description: true,
        ..LinkSearch::new("ferris")
    };
    assert_eq!(
        search_urls(&env.services, user.id, &search).await,
        vec!["https://rust.org"]
    );
}

#[tokio::test]
async fn test_private_only_and_broken_only() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    let private = env
        .services
        .links
        .create(
            user.id,
            LinkInput {
                is_private: Some(true),
                ..link("https://private.example.com")
            },
        )
        .await
        .unwrap();
    let broken = env
        .services
        .links
        .create(
            user.id,
            LinkInput {
                is_private: Some(false),
                ..link("https://broken.example.com")
            },
        )
        .await
        .unwrap();
    env.services
        .storage
        .record_link_check(broken.link.link.id, LinkStatus::Broken, Utc::now())
        .await
        .unwrap();

    let search = LinkSearch {
        private_only: true,
        ..LinkSearch::new("example")
    };
    assert_eq!(
        search_urls(&env.services, user.id, &search).await,
        vec![private.link.link.url.clone()]
    );

    let search = LinkSearch {
        broken_only: true,
        ..LinkSearch::new("example")
    };
    assert_eq!(
        search_urls(&env.services, user.id, &search).await,
        vec!["https://broken.example.com"]
    );
}

#[tokio::test]
async fn test_only_lists_and_only_tags() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    let reading = env
        .services
        .lists
        .create(user.id, collection("Reading"))
        .await
        .unwrap();
    let rust_tag = env
        .services
        .tags
        .create(user.id, collection("rust"))
        .await
        .unwrap();

    env.services
        .links
        .create(
            user.id,
            LinkInput {
                lists: Some(vec![reading.id]),
                ..link("https://listed.example.com")
            },
        )
        .await
        .unwrap();
    env.services
        .links
        .create(
            user.id,
            LinkInput {
                tags: Some(vec![TagRef::Id(rust_tag.id)]),
                ..link("https://tagged.example.com")
            },
        )
        .await
        .unwrap();
    env.services
        .links
        .create(user.id, link("https://plain.example.com"))
        .await
        .unwrap();

    let search = LinkSearch {
        only_list_ids: [reading.id].into_iter().collect(),
        ..LinkSearch::new("example")
    };
    assert_eq!(
        search_urls(&env.services, user.id, &search).await,
        vec!["https://listed.example.com"]
    );

    let search = LinkSearch {
        only_tag_ids: [rust_tag.id].into_iter().collect(),
        ..LinkSearch::new("example")
    };
    assert_eq!(
        search_urls(&env.services, user.id, &search).await,
        vec!["https://tagged.example.com"]
    );
}

#[tokio::test]
async fn test_search_excludes_other_users_and_trash() {
    let env = setup().await;
    let (alice, _) = create_user(&env.services, "alice").await;
    let (bob, _) = create_user(&env.services, "bob").await;

    env.services
        .links
        .create(bob.id, link("https://bob.example.com"))
        .await
        .unwrap();
    let trashed = env
        .services
        .links
        .create(alice.id, link("https://gone.example.com"))
        .await
        .unwrap();
    env.services
        .links
        .delete(alice.id, trashed.link.link.id)
        .await
        .unwrap();

    assert!(
        search_urls(&env.services, alice.id, &LinkSearch::new("example"))
            .await
            .is_empty()
    );
}

#[tokio::test]
async fn test_like_wildcards_are_literal() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;

    env.services
        .links
        .create(user.id, link("https://example.com/abc"))
        .await
        .unwrap();
    env.services
        .links
        .create(user.id, link("https://example.com/a_c"))
        .await
        .unwrap();

    assert_eq!(
        search_urls(&env.services, user.id, &LinkSearch::new("a_c")).await,
        vec!["https://example.com/a_c"]
    );
    assert!(
        search_urls(&env.services, user.id, &LinkSearch::new("a%c"))
            .await
            .is_empty()
    );
}
